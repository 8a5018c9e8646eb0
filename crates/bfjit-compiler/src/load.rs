//! Source loading.

use std::path::Path;

use bfjit_types::{Limits, SourceFile};
use tracing::debug;

use crate::error::LoadError;

/// Read a program from disk, enforcing the source length bound.
///
/// A file of exactly `limits.max_source_len` bytes is accepted.
pub fn load_source(path: impl AsRef<Path>, limits: &Limits) -> Result<SourceFile, LoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoadError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.len() > limits.max_source_len {
        return Err(LoadError::SourceTooLarge {
            path: path.to_path_buf(),
            len: bytes.len(),
            limit: limits.max_source_len,
        });
    }
    debug!(path = %path.display(), len = bytes.len(), "loaded source");
    Ok(SourceFile::new(path.display().to_string(), bytes))
}
