//! Branch backpatching for loops.
//!
//! A `[` is emitted before its target exists, so its rel32 field starts as a
//! placeholder and its offset goes on the pending stack. The matching `]`
//! knows both ends: it writes its own backward displacement and patches the
//! forward one left by the `[`. Entries are buffer offsets, never addresses.

use bfjit_types::Span;
use tracing::trace;

use crate::buffer::CodeBuffer;
use crate::encoding::REL32_LEN;
use crate::error::{CodegenError, CodegenResult};

/// A `[` whose `]` has not been emitted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoop {
    /// Offset of the `[`'s rel32 placeholder.
    pub patch_at: usize,
    /// Offset of the first byte of the loop body.
    pub body_start: usize,
    /// Where the `[` appeared in the source.
    pub span: Span,
}

/// The pending-jump stack.
#[derive(Debug, Default)]
pub struct BranchPatcher {
    pending: Vec<PendingLoop>,
}

impl BranchPatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open loops.
    pub fn depth(&self) -> usize {
        self.pending.len()
    }

    /// Record a freshly emitted `[`.
    pub fn open(&mut self, patch_at: usize, body_start: usize, span: Span) {
        self.pending.push(PendingLoop {
            patch_at,
            body_start,
            span,
        });
    }

    /// Pop the `[` matched by a `]` at `span`.
    ///
    /// Called before the `]` is emitted so an unmatched one writes nothing.
    pub fn close(&mut self, span: Span) -> CodegenResult<PendingLoop> {
        self.pending
            .pop()
            .ok_or(CodegenError::UnmatchedLoopClose { span })
    }

    /// Fill in both displacements of a loop.
    ///
    /// `close_field` is the offset of the `]`'s rel32 field, which must be the
    /// last thing emitted.
    pub fn resolve(
        buf: &mut CodeBuffer<'_>,
        open: &PendingLoop,
        close_field: usize,
    ) -> CodegenResult<()> {
        let after_close = close_field + REL32_LEN;

        let back = displacement(open.body_start, after_close)?;
        buf.patch_rel32(close_field, back)?;

        let forward = displacement(after_close, open.patch_at + REL32_LEN)?;
        buf.patch_rel32(open.patch_at, forward)?;

        trace!(
            open = open.patch_at,
            close = close_field,
            forward,
            back,
            "patched loop"
        );
        Ok(())
    }

    /// End of program: every `[` must have been closed.
    pub fn finish(self) -> CodegenResult<()> {
        match self.pending.last() {
            Some(open) => Err(CodegenError::UnmatchedLoopOpen { span: open.span }),
            None => Ok(()),
        }
    }
}

/// Displacement of a relative branch whose next instruction starts at `next`.
fn displacement(target: usize, next: usize) -> CodegenResult<i32> {
    let delta = target as i64 - next as i64;
    i32::try_from(delta).map_err(|_| CodegenError::DisplacementOverflow(delta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(offset: usize) -> Span {
        Span::new(offset, 1, offset as u32 + 1)
    }

    #[test]
    fn close_without_open_is_unmatched() {
        let mut patcher = BranchPatcher::new();
        let err = patcher.close(span(4)).unwrap_err();
        assert!(matches!(err, CodegenError::UnmatchedLoopClose { span } if span.offset == 4));
    }

    #[test]
    fn finish_with_open_loop_reports_innermost() {
        let mut patcher = BranchPatcher::new();
        patcher.open(5, 9, span(0));
        patcher.open(14, 18, span(1));
        assert_eq!(patcher.depth(), 2);
        let err = patcher.finish().unwrap_err();
        assert!(matches!(err, CodegenError::UnmatchedLoopOpen { span } if span.offset == 1));
    }

    #[test]
    fn stack_discipline_matches_most_recent_open() {
        let mut patcher = BranchPatcher::new();
        patcher.open(5, 9, span(0));
        patcher.open(14, 18, span(1));
        assert_eq!(patcher.close(span(2)).unwrap().patch_at, 14);
        assert_eq!(patcher.close(span(3)).unwrap().patch_at, 5);
        assert!(patcher.finish().is_ok());
    }

    #[test]
    fn resolve_writes_both_displacements() {
        // [ at 0: cmp(3) je(2) rel32 @5, body starts at 9
        // ] at 9: cmp(3) jne(2) rel32 @14, loop ends at 18
        let mut mem = [0u8; 18];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[0; 18]).unwrap();
        let open = PendingLoop {
            patch_at: 5,
            body_start: 9,
            span: span(0),
        };
        BranchPatcher::resolve(&mut buf, &open, 14).unwrap();
        let bytes = buf.bytes();
        assert_eq!(&bytes[5..9], &9i32.to_le_bytes());
        assert_eq!(&bytes[14..18], &(-9i32).to_le_bytes());
    }

    #[test]
    fn displacement_overflow() {
        assert_eq!(displacement(10, 4).unwrap(), 6);
        assert_eq!(displacement(4, 10).unwrap(), -6);
        let far = i32::MAX as usize + 10;
        assert!(matches!(
            displacement(far, 0),
            Err(CodegenError::DisplacementOverflow(_))
        ));
    }
}
