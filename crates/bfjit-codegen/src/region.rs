//! Anonymous executable memory.
//!
//! The region is mapped readable, writable and executable up front, so a
//! host that refuses executable memory is caught before any code is
//! emitted. It is unmapped on drop.

use std::ptr::NonNull;

use tracing::warn;

use crate::error::{CodegenError, CodegenResult};

/// An owned block of executable memory.
pub struct ExecutableRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl ExecutableRegion {
    /// Map `len` bytes of fresh executable memory.
    pub fn allocate(len: usize) -> CodegenResult<Self> {
        if len == 0 {
            return Err(CodegenError::ExecutableMemoryUnavailable(
                "cannot map an empty region".to_string(),
            ));
        }
        let ptr = alloc_executable_region(len)?;
        Ok(Self { ptr, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the mapping is `len` bytes, readable, and owned by self.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` makes the borrow exclusive.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for ExecutableRegion {
    fn drop(&mut self) {
        if let Err(e) = free_executable_region(self.ptr, self.len) {
            warn!("{e}");
        }
    }
}

#[cfg(all(unix, target_arch = "x86_64"))]
fn alloc_executable_region(len: usize) -> CodegenResult<NonNull<u8>> {
    // SAFETY: anonymous private mapping, no fd, no fixed address.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC,
            libc::MAP_ANON | libc::MAP_PRIVATE,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(CodegenError::ExecutableMemoryUnavailable(format!(
            "mmap failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    NonNull::new(ptr as *mut u8).ok_or_else(|| {
        CodegenError::ExecutableMemoryUnavailable("mmap returned null".to_string())
    })
}

#[cfg(all(unix, target_arch = "x86_64"))]
fn free_executable_region(ptr: NonNull<u8>, len: usize) -> CodegenResult<()> {
    // SAFETY: ptr/len describe a mapping created by alloc_executable_region.
    let rc = unsafe { libc::munmap(ptr.as_ptr() as *mut _, len) };
    if rc != 0 {
        return Err(CodegenError::ExecutableMemoryUnavailable(format!(
            "munmap failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(())
}

#[cfg(not(all(unix, target_arch = "x86_64")))]
fn alloc_executable_region(_len: usize) -> CodegenResult<NonNull<u8>> {
    Err(CodegenError::ExecutableMemoryUnavailable(
        "native code generation requires an x86-64 Unix host".to_string(),
    ))
}

#[cfg(not(all(unix, target_arch = "x86_64")))]
fn free_executable_region(_ptr: NonNull<u8>, _len: usize) -> CodegenResult<()> {
    Ok(())
}

#[cfg(all(test, unix, target_arch = "x86_64"))]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_zeroed_and_writable() {
        let mut region = ExecutableRegion::allocate(4096).unwrap();
        assert_eq!(region.len(), 4096);
        assert!(region.as_slice().iter().all(|&b| b == 0));
        region.as_mut_slice()[0] = 0xc3;
        assert_eq!(region.as_slice()[0], 0xc3);
    }

    #[test]
    fn allocate_empty_fails() {
        assert!(matches!(
            ExecutableRegion::allocate(0),
            Err(CodegenError::ExecutableMemoryUnavailable(_))
        ));
    }

    #[test]
    fn absurd_size_is_refused() {
        assert!(ExecutableRegion::allocate(usize::MAX).is_err());
    }
}
