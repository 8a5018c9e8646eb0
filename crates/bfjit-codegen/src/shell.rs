//! Execution shell: the function frame around the program body.
//!
//! The prologue saves the callee-saved registers the body uses, aligns the
//! stack and binds the three arguments to their registers; the epilogue
//! undoes it. Together they turn the body into an ordinary
//! `extern "sysv64" fn(tape, output_bridge, input_bridge)`.

use crate::buffer::CodeBuffer;
use crate::encoding::{EPILOGUE, PROLOGUE};
use crate::error::CodegenResult;

pub fn emit_prologue(buf: &mut CodeBuffer<'_>) -> CodegenResult<()> {
    buf.put(&PROLOGUE)
}

pub fn emit_epilogue(buf: &mut CodeBuffer<'_>) -> CodegenResult<()> {
    buf.put(&EPILOGUE)
}

#[cfg(target_arch = "x86_64")]
pub use native::invoke;

#[cfg(target_arch = "x86_64")]
mod native {
    use std::ffi::c_void;

    /// Signature of a compiled program.
    type Entry = unsafe extern "sysv64" fn(tape: *mut u8, output: *mut c_void, input: *mut c_void);

    /// Call into generated code once.
    ///
    /// # Safety
    ///
    /// `code` must point at a complete function produced by the shell in
    /// executable memory. `tape` must be valid for every cell the program
    /// touches. `output` and `input` must point at live bridge records.
    pub unsafe fn invoke(code: *const u8, tape: *mut u8, output: *mut c_void, input: *mut c_void) {
        // SAFETY: upheld by the caller.
        unsafe {
            let entry = std::mem::transmute::<*const u8, Entry>(code);
            entry(tape, output, input);
        }
    }
}
