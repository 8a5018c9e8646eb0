//! Host I/O bridges called from generated code.
//!
//! Generated code reaches the host through two records whose first field is
//! an entry point. It calls `[r12]` (output) or `[r13]` (input) with the
//! record itself in `rdi` and the current cell in `esi`, and stores nothing
//! (output) or `al` (input) afterwards.
//!
//! I/O errors cannot unwind through generated code. They are latched in the
//! record, the failing bridge turns into a no-op, and the error surfaces once
//! the program returns.

use std::ffi::c_void;
use std::io::{self, Read, Write};

use bfjit_types::ByteInput;
use tracing::warn;

/// Entry point signature shared by both bridges.
pub type BridgeFn = unsafe extern "sysv64" fn(bridge: *mut c_void, cell: u8) -> u8;

/// Record behind the output bridge pointer.
#[repr(C)]
pub struct OutputBridge<'io> {
    /// Must stay the first field: generated code calls through it.
    entry: BridgeFn,
    sink: &'io mut dyn Write,
    error: Option<io::Error>,
    written: u64,
}

impl<'io> OutputBridge<'io> {
    pub fn new(sink: &'io mut dyn Write) -> Self {
        Self {
            entry: emit_byte,
            sink,
            error: None,
            written: 0,
        }
    }

    /// Address handed to generated code.
    pub fn as_raw(&mut self) -> *mut c_void {
        self as *mut Self as *mut c_void
    }

    /// Flush the sink and report the first error, or the byte count.
    pub fn finish(self) -> io::Result<u64> {
        if let Some(e) = self.error {
            return Err(e);
        }
        self.sink.flush()?;
        Ok(self.written)
    }
}

/// Record behind the input bridge pointer.
#[repr(C)]
pub struct InputBridge<'io> {
    /// Must stay the first field: generated code calls through it.
    entry: BridgeFn,
    source: ByteInput<&'io mut dyn Read>,
    error: Option<io::Error>,
}

impl<'io> InputBridge<'io> {
    pub fn new(source: &'io mut dyn Read) -> Self {
        Self {
            entry: read_byte,
            source: ByteInput::new(source),
            error: None,
        }
    }

    /// Address handed to generated code.
    pub fn as_raw(&mut self) -> *mut c_void {
        self as *mut Self as *mut c_void
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Write one byte. Returns the byte so the signature matches input.
unsafe extern "sysv64" fn emit_byte(bridge: *mut c_void, cell: u8) -> u8 {
    // SAFETY: generated code only ever passes the record it was given, which
    // outlives the call into generated code.
    let bridge = unsafe { &mut *(bridge as *mut OutputBridge<'_>) };
    if bridge.error.is_none() {
        match bridge.sink.write_all(&[cell]) {
            Ok(()) => bridge.written += 1,
            Err(e) => {
                warn!("output bridge failed, suppressing further output: {e}");
                bridge.error = Some(e);
            }
        }
    }
    cell
}

/// Read one byte. At end of input the current cell comes back unchanged,
/// which makes `,` a no-op.
unsafe extern "sysv64" fn read_byte(bridge: *mut c_void, cell: u8) -> u8 {
    // SAFETY: see emit_byte.
    let bridge = unsafe { &mut *(bridge as *mut InputBridge<'_>) };
    match bridge.source.next_byte() {
        Ok(Some(byte)) => byte,
        Ok(None) => cell,
        Err(e) => {
            warn!("input bridge failed, treating as end of input: {e}");
            bridge.error = Some(e);
            cell
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Call a bridge the way generated code does: through its first field.
    fn call(raw: *mut c_void, cell: u8) -> u8 {
        // SAFETY: raw points at a live bridge record with `entry` first.
        unsafe {
            let entry = *(raw as *const BridgeFn);
            entry(raw, cell)
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::PermissionDenied.into())
        }
    }

    #[test]
    fn output_bridge_writes_bytes() {
        let mut sink = Vec::new();
        let mut bridge = OutputBridge::new(&mut sink);
        let raw = bridge.as_raw();
        assert_eq!(call(raw, b'h'), b'h');
        call(raw, b'i');
        assert_eq!(bridge.finish().unwrap(), 2);
        assert_eq!(sink, b"hi");
    }

    #[test]
    fn output_bridge_latches_errors() {
        let mut sink = Broken;
        let mut bridge = OutputBridge::new(&mut sink);
        let raw = bridge.as_raw();
        call(raw, 1);
        call(raw, 2);
        let err = bridge.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn input_bridge_reads_then_leaves_cell_alone() {
        let mut source = &b"AB"[..];
        let mut bridge = InputBridge::new(&mut source);
        let raw = bridge.as_raw();
        assert_eq!(call(raw, 7), b'A');
        assert_eq!(call(raw, 7), b'B');
        assert_eq!(call(raw, 7), 7);
        assert_eq!(call(raw, 0), 0);
        assert!(bridge.finish().is_ok());
    }

    #[test]
    fn input_bridge_latches_errors() {
        let mut source = Broken;
        let mut bridge = InputBridge::new(&mut source);
        let raw = bridge.as_raw();
        assert_eq!(call(raw, 42), 42);
        assert_eq!(call(raw, 43), 43);
        let err = bridge.finish().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
