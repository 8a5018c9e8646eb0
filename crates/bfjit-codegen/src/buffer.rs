//! Fixed-capacity code buffer.
//!
//! The buffer never grows. Every write is bounds-checked in every build
//! profile; running out of room is [`CodegenError::CodeBufferExhausted`],
//! never an out-of-bounds store.

use crate::encoding::REL32_LEN;
use crate::error::{CodegenError, CodegenResult};

/// Append-only writer over a borrowed block of memory.
pub struct CodeBuffer<'mem> {
    mem: &'mem mut [u8],
    len: usize,
}

impl<'mem> CodeBuffer<'mem> {
    pub fn new(mem: &'mem mut [u8]) -> Self {
        Self { mem, len: 0 }
    }

    /// Write cursor: bytes emitted so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.mem.len()
    }

    pub fn remaining(&self) -> usize {
        self.mem.len() - self.len
    }

    /// Fail unless `needed` more bytes fit.
    pub fn ensure(&self, needed: usize) -> CodegenResult<()> {
        if needed > self.remaining() {
            return Err(CodegenError::CodeBufferExhausted {
                offset: self.len,
                needed,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    /// Append raw bytes.
    pub fn put(&mut self, bytes: &[u8]) -> CodegenResult<()> {
        self.ensure(bytes.len())?;
        self.mem[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        Ok(())
    }

    /// Append a zeroed rel32 field and return its offset for later patching.
    pub fn reserve_rel32(&mut self) -> CodegenResult<usize> {
        let at = self.len;
        self.put(&[0; REL32_LEN])?;
        Ok(at)
    }

    /// Overwrite a previously emitted rel32 field.
    pub fn patch_rel32(&mut self, at: usize, displacement: i32) -> CodegenResult<()> {
        let end = at + REL32_LEN;
        if end > self.len {
            return Err(CodegenError::CodeBufferExhausted {
                offset: at,
                needed: REL32_LEN,
                capacity: self.len,
            });
        }
        self.mem[at..end].copy_from_slice(&displacement.to_le_bytes());
        Ok(())
    }

    /// The bytes emitted so far.
    pub fn bytes(&self) -> &[u8] {
        &self.mem[..self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_advances_cursor() {
        let mut mem = [0u8; 8];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[1, 2, 3]).unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.remaining(), 5);
        assert_eq!(buf.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn put_past_capacity_fails_without_writing() {
        let mut mem = [0u8; 4];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[9, 9, 9]).unwrap();
        let err = buf.put(&[7, 7]).unwrap_err();
        assert!(matches!(
            err,
            CodegenError::CodeBufferExhausted {
                offset: 3,
                needed: 2,
                capacity: 4
            }
        ));
        assert_eq!(buf.len(), 3);
        assert_eq!(mem, [9, 9, 9, 0]);
    }

    #[test]
    fn exact_fit_is_allowed() {
        let mut mem = [0u8; 4];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[1, 2, 3, 4]).unwrap();
        assert_eq!(buf.remaining(), 0);
        assert!(buf.ensure(0).is_ok());
        assert!(buf.ensure(1).is_err());
    }

    #[test]
    fn rel32_reserve_and_patch() {
        let mut mem = [0xaau8; 8];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[0x0f, 0x84]).unwrap();
        let at = buf.reserve_rel32().unwrap();
        assert_eq!(at, 2);
        assert_eq!(buf.bytes(), &[0x0f, 0x84, 0, 0, 0, 0]);
        buf.patch_rel32(at, -9).unwrap();
        assert_eq!(buf.bytes(), &[0x0f, 0x84, 0xf7, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn patch_outside_emitted_bytes_fails() {
        let mut mem = [0u8; 16];
        let mut buf = CodeBuffer::new(&mut mem);
        buf.put(&[0; 5]).unwrap();
        assert!(buf.patch_rel32(2, 1).is_err());
    }
}
