use std::io::{self, Read};

/// Byte-at-a-time reader with a latched end of input.
///
/// Once the underlying reader reports end of input (or fails), every later
/// call returns `Ok(None)` without touching the reader again, so a `,`
/// executed after exhaustion never blocks.
#[derive(Debug)]
pub struct ByteInput<R> {
    reader: R,
    exhausted: bool,
}

impl<R: Read> ByteInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            exhausted: false,
        }
    }

    /// Read the next byte, or `None` at end of input.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Yields its bytes, then EOF, then more bytes: a terminal after Ctrl-D.
    struct Reopening {
        chunks: Vec<&'static [u8]>,
    }

    impl Read for Reopening {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            if chunk.is_empty() {
                return Ok(0);
            }
            buf[0] = chunk[0];
            Ok(1)
        }
    }

    struct Interrupting {
        interrupted: bool,
    }

    impl Read for Interrupting {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::ErrorKind::Interrupted.into());
            }
            buf[0] = b'z';
            Ok(1)
        }
    }

    #[test]
    fn test_reads_bytes_then_none() {
        let mut input = ByteInput::new(&b"AB"[..]);
        assert_eq!(input.next_byte().unwrap(), Some(b'A'));
        assert_eq!(input.next_byte().unwrap(), Some(b'B'));
        assert_eq!(input.next_byte().unwrap(), None);
        assert!(input.is_exhausted());
    }

    #[test]
    fn test_end_of_input_is_latched() {
        let mut input = ByteInput::new(Reopening {
            chunks: vec![&b"x"[..], &b""[..], &b"y"[..]],
        });
        assert_eq!(input.next_byte().unwrap(), Some(b'x'));
        assert_eq!(input.next_byte().unwrap(), None);
        assert_eq!(input.next_byte().unwrap(), None);
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut input = ByteInput::new(Interrupting { interrupted: false });
        assert_eq!(input.next_byte().unwrap(), Some(b'z'));
    }
}
