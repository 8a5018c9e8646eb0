/// The cell tape: a fixed-length array of wrapping byte cells.
///
/// The tape never grows. Cells start at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Box<[u8]>,
}

impl Tape {
    /// Create a zeroed tape of `len` cells.
    pub fn new(len: usize) -> Self {
        Self {
            cells: vec![0u8; len].into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Base address handed to generated code.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.cells.as_mut_ptr()
    }

    /// The cells up to and including the last nonzero one.
    ///
    /// Handy for comparing two tapes without printing 30 000 zeros.
    pub fn used(&self) -> &[u8] {
        let end = self
            .cells
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.cells[..end]
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(crate::DEFAULT_TAPE_LEN)
    }
}
