//! x86-64 instruction templates and register assignment.
//!
//! Generated code keeps three values in callee-saved registers for its whole
//! lifetime, bound once in the prologue and never reassigned:
//!
//! | Register | Holds                         | Bound from |
//! |----------|-------------------------------|------------|
//! | `rbx`    | tape pointer                  | `rdi`      |
//! | `r12`    | output bridge record address  | `rsi`      |
//! | `r13`    | input bridge record address   | `rdx`      |
//!
//! Bridge calls follow System V: the bridge record goes in `rdi`, the cell
//! value in `esi`, the result comes back in `al`. The frame keeps `rsp`
//! 16-byte aligned at every call site.

/// Largest template emitted for a single instruction (`,`).
pub const MAX_BYTES_PER_INSTRUCTION: usize = 12;

/// Width of a branch displacement field.
pub const REL32_LEN: usize = 4;

// ── Execution shell ──────────────────────────────────────────────────────────

pub const PROLOGUE: [u8; 22] = [
    0x55, //                   push rbp
    0x48, 0x89, 0xe5, //       mov rbp, rsp
    0x53, //                   push rbx
    0x41, 0x54, //             push r12
    0x41, 0x55, //             push r13
    0x48, 0x83, 0xec, 0x08, // sub rsp, 8
    0x48, 0x89, 0xfb, //       mov rbx, rdi
    0x49, 0x89, 0xf4, //       mov r12, rsi
    0x49, 0x89, 0xd5, //       mov r13, rdx
];

pub const EPILOGUE: [u8; 11] = [
    0x48, 0x83, 0xc4, 0x08, // add rsp, 8
    0x41, 0x5d, //             pop r13
    0x41, 0x5c, //             pop r12
    0x5b, //                   pop rbx
    0x5d, //                   pop rbp
    0xc3, //                   ret
];

/// Bytes the shell adds around any program body.
pub const PROLOGUE_EPILOGUE_SIZE: usize = PROLOGUE.len() + EPILOGUE.len();

// ── Tape pointer ─────────────────────────────────────────────────────────────

/// `inc rbx`
pub const INC_PTR: [u8; 3] = [0x48, 0xff, 0xc3];
/// `dec rbx`
pub const DEC_PTR: [u8; 3] = [0x48, 0xff, 0xcb];

// ── Cell arithmetic (wraps natively) ─────────────────────────────────────────

/// `inc byte [rbx]`
pub const INC_CELL: [u8; 2] = [0xfe, 0x03];
/// `dec byte [rbx]`
pub const DEC_CELL: [u8; 2] = [0xfe, 0x0b];

// ── Bridge calls ─────────────────────────────────────────────────────────────

pub const OUTPUT: [u8; 10] = [
    0x0f, 0xb6, 0x33, //       movzx esi, byte [rbx]
    0x4c, 0x89, 0xe7, //       mov rdi, r12
    0x41, 0xff, 0x14, 0x24, // call [r12]
];

pub const INPUT: [u8; 12] = [
    0x0f, 0xb6, 0x33, //       movzx esi, byte [rbx]
    0x4c, 0x89, 0xef, //       mov rdi, r13
    0x41, 0xff, 0x55, 0x00, // call [r13 + 0]
    0x88, 0x03, //             mov [rbx], al
];

// ── Loops ────────────────────────────────────────────────────────────────────
// Each is followed by a rel32 field, patched once the target is known.

pub const LOOP_OPEN: [u8; 5] = [
    0x80, 0x3b, 0x00, // cmp byte [rbx], 0
    0x0f, 0x84, //       je rel32
];

pub const LOOP_CLOSE: [u8; 5] = [
    0x80, 0x3b, 0x00, // cmp byte [rbx], 0
    0x0f, 0x85, //       jne rel32
];

/// Bytes of code needed to compile a program of `source_len` bytes.
///
/// Every source byte is assumed to be the widest instruction, so the result
/// bounds any program of that length.
pub fn capacity_for(source_len: usize) -> usize {
    source_len
        .saturating_mul(MAX_BYTES_PER_INSTRUCTION)
        .saturating_add(PROLOGUE_EPILOGUE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_covers_every_template() {
        let loop_len = LOOP_OPEN.len() + REL32_LEN;
        for len in [
            INC_PTR.len(),
            DEC_PTR.len(),
            INC_CELL.len(),
            DEC_CELL.len(),
            OUTPUT.len(),
            INPUT.len(),
            loop_len,
        ] {
            assert!(len <= MAX_BYTES_PER_INSTRUCTION);
        }
        assert_eq!(INPUT.len(), MAX_BYTES_PER_INSTRUCTION);
    }

    #[test]
    fn test_capacity_for() {
        assert_eq!(capacity_for(0), 33);
        assert_eq!(capacity_for(10_000), 120_033);
        assert_eq!(capacity_for(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_frame_keeps_stack_aligned() {
        // Entry leaves rsp at 8 mod 16; four pushes plus `sub rsp, 8` must
        // bring it back to 0 mod 16 before any bridge call.
        let pushes = 4 * 8;
        let sub = PROLOGUE[12] as usize;
        assert_eq!((8 + pushes + sub) % 16, 0);
        assert_eq!(EPILOGUE[3], PROLOGUE[12]);
    }
}
