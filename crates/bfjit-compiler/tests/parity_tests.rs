//! JIT / interpreter parity and re-compilation determinism.
//!
//! Every program here runs under both engines; output and final tape must
//! match byte for byte. Native runs are gated on x86-64 Unix hosts.

use bfjit_compiler::{compile_to_report, run, Engine, RunOptions};
use bfjit_types::{Limits, SourceFile, Tape};

// ══════════════════════════════════════════════════════════════════════════════
// Programs
// ══════════════════════════════════════════════════════════════════════════════

const HELLO: &str = "++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]>>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.";

/// (name, source, input)
const PROGRAMS: &[(&str, &str, &[u8])] = &[
    ("multiply", "++++++++[>++++++++<-]>.", b""),
    ("read_three", ",.,.,.", b"AB"),
    ("read_three_cells", ",.>,.>,.", b"AB"),
    ("nested", "++[>++[>++<-]<-]", b""),
    ("hello", HELLO, b""),
    ("echo", ",[.[-],]", b"parity\n"),
    ("wrap_up", "-.+.", b""),
    ("wrap_down", "+[+]-.", b""),
    ("reverse", ">,[>,]<[.<]", b"olleh"),
    ("commented", "copy cell: +++++[->+>+<<]>>.", b""),
    ("skipped_loop", "[->+<].", b""),
];

fn run_with(engine: Engine, source: &str, input: &[u8]) -> (Vec<u8>, Tape) {
    let sf = SourceFile::new("parity.b", source);
    let options = RunOptions::new(engine, Limits::default());
    let mut output = Vec::new();
    let mut input = input;
    let tape = run(&sf, &options, &mut output, &mut input)
        .unwrap_or_else(|e| panic!("{engine:?} run failed: {e}"));
    (output, tape)
}

// ══════════════════════════════════════════════════════════════════════════════
// Interpreter expectations (any host)
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn interpreter_expected_outputs() {
    let cases: &[(&str, &[u8], &[u8])] = &[
        ("++++++++[>++++++++<-]>.", b"", &[64]),
        (",.,.,.", b"AB", b"ABB"),
        (",.>,.>,.", b"AB", b"AB\0"),
        (HELLO, b"", b"Hello World!\n"),
        (">,[>,]<[.<]", b"olleh", b"hello"),
        ("-.+.", b"", &[255, 0]),
    ];
    for (source, input, expected) in cases {
        let (out, _) = run_with(Engine::Interpreter, source, input);
        assert_eq!(&out, expected, "program {source:?}");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Re-compilation determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn recompilation_gives_identical_digests() {
    for (name, source, _) in PROGRAMS {
        let sf = SourceFile::new(*name, *source);
        let first = compile_to_report(&sf);
        assert!(first.success, "{name} failed to compile");
        for i in 0..10 {
            let again = compile_to_report(&sf);
            assert_eq!(again.code_sha256, first.code_sha256, "{name}: digest changed at iteration {i}");
        }
    }
}

#[test]
fn longest_program_fits_its_capacity() {
    let source = ">".repeat(Limits::default().max_source_len);
    let report = compile_to_report(&SourceFile::new("walk.b", source));
    assert!(report.success);
    assert!(report.code_len.unwrap() <= report.capacity);
}

// ══════════════════════════════════════════════════════════════════════════════
// Native parity
// ══════════════════════════════════════════════════════════════════════════════

#[cfg(all(unix, target_arch = "x86_64"))]
mod native {
    use super::*;
    use bfjit_compiler::compile;

    #[test]
    fn engines_agree_on_every_program() {
        for (name, source, input) in PROGRAMS {
            let (jit_out, jit_tape) = run_with(Engine::Jit, source, input);
            let (ref_out, ref_tape) = run_with(Engine::Interpreter, source, input);
            assert_eq!(jit_out, ref_out, "{name}: output differs");
            assert_eq!(jit_tape, ref_tape, "{name}: tape differs");
        }
    }

    #[test]
    fn nested_loops_leave_identical_tapes() {
        let (_, jit) = run_with(Engine::Jit, "++[>++[>++<-]<-]", b"");
        let (_, reference) = run_with(Engine::Interpreter, "++[>++[>++<-]<-]", b"");
        assert_eq!(jit.used(), &[0, 0, 8]);
        assert_eq!(jit, reference);
    }

    #[test]
    fn recompiled_program_gives_identical_code_and_output() {
        let sf = SourceFile::new("hello.b", HELLO);
        let first = compile(&sf).unwrap();
        let second = compile(&sf).unwrap();
        assert_eq!(first.code(), second.code());

        let (a, _) = run_with(Engine::Jit, HELLO, b"");
        let (b, _) = run_with(Engine::Jit, HELLO, b"");
        assert_eq!(a, b);
    }

    #[test]
    fn compiled_code_digest_matches_report() {
        let sf = SourceFile::new("multiply.b", "++++++++[>++++++++<-]>.");
        let program = compile(&sf).unwrap();
        let report = compile_to_report(&sf);
        assert_eq!(
            report.code_sha256.as_deref(),
            Some(bfjit_compiler::code_digest(program.code()).as_str())
        );
    }

    #[test]
    fn longest_pointer_walk_runs() {
        let source = ">".repeat(Limits::default().max_source_len);
        let (out, tape) = run_with(Engine::Jit, &source, b"");
        assert!(out.is_empty());
        assert!(tape.used().is_empty());
    }
}
