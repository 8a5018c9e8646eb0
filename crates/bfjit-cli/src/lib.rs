//! bfjit command line.
//!
//! `bfjit [OPTIONS] <PATH>` loads a program, compiles it to native code and
//! runs it with stdin and stdout as its byte streams. Diagnostics and logs go
//! to stderr so program output stays clean.

use std::io::{Read, Write};
use std::path::PathBuf;

use bfjit_compiler::{compile_to_report, load_source, run, source_map, Engine, RunOptions};
use bfjit_types::{
    Diagnostic, ErrorCode, Limits, SourceFile, DEFAULT_MAX_SOURCE_LEN, DEFAULT_TAPE_LEN,
};
use clap::{Parser, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

/// Exit status for any load, compile or run failure.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "bfjit", version)]
#[command(about = "Compile a Brainfuck program to x86-64 machine code and run it")]
pub struct Cli {
    /// Program source file
    pub path: PathBuf,

    /// Run with the reference interpreter instead of native code
    #[arg(long)]
    pub interpret: bool,

    /// Number of tape cells
    #[arg(long, value_name = "N", default_value_t = DEFAULT_TAPE_LEN, value_parser = parse_tape_len)]
    pub tape_len: usize,

    /// Largest accepted source file, in bytes
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_SOURCE_LEN)]
    pub max_source_len: usize,

    /// Print the JSON compile report to stdout instead of running
    #[arg(long)]
    pub report: bool,

    /// Write the JSON source map to FILE before running
    #[arg(long, value_name = "FILE")]
    pub source_map: Option<PathBuf>,

    /// How diagnostics are rendered on stderr
    #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
    pub error_format: ErrorFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Json,
}

fn parse_tape_len(s: &str) -> Result<usize, String> {
    let len: usize = s.parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    if len == 0 {
        return Err("the tape needs at least one cell".to_string());
    }
    Ok(len)
}

impl Cli {
    pub fn limits(&self) -> Limits {
        Limits {
            max_source_len: self.max_source_len,
            tape_len: self.tape_len,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        let engine = if self.interpret {
            Engine::Interpreter
        } else {
            Engine::Jit
        };
        RunOptions::new(engine, self.limits())
    }
}

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` filter.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Carry out one invocation and return the process exit status.
pub fn execute<W, R, E>(cli: &Cli, stdout: &mut W, stdin: &mut R, stderr: &mut E) -> u8
where
    W: Write,
    R: Read,
    E: Write,
{
    match try_execute(cli, stdout, stdin) {
        Ok(()) => 0,
        Err(diag) => {
            report_diagnostic(&diag, cli.error_format, stderr);
            EXIT_FAILURE
        }
    }
}

fn try_execute<W: Write, R: Read>(cli: &Cli, stdout: &mut W, stdin: &mut R) -> Result<(), Diagnostic> {
    let limits = cli.limits();
    let source = load_source(&cli.path, &limits).map_err(|e| e.to_diagnostic())?;

    if cli.report {
        return print_report(&source, stdout);
    }

    if let Some(path) = &cli.source_map {
        let map = source_map(&source).map_err(|e| e.to_diagnostic(&source))?;
        let map_failure = |e: String| {
            Diagnostic::new(
                path.display().to_string(),
                ErrorCode::HOST_IO,
                format!("cannot write source map: {e}"),
            )
        };
        let json = map.to_json().map_err(|e| map_failure(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| map_failure(e.to_string()))?;
        debug!(path = %path.display(), entries = map.len(), "wrote source map");
    }

    let options = cli.run_options();
    debug!(engine = ?options.engine, tape_len = limits.tape_len, "running");
    run(&source, &options, stdout, stdin).map_err(|e| e.to_diagnostic(&source))?;
    stdout
        .flush()
        .map_err(|e| Diagnostic::new(&source.name, ErrorCode::HOST_IO, e.to_string()))
}

fn print_report<W: Write>(source: &SourceFile, stdout: &mut W) -> Result<(), Diagnostic> {
    let report = compile_to_report(source);
    let io_failure = |e: String| Diagnostic::new(&source.name, ErrorCode::HOST_IO, e);
    let json = serde_json::to_string_pretty(&report).map_err(|e| io_failure(e.to_string()))?;
    writeln!(stdout, "{json}")
        .and_then(|()| stdout.flush())
        .map_err(|e| io_failure(e.to_string()))?;
    match report.diagnostic {
        Some(diag) => Err(diag),
        None => Ok(()),
    }
}

fn report_diagnostic<E: Write>(diag: &Diagnostic, format: ErrorFormat, stderr: &mut E) {
    let rendered = match format {
        ErrorFormat::Human => diag.to_string(),
        ErrorFormat::Json => serde_json::to_string(diag).unwrap_or_else(|_| diag.to_string()),
    };
    // Nothing useful is left to do if stderr itself is gone.
    let _ = writeln!(stderr, "{rendered}");
}
