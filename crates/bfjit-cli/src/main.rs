use std::io;
use std::process::ExitCode;

use bfjit_cli::Cli;
use clap::Parser;

fn main() -> ExitCode {
    bfjit_cli::init_logging();
    let cli = Cli::parse();

    let stdout = io::stdout();
    let stdin = io::stdin();
    let status = bfjit_cli::execute(&cli, &mut stdout.lock(), &mut stdin.lock(), &mut io::stderr());
    ExitCode::from(status)
}
