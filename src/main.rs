//! rowgate CLI entry point
//!
//! Parses arguments and delegates to the CLI module. Errors go to stderr
//! with a non-zero exit.

use rowgate::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e.report());
        std::process::exit(1);
    }
}
