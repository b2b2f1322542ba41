//! chirpstore CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`. Failures are reported
//! as a JSON error object and a non-zero exit code.

use chirpstore::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code(), &e.to_string());
        std::process::exit(1);
    }
}
