//! CLI module for chirpstore
//!
//! Thin command-line surface over the collection managers; every
//! invocation prints exactly one JSON object.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, PostAction, UserAction};
pub use commands::{execute, resolve_config, run};
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
