//! # snapcmp CLI
//!
//! Command-line interface for snapshot reconciliation.
//!
//! ## Usage
//! ```bash
//! snapcmp compare files /mnt/laptop /mnt/backup --singles-only
//! snapcmp scan /mnt/backup --save backup.json
//! snapcmp info backup.json --find '\.iso$'
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
