//! devtools CLI entry point
//!
//! Parses arguments, runs the command and reports the outcome:
//! - an empty problem list prints a success line and exits 0
//! - problems are listed and the process exits 1
//! - errors are shown with context and suggestions and the process exits 1

use anyhow::Result;
use clap::Parser;
use conan_devtools::cli;
use conan_devtools::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(problems) => {
            if !cli::common::report(&problems) {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
