//! # Okaybruh Shop Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  main.rs ────► logging, argument parsing, exit code                     │
//! │  lib.rs ─────► config → Shop::open → command → render → Shop::close     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Command output goes to stdout; logs and error notices go to stderr.

use std::process::ExitCode;

use clap::Parser;
use okaybruh_shop::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    okaybruh_shop::init_tracing();

    let cli = Cli::parse();
    match okaybruh_shop::run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e.message);
            ExitCode::FAILURE
        }
    }
}
