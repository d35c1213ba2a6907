// SPDX-License-Identifier: Apache-2.0
//! Worldloom CLI entrypoint.
//!
//! Converts a Classic schematic file into a ClassicWorld file written
//! alongside it:
//!
//! ```text
//! worldloom --path maps/island.schematic
//! ```
//!
//! Ctrl+C cancels the in-flight conversion cooperatively. The process
//! exits with code `0` on success and `1` on failure; diagnostics go to
//! stderr (filterable via `RUST_LOG`), the destination path to stdout.

#![deny(rust_2018_idioms)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]
// The CLI is expected to print to stdout/stderr.
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use worldloom_core::{convert, CancelHandle};

#[derive(Parser, Debug)]
#[command(author, version, about = "Converts Classic schematic files to ClassicWorld files")]
struct Args {
    /// The source path of the Classic schematic file
    #[arg(long, short)]
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(args).await
}

async fn run(args: Args) -> ExitCode {
    let Some(path) = args.path.filter(|path| !path.as_os_str().is_empty()) else {
        eprintln!("{}", "Please specify a valid path.".red());
        return ExitCode::FAILURE;
    };

    let cancel = CancelHandle::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("received Ctrl+C, cancelling");
            signal_cancel.trigger();
        }
    });

    let name = path
        .file_stem()
        .map_or_else(|| String::from("world"), |stem| stem.to_string_lossy().into_owned());
    println!("Started converting '{name}'...");

    match convert(&path, &cancel).await {
        Ok(destination) => {
            println!();
            println!("{}", "Finished converting. File has been saved at:".green());
            println!("{}", destination.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!();
            eprintln!("{}", error.to_string().red());
            ExitCode::FAILURE
        }
    }
}
