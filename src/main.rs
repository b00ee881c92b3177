//! CLI binary for `todo_live`.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the library.

use clap::Parser;
use std::process::ExitCode;
use todo_live::cli::{self, Cli};
use todo_live::{logging, paths, ClientConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging();

    let output = cli::run(cli.command).await;

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}

/// Send logs to the data directory; problems here never stop the command.
fn init_logging() {
    let Ok(data_dir) = paths::data_dir() else {
        return;
    };
    let debug = ClientConfig::load_from(&data_dir)
        .ok()
        .flatten()
        .is_some_and(|config| config.debug_logging);
    if let Err(e) = logging::init(&data_dir, debug) {
        eprintln!("Warning: could not open log file: {e}");
        return;
    }
    logging::install_panic_hook();
}
