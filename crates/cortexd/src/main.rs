use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cortexd::{BootstrapOptions, run_daemon};
use cortexd_config::{DEFAULT_CONFIG_PATH, LogFormat};

/// Cortex system daemon.
#[derive(Debug, Parser)]
#[command(name = "cortexd", version, about)]
struct Cli {
    /// Configuration file loaded at start-up and on reload.
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Log output format.
    #[arg(long, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = BootstrapOptions {
        config_path: cli.config,
        log_format: cli.log_format,
    };
    match run_daemon(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("cortexd: {error}");
            ExitCode::FAILURE
        }
    }
}
