//! splc - SPL to BASIC compiler CLI.
//!
//! Usage: `splc <input.spl> <output.bas>`. Exit code 0 on success; on
//! any failure one diagnostic line per error goes to stderr and the
//! exit code is non-zero. No output file is written on failure.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use splc_drv::{compile_file, Config};

/// SPL to BASIC compiler
#[derive(Parser, Debug)]
#[command(name = "splc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiles SPL source files to line-numbered BASIC", long_about = None)]
struct Cli {
    /// SPL source file
    input: PathBuf,

    /// Output BASIC file
    output: PathBuf,

    /// Line-number step in the generated BASIC
    #[arg(long, default_value_t = 10)]
    step: u32,

    /// Enable verbose output
    #[arg(short, long, env = "SPLC_VERBOSE")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {error}");
    }

    let config = Config { step: cli.step };
    match compile_file(&cli.input, &cli.output, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            for diagnostic in error.diagnostics() {
                eprintln!("{diagnostic}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize the logging system. `RUST_LOG` wins over the flag.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}
