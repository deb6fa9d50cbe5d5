//! condasetup CLI Entry Point
//!
//! Runs as a pipeline step. Inputs are read from the agent's `INPUT_*`
//! variables and can be overridden with flags.
//!
//! # Usage
//!
//! ```bash
//! # Create and activate an environment named "py311"
//! condasetup --environment-name py311 --package-specs "python=3.11 numpy"
//!
//! # Just put Conda on PATH and install into base
//! condasetup --package-specs pytest
//! ```

use std::env;
use std::process::ExitCode;

use log::info;

use condasetup::agent::{Agent, HttpDownloader, PipelineAgent};
use condasetup::config::CliAction;
use condasetup::environment::DeferredInstallLocation;
use condasetup::process::SystemRunner;
use condasetup::{run_task, Platform, SetupContext, TaskInputs, APP_NAME, VERSION};

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: condasetup [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --environment-name NAME   Create and activate <conda>/envs/NAME");
    println!("  --package-specs SPECS     Packages to install, e.g. \"numpy=1.2 scipy\"");
    println!("  --create-options FLAGS    Extra flags for 'conda create'");
    println!("  --install-options FLAGS   Extra flags for 'conda install' into base");
    println!("  --clean-environment       Delete the environment before creating it");
    println!("  --no-custom-environment   Use the base environment");
    println!("  --no-update-conda         Skip 'conda update'");
    println!("  --verbose                 Enable debug logging");
    println!("  --help                    Show this help message");
    println!("  --version                 Show version information");
    println!();
    println!("Each option can also be given as an INPUT_* variable, e.g. INPUT_ENVIRONMENTNAME.");
}

/// Main application entry point.
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut inputs = TaskInputs::from_env()?;
    let verbose = match inputs.apply_args(&args)? {
        CliAction::Help => {
            print_usage();
            return Ok(());
        }
        CliAction::Version => {
            println!("{} {}", APP_NAME, VERSION);
            return Ok(());
        }
        CliAction::Run { verbose } => verbose,
    };

    setup_logging(verbose);

    let platform = Platform::current();
    info!("{} v{} on {}", APP_NAME, VERSION, platform);

    let agent = PipelineAgent;
    let location = DeferredInstallLocation::new(move || agent.tools_directory());
    let downloader = HttpDownloader::new();

    let ctx = SetupContext {
        agent: &agent,
        downloader: &downloader,
        runner: &SystemRunner,
        location: &location,
        platform,
    };

    let outcome = run_task(&inputs, &ctx).await?;

    info!(
        "Conda at {} is ready; active environment '{}' ({})",
        outcome.root.display(),
        outcome.environment,
        outcome.prefix.display()
    );
    Ok(())
}

// Single-threaded: PipelineAgent mutates the process environment.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
