//! vctools CLI - Visual Studio C++ tools runner

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vctools::toolchain::{Locator, DEFAULT_PLATFORM};
use vctools::util::config::{global_config_path, load_config, project_config_path};
use vctools::VcError;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("vctools=debug")
    } else {
        EnvFilter::new("vctools=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Flags win over project config, which wins over global config
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    let version_name = cli.version_name.or(config.defaults.version.clone());
    let platform = cli
        .target_platform
        .or(config.defaults.target_platform.clone())
        .unwrap_or_else(|| DEFAULT_PLATFORM.to_string());

    let tools = Locator::new()
        .version(version_name.as_deref())
        .platform(&platform)
        .encoding(config.encoding())
        .locate()
        .context("failed to locate a Visual C++ toolchain")?;

    if cli.print_env {
        return commands::env::execute(&tools);
    }

    let command = cli
        .command
        .as_deref()
        .ok_or_else(|| anyhow!("no command given"))?;

    commands::exec::execute(&tools, command, &cli.args)
}

/// Exit with the tool's own status when it failed, 1 otherwise.
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<VcError>() {
        Some(VcError::CommandFailed { code: Some(code), .. }) if *code != 0 => *code,
        _ => 1,
    }
}
