//! KPaper delivery CLI
//!
//! Build-side manifest generation and load-side dependency resolution for
//! Paper plugins built on KPaper.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::ResolveOptions;
use context::ProjectContext;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(project = %cli.project.display(), "starting");

    match cli.command {
        Some(cmd) => {
            let context = ProjectContext::load(&cli.project)?;
            execute_command(&context, cmd)
        }
        None => {
            println!("{} KPaper plugin delivery", "kpaper".green().bold());
            println!();
            println!("Run {} for available commands.", "kpaper --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(context: &ProjectContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Generate => commands::run_generate(context).map(drop),
        Commands::Index => commands::run_index(context).map(drop),
        Commands::Embed => commands::run_embed(context).map(drop),
        Commands::Build => commands::run_build(context),
        Commands::Resolve {
            cache,
            resources,
            dry_run,
            json,
            timeout,
            retry_window,
        } => cmd_resolve(
            context,
            ResolveOptions {
                cache,
                resources,
                dry_run,
                json,
                timeout: Duration::from_secs(timeout),
                retry_window: retry_window.map(Duration::from_secs),
            },
        ),
        Commands::Config { json } => commands::run_config_show(context, json),
    }
}

fn cmd_resolve(context: &ProjectContext, options: ResolveOptions) -> Result<()> {
    if options.timeout.is_zero() {
        return Err(CliError::user("--timeout must be at least one second"));
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(commands::run_resolve(context, &options))
}
