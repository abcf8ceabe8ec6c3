//! Configuration display command

use colored::Colorize;

use crate::context::ProjectContext;
use crate::error::Result;

/// Print the effective configuration, defaults filled in.
pub fn run_config_show(context: &ProjectContext, json: bool) -> Result<()> {
    let config = context.config();

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Build Configuration".bold());
    println!("{}", format!("# {}", context.root().display()).dimmed());
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
