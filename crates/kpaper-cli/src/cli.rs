//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// KPaper delivery - Manifest generation and dependency resolution for Paper plugins
#[derive(Parser, Debug)]
#[command(name = "kpaper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Plugin project root
    #[arg(short, long, global = true, env = "KPAPER_PROJECT", default_value = ".")]
    pub project: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write the dependency and repository manifests
    ///
    /// Aggregates the KPaper library across resolvable configurations,
    /// adds the `deliver` list from kpaper.toml and writes the result to
    /// build/generated-resources/.
    Generate,

    /// Index command and listener classes into the extension registry
    Index,

    /// Copy manifests into the packaged resources and patch paper-plugin.yml
    Embed,

    /// Run generate, index and embed in order
    Build,

    /// Resolve the embedded dependency manifest
    ///
    /// Examples:
    ///   kpaper resolve --dry-run         # Show what would be resolved
    ///   kpaper resolve --cache ~/.m2c    # Download into a custom cache
    Resolve {
        /// Directory artifacts are cached in
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Resources directory to read manifests from
        #[arg(long)]
        resources: Option<PathBuf>,

        /// Print the resolver session without downloading
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 120)]
        timeout: u64,

        /// Retry transient failures for up to this many seconds
        #[arg(long)]
        retry_window: Option<u64>,
    },

    /// Show the effective build configuration
    Config {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_flags() {
        let cli = Cli::parse_from([
            "kpaper",
            "--project",
            "plugin",
            "resolve",
            "--dry-run",
            "--retry-window",
            "30",
        ]);
        assert_eq!(cli.project, PathBuf::from("plugin"));
        assert_eq!(
            cli.command,
            Some(Commands::Resolve {
                cache: None,
                resources: None,
                dry_run: true,
                json: false,
                timeout: 120,
                retry_window: Some(30),
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["kpaper", "build", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.command, Some(Commands::Build));
    }
}
