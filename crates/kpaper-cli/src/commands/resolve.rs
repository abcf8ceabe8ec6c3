//! Dependency resolution command

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use kpaper_loader::{ClasspathAdditions, LoaderPhase, MavenResolver, PreparedSession, RetryPolicy};
use kpaper_manifest::RepositoryDescriptor;
use serde_json::json;

use crate::context::ProjectContext;
use crate::error::Result;

/// Flags of the `resolve` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub cache: Option<PathBuf>,
    pub resources: Option<PathBuf>,
    pub dry_run: bool,
    pub json: bool,
    pub timeout: Duration,
    pub retry_window: Option<Duration>,
}

/// Run the loader phase against the packaged resources.
pub async fn run_resolve(context: &ProjectContext, options: &ResolveOptions) -> Result<()> {
    let resources = options
        .resources
        .clone()
        .unwrap_or_else(|| context.resources_dir());
    let cache = options.cache.clone().unwrap_or_else(|| context.cache_dir());

    let resolver = MavenResolver::with_policy(
        cache,
        RetryPolicy {
            timeout: options.timeout,
            retry_window: options.retry_window,
        },
    )?;
    let phase = LoaderPhase::new(resources, RepositoryDescriptor::default_mirror(), resolver);

    if options.dry_run {
        let prepared = phase.prepare()?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&session_json(&prepared))?);
        } else {
            print_session(&prepared);
        }
        return Ok(());
    }

    if !options.json {
        println!("{} Resolving dependencies...", "=>".blue().bold());
    }
    let additions = phase.run().await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&additions_json(&additions))?);
    } else {
        println!(
            "{} Resolved {} artifacts",
            "OK".green().bold(),
            additions.len()
        );
        for artifact in additions.artifacts() {
            let source = artifact.repository.as_deref().unwrap_or("cache");
            println!(
                "   {} {} {} {}",
                "+".green(),
                artifact.coordinate,
                format!("({source})").dimmed(),
                artifact.path.display()
            );
        }
    }
    Ok(())
}

fn print_session(prepared: &PreparedSession) {
    println!("{}", "Resolver Session".bold());
    println!();

    println!("  {}:", "Dependencies".dimmed());
    for coordinate in prepared.session.dependencies() {
        println!("    {} {}", "+".green(), coordinate);
    }
    println!();

    println!("  {}:", "Repositories".dimmed());
    for repository in prepared.session.repositories() {
        println!("    {} {} {}", "+".green(), repository.id.cyan(), repository.url);
    }
    for rejected in &prepared.rejected {
        println!(
            "    {} {} {}",
            "!".red(),
            rejected.repository,
            format!("({})", rejected.reason).dimmed()
        );
    }
    if prepared.custom_repositories.is_none() {
        println!("    {}", "(no repository manifest)".dimmed());
    }
}

fn session_json(prepared: &PreparedSession) -> serde_json::Value {
    json!({
        "dependencies": prepared
            .session
            .dependencies()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        "repositories": prepared
            .session
            .repositories()
            .iter()
            .map(|r| json!({ "id": r.id, "url": r.url.as_str() }))
            .collect::<Vec<_>>(),
        "custom_repositories": prepared.custom_repositories,
        "rejected": prepared
            .rejected
            .iter()
            .map(|r| json!({ "repository": r.repository.to_string(), "reason": r.reason }))
            .collect::<Vec<_>>(),
    })
}

fn additions_json(additions: &ClasspathAdditions) -> serde_json::Value {
    json!({
        "artifacts": additions
            .artifacts()
            .iter()
            .map(|a| json!({
                "coordinate": a.coordinate.to_string(),
                "path": a.path.display().to_string(),
                "repository": a.repository,
            }))
            .collect::<Vec<_>>(),
    })
}
