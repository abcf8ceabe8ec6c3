//! Manifest generation command

use colored::Colorize;
use kpaper_manifest::{GenerationReport, ManifestGenerator, Project};

use crate::context::ProjectContext;
use crate::error::Result;

/// Write `.dependencies` (and `.repositories` when declared) into the
/// generated resources directory.
pub fn run_generate(context: &ProjectContext) -> Result<GenerationReport> {
    println!("{} Generating delivery manifests...", "=>".blue().bold());

    let config = context.config();
    let project = Project::from_config(config)?;
    let generator = ManifestGenerator::new(config.target());
    let report = generator.generate(&project.configurations(), &config.deliver);

    for skipped in &report.skipped {
        println!(
            "   {} {} skipped: {}",
            "!".yellow(),
            skipped.name.cyan(),
            skipped.reason
        );
    }

    let written = generator.write(&context.generated_dir(), &report, &config.repositories())?;

    println!(
        "{} Wrote {} dependencies",
        "OK".green().bold(),
        written.dependencies
    );
    for coordinate in report.dependencies.iter() {
        println!("   {} {}", "+".green(), coordinate);
    }
    match written.repositories {
        Some(count) => println!("   {} {} custom repositories", "+".green(), count),
        None => println!("   {}", "no custom repositories".dimmed()),
    }

    Ok(report)
}
