//! Extension registry command

use colored::Colorize;
use kpaper_registry::{Capability, IndexReport, SourceIndex};

use crate::context::ProjectContext;
use crate::error::Result;

/// Scan the project sources and write `.extensions` into the generated
/// resources directory.
pub fn run_index(context: &ProjectContext) -> Result<IndexReport> {
    println!("{} Indexing extension classes...", "=>".blue().bold());

    let index = SourceIndex::new(context.config().registration_base_package.as_str())?;
    let report = index.scan_project(context.root())?;

    for skipped in &report.skipped {
        println!(
            "   {} {} ({})",
            "-".yellow(),
            skipped.candidate.class_name.cyan(),
            skipped.reason.to_string().dimmed()
        );
    }

    report.registry.write_to(&context.generated_dir())?;

    println!(
        "{} Indexed {} commands and {} listeners from {} files",
        "OK".green().bold(),
        report.registry.classes(Capability::Command).count(),
        report.registry.classes(Capability::Listener).count(),
        report.files_scanned
    );

    Ok(report)
}
