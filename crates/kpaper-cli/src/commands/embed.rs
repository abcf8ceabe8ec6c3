//! Resource embedding command

use colored::Colorize;
use kpaper_manifest::{DEPENDENCIES_FILE, DescriptorPatch, EmbedReport, Embedder};

use crate::context::{GENERATED_DIR, ProjectContext};
use crate::error::{CliError, Result};

/// Copy the generated manifests into the packaged resources and patch
/// `paper-plugin.yml` there.
pub fn run_embed(context: &ProjectContext) -> Result<EmbedReport> {
    if !context.generated_dir().join(DEPENDENCIES_FILE).is_file() {
        return Err(CliError::user(format!(
            "no {DEPENDENCIES_FILE} in {GENERATED_DIR}; run `kpaper generate` first"
        )));
    }

    println!("{} Embedding manifests...", "=>".blue().bold());

    let embedder = Embedder::new(
        context.generated_dir(),
        context.resources_dir(),
        context.config().entry_points(),
    );
    let report = embedder.embed()?;

    for name in &report.copied {
        println!("   {} {}", "+".green(), name);
    }
    for name in &report.removed {
        println!("   {} {} {}", "-".red(), name, "(stale)".dimmed());
    }

    match &report.descriptor {
        DescriptorPatch::Missing => println!(
            "{} No paper-plugin.yml in resources; descriptor not patched",
            "WARN".yellow().bold()
        ),
        DescriptorPatch::Unchanged => {
            println!("{} Descriptor already declares its entry points", "OK".green().bold())
        }
        DescriptorPatch::Appended(keys) => println!(
            "{} Added {} to paper-plugin.yml",
            "OK".green().bold(),
            keys.join(", ")
        ),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run_generate;
    use kpaper_test_utils::TestProject;
    use kpaper_test_utils::project::RESOURCES_DIR;

    #[test]
    fn test_embed_requires_generated_manifest() {
        let project = TestProject::new();
        let context = ProjectContext::load(project.root()).unwrap();

        let err = run_embed(&context).unwrap_err();
        assert!(err.to_string().contains("kpaper generate"));
    }

    #[test]
    fn test_embed_patches_descriptor() {
        let project = TestProject::new();
        project.write_descriptor("name: Demo\nloader: com.custom.Loader\n");
        let context = ProjectContext::load(project.root()).unwrap();
        run_generate(&context).unwrap();

        let report = run_embed(&context).unwrap();

        assert_eq!(report.descriptor, DescriptorPatch::Appended(vec!["bootstrapper"]));
        let descriptor = project.read_file(&format!("{RESOURCES_DIR}/paper-plugin.yml"));
        assert!(descriptor.contains("loader: com.custom.Loader"));
        assert!(descriptor.contains("bootstrapper: cc.modlabs.registration.CommandBootstrapper"));
    }
}
