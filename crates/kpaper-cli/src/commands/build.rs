//! Full build pipeline command

use colored::Colorize;

use crate::commands::{run_embed, run_generate, run_index};
use crate::context::ProjectContext;
use crate::error::Result;

/// Generate, index and embed, in that order.
pub fn run_build(context: &ProjectContext) -> Result<()> {
    run_generate(context)?;
    run_index(context)?;
    run_embed(context)?;

    println!();
    println!(
        "{} Resources ready in {}",
        "OK".green().bold(),
        context.resources_dir().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpaper_manifest::{DEPENDENCIES_FILE, EXTENSIONS_FILE};
    use kpaper_test_utils::TestProject;
    use kpaper_test_utils::project::RESOURCES_DIR;

    #[test]
    fn test_build_populates_resources() {
        let project = TestProject::new();
        project.write_kotlin("cc.modlabs.listeners", "Join", "class Join : Listener");
        let context = ProjectContext::load(project.root()).unwrap();

        run_build(&context).unwrap();

        project.assert_file_exists(&format!("{RESOURCES_DIR}/{DEPENDENCIES_FILE}"));
        project.assert_file_contains(
            &format!("{RESOURCES_DIR}/{EXTENSIONS_FILE}"),
            "listener cc.modlabs.listeners.Join",
        );
    }
}
