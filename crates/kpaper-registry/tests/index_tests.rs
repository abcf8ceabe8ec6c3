//! Source index and bootstrapper tests against on-disk plugin projects

use kpaper_loader::ClasspathAdditions;
use kpaper_registry::{
    Bootstrapper, Capability, CommandBuilder, CommandNode, CommandRegistrar, Extension,
    ExtensionCatalog, HostError, RegistryManifest, SkipReason, SourceIndex,
};
use kpaper_test_utils::TestProject;
use kpaper_test_utils::project::GENERATED_DIR;
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Stub;

impl CommandBuilder for Stub {
    fn register(&self) -> CommandNode {
        CommandNode::literal("stub")
    }
}

impl Extension for Stub {
    fn into_command(self: Box<Self>) -> Option<Box<dyn CommandBuilder>> {
        Some(self)
    }
}

#[derive(Default)]
struct Recorder(Vec<String>);

impl CommandRegistrar for Recorder {
    fn register(
        &mut self,
        node: CommandNode,
        _description: String,
        _aliases: Vec<String>,
    ) -> Result<(), HostError> {
        self.0.push(node.literal);
        Ok(())
    }
}

fn sample_project() -> TestProject {
    let project = TestProject::new();
    project.write_kotlin(
        "cc.modlabs.commands",
        "Ping",
        "class Ping : CommandBuilder {\n    override fun register() = literal(\"ping\")\n}",
    );
    project.write_kotlin(
        "cc.modlabs.commands.admin",
        "Ban",
        "class Ban(val reason: String = \"\") : CommandBuilder",
    );
    project.write_kotlin(
        "cc.modlabs.commands",
        "BaseCommand",
        "abstract class BaseCommand : CommandBuilder",
    );
    project.write_kotlin("cc.modlabs.commandsExtra", "Foo", "class Foo : CommandBuilder");
    project.write_java(
        "cc.modlabs.listeners",
        "JoinListener",
        "public class JoinListener implements Listener {\n}",
    );
    project.write_kotlin("cc.modlabs.util", "Strings", "object Strings");
    project
}

#[test]
fn registry_contains_exactly_matching_classes() {
    let project = sample_project();
    let report = SourceIndex::new("cc.modlabs")
        .unwrap()
        .scan_project(project.root())
        .unwrap();

    assert_eq!(
        report.registry.render(),
        "command cc.modlabs.commands.Ping\n\
         command cc.modlabs.commands.admin.Ban\n\
         listener cc.modlabs.listeners.JoinListener\n"
    );
    assert_eq!(report.files_scanned, 6);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(
        report.skipped[0].candidate.class_name,
        "cc.modlabs.commands.BaseCommand"
    );
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::NotConcrete("abstract class")
    );
}

#[test]
fn sibling_package_never_registered() {
    let project = sample_project();
    let report = SourceIndex::new("cc.modlabs")
        .unwrap()
        .scan_project(project.root())
        .unwrap();

    assert!(!report.registry.contains("cc.modlabs.commandsExtra.Foo", Capability::Command));
    assert!(
        report
            .skipped
            .iter()
            .all(|s| s.candidate.class_name != "cc.modlabs.commandsExtra.Foo")
    );
}

#[test]
fn project_without_sources_yields_empty_registry() {
    let project = TestProject::new();
    let report = SourceIndex::new("cc.modlabs")
        .unwrap()
        .scan_project(project.root())
        .unwrap();

    assert!(report.registry.is_empty());
    assert_eq!(report.files_scanned, 0);
}

#[test]
fn written_registry_drives_bootstrapper() {
    let project = sample_project();
    let report = SourceIndex::new("cc.modlabs")
        .unwrap()
        .scan_project(project.root())
        .unwrap();
    report.registry.write_to(&project.generated_dir()).unwrap();
    project.assert_file_contains(
        &format!("{GENERATED_DIR}/.extensions"),
        "command cc.modlabs.commands.Ping",
    );

    let mut catalog = ExtensionCatalog::new();
    catalog.register_default::<Stub>("cc.modlabs.commands.Ping");
    catalog.register_default::<Stub>("cc.modlabs.commands.admin.Ban");
    // Present at runtime but not indexed, so never registered.
    catalog.register_default::<Stub>("cc.modlabs.commands.Unindexed");

    let bootstrapper = Bootstrapper::from_resources(
        ClasspathAdditions::default(),
        catalog,
        "cc.modlabs",
        &project.generated_dir(),
    )
    .unwrap();
    assert_eq!(
        bootstrapper.registry(),
        RegistryManifest::read_from(&project.generated_dir())
            .unwrap()
            .as_ref()
    );

    let mut host = Recorder::default();
    let summary = bootstrapper.register_commands(&mut host);

    assert_eq!(
        summary.registered,
        vec!["cc.modlabs.commands.Ping", "cc.modlabs.commands.admin.Ban"]
    );
    assert_eq!(host.0, vec!["stub", "stub"]);
}

#[test]
fn bootstrapper_without_registry_file_uses_catalog() {
    let project = TestProject::new();
    let mut catalog = ExtensionCatalog::new();
    catalog.register_default::<Stub>("cc.modlabs.commands.Ping");

    let bootstrapper = Bootstrapper::from_resources(
        ClasspathAdditions::default(),
        catalog,
        "cc.modlabs",
        project.root(),
    )
    .unwrap();

    assert!(bootstrapper.registry().is_none());
    let summary = bootstrapper.register_commands(&mut Recorder::default());
    assert_eq!(summary.count(), 1);
}

#[test]
fn capability_inherited_from_base_class_in_another_file() {
    let project = TestProject::new();
    project.write_kotlin(
        "cc.modlabs.commands",
        "BaseCommand",
        "abstract class BaseCommand : CommandBuilder",
    );
    project.write_kotlin("cc.modlabs.commands", "Ping", "class Ping : BaseCommand()");
    project.write_kotlin(
        "cc.modlabs.support",
        "AdminCommand",
        "abstract class AdminCommand(val permission: String) : cc.modlabs.commands.BaseCommand()",
    );
    project.write_kotlin(
        "cc.modlabs.commands.admin",
        "Ban",
        "import cc.modlabs.support.AdminCommand\n\nclass Ban : AdminCommand(\"ban\")",
    );
    project.write_java(
        "cc.modlabs.support",
        "BaseListener",
        "public abstract class BaseListener implements Listener {}",
    );
    project.write_java(
        "cc.modlabs.listeners",
        "Quit",
        "import cc.modlabs.support.*;\n\npublic class Quit extends BaseListener {}",
    );
    project.write_kotlin(
        "cc.modlabs.commands",
        "External",
        "import org.library.LibraryCommand\n\nclass External : LibraryCommand()",
    );

    let report = SourceIndex::new("cc.modlabs")
        .unwrap()
        .scan_project(project.root())
        .unwrap();

    assert_eq!(
        report.registry.render(),
        "command cc.modlabs.commands.Ping\n\
         command cc.modlabs.commands.admin.Ban\n\
         listener cc.modlabs.listeners.Quit\n"
    );
    let external = report
        .skipped
        .iter()
        .find(|s| s.candidate.class_name == "cc.modlabs.commands.External")
        .unwrap();
    assert_eq!(external.reason, SkipReason::MissingCapability);
}
