//! End-to-end test of plugin delivery
//!
//! Build side: config -> manifest generation -> extension index -> embedding.
//! Load side: loader phase against a local Maven repository, then the
//! bootstrapper phase registering commands and listeners with a fake host.

use std::fs;
use std::path::Path;

use kpaper_loader::{LoaderPhase, MavenResolver};
use kpaper_manifest::{BuildConfig, Embedder, ManifestGenerator, Project, RepositoryDescriptor};
use kpaper_registry::{
    Bootstrapper, CommandBuilder, CommandNode, CommandRegistrar, EventRegistrar, Extension,
    ExtensionCatalog, HostError, Listener, SourceIndex,
};
use kpaper_test_utils::TestProject;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[derive(Default)]
struct Ping;

impl CommandBuilder for Ping {
    fn register(&self) -> CommandNode {
        CommandNode::literal("ping")
    }

    fn description(&self) -> String {
        "Replies with pong".to_string()
    }
}

impl Extension for Ping {
    fn into_command(self: Box<Self>) -> Option<Box<dyn CommandBuilder>> {
        Some(self)
    }
}

#[derive(Default)]
struct JoinListener;

impl Listener for JoinListener {
    fn name(&self) -> String {
        "JoinListener".to_string()
    }

    fn events(&self) -> Vec<String> {
        vec!["PlayerJoinEvent".to_string()]
    }
}

impl Extension for JoinListener {
    fn into_listener(self: Box<Self>) -> Option<Box<dyn Listener>> {
        Some(self)
    }
}

#[derive(Default)]
struct FakeHost {
    commands: Vec<String>,
    listeners: Vec<String>,
}

impl CommandRegistrar for FakeHost {
    fn register(
        &mut self,
        node: CommandNode,
        _description: String,
        _aliases: Vec<String>,
    ) -> Result<(), HostError> {
        self.commands.push(node.literal);
        Ok(())
    }
}

impl EventRegistrar for FakeHost {
    fn register_listener(&mut self, listener: Box<dyn Listener>) -> Result<(), HostError> {
        self.listeners.push(listener.name());
        Ok(())
    }
}

/// Publish an artifact into a Maven-layout directory.
fn publish(repository: &Path, group: &str, artifact: &str, version: &str, bytes: &[u8]) {
    let dir = repository
        .join(group.replace('.', "/"))
        .join(artifact)
        .join(version);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{artifact}-{version}.jar")), bytes).unwrap();
}

fn jar_names(classpath: &[std::path::PathBuf]) -> Vec<String> {
    classpath
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
}

fn build(project: &TestProject) {
    let config = BuildConfig::load(&project.root().join("kpaper.toml")).unwrap();

    let generator = ManifestGenerator::new(config.target());
    let project_model = Project::from_config(&config).unwrap();
    let report = generator.generate(&project_model.configurations(), &config.deliver);
    generator
        .write(&project.generated_dir(), &report, &config.repositories())
        .unwrap();

    let index = SourceIndex::new(config.registration_base_package.as_str())
        .unwrap()
        .scan_project(project.root())
        .unwrap();
    index.registry.write_to(&project.generated_dir()).unwrap();

    Embedder::new(
        project.generated_dir(),
        project.resources_dir(),
        config.entry_points(),
    )
    .embed()
    .unwrap();
}

#[test]
fn test_build_then_load_then_register() {
    let mirror = TempDir::new().unwrap();
    publish(mirror.path(), "cc.modlabs", "KPaper", "2025.7.15.1527", b"kpaper");
    let extra = TempDir::new().unwrap();
    publish(extra.path(), "org.example", "foo", "1.0", b"foo");

    let extra_url = url::Url::from_directory_path(extra.path()).unwrap();
    let project = TestProject::new();
    project.write_config(&format!(
        "deliver = [\"org.example:foo:1.0\"]\n\n[[repositories]]\nid = \"extra\"\nurl = \"{extra_url}\"\n"
    ));
    project.write_descriptor("name: Demo\nmain: cc.modlabs.Demo\n");
    project.write_kotlin("cc.modlabs.commands", "Ping", "class Ping : CommandBuilder");
    project.write_kotlin(
        "cc.modlabs.listeners",
        "JoinListener",
        "class JoinListener : Listener",
    );
    project.write_kotlin("cc.modlabs.commandsExtra", "Foo", "class Foo : CommandBuilder");

    build(&project);

    project.assert_file_contains(
        "build/resources/main/paper-plugin.yml",
        "loader: cc.modlabs.registration.DependencyLoader",
    );

    // Stage 1: the injected default repository stands in for the public mirror.
    let mirror_url = url::Url::from_directory_path(mirror.path()).unwrap();
    let cache = TempDir::new().unwrap();
    let phase = LoaderPhase::new(
        project.resources_dir(),
        RepositoryDescriptor::new("modlabs", mirror_url.as_str()),
        MavenResolver::new(cache.path()).unwrap(),
    );
    let additions = phase.run_blocking().unwrap();

    let served: Vec<_> = additions
        .artifacts()
        .iter()
        .map(|a| (a.coordinate.to_string(), a.repository.clone()))
        .collect();
    assert_eq!(
        served,
        vec![
            ("cc.modlabs:KPaper:2025.7.15.1527".to_string(), Some("modlabs".to_string())),
            ("org.example:foo:1.0".to_string(), Some("extra".to_string())),
        ]
    );

    // Stage 2: only indexed classes are registered.
    let mut catalog = ExtensionCatalog::new();
    catalog.register_default::<Ping>("cc.modlabs.commands.Ping");
    catalog.register_default::<JoinListener>("cc.modlabs.listeners.JoinListener");
    catalog.register_default::<Ping>("cc.modlabs.commandsExtra.Foo");

    let bootstrapper =
        Bootstrapper::from_resources(additions, catalog, "cc.modlabs", &project.resources_dir())
            .unwrap();
    assert_eq!(bootstrapper.additions().len(), 2);

    let mut host = FakeHost::default();
    let commands = bootstrapper.register_commands(&mut host);
    let listeners = bootstrapper.register_listeners(&mut host);

    assert_eq!(commands.count(), 1);
    assert_eq!(listeners.count(), 1);
    let jars: Vec<_> = jar_names(&commands.classpath);
    assert_eq!(jars, vec!["KPaper-2025.7.15.1527.jar", "foo-1.0.jar"]);
    assert_eq!(host.commands, vec!["ping"]);
    assert_eq!(host.listeners, vec!["JoinListener"]);
}

#[test]
fn test_unresolvable_dependency_aborts_loading() {
    let empty = TempDir::new().unwrap();
    let project = TestProject::new();
    project.write_config("deliver = [\"org.example:missing:9.9\"]\n");

    build(&project);

    let cache = TempDir::new().unwrap();
    let phase = LoaderPhase::new(
        project.resources_dir(),
        RepositoryDescriptor::new(
            "modlabs",
            url::Url::from_directory_path(empty.path()).unwrap().as_str(),
        ),
        MavenResolver::new(cache.path()).unwrap(),
    );

    let err = phase.run_blocking().unwrap_err();
    assert!(err.to_string().contains("could not resolve"));
}

#[test]
fn test_rebuild_without_repositories_drops_stale_manifest() {
    let project = TestProject::new();
    project.write_config("[[repositories]]\nurl = \"https://other.com/m2/\"\n");
    build(&project);
    project.assert_file_exists("build/resources/main/.repositories");

    project.write_config("");
    build(&project);
    project.assert_file_not_exists("build/generated-resources/.repositories");
    project.assert_file_not_exists("build/resources/main/.repositories");
}
