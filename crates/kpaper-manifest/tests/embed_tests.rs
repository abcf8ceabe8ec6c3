//! Integration tests for embedding manifests into packaged resources

use kpaper_manifest::embed::{DEFAULT_BOOTSTRAPPER, DEFAULT_LOADER, DESCRIPTOR_FILE};
use kpaper_manifest::{
    DEPENDENCIES_FILE, DescriptorPatch, EXTENSIONS_FILE, Embedder, EntryPoints, REPOSITORIES_FILE,
};
use kpaper_test_utils::TestProject;
use kpaper_test_utils::project::{GENERATED_DIR, RESOURCES_DIR};
use pretty_assertions::assert_eq;

fn embedder(project: &TestProject) -> Embedder {
    Embedder::new(
        project.generated_dir(),
        project.resources_dir(),
        EntryPoints::default(),
    )
}

#[test]
fn test_copies_manifests_into_resources() {
    let project = TestProject::new();
    project.write_file(&format!("{GENERATED_DIR}/{DEPENDENCIES_FILE}"), "a:b:1\n");
    project.write_file(
        &format!("{GENERATED_DIR}/{REPOSITORIES_FILE}"),
        "r https://r.example/\n",
    );

    let report = embedder(&project).embed().unwrap();

    assert_eq!(report.copied, vec![DEPENDENCIES_FILE, REPOSITORIES_FILE]);
    assert_eq!(report.descriptor, DescriptorPatch::Missing);
    assert_eq!(
        project.read_file(&format!("{RESOURCES_DIR}/{DEPENDENCIES_FILE}")),
        "a:b:1\n"
    );
    project.assert_file_not_exists(&format!("{RESOURCES_DIR}/{EXTENSIONS_FILE}"));
}

#[test]
fn test_stale_resource_manifest_removed() {
    let project = TestProject::new();
    project.write_file(&format!("{GENERATED_DIR}/{DEPENDENCIES_FILE}"), "a:b:1\n");
    project.write_file(
        &format!("{RESOURCES_DIR}/{REPOSITORIES_FILE}"),
        "old https://old.example/\n",
    );

    let report = embedder(&project).embed().unwrap();

    assert_eq!(report.removed, vec![REPOSITORIES_FILE]);
    project.assert_file_not_exists(&format!("{RESOURCES_DIR}/{REPOSITORIES_FILE}"));
}

#[test]
fn test_descriptor_with_custom_loader_keeps_it() {
    let project = TestProject::new();
    project.write_descriptor("name: Demo\nversion: '1.0'\nloader: com.custom.Loader\n");

    let report = embedder(&project).embed().unwrap();

    assert_eq!(report.descriptor, DescriptorPatch::Appended(vec!["bootstrapper"]));
    let path = format!("{RESOURCES_DIR}/{DESCRIPTOR_FILE}");
    assert_eq!(
        project.read_file(&path),
        format!(
            "name: Demo\nversion: '1.0'\nloader: com.custom.Loader\nbootstrapper: {DEFAULT_BOOTSTRAPPER}\n"
        )
    );
}

#[test]
fn test_descriptor_patch_is_idempotent() {
    let project = TestProject::new();
    project.write_descriptor("name: Demo\n");

    let first = embedder(&project).embed().unwrap();
    assert_eq!(
        first.descriptor,
        DescriptorPatch::Appended(vec!["loader", "bootstrapper"])
    );
    let path = format!("{RESOURCES_DIR}/{DESCRIPTOR_FILE}");
    let after_first = project.read_file(&path);
    assert!(after_first.contains(DEFAULT_LOADER));

    let second = embedder(&project).embed().unwrap();
    assert_eq!(second.descriptor, DescriptorPatch::Unchanged);
    assert_eq!(project.read_file(&path), after_first);
}

#[test]
fn test_configured_entry_points_are_used() {
    let project = TestProject::new();
    project.write_descriptor("name: Demo\n");

    Embedder::new(
        project.generated_dir(),
        project.resources_dir(),
        EntryPoints {
            loader: "org.acme.Loader".into(),
            bootstrapper: "org.acme.Boot".into(),
        },
    )
    .embed()
    .unwrap();

    let content = project.read_file(&format!("{RESOURCES_DIR}/{DESCRIPTOR_FILE}"));
    assert!(content.contains("loader: org.acme.Loader\n"));
    assert!(content.contains("bootstrapper: org.acme.Boot\n"));
}

#[test]
fn test_invalid_descriptor_is_error() {
    let project = TestProject::new();
    project.write_descriptor("name: [unclosed\n");

    assert!(embedder(&project).embed().is_err());
}
