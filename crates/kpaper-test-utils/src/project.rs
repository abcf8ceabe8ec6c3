//! [`TestProject`] builder for plugin project scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory (relative to the project root) the generator writes into.
pub const GENERATED_DIR: &str = "build/generated-resources";

/// Directory (relative to the project root) holding packaged resources.
pub const RESOURCES_DIR: &str = "build/resources/main";

/// A temporary plugin project with helpers for test setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use kpaper_test_utils::TestProject;
///
/// let project = TestProject::new();
/// project.write_config(r#"deliver = ["org.example:foo:1.0"]"#);
/// project.write_kotlin("cc.modlabs.commands", "Ping", "class Ping : CommandBuilder {}");
/// project.assert_file_exists("kpaper.toml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary project directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the project.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root().join(GENERATED_DIR)
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root().join(RESOURCES_DIR)
    }

    /// Write `kpaper.toml` at the project root.
    pub fn write_config(&self, content: &str) {
        self.write_file("kpaper.toml", content);
    }

    /// Write `paper-plugin.yml` into the packaged resources directory.
    pub fn write_descriptor(&self, content: &str) {
        self.write_file(&format!("{RESOURCES_DIR}/paper-plugin.yml"), content);
    }

    /// Write a Kotlin source file under `src/main/kotlin`, with a
    /// `package` header for `package`.
    pub fn write_kotlin(&self, package: &str, class: &str, body: &str) -> PathBuf {
        self.write_source("kotlin", "kt", package, class, &format!("package {package}\n\n{body}\n"))
    }

    /// Write a Java source file under `src/main/java`, with a
    /// `package` header for `package`.
    pub fn write_java(&self, package: &str, class: &str, body: &str) -> PathBuf {
        self.write_source("java", "java", package, class, &format!("package {package};\n\n{body}\n"))
    }

    fn write_source(&self, lang: &str, ext: &str, package: &str, class: &str, content: &str) -> PathBuf {
        let relative = format!(
            "src/main/{lang}/{}/{class}.{ext}",
            package.replace('.', "/")
        );
        self.write_file(&relative, content);
        self.root().join(relative)
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Read the file at `path` (relative to the root).
    pub fn read_file(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
