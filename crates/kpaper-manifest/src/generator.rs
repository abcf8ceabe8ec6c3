//! Manifest generation.
//!
//! Aggregation is best-effort: a configuration that fails to resolve is
//! logged and skipped, and whatever the remaining configurations yield is
//! still written.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::coordinate::{DependencyCoordinate, TargetLibrary};
use crate::manifest::{DependencyManifest, RepositoryManifest};
use crate::project::Configuration;
use crate::Result;

/// A configuration that could not be resolved during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedConfiguration {
    pub name: String,
    pub reason: String,
}

/// Outcome of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub dependencies: DependencyManifest,
    pub skipped: Vec<SkippedConfiguration>,
}

/// What [`ManifestGenerator::write`] produced on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenManifests {
    pub dependencies: usize,
    /// `None` when no repository manifest was written.
    pub repositories: Option<usize>,
}

/// Builds the dependency manifest from a project's configurations.
#[derive(Debug, Clone)]
pub struct ManifestGenerator {
    target: TargetLibrary,
}

impl ManifestGenerator {
    pub fn new(target: TargetLibrary) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &TargetLibrary {
        &self.target
    }

    /// Aggregate the target library across all resolvable configurations
    /// and union in the extra dependencies.
    pub fn generate<'c, C, I>(&self, configurations: I, extra: &[DependencyCoordinate]) -> GenerationReport
    where
        C: Configuration + 'c,
        I: IntoIterator<Item = &'c C>,
    {
        let mut report = GenerationReport::default();

        for configuration in configurations {
            if !configuration.is_resolvable() {
                continue;
            }

            match configuration.first_level_dependencies() {
                Ok(dependencies) => {
                    for dependency in dependencies {
                        if self.target.is_match(&dependency) && report.dependencies.insert(dependency.clone()) {
                            debug!(
                                configuration = configuration.name(),
                                coordinate = %dependency,
                                "found delivered library"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        configuration = configuration.name(),
                        error = %e,
                        "skipping configuration that failed to resolve"
                    );
                    report.skipped.push(SkippedConfiguration {
                        name: configuration.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.dependencies.extend(extra.iter().cloned());
        report
    }

    /// Write `.dependencies` and sync `.repositories` into `output_dir`.
    ///
    /// The dependency manifest is rewritten from scratch every run. The
    /// repository manifest is removed when no repositories are declared so
    /// a previous run's file cannot leak into this build.
    pub fn write(
        &self,
        output_dir: &Path,
        report: &GenerationReport,
        repositories: &RepositoryManifest,
    ) -> Result<WrittenManifests> {
        report.dependencies.write_to(output_dir)?;
        let wrote_repositories = RepositoryManifest::sync_to(repositories, output_dir)?;

        info!(
            dir = %output_dir.display(),
            dependencies = report.dependencies.len(),
            repositories = repositories.len(),
            skipped = report.skipped.len(),
            "generated delivery manifests"
        );

        Ok(WrittenManifests {
            dependencies: report.dependencies.len(),
            repositories: wrote_repositories.then_some(repositories.len()),
        })
    }
}

impl Default for ManifestGenerator {
    fn default() -> Self {
        Self::new(TargetLibrary::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use pretty_assertions::assert_eq;

    struct Fake {
        name: &'static str,
        resolvable: bool,
        deps: std::result::Result<Vec<&'static str>, &'static str>,
    }

    impl Configuration for Fake {
        fn name(&self) -> &str {
            self.name
        }

        fn is_resolvable(&self) -> bool {
            self.resolvable
        }

        fn first_level_dependencies(&self) -> Result<Vec<DependencyCoordinate>> {
            match &self.deps {
                Ok(deps) => Ok(deps.iter().map(|d| d.parse().unwrap()).collect()),
                Err(reason) => Err(Error::Resolution {
                    name: self.name.to_string(),
                    reason: reason.to_string(),
                }),
            }
        }
    }

    fn coord(s: &str) -> DependencyCoordinate {
        s.parse().unwrap()
    }

    #[test]
    fn test_only_target_library_is_retained() {
        let configs = [Fake {
            name: "runtimeClasspath",
            resolvable: true,
            deps: Ok(vec!["cc.modlabs:KPaper:1", "org.other:lib:2"]),
        }];

        let report = ManifestGenerator::default().generate(&configs, &[]);

        assert_eq!(report.dependencies.render(), "cc.modlabs:KPaper:1\n");
    }

    #[test]
    fn test_non_resolvable_configurations_ignored() {
        let configs = [Fake {
            name: "api",
            resolvable: false,
            deps: Ok(vec!["cc.modlabs:KPaper:1"]),
        }];

        let report = ManifestGenerator::default().generate(&configs, &[]);

        assert!(report.dependencies.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_failed_configuration_is_skipped_not_fatal() {
        let configs = [
            Fake {
                name: "broken",
                resolvable: true,
                deps: Err("could not resolve"),
            },
            Fake {
                name: "runtimeClasspath",
                resolvable: true,
                deps: Ok(vec!["cc.modlabs:KPaper:1"]),
            },
        ];

        let report = ManifestGenerator::default().generate(&configs, &[coord("org.example:foo:1.0")]);

        assert_eq!(report.dependencies.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "broken");
    }

    #[test]
    fn test_duplicates_across_configurations_collapse() {
        let configs = [
            Fake {
                name: "compileClasspath",
                resolvable: true,
                deps: Ok(vec!["cc.modlabs:KPaper:1"]),
            },
            Fake {
                name: "runtimeClasspath",
                resolvable: true,
                deps: Ok(vec!["cc.modlabs:KPaper:1"]),
            },
        ];

        let report =
            ManifestGenerator::default().generate(&configs, &[coord("cc.modlabs:KPaper:1")]);

        assert_eq!(report.dependencies.len(), 1);
    }

    #[test]
    fn test_extra_dependencies_are_trusted_verbatim() {
        let configs: [Fake; 0] = [];
        let report = ManifestGenerator::default()
            .generate(&configs, &[coord("does.not:exist:0")]);
        assert_eq!(report.dependencies.render(), "does.not:exist:0\n");
    }
}
