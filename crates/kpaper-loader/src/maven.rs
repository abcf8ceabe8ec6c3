//! Maven repository resolver over HTTP.
//!
//! Fetches exactly the listed coordinates (the primary jar of each) from
//! the session's repositories in order, caching them under a local
//! directory laid out like a Maven repository. Transitive resolution is
//! out of scope.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use kpaper_manifest::{DependencyCoordinate, io};
use reqwest::StatusCode;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::resolver::{ArtifactResolver, ResolvedArtifact};
use crate::session::{RemoteRepository, ResolverSession};

/// Default HTTP request timeout (120 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Default connection timeout (30 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum artifact size (256 MiB).
const DEFAULT_MAX_SIZE: u64 = 256 * 1024 * 1024;

/// Timeout and retry behaviour for repository requests.
///
/// The default performs a single attempt per repository. Setting a retry
/// window retries transient failures (transport errors and 5xx responses)
/// with exponential backoff until the window elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub retry_window: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_window: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Transport(String),
    #[error("artifact is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("{0}")]
    Local(String),
}

impl FetchError {
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status(status) => status.is_server_error(),
            Self::TooLarge { .. } | Self::Local(_) => false,
        }
    }
}

/// Resolves coordinates from Maven-layout repositories.
pub struct MavenResolver {
    client: reqwest::Client,
    cache_dir: PathBuf,
    max_artifact_size: u64,
    retry: RetryPolicy,
}

impl MavenResolver {
    /// Create a resolver caching artifacts under `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Client` if the HTTP client cannot be built.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_policy(cache_dir, RetryPolicy::default())
    }

    pub fn with_policy(cache_dir: impl Into<PathBuf>, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(retry.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(retry.timeout))
            .user_agent(concat!("kpaper-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            max_artifact_size: DEFAULT_MAX_SIZE,
            retry,
        })
    }

    /// Override the maximum artifact size in bytes.
    #[must_use]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_artifact_size = bytes;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    async fn resolve_one(
        &self,
        coordinate: &DependencyCoordinate,
        repositories: &[RemoteRepository],
    ) -> Result<ResolvedArtifact> {
        let relative = coordinate.repository_path();
        let cached = self.cache_dir.join(&relative);
        if cached.is_file() {
            debug!(coordinate = %coordinate, path = %cached.display(), "using cached artifact");
            return Ok(ResolvedArtifact {
                coordinate: coordinate.clone(),
                path: cached,
                repository: None,
            });
        }

        let mut attempts = Vec::new();
        for repository in repositories {
            let url = match repository.artifact_url(&relative) {
                Ok(url) => url,
                Err(e) => {
                    attempts.push(format!("{}: {e}", repository.id));
                    continue;
                }
            };

            match self.fetch(&url).await {
                Ok(Some(bytes)) => {
                    io::write_atomic(&cached, &bytes)?;
                    info!(
                        coordinate = %coordinate,
                        repository = %repository.id,
                        bytes = bytes.len(),
                        "resolved artifact"
                    );
                    return Ok(ResolvedArtifact {
                        coordinate: coordinate.clone(),
                        path: cached,
                        repository: Some(repository.id.clone()),
                    });
                }
                Ok(None) => {
                    debug!(coordinate = %coordinate, repository = %repository.id, "not found");
                    attempts.push(format!("{}: not found", repository.id));
                }
                Err(e) => {
                    warn!(
                        coordinate = %coordinate,
                        repository = %repository.id,
                        error = %e,
                        "repository request failed"
                    );
                    attempts.push(format!("{}: {e}", repository.id));
                }
            }
        }

        Err(Error::Unresolved {
            coordinate: coordinate.to_string(),
            attempts,
        })
    }

    async fn fetch(&self, url: &Url) -> std::result::Result<Option<Vec<u8>>, FetchError> {
        let Some(window) = self.retry.retry_window else {
            return self.fetch_once(url).await;
        };

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(200))
            .with_max_elapsed_time(Some(window))
            .build();

        backoff::future::retry(policy, || async move {
            self.fetch_once(url).await.map_err(|e| {
                if e.is_transient() {
                    debug!(url = %url, error = %e, "transient failure, retrying");
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        })
        .await
    }

    /// One request. `Ok(None)` means the repository does not have it.
    async fn fetch_once(&self, url: &Url) -> std::result::Result<Option<Vec<u8>>, FetchError> {
        if url.scheme() == "file" {
            return self.read_local(url);
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        if let Some(length) = response.content_length()
            && length > self.max_artifact_size
        {
            return Err(FetchError::TooLarge {
                size: length,
                limit: self.max_artifact_size,
            });
        }

        let mut buffer = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            let size = (buffer.len() + chunk.len()) as u64;
            if size > self.max_artifact_size {
                return Err(FetchError::TooLarge {
                    size,
                    limit: self.max_artifact_size,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(Some(buffer))
    }

    fn read_local(&self, url: &Url) -> std::result::Result<Option<Vec<u8>>, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::Local(format!("not a local path: {url}")))?;
        match std::fs::read(&path) {
            Ok(bytes) if bytes.len() as u64 > self.max_artifact_size => Err(FetchError::TooLarge {
                size: bytes.len() as u64,
                limit: self.max_artifact_size,
            }),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FetchError::Local(format!("{}: {e}", path.display()))),
        }
    }
}

#[async_trait]
impl ArtifactResolver for MavenResolver {
    async fn resolve(&self, session: &ResolverSession) -> Result<Vec<ResolvedArtifact>> {
        let mut resolved = Vec::with_capacity(session.dependencies().len());
        for coordinate in session.dependencies() {
            resolved.push(self.resolve_one(coordinate, session.repositories()).await?);
        }
        Ok(resolved)
    }
}
