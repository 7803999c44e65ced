/// Where the poller samples the current status value from.
///
/// The card-reader daemon overwrites the value in place with no locking, so
/// a read is a best-effort snapshot: it may be partial, stale, or missing
/// entirely.  Every failure mode collapses to `None` ("no sample this
/// tick") — the poller never surfaces read errors.
use std::future::Future;
use std::path::PathBuf;

use kiosk_proto::config::Config;
use tracing::debug;

pub trait StatusSource: Send + 'static {
    /// One read attempt.  `None` means the tick is dropped.
    fn sample(&mut self) -> impl Future<Output = Option<String>> + Send;
}

// ── file-backed source ────────────────────────────────────────────────────────

/// Reads the status file the card-reader daemon rewrites (status.txt in the
/// original deployment).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StatusSource for FileSource {
    async fn sample(&mut self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("status file {:?} unreadable this tick: {}", self.path, e);
                None
            }
        }
    }
}

// ── HTTP-backed source ────────────────────────────────────────────────────────

/// Fetches the status value over HTTP, the way the original front end did an
/// AJAX GET against the web root.  Only a success status code counts as a
/// sample.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

impl StatusSource for HttpSource {
    async fn sample(&mut self) -> Option<String> {
        let response = match self.client.get(&self.url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("status fetch {} failed this tick: {}", self.url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("status fetch {} returned {}", self.url, response.status());
            return None;
        }
        response.text().await.ok()
    }
}

// ── config-driven selection ───────────────────────────────────────────────────

/// Deployment-time choice of source, cloneable so each page load can build a
/// fresh `Source` for its poller.
#[derive(Debug, Clone)]
pub enum SourceSpec {
    File(PathBuf),
    Http(String),
}

impl SourceSpec {
    pub fn from_config(config: &Config) -> Self {
        if config.status.status_url.is_empty() {
            SourceSpec::File(config.status.status_file.clone())
        } else {
            SourceSpec::Http(config.status.status_url.clone())
        }
    }

    pub fn build(&self) -> Source {
        match self {
            SourceSpec::File(path) => Source::File(FileSource::new(path.clone())),
            SourceSpec::Http(url) => Source::Http(HttpSource::new(url.clone())),
        }
    }
}

pub enum Source {
    File(FileSource),
    Http(HttpSource),
}

impl StatusSource for Source {
    async fn sample(&mut self) -> Option<String> {
        match self {
            Source::File(s) => s.sample().await,
            Source::Http(s) => s.sample().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_source_reads_current_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.txt");
        std::fs::write(&path, "login\n").unwrap();

        let mut source = FileSource::new(path.clone());
        assert_eq!(source.sample().await.as_deref(), Some("login\n"));

        // Overwritten in place — next sample sees the new value.
        std::fs::write(&path, "logout\n").unwrap();
        assert_eq!(source.sample().await.as_deref(), Some("logout\n"));
    }

    #[tokio::test]
    async fn missing_file_is_no_sample_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileSource::new(dir.path().join("absent.txt"));
        assert_eq!(source.sample().await, None);
    }

    #[test]
    fn spec_prefers_url_when_set() {
        let mut config = Config::default();
        assert!(matches!(SourceSpec::from_config(&config), SourceSpec::File(_)));

        config.status.status_url = "http://127.0.0.1:9999/status.txt".to_string();
        assert!(matches!(SourceSpec::from_config(&config), SourceSpec::Http(_)));
    }
}
