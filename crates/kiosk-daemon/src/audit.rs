use std::path::PathBuf;

use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only record of purpose submissions.  The card-reader daemon keeps
/// its own login logs; this is the front end's side of the paper trail.
/// Audit failures are logged and swallowed — they must never block a visit.
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub async fn record(&self, session: &str, purpose: &str) {
        let line = format!(
            "{} session={} purpose={}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            session,
            purpose
        );

        if let Err(e) = self.append(&line).await {
            warn!("audit log {:?} write failed: {}", self.path, e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}
