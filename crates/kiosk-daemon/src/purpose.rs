/// One-shot purpose handoff to the card-reader daemon.
///
/// The daemon blocks reading a named pipe; we open it, write the message as
/// a single unit, and close.  No acknowledgment, no retry: if nobody is
/// reading, the open/write follows the pipe's own blocking semantics.
use std::path::PathBuf;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PurposeError {
    /// The pipe could not be opened.  This is fatal to the request — it is
    /// the only path by which the user's intent reaches the daemon.
    #[error("failed to open purpose channel {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write purpose message: {0}")]
    Write(#[source] std::io::Error),
}

pub struct PurposeChannel {
    path: PathBuf,
}

impl PurposeChannel {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Deliver one purpose message.  Empty messages are a silent no-op — no
    /// open is even attempted.  The pipe is closed on every exit path.
    pub async fn send(&self, message: &str) -> Result<(), PurposeError> {
        if message.is_empty() {
            debug!("empty purpose message, skipping channel open");
            return Ok(());
        }

        let mut pipe = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.path)
            .await
            .map_err(|source| PurposeError::Open {
                path: self.path.clone(),
                source,
            })?;

        // The handle drops (and the pipe closes) whether or not these fail.
        pipe.write_all(message.as_bytes())
            .await
            .map_err(PurposeError::Write)?;
        pipe.flush().await.map_err(PurposeError::Write)?;

        info!("purpose message delivered ({} bytes)", message.len());
        Ok(())
    }
}
