/// Session registry — the per-page controllers.
///
/// The original kiosk kept no session state at all: "the" visitor was
/// whoever had the page open, correlated with a single global status slot.
/// Here every browser instance gets an explicit token, minted on session
/// creation and carried in every request, so a poller can never act on
/// another visitor's behalf.
///
/// A controller does three things per page: optionally pushes the purpose
/// message through the channel, starts the page's poller when its
/// precondition holds, and hands the fired transition to the front end so
/// it can perform a full navigation (which replaces the page, and with it
/// the poller).
use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use kiosk_proto::config::Config;
use kiosk_proto::flow::Page;
use kiosk_proto::protocol::{PageView, SessionCreated, PROTOCOL_VERSION};
use rand::Rng;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use crate::audit::AuditLog;
use crate::poller::{self, PollerHandle};
use crate::purpose::{PurposeChannel, PurposeError};
use crate::source::SourceSpec;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown session {0}")]
    UnknownSession(String),
    #[error("unknown page {0}")]
    UnknownPage(String),
    #[error(transparent)]
    Purpose(#[from] PurposeError),
}

struct PageSession {
    page: Page,
    created_at: DateTime<Local>,
    /// Live poller for the current page, if the page polls.
    poller: Option<PollerHandle>,
    fired_rx: Option<mpsc::Receiver<Page>>,
    /// A transition that fired but has not been reported yet.
    pending: Option<Page>,
}

impl PageSession {
    fn new() -> Self {
        Self {
            page: Page::Welcome,
            created_at: Local::now(),
            poller: None,
            fired_rx: None,
            pending: None,
        }
    }

    /// Tear down the current page's polling state.  Dropping the handle
    /// aborts the task, so no tick can fire after this.
    fn clear_poller(&mut self) {
        self.poller = None;
        self.fired_rx = None;
        self.pending = None;
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, PageSession>>,
    source: SourceSpec,
    interval: Duration,
    purpose: PurposeChannel,
    audit: AuditLog,
}

impl SessionRegistry {
    pub fn new(config: &Config) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            source: SourceSpec::from_config(config),
            interval: Duration::from_millis(config.flow.poll_interval_ms),
            purpose: PurposeChannel::new(config.paths.purpose_fifo.clone()),
            audit: AuditLog::new(config.paths.audit_log.clone()),
        }
    }

    /// Mint a new session, starting at the welcome page.  The poller starts
    /// when the front end actually loads the page.
    pub async fn create(&self) -> SessionCreated {
        let token = session_token();
        let session = PageSession::new();
        info!("session {} created at {}", token, session.created_at);

        self.sessions.write().await.insert(token.clone(), session);

        SessionCreated {
            protocol_version: PROTOCOL_VERSION,
            session: token,
            page: Page::Welcome,
        }
    }

    /// Load `page` for `session`: replace whatever poller was live, then
    /// start a fresh one iff the page polls on load.
    pub async fn load_page(&self, token: &str, page: Page) -> Result<PageView, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| SessionError::UnknownSession(token.to_string()))?;

        session.clear_poller();
        session.page = page;

        let polls = page.polls_on_load();
        if polls {
            self.start_poller(session, page);
        }
        debug!("session {}: loaded {} (polls={})", token, page, polls);

        Ok(PageView::new(page, polls))
    }

    /// Handle a purpose submission.  An empty message is a no-op: the
    /// status page is shown without polling, exactly as a bare reload would
    /// be.  A non-empty message goes through the channel before anything
    /// else; only then does the acknowledgment poller start.
    pub async fn submit_purpose(
        &self,
        token: &str,
        message: &str,
    ) -> Result<PageView, SessionError> {
        {
            let sessions = self.sessions.read().await;
            if !sessions.contains_key(token) {
                return Err(SessionError::UnknownSession(token.to_string()));
            }
        }

        if message.is_empty() {
            return self.load_page(token, Page::Status).await;
        }

        self.purpose.send(message).await?;
        self.audit.record(token, message).await;

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| SessionError::UnknownSession(token.to_string()))?;

        session.clear_poller();
        session.page = Page::Status;
        self.start_poller(session, Page::Status);
        info!("session {}: purpose submitted, awaiting acknowledgment", token);

        Ok(PageView::new(Page::Status, true))
    }

    /// Report the fired transition, if any.  Delivered at most once; the
    /// front end follows up with a page load, which resets the controller.
    pub async fn next(&self, token: &str) -> Result<Option<Page>, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(token)
            .ok_or_else(|| SessionError::UnknownSession(token.to_string()))?;

        if session.pending.is_none() {
            if let Some(rx) = session.fired_rx.as_mut() {
                if let Ok(target) = rx.try_recv() {
                    session.pending = Some(target);
                }
            }
        }

        Ok(session.pending.take())
    }

    pub async fn current_page(&self, token: &str) -> Result<Page, SessionError> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .map(|s| s.page)
            .ok_or_else(|| SessionError::UnknownSession(token.to_string()))
    }

    fn start_poller(&self, session: &mut PageSession, page: Page) {
        // Pages without a table never poll, whatever the caller thinks.
        let Some(table) = page.table() else {
            return;
        };
        let (tx, rx) = mpsc::channel(1);
        session.poller = Some(poller::start(self.source.build(), table, self.interval, tx));
        session.fired_rx = Some(rx);
    }
}

fn session_token() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}
