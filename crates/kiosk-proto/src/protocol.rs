use serde::{Deserialize, Serialize};

use crate::flow::Page;

/// Current protocol version.  Bump this when the HTTP payloads change in a
/// breaking way.  The front end checks it on session creation and can refuse
/// to talk to an incompatible daemon.
pub const PROTOCOL_VERSION: u32 = 1;

/// Reply to `POST /session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCreated {
    pub protocol_version: u32,
    /// Opaque session token; the front end carries it in every request so a
    /// page instance is correlated with its own status stream.
    pub session: String,
    pub page: Page,
}

/// What the front end needs to render one page of the flow.
///
/// Markup and form display are the front end's problem; this only carries
/// the controller-relevant facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    pub page: Page,
    /// Heading text for form pages (the purpose prompt).
    pub prompt: Option<String>,
    /// True when a poller is live for this page and `GET /next` is worth
    /// calling.
    pub polls: bool,
    /// Seconds to dwell before navigating to `advance_to` (terminal pages).
    pub auto_advance_secs: Option<u64>,
    pub advance_to: Option<Page>,
}

impl PageView {
    pub fn new(page: Page, polls: bool) -> Self {
        let advance = page.auto_advance();
        Self {
            page,
            prompt: page.prompt().map(str::to_string),
            polls,
            auto_advance_secs: advance.map(|(secs, _)| secs),
            advance_to: advance.map(|(_, target)| target),
        }
    }
}

/// Form body of `POST /purpose`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurposeForm {
    pub session: String,
    /// Free text; empty and absent are equivalent (no-op).
    #[serde(default)]
    pub message: String,
}

/// Reply to `GET /next` when a transition has fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextReply {
    pub page: Page,
}
