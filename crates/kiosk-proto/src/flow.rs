use serde::{Deserialize, Serialize};

/// One screen of the kiosk flow.  This is a closed set: transitions may only
/// ever name one of these pages, and the front end addresses them by slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    /// Idle screen — waits for a card swipe.
    Welcome,
    /// Detail screen shown while the reader processes a swipe.
    Swipe,
    /// Waits for the card-reader daemon to check the entered password.
    Password,
    /// Free-text "what are you doing here today?" form.
    Purpose,
    /// Waits for the daemon to acknowledge the submitted purpose.
    Status,
    Success,
    Fail,
    Logout,
}

impl Page {
    pub fn as_slug(self) -> &'static str {
        match self {
            Page::Welcome => "welcome",
            Page::Swipe => "swipe",
            Page::Password => "password",
            Page::Purpose => "purpose",
            Page::Status => "status",
            Page::Success => "success",
            Page::Fail => "fail",
            Page::Logout => "logout",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "welcome" => Some(Page::Welcome),
            "swipe" => Some(Page::Swipe),
            "password" => Some(Page::Password),
            "purpose" => Some(Page::Purpose),
            "status" => Some(Page::Status),
            "success" => Some(Page::Success),
            "fail" => Some(Page::Fail),
            "logout" => Some(Page::Logout),
            _ => None,
        }
    }

    /// The page's status vocabulary, or None for pages that never poll.
    ///
    /// The card-reader daemon overwrites the status value in place, so a
    /// sample may be partial or stale; anything the table does not match is
    /// treated as "keep polling", not as an error.
    pub fn table(self) -> Option<TransitionTable> {
        match self {
            Page::Welcome => Some(TransitionTable::new(vec![
                ("login", Page::Password),
                ("logout", Page::Logout),
            ])),
            Page::Swipe => Some(TransitionTable::new(vec![("true", Page::Password)])),
            Page::Password => Some(TransitionTable::new(vec![
                ("true", Page::Status),
                ("false", Page::Fail),
            ])),
            // Counter-intuitively "false" is the success signal here: it means
            // the daemon finished the acknowledgment loop and wrote the login
            // to its logfiles.  "true" and "continue" are intermediate.
            Page::Status => Some(TransitionTable::new(vec![("false", Page::Success)])),
            Page::Purpose | Page::Success | Page::Fail | Page::Logout => None,
        }
    }

    /// Whether loading the page starts its poller immediately.  The status
    /// page has a table but only polls after a non-empty purpose submission.
    pub fn polls_on_load(self) -> bool {
        matches!(self, Page::Welcome | Page::Swipe | Page::Password)
    }

    /// Terminal screens dwell for a few seconds, then reset to welcome.
    pub fn auto_advance(self) -> Option<(u64, Page)> {
        match self {
            Page::Success | Page::Fail | Page::Logout => Some((5, Page::Welcome)),
            _ => None,
        }
    }

    pub fn prompt(self) -> Option<&'static str> {
        match self {
            // The status page doubles as the submission form until a
            // non-empty purpose arrives, so both carry the prompt.
            Page::Purpose | Page::Status => Some("USER, what are you doing here today?"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_slug())
    }
}

/// Ordered token → page mapping.  Entries are tried in declaration order and
/// matched by substring containment; the first hit wins, which keeps
/// ambiguous samples (a value containing two tokens) deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    entries: Vec<(&'static str, Page)>,
}

impl TransitionTable {
    pub fn new(entries: Vec<(&'static str, Page)>) -> Self {
        Self { entries }
    }

    /// Classify one sampled status value.  None means "keep polling".
    pub fn classify(&self, sample: &str) -> Option<Page> {
        self.entries
            .iter()
            .find(|(token, _)| sample.contains(token))
            .map(|&(_, target)| target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_round_trip() {
        for page in [
            Page::Welcome,
            Page::Swipe,
            Page::Password,
            Page::Purpose,
            Page::Status,
            Page::Success,
            Page::Fail,
            Page::Logout,
        ] {
            assert_eq!(Page::from_slug(page.as_slug()), Some(page));
        }
        assert_eq!(Page::from_slug("lobby"), None);
    }

    #[test]
    fn classify_matches_token_with_surrounding_text() {
        let table = Page::Password.table().unwrap();
        assert_eq!(table.classify("true\n"), Some(Page::Status));
        assert_eq!(table.classify("status: true (ok)"), Some(Page::Status));
        assert_eq!(table.classify("false"), Some(Page::Fail));
    }

    #[test]
    fn classify_partial_and_empty_samples_keep_polling() {
        let table = Page::Password.table().unwrap();
        assert_eq!(table.classify(""), None);
        assert_eq!(table.classify("tru"), None);
        assert_eq!(table.classify("checking"), None);
    }

    #[test]
    fn logout_is_not_shadowed_by_login() {
        // "logout" does not contain "login", so declaration order is not
        // what saves us here — the tokens are genuinely independent.
        let table = Page::Welcome.table().unwrap();
        assert_eq!(table.classify("logout"), Some(Page::Logout));
        assert_eq!(table.classify("login"), Some(Page::Password));
    }

    #[test]
    fn ambiguous_sample_takes_first_declared_entry() {
        let table = Page::Password.table().unwrap();
        // A mid-overwrite value can contain both tokens; "true" is declared
        // first so it must win every time.
        assert_eq!(table.classify("falsetrue"), Some(Page::Status));
        assert_eq!(table.classify("true false"), Some(Page::Status));
    }

    #[test]
    fn status_page_only_maps_false() {
        let table = Page::Status.table().unwrap();
        assert_eq!(table.classify("true"), None);
        assert_eq!(table.classify("continue"), None);
        assert_eq!(table.classify("false"), Some(Page::Success));
    }

    #[test]
    fn terminal_pages_reset_to_welcome() {
        for page in [Page::Success, Page::Fail, Page::Logout] {
            assert_eq!(page.auto_advance(), Some((5, Page::Welcome)));
            assert!(page.table().is_none());
        }
        assert_eq!(Page::Status.auto_advance(), None);
    }

    #[test]
    fn polling_pages() {
        assert!(Page::Welcome.polls_on_load());
        assert!(Page::Password.polls_on_load());
        // Status polls only after a purpose submission, never on bare load.
        assert!(!Page::Status.polls_on_load());
        assert!(!Page::Purpose.polls_on_load());
    }
}
