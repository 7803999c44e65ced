/// The status poller — the polling-driven state machine at the heart of the
/// kiosk.
///
/// Every live page owns one poller.  On a fixed interval it samples the
/// status value, classifies it against the page's transition table, and on
/// the first recognised token reports the target page exactly once, then
/// stops itself.  A dropped handle aborts the task, so navigation (which
/// replaces the page and its poller) can never leave a timer behind.
use std::time::Duration;

use kiosk_proto::flow::{Page, TransitionTable};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::source::StatusSource;

/// Cancellation handle for a running poller.  Dropping it tears the poller
/// down; a transition also ends the task from the inside.
pub struct PollerHandle {
    join: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(&self) {
        self.join.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.join.abort();
    }
}

/// Start polling `source` every `interval`, reporting the first matched
/// transition on `fired`.
///
/// The first sample happens one full interval after start — there is no
/// eager read on tick zero.  The sample is awaited inline, so at most one
/// read is ever in flight; a slow read delays the next tick (missed ticks
/// are skipped, never stacked).
pub fn start<S>(
    mut source: S,
    table: TransitionTable,
    interval: Duration,
    fired: mpsc::Sender<Page>,
) -> PollerHandle
where
    S: StatusSource,
{
    let join = tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            // A failed read is a silently dropped tick.
            let Some(sample) = source.sample().await else {
                continue;
            };

            if let Some(target) = table.classify(&sample) {
                debug!("poller: sample {:?} -> {}", sample.trim(), target);
                let _ = fired.send(target).await;
                // Fire exactly once, then stop scheduling ticks.  We must
                // not rely on the page teardown aborting us — a tick could
                // already be in flight.
                break;
            }
        }
    });

    PollerHandle { join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::time::Instant;

    /// Scripted source: returns the next entry per tick, `None` entries
    /// modelling failed reads.  Exhausted scripts keep returning `None`.
    struct Scripted {
        samples: VecDeque<Option<String>>,
    }

    impl Scripted {
        fn new(samples: &[Option<&str>]) -> Self {
            Self {
                samples: samples
                    .iter()
                    .map(|s| s.map(str::to_string))
                    .collect(),
            }
        }
    }

    impl StatusSource for Scripted {
        async fn sample(&mut self) -> Option<String> {
            self.samples.pop_front().flatten()
        }
    }

    fn password_table() -> TransitionTable {
        Page::Password.table().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_at_the_matching_tick() {
        // Scenario: ["", "tru", "true"] — partial values must not match;
        // the transition fires exactly once, at tick 3.
        let source = Scripted::new(&[Some(""), Some("tru"), Some("true")]);
        let (tx, mut rx) = mpsc::channel(1);
        let started = Instant::now();
        let _handle = start(source, password_table(), Duration::from_secs(1), tx);

        assert_eq!(rx.recv().await, Some(Page::Status));
        assert_eq!(started.elapsed(), Duration::from_secs(3));

        // Sender dropped when the task ended — no second transition, ever.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn read_failures_are_dropped_ticks() {
        // Scenario: failures on ticks 1-3, then "false" on tick 4.
        let source = Scripted::new(&[None, None, None, Some("false")]);
        let (tx, mut rx) = mpsc::channel(1);
        let started = Instant::now();
        let _handle = start(source, password_table(), Duration::from_secs(1), tx);

        assert_eq!(rx.recv().await, Some(Page::Fail));
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn no_eager_sample_before_first_interval() {
        let source = Scripted::new(&[Some("true")]);
        let (tx, mut rx) = mpsc::channel(1);
        let _handle = start(source, password_table(), Duration::from_secs(1), tx);

        // Nothing may fire inside the first interval.
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        assert_eq!(rx.recv().await, Some(Page::Status));
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_samples_poll_forever() {
        let source = Scripted::new(&[Some("checking"), Some("continue")]);
        let (tx, mut rx) = mpsc::channel(1);
        let _handle = start(source, password_table(), Duration::from_secs(1), tx);

        let waited =
            tokio::time::timeout(Duration::from_secs(30), rx.recv()).await;
        assert!(waited.is_err(), "no transition may fire without a token");
    }

    #[tokio::test(start_paused = true)]
    async fn no_ticks_scheduled_after_a_transition() {
        let source = Scripted::new(&[Some("true"), Some("false"), Some("false")]);
        let (tx, mut rx) = mpsc::channel(1);
        let handle = start(source, password_table(), Duration::from_secs(1), tx);

        assert_eq!(rx.recv().await, Some(Page::Status));

        // Advance well past several more intervals: the task is gone, the
        // remaining script entries are never read.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(handle.is_finished());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_the_handle_cancels_polling() {
        let source = Scripted::new(&[Some("true")]);
        let (tx, mut rx) = mpsc::channel(1);
        let handle = start(source, password_table(), Duration::from_secs(1), tx);

        handle.stop();
        let waited = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(waited, Ok(None)), "aborted poller must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn ambiguous_sample_is_deterministic() {
        // A value containing both tokens takes the first declared entry.
        let source = Scripted::new(&[Some("truefalse")]);
        let (tx, mut rx) = mpsc::channel(1);
        let _handle = start(source, password_table(), Duration::from_secs(1), tx);

        assert_eq!(rx.recv().await, Some(Page::Status));
    }
}
