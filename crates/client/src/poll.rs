//! Periodic refresh of read-only views.
//!
//! A [`Poller`] runs a fetch on a fixed interval in a background task and
//! publishes each successful result through a `watch` channel. A failed
//! fetch is logged and the previous value is kept. Dropping the poller
//! stops the task.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::overview::CashbackOverview;
use crate::repository::SettingsRepository;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Background task that keeps the latest value of a view.
#[derive(Debug)]
pub struct Poller<T> {
    receiver: watch::Receiver<Option<T>>,
    task: JoinHandle<()>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start polling. The first fetch runs immediately.
    ///
    /// A zero interval is raised to one millisecond.
    pub fn spawn<F, Fut, E>(name: &'static str, interval: Duration, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display,
    {
        let (sender, receiver) = watch::channel(None);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval.max(MIN_INTERVAL));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                match fetch().await {
                    Ok(value) => {
                        debug!(poller = name, "Refreshed");
                        if sender.send(Some(value)).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(poller = name, error = %e, "Refresh failed, keeping last value"),
                }
            }
        });

        Self { receiver, task }
    }

    /// Most recent successful result, if any.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    /// Receiver notified on every successful refresh.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.receiver.clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Poll the cashback overview.
pub fn poll_overview<R>(repository: R, interval: Duration) -> Poller<CashbackOverview>
where
    R: SettingsRepository + Clone + 'static,
{
    Poller::spawn("cashback_overview", interval, move || {
        let repository = repository.clone();
        async move { repository.cashback_overview().await }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_publishes_each_refresh() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let poller = Poller::spawn("counter", Duration::from_secs(30), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, String>(n) }
        });

        let mut updates = poller.subscribe();
        updates.changed().await.unwrap();
        assert_eq!(poller.latest(), Some(1));

        updates.changed().await.unwrap();
        assert_eq!(poller.latest(), Some(2));
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_last_value() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let poller = Poller::spawn("flaky", Duration::from_secs(5), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(String::from("first"))
                } else {
                    Err("backend unavailable")
                }
            }
        });

        let mut updates = poller.subscribe();
        updates.changed().await.unwrap();

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(calls.load(Ordering::SeqCst) >= 3);
        assert_eq!(poller.latest().as_deref(), Some("first"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_still_publishes() {
        let poller = Poller::spawn("zero", Duration::ZERO, || async { Ok::<_, String>(7) });

        let mut updates = poller.subscribe();
        updates.changed().await.unwrap();
        assert_eq!(poller.latest(), Some(7));
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let poller = Poller::spawn("dropped", Duration::from_secs(1), || async {
            Ok::<_, String>(())
        });
        let mut updates = poller.subscribe();
        updates.changed().await.unwrap();

        drop(poller);

        // Sender is dropped with the aborted task.
        while updates.changed().await.is_ok() {}
    }
}
