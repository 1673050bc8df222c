//! # Poller
//!
//! Cancellable scheduled re-fetch of a view.
//!
//! ## Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Poller Task                                   │
//! │                                                                         │
//! │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐    │
//! │   │ interval     │   │ refresh_now  │   │ CancellationToken        │    │
//! │   │ tick         │   │ (Notify)     │   │                          │    │
//! │   └──────┬───────┘   └──────┬───────┘   └────────────┬─────────────┘    │
//! │          └────────┬─────────┘                        │                  │
//! │                   ▼                                  │                  │
//! │             fetch().await  ◄──── select! ────────────┤ abort in-flight  │
//! │                   │                                  │                  │
//! │                   ▼                                  │                  │
//! │     watch::send_if_modified (equal value: no notify) │                  │
//! │                                                      ▼                  │
//! │                                                    exit                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Snapshots are last-write-wins. A fetch still running when the token is
//! cancelled is dropped, and its result is never published.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

/// Settings of one poller.
#[derive(Debug, Clone)]
pub struct Poller {
    name: &'static str,
    interval: Duration,
    cancel: CancellationToken,
}

impl Poller {
    /// A poller named `name` (used in logs) that fetches every `interval`.
    ///
    /// Intervals under a millisecond are raised to one.
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval: interval.max(Duration::from_millis(1)),
            cancel: CancellationToken::new(),
        }
    }

    /// Stops with `parent` as well as on its own `cancel`.
    pub fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Starts the poll loop. The first fetch runs immediately.
    pub fn spawn<T, F, Fut>(self, mut fetch: F) -> PollerHandle<T>
    where
        T: PartialEq + Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send,
    {
        let (tx, rx) = watch::channel(None);
        let refresh = Arc::new(Notify::new());
        let Poller {
            name,
            interval,
            cancel,
        } = self;

        let task = {
            let refresh = refresh.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                debug!(poller = name, interval_secs = interval.as_secs_f64(), "Poller started");

                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = refresh.notified() => {
                            trace!(poller = name, "Refresh requested");
                            ticker.reset();
                        }
                        _ = ticker.tick() => {}
                    }

                    let value = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!(poller = name, "Dropping in-flight fetch");
                            break;
                        }
                        value = fetch() => value,
                    };

                    let published = tx.send_if_modified(|current| {
                        if current.as_ref() == Some(&value) {
                            false
                        } else {
                            *current = Some(value);
                            true
                        }
                    });
                    if published {
                        debug!(poller = name, "Published new snapshot");
                    } else {
                        trace!(poller = name, "Snapshot unchanged");
                    }
                }

                info!(poller = name, "Poller stopped");
            })
        };

        PollerHandle {
            rx,
            refresh,
            cancel,
            task,
        }
    }
}

/// Control side of a running poller.
pub struct PollerHandle<T> {
    rx: watch::Receiver<Option<T>>,
    refresh: Arc<Notify>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<T> PollerHandle<T> {
    /// Receiver of published snapshots (`None` until the first fetch).
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }

    /// Fetches now instead of waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels and waits for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

impl<T: Clone> PollerHandle<T> {
    pub fn latest(&self) -> Option<T> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{sleep, Instant};

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (calls.clone(), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_without_renotifying_duplicates() {
        let (calls, seen) = counter();
        let handle = Poller::new("test", Duration::from_secs(3)).spawn(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                42
            }
        });

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(42));

        sleep(Duration::from_secs(7)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 3);
        assert!(!rx.has_changed().unwrap());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_skips_the_wait() {
        let (calls, _) = counter();
        let handle = Poller::new("test", Duration::from_secs(30)).spawn(move || {
            let calls = calls.clone();
            async move { calls.fetch_add(1, Ordering::SeqCst) + 1 }
        });

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(1));

        let started = Instant::now();
        sleep(Duration::from_secs(1)).await;
        handle.refresh_now();
        rx.changed().await.unwrap();

        assert_eq!(*rx.borrow_and_update(), Some(2));
        assert!(started.elapsed() < Duration::from_secs(30));
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_poller_publishes_nothing() {
        let (calls, seen) = counter();
        let handle = Poller::new("test", Duration::from_secs(3)).spawn(move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                sleep(Duration::from_secs(10)).await;
                7
            }
        });
        let rx = handle.subscribe();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        handle.cancel();
        assert!(handle.is_cancelled());

        sleep(Duration::from_secs(20)).await;
        assert!(rx.borrow().is_none());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_parent_token_stops_child_pollers() {
        let parent = CancellationToken::new();
        let handle = Poller::new("child", Duration::from_secs(3))
            .with_parent(&parent)
            .spawn(|| async { 1 });

        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        parent.cancel();
        assert!(handle.is_cancelled());
        handle.shutdown().await;
    }
}
