use std::{
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};

#[derive(Debug)]
struct Scheduled {
    handle: JoinHandle<()>,
    /// Set by whichever side acts first: the task starting or the call being cancelled.
    claimed: Arc<AtomicBool>,
}

/// Coalesces bursts of calls made within `window` into the trailing one.
///
/// Every [`Debouncer::call`] cancels the previously scheduled call if it is
/// still waiting out its window, so only the last call of a burst runs. A call
/// that has already started is never interrupted; [`Debouncer::finish`] waits
/// for those.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    scheduled: Option<Scheduled>,
    running: Vec<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            scheduled: None,
            running: Vec::new(),
        }
    }

    pub fn call<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let window = self.window;
        let claimed = Arc::new(AtomicBool::new(false));
        let flag = claimed.clone();
        let handle = tokio::spawn(async move {
            time::sleep(window).await;
            if flag.swap(true, Ordering::SeqCst) {
                return;
            }
            task.await;
        });
        self.scheduled = Some(Scheduled { handle, claimed });
    }

    /// Drops the scheduled call unless it already started running.
    pub fn cancel(&mut self) {
        let Some(scheduled) = self.scheduled.take() else {
            return;
        };
        if scheduled.claimed.swap(true, Ordering::SeqCst) {
            self.running.retain(|handle| !handle.is_finished());
            self.running.push(scheduled.handle);
        } else {
            scheduled.handle.abort();
        }
    }

    /// Cancels the scheduled call and waits for started ones to complete.
    pub async fn finish(&mut self) {
        self.cancel();
        for handle in self.running.drain(..) {
            if let Err(err) = handle.await {
                log::warn!("Debounced task ended abnormally: {err}");
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Rate limiter admitting at most one call per `window`; extra calls are dropped.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn debouncer_runs_only_trailing_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        for value in 1..=3 {
            let hits = hits.clone();
            let last = last.clone();
            debouncer.call(async move {
                hits.fetch_add(1, Ordering::SeqCst);
                last.store(value, Ordering::SeqCst);
            });
            time::sleep(Duration::from_millis(100)).await;
        }

        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_debouncer_never_fires() {
        let hits = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let counter = hits.clone();
        debouncer.call(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel();

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_waits_for_started_call_and_drops_waiting_one() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        let counter = done.clone();
        debouncer.call(async move {
            time::sleep(Duration::from_secs(1)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });
        time::sleep(Duration::from_millis(600)).await;

        let counter = done.clone();
        debouncer.call(async move {
            counter.fetch_add(10, Ordering::SeqCst);
        });
        debouncer.finish().await;

        assert_eq!(done.load(Ordering::SeqCst), 1);
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_admits_one_call_per_window() {
        let mut throttle = Throttle::new(Duration::from_millis(250));
        assert!(throttle.try_acquire());
        assert!(!throttle.try_acquire());

        time::advance(Duration::from_millis(249)).await;
        assert!(!throttle.try_acquire());

        time::advance(Duration::from_millis(1)).await;
        assert!(throttle.try_acquire());
    }
}
