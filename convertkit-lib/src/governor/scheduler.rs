use futures::StreamExt;
use futures::stream;
use log::{debug, trace, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};

use super::call::{Call, Completion};
use super::config::RateLimitConfig;
use super::stats::GovernorStats;
use super::transport::{Attempt, Transport};
use super::window::Window;
use crate::types::{ApiError, Outcome, RequestDescription, Result};

/// Routes every call through a fixed-window rate ceiling.
///
/// At most `limit` calls are dispatched per window. Calls beyond that wait
/// in a FIFO queue and go out when the window resets. When the API answers
/// 429 anyway, the governor treats the current window as used up, restarts
/// the window from that moment and retries the throttled call after the
/// reset, ahead of everything else that is waiting.
///
/// Cloning is cheap and all clones share the same window. The reset timer
/// starts with the first call and stops once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Governor {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: RateLimitConfig,
    transport: Transport,
    window: Mutex<Window>,
    stats: Mutex<GovernorStats>,
    next_id: AtomicU64,
    draining: AtomicBool,
    /// Wakes the timer task when the deadline moved
    restart: Arc<Notify>,
    timer: Mutex<Option<AbortHandle>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timer = self.timer.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = timer.take() {
            timer.abort();
        }
    }
}

impl Governor {
    /// Create a governor sending through `transport`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not pass [`RateLimitConfig::validate`].
    pub fn new(config: RateLimitConfig, transport: Transport) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                window: Mutex::new(Window::new(&config)),
                config,
                transport,
                stats: Mutex::new(GovernorStats::default()),
                next_id: AtomicU64::new(1),
                draining: AtomicBool::new(false),
                restart: Arc::new(Notify::new()),
                timer: Mutex::new(None),
            }),
        })
    }

    /// The rate settings this governor enforces
    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.inner.config
    }

    /// Wrap a description into a new [`Call`] with a fresh id.
    #[must_use]
    pub fn call(&self, description: RequestDescription) -> Call {
        Call::new(self.inner.next_id.fetch_add(1, Ordering::Relaxed), description)
    }

    /// Perform a call under the rate ceiling.
    ///
    /// Goes out immediately if the current window has a free slot, otherwise
    /// waits in the queue for a later window.
    pub async fn request(&self, description: RequestDescription) -> Outcome {
        self.ensure_timer();
        let call = self.call(description);

        let admitted = self.lock_window().try_admit();
        if admitted {
            trace!("Call #{} admitted: {}", call.id(), call.description());
            call.send(self).await
        } else {
            debug!(
                "Window full, queueing call #{}: {}",
                call.id(),
                call.description()
            );
            // A reset may land between the admission check and the push
            self.push_pending(call, true).await
        }
    }

    /// Put a call at the back of the pending queue and return its
    /// completion handle.
    ///
    /// The call is not dispatched here, even if the current window has room.
    /// It goes out with the drain after the next reset.
    ///
    /// If the queue is bounded and full, the call turned away by the
    /// overflow policy is rejected with a `Queue Full` network error.
    pub fn enqueue(&self, call: Call) -> Completion {
        self.push_pending(call, false)
    }

    /// Treat the current window as used up and restart it from now.
    ///
    /// Nothing is dispatched until the reset fires.
    pub fn back_off(&self) {
        let interval = self.inner.config.interval;
        {
            let mut window = self.lock_window();
            window.saturate();
            window.set_deadline(Instant::now() + interval);
        }
        self.ensure_timer();
        self.inner.restart.notify_one();
        warn!(
            "Rate limited by the API, holding calls for {}ms",
            interval.as_millis()
        );
    }

    /// A snapshot of the counters, including the current queue length and
    /// window usage.
    #[must_use]
    pub fn stats(&self) -> GovernorStats {
        let (pending, window_count) = {
            let window = self.lock_window();
            (window.queued(), window.dispatched())
        };
        let mut stats = self.lock_stats().clone();
        stats.pending = pending;
        stats.window_count = window_count;
        stats
    }

    /// One exchange for `call`, counted in the statistics
    pub(crate) async fn attempt(&self, call: &Call) -> Attempt {
        let attempt = call.attempt(&self.inner.transport).await;
        self.lock_stats().record_attempt(&attempt);
        attempt
    }

    /// Queue a throttled call for the next window and wait for it.
    pub(crate) async fn retry(&self, mut call: Call) -> Outcome {
        let completion = call.wait();
        debug!("Retrying call #{} after the next reset", call.id());
        self.lock_window().push_retry(call);
        completion.await
    }

    /// Open a new window and drain what is waiting.
    fn reset(&self) {
        let queued = {
            let mut window = self.lock_window();
            window.reset(Instant::now() + self.inner.config.interval);
            window.queued()
        };
        self.lock_stats().resets += 1;
        debug!("Rate window reset, {queued} call(s) waiting");

        if queued > 0 {
            self.spawn_drain();
        }
    }

    fn push_pending(&self, mut call: Call, drain_if_open: bool) -> Completion {
        self.ensure_timer();
        let completion = call.wait();

        let (rejected, can_drain) = {
            let mut window = self.lock_window();
            let rejected = window.push(call);
            (rejected, drain_if_open && window.can_drain())
        };

        if let Some(mut rejected) = rejected {
            warn!(
                "Pending queue is full, rejecting call #{}: {}",
                rejected.id(),
                rejected.description()
            );
            self.lock_stats().rejected += 1;
            rejected.settle(Err(ApiError::queue_full()));
        }

        if can_drain {
            self.spawn_drain();
        }
        completion
    }

    fn spawn_drain(&self) {
        if self.inner.draining.swap(true, Ordering::AcqRel) {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(self.clone().drain());
            }
            Err(_) => {
                self.inner.draining.store(false, Ordering::Release);
                debug!("No runtime available, deferring drain to the next reset");
            }
        }
    }

    /// Dispatch queued calls in order while the window has room.
    async fn drain(self) {
        loop {
            let calls = stream::unfold(self.clone(), |governor| async move {
                let call = governor.lock_window().pop_admitted()?;
                Some((call, governor))
            });
            calls
                .for_each_concurrent(self.inner.config.drain_concurrency, |call| {
                    self.dispatch_queued(call)
                })
                .await;

            self.inner.draining.store(false, Ordering::Release);
            // A reset may have slipped in after the last pop
            let more = self.lock_window().can_drain();
            if !more || self.inner.draining.swap(true, Ordering::AcqRel) {
                break;
            }
        }
    }

    async fn dispatch_queued(&self, mut call: Call) {
        trace!("Dispatching queued call #{}: {}", call.id(), call.description());
        match self.attempt(&call).await {
            Attempt::Settled(outcome) => call.settle(outcome),
            Attempt::Throttled => {
                self.back_off();
                debug!("Queued call #{} throttled, requeueing", call.id());
                self.lock_window().push_retry(call);
            }
        }
    }

    /// Start the reset timer unless it is already running.
    fn ensure_timer(&self) {
        let mut timer = self
            .inner
            .timer
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if timer.is_some() {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            return;
        };

        {
            let mut window = self.lock_window();
            if window.deadline().is_none() {
                window.set_deadline(Instant::now() + self.inner.config.interval);
            }
        }

        let task = handle.spawn(run_timer(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.restart),
        ));
        *timer = Some(task.abort_handle());
        debug!(
            "Started rate window timer ({} calls per {}ms)",
            self.inner.config.limit,
            self.inner.config.interval.as_millis()
        );
    }

    fn lock_window(&self) -> MutexGuard<'_, Window> {
        self.inner.window.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_stats(&self) -> MutexGuard<'_, GovernorStats> {
        self.inner.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// The single reset timer.
///
/// Sleeps until the window deadline and resets the window. A notification
/// on `restart` means the deadline moved and the sleep starts over.
async fn run_timer(inner: Weak<Inner>, restart: Arc<Notify>) {
    loop {
        let deadline = match inner.upgrade() {
            Some(inner) => Governor { inner }.lock_window().deadline(),
            None => return,
        };

        tokio::select! {
            () = sleep_until_deadline(deadline) => {
                let Some(inner) = inner.upgrade() else { return };
                Governor { inner }.reset();
            }
            () = restart.notified() => {}
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
