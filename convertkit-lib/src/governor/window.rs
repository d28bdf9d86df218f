use log::debug;
use std::collections::VecDeque;
use tokio::time::Instant;

use super::call::Call;
use super::config::{OverflowPolicy, RateLimitConfig};

/// Book-keeping for one fixed rate window and the calls waiting for the next
/// one.
///
/// `dispatched` never exceeds `limit`: every admission checks and increments
/// under the same borrow, and [`Window::saturate`] only ever raises the count
/// to the limit itself.
#[derive(Debug)]
pub(crate) struct Window {
    limit: usize,
    max_pending: Option<usize>,
    overflow: OverflowPolicy,
    dispatched: usize,
    /// Throttled calls. Drained before `pending` and not subject to
    /// `max_pending`.
    retries: VecDeque<Call>,
    pending: VecDeque<Call>,
    deadline: Option<Instant>,
}

impl Window {
    pub(crate) fn new(config: &RateLimitConfig) -> Self {
        Self {
            limit: config.limit,
            max_pending: config.max_pending,
            overflow: config.overflow,
            dispatched: 0,
            retries: VecDeque::new(),
            pending: VecDeque::new(),
            deadline: None,
        }
    }

    /// Take a slot in the current window if one is left.
    pub(crate) fn try_admit(&mut self) -> bool {
        if self.dispatched < self.limit {
            self.dispatched += 1;
            true
        } else {
            false
        }
    }

    /// Mark the window as used up.
    pub(crate) const fn saturate(&mut self) {
        self.dispatched = self.limit;
    }

    /// Open a fresh window ending at `deadline`.
    pub(crate) const fn reset(&mut self, deadline: Instant) {
        self.dispatched = 0;
        self.deadline = Some(deadline);
    }

    /// Pop the next queued call and take a slot for it, or `None` if the
    /// window is full or nothing is queued.
    ///
    /// Abandoned calls are dropped on the way without taking a slot.
    pub(crate) fn pop_admitted(&mut self) -> Option<Call> {
        if self.dispatched >= self.limit {
            return None;
        }
        loop {
            let call = self
                .retries
                .pop_front()
                .or_else(|| self.pending.pop_front())?;
            if call.is_abandoned() {
                debug!("Dropping call #{}, nobody is waiting for it", call.id());
                continue;
            }
            self.dispatched += 1;
            return Some(call);
        }
    }

    /// Queue a call behind all others.
    ///
    /// Returns the call that was turned away when the queue is bounded and
    /// full: the incoming one under [`OverflowPolicy::RejectNew`], the oldest
    /// one under [`OverflowPolicy::RejectOldest`].
    pub(crate) fn push(&mut self, call: Call) -> Option<Call> {
        match self.max_pending {
            Some(max) if self.pending.len() >= max => match self.overflow {
                OverflowPolicy::RejectNew => Some(call),
                OverflowPolicy::RejectOldest => {
                    let evicted = self.pending.pop_front();
                    self.pending.push_back(call);
                    evicted
                }
            },
            _ => {
                self.pending.push_back(call);
                None
            }
        }
    }

    /// Queue a throttled call for the next window.
    pub(crate) fn push_retry(&mut self, call: Call) {
        self.retries.push_back(call);
    }

    /// Whether a drain would dispatch anything right now.
    pub(crate) fn can_drain(&self) -> bool {
        self.dispatched < self.limit && self.queued() > 0
    }

    pub(crate) fn queued(&self) -> usize {
        self.retries.len() + self.pending.len()
    }

    pub(crate) const fn dispatched(&self) -> usize {
        self.dispatched
    }

    pub(crate) const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub(crate) const fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }
}
