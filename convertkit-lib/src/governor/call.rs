use futures::FutureExt;
use futures::future::{Shared, WeakShared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use super::Governor;
use super::transport::{Attempt, Transport};
use crate::types::{ApiError, Outcome, RequestDescription};

/// Awaitable side of a [`Call`].
///
/// All clones observe the same outcome. If the call is dropped without ever
/// being settled, the completion resolves to a `Cancelled` network error.
#[derive(Clone)]
pub struct Completion(Shared<oneshot::Receiver<Outcome>>);

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0
            .poll_unpin(cx)
            .map(|received| received.unwrap_or_else(|_| Err(ApiError::cancelled())))
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.0.peek().is_some())
            .finish()
    }
}

/// One logical API call and its single-resolution completion handle.
///
/// A call keeps its id across re-submissions, so a call that is throttled
/// and queued again is still the same call to whoever awaits it.
pub struct Call {
    id: u64,
    description: RequestDescription,
    completion: Option<oneshot::Sender<Outcome>>,
    /// Held weakly so that the call notices when every waiter is gone
    waiter: Option<WeakShared<oneshot::Receiver<Outcome>>>,
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl Call {
    pub(crate) const fn new(id: u64, description: RequestDescription) -> Self {
        Self {
            id,
            description,
            completion: None,
            waiter: None,
        }
    }

    /// Identifier assigned by the governor
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// The request this call performs
    #[must_use]
    pub const fn description(&self) -> &RequestDescription {
        &self.description
    }

    /// Whether the handle returned by [`Call::wait`] has been settled
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.waiter.is_some() && self.completion.is_none()
    }

    /// Whether a handle was handed out and every copy of it has been
    /// dropped since. Nobody would see the outcome of such a call.
    #[must_use]
    pub fn is_abandoned(&self) -> bool {
        self.completion
            .as_ref()
            .is_some_and(oneshot::Sender::is_closed)
    }

    /// Get the awaitable outcome of this call.
    ///
    /// The handle is created on first use; later calls return clones of the
    /// same handle while any of them is alive.
    pub fn wait(&mut self) -> Completion {
        if let Some(shared) = self.waiter.as_ref().and_then(WeakShared::upgrade) {
            return Completion(shared);
        }
        if self.is_settled() {
            // Settled and nobody kept the handle: the outcome is gone
            let (tx, rx) = oneshot::channel();
            drop(tx);
            return Completion(rx.shared());
        }

        let (tx, rx) = oneshot::channel();
        let shared = rx.shared();
        self.completion = Some(tx);
        self.waiter = shared.downgrade();
        Completion(shared)
    }

    /// Settle the completion handle, if one was handed out.
    ///
    /// Only the first settlement has an effect.
    pub(crate) fn settle(&mut self, outcome: Outcome) {
        if let Some(tx) = self.completion.take() {
            // The receiver may be gone if nobody awaits the call anymore
            let _ = tx.send(outcome);
        }
    }

    /// Perform one HTTP exchange without touching any governor state
    pub(crate) async fn attempt(&self, transport: &Transport) -> Attempt {
        transport.attempt(&self.description).await
    }

    /// Execute the call.
    ///
    /// Resolves with the parsed body or rejects with a classified error,
    /// settling the completion handle either way. On HTTP 429 the call asks
    /// the governor to back off, joins the retry queue and returns whatever
    /// that later attempt produces.
    pub async fn send(mut self, governor: &Governor) -> Outcome {
        match governor.attempt(&self).await {
            Attempt::Settled(outcome) => {
                self.settle(outcome.clone());
                outcome
            }
            Attempt::Throttled => {
                governor.back_off();
                governor.retry(self).await
            }
        }
    }
}
