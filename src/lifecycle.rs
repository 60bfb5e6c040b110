//! Request lifecycle controller.
//!
//! One `RequestLifecycle` belongs to one form instance and drives its
//! `Idle -> Pending -> Fulfilled | Rejected` cycle. Overlapping submits follow
//! last-submit-wins: every submit takes a new sequence number, and a result
//! is published only if its sequence is still the latest when it settles.

use crate::errors::ErrorReport;
use crate::models::{PredictionRequest, PredictionResponse};
use crate::prediction_client::PredictionTransport;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Exactly one of these holds at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Pending,
    Fulfilled(PredictionResponse),
    Rejected(ErrorReport),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

/// How a submitted request ended from the controller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result became the current state.
    Applied,
    /// A later submit (or a clear) took over; the result was dropped.
    Superseded,
    /// The form was torn down; nothing was touched.
    Discarded,
}

#[derive(Debug, Default)]
struct Ledger {
    latest: u64,
    torn_down: bool,
}

pub struct RequestLifecycle {
    transport: Arc<dyn PredictionTransport>,
    ledger: Arc<Mutex<Ledger>>,
    state: Arc<watch::Sender<RequestState>>,
}

fn lock(ledger: &Mutex<Ledger>) -> MutexGuard<'_, Ledger> {
    ledger.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RequestLifecycle {
    pub fn new(transport: Arc<dyn PredictionTransport>) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            transport,
            ledger: Arc::new(Mutex::new(Ledger::default())),
            state: Arc::new(state),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Moves to `Pending` and sends `request` on a spawned task.
    ///
    /// Any request still in flight is superseded: its result will be
    /// dropped on arrival. Must be called within a Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `JoinHandle<Settlement>` - Resolves once this request has settled.
    pub fn submit(&self, request: PredictionRequest) -> JoinHandle<Settlement> {
        let ticket = {
            let mut ledger = lock(&self.ledger);
            if ledger.torn_down {
                tracing::debug!("Submit ignored: form already torn down");
                return tokio::spawn(async { Settlement::Discarded });
            }
            ledger.latest += 1;
            if self.state.borrow().is_pending() {
                tracing::debug!(
                    "Request #{} supersedes in-flight request #{}",
                    ledger.latest,
                    ledger.latest - 1
                );
            }
            self.state.send_replace(RequestState::Pending);
            ledger.latest
        };

        let transport = Arc::clone(&self.transport);
        let ledger = Arc::clone(&self.ledger);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            let outcome = transport.predict(&request).await;

            let ledger = lock(&ledger);
            if ledger.torn_down {
                tracing::debug!("Request #{} settled after teardown, ignoring", ticket);
                return Settlement::Discarded;
            }
            if ledger.latest != ticket {
                tracing::debug!(
                    "Request #{} settled after newer request #{}, ignoring",
                    ticket,
                    ledger.latest
                );
                return Settlement::Superseded;
            }

            let next = match outcome {
                Ok(response) => RequestState::Fulfilled(response),
                Err(e) => {
                    tracing::warn!("Request #{} rejected: {}", ticket, e);
                    RequestState::Rejected(ErrorReport::from(&e))
                }
            };
            state.send_replace(next);
            Settlement::Applied
        })
    }

    /// Returns to `Idle`, superseding any in-flight request.
    pub fn clear(&self) {
        let mut ledger = lock(&self.ledger);
        if ledger.torn_down {
            return;
        }
        ledger.latest += 1;
        self.state.send_replace(RequestState::Idle);
    }

    /// Stops all further state mutation. Results still in flight are
    /// discarded when they arrive.
    pub fn teardown(&self) {
        lock(&self.ledger).torn_down = true;
    }

    pub fn is_torn_down(&self) -> bool {
        lock(&self.ledger).torn_down
    }
}

impl Drop for RequestLifecycle {
    fn drop(&mut self) {
        self.teardown();
    }
}
