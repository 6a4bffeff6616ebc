//! UI-facing state machine around a single idea submission.
//!
//! One controller is created per opening of the submission surface. It keeps
//! at most one gateway call in flight and drops results that arrive after the
//! surface was dismissed.

use std::time::Duration;

use shared::{domain::RawFields, protocol::SubmissionResult};
use tokio::sync::watch;
use tracing::debug;

use crate::IdeaGateway;

pub const DEFAULT_DISMISS_GRACE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

impl LifecycleState {
    /// Whether the submit trigger is enabled. A failed attempt leaves the form
    /// on screen, so it may be submitted again.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, LifecycleState::Idle | LifecycleState::Failed(_))
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, LifecycleState::Submitting)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            LifecycleState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Current state plus the attempt counter that guards late results.
///
/// `in_flight` outlives a dismissal: the state may already read `Idle` while
/// the abandoned gateway call is still running.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Lifecycle {
    state: LifecycleState,
    attempt: u64,
    in_flight: bool,
}

impl Lifecycle {
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn accepts_submit(&self) -> bool {
        !self.in_flight && self.state.accepts_submit()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The gateway answered and the state moved to `Succeeded` or `Failed`.
    Completed(SubmissionResult),
    /// Another attempt was in flight, or the attempt had already succeeded.
    Ignored,
    /// The surface was dismissed while the call was in flight.
    Discarded,
}

pub struct SubmissionController<G> {
    gateway: G,
    lifecycle: watch::Sender<Lifecycle>,
    dismiss_grace: Duration,
}

impl<G: IdeaGateway> SubmissionController<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            lifecycle: watch::Sender::new(Lifecycle::default()),
            dismiss_grace: DEFAULT_DISMISS_GRACE,
        }
    }

    pub fn with_dismiss_grace(mut self, grace: Duration) -> Self {
        self.dismiss_grace = grace;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.borrow().state.clone()
    }

    pub fn can_submit(&self) -> bool {
        self.lifecycle.borrow().accepts_submit()
    }

    pub fn subscribe(&self) -> watch::Receiver<Lifecycle> {
        self.lifecycle.subscribe()
    }

    /// Runs one submission attempt with a snapshot of the form fields.
    pub async fn submit(&self, fields: RawFields) -> SubmitOutcome {
        let mut started = None;
        self.lifecycle.send_if_modified(|lifecycle| {
            if !lifecycle.accepts_submit() {
                return false;
            }
            lifecycle.attempt += 1;
            lifecycle.in_flight = true;
            lifecycle.state = LifecycleState::Submitting;
            started = Some(lifecycle.attempt);
            true
        });
        let Some(attempt) = started else {
            debug!("submit ignored while not accepting submissions");
            return SubmitOutcome::Ignored;
        };

        let result = self.gateway.submit(fields).await;

        let mut applied = false;
        self.lifecycle.send_modify(|lifecycle| {
            lifecycle.in_flight = false;
            if lifecycle.attempt != attempt || !lifecycle.state.is_submitting() {
                return;
            }
            lifecycle.state = match &result {
                SubmissionResult::Accepted => LifecycleState::Succeeded,
                SubmissionResult::Rejected { message } => LifecycleState::Failed(message.clone()),
            };
            applied = true;
        });

        if applied {
            SubmitOutcome::Completed(result)
        } else {
            debug!(attempt, "dropping result of dismissed submission");
            SubmitOutcome::Discarded
        }
    }

    /// Closes the surface: the current attempt is abandoned at once and the
    /// state returns to `Idle` once the grace delay has passed. A new attempt
    /// is refused until the abandoned gateway call has returned.
    pub async fn dismiss(&self) {
        let mut closed = 0;
        self.lifecycle.send_if_modified(|lifecycle| {
            lifecycle.attempt += 1;
            closed = lifecycle.attempt;
            false
        });

        if !self.dismiss_grace.is_zero() {
            tokio::time::sleep(self.dismiss_grace).await;
        }

        self.lifecycle.send_if_modified(|lifecycle| {
            // a new attempt started during the grace delay
            if lifecycle.attempt != closed || lifecycle.state == LifecycleState::Idle {
                return false;
            }
            lifecycle.state = LifecycleState::Idle;
            true
        });
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
