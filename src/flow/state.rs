//! The flow state machine.
//!
//! Rather than spreading the state across ad hoc URL branching, the flow is
//! a tagged union with pure transition functions; storage reads/writes and
//! URL flags are serialization of this union at process boundaries.

use serde::{Deserialize, Serialize};

use crate::models::OptimizationDraft;

/// Lifecycle status persisted alongside a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Preview,
    Completed,
}

/// The client-persisted snapshot of an in-flight optimization.
///
/// Owned exclusively by the browser session, one active instance at a time
/// (last-write-wins key). Expires 30 minutes after `saved_at_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOptimizationState {
    pub draft: OptimizationDraft,
    pub status: DraftStatus,
    pub paid: bool,
    pub payment_pending: bool,
    pub saved_at_ms: i64,
}

impl StoredOptimizationState {
    pub fn expired(&self, now_ms: i64, expiration_ms: i64) -> bool {
        now_ms - self.saved_at_ms > expiration_ms
    }
}

/// Where the user is in the optimize-to-payment flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowState {
    /// No submission in flight.
    Idle,
    /// Results exist but are locked behind payment.
    Previewing(OptimizationDraft),
    /// Payment was interrupted by the account-or-guest decision.
    AwaitingAuth(OptimizationDraft),
    /// The payment step is open (or being resumed).
    AwaitingPayment(OptimizationDraft),
    /// Payment confirmed; full results unlocked.
    Paid(OptimizationDraft),
}

/// Events that drive the flow.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    SubmissionAccepted(OptimizationDraft),
    /// The user asked to purchase. Authenticated users go straight to the
    /// payment step; everyone else hits the auth gate first.
    PaymentRequested { authenticated: bool },
    AuthCompleted,
    GuestChosen,
    PaymentSucceeded,
    /// The payment modal was dismissed. Does not cancel an already-submitted
    /// authorization.
    PaymentCancelled,
    Reset,
}

/// Pure transition function. Invalid (state, event) pairs leave the state
/// unchanged rather than failing: a stray event after a reload is noise,
/// not an error.
pub fn apply(state: FlowState, event: FlowEvent) -> FlowState {
    use FlowEvent::*;
    use FlowState::*;

    match (state, event) {
        (_, Reset) => Idle,
        (_, SubmissionAccepted(draft)) => Previewing(draft),
        (Previewing(draft), PaymentRequested { authenticated: true }) => AwaitingPayment(draft),
        (Previewing(draft), PaymentRequested { authenticated: false }) => AwaitingAuth(draft),
        (AwaitingAuth(draft), AuthCompleted) => AwaitingPayment(draft),
        (AwaitingAuth(draft), GuestChosen) => AwaitingPayment(draft),
        (AwaitingPayment(draft), PaymentSucceeded) => Paid(draft),
        (AwaitingPayment(draft), PaymentCancelled) => Previewing(draft),
        (state, _) => state,
    }
}

impl FlowState {
    /// Snapshot this state for durable client storage.
    ///
    /// `Idle` has nothing to persist. The confirmation secret is never part
    /// of the snapshot; only draft/status/paid/pending flags are stored.
    pub fn to_stored(&self, now_ms: i64) -> Option<StoredOptimizationState> {
        let (draft, status, paid, payment_pending) = match self {
            FlowState::Idle => return None,
            FlowState::Previewing(d) => (d, DraftStatus::Preview, false, false),
            FlowState::AwaitingAuth(d) => (d, DraftStatus::Preview, false, true),
            FlowState::AwaitingPayment(d) => (d, DraftStatus::Preview, false, true),
            FlowState::Paid(d) => (d, DraftStatus::Completed, true, false),
        };
        Some(StoredOptimizationState {
            draft: draft.clone(),
            status,
            paid,
            payment_pending,
            saved_at_ms: now_ms,
        })
    }

    /// Rebuild flow state from a stored snapshot after a reload.
    pub fn from_stored(stored: StoredOptimizationState) -> FlowState {
        if stored.paid {
            FlowState::Paid(stored.draft)
        } else if stored.payment_pending {
            FlowState::AwaitingPayment(stored.draft)
        } else {
            FlowState::Previewing(stored.draft)
        }
    }

    pub fn draft(&self) -> Option<&OptimizationDraft> {
        match self {
            FlowState::Idle => None,
            FlowState::Previewing(d)
            | FlowState::AwaitingAuth(d)
            | FlowState::AwaitingPayment(d)
            | FlowState::Paid(d) => Some(d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Suggestions;

    fn draft() -> OptimizationDraft {
        OptimizationDraft {
            original_content: "raw words".into(),
            optimized_content: "better words".into(),
            word_count: 2,
            price_cents: 2500,
            suggestions: Suggestions {
                titles: vec!["A title".into()],
                keywords: vec!["words".into()],
                meta_description: "About words.".into(),
            },
        }
    }

    #[test]
    fn test_happy_path_authenticated() {
        let s = apply(FlowState::Idle, FlowEvent::SubmissionAccepted(draft()));
        assert_eq!(s, FlowState::Previewing(draft()));
        let s = apply(s, FlowEvent::PaymentRequested { authenticated: true });
        assert_eq!(s, FlowState::AwaitingPayment(draft()));
        let s = apply(s, FlowEvent::PaymentSucceeded);
        assert_eq!(s, FlowState::Paid(draft()));
    }

    #[test]
    fn test_unauthenticated_goes_through_gate() {
        let s = apply(
            FlowState::Previewing(draft()),
            FlowEvent::PaymentRequested { authenticated: false },
        );
        assert_eq!(s, FlowState::AwaitingAuth(draft()));
        assert_eq!(
            apply(s.clone(), FlowEvent::AuthCompleted),
            FlowState::AwaitingPayment(draft())
        );
        assert_eq!(
            apply(s, FlowEvent::GuestChosen),
            FlowState::AwaitingPayment(draft())
        );
    }

    #[test]
    fn test_cancel_returns_to_preview() {
        let s = apply(FlowState::AwaitingPayment(draft()), FlowEvent::PaymentCancelled);
        assert_eq!(s, FlowState::Previewing(draft()));
    }

    #[test]
    fn test_invalid_events_are_noops() {
        assert_eq!(apply(FlowState::Idle, FlowEvent::PaymentSucceeded), FlowState::Idle);
        assert_eq!(
            apply(FlowState::Paid(draft()), FlowEvent::PaymentCancelled),
            FlowState::Paid(draft())
        );
    }

    #[test]
    fn test_stored_round_trip() {
        let state = FlowState::AwaitingPayment(draft());
        let stored = state.to_stored(1000).unwrap();
        assert!(stored.payment_pending);
        assert!(!stored.paid);
        assert_eq!(FlowState::from_stored(stored), state);

        let paid = FlowState::Paid(draft()).to_stored(2000).unwrap();
        assert_eq!(paid.status, DraftStatus::Completed);
        assert!(paid.paid);
        assert_eq!(FlowState::from_stored(paid), FlowState::Paid(draft()));
    }
}
