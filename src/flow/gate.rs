//! The guest-or-account decision gate.
//!
//! Triggered when a user without an active session tries to pay. Account
//! paths stash the in-flight draft and a return intent so the payment step
//! can reopen after the auth redirect; the guest path deliberately clears
//! both - a guest's draft is never persisted server-side, even if payment
//! succeeds.

use crate::flow::flags::ReturnFlags;
use crate::flow::store::{FlowStorage, KeyValueStore, ReturnIntent};
use crate::flow::state::DraftStatus;
use crate::models::OptimizationDraft;

/// The three exclusive outcomes the gate offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthGateChoice {
    CreateAccount,
    SignIn,
    ContinueAsGuest,
}

/// What the caller should do after the gate resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Navigate to an auth page; state and return intent are stashed.
    Navigate(String),
    /// Proceed straight to the payment step (guest).
    ProceedToPayment,
}

/// Resolve an auth-gate choice against the client stores.
pub fn resolve_auth_gate<S: KeyValueStore>(
    choice: AuthGateChoice,
    draft: &OptimizationDraft,
    storage: &FlowStorage<S>,
    now_ms: i64,
) -> GateOutcome {
    match choice {
        AuthGateChoice::CreateAccount | AuthGateChoice::SignIn => {
            storage.save_state(draft, DraftStatus::Preview, false, true, now_ms);
            storage.set_return_intent(&ReturnIntent {
                target: ReturnFlags::resume_payment().optimize_path(),
            });
            let path = match choice {
                AuthGateChoice::CreateAccount => "/signup",
                _ => "/login",
            };
            GateOutcome::Navigate(path.to_string())
        }
        AuthGateChoice::ContinueAsGuest => {
            // Guest flow never uses the stores; leftover state would only
            // confuse a later resumption.
            storage.clear_state();
            storage.clear_return_intent();
            GateOutcome::ProceedToPayment
        }
    }
}
