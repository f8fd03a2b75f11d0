//! Redirect resumption.
//!
//! Two distinct paths re-enter the optimize flow after a full page
//! navigation: returning from a login/signup page, and returning from the
//! payment provider's hosted page. Both tolerate the stored state being
//! absent or expired by resolving to "nothing to restore" - expiration is
//! intended product behavior, not a fault.

use crate::flow::flags::{GatewayReturnParams, ReturnFlags};
use crate::flow::payment::PaymentGateway;
use crate::flow::state::DraftStatus;
use crate::flow::store::{FlowStorage, KeyValueStore};
use crate::error::Result;
use crate::models::OptimizationDraft;
use crate::payments::PaymentIntentStatus;

/// Outcome of a resumption attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Resumption {
    /// Show the locked preview again.
    Preview(OptimizationDraft),
    /// Immediately reopen the payment step with the restored draft; no new
    /// submission, no revalidation.
    ReopenPayment(OptimizationDraft),
    /// Payment confirmed; render unlocked results.
    Unlocked(OptimizationDraft),
    /// The provider reports the authorization is not (yet) succeeded; do
    /// not unlock, surface the status as-is.
    Incomplete(PaymentIntentStatus),
    /// Nothing stored (or expired): start fresh.
    NothingToRestore,
}

/// Resume after the browser returns from a login/signup page.
pub fn resume_after_auth<S: KeyValueStore>(
    flags: &ReturnFlags,
    storage: &FlowStorage<S>,
    now_ms: i64,
) -> Resumption {
    if !(flags.from_auth && flags.restore) {
        return Resumption::NothingToRestore;
    }

    let Some(stored) = storage.state(now_ms) else {
        return Resumption::NothingToRestore;
    };

    if stored.paid {
        Resumption::Unlocked(stored.draft)
    } else if flags.show_payment {
        Resumption::ReopenPayment(stored.draft)
    } else {
        Resumption::Preview(stored.draft)
    }
}

/// Resume after the browser returns from the payment provider's hosted
/// page, carrying the authorization id and its client confirmation secret.
///
/// The provider is asked directly for the authorization's current status;
/// the `redirect_status` hint in the URL is never trusted on its own.
pub async fn resume_after_gateway<S: KeyValueStore, G: PaymentGateway>(
    params: &GatewayReturnParams,
    gateway: &G,
    storage: &FlowStorage<S>,
    now_ms: i64,
) -> Result<Resumption> {
    let status = gateway
        .retrieve_status(&params.payment_intent_client_secret)
        .await?;

    if status != PaymentIntentStatus::Succeeded {
        return Ok(Resumption::Incomplete(status));
    }

    match storage.state(now_ms) {
        Some(stored) => {
            storage.save_state(&stored.draft, DraftStatus::Completed, true, false, now_ms);
            Ok(Resumption::Unlocked(stored.draft))
        }
        None => Ok(Resumption::NothingToRestore),
    }
}
