//! The payment coordinator.
//!
//! Requests a payment authorization for the draft's word-count-derived
//! price and holds the client confirmation secret in memory for the
//! duration of the payment step. The secret is never written to the
//! durable client store.

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::OptimizationDraft;
use crate::payments::{IntentTag, PaymentIntent, PaymentIntentStatus, StripeClient};
use crate::pricing;

/// Seam to the payment provider, so the flow can run against a fake.
#[async_trait]
pub trait PaymentGateway {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        tag: &IntentTag,
    ) -> Result<PaymentIntent>;

    async fn retrieve_status(&self, client_secret: &str) -> Result<PaymentIntentStatus>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        tag: &IntentTag,
    ) -> Result<PaymentIntent> {
        self.create_payment_intent(amount_cents, currency, tag).await
    }

    async fn retrieve_status(&self, client_secret: &str) -> Result<PaymentIntentStatus> {
        self.retrieve_intent_status(client_secret).await
    }
}

/// Tracks one payment authorization's client-side lifecycle.
#[derive(Debug, Default)]
pub struct PaymentCoordinator {
    intent: Option<PaymentIntent>,
}

impl PaymentCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the payment step for a draft: derive the price from its word
    /// count and request an authorization tagged guest/authenticated.
    ///
    /// Failure leaves the coordinator empty and no persisted state touched;
    /// the caller may simply call `open` again to retry.
    pub async fn open<G: PaymentGateway>(
        &mut self,
        gateway: &G,
        draft: &OptimizationDraft,
        tag: IntentTag,
    ) -> Result<&PaymentIntent> {
        let tier = pricing::tier_for_word_count(draft.word_count)
            .ok_or_else(|| AppError::BadRequest("Content exceeds maximum length".into()))?;

        self.intent = None;
        let intent = gateway.create_intent(tier.price_cents(), "usd", &tag).await?;
        Ok(self.intent.insert(intent))
    }

    /// The confirmation secret for the open authorization, if any.
    pub fn client_secret(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.client_secret.as_str())
    }

    pub fn intent_id(&self) -> Option<&str> {
        self.intent.as_ref().map(|i| i.id.as_str())
    }

    /// Dismiss the payment step. Drops the in-memory authorization handle
    /// only; an already-submitted authorization is not cancelled remotely.
    pub fn cancel(&mut self) {
        self.intent = None;
    }
}
