use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

use super::IntentTag;

type HmacSha256 = Hmac<Sha256>;

/// A payment authorization created with the provider.
///
/// The client confirmation secret is held in memory only for the duration
/// of the payment step; it is never written to durable storage.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Provider-reported status of a payment authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentIntentStatus {
    Succeeded,
    Processing,
    RequiresPaymentMethod,
    RequiresAction,
    Canceled,
    Other(String),
}

impl PaymentIntentStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_action" => Self::RequiresAction,
            "canceled" => Self::Canceled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresAction => "requires_action",
            Self::Canceled => "canceled",
            Self::Other(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RetrievedIntent {
    status: String,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.to_string(),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create a payment authorization for an amount in minor currency units,
    /// tagged with the guest/authenticated marker.
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        tag: &IntentTag,
    ) -> Result<PaymentIntent> {
        let amount = amount_cents.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("amount", &amount),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];
        match tag {
            IntentTag::Guest => form.push(("metadata[guest]", "true")),
            IntentTag::User(user_id) => {
                form.push(("metadata[guest]", "false"));
                form.push(("metadata[user_id]", user_id));
            }
        }

        let response = self
            .client
            .post("https://api.stripe.com/v1/payment_intents")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Stripe API error: {}", error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))
    }

    /// Ask the provider for an authorization's current status using its
    /// client confirmation secret, as the browser does after the hosted
    /// payment page redirects back.
    pub async fn retrieve_intent_status(&self, client_secret: &str) -> Result<PaymentIntentStatus> {
        let intent_id = intent_id_from_client_secret(client_secret)
            .ok_or_else(|| AppError::BadRequest("Invalid client secret format".into()))?;

        let url = format!(
            "https://api.stripe.com/v1/payment_intents/{}?client_secret={}",
            intent_id,
            urlencoding::encode(client_secret)
        );

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Stripe API error: {}", error_text)));
        }

        let intent: RetrievedIntent = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))?;

        Ok(PaymentIntentStatus::parse(&intent.status))
    }

    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    /// Stripe recommends 300 seconds (5 minutes).
    const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;

    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        if self.webhook_secret.is_empty() {
            return Err(AppError::Internal("Stripe webhook secret not configured".into()));
        }

        // Stripe signature format: t=timestamp,v1=signature
        let parts: Vec<&str> = signature.split(',').collect();

        let mut timestamp = None;
        let mut sig_v1 = None;

        for part in parts {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                sig_v1 = Some(s);
            }
        }

        let timestamp_str = timestamp
            .ok_or_else(|| AppError::BadRequest("Invalid signature format".into()))?;
        let sig_v1 =
            sig_v1.ok_or_else(|| AppError::BadRequest("Invalid signature format".into()))?;

        // Parse and validate timestamp to prevent replay attacks.
        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid timestamp in signature".into()))?;

        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }

        // Also reject timestamps from the future (clock skew tolerance: 60 seconds)
        if age < -60 {
            tracing::warn!("Stripe webhook rejected: timestamp in the future (age={}s)", age);
            return Ok(false);
        }

        let signed_payload = format!("{}.{}", timestamp_str, String::from_utf8_lossy(payload));

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("Invalid webhook secret".into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison to prevent timing attacks. The length
        // check is not constant-time, but signature length is not secret
        // (always 64 hex chars for SHA-256).
        let expected_bytes = expected.as_bytes();
        let provided_bytes = sig_v1.as_bytes();

        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}

/// Extract the intent id (`pi_xxx`) from a client secret (`pi_xxx_secret_yyy`).
pub fn intent_id_from_client_secret(client_secret: &str) -> Option<&str> {
    let idx = client_secret.find("_secret_")?;
    let id = &client_secret[..idx];
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

// ============ Webhook events ============

/// Generic Stripe webhook event - object is parsed based on event_type.
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

// ============ payment_intent.succeeded / payment_intent.payment_failed ============

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntentObject {
    pub id: String,
    pub status: String,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: StripeIntentMetadata,
    pub last_payment_error: Option<StripePaymentError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StripeIntentMetadata {
    pub user_id: Option<String>,
    pub guest: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentError {
    pub message: Option<String>,
}
