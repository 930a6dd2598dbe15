//! Payment gateway client.
//!
//! Wraps Stripe's payment-intent creation endpoint behind a small trait so
//! handlers stay independent of the concrete gateway.
//!
//! - Base URL: `https://api.stripe.com` (overridable for tests)
//! - Authentication: secret key via `Authorization: Bearer <key>`
//! - Encoding: form-urlencoded request, JSON response

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::config::PaymentConfig;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway secret not configured")]
    MissingSecret,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// A created payment intent; the client secret is handed to the caller to
/// complete the charge client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for `amount_cents` in minor currency units.
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<PaymentIntent, PaymentError>;
}

pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: Option<StripeErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.stripe_secret_key.clone(),
        }
    }

    fn form_params(amount_cents: i64, currency: &str) -> Vec<(&'static str, String)> {
        vec![
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_cents: i64, currency: &str) -> Result<PaymentIntent, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::MissingSecret);
        }

        let url = format!("{}/v1/payment_intents", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&Self::form_params(amount_cents, currency))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<StripeErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "payment intent creation failed".to_string());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let intent = response.json::<PaymentIntent>().await?;
        Ok(intent)
    }
}
