//! Checkout session client.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, error, instrument};
use url::Url;

use storeroom_core::{CurrencyCode, OrderId, Price};

use super::error::PaymentError;
use super::signature::verify_signature;
use crate::config::PaymentConfig;
use crate::models::CheckoutLine;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Client for the payment processor's checkout API.
#[derive(Clone)]
pub struct PaymentClient {
    inner: Arc<PaymentClientInner>,
}

struct PaymentClientInner {
    client: reqwest::Client,
    api_base: Url,
    secret_key: SecretString,
    webhook_secret: SecretString,
    currency: CurrencyCode,
    webhook_tolerance: Duration,
}

impl std::fmt::Debug for PaymentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentClient")
            .field("api_base", &self.inner.api_base.as_str())
            .field("secret_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .field("currency", &self.inner.currency)
            .finish_non_exhaustive()
    }
}

impl PaymentClient {
    /// Create a client from payment settings.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Request` if the HTTP client cannot be built.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(PaymentClientInner {
                client,
                api_base: config.api_base.clone(),
                secret_key: config.secret_key.clone(),
                webhook_secret: config.webhook_secret.clone(),
                currency: config.currency,
                webhook_tolerance: config.webhook_tolerance,
            }),
        })
    }

    /// Create a hosted checkout session for an order and return its URL.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if a price cannot be converted, the request
    /// fails, or the processor refuses the session.
    #[instrument(skip(self, lines), fields(order_id = %order_id, items = lines.len()))]
    pub async fn create_checkout_session(
        &self,
        order_id: OrderId,
        lines: &[CheckoutLine],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, PaymentError> {
        let form = session_form(order_id, lines, self.inner.currency, success_url, cancel_url)?;

        let endpoint = self
            .inner
            .api_base
            .join("v1/checkout/sessions")
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let response = self
            .inner
            .client
            .post(endpoint)
            .bearer_auth(self.inner.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|e| PaymentError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Response(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message.or(e.error.code))
                .unwrap_or_else(|| format!("HTTP {status}"));
            error!(%status, %message, "checkout session creation failed");
            return Err(PaymentError::Api(message));
        }

        let session: SessionResponse =
            serde_json::from_str(&body).map_err(|e| PaymentError::Response(e.to_string()))?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::Response("session without url".to_string()))?;

        debug!(session_id = %session.id, "checkout session created");
        Ok(url)
    }

    /// Verify a webhook body against its signature header at the current time.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidSignature` if verification fails.
    pub fn verify_webhook(&self, payload: &[u8], header: &str) -> Result<(), PaymentError> {
        verify_signature(
            payload,
            header,
            self.inner.webhook_secret.expose_secret(),
            self.inner.webhook_tolerance,
            chrono::Utc::now().timestamp(),
        )
    }
}

/// Form fields for a checkout session, in the processor's bracketed syntax.
fn session_form(
    order_id: OrderId,
    lines: &[CheckoutLine],
    currency: CurrencyCode,
    success_url: &str,
    cancel_url: &str,
) -> Result<Vec<(String, String)>, PaymentError> {
    let mut form: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("billing_address_collection".into(), "required".into()),
        ("phone_number_collection[enabled]".into(), "true".into()),
        ("success_url".into(), success_url.into()),
        ("cancel_url".into(), cancel_url.into()),
        ("metadata[orderId]".into(), order_id.to_string()),
    ];

    for (i, line) in lines.iter().enumerate() {
        let unit_amount = Price::new(line.unit_price, currency).to_minor_units()?;
        let prefix = format!("line_items[{i}]");
        form.push((format!("{prefix}[quantity]"), "1".into()));
        form.push((
            format!("{prefix}[price_data][currency]"),
            currency.api_code().into(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            unit_amount.to_string(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            line.name.clone(),
        ));
    }

    Ok(form)
}
