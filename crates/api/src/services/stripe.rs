//! Stripe integration via REST API (no SDK dependency).
//!
//! Checkout sessions are created with form-encoded requests against
//! `/v1/checkout/sessions`; webhook payloads are authenticated with the
//! HMAC-SHA256 scheme of the `Stripe-Signature` header.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Webhook events older than this are rejected to limit replay windows.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Errors from Stripe API calls.
#[derive(Debug, Error)]
pub enum StripeError {
    #[error("stripe request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected stripe response: {0}")]
    UnexpectedResponse(String),
}

/// Errors from webhook signature verification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed Stripe-Signature header")]
    MalformedHeader,
    #[error("signature is not valid hex")]
    InvalidHex,
    #[error("signature mismatch")]
    Mismatch,
    #[error("timestamp outside tolerance window")]
    StaleTimestamp,
    #[error("HMAC key error")]
    Key,
}

/// One checkout line item: display data plus the exact cent price.
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    /// Human-readable product name shown on the hosted payment page.
    pub name: String,
    /// Line note; carries the selected size, e.g. "Size: m".
    pub description: String,
    /// Unit price in the smallest currency unit (cents).
    pub unit_amount_cents: i64,
    pub quantity: i64,
}

/// A created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// Opaque session id the client redirects with.
    pub id: String,
    /// Hosted payment page URL, when the API returns one.
    pub url: Option<String>,
}

/// Thin client over the Stripe REST API.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: SecretString,
}

impl StripeClient {
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
        }
    }

    /// Create a hosted checkout session in payment mode.
    ///
    /// `metadata` key/value pairs ride on the session and come back on the
    /// completion webhook; the user id and address fields travel here.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Http` on transport failure and
    /// `StripeError::UnexpectedResponse` when the response carries no
    /// session id.
    pub async fn create_checkout_session(
        &self,
        currency: &str,
        line_items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
        metadata: &[(String, String)],
    ) -> Result<CheckoutSession, StripeError> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            (
                "payment_method_types[0]".to_string(),
                "card".to_string(),
            ),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form.push((
                format!("line_items[{i}][price_data][currency]"),
                currency.to_string(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][name]"),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][product_data][description]"),
                item.description.clone(),
            ));
            form.push((
                format!("line_items[{i}][price_data][unit_amount]"),
                item.unit_amount_cents.to_string(),
            ));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        for (key, value) in metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }

        let resp: serde_json::Value = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .basic_auth(self.secret_key.expose_secret(), None::<&str>)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        let id = resp["id"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| StripeError::UnexpectedResponse(resp.to_string()))?;
        let url = resp["url"].as_str().map(String::from);

        Ok(CheckoutSession { id, url })
    }
}

/// Verify a Stripe webhook signature (HMAC-SHA256).
///
/// The header carries `t=<unix seconds>,v1=<hex hmac>`; the MAC covers
/// `"{t}.{raw payload}"`. Verification is constant-time via
/// `Mac::verify_slice`, and stale timestamps are rejected.
///
/// # Errors
///
/// Returns the specific `SignatureError` for each failure mode; callers
/// treat all of them as a hard 400 rejection.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), SignatureError> {
    verify_with_now(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

fn verify_with_now(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err(SignatureError::MalformedHeader);
    }

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Key)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);

    let sig_bytes = hex::decode(signature).map_err(|_| SignatureError::InvalidHex)?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SignatureError::Mismatch)?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::MalformedHeader)?;
    if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    Ok(())
}
