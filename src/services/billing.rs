use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use tracing::{info, warn};

use crate::clients::stripe::PaymentProcessor;
use crate::error::{AppError, Result};
use crate::models::billing::{CheckoutParams, CheckoutRequest, CheckoutResponse, StripeEvent};

type HmacSha256 = Hmac<Sha256>;

/// Seconds a signed webhook stays acceptable.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Opens a subscription checkout, reusing the customer that owns `email`
/// when there is one.
pub async fn create_checkout(
    processor: &dyn PaymentProcessor,
    request: &CheckoutRequest,
    return_base: &str,
) -> Result<CheckoutResponse> {
    if let Err(issues) = request.validate() {
        return Err(AppError::Validation(issues.join(", ")));
    }

    let customer_id = match request.email() {
        Some(email) => {
            let customer = match processor.find_customer_by_email(email).await? {
                Some(existing) => existing,
                None => processor.create_customer(email, &request.user_id).await?,
            };
            Some(customer.id)
        }
        None => None,
    };

    let params = CheckoutParams {
        user_id: request.user_id.trim().to_string(),
        customer_email: if customer_id.is_none() { request.email().map(str::to_string) } else { None },
        customer_id,
        success_url: format!("{return_base}?success=true&session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{return_base}?canceled=true"),
    };

    let session = processor.create_checkout_session(&params).await?;
    let url = session
        .url
        .ok_or_else(|| AppError::External("checkout session has no redirect url".into()))?;
    info!(user_id = %params.user_id, session_id = %session.id, "checkout session created");
    Ok(CheckoutResponse { session_id: session.id, url })
}

/// Where the payer is sent back to: the calling page's origin, else the
/// deployment URL.
pub fn return_base(origin: Option<&str>, vercel_url: Option<&str>) -> Result<String> {
    if let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) {
        return Ok(origin.trim_end_matches('/').to_string());
    }
    match vercel_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            Ok(url.trim_end_matches('/').to_string())
        }
        Some(host) => Ok(format!("https://{}", host.trim_end_matches('/'))),
        None => Err(AppError::Configuration("no Origin header and VERCEL_URL is unset".into())),
    }
}

/// Checks a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`)
/// against `payload`.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now: i64, tolerance: i64) -> Result<()> {
    let fail = |msg: &str| AppError::SignatureVerificationFailed(msg.to_string());

    let mut timestamp = None;
    let mut candidates = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", v)) => timestamp = v.parse::<i64>().ok(),
            Some(("v1", v)) => candidates.push(v),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| fail("missing timestamp"))?;
    if candidates.is_empty() {
        return Err(fail("no v1 signature"));
    }
    if now.abs_diff(timestamp) > tolerance.unsigned_abs() {
        return Err(fail("timestamp outside tolerance"));
    }

    let mac = signed_payload_mac(payload, secret, timestamp)?;
    let matched = candidates
        .iter()
        .filter_map(|c| hex::decode(c).ok())
        .any(|sig| mac.clone().verify_slice(&sig).is_ok());
    if matched {
        Ok(())
    } else {
        Err(fail("no matching signature"))
    }
}

/// Header value a sender with `secret` would attach at `timestamp`.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String> {
    let mac = signed_payload_mac(payload, secret, timestamp)?;
    Ok(format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes())))
}

fn signed_payload_mac(payload: &[u8], secret: &str, timestamp: i64) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Configuration(format!("unusable webhook secret: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    CheckoutCompleted {
        user_id: Option<String>,
        customer_id: Option<String>,
        subscription_id: Option<String>,
    },
    PaymentSucceeded { subscription: Option<String> },
    PaymentFailed { subscription: Option<String> },
    SubscriptionCanceled { user_id: Option<String> },
    Unhandled(String),
}

impl WebhookEvent {
    pub fn from_stripe(event: &StripeEvent) -> Self {
        let object = &event.data.object;
        match event.kind.as_str() {
            "checkout.session.completed" => WebhookEvent::CheckoutCompleted {
                user_id: metadata_user_id(object),
                customer_id: string_at(object, "customer"),
                subscription_id: string_at(object, "subscription"),
            },
            "invoice.payment_succeeded" => WebhookEvent::PaymentSucceeded {
                subscription: string_at(object, "subscription"),
            },
            "invoice.payment_failed" => WebhookEvent::PaymentFailed {
                subscription: string_at(object, "subscription"),
            },
            "customer.subscription.deleted" => WebhookEvent::SubscriptionCanceled {
                user_id: metadata_user_id(object),
            },
            other => WebhookEvent::Unhandled(other.to_string()),
        }
    }
}

fn string_at(object: &Value, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn metadata_user_id(object: &Value) -> Option<String> {
    object.get("metadata").and_then(|m| string_at(m, "userId"))
}

// Subscription state lives client-side; the server only records the change.
pub fn apply_event(event: &WebhookEvent) {
    match event {
        WebhookEvent::CheckoutCompleted { user_id, customer_id, subscription_id } => info!(
            user_id = user_id.as_deref().unwrap_or("-"),
            customer_id = customer_id.as_deref().unwrap_or("-"),
            subscription_id = subscription_id.as_deref().unwrap_or("-"),
            "user subscribed"
        ),
        WebhookEvent::PaymentSucceeded { subscription } => {
            info!(subscription = subscription.as_deref().unwrap_or("-"), "payment succeeded")
        }
        WebhookEvent::PaymentFailed { subscription } => {
            warn!(subscription = subscription.as_deref().unwrap_or("-"), "payment failed")
        }
        WebhookEvent::SubscriptionCanceled { user_id } => {
            info!(user_id = user_id.as_deref().unwrap_or("-"), "subscription canceled")
        }
        WebhookEvent::Unhandled(kind) => info!(kind = %kind, "unhandled event type"),
    }
}
