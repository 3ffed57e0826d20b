use serde_json::json;
use tracing::info;
use vercel_runtime::{Body, Request, Response, StatusCode};

use super::failure;
use crate::config::Settings;
use crate::error::AppError;
use crate::http::{json_response, method_not_allowed};
use crate::models::billing::StripeEvent;
use crate::services::billing::{apply_event, verify_signature, WebhookEvent, SIGNATURE_TOLERANCE_SECS};

/// `now` is the current unix time in seconds.
pub async fn handle(req: &Request, settings: &Settings, now: i64) -> anyhow::Result<Response<Body>> {
    if req.method().as_str() != "POST" {
        return method_not_allowed();
    }

    let Some(secret) = settings.stripe_webhook_secret.as_deref() else {
        return failure(&AppError::Configuration("Missing STRIPE_WEBHOOK_SECRET".into()));
    };

    let Some(signature) = req.headers().get("stripe-signature").and_then(|v| v.to_str().ok()) else {
        return failure(&AppError::SignatureVerificationFailed("missing stripe-signature header".into()));
    };

    let payload: &[u8] = req.body();
    if let Err(e) = verify_signature(payload, signature, secret, now, SIGNATURE_TOLERANCE_SECS) {
        return failure(&e);
    }

    let event: StripeEvent = match serde_json::from_slice(payload) {
        Ok(v) => v,
        Err(e) => return failure(&AppError::Validation(format!("Invalid event payload: {e}"))),
    };
    info!(event_id = %event.id, kind = %event.kind, "webhook received");
    apply_event(&WebhookEvent::from_stripe(&event));

    json_response(StatusCode::OK, &json!({"received": true}))
}
