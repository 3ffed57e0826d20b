use vercel_runtime::{Body, Request, Response, StatusCode};

use super::{failure, origin};
use crate::clients::stripe::PaymentProcessor;
use crate::config::Settings;
use crate::error::AppError;
use crate::http::{add_cors, empty_response, json_response, method_not_allowed, CorsPolicy};
use crate::models::billing::CheckoutRequest;
use crate::services::billing::{create_checkout, return_base};

/// `processor` is `None` when no secret key is configured.
pub async fn handle(
    req: &Request,
    settings: &Settings,
    processor: Option<&dyn PaymentProcessor>,
) -> anyhow::Result<Response<Body>> {
    let policy = CorsPolicy::from_settings(settings);
    let origin = origin(req);
    let resp = respond(req, settings, processor, origin.as_deref()).await?;
    Ok(add_cors(resp, &policy, origin.as_deref()))
}

async fn respond(
    req: &Request,
    settings: &Settings,
    processor: Option<&dyn PaymentProcessor>,
    origin: Option<&str>,
) -> anyhow::Result<Response<Body>> {
    match req.method().as_str() {
        "OPTIONS" => return empty_response(StatusCode::OK),
        "POST" => {}
        _ => return method_not_allowed(),
    }

    let body_bytes = req.body();
    if body_bytes.is_empty() {
        return failure(&AppError::Validation("Empty body".into()));
    }
    let parsed: CheckoutRequest = match serde_json::from_slice(body_bytes) {
        Ok(v) => v,
        Err(e) => return failure(&AppError::Validation(format!("Invalid JSON: {e}"))),
    };

    let Some(processor) = processor else {
        return failure(&AppError::Configuration("Missing STRIPE_SECRET_KEY".into()));
    };
    let base = match return_base(origin, settings.vercel_url.as_deref()) {
        Ok(b) => b,
        Err(e) => return failure(&e),
    };

    match create_checkout(processor, &parsed, &base).await {
        Ok(session) => json_response(StatusCode::OK, &session),
        Err(e) => failure(&e),
    }
}
