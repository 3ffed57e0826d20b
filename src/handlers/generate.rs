use rand::Rng;
use serde_json::Value;
use vercel_runtime::{Body, Request, Response, StatusCode};

use super::{failure, origin};
use crate::config::Settings;
use crate::error::AppError;
use crate::http::{add_cors, empty_response, json_response, method_not_allowed, CorsPolicy};
use crate::models::GenerationRequest;
use crate::services::HookGenerator;

pub async fn handle<R: Rng + Send>(
    req: &Request,
    settings: &Settings,
    generator: &HookGenerator,
    rng: &mut R,
) -> anyhow::Result<Response<Body>> {
    let policy = CorsPolicy::from_settings(settings);
    let origin = origin(req);
    let resp = respond(req, settings, generator, rng).await?;
    Ok(add_cors(resp, &policy, origin.as_deref()))
}

async fn respond<R: Rng + Send>(
    req: &Request,
    settings: &Settings,
    generator: &HookGenerator,
    rng: &mut R,
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

    let body: Value = match serde_json::from_slice(body_bytes) {
        Ok(v) => v,
        Err(e) => return failure(&AppError::Validation(format!("Invalid JSON: {e}"))),
    };

    let request = match GenerationRequest::from_json(&body, settings.max_input_chars) {
        Ok(r) => r,
        Err(e) => return failure(&e),
    };

    match generator.generate(&request, rng).await {
        Ok(result) => json_response(StatusCode::OK, &result),
        Err(e) => failure(&e),
    }
}
