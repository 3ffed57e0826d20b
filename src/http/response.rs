use serde_json::{json, Value};
use vercel_runtime::{Body, Response, StatusCode};

use crate::error::AppError;

pub fn error_response(err: &AppError) -> (StatusCode, Value) {
    let (status, label, detail) = match err {
        AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "Validation", msg.clone()),
        AppError::InvalidMethod(msg) => (StatusCode::BAD_REQUEST, "Invalid or missing method", msg.clone()),
        AppError::MissingRequiredField(field) => (StatusCode::BAD_REQUEST, "Missing required field", field.clone()),
        AppError::SignatureVerificationFailed(msg) => {
            (StatusCode::BAD_REQUEST, "Webhook signature verification failed", msg.clone())
        }
        AppError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "API configuration error", msg.clone()),
        AppError::UpstreamUnavailable(msg) | AppError::MalformedUpstreamResponse(msg) | AppError::External(msg) => {
            (StatusCode::BAD_GATEWAY, "Upstream", msg.clone())
        }
        AppError::Other(e) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal", e.to_string()),
    };
    (status, json!({"success": false, "error": label, "detail": detail}))
}

pub fn json_response<T: serde::Serialize>(status: StatusCode, value: &T) -> anyhow::Result<Response<Body>> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(value)?.into())?)
}

pub fn app_error_response(err: &AppError) -> anyhow::Result<Response<Body>> {
    let (status, body) = error_response(err);
    json_response(status, &body)
}

/// Preflight answer: status only, no body.
pub fn empty_response(status: StatusCode) -> anyhow::Result<Response<Body>> {
    Ok(Response::builder().status(status).body(Body::Empty)?)
}

pub fn method_not_allowed() -> anyhow::Result<Response<Body>> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", "POST")
        .header("Content-Type", "application/json")
        .body(json!({"success": false, "error": "Method not allowed"}).to_string().into())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        for err in [
            AppError::Validation("x".into()),
            AppError::InvalidMethod("x".into()),
            AppError::MissingRequiredField("topic".into()),
            AppError::SignatureVerificationFailed("x".into()),
        ] {
            let (status, body) = error_response(&err);
            assert_eq!(status, StatusCode::BAD_REQUEST, "{err:?}");
            assert_eq!(body["success"], json!(false));
        }
    }

    #[test]
    fn configuration_is_a_server_error() {
        let (status, body) = error_response(&AppError::Configuration("Missing STRIPE_SECRET_KEY".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], json!("Missing STRIPE_SECRET_KEY"));
    }

    #[test]
    fn upstream_failures_are_bad_gateway() {
        let (status, _) = error_response(&AppError::External("card declined".into()));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn method_not_allowed_advertises_post() {
        let resp = method_not_allowed().unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get("allow").unwrap(), "POST");
    }
}
