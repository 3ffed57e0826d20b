//! One module per serverless endpoint. Each takes the raw request plus its
//! collaborators and always answers with a response; only framework-level
//! failures surface as `Err`.

pub mod checkout;
pub mod generate;
pub mod webhook;

use tracing::{error, warn};
use vercel_runtime::{Body, Request, Response};

use crate::error::AppError;
use crate::http::app_error_response;

fn origin(req: &Request) -> Option<String> {
    req.headers()
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn failure(err: &AppError) -> anyhow::Result<Response<Body>> {
    let response = app_error_response(err)?;
    if response.status().is_server_error() {
        error!(error = %err, "request failed");
    } else {
        warn!(error = %err, "request rejected");
    }
    Ok(response)
}
