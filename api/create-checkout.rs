use hook_generator_api::clients::stripe::{PaymentProcessor, StripeClient};
use hook_generator_api::{config::Settings, handlers, logging};
use vercel_runtime::{run, Body, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    run(handler).await
}

pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    let settings = Settings::from_env();
    let stripe = StripeClient::from_settings(&settings).ok();
    let processor = stripe.as_ref().map(|c| c as &dyn PaymentProcessor);
    Ok(handlers::checkout::handle(&req, &settings, processor).await?)
}
