use chrono::Utc;
use hook_generator_api::{config::Settings, handlers, logging};
use vercel_runtime::{run, Body, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    run(handler).await
}

pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    let settings = Settings::from_env();
    Ok(handlers::webhook::handle(&req, &settings, Utc::now().timestamp()).await?)
}
