use hook_generator_api::{config::Settings, handlers, logging, services::HookGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use vercel_runtime::{run, Body, Error, Request, Response};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();
    run(handler).await
}

pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    // Read per invocation so redeploys with new env vars need no restart.
    let settings = Settings::from_env();
    let generator = HookGenerator::from_settings(&settings);
    let mut rng = StdRng::from_os_rng();
    Ok(handlers::generate::handle(&req, &settings, &generator, &mut rng).await?)
}
