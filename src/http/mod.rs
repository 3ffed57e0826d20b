pub mod cors;
pub mod response;

pub use cors::{add_cors, CorsPolicy};
pub use response::{app_error_response, empty_response, error_response, json_response, method_not_allowed};
