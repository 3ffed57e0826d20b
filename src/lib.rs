pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod http;
pub mod logging;
pub mod models;
pub mod services;
pub mod trial;

pub use error::{AppError, Result};
