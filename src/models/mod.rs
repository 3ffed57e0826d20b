pub mod billing;
pub mod generation;
pub mod sanitize;

pub use generation::{fields, GenerationMethod, GenerationRequest, GenerationResult, HookList, MAX_HOOKS};
