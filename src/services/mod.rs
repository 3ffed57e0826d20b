pub mod billing;
pub mod generate;

pub use generate::HookGenerator;
