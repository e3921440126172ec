mod config;
mod error;
mod runtime;

pub use config::RuntimeConfig;
pub use error::InitError;
pub use runtime::{initialize, Runtime, RuntimeGuard};
