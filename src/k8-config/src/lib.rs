mod config;
mod error;

pub use config::*;
pub use error::ConfigError;

/// environment variable overriding location of kubeconfig
pub const KUBECONFIG: &str = "KUBECONFIG";
