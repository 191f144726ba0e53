use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Yaml error: {0}")]
    SerdeError(#[from] SerdeYamlError),
    #[error("No home directory to locate kubeconfig")]
    NoHomeDir,
    #[error("No active Kubernetes context")]
    NoCurrentContext,
    #[error("Context '{0}' not found in kubeconfig")]
    ContextNotFound(String),
    #[error("Cluster '{cluster}' referenced by context '{context}' not found")]
    ClusterNotFound { context: String, cluster: String },
    #[error("User '{user}' referenced by context '{context}' not found")]
    UserNotFound { context: String, user: String },
}
