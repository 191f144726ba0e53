use std::error::Error as StdError;

use thiserror::Error;

use k8_config::ConfigError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Outcome of one failed registration attempt.
///
/// Callers poll: recoverable errors are retried on next invocation,
/// everything else must be surfaced to the user.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(
        "source and destination use same kubeconfig {kubeconfig} and context {context}, \
        a cluster can not be registered to itself"
    )]
    SelfRegistration { kubeconfig: String, context: String },
    #[error("service account {name} in {namespace} was just created and has no token yet")]
    IdentityNotReady { name: String, namespace: String },
    #[error("no secret found for service account {name} in {namespace}")]
    NoCredential { name: String, namespace: String },
    #[error("invalid server endpoint '{server}' for context {context}: {reason}")]
    InvalidEndpoint {
        context: String,
        server: String,
        reason: String,
    },
    #[error("malformed credential in secret {secret}: {reason}")]
    MalformedCredential { secret: String, reason: String },
    #[error("kubeconfig: {0}")]
    Config(#[from] ConfigError),
    #[error("unable to connect to {target}: {source}")]
    Connect { target: String, source: BoxError },
    #[error("{operation} failed: {source}")]
    Api { operation: String, source: BoxError },
    #[error("deadline exceeded during {operation}")]
    DeadlineExceeded { operation: String },
    #[error("timed out after {attempts} attempts: {last}")]
    Timeout {
        attempts: u32,
        last: Box<RegistrationError>,
    },
}

impl RegistrationError {
    pub(crate) fn api<E>(operation: impl Into<String>, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Api {
            operation: operation.into(),
            source: Box::new(err),
        }
    }

    /// retrying later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::IdentityNotReady { .. }
                | Self::NoCredential { .. }
                | Self::Connect { .. }
                | Self::Api { .. }
                | Self::DeadlineExceeded { .. }
        )
    }

    /// waiting for token controller in source cluster
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::IdentityNotReady { .. } | Self::NoCredential { .. }
        )
    }
}
