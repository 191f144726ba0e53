use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use futures_util::future::{select, Either};
use tracing::warn;

use fluvio_future::timer::sleep;

use crate::RegistrationError;

/// kubeconfig file plus context in it, identifies cluster and user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    pub kubeconfig: PathBuf,
    pub context: String,
}

impl ConnectionTarget {
    pub fn new<P: Into<PathBuf>, S: Into<String>>(kubeconfig: P, context: S) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.context, self.kubeconfig.display())
    }
}

#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    pub source: ConnectionTarget,
    pub dest: ConnectionTarget,
    pub source_namespace: String,
    pub dest_namespace: String,
    pub service_account: String,
    /// name of secret, client config and context in destination
    pub destination_name: String,
    pub deadline: Option<Instant>,
}

impl RegistrationConfig {
    pub fn deadline(&self) -> Deadline {
        Deadline(self.deadline)
    }

    /// same file and same context means same cluster and user
    pub fn is_self_registration(&self) -> bool {
        self.source == self.dest
    }
}

const MAX_NAME_LEN: usize = 253;

/// object name derived from context name, kind contexts like `kind-Source_1` become `kind-source-1`.
/// Runs of separators collapse to the first one so result is a dns subdomain
pub fn default_destination_name(context: &str) -> String {
    let is_separator = |c: char| c == '-' || c == '.';

    let mut name = String::with_capacity(context.len());
    for c in context.chars().map(|c| c.to_ascii_lowercase()) {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() || is_separator(c) {
            c
        } else {
            '-'
        };
        if is_separator(c) && (name.is_empty() || name.ends_with(is_separator)) {
            continue;
        }
        name.push(c);
    }

    name.truncate(MAX_NAME_LEN);
    name.trim_end_matches(is_separator).to_owned()
}

/// Caller supplied cutoff for network calls
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn none() -> Self {
        Self(None)
    }

    /// run call unless deadline passes first
    pub async fn guard<F>(&self, operation: &str, call: F) -> Result<F::Output, RegistrationError>
    where
        F: Future,
    {
        let deadline = match self.0 {
            Some(deadline) => deadline,
            None => return Ok(call.await),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(RegistrationError::DeadlineExceeded {
                operation: operation.to_owned(),
            });
        }

        match select(Box::pin(call), Box::pin(sleep(remaining))).await {
            Either::Left((output, _)) => Ok(output),
            Either::Right(_) => {
                warn!(operation, "deadline exceeded");
                Err(RegistrationError::DeadlineExceeded {
                    operation: operation.to_owned(),
                })
            }
        }
    }
}

#[cfg(test)]
mod test {

    use std::future::pending;
    use std::time::{Duration, Instant};

    use super::{default_destination_name, ConnectionTarget, Deadline};
    use crate::RegistrationError;

    #[fluvio_future::test]
    async fn test_no_deadline() {
        let value = Deadline::none()
            .guard("noop", async { 5 })
            .await
            .expect("no deadline");
        assert_eq!(value, 5);
    }

    #[fluvio_future::test]
    async fn test_deadline_exceeded() {
        let deadline = Deadline::at(Instant::now() + Duration::from_millis(50));
        let err = deadline
            .guard("get serviceaccount", pending::<()>())
            .await
            .expect_err("never completes");
        assert!(
            matches!(err, RegistrationError::DeadlineExceeded { ref operation } if operation == "get serviceaccount")
        );
        assert!(err.is_recoverable());
    }

    #[fluvio_future::test]
    async fn test_expired_deadline_skips_call() {
        let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
        let err = deadline
            .guard("list secrets", async { 1 })
            .await
            .expect_err("expired");
        assert!(matches!(err, RegistrationError::DeadlineExceeded { .. }));
    }

    #[test]
    fn test_target_display() {
        let target = ConnectionTarget::new("/home/test/.kube/config", "kind-source");
        assert_eq!(target.to_string(), "kind-source@/home/test/.kube/config");
    }

    #[test]
    fn test_default_destination_name() {
        assert_eq!(default_destination_name("kind-k8ssandra-0"), "kind-k8ssandra-0");
        assert_eq!(
            default_destination_name("arn:aws:eks:us-east-1:123:cluster/Prod"),
            "arn-aws-eks-us-east-1-123-cluster-prod"
        );
        assert_eq!(default_destination_name("_gke.West_"), "gke.west");
        assert_eq!(default_destination_name("a..b"), "a.b");
        assert_eq!(default_destination_name("kind-.source__1"), "kind-source-1");
        assert_eq!(default_destination_name("___"), "");

        let long = format!("{}.{}", "a".repeat(252), "b".repeat(10));
        let name = default_destination_name(&long);
        assert_eq!(name.len(), 252);
        assert!(name.chars().all(|c| c == 'a'));
    }
}
