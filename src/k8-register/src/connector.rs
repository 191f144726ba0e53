use async_trait::async_trait;
use tracing::debug;

use k8_client::{new_shared, K8Client};
use k8_metadata_client::{MetadataClient, SharedClient};

use crate::{ConnectionTarget, RegistrationError};

/// Produces api client for a connection target.
/// Pure construction, no retries
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    type Client: MetadataClient;

    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<SharedClient<Self::Client>, RegistrationError>;
}

/// connect thru kubeconfig files
#[derive(Debug, Default, Clone)]
pub struct KubeConnector;

#[async_trait]
impl ClusterConnector for KubeConnector {
    type Client = K8Client;

    async fn connect(
        &self,
        target: &ConnectionTarget,
    ) -> Result<SharedClient<Self::Client>, RegistrationError> {
        debug!(%target, "connecting");
        new_shared(&target.kubeconfig, &target.context).map_err(|err| {
            RegistrationError::Connect {
                target: target.to_string(),
                source: Box::new(err),
            }
        })
    }
}

#[cfg(test)]
mod test {

    use super::{ClusterConnector, KubeConnector};
    use crate::{ConnectionTarget, RegistrationError};

    #[fluvio_future::test]
    async fn test_missing_kubeconfig() {
        let target = ConnectionTarget::new("/nonexistent/kubeconfig", "kind-source");
        let err = KubeConnector
            .connect(&target)
            .await
            .expect_err("no such file");
        match err {
            RegistrationError::Connect { target, .. } => {
                assert_eq!(target, "kind-source@/nonexistent/kubeconfig")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
