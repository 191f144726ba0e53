use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use fluvio_future::timer::sleep;

use crate::bootstrap::IdentityBootstrapper;
use crate::connector::{ClusterConnector, KubeConnector};
use crate::publish::DestinationPublisher;
use crate::translate::{resolve_host, to_kubeconfig};
use crate::{RegistrationConfig, RegistrationError};

/// Registers source cluster into destination cluster.
///
/// Holds no state between calls, all progress is stored in the two clusters.
/// Meant to be invoked repeatedly until it succeeds or fails with
/// non recoverable error.
pub struct RegistrationExecutor<C = KubeConnector> {
    config: RegistrationConfig,
    connector: C,
}

impl RegistrationExecutor<KubeConnector> {
    pub fn new(config: RegistrationConfig) -> Self {
        Self::with_connector(config, KubeConnector)
    }
}

impl<C> RegistrationExecutor<C>
where
    C: ClusterConnector,
{
    pub fn with_connector(config: RegistrationConfig, connector: C) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    #[instrument(
        skip(self),
        fields(
            source = %self.config.source.context,
            dest = %self.config.dest.context,
            name = %self.config.destination_name
        )
    )]
    pub async fn register_cluster(&self) -> Result<(), RegistrationError> {
        let config = &self.config;
        let deadline = config.deadline();

        if config.is_self_registration() {
            return Err(RegistrationError::SelfRegistration {
                kubeconfig: config.source.kubeconfig.display().to_string(),
                context: config.source.context.clone(),
            });
        }

        // fatal before anything is written
        let host = resolve_host(&config.source)?;

        let source = deadline
            .guard("connect to source", self.connector.connect(&config.source))
            .await??;
        let dest = deadline
            .guard("connect to destination", self.connector.connect(&config.dest))
            .await??;
        debug!("connected to both clusters");

        let bootstrapper = IdentityBootstrapper::new(
            &*source,
            &config.source_namespace,
            &config.service_account,
            deadline,
        );
        bootstrapper.ensure_identity().await?;
        let credential = bootstrapper.locate_credential().await?;

        let kubeconfig = to_kubeconfig(&credential, &host, &config.destination_name)?;
        debug!(%host, secret = %credential.secret, "credential translated");

        let publisher = DestinationPublisher::new(&*dest, &config.dest_namespace, deadline);
        publisher
            .publish_secret(&config.destination_name, &kubeconfig)
            .await?;
        publisher
            .publish_client_config(&config.destination_name)
            .await?;

        info!(
            namespace = %config.dest_namespace,
            "cluster registered"
        );
        Ok(())
    }

    /// Invoke `register_cluster` every `interval` until it succeeds, fails for good
    /// or the configured deadline leaves no room for another attempt.
    /// Without deadline only success or non recoverable error ends polling.
    pub async fn poll(&self, interval: Duration) -> Result<(), RegistrationError> {
        let deadline = self.config.deadline;
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self.register_cluster().await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_recoverable() => {
                    if deadline.map_or(false, |deadline| Instant::now() + interval >= deadline) {
                        return Err(RegistrationError::Timeout {
                            attempts,
                            last: Box::new(err),
                        });
                    }
                    if err.is_pending() {
                        info!(attempts, "waiting for token: {}", err);
                    } else {
                        warn!(attempts, "registration failed, retrying: {}", err);
                    }
                    sleep(interval).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
