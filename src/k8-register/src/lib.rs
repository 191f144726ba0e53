mod bootstrap;
mod config;
mod connector;
mod error;
mod executor;
mod publish;
mod translate;

pub use self::bootstrap::{IdentityBootstrapper, IssuedCredential};
pub use self::config::{default_destination_name, ConnectionTarget, Deadline, RegistrationConfig};
pub use self::connector::{ClusterConnector, KubeConnector};
pub use self::error::RegistrationError;
pub use self::executor::RegistrationExecutor;
pub use self::publish::{DestinationPublisher, KUBECONFIG_KEY};
pub use self::translate::{resolve_host, to_kubeconfig, validate_endpoint};
