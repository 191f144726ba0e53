mod cert;
mod client;
mod error;
mod uri;

pub use self::cert::{ClientConfigBuilder, ConfigBuilder};
pub use self::client::K8Client;
pub use self::error::ClientError;
pub use self::uri::{item_uri, items_uri};

pub use k8_config::KubeConfig;

pub mod metadata {
    pub use k8_metadata_client::*;
}

pub use k8_types;

pub use shared::SharedK8Client;
pub use shared::new_shared;

mod shared {

    use std::path::Path;
    use std::sync::Arc;

    use super::ClientError;
    use super::K8Client;

    pub type SharedK8Client = Arc<K8Client>;

    /// client for named context of kubeconfig file
    pub fn new_shared<P: AsRef<Path>>(
        kubeconfig: P,
        context: &str,
    ) -> Result<SharedK8Client, ClientError> {
        let client = K8Client::from_kubeconfig(kubeconfig, context)?;
        Ok(Arc::new(client))
    }
}
