use std::collections::BTreeMap;

use base64::encode;
use tracing::info;

use k8_config::KubeConfig;
use k8_metadata_client::MetadataClient;
use k8_types::config::ClientConfigSpec;
use k8_types::core::secret::{SecretHeader, SecretSpec};
use k8_types::{InputK8Obj, InputObjectMeta, TYPE_OPAQUE};

use crate::{Deadline, RegistrationError};

/// key of kubeconfig in published secret
pub const KUBECONFIG_KEY: &str = "kubeconfig";

/// Create only publisher of kubeconfig secret and client config.
/// Existing objects are left as they are
pub struct DestinationPublisher<'a, C> {
    client: &'a C,
    namespace: &'a str,
    deadline: Deadline,
}

impl<'a, C> DestinationPublisher<'a, C>
where
    C: MetadataClient,
{
    pub fn new(client: &'a C, namespace: &'a str, deadline: Deadline) -> Self {
        Self {
            client,
            namespace,
            deadline,
        }
    }

    pub async fn publish_secret(
        &self,
        name: &str,
        kubeconfig: &KubeConfig,
    ) -> Result<(), RegistrationError> {
        let mut data = BTreeMap::new();
        data.insert(KUBECONFIG_KEY.to_owned(), encode(kubeconfig.to_yaml()?));

        let input = InputK8Obj::new(SecretSpec::default(), InputObjectMeta::named(name, self.namespace))
            .with_header(SecretHeader {
                data,
                ty: TYPE_OPAQUE.to_owned(),
            });

        let created = self
            .deadline
            .guard("create kubeconfig secret", self.client.create_if_absent(input))
            .await?
            .map_err(|err| RegistrationError::api("create kubeconfig secret", err))?;
        if created.is_some() {
            info!(%name, namespace = %self.namespace, "kubeconfig secret created");
        }
        Ok(())
    }

    pub async fn publish_client_config(&self, name: &str) -> Result<(), RegistrationError> {
        let input = InputK8Obj::new(
            ClientConfigSpec::for_secret(name),
            InputObjectMeta::named(name, self.namespace),
        );

        let created = self
            .deadline
            .guard("create client config", self.client.create_if_absent(input))
            .await?
            .map_err(|err| RegistrationError::api("create client config", err))?;
        if created.is_some() {
            info!(%name, namespace = %self.namespace, "client config created");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use base64::decode;

    use k8_config::KubeConfig;
    use k8_metadata_client::{InMemoryClient, MetadataClient};
    use k8_types::config::ClientConfigSpec;
    use k8_types::core::secret::SecretSpec;
    use k8_types::ItemMeta;

    use super::{DestinationPublisher, KUBECONFIG_KEY};
    use crate::Deadline;

    #[fluvio_future::test]
    async fn test_publish_is_create_only() {
        let client = InMemoryClient::new();
        let publisher = DestinationPublisher::new(&client, "dest-namespace", Deadline::none());

        let mut first = KubeConfig::new();
        first.current_context = "first".to_owned();
        publisher
            .publish_secret("test-destination", &first)
            .await
            .expect("published");
        publisher
            .publish_client_config("test-destination")
            .await
            .expect("published");

        // second publish with different content is ignored
        let mut second = KubeConfig::new();
        second.current_context = "second".to_owned();
        publisher
            .publish_secret("test-destination", &second)
            .await
            .expect("already exists is success");
        publisher
            .publish_client_config("test-destination")
            .await
            .expect("already exists is success");
        assert_eq!(client.len(), 2);

        let secret = client
            .retrieve_item::<SecretSpec, _>(&ItemMeta::new("test-destination", "dest-namespace"))
            .await
            .expect("secret");
        assert_eq!(secret.header.ty, "Opaque");
        let yaml = decode(secret.header.data.get(KUBECONFIG_KEY).expect("kubeconfig")).unwrap();
        let stored = KubeConfig::from_yaml(std::str::from_utf8(&yaml).unwrap()).expect("yaml");
        assert_eq!(stored.current_context, "first");

        let client_config = client
            .retrieve_item::<ClientConfigSpec, _>(&ItemMeta::new("test-destination", "dest-namespace"))
            .await
            .expect("client config");
        assert_eq!(client_config.spec.context_name, "test-destination");
        assert_eq!(client_config.spec.kube_config_secret.name, "test-destination");
    }
}
