use tracing::{debug, info};

use k8_metadata_client::{MetadataClient, MetadataClientError};
use k8_types::core::secret::{SecretHeader, SecretSpec, SA_NAME_ANNOTATION, SECRET_TYPE_SA_TOKEN};
use k8_types::core::service_account::ServiceAccountSpec;
use k8_types::{InputK8Obj, InputObjectMeta, ItemMeta, K8Obj};

use crate::{Deadline, RegistrationError};

const TOKEN_KEY: &str = "token";
const CA_KEY: &str = "ca.crt";

/// Token and CA issued for a service account, base64 encoded as stored in secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    pub secret: String,
    pub token: String,
    pub ca_certificate: String,
}

/// Ensures service account exists in source namespace and finds token issued for it
pub struct IdentityBootstrapper<'a, C> {
    client: &'a C,
    namespace: &'a str,
    service_account: &'a str,
    deadline: Deadline,
}

impl<'a, C> IdentityBootstrapper<'a, C>
where
    C: MetadataClient,
{
    pub fn new(client: &'a C, namespace: &'a str, service_account: &'a str, deadline: Deadline) -> Self {
        Self {
            client,
            namespace,
            service_account,
            deadline,
        }
    }

    /// create service account if it doesn't exist.
    /// freshly created account is reported as not ready
    pub async fn ensure_identity(&self) -> Result<(), RegistrationError> {
        let meta = ItemMeta::new(self.service_account, self.namespace);
        let result = self
            .deadline
            .guard(
                "get serviceaccount",
                self.client.retrieve_item::<ServiceAccountSpec, _>(&meta),
            )
            .await?;

        match result {
            Ok(_) => {
                debug!(name = %self.service_account, namespace = %self.namespace, "service account found");
                Ok(())
            }
            Err(err) if err.not_founded() => {
                info!(name = %self.service_account, namespace = %self.namespace, "creating service account");
                let input = InputK8Obj::new(
                    ServiceAccountSpec::default(),
                    InputObjectMeta::named(self.service_account, self.namespace),
                );
                self.deadline
                    .guard("create serviceaccount", self.client.create_if_absent(input))
                    .await?
                    .map_err(|err| RegistrationError::api("create serviceaccount", err))?;

                Err(RegistrationError::IdentityNotReady {
                    name: self.service_account.to_owned(),
                    namespace: self.namespace.to_owned(),
                })
            }
            Err(err) => Err(RegistrationError::api("get serviceaccount", err)),
        }
    }

    /// find token secret bound to service account.
    /// if there is none, ask token controller to issue one
    pub async fn locate_credential(&self) -> Result<IssuedCredential, RegistrationError> {
        let secrets = self
            .deadline
            .guard(
                "list secrets",
                self.client.retrieve_items::<SecretSpec, _>(self.namespace),
            )
            .await?
            .map_err(|err| RegistrationError::api("list secrets", err))?;

        let secret = match secrets
            .items
            .into_iter()
            .find(|secret| self.is_bound_token(secret))
        {
            Some(secret) => secret,
            None => {
                self.request_token().await?;
                return Err(self.no_credential());
            }
        };

        let name = secret.metadata.name;
        let mut data = secret.header.data;
        match data.remove(TOKEN_KEY) {
            Some(token) if !token.is_empty() => {
                debug!(secret = %name, "token found");
                Ok(IssuedCredential {
                    secret: name,
                    token,
                    ca_certificate: data.remove(CA_KEY).unwrap_or_default(),
                })
            }
            _ => {
                debug!(secret = %name, "token not yet populated");
                Err(self.no_credential())
            }
        }
    }

    fn is_bound_token(&self, secret: &K8Obj<SecretSpec>) -> bool {
        secret.header.is_sa_token()
            && secret.metadata.annotations.get(SA_NAME_ANNOTATION).map(String::as_str)
                == Some(self.service_account)
    }

    /// token controller fills in secrets of this type and annotation
    async fn request_token(&self) -> Result<(), RegistrationError> {
        let name = format!("{}-secret", self.service_account);
        info!(secret = %name, namespace = %self.namespace, "requesting service account token");
        let input = InputK8Obj::new(
            SecretSpec::default(),
            InputObjectMeta::named(name.as_str(), self.namespace)
                .annotate(SA_NAME_ANNOTATION, self.service_account),
        )
        .with_header(SecretHeader::typed(SECRET_TYPE_SA_TOKEN));

        self.deadline
            .guard("create secret", self.client.create_if_absent(input))
            .await?
            .map_err(|err| RegistrationError::api("create secret", err))?;
        Ok(())
    }

    fn no_credential(&self) -> RegistrationError {
        RegistrationError::NoCredential {
            name: self.service_account.to_owned(),
            namespace: self.namespace.to_owned(),
        }
    }
}

#[cfg(test)]
mod test {

    use std::collections::BTreeMap;

    use k8_metadata_client::{InMemoryClient, MetadataClient};
    use k8_types::core::secret::{SecretHeader, SecretSpec, SA_NAME_ANNOTATION, SECRET_TYPE_SA_TOKEN};
    use k8_types::core::service_account::ServiceAccountSpec;
    use k8_types::{InputK8Obj, InputObjectMeta, ItemMeta, TYPE_OPAQUE};

    use super::IdentityBootstrapper;
    use crate::{Deadline, RegistrationError};

    const NS: &str = "source-namespace";
    const SA: &str = "k8ssandra-operator";

    fn secret(name: &str, ty: &str, service_account: &str, token: Option<&str>) -> InputK8Obj<SecretSpec> {
        let mut data = BTreeMap::new();
        if let Some(token) = token {
            data.insert("token".to_owned(), token.to_owned());
            data.insert("ca.crt".to_owned(), "dGVzdC1jYQ==".to_owned());
        }
        InputK8Obj::new(
            SecretSpec::default(),
            InputObjectMeta::named(name, NS).annotate(SA_NAME_ANNOTATION, service_account),
        )
        .with_header(SecretHeader {
            data,
            ty: ty.to_owned(),
        })
    }

    #[fluvio_future::test]
    async fn test_identity_created_once() {
        let client = InMemoryClient::new();
        let bootstrapper = IdentityBootstrapper::new(&client, NS, SA, Deadline::none());

        let err = bootstrapper.ensure_identity().await.expect_err("just created");
        assert!(matches!(err, RegistrationError::IdentityNotReady { .. }));
        assert!(client
            .exists::<ServiceAccountSpec, _>(&ItemMeta::new(SA, NS))
            .await
            .expect("exists"));

        bootstrapper.ensure_identity().await.expect("now present");
        assert_eq!(client.len(), 1);
    }

    #[fluvio_future::test]
    async fn test_token_requested_when_missing() {
        let client = InMemoryClient::new();
        let bootstrapper = IdentityBootstrapper::new(&client, NS, SA, Deadline::none());

        let err = bootstrapper.locate_credential().await.expect_err("no secret");
        assert!(matches!(err, RegistrationError::NoCredential { .. }));

        let requested = client
            .retrieve_item::<SecretSpec, _>(&ItemMeta::new("k8ssandra-operator-secret", NS))
            .await
            .expect("placeholder created");
        assert_eq!(requested.header.ty, SECRET_TYPE_SA_TOKEN);
        assert_eq!(
            requested.metadata.annotations.get(SA_NAME_ANNOTATION).map(String::as_str),
            Some(SA)
        );

        // placeholder is found, but still empty
        let err = bootstrapper.locate_credential().await.expect_err("not populated");
        assert!(err.is_pending());
        assert_eq!(client.len(), 1);
    }

    #[fluvio_future::test]
    async fn test_first_matching_secret_wins() {
        let client = InMemoryClient::new();
        for input in [
            secret("a-other", SECRET_TYPE_SA_TOKEN, "other", Some("b3RoZXI=")),
            secret("b-opaque", TYPE_OPAQUE, SA, Some("b3BhcXVl")),
            secret("c-token", SECRET_TYPE_SA_TOKEN, SA, Some("dGVzdC10b2tlbg==")),
            secret("d-token", SECRET_TYPE_SA_TOKEN, SA, Some("c2Vjb25k")),
        ] {
            client.create_item(input).await.expect("created");
        }

        let credential = IdentityBootstrapper::new(&client, NS, SA, Deadline::none())
            .locate_credential()
            .await
            .expect("found");
        assert_eq!(credential.secret, "c-token");
        assert_eq!(credential.token, "dGVzdC10b2tlbg==");
        assert_eq!(credential.ca_certificate, "dGVzdC1jYQ==");
    }
}
