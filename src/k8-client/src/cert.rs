use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use base64::decode;
use tracing::debug;

use k8_config::KubeConfig;
use k8_config::ResolvedContext;
use k8_types::core::plugin::ExecCredentialSpec;
use k8_types::K8Obj;

use crate::ClientError;

pub trait ConfigBuilder: Sized {
    type Client;

    fn new() -> Self;

    fn build(self) -> Result<Self::Client, ClientError>;

    fn load_ca_certificate(self, ca_path: impl AsRef<Path>) -> Result<Self, ClientError>;

    // load from ca data
    fn load_ca_cert_with_data(self, data: Vec<u8>) -> Result<Self, ClientError>;

    // load client certificate (crt) and private key
    fn load_client_certificate<P: AsRef<Path>>(
        self,
        client_crt_path: P,
        client_key_path: P,
    ) -> Result<Self, ClientError>;

    fn load_client_certificate_with_data(
        self,
        client_crt: Vec<u8>,
        client_key: Vec<u8>,
    ) -> Result<Self, ClientError>;
}

/// Build Client for one context of kubeconfig
#[derive(Debug)]
pub struct ClientConfigBuilder<B> {
    host: String,
    builder: B,
    token: Option<String>,
}

impl<B> ClientConfigBuilder<B>
where
    B: ConfigBuilder,
{
    pub fn new(config: &KubeConfig, context: &str) -> Result<Self, ClientError> {
        let resolved = config.resolve(context)?;
        debug!(context, server = %resolved.cluster.server, "configuring client");
        let base_dir = config.path.parent().map(Path::to_path_buf);
        let (builder, token) = Self::configure(B::new(), &resolved, base_dir.as_deref())?;

        Ok(Self {
            host: resolved.cluster.server.clone(),
            builder,
            token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// bearer token, if context authenticates with one
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn build(self) -> Result<B::Client, ClientError> {
        self.builder.build()
    }

    fn configure(
        builder: B,
        resolved: &ResolvedContext<'_>,
        base_dir: Option<&Path>,
    ) -> Result<(B, Option<String>), ClientError> {
        let cluster = resolved.cluster;
        let user = resolved.user;

        if cluster.insecure_skip_tls_verify == Some(true) {
            return Err(ClientError::Other(format!(
                "context {}: insecure-skip-tls-verify is not supported",
                resolved.name
            )));
        }

        // load CA cluster
        let builder = if let Some(ca_data) = &cluster.certificate_authority_data {
            debug!("detected in-line cluster CA certs");
            builder.load_ca_cert_with_data(decode(ca_data)?)?
        } else {
            // let not inline, then must must ref to file
            let ca_certificate_path = cluster.certificate_authority.as_ref().ok_or_else(|| {
                ClientError::Other(format!(
                    "context {}: cluster must have CA crt path or data",
                    resolved.name
                ))
            })?;

            debug!("loading cluster CA from: {:#?}", ca_certificate_path);
            builder.load_ca_certificate(relative_to(base_dir, ca_certificate_path))?
        };

        // load client certs
        if let Some(exec) = &user.exec {
            debug!(exec = ?exec, "loading token using exec");

            let token_output = Command::new(&exec.command).args(&exec.args).output()?;

            let credential: K8Obj<ExecCredentialSpec> =
                serde_json::from_slice(&token_output.stdout)?;
            Ok((builder, Some(credential.status.token)))
        } else if let Some(client_cert_data) = &user.client_certificate_data {
            debug!("detected in-line client certs");
            let client_cert_pem_bytes = decode(client_cert_data)?;

            let client_key_pem_bytes = decode(user.client_key_data.as_ref().ok_or_else(|| {
                ClientError::Other("current user must have client key data".to_owned())
            })?)?;

            Ok((
                builder.load_client_certificate_with_data(
                    client_cert_pem_bytes,
                    client_key_pem_bytes,
                )?,
                None,
            ))
        } else if let Some(client_crt_path) = user.client_certificate.as_ref() {
            let client_key_path = user.client_key.as_ref().ok_or_else(|| {
                ClientError::Other("current user must have client key".to_owned())
            })?;

            debug!(
                "loading client crt: {} and client key: {}",
                client_crt_path, client_key_path
            );
            Ok((
                builder.load_client_certificate(
                    relative_to(base_dir, client_crt_path),
                    relative_to(base_dir, client_key_path),
                )?,
                None,
            ))
        } else if let Some(user_token) = &user.token {
            Ok((builder, Some(user_token.clone())))
        } else {
            Err(ClientError::Other(
                "no client cert crt data, path or user token were found".to_owned(),
            ))
        }
    }
}

/// kubeconfig paths are relative to the file itself
fn relative_to(base_dir: Option<&Path>, path: &str) -> PathBuf {
    let path = Path::new(path);
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod test {

    use std::path::Path;
    use std::path::PathBuf;

    use k8_config::KubeConfig;

    use super::ClientConfigBuilder;
    use super::ConfigBuilder;
    use crate::ClientError;

    /// remembers what client would have been configured with
    #[derive(Debug, Default)]
    struct RecordingBuilder {
        ca_path: Option<PathBuf>,
        ca_data: Option<Vec<u8>>,
        client_paths: Option<(PathBuf, PathBuf)>,
        client_data: Option<(Vec<u8>, Vec<u8>)>,
    }

    impl ConfigBuilder for RecordingBuilder {
        type Client = Self;

        fn new() -> Self {
            Self::default()
        }

        fn build(self) -> Result<Self::Client, ClientError> {
            Ok(self)
        }

        fn load_ca_certificate(mut self, ca_path: impl AsRef<Path>) -> Result<Self, ClientError> {
            self.ca_path = Some(ca_path.as_ref().to_path_buf());
            Ok(self)
        }

        fn load_ca_cert_with_data(mut self, data: Vec<u8>) -> Result<Self, ClientError> {
            self.ca_data = Some(data);
            Ok(self)
        }

        fn load_client_certificate<P: AsRef<Path>>(
            mut self,
            client_crt_path: P,
            client_key_path: P,
        ) -> Result<Self, ClientError> {
            self.client_paths = Some((
                client_crt_path.as_ref().to_path_buf(),
                client_key_path.as_ref().to_path_buf(),
            ));
            Ok(self)
        }

        fn load_client_certificate_with_data(
            mut self,
            client_crt: Vec<u8>,
            client_key: Vec<u8>,
        ) -> Result<Self, ClientError> {
            self.client_data = Some((client_crt, client_key));
            Ok(self)
        }
    }

    const TOKEN_CONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: remote
clusters:
- name: remote
  cluster:
    certificate-authority-data: dGVzdC1jYQ==
    server: https://10.0.0.1:6443
contexts:
- name: remote
  context:
    cluster: remote
    user: remote
users:
- name: remote
  user:
    token: test-token
"#;

    #[test]
    fn test_token_context() {
        let config = KubeConfig::from_yaml(TOKEN_CONFIG).expect("config");
        let builder =
            ClientConfigBuilder::<RecordingBuilder>::new(&config, "remote").expect("builder");

        assert_eq!(builder.host(), "https://10.0.0.1:6443");
        assert_eq!(builder.token(), Some("test-token"));

        let recorded = builder.build().expect("build");
        assert_eq!(recorded.ca_data.as_deref(), Some("test-ca".as_bytes()));
        assert!(recorded.client_paths.is_none());
        assert!(recorded.client_data.is_none());
    }

    #[test]
    fn test_relative_cert_paths() {
        let mut config = KubeConfig::from_file("../k8-config/data/k8config.yaml").expect("read");
        config.path = PathBuf::from("/home/test/.kube/config");
        config.clusters[0].cluster.certificate_authority = Some("ca.crt".to_owned());

        let builder =
            ClientConfigBuilder::<RecordingBuilder>::new(&config, "minikube").expect("builder");
        assert!(builder.token().is_none());

        let recorded = builder.build().expect("build");
        assert_eq!(
            recorded.ca_path,
            Some(PathBuf::from("/home/test/.kube/ca.crt"))
        );
        assert_eq!(
            recorded.client_paths,
            Some((
                PathBuf::from("/Users/test/.minikube/client.crt"),
                PathBuf::from("/Users/test/.minikube/client.key")
            ))
        );
    }

    #[test]
    fn test_unknown_context() {
        let config = KubeConfig::from_yaml(TOKEN_CONFIG).expect("config");
        let err = ClientConfigBuilder::<RecordingBuilder>::new(&config, "other")
            .expect_err("missing context");
        assert!(matches!(err, ClientError::K8ConfigError(_)));
    }
}
