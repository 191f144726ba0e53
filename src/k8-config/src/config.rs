use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::ConfigError;
use crate::KUBECONFIG;

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub cluster: ClusterDetail,
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    pub server: String,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub context: ContextDetail,
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
pub struct ContextDetail {
    pub cluster: String,
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ContextDetail {
    pub fn namespace(&self) -> &str {
        match &self.namespace {
            Some(nm) => nm,
            None => "default",
        }
    }
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub user: UserDetail,
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<Exec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Eq, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Exec {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub command: String,
}

/// Context together with cluster and user it references
#[derive(Debug)]
pub struct ResolvedContext<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
    pub cluster: &'a ClusterDetail,
    pub user: &'a UserDetail,
}

#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub current_context: String,
    pub kind: String,
    #[serde(default)]
    pub users: Vec<User>,
}

impl KubeConfig {
    /// empty config with only header populated
    pub fn new() -> Self {
        Self {
            api_version: "v1".to_owned(),
            kind: "Config".to_owned(),
            ..Default::default()
        }
    }

    /// read from first path in KUBECONFIG or from home directory
    pub fn from_env_or_home() -> Result<Self, ConfigError> {
        Self::from_file(Self::default_path()?)
    }

    /// path used by kubectl when none is given
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(KUBECONFIG)
            .as_ref()
            .and_then(|paths| std::env::split_paths(paths).next())
        {
            return Ok(path);
        }
        let home_dir = home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home_dir.join(".kube").join("config"))
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        debug!(path = %path.as_ref().display(), "loading kubeconfig");
        let file = File::open(path.as_ref())?;
        let mut config: Self = serde_yaml::from_reader(file)?;
        config.path = path.as_ref().to_path_buf();
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        Ok(serde_yaml::to_writer(file, self)?)
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.name == name)
    }

    pub fn user(&self, name: &str) -> Option<&User> {
        self.users.iter().find(|u| u.name == name)
    }

    /// look up named context and everything it points to
    pub fn resolve(&self, name: &str) -> Result<ResolvedContext<'_>, ConfigError> {
        let ctx = self
            .context(name)
            .ok_or_else(|| ConfigError::ContextNotFound(name.to_owned()))?;

        let cluster =
            self.cluster(&ctx.context.cluster)
                .ok_or_else(|| ConfigError::ClusterNotFound {
                    context: name.to_owned(),
                    cluster: ctx.context.cluster.clone(),
                })?;

        let user = self
            .user(&ctx.context.user)
            .ok_or_else(|| ConfigError::UserNotFound {
                context: name.to_owned(),
                user: ctx.context.user.clone(),
            })?;

        Ok(ResolvedContext {
            name: &ctx.name,
            namespace: ctx.context.namespace(),
            cluster: &cluster.cluster,
            user: &user.user,
        })
    }

    /// resolve current context
    pub fn resolve_current(&self) -> Result<ResolvedContext<'_>, ConfigError> {
        if self.current_context.is_empty() {
            return Err(ConfigError::NoCurrentContext);
        }
        self.resolve(&self.current_context)
    }

    pub fn put_user(&mut self, user: User) -> Option<User> {
        let prev = self.users.iter_mut().find(|u| u.name.eq(&user.name));
        match prev {
            Some(prev) => Some(std::mem::replace(prev, user)),
            None => {
                self.users.push(user);
                None
            }
        }
    }

    pub fn put_cluster(&mut self, cluster: Cluster) -> Option<Cluster> {
        let prev = self.clusters.iter_mut().find(|c| c.name.eq(&cluster.name));
        match prev {
            Some(prev) => Some(std::mem::replace(prev, cluster)),
            None => {
                self.clusters.push(cluster);
                None
            }
        }
    }

    pub fn put_context(&mut self, context: Context) -> Option<Context> {
        let prev = self.contexts.iter_mut().find(|c| c.name.eq(&context.name));
        match prev {
            Some(prev) => Some(std::mem::replace(prev, context)),
            None => {
                self.contexts.push(context);
                None
            }
        }
    }
}

#[cfg(test)]
mod test {

    use crate::{Cluster, ConfigError, Context, User};

    use super::KubeConfig;

    #[test]
    fn test_decode_default_config() {
        let config = KubeConfig::from_file("data/k8config.yaml").expect("read");
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.kind, "Config");
        assert_eq!(config.current_context, "flv");
        assert_eq!(config.clusters.len(), 1);
        let cluster = &config.clusters[0].cluster;
        assert_eq!(cluster.server, "https://192.168.0.0:8443");
        assert_eq!(
            cluster.certificate_authority,
            Some("/Users/test/.minikube/ca.crt".to_owned())
        );
        assert_eq!(config.contexts.len(), 2);
        let ctx = &config.contexts[0].context;
        assert_eq!(ctx.cluster, "minikube");
        assert_eq!(ctx.namespace.as_ref().unwrap(), "flv");
    }

    #[test]
    fn test_config_ser() {
        //given
        let config = KubeConfig::from_file("data/k8config.yaml").expect("read");

        //when
        let serialized = serde_yaml::to_string(&config).expect("serialized");

        //then
        assert_eq!(
            serialized,
            r#"apiVersion: v1
clusters:
- name: minikube
  cluster:
    certificate-authority: /Users/test/.minikube/ca.crt
    server: https://192.168.0.0:8443
contexts:
- name: flv
  context:
    cluster: minikube
    user: minikube
    namespace: flv
- name: minikube
  context:
    cluster: minikube
    user: minikube
current-context: flv
kind: Config
users:
- name: minikube
  user:
    client-certificate: /Users/test/.minikube/client.crt
    client-key: /Users/test/.minikube/client.key
"#
        );
    }

    #[test]
    fn test_resolve_named_context() {
        let config = KubeConfig::from_file("data/k8config.yaml").expect("read");

        let resolved = config.resolve("minikube").expect("resolve");
        assert_eq!(resolved.name, "minikube");
        assert_eq!(resolved.namespace, "default");
        assert_eq!(resolved.cluster.server, "https://192.168.0.0:8443");
        assert_eq!(
            resolved.user.client_key.as_deref(),
            Some("/Users/test/.minikube/client.key")
        );

        let current = config.resolve_current().expect("current");
        assert_eq!(current.namespace, "flv");
    }

    #[test]
    fn test_resolve_missing() {
        let mut config = KubeConfig::from_file("data/k8config.yaml").expect("read");

        assert!(matches!(
            config.resolve("kind-kind"),
            Err(ConfigError::ContextNotFound(name)) if name == "kind-kind"
        ));

        config.put_context(Context {
            name: "dangling".to_string(),
            context: crate::ContextDetail {
                cluster: "gone".to_string(),
                user: "minikube".to_string(),
                ..Default::default()
            },
        });
        assert!(matches!(
            config.resolve("dangling"),
            Err(ConfigError::ClusterNotFound { cluster, .. }) if cluster == "gone"
        ));
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config");

        let mut config = KubeConfig::new();
        config.put_cluster(Cluster {
            name: "remote".to_string(),
            cluster: crate::ClusterDetail {
                server: "https://10.0.0.1:6443".to_string(),
                certificate_authority_data: Some("dGVzdC1jYQ==".to_string()),
                ..Default::default()
            },
        });
        config.to_file(&path).expect("write");

        let read = KubeConfig::from_file(&path).expect("read");
        assert_eq!(read.path, path);
        assert_eq!(read.clusters, config.clusters);
        assert_eq!(read.kind, "Config");
    }

    #[test]
    fn test_put_user() {
        //given
        let mut config = KubeConfig::default();

        let user1 = User {
            name: "user1".to_string(),
            user: crate::UserDetail {
                username: Some("username1".to_string()),
                ..Default::default()
            },
        };

        let user1_2 = User {
            name: "user1".to_string(),
            user: crate::UserDetail {
                username: Some("username2".to_string()),
                ..Default::default()
            },
        };

        let user2 = User {
            name: "user2".to_string(),
            user: Default::default(),
        };

        //when
        assert!(config.put_user(user1).is_none());
        assert!(config.put_user(user2).is_none());

        let prev = config.put_user(user1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().user.username.unwrap(), "username1");
    }

    #[test]
    fn test_put_cluster() {
        //given
        let mut config = KubeConfig::default();

        let cluster1 = Cluster {
            name: "cluster1".to_string(),
            cluster: crate::ClusterDetail {
                server: "server1".to_string(),
                ..Default::default()
            },
        };

        let cluster1_2 = Cluster {
            name: "cluster1".to_string(),
            cluster: crate::ClusterDetail {
                server: "server2".to_string(),
                ..Default::default()
            },
        };

        let cluster2 = Cluster {
            name: "cluster2".to_string(),
            cluster: Default::default(),
        };

        //when
        assert!(config.put_cluster(cluster1).is_none());
        assert!(config.put_cluster(cluster2).is_none());

        let prev = config.put_cluster(cluster1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().cluster.server, "server1");
    }

    #[test]
    fn test_put_context() {
        //given
        let mut config = KubeConfig::default();

        let context1 = Context {
            name: "context1".to_string(),
            context: crate::ContextDetail {
                cluster: "cluster1".to_string(),
                ..Default::default()
            },
        };

        let context1_2 = Context {
            name: "context1".to_string(),
            context: crate::ContextDetail {
                cluster: "cluster2".to_string(),
                ..Default::default()
            },
        };

        let context2 = Context {
            name: "context2".to_string(),
            context: Default::default(),
        };

        //when
        assert!(config.put_context(context1).is_none());
        assert!(config.put_context(context2).is_none());

        let prev = config.put_context(context1_2);
        assert!(prev.is_some());
        assert_eq!(prev.unwrap().context.cluster, "cluster1");
    }
}
