use serde::Deserialize;
use serde::Serialize;

use crate::Crd;
use crate::CrdNames;
use crate::DefaultHeader;
use crate::LocalObjectReference;
use crate::NoStatus;
use crate::Spec;

pub const CONFIG_GROUP: &str = "config.k8ssandra.io";
pub const V1BETA1: &str = "v1beta1";

const CLIENT_CONFIG_API: Crd = Crd {
    group: CONFIG_GROUP,
    version: V1BETA1,
    names: CrdNames {
        kind: "ClientConfig",
        plural: "clientconfigs",
        singular: "clientconfig",
    },
};

/// Points at a secret holding kubeconfig of a remote cluster.
/// Consumers resolve a registered cluster by the name of this object.
#[derive(Deserialize, Serialize, Debug, Default, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigSpec {
    #[serde(default)]
    pub context_name: String,
    pub kube_config_secret: LocalObjectReference,
}

impl ClientConfigSpec {
    /// context and secret share same name
    pub fn for_secret<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            context_name: name.clone(),
            kube_config_secret: LocalObjectReference { name },
        }
    }
}

impl Spec for ClientConfigSpec {
    type Status = NoStatus;
    type Header = DefaultHeader;

    fn metadata() -> &'static Crd {
        &CLIENT_CONFIG_API
    }
}
