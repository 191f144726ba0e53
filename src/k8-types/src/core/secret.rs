use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Crd;
use crate::CrdNames;
use crate::Header;
use crate::Spec;
use crate::Status;

/// secret type populated by the token controller for service accounts
pub const SECRET_TYPE_SA_TOKEN: &str = "kubernetes.io/service-account-token";
/// annotation that binds a token secret to its service account
pub const SA_NAME_ANNOTATION: &str = "kubernetes.io/service-account.name";

//
// Secret Object
const SECRET_API: Crd = Crd {
    group: "core",
    version: "v1",
    names: CrdNames {
        kind: "Secret",
        plural: "secrets",
        singular: "secret",
    },
};

impl Spec for SecretSpec {
    type Status = SecretStatus;
    type Header = SecretHeader;

    fn metadata() -> &'static Crd {
        &SECRET_API
    }
}

#[derive(Deserialize, Serialize, Debug, Eq, PartialEq, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretSpec {}

#[derive(Deserialize, Serialize, Default, Eq, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {}

impl Status for SecretStatus {}

/// values in `data` are base64 encoded as they are on the wire
#[derive(Deserialize, Serialize, Debug, Default, Eq, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SecretHeader {
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    #[serde(rename = "type", default)]
    pub ty: String,
}

impl SecretHeader {
    pub fn typed<T: Into<String>>(ty: T) -> Self {
        Self {
            ty: ty.into(),
            ..Default::default()
        }
    }

    /// true if the secret holds service account token
    pub fn is_sa_token(&self) -> bool {
        self.ty == SECRET_TYPE_SA_TOKEN
    }
}

impl Header for SecretHeader {}
