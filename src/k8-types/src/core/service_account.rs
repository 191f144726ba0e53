use serde::Deserialize;
use serde::Serialize;

use crate::Crd;
use crate::CrdNames;
use crate::Header;
use crate::LocalObjectReference;
use crate::Spec;
use crate::Status;

const API: Crd = Crd {
    group: "core",
    version: "v1",
    names: CrdNames {
        kind: "ServiceAccount",
        plural: "serviceaccounts",
        singular: "serviceaccount",
    },
};

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSpec {}

impl Spec for ServiceAccountSpec {
    type Status = ServiceAccountStatus;
    type Header = ServiceAccountHeader;
    fn metadata() -> &'static Crd {
        &API
    }
}

#[derive(Deserialize, Serialize, Eq, PartialEq, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceAccountStatus {}

impl Status for ServiceAccountStatus {}

/// secrets are top level fields of service account
#[derive(Deserialize, Serialize, Eq, PartialEq, Debug, Default, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceAccountHeader {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<LocalObjectReference>,
}

impl Header for ServiceAccountHeader {}
