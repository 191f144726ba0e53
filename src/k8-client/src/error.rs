use std::io::Error as IoError;

use thiserror::Error;

use k8_config::ConfigError;
use k8_metadata_client::MetadataClientError;
use k8_types::MetaStatus;

use crate::client::http::header::InvalidHeaderValue;
use crate::client::http::Error as HttpError;
use crate::client::http::InvalidUri;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    IoError(#[from] IoError),
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("{0}")]
    HttpError(#[from] HttpError),
    #[error("invalid uri: {0}")]
    InvalidUri(#[from] InvalidUri),
    #[error("{0:#?}")]
    InvalidHttpHeader(#[from] InvalidHeaderValue),
    #[error("{0}")]
    K8ConfigError(#[from] ConfigError),
    #[error("{0}")]
    HyperError(#[from] hyper::Error),
    #[error("base64 decoding err: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("tls: {0}")]
    Tls(anyhow::Error),
    #[error("api error: {0}")]
    Status(MetaStatus),
    #[error("{0}")]
    Other(String),
}

impl From<MetaStatus> for ClientError {
    fn from(status: MetaStatus) -> Self {
        Self::Status(status)
    }
}

impl MetadataClientError for ClientError {
    fn not_founded(&self) -> bool {
        match self {
            Self::Status(status) => status.is_not_found(),
            _ => false,
        }
    }

    fn already_exists(&self) -> bool {
        match self {
            Self::Status(status) => status.is_already_exists(),
            _ => false,
        }
    }
}
