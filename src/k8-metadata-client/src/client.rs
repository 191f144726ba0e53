use std::error::Error as StdError;
use std::fmt::Debug;
use std::fmt::Display;
use std::io::Error as IoError;

use async_trait::async_trait;
use serde_json::Error as SerdeJsonError;
use tracing::debug;
use tracing::trace;

use k8_types::{InputK8Obj, K8List, K8Meta, K8Obj, Spec};

#[derive(Clone, Debug)]
pub enum NameSpace {
    All,
    Named(String),
}

impl NameSpace {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn named(&self) -> &str {
        match self {
            Self::All => "all",
            Self::Named(name) => name,
        }
    }
}

impl From<String> for NameSpace {
    fn from(namespace: String) -> Self {
        NameSpace::Named(namespace)
    }
}

impl From<&str> for NameSpace {
    fn from(namespace: &str) -> Self {
        NameSpace::Named(namespace.to_owned())
    }
}

/// trait for metadata client
pub trait MetadataClientError: Debug + Display {
    /// is not founded
    fn not_founded(&self) -> bool;

    /// object with same name already exists
    fn already_exists(&self) -> bool;
}

#[async_trait]
pub trait MetadataClient: Send + Sync {
    type MetadataClientError: MetadataClientError
        + StdError
        + Send
        + Sync
        + 'static
        + From<IoError>
        + From<SerdeJsonError>;

    /// retrieval a single item
    async fn retrieve_item<S, M>(
        &self,
        metadata: &M,
    ) -> Result<K8Obj<S>, Self::MetadataClientError>
    where
        S: Spec,
        M: K8Meta + Send + Sync;

    /// retrieve all items a single chunk
    /// this may cause client to hang if there are too many items
    async fn retrieve_items<S, N>(
        &self,
        namespace: N,
    ) -> Result<K8List<S>, Self::MetadataClientError>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync;

    /// create new object
    async fn create_item<S>(
        &self,
        value: InputK8Obj<S>,
    ) -> Result<K8Obj<S>, Self::MetadataClientError>
    where
        S: Spec;

    /// create object only if there is no object with same name.
    /// existing object is never touched, `None` is returned instead
    async fn create_if_absent<S>(
        &self,
        value: InputK8Obj<S>,
    ) -> Result<Option<K8Obj<S>>, Self::MetadataClientError>
    where
        S: Spec,
    {
        let name = value.metadata.name.clone();
        trace!("{}: create if absent {:#?}", S::label(), value);
        match self.create_item(value).await {
            Ok(item) => {
                debug!(%name, "{}: created", S::label());
                Ok(Some(item))
            }
            Err(err) => {
                if err.already_exists() {
                    debug!(%name, "{}: already exists, skipping", S::label());
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Check if the object exists, return true or false.
    async fn exists<S, M>(&self, metadata: &M) -> Result<bool, Self::MetadataClientError>
    where
        S: Spec,
        M: K8Meta + Display + Send + Sync,
    {
        debug!("check if '{}' exists", metadata);
        match self.retrieve_item::<S, M>(metadata).await {
            Ok(_) => Ok(true),
            Err(err) => {
                if err.not_founded() {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }
}
