use std::collections::HashMap;
use std::io::Error as IoError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use k8_types::Crd;
use k8_types::InputK8Obj;
use k8_types::K8List;
use k8_types::K8Meta;
use k8_types::K8Obj;
use k8_types::ObjectMeta;
use k8_types::Spec;

use crate::MetadataClient;
use crate::MetadataClientError;
use crate::NameSpace;

#[derive(Error, Debug)]
pub enum InMemoryError {
    #[error("io: {0}")]
    IoError(#[from] IoError),
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
    #[error("lock poison error")]
    LockPoisonError,
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
}

type ReadPoisonError<'a> = PoisonError<RwLockReadGuard<'a, ItemMap>>;

impl<'a> From<ReadPoisonError<'a>> for InMemoryError {
    fn from(_error: ReadPoisonError) -> Self {
        Self::LockPoisonError
    }
}

type WritePoisonError<'a> = PoisonError<RwLockWriteGuard<'a, ItemMap>>;

impl<'a> From<WritePoisonError<'a>> for InMemoryError {
    fn from(_error: WritePoisonError) -> Self {
        Self::LockPoisonError
    }
}

impl MetadataClientError for InMemoryError {
    fn not_founded(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    fn already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    crd: &'static Crd,
    ns: String,
    name: String,
}

impl ItemKey {
    fn new<S>(metadata: &dyn K8Meta) -> Self
    where
        S: Spec,
    {
        let ns = if S::NAME_SPACED {
            metadata.namespace().to_owned()
        } else {
            String::new()
        };

        ItemKey {
            crd: S::metadata(),
            ns,
            name: metadata.name().to_owned(),
        }
    }

    fn label<S: Spec>(&self) -> String {
        format!("{} {}/{}", S::label(), self.ns, self.name)
    }
}

type ItemMap = HashMap<ItemKey, Value>;

/// Object store that follows api server semantics for create and read.
/// Clones share same store, so one instance can stand for one cluster.
#[derive(Debug, Default, Clone)]
pub struct InMemoryClient {
    store: Arc<RwLock<ItemMap>>,
    version: Arc<AtomicU64>,
}

impl InMemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// number of objects of all kinds
    pub fn len(&self) -> usize {
        self.store.read().map(|store| store.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// replace existing object, as other controllers would do.
    /// object must exist
    pub async fn replace_item<S>(&self, value: &K8Obj<S>) -> Result<K8Obj<S>, InMemoryError>
    where
        S: Spec,
    {
        let item_key = ItemKey::new::<S>(&value.metadata);
        let mut store = self.store.write()?;
        let item_value = store
            .get_mut(&item_key)
            .ok_or_else(|| InMemoryError::NotFound(item_key.label::<S>()))?;

        let mut k8_obj = value.clone();
        k8_obj.metadata.resource_version = self.next_version().to_string();
        *item_value = serde_json::to_value(&k8_obj)?;
        debug!("{} replaced", item_key.label::<S>());

        Ok(k8_obj)
    }
}

#[async_trait]
impl MetadataClient for InMemoryClient {
    type MetadataClientError = InMemoryError;

    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<K8Obj<S>, Self::MetadataClientError>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        let store = self.store.read()?;
        let item_key = ItemKey::new::<S>(metadata);
        let item_value = store
            .get(&item_key)
            .ok_or_else(|| InMemoryError::NotFound(item_key.label::<S>()))?;
        Ok(serde_json::from_value(item_value.clone())?)
    }

    async fn retrieve_items<S, N>(
        &self,
        namespace: N,
    ) -> Result<K8List<S>, Self::MetadataClientError>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        let namespace = namespace.into();
        let store = self.store.read()?;
        let mut keys: Vec<&ItemKey> = store
            .keys()
            .filter(|key| key.crd == S::metadata())
            .filter(|key| namespace.is_all() || !S::NAME_SPACED || key.ns == namespace.named())
            .collect();
        // api server lists in key order
        keys.sort_by(|a, b| (&a.ns, &a.name).cmp(&(&b.ns, &b.name)));

        let mut list = K8List::new();
        for key in keys {
            list.items.push(serde_json::from_value(store[key].clone())?);
        }
        Ok(list)
    }

    async fn create_item<S>(
        &self,
        value: InputK8Obj<S>,
    ) -> Result<K8Obj<S>, Self::MetadataClientError>
    where
        S: Spec,
    {
        let item_key = ItemKey::new::<S>(&value.metadata);
        let mut store = self.store.write()?;
        if store.contains_key(&item_key) {
            return Err(InMemoryError::AlreadyExists(item_key.label::<S>()));
        }

        let version = self.next_version();
        let input_meta = value.metadata;
        let k8_obj = K8Obj {
            api_version: value.api_version,
            kind: value.kind,
            metadata: ObjectMeta {
                name: input_meta.name,
                namespace: item_key.ns.clone(),
                uid: format!("{:016x}", version),
                resource_version: version.to_string(),
                labels: input_meta.labels,
                annotations: input_meta.annotations,
                owner_references: input_meta.owner_references,
                finalizers: input_meta.finalizers,
                ..Default::default()
            },
            spec: value.spec,
            header: value.header,
            status: S::Status::default(),
        };

        store.insert(item_key.clone(), serde_json::to_value(&k8_obj)?);
        debug!("{} created", item_key.label::<S>());

        Ok(k8_obj)
    }
}
