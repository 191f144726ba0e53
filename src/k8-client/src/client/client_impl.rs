use std::path::Path;

use async_trait::async_trait;
use http::header::InvalidHeaderValue;
use hyper::body::to_bytes;
use hyper::header::HeaderValue;
use hyper::header::ACCEPT;
use hyper::header::AUTHORIZATION;
use hyper::header::CONTENT_TYPE;
use hyper::Body;
use hyper::Request;
use hyper::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::error;
use tracing::trace;

use k8_config::KubeConfig;
use k8_metadata_client::{MetadataClient, NameSpace};
use k8_types::{InputK8Obj, K8List, K8Meta, K8Obj, MetaStatus, Spec, StatusEnum};

use crate::uri::{item_uri, items_uri};
use crate::ClientError;

use super::{HyperClient, HyperConfigBuilder};

/// K8 Cluster accessible thru API, bound to single kubeconfig context
#[derive(Debug)]
pub struct K8Client {
    client: HyperClient,
    host: String,
    token: Option<String>,
}

impl K8Client {
    /// load kubeconfig file and connect using named context
    pub fn from_kubeconfig<P: AsRef<Path>>(path: P, context: &str) -> Result<Self, ClientError> {
        let config = KubeConfig::from_file(path)?;
        Self::new(&config, context)
    }

    pub fn new(config: &KubeConfig, context: &str) -> Result<Self, ClientError> {
        let helper = HyperConfigBuilder::new(config, context)?;
        let host = helper.host().to_owned();
        let token = helper.token().map(str::to_owned);
        let client = helper.build()?;
        debug!(%host, context, token = token.is_some(), "k8 client created");
        Ok(Self {
            client,
            host,
            token,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn finish_request<B>(&self, request: &mut Request<B>) -> Result<(), InvalidHeaderValue> {
        if let Some(ref token) = self.token {
            let full_token = format!("Bearer {token}");
            request
                .headers_mut()
                .insert(AUTHORIZATION, HeaderValue::from_str(&full_token)?);
        }
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(())
    }

    /// handle request. this is async function
    async fn handle_request<T>(&self, mut request: Request<Body>) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        self.finish_request(&mut request)?;

        trace!("request url: {}", request.uri());
        trace!("request body: {:?}", request.body());

        let resp = self.client.request(request).await?;

        let status = resp.status();
        let buffer = to_bytes(resp.into_body()).await?;

        if status.is_success() {
            trace!(%status, "success response: {}", String::from_utf8_lossy(&buffer));
            serde_json::from_slice(&buffer).map_err(|err| {
                error!("json error: {}", err);
                error!("source: {}", String::from_utf8_lossy(&buffer));
                err.into()
            })
        } else {
            trace!(%status, "error response: {}", String::from_utf8_lossy(&buffer));
            Err(decode_status(status, &buffer).into())
        }
    }
}

/// Status object from error response.
/// Proxies in front of api server may answer with plain text, then status is built from code.
/// Only creates are issued, so bare 409 means object already exists
fn decode_status(status: StatusCode, body: &[u8]) -> MetaStatus {
    serde_json::from_slice(body).unwrap_or_else(|_| {
        let reason = match status {
            StatusCode::NOT_FOUND => Some(MetaStatus::REASON_NOT_FOUND.to_owned()),
            StatusCode::CONFLICT => Some(MetaStatus::REASON_ALREADY_EXISTS.to_owned()),
            _ => status.canonical_reason().map(|reason| reason.replace(' ', "")),
        };
        MetaStatus {
            api_version: "v1".to_owned(),
            code: Some(status.as_u16()),
            details: None,
            kind: "Status".to_owned(),
            message: Some(String::from_utf8_lossy(body).into_owned()),
            reason,
            status: StatusEnum::FAILURE,
        }
    })
}

#[async_trait]
impl MetadataClient for K8Client {
    type MetadataClientError = ClientError;

    /// retrieval a single item
    async fn retrieve_item<S, M>(&self, metadata: &M) -> Result<K8Obj<S>, ClientError>
    where
        S: Spec,
        M: K8Meta + Send + Sync,
    {
        let uri = item_uri::<S>(self.host(), metadata.name(), metadata.namespace())?;
        debug!("{}: retrieving item: {}", S::label(), uri);

        self.handle_request(Request::get(uri).body(Body::empty())?)
            .await
    }

    async fn retrieve_items<S, N>(&self, namespace: N) -> Result<K8List<S>, ClientError>
    where
        S: Spec,
        N: Into<NameSpace> + Send + Sync,
    {
        let uri = items_uri::<S>(self.host(), namespace.into())?;
        debug!("{}: retrieving items: {}", S::label(), uri);
        let items: K8List<S> = self
            .handle_request(Request::get(uri).body(Body::empty())?)
            .await?;
        trace!("{}: {} items retrieved", S::label(), items.items.len());
        Ok(items)
    }

    async fn create_item<S>(&self, value: InputK8Obj<S>) -> Result<K8Obj<S>, ClientError>
    where
        S: Spec,
    {
        let uri = items_uri::<S>(self.host(), value.metadata.namespace().into())?;
        debug!("{}: creating '{}' at: {}", S::label(), value.metadata.name, uri);
        trace!("creating {:#?}", value);

        let bytes = serde_json::to_vec(&value)?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(bytes.into())?;

        self.handle_request(request).await
    }
}
