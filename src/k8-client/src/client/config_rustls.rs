use std::io::Result as IoResult;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anyhow::{anyhow, Result};
use futures_util::future::Future;
use futures_util::io::{AsyncRead as StdAsyncRead, AsyncWrite as StdAsyncWrite};
use http::Uri;
use tracing::debug;

use hyper::client::connect::{Connected, Connection};
use hyper::service::Service;
use hyper::Body;
use hyper::Client;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use fluvio_future::net::TcpStream;
use fluvio_future::rust_tls::{ConnectorBuilder, DefaultClientTlsStream, TlsConnector};

use super::executor::FluvioHyperExecutor;
use crate::cert::{ClientConfigBuilder, ConfigBuilder};
use crate::ClientError;

pub type HyperClient = Client<TlsHyperConnector, Body>;

pub type HyperConfigBuilder = ClientConfigBuilder<HyperClientBuilder>;

pub struct HyperTlsStream(DefaultClientTlsStream);

impl Connection for HyperTlsStream {
    fn connected(&self) -> Connected {
        Connected::new()
    }
}

impl AsyncRead for HyperTlsStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<IoResult<()>> {
        match Pin::new(&mut self.0).poll_read(cx, buf.initialize_unfilled())? {
            Poll::Ready(bytes_read) => {
                buf.advance(bytes_read);
                Poll::Ready(Ok(()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl AsyncWrite for HyperTlsStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<IoResult<usize>> {
        Pin::new(&mut self.0).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        Pin::new(&mut self.0).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        Pin::new(&mut self.0).poll_close(cx)
    }
}

/// hyper connector that uses fluvio TLS
#[derive(Clone)]
pub struct TlsHyperConnector(Arc<TlsConnector>);

impl TlsHyperConnector {
    fn new(connector: TlsConnector) -> Self {
        Self(Arc::new(connector))
    }
}

impl Service<Uri> for TlsHyperConnector {
    type Response = HyperTlsStream;
    type Error = anyhow::Error;

    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, uri: Uri) -> Self::Future {
        let connector = self.0.clone();

        Box::pin(async move {
            let host = match uri.host() {
                Some(h) => h.to_owned(),
                None => return Err(anyhow!("no host")),
            };

            match uri.scheme_str() {
                Some("http") => Err(anyhow!("http not supported")),
                Some("https") => {
                    let socket_addr = {
                        let port = uri.port_u16().unwrap_or(443);
                        match (host.as_str(), port).to_socket_addrs()?.next() {
                            Some(addr) => addr,
                            None => return Err(anyhow!("host resolution: {} failed", host)),
                        }
                    };
                    debug!("socket address to: {}", socket_addr);
                    let tcp_stream = TcpStream::connect(&socket_addr).await?;

                    let stream = connector.connect(host.try_into()?, tcp_stream).await?;
                    Ok(HyperTlsStream(stream))
                }
                scheme => Err(anyhow!("{:?}", scheme)),
            }
        })
    }
}

#[derive(Debug)]
enum CaSource {
    Path(PathBuf),
    Data(Vec<u8>),
}

#[derive(Debug)]
enum ClientCertSource {
    Path { crt: PathBuf, key: PathBuf },
    Data { crt: Vec<u8>, key: Vec<u8> },
}

/// Collects certificates from kubeconfig.
/// TLS connector is only assembled in `build`, CA first then client identity
#[derive(Debug, Default)]
pub struct HyperClientBuilder {
    ca: Option<CaSource>,
    client_cert: Option<ClientCertSource>,
}

impl HyperClientBuilder {
    fn connector(self) -> Result<TlsConnector> {
        let builder = ConnectorBuilder::with_safe_defaults();

        let builder = match self.ca.ok_or_else(|| anyhow!("missing CA certificate"))? {
            CaSource::Path(path) => builder.load_ca_cert(path)?,
            CaSource::Data(data) => builder.load_ca_cert_from_bytes(&data)?,
        };

        // token auth has no client identity
        let builder = match self.client_cert {
            Some(ClientCertSource::Path { crt, key }) => builder.load_client_certs(crt, key)?,
            Some(ClientCertSource::Data { crt, key }) => {
                builder.load_client_certs_from_bytes(&crt, &key)?
            }
            None => builder.no_client_auth(),
        };

        Ok(builder.build())
    }
}

impl ConfigBuilder for HyperClientBuilder {
    type Client = HyperClient;

    fn new() -> Self {
        Self::default()
    }

    fn build(self) -> Result<Self::Client, ClientError> {
        let connector = self.connector().map_err(ClientError::Tls)?;

        Ok(Client::builder()
            .executor(FluvioHyperExecutor)
            .build::<_, Body>(TlsHyperConnector::new(connector)))
    }

    fn load_ca_certificate(mut self, ca_path: impl AsRef<Path>) -> Result<Self, ClientError> {
        self.ca = Some(CaSource::Path(ca_path.as_ref().to_path_buf()));
        Ok(self)
    }

    fn load_ca_cert_with_data(mut self, ca_data: Vec<u8>) -> Result<Self, ClientError> {
        self.ca = Some(CaSource::Data(ca_data));
        Ok(self)
    }

    fn load_client_certificate_with_data(
        mut self,
        client_crt: Vec<u8>,
        client_key: Vec<u8>,
    ) -> Result<Self, ClientError> {
        self.client_cert = Some(ClientCertSource::Data {
            crt: client_crt,
            key: client_key,
        });
        Ok(self)
    }

    fn load_client_certificate<P: AsRef<Path>>(
        mut self,
        client_crt_path: P,
        client_key_path: P,
    ) -> Result<Self, ClientError> {
        self.client_cert = Some(ClientCertSource::Path {
            crt: client_crt_path.as_ref().to_path_buf(),
            key: client_key_path.as_ref().to_path_buf(),
        });
        Ok(self)
    }
}

#[cfg(test)]
mod test {

    use super::HyperClientBuilder;
    use crate::cert::ConfigBuilder;
    use crate::ClientError;

    #[test]
    fn test_missing_ca_is_rejected() {
        let err = HyperClientBuilder::new().build().expect_err("no ca");
        assert!(matches!(err, ClientError::Tls(_)));
    }
}
