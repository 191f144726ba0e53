mod client_impl;
mod config_rustls;

pub use client_impl::K8Client;

use config_rustls::*;

pub mod http {
    pub use ::http::header;
    pub use ::http::Error;
    pub use ::http::uri::InvalidUri;
    pub use hyper::Uri;
}

mod executor {

    use futures_util::future::Future;
    use hyper::rt::Executor;

    use fluvio_future::task::spawn;

    pub(crate) struct FluvioHyperExecutor;

    impl<F: Future + Send + 'static> Executor<F> for FluvioHyperExecutor {
        fn execute(&self, fut: F) {
            spawn(async { drop(fut.await) });
        }
    }
}
