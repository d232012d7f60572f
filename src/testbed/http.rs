//! Local HTTP endpoint for URL fixtures
//!
//! Serves a fixture's payload to the integration while it runs. Any request
//! whose path contains `/<endpoint>` gets the payload; everything else gets
//! an empty body.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::common::{Error, Result};

use super::fixture::HttpFixture;

struct Endpoint {
    path: String,
    payload: String,
}

/// A running fixture server, stopped on drop
pub struct FixtureServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl FixtureServer {
    /// Bind 127.0.0.1 on the fixture's port and start serving
    pub async fn start(fixture: &HttpFixture) -> Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], fixture.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Setup(format!("Failed to listen on {}: {}", addr, e)))?;
        let addr = listener.local_addr()?;

        let endpoint = Arc::new(Endpoint {
            path: format!("/{}", fixture.endpoint),
            payload: fixture.payload.clone(),
        });
        let app = Router::new().fallback(serve_payload).with_state(endpoint);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                warn!("Fixture server error: {}", e);
            }
        });

        debug!(%addr, endpoint = %fixture.endpoint, "Fixture server listening");

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        })
    }

    /// Address the server is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop serving and wait for the server task to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        debug!(addr = %self.addr, "Fixture server stopped");
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_payload(State(endpoint): State<Arc<Endpoint>>, uri: Uri) -> String {
    if uri.path().contains(&endpoint.path) {
        endpoint.payload.clone()
    } else {
        String::new()
    }
}
