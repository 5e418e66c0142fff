//! HTTP transport server
//!
//! a single axum fallback hands every request to the action `Router`, which
//! decodes it and runs the handler on tokio's blocking pool

pub mod handlers;
mod router;

pub use handlers::simctl_router;
pub use router::{Handler, Reply, Router, RouterError};

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actions::{HeaderField, WireRequest};

pub struct Server;

impl Server {
    /// bind `addr` and start serving `router` in the background
    pub async fn bind(addr: SocketAddr, router: Router) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let app = axum::Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(router));

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = &result {
                error!("server error: {}", e);
            }
            result
        });

        info!(%local_addr, "listening for simctl requests");

        Ok(ServerHandle {
            local_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}

/// running server; dropping it leaves the server running until the runtime ends
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// actual bound address, useful after binding port 0
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// stop accepting, let in-flight requests finish and release the socket
    pub async fn stop(mut self) -> io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let result = join(self.task).await;
        info!(local_addr = %self.local_addr, "server stopped");
        result
    }

    /// serve until the server task ends
    pub async fn wait(self) -> io::Result<()> {
        join(self.task).await
    }
}

async fn join(task: JoinHandle<io::Result<()>>) -> io::Result<()> {
    match task.await {
        Ok(result) => result,
        Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
    }
}

async fn dispatch(
    State(router): State<Arc<Router>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    let request = WireRequest {
        method: method.as_str().to_string(),
        path: uri.path().to_string(),
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                let value = std::str::from_utf8(value.as_bytes()).ok()?;
                Some(HeaderField {
                    name: name.as_str().to_string(),
                    value: value.to_string(),
                })
            })
            .collect(),
        body: if body.is_empty() {
            None
        } else {
            Some(body.to_vec())
        },
    };

    let reply = match tokio::task::spawn_blocking(move || router.dispatch(&request)).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("handler panicked: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "handler panicked".to_string());
        }
    };

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, reply.body)
}
