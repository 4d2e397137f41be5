use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::server::handler::Handler;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("error listening on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server already closed")]
    AlreadyClosed,
}

/// State shared between the [`Server`] handle and its accept loop.
struct Shared {
    closed: AtomicBool,
    shutdown: Notify,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// A running listener. Dropping the handle does not stop it; call
/// [`Server::close`].
pub struct Server {
    local_addr: SocketAddr,
    shared: Arc<Shared>,
    accept_task: Mutex<Option<JoinHandle<()>>>,
}

impl Server {
    /// Binds the configured address and starts accepting in the background.
    pub async fn serve<H: Handler>(cfg: &ServerConfig, handler: H) -> Result<Server, ServerError> {
        let addr = cfg.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!("Listening on {}", local_addr);

        let shared = Arc::new(Shared {
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
        });

        let accept_task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&shared),
            Arc::new(handler),
            cfg.read_buffer_size,
        ));

        Ok(Server {
            local_addr,
            shared,
            accept_task: Mutex::new(Some(accept_task)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Stops accepting new connections. In-flight connections run to
    /// completion.
    ///
    /// Only the first call succeeds; later calls return
    /// [`ServerError::AlreadyClosed`].
    pub fn close(&self) -> Result<(), ServerError> {
        if self
            .shared
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ServerError::AlreadyClosed);
        }

        // Stores a permit if the loop is not parked on accept right now
        self.shared.shutdown.notify_one();
        info!(addr = %self.local_addr, "Server closing");
        Ok(())
    }

    /// Waits for the accept loop to exit, at which point the listening socket
    /// has been released.
    pub async fn join(&self) {
        let Some(task) = self.accept_task.lock().await.take() else {
            return;
        };

        if let Err(e) = task.await {
            error!(error = %e, "Accept loop terminated abnormally");
        }
    }
}

async fn accept_loop<H: Handler>(
    listener: TcpListener,
    shared: Arc<Shared>,
    handler: Arc<H>,
    read_buffer_size: usize,
) {
    loop {
        if shared.is_closed() {
            info!("Server is shutting down, stopping listener");
            break;
        }

        let accepted = tokio::select! {
            res = listener.accept() => res,
            _ = shared.shutdown.notified() => {
                info!("Listener closed, exiting accept loop");
                break;
            }
        };

        match accepted {
            Ok((socket, peer)) => {
                info!("Accepted connection from {}", peer);
                spawn_connection(Connection::new(socket, peer, Arc::clone(&handler), read_buffer_size), peer);
            }
            Err(e) => {
                if shared.is_closed() {
                    info!("Listener closed, exiting accept loop");
                    break;
                }
                error!(error = %e, "Error accepting connection");
            }
        }
    }

    drop(listener);
}

/// Runs a connection on its own task. Errors and panics stop at this
/// boundary and are only logged.
fn spawn_connection<H: Handler>(mut conn: Connection<H>, peer: SocketAddr) {
    let task = tokio::spawn(async move {
        if let Err(e) = conn.run().await {
            error!("Connection error from {}: {:#}", peer, e);
        }
    });

    tokio::spawn(async move {
        if let Err(e) = task.await {
            if e.is_panic() {
                let payload = e.into_panic();
                let msg = panic_message(&*payload);
                error!(peer = %peer, panic = msg, "Recovered from panic in connection task");
            } else {
                error!(peer = %peer, error = %e, "Connection task cancelled");
            }
        }
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
