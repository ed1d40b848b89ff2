//! The listener: accept loop and connection spawning.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use restream_store::{MemorySessionStore, SessionStore};

use crate::error::{Result, ServerError};
use crate::handshake::SessionHandler;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on. Port 0 binds an ephemeral port.
    pub bind_addr: SocketAddr,

    /// How long an idle session stays resumable. Sliding: each resume
    /// restarts it.
    pub session_ttl: Duration,

    /// Hard ceiling on the sequence length a client may request.
    pub max_count: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7400"
                .parse()
                .expect("default bind address is valid"),
            session_ttl: Duration::from_secs(100),
            max_count: 0xFFFF,
        }
    }
}

/// A resumable sequence transfer server.
///
/// Generic over the session store so tests (and future backends) can supply
/// their own; [`Server::bind`] wires up the in-memory store.
pub struct Server<S> {
    config: ServerConfig,
    store: Arc<S>,
    listener: TcpListener,
}

impl Server<MemorySessionStore> {
    /// Bind with a fresh in-memory session store.
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        let store = MemorySessionStore::new(config.session_ttl);
        Self::bind_with_store(config, store).await
    }
}

impl<S: SessionStore + 'static> Server<S> {
    /// Bind with a caller-supplied session store.
    pub async fn bind_with_store(config: ServerConfig, store: S) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(ServerError::Bind)?;
        Ok(Self {
            config,
            store: Arc::new(store),
            listener,
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The shared session store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Accept connections until the task is cancelled.
    ///
    /// Every connection runs in its own task; a failing handler is logged
    /// and never takes the listener down with it.
    pub async fn serve(self) -> Result<()> {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!("error accepting connection: {e}");
                    continue;
                }
            };

            let handler = SessionHandler::new(Arc::clone(&self.store), self.config.clone());
            tokio::spawn(async move {
                if let Err(e) = handler.run(stream).await {
                    tracing::warn!(%peer, "connection handler failed: {e}");
                }
            });
        }
    }
}
