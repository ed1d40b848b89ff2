//! Server fixtures.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use restream_server::{Server, ServerConfig};
use restream_store::MemorySessionStore;

/// A server bound to an ephemeral port, serving in a background task.
///
/// The task is aborted when the fixture is dropped. The session store stays
/// accessible so tests can assert on what the server recorded.
pub struct TestServer {
    addr: SocketAddr,
    store: Arc<MemorySessionStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn with defaults: ephemeral port, 60s TTL, 0xFFFF ceiling.
    pub async fn spawn() -> Self {
        Self::spawn_with(Self::default_config()).await
    }

    /// Spawn with a custom config; the bind address is forced ephemeral.
    pub async fn spawn_with(mut config: ServerConfig) -> Self {
        config.bind_addr = "127.0.0.1:0".parse().expect("loopback address is valid");
        let session_ttl = config.session_ttl;

        let server = Server::bind_with_store(config, MemorySessionStore::new(session_ttl))
            .await
            .expect("bind ephemeral test server");
        let addr = server.local_addr().expect("test server has a local addr");
        let store = Arc::clone(server.store());

        let handle = tokio::spawn(async move {
            if let Err(e) = server.serve().await {
                tracing::error!("test server exited: {e}");
            }
        });

        Self {
            addr,
            store,
            handle,
        }
    }

    /// Config used by [`spawn`](Self::spawn).
    pub fn default_config() -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".parse().expect("loopback address is valid"),
            session_ttl: Duration::from_secs(60),
            max_count: 0xFFFF,
        }
    }

    /// The address the server listens on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The server's session store.
    pub fn store(&self) -> &Arc<MemorySessionStore> {
        &self.store
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
