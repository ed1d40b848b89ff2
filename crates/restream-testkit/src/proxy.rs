//! A TCP proxy that severs a connection after a fixed number of frames.
//!
//! The first proxied connection forwards exactly `drop_after` frames from
//! server to client and then closes both halves, simulating a mid-stream
//! transport failure at a chosen point. Every later connection forwards
//! everything, so a resuming client completes normally.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Frame-counting drop proxy in front of a server.
pub struct DropProxy {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl DropProxy {
    /// Spawn a proxy forwarding to `upstream`.
    ///
    /// `drop_after` counts server-to-client frames on the first connection,
    /// including any checksum reply.
    pub async fn spawn(upstream: SocketAddr, drop_after: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral proxy port");
        let addr = listener.local_addr().expect("proxy has a local addr");

        let handle = tokio::spawn(async move {
            let mut first = true;
            loop {
                let Ok((client, _)) = listener.accept().await else {
                    break;
                };
                let budget = if first { Some(drop_after) } else { None };
                first = false;
                tokio::spawn(relay(client, upstream, budget));
            }
        });

        Self { addr, handle }
    }

    /// The address clients should connect to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for DropProxy {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn relay(client: TcpStream, upstream: SocketAddr, frame_budget: Option<usize>) {
    let Ok(server) = TcpStream::connect(upstream).await else {
        return;
    };
    let (mut client_read, mut client_write) = client.into_split();
    let (mut server_read, mut server_write) = server.into_split();

    // Client -> server: forward everything.
    let up = tokio::spawn(async move {
        let _ = tokio::io::copy(&mut client_read, &mut server_write).await;
    });

    // Server -> client: forward whole frames, stopping at the budget.
    match frame_budget {
        None => {
            let _ = tokio::io::copy(&mut server_read, &mut client_write).await;
        }
        Some(budget) => {
            let _ = forward_frames(&mut server_read, &mut client_write, budget).await;
        }
    }

    // Dropping both halves closes the connection pair.
    up.abort();
}

/// Forward exactly `remaining` length-prefixed frames, then return.
async fn forward_frames<R, W>(from: &mut R, to: &mut W, mut remaining: usize) -> std::io::Result<()>
where
    R: AsyncReadExt + Unpin,
    W: AsyncWriteExt + Unpin,
{
    let mut len_bytes = [0u8; 4];
    while remaining > 0 {
        from.read_exact(&mut len_bytes).await?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        let mut body = vec![0u8; len];
        from.read_exact(&mut body).await?;

        to.write_all(&len_bytes).await?;
        to.write_all(&body).await?;
        remaining -= 1;
    }
    Ok(())
}
