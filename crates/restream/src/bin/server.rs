//! The restream server binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use restream::server::{Server, ServerConfig};

/// Resumable sequence transfer server.
#[derive(Parser, Debug)]
#[command(name = "restream-server", about = "Resumable sequence transfer server")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:7400")]
    listen: SocketAddr,

    /// Session time-to-live in seconds (sliding; resumes restart it).
    #[arg(long, default_value_t = 100)]
    session_ttl: u64,

    /// Largest sequence length a client may request.
    #[arg(long, default_value_t = 0xFFFF)]
    max_count: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = ServerConfig {
        bind_addr: args.listen,
        session_ttl: Duration::from_secs(args.session_ttl),
        max_count: args.max_count,
    };

    let server = Server::bind(config).await?;
    tracing::info!(addr = %server.local_addr()?, "listening");
    server.serve().await?;
    Ok(())
}
