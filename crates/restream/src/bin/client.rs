//! The restream client binary.

use clap::Parser;

use restream::client::{DriverConfig, SessionDriver};
use restream::ClientId;

/// Resumable sequence transfer client.
#[derive(Parser, Debug)]
#[command(name = "restream-client", about = "Resumable sequence transfer client")]
struct Args {
    /// Server address, host:port.
    #[arg(long)]
    server: String,

    /// Number of sequence items to request (0 = server chooses).
    #[arg(long, default_value_t = 10)]
    count: u32,

    /// Client identity to present; random when omitted.
    #[arg(long)]
    client_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = DriverConfig::new(args.server);
    config.requested_count = args.count;

    let driver = match args.client_id {
        Some(id) => SessionDriver::with_client_id(config, ClientId::new(id)),
        None => SessionDriver::new(config),
    };

    tracing::info!(client = %driver.client_id(), "starting transfer");
    let transfer = driver.run().await?;
    tracing::info!(
        count = transfer.values.len(),
        reconnects = transfer.reconnects,
        checksum = %transfer.checksum,
        "transfer complete and verified"
    );
    Ok(())
}
