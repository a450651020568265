use std::time::Duration;

use clap::Parser;

use nocturne::client::TcpClient;
use nocturne::players::SearchPlayer;

#[derive(Parser, Debug)]
#[command(name = "nocturne", about = "Connect to a game server and play")]
struct Config {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = 5555)]
    port: u16,

    /// Player name announced to the server
    #[arg(short, long, default_value = "nocturne")]
    name: String,

    /// Fixed search depth (0 = anytime search driven by the time budget)
    #[arg(short, long, default_value_t = 0)]
    depth: u8,

    /// Per-move time budget in milliseconds for the anytime search
    #[arg(long, default_value_t = 1500)]
    budget_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _logger = nocturne::logging::init("info")?;
    let config = Config::parse();

    let player = if config.depth > 0 {
        SearchPlayer::with_depth(config.depth)
    } else {
        SearchPlayer::with_timeout(Duration::from_millis(config.budget_ms))
    };

    let addr = format!("{}:{}", config.host, config.port);
    log::info!("connecting to {} as {}", addr, config.name);

    let client = TcpClient::connect(&addr, &config.name, player).await?;
    client.run().await?;

    Ok(())
}
