use clap::Parser;
use tracing::info;

use ircserv::config::Config;
use ircserv::irc::server::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::parse();
    let server = Server::bind(&config)
        .await
        .map_err(|e| format!("cannot listen on port {}: {e}", config.port))?;
    info!(port = config.port, "ircserv listening");
    server.run().await?;
    Ok(())
}
