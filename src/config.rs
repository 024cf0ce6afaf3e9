/// Command-line configuration: `ircserv <port> <password>`.
use clap::Parser;

/// RFC 2812-subset IRC server.
#[derive(Debug, Parser)]
#[command(name = "ircserv", version, about)]
pub struct Config {
    /// TCP port to listen on (1-65535).
    #[arg(value_parser = parse_port)]
    pub port: u16,

    /// Connection password clients must present via PASS.
    #[arg(value_parser = parse_password)]
    pub password: String,
}

fn parse_port(raw: &str) -> Result<u16, String> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("port must be an integer in 1-65535, got {raw:?}")),
        Ok(port) => Ok(port),
    }
}

fn parse_password(raw: &str) -> Result<String, String> {
    if raw.is_empty() {
        Err("password must not be empty".into())
    } else {
        Ok(raw.to_owned())
    }
}
