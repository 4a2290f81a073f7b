use std::net::{SocketAddr, ToSocketAddrs};
use std::process::ExitCode;
use std::time::Duration;

use tokio::io::BufReader;
use tracing::{error, info};

use textchat::client::{console, RemoteTransport, Session};
use textchat::Config;

fn resolve(host: &str, port: u16) -> Option<SocketAddr> {
    (host, port).to_socket_addrs().ok()?.next()
}

#[tokio::main]
async fn main() -> ExitCode {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let mut config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Prompts own stdout, so logs go to a file
    let client = &config.client;
    if let Err(e) = textchat::logging::init_file_only(&config.logging.level, &client.log_file) {
        eprintln!("Failed to open client log {}: {e}", client.log_file);
        textchat::logging::init_console_only("warn");
    }

    let Some(addr) = resolve(&client.host, client.port) else {
        eprintln!("Cannot resolve {}:{}", client.host, client.port);
        return ExitCode::FAILURE;
    };

    let timeout = Duration::from_secs(client.connect_timeout_secs);
    let transport = match RemoteTransport::connect(addr, timeout).await {
        Ok(transport) => transport.with_max_response_bytes(client.max_response_bytes),
        Err(e) => {
            error!("Failed to connect to {}: {}", addr, e);
            eprintln!("Cannot connect to {addr}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(transport);
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    match console::run(&mut session, &mut stdin, &mut stdout).await {
        Ok(()) => {
            info!("Client finished");
            ExitCode::SUCCESS
        }
        Err(_) => ExitCode::FAILURE,
    }
}
