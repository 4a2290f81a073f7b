//! Test helpers for end-to-end tests.
//!
//! Provides TestServer, TestClient and helpers that drive console sessions
//! against a real server over TCP.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use textchat::config::{Config, SeedAccount, ServerConfig};
use textchat::protocol::{read_frame, write_frame, DEFAULT_MAX_RESPONSE_BYTES};
use textchat::server::{self, ChatServer, ConnectionLimits};
use textchat::{RemoteTransport, Request, Response, Router, Session};

/// Default timeout for test operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Running server bound to an OS-assigned port.
pub struct TestServer {
    addr: SocketAddr,
    router: Router,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a server seeded with the default demo accounts.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Start a server with a custom configuration.
    pub async fn with_config(config: Config) -> Self {
        let router = server::build_router(&config);
        let listener = ChatServer::bind(&config.server)
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("No local address");
        let limits = ConnectionLimits::from(&config.server);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_router = router.clone();
        let handle = tokio::spawn(async move {
            let _ = server::run(listener, server_router, limits, async {
                let _ = shutdown_rx.await;
            })
            .await;
        });

        Self {
            addr,
            router,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Get the local address of the server.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// The router the server serves (for test setup and inspection).
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Open a console session against this server.
    pub async fn session(&self) -> Session<RemoteTransport> {
        let transport = RemoteTransport::connect(self.addr, DEFAULT_TIMEOUT)
            .await
            .expect("Failed to connect session");
        Session::new(transport)
    }

    /// Stop accepting connections and wait for the accept loop to end.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Raw protocol client for tests that bypass the console session.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TestClient {
    /// Connect to the server at the given address.
    pub async fn connect(addr: SocketAddr) -> Result<Self, std::io::Error> {
        let stream = TcpStream::connect(addr).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send raw bytes to the server.
    pub async fn send_raw(&mut self, data: &[u8]) -> Result<(), std::io::Error> {
        use tokio::io::AsyncWriteExt;
        self.writer.write_all(data).await?;
        self.writer.flush().await
    }

    /// Send one request and wait for its response.
    pub async fn request(&mut self, request: &Request) -> Option<Response> {
        write_frame(&mut self.writer, request)
            .await
            .expect("Failed to send request");
        self.recv().await
    }

    /// Receive one response; `None` once the server has closed the connection.
    pub async fn recv(&mut self) -> Option<Response> {
        timeout(DEFAULT_TIMEOUT, read_frame(&mut self.reader, DEFAULT_MAX_RESPONSE_BYTES))
            .await
            .expect("Timed out waiting for response")
            .ok()
            .flatten()
    }
}

/// Feed lines to a session and collect everything it printed.
pub async fn feed(session: &mut Session<RemoteTransport>, lines: &[&str]) -> Vec<String> {
    let mut output = Vec::new();
    for line in lines {
        output.extend(session.handle_line(line).await.expect("Session failed"));
    }
    output
}

/// Configuration for tests: OS-assigned port and the demo accounts.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.server = ServerConfig {
        port: 0,
        max_connections: 10,
        read_timeout_secs: 30,
        ..ServerConfig::default()
    };
    config.seed.accounts = vec![
        SeedAccount {
            name: "Ger".to_string(),
            login: "G".to_string(),
            password: "123".to_string(),
        },
        SeedAccount {
            name: "Sve".to_string(),
            login: "S".to_string(),
            password: "qwe".to_string(),
        },
    ];
    config
}
