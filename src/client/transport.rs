//! Request/response transports for the client.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::protocol::{read_frame, write_frame, Request, Response, DEFAULT_MAX_RESPONSE_BYTES};
use crate::server::{dispatch, Connection};
use crate::store::Router;
use crate::{ChatError, Result};

/// Carries one request to the server and brings back its response.
pub trait Transport {
    /// Perform one round trip.
    fn round_trip(&mut self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// Transport over a TCP connection using newline-delimited JSON frames.
pub struct RemoteTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    max_response_bytes: usize,
}

impl RemoteTransport {
    /// Connect to a server, giving up after `connect_timeout`.
    pub async fn connect(addr: SocketAddr, connect_timeout: Duration) -> Result<Self> {
        let stream = timeout(connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| ChatError::Timeout(connect_timeout.as_secs()))??;
        info!("Connected to {}", addr);
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Set the largest response frame accepted from the server.
    pub fn with_max_response_bytes(mut self, max_response_bytes: usize) -> Self {
        self.max_response_bytes = max_response_bytes;
        self
    }
}

impl Transport for RemoteTransport {
    async fn round_trip(&mut self, request: Request) -> Result<Response> {
        debug!("Sending {}", request.kind());
        write_frame(&mut self.writer, &request).await?;
        read_frame(&mut self.reader, self.max_response_bytes)
            .await?
            .ok_or(ChatError::ConnectionClosed)
    }
}

/// In-process transport that dispatches straight into a router.
pub struct LocalTransport {
    router: Router,
    conn: Connection,
}

impl LocalTransport {
    /// Create a transport with its own anonymous connection context.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            conn: Connection::new(),
        }
    }

    /// The server-side context of this transport.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Transport for LocalTransport {
    async fn round_trip(&mut self, request: Request) -> Result<Response> {
        Ok(dispatch(&self.router, &mut self.conn, request).await)
    }
}
