//! Per-connection request loop.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::handler::{dispatch, Connection};
use crate::config::ServerConfig;
use crate::protocol::{read_frame, write_frame, Request, Response};
use crate::store::Router;
use crate::{ChatError, Result};

/// Limits applied to every connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    /// How long to wait for the next request.
    pub read_timeout: Duration,
    /// Largest accepted request frame.
    pub max_frame_bytes: usize,
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            read_timeout: Duration::from_secs(config.read_timeout_secs),
            max_frame_bytes: config.max_frame_bytes,
        }
    }
}

/// Serve a TCP connection until the peer leaves, times out or misbehaves.
pub async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    router: Router,
    limits: ConnectionLimits,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut conn = Connection::new();

    info!("Connection {} opened from {}", conn.id(), peer_addr);

    match serve(&mut reader, &mut write_half, &router, &mut conn, limits).await {
        Ok(()) => info!("Connection {} from {} closed", conn.id(), peer_addr),
        Err(e) => warn!("Connection {} from {} ended: {}", conn.id(), peer_addr, e),
    }
}

/// Request loop over any framed byte stream.
///
/// Returns `Ok(())` when the peer closes the stream between frames.
pub async fn serve<R, W>(
    reader: &mut R,
    writer: &mut W,
    router: &Router,
    conn: &mut Connection,
    limits: ConnectionLimits,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = timeout(
            limits.read_timeout,
            read_frame::<_, Request>(reader, limits.max_frame_bytes),
        )
        .await
        .map_err(|_| ChatError::Timeout(limits.read_timeout.as_secs()))?;

        let request = match frame {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(ChatError::Protocol(detail)) => {
                // A malformed but complete frame keeps the connection usable.
                debug!("Connection {} sent malformed request: {}", conn.id(), detail);
                write_frame(writer, &Response::error(format!("malformed request: {detail}")))
                    .await?;
                continue;
            }
            Err(e) => return Err(e),
        };

        let response = dispatch(router, conn, request).await;
        write_frame(writer, &response).await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::digest;
    use crate::store::Directory;
    use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt};

    fn limits() -> ConnectionLimits {
        ConnectionLimits {
            read_timeout: Duration::from_secs(5),
            max_frame_bytes: 512,
        }
    }

    fn router() -> Router {
        let mut dir = Directory::new();
        dir.add_user("Ger", "G", digest("123"));
        Router::new(dir)
    }

    #[tokio::test]
    async fn test_serve_answers_in_order_until_eof() {
        let router = router();
        let (client, server) = duplex(4096);
        let (server_read, mut server_write) = tokio::io::split(server);
        let mut server_read = BufReader::new(server_read);

        let task = tokio::spawn(async move {
            let mut conn = Connection::new();
            serve(&mut server_read, &mut server_write, &router, &mut conn, limits()).await
        });

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);
        client_write
            .write_all(b"{\"type\":\"count_users\"}\n{\"type\":\"is_login_registered\",\"login\":\"G\"}\n")
            .await
            .unwrap();

        let first: Option<Response> = read_frame(&mut client_read, 512).await.unwrap();
        let second: Option<Response> = read_frame(&mut client_read, 512).await.unwrap();
        assert_eq!(first, Some(Response::Count { value: 1 }));
        assert_eq!(second, Some(Response::Flag { value: true }));

        drop(client_write);
        drop(client_read);
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_malformed_request_gets_error_response() {
        let router = router();
        let (client, server) = duplex(4096);
        let (server_read, mut server_write) = tokio::io::split(server);
        let mut server_read = BufReader::new(server_read);

        tokio::spawn(async move {
            let mut conn = Connection::new();
            let _ = serve(&mut server_read, &mut server_write, &router, &mut conn, limits()).await;
        });

        let (client_read, mut client_write) = tokio::io::split(client);
        let mut client_read = BufReader::new(client_read);
        client_write.write_all(b"{\"type\":\"bogus\"}\n").await.unwrap();

        let mut line = String::new();
        client_read.read_line(&mut line).await.unwrap();
        assert!(line.contains("\"type\":\"error\""));
        assert!(line.contains("malformed request"));
    }

    #[tokio::test]
    async fn test_oversize_frame_ends_connection() {
        let router = router();
        let (client, server) = duplex(4096);
        let (server_read, mut server_write) = tokio::io::split(server);
        let mut server_read = BufReader::new(server_read);

        let task = tokio::spawn(async move {
            let mut conn = Connection::new();
            serve(&mut server_read, &mut server_write, &router, &mut conn, limits()).await
        });

        let (_client_read, mut client_write) = tokio::io::split(client);
        let big = format!("{}\n", "x".repeat(2048));
        client_write.write_all(big.as_bytes()).await.unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ChatError::FrameTooLarge { limit: 512 })));
    }

    #[tokio::test]
    async fn test_idle_connection_times_out() {
        let router = router();
        let (_client, server) = duplex(4096);
        let (server_read, mut server_write) = tokio::io::split(server);
        let mut server_read = BufReader::new(server_read);
        let mut conn = Connection::new();
        let limits = ConnectionLimits {
            read_timeout: Duration::from_millis(50),
            max_frame_bytes: 512,
        };

        let result = serve(&mut server_read, &mut server_write, &router, &mut conn, limits).await;

        assert!(matches!(result, Err(ChatError::Timeout(_))));
    }
}
