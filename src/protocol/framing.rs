//! Newline-delimited JSON framing.
//!
//! A frame is one JSON document followed by `\n`. Frames longer than the
//! limit are refused before they are buffered in full.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{ChatError, Result};

/// Default upper bound for a frame, terminator included.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// Default upper bound for a response frame read by the client.
///
/// A `messages` response carries a whole mailbox, so it must hold
/// `capacity` messages of up to one request frame each.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

/// Read one frame.
///
/// Returns `Ok(None)` on a clean end of stream between frames.
pub async fn read_frame<R, T>(reader: &mut R, max_bytes: usize) -> Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut buf = Vec::new();
    let limit = max_bytes as u64 + 1;
    let n = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;

    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') {
        if buf.len() > max_bytes {
            return Err(ChatError::FrameTooLarge { limit: max_bytes });
        }
        return Err(ChatError::ConnectionClosed);
    }
    buf.pop();
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    Ok(Some(serde_json::from_slice(&buf)?))
}

/// Write one frame and flush it.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut buf = serde_json::to_vec(value)?;
    buf.push(b'\n');
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}
