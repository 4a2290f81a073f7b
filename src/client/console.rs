//! Line-oriented console driver.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info};

use super::session::Session;
use super::transport::Transport;
use crate::Result;

/// Drive a session from `input` until the user exits or input ends.
///
/// Leading whitespace and the line terminator are stripped from each line.
/// A transport failure is logged and ends the session.
pub async fn run<T, R, W>(session: &mut Session<T>, input: &mut R, output: &mut W) -> Result<()>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();

    while !session.is_finished() {
        output.write_all(session.prompt().as_bytes()).await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            info!("Input closed");
            output.write_all(b"\n").await?;
            break;
        }
        let trimmed = line.trim_start().trim_end_matches(&['\r', '\n'][..]);

        let lines = match session.handle_line(trimmed).await {
            Ok(lines) => lines,
            Err(e) => {
                error!("Session ended: {}", e);
                output
                    .write_all(format!("Connection to server lost: {e}\n").as_bytes())
                    .await?;
                return Err(e);
            }
        };
        for text in lines {
            output.write_all(text.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
    }

    output.flush().await?;
    Ok(())
}
