//! Newline-delimited JSON-RPC over stdin/stdout.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::dispatch::McpDispatcher;

/// Serve MCP on the process's stdin/stdout until stdin closes.
pub async fn serve_stdio(dispatcher: &McpDispatcher) -> std::io::Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    log::info!("MCP stdio front end ready");
    let handled = serve_lines(dispatcher, stdin, stdout).await?;
    log::info!("stdin closed after {} message(s)", handled);
    Ok(())
}

/// Read one JSON-RPC message per line from `reader` and write each reply as
/// one line to `writer`. Blank lines are ignored.
///
/// Returns the number of messages handled.
pub async fn serve_lines<R, W>(
    dispatcher: &McpDispatcher,
    reader: R,
    mut writer: W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        handled += 1;

        if let Some(reply) = dispatcher.handle_line(line).await {
            writer.write_all(reply.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }
    Ok(handled)
}
