//! Session event loop.
//!
//! Long-lived counterpart of the hook command: reads one JSON event per line
//! and answers each with one JSON line. Transcripts accumulate in memory
//! across events and every session still open is flushed at end of input.

use anyhow::Result;
use chrono::Utc;
use cogmem_core::hooks::{HookOutput, HookRunner, PluginEvent};
use cogmem_core::session::SessionStore;
use cogmem_core::{Config, MemoryService};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

pub async fn execute(service: Arc<dyn MemoryService>, config: Arc<Config>) -> Result<()> {
    let runner = HookRunner::new(service, config);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    tokio::select! {
        result = run(&runner, stdin, &mut stdout) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted; pending sessions are not saved");
            Ok(())
        }
    }
}

/// Process events until EOF, then flush the remaining sessions.
async fn run<R, W>(runner: &HookRunner, reader: R, writer: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut store = SessionStore::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let output = match serde_json::from_str::<PluginEvent>(&line) {
            Ok(event) => {
                debug!("Event for session {}", event.session_id());
                runner.handle_event(&mut store, event, Utc::now()).await
            }
            Err(e) => {
                warn!("Ignoring malformed event: {}", e);
                HookOutput::default()
            }
        };
        write_line(writer, &output).await?;
    }

    if !store.is_empty() {
        info!("Flushing {} open session(s)", store.len());
    }
    for (_, output) in runner.flush_all(&mut store, Utc::now()).await {
        write_line(writer, &output).await?;
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, output: &HookOutput) -> Result<()> {
    let mut line = serde_json::to_string(output)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogmem_core::MemoryClient;

    fn offline_runner() -> HookRunner {
        let config = Config {
            service_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = MemoryClient::new(&config).unwrap();
        HookRunner::new(Arc::new(client), Arc::new(config))
    }

    async fn run_lines(input: &str) -> Vec<serde_json::Value> {
        let mut out: Vec<u8> = Vec::new();
        run(&offline_runner(), input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_one_line_per_event() {
        let input = concat!(
            r#"{"type": "message", "session_id": "s", "role": "assistant", "content": "hello"}"#,
            "\n",
            "garbage\n",
            "\n",
            r#"{"type": "session.deleted", "session_id": "other"}"#,
            "\n",
        );
        let lines = run_lines(input).await;

        // Two events plus one malformed line; the held session is flushed at EOF
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], serde_json::json!({}));
        assert_eq!(lines[1], serde_json::json!({}));
        assert_eq!(lines[2], serde_json::json!({}));
        assert!(lines[3]["systemMessage"].as_str().unwrap().contains("not saved"));
    }

    #[tokio::test]
    async fn test_empty_input() {
        assert!(run_lines("").await.is_empty());
    }
}
