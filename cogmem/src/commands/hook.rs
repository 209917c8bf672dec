//! Lifecycle hook command.
//!
//! Reads one JSON event from stdin and writes one JSON response to stdout.
//! Every path exits successfully; memory failures surface as status messages.

use anyhow::Result;
use cogmem_core::hooks::{HookInput, HookKind, HookOutput, HookRunner};
use cogmem_core::{Config, MemoryService};
use std::io::{Read, Write};
use std::sync::Arc;
use tracing::warn;

use crate::cli::{HookCommand, HookName};

pub async fn execute(
    cmd: HookCommand,
    service: Arc<dyn MemoryService>,
    config: Arc<Config>,
) -> Result<()> {
    let mut raw = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut raw) {
        warn!("Failed to read hook input: {}", e);
    }

    let runner = HookRunner::new(service, config);
    let output = run(&runner, cmd.kind, &raw).await;
    emit(&mut std::io::stdout().lock(), &output);
    Ok(())
}

/// Write the response line. A closed stdout is logged, never fatal.
fn emit<W: Write>(writer: &mut W, output: &HookOutput) {
    let written = serde_json::to_string(output)
        .map_err(std::io::Error::from)
        .and_then(|line| {
            writeln!(writer, "{}", line)?;
            writer.flush()
        });
    if let Err(e) = written {
        warn!("Failed to write hook output: {}", e);
    }
}

/// Decode the event and run the hook. Malformed input is treated as empty.
async fn run(runner: &HookRunner, name: HookName, raw: &str) -> HookOutput {
    let input = parse_input(raw);
    runner.handle_stateless(kind(name), &input).await
}

fn parse_input(raw: &str) -> HookInput {
    if raw.trim().is_empty() {
        return HookInput::default();
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        warn!("Ignoring malformed hook input: {}", e);
        HookInput::default()
    })
}

fn kind(name: HookName) -> HookKind {
    match name {
        HookName::SessionStart => HookKind::SessionStart,
        HookName::BeforeTurn => HookKind::BeforeTurn,
        HookName::SessionEnd => HookKind::SessionEnd,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogmem_core::MemoryClient;

    /// Writer whose reader has gone away
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    /// Runner pointed at a port nothing listens on
    fn offline_runner() -> HookRunner {
        let config = Config {
            service_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let client = MemoryClient::new(&config).unwrap();
        HookRunner::new(Arc::new(client), Arc::new(config))
    }

    #[test]
    fn test_parse_input() {
        let input = parse_input(r#"{"session_id": "abc", "prompt": "hi"}"#);
        assert_eq!(input.session_id(), "abc");
        assert_eq!(parse_input("not json").session_id(), "default");
        assert_eq!(parse_input("").session_id(), "default");
    }

    #[tokio::test]
    async fn test_session_start_offline_warns() {
        let out = run(&offline_runner(), HookName::SessionStart, r#"{"source": "startup"}"#).await;
        let json = serde_json::to_value(&out).unwrap();

        assert!(json["systemMessage"].as_str().unwrap().contains("unavailable"));
        assert!(json.get("hookSpecificOutput").is_none());
    }

    #[tokio::test]
    async fn test_before_turn_offline_still_triggers() {
        let out = run(
            &offline_runner(),
            HookName::BeforeTurn,
            r#"{"session_id": "s", "prompt": "remember that we deploy with nix"}"#,
        )
        .await;

        assert!(out.additional_context().unwrap().contains("<memory_trigger>"));
    }

    #[tokio::test]
    async fn test_session_end_without_transcript_is_empty() {
        let out = run(&offline_runner(), HookName::SessionEnd, "{}").await;
        assert_eq!(serde_json::to_string(&out).unwrap(), "{}");
    }

    #[test]
    fn test_emit_writes_one_line() {
        let mut buf = Vec::new();
        emit(&mut buf, &HookOutput::message("saved"));
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"systemMessage\":\"saved\"}\n");
    }

    #[test]
    fn test_emit_to_closed_stdout_does_not_panic() {
        emit(&mut ClosedPipe, &HookOutput::message("saved"));
    }
}
