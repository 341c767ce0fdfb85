// src/exec/command.rs

//! External command plumbing shared by the command task function and the
//! command decomposer.
//!
//! A command receives its input on stdin and is expected to print a reply
//! containing a JSON object somewhere in its stdout (model backends tend to
//! wrap JSON in prose or code fences, so only the outermost `{...}` block is
//! parsed).

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Build a shell command appropriate for the platform.
fn shell(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

/// Run `cmd`, write `input` to its stdin and return its stdout.
///
/// A non-zero exit status, a spawn failure or an elapsed `timeout` is an
/// error. The child is killed if this future is dropped.
pub async fn run_command(cmd: &str, input: &str, timeout: Option<Duration>) -> Result<String> {
    info!(cmd = %cmd, input_bytes = input.len(), "starting command");

    let mut child = shell(cmd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("spawning command '{cmd}'"))?;

    let mut stdin = child.stdin.take().context("child stdin not captured")?;
    let stdout = child.stdout.take().context("child stdout not captured")?;
    let stderr = child.stderr.take();

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = stderr {
        let cmd_name = cmd.to_string();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(cmd = %cmd_name, "stderr: {}", line);
            }
        });
    }

    let payload = input.to_string();
    let writer = async move {
        if let Err(e) = stdin.write_all(payload.as_bytes()).await {
            // The command may legitimately exit without reading stdin.
            debug!(error = %e, "command did not consume all of stdin");
        }
        drop(stdin);
    };

    let reader = async move {
        let mut out = String::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            out.push_str(&line);
            out.push('\n');
        }
        Ok::<_, std::io::Error>(out)
    };

    let run = async {
        let ((), out) = tokio::join!(writer, reader);
        let out = out.with_context(|| format!("reading stdout of '{cmd}'"))?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for command '{cmd}'"))?;
        Ok::<_, anyhow::Error>((status, out))
    };

    let (status, out) = match timeout {
        Some(limit) => tokio::time::timeout(limit, run)
            .await
            .with_context(|| format!("command '{cmd}' timed out after {limit:?}"))??,
        None => run.await?,
    };

    let code = status.code().unwrap_or(-1);
    info!(
        cmd = %cmd,
        exit_code = code,
        success = status.success(),
        output_bytes = out.len(),
        "command exited"
    );

    if !status.success() {
        bail!("command '{cmd}' exited with status {code}");
    }

    Ok(out)
}

/// Parse the outermost `{...}` block of `text`, if any.
pub fn extract_json_block(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    match serde_json::from_str(&text[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "reply contains a brace-delimited block that is not valid JSON");
            None
        }
    }
}
