use std::future::Future;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

/// Exit status and captured streams of one finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self { success: true, code: Some(0), stdout: stdout.into(), stderr: Vec::new() }
    }

    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self { success: false, code: Some(code), stdout: Vec::new(), stderr: stderr.into() }
    }

    /// stdout followed by stderr, lossy utf-8. Diagnostics only.
    pub fn combined(&self) -> String {
        let mut out = String::from_utf8_lossy(&self.stdout).into_owned();
        out.push_str(&String::from_utf8_lossy(&self.stderr));
        out
    }

    fn status(&self) -> String {
        self.code
            .map(|code| format!("exit status {}", code))
            .unwrap_or_else(|| "termination by signal".to_owned())
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {status}: {output}")]
    Exit {
        command: String,
        status: String,
        output: String,
    },
}

impl CommandError {
    pub fn exit(command: &str, output: &CommandOutput) -> Self {
        CommandError::Exit {
            command: command.to_owned(),
            status: output.status(),
            output: output.combined().trim().to_owned(),
        }
    }
}

/// Runs an external program to completion. No timeout, no retry.
pub trait CommandRunner: Send + Sync + 'static {
    fn run(
        &self,
        program: &str,
        args: &[String],
    ) -> impl Future<Output = std::io::Result<CommandOutput>> + Send;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;
        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
