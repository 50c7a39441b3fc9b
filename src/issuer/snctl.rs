use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::issuer::IssuerConfig;
use crate::errors::EnvironmentError;
use crate::issuer::command::{CommandError, CommandOutput, CommandRunner};
use crate::observability::metrics::get_metrics;

static ERROR_MSG: &'static str = "error";
static EXIT_MSG: &'static str = "exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerOperation {
    ConfigInit,
    ActivateServiceAccount,
    GetToken,
}

impl IssuerOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuerOperation::ConfigInit => "config init",
            IssuerOperation::ActivateServiceAccount => "auth activate-service-account",
            IssuerOperation::GetToken => "auth get-token",
        }
    }
}

/// `snctl` driven through a [`CommandRunner`].
#[derive(Debug)]
pub struct SnctlIssuer<R> {
    runner: R,
    program: String,
    config_dir: Option<PathBuf>,
    // set once `config init` is known to have happened in this process
    environment_ready: Mutex<bool>,
}

impl<R: CommandRunner> SnctlIssuer<R> {
    pub fn new(runner: R, config: &IssuerConfig) -> Self {
        Self {
            runner,
            program: config.resolve_program(),
            config_dir: config.resolve_config_dir(),
            environment_ready: Mutex::new(false),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run `snctl config init` unless the config directory already exists.
    ///
    /// Serialized within this process. Separate processes sharing one HOME
    /// may still initialize concurrently.
    pub async fn ensure_environment(&self) -> Result<(), EnvironmentError> {
        let mut ready = self.environment_ready.lock().await;
        if *ready {
            return Ok(());
        }
        let config_dir = self
            .config_dir
            .as_deref()
            .ok_or(EnvironmentError::NoHomeDirectory)?;

        if !dir_exists(config_dir).await {
            info!("Initializing snctl config at {}", config_dir.display());
            self.run(IssuerOperation::ConfigInit, vec!["config".into(), "init".into()])
                .await?;
        }
        *ready = true;
        Ok(())
    }

    /// `snctl auth activate-service-account --key-file <key>`
    pub async fn activate_service_account(&self, key_file: &Path) -> Result<(), CommandError> {
        let args = vec![
            "auth".into(),
            "activate-service-account".into(),
            "--key-file".into(),
            key_file.display().to_string(),
        ];
        self.run(IssuerOperation::ActivateServiceAccount, args).await.map(|_| ())
    }

    /// `snctl -n <organization> auth get-token <cluster> -f <key>`
    ///
    /// The token is stdout without trailing whitespace.
    pub async fn get_token(
        &self,
        organization: &str,
        cluster: &str,
        key_file: &Path,
    ) -> Result<String, CommandError> {
        let args = vec![
            "-n".into(),
            organization.to_owned(),
            "auth".into(),
            "get-token".into(),
            cluster.to_owned(),
            "-f".into(),
            key_file.display().to_string(),
        ];
        let output = self.run(IssuerOperation::GetToken, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_owned())
    }

    async fn run(&self, operation: IssuerOperation, args: Vec<String>) -> Result<CommandOutput, CommandError> {
        let metrics = get_metrics().await;
        let op = operation.as_str();
        let command = format!("{} {}", self.program, op);
        let start = Instant::now();
        debug!("running `{}`", command);

        metrics.issuer_commands.with_label_values(&[op]).inc();
        let result = self.runner.run(&self.program, &args).await;
        metrics
            .issuer_command_duration
            .with_label_values(&[op])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(output) if output.success => Ok(output),
            Ok(output) => {
                let err = CommandError::exit(&command, &output);
                error!("Failed to run `{}`: {}", command, err);
                metrics.issuer_command_failures.with_label_values(&[op, EXIT_MSG]).inc();
                Err(err)
            }
            Err(source) => {
                error!("Failed to run `{}`: {}", command, source);
                metrics.issuer_command_failures.with_label_values(&[op, ERROR_MSG]).inc();
                Err(CommandError::Spawn { command, source })
            }
        }
    }
}

async fn dir_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}
