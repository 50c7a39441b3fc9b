// src/tests/common/mod.rs
pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reqwest::Client;
use serde_json::{Map, Value};
use tempfile::TempDir;

use crate::config::issuer::IssuerConfig;
use crate::handler::SecretBackend;
use crate::issuer::command::{CommandOutput, CommandRunner};
use crate::issuer::orchestrator::Orchestrator;
use crate::storage::memory::MemoryStorage;
use crate::storage::{SecretStorage, StorageError};

pub const MOCK_PROGRAM: &str = "snctl-mock";
pub const MOUNT: &str = "streamnative/";

/// One recorded `snctl` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    /// Key file path, its content and mode as seen while the command ran.
    pub key_file: Option<PathBuf>,
    pub key_file_content: Option<String>,
    pub key_file_mode: Option<u32>,
}

impl RecordedCall {
    pub fn subcommand(&self) -> &'static str {
        if self.args.iter().any(|a| a == "get-token") {
            "get-token"
        } else if self.args.iter().any(|a| a == "activate-service-account") {
            "activate-service-account"
        } else if self.args.first().map(String::as_str) == Some("config") {
            "config"
        } else {
            "unknown"
        }
    }
}

enum Scripted {
    Output(CommandOutput),
    SpawnError,
}

/// Scripted stand-in for `snctl`. `get-token` answers `token-<n>\n`.
#[derive(Clone, Default)]
pub struct MockRunner {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    issued: Arc<AtomicUsize>,
    failures: Arc<Mutex<Vec<(&'static str, Scripted)>>>,
    tokens: Arc<Mutex<VecDeque<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `subcommand` exit non-zero with `stderr`.
    pub fn fail_with(&self, subcommand: &'static str, code: i32, stderr: &str) {
        self.failures
            .lock()
            .unwrap()
            .push((subcommand, Scripted::Output(CommandOutput::failed(code, stderr))));
    }

    /// Make every call of `subcommand` fail to spawn.
    pub fn fail_spawn(&self, subcommand: &'static str) {
        self.failures.lock().unwrap().push((subcommand, Scripted::SpawnError));
    }

    /// Queue exact stdout for the next `get-token` calls.
    pub fn queue_token(&self, stdout: &str) {
        self.tokens.lock().unwrap().push_back(stdout.to_owned());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, subcommand: &str) -> usize {
        self.calls().iter().filter(|c| c.subcommand() == subcommand).count()
    }

    pub fn issued(&self) -> usize {
        self.count("get-token")
    }
}

impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[String]) -> std::io::Result<CommandOutput> {
        let key_file = args
            .windows(2)
            .find(|w| w[0] == "--key-file" || w[0] == "-f")
            .map(|w| PathBuf::from(&w[1]));
        let key_file_content = key_file.as_ref().and_then(|p| std::fs::read_to_string(p).ok());
        let key_file_mode = key_file.as_ref().and_then(|p| {
            use std::os::unix::fs::PermissionsExt;
            std::fs::metadata(p).ok().map(|m| m.permissions().mode() & 0o777)
        });
        let call = RecordedCall {
            program: program.to_owned(),
            args: args.to_vec(),
            key_file,
            key_file_content,
            key_file_mode,
        };
        let subcommand = call.subcommand();
        self.calls.lock().unwrap().push(call);

        if let Some((_, scripted)) = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(sub, _)| *sub == subcommand)
        {
            return match scripted {
                Scripted::Output(output) => Ok(output.clone()),
                Scripted::SpawnError => Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "No such file or directory",
                )),
            };
        }

        if subcommand == "get-token" {
            let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            let stdout = self
                .tokens
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| format!("token-{}\n", n));
            return Ok(CommandOutput::ok(stdout));
        }
        Ok(CommandOutput::ok(""))
    }
}

/// Storage whose writes can be switched off.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    pub inner: MemoryStorage,
    pub fail_puts: Arc<AtomicBool>,
}

impl SecretStorage for FlakyStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("put disabled".to_owned()));
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }
}

/// Issuer config rooted in a fresh temp dir. The config dir exists, so no
/// `config init` runs unless a test removes it.
pub fn issuer_config(root: &TempDir) -> IssuerConfig {
    let config_dir = root.path().join(".snctl");
    let keys_dir = root.path().join("keys");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::create_dir_all(&keys_dir).expect("keys dir");
    IssuerConfig {
        path: Some(MOCK_PROGRAM.to_owned()),
        config_dir: Some(config_dir.display().to_string()),
        temp_dir: Some(keys_dir.display().to_string()),
    }
}

pub fn backend_with<S: SecretStorage>(
    storage: S,
    runner: MockRunner,
) -> (SecretBackend<S, MockRunner>, TempDir) {
    let root = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(runner, &issuer_config(&root));
    (SecretBackend::new(storage, orchestrator, MOUNT), root)
}

pub fn memory_backend(runner: MockRunner) -> (SecretBackend<MemoryStorage, MockRunner>, TempDir) {
    backend_with(MemoryStorage::new(), runner)
}

pub fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload must be an object, got {}", other),
    }
}

/// Files left in the key directory of a backend's temp root.
pub fn leftover_key_files(root: &TempDir) -> Vec<PathBuf> {
    std::fs::read_dir(root.path().join("keys"))
        .expect("keys dir")
        .filter_map(|e| e.ok().map(|e| e.path()))
        .collect()
}

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}
