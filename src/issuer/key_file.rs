use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

const KEY_FILE_PREFIX: &str = "snio-key-";
const KEY_FILE_SUFFIX: &str = ".json";

/// Service-account key written to a private temporary file.
///
/// The file is created with mode 0600 and removed when the value is dropped.
#[derive(Debug)]
pub struct KeyFile {
    file: NamedTempFile,
}

impl KeyFile {
    pub async fn materialize(dir: &Path, content: &str) -> std::io::Result<Self> {
        let dir: PathBuf = dir.to_owned();
        let content = content.to_owned();
        tokio::task::spawn_blocking(move || -> std::io::Result<Self> {
            let mut file = tempfile::Builder::new()
                .prefix(KEY_FILE_PREFIX)
                .suffix(KEY_FILE_SUFFIX)
                .tempfile_in(&dir)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;
            Ok(Self { file })
        })
        .await
        .map_err(std::io::Error::other)?
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
