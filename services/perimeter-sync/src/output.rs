//! Output file writing.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> WriteError + '_ {
    move |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `contents` to `path` through a sibling `.tmp` file and a rename,
/// creating the parent directory if needed. Returns the bytes written.
#[instrument(skip(contents), fields(path = %path.display()))]
pub async fn write_document(path: &Path, contents: &str) -> Result<u64, WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error(parent))?;
    }

    let tmp_path = temp_path(path);
    fs::write(&tmp_path, contents.as_bytes())
        .await
        .map_err(io_error(&tmp_path))?;
    fs::rename(&tmp_path, path).await.map_err(io_error(path))?;

    let bytes = contents.len() as u64;
    debug!(bytes, "Document written");
    Ok(bytes)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
