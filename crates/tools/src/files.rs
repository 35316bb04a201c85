//! File helpers used by the CLI and the artifact persister.

use std::path::Path;

use oli_core::error::ToolError;
use tracing::debug;

fn io_error(tool_name: &str, path: &Path, e: std::io::Error) -> ToolError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ToolError::NotFound(path.display().to_string())
    } else {
        ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: format!("{}: {e}", path.display()),
        }
    }
}

/// Read a file as text. Invalid UTF-8 is replaced rather than rejected.
pub async fn read_file(path: &Path) -> Result<String, ToolError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| io_error("file_read", path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Names in a directory, sorted, with a trailing `/` on subdirectories.
pub async fn list_dir(path: &Path) -> Result<Vec<String>, ToolError> {
    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| io_error("list_dir", path, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| io_error("list_dir", path, e))?
    {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
            name.push('/');
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Write `content` to `path`, creating parent directories. Returns the
/// number of bytes written.
pub async fn write_file(path: &Path, content: &str) -> Result<usize, ToolError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "file_write".into(),
                reason: format!("Failed to create directory {}: {e}", parent.display()),
            })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|e| io_error("file_write", path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(content.len())
}
