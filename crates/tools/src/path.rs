//! Path containment: keep model-chosen paths inside the working root.
//!
//! Rejects absolute paths and any `..` component outright, then resolves
//! the deepest existing ancestor so a symlink cannot lead outside the root.

use std::path::{Component, Path, PathBuf};

use oli_core::error::ToolError;

const TOOL: &str = "path";

/// Resolve `relative` against `root`, refusing anything that would escape it.
pub fn resolve_within(root: &Path, relative: &str) -> Result<PathBuf, ToolError> {
    let deny = |reason: String| ToolError::PermissionDenied {
        tool_name: TOOL.into(),
        reason,
    };

    let normalized = relative.replace('\\', "/");
    if normalized.trim().is_empty() {
        return Err(ToolError::InvalidArguments("empty path".into()));
    }

    let candidate = Path::new(&normalized);
    if candidate.is_absolute() || normalized.starts_with('/') {
        return Err(deny(format!("'{relative}' is an absolute path")));
    }

    let mut clean = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(deny(format!("path traversal detected in '{relative}'")));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(deny(format!("'{relative}' is an absolute path")));
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(ToolError::InvalidArguments(format!("'{relative}' names no file")));
    }

    let target = root.join(&clean);

    // Symlinks inside the root may still point elsewhere.
    if let Ok(canonical_root) = root.canonicalize()
        && let Some(existing) = target.ancestors().find(|p| p.exists())
        && let Ok(resolved) = existing.canonicalize()
        && !resolved.starts_with(&canonical_root)
    {
        return Err(deny(format!("'{relative}' resolves outside the working directory")));
    }

    Ok(target)
}
