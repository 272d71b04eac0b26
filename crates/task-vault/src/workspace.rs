use std::path::PathBuf;

use crate::error::{Error, Result};

/// Resolves the local working directory for a task id. The store consumes
/// this; it never decides workspace locations itself.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Working directory for a task: `{root}/{task_id}`.
    pub fn target_dir_for(&self, task_id: &str) -> Result<PathBuf> {
        let id = safe_task_id(task_id)?;
        Ok(self.root.join(id))
    }
}

/// Validate a task id before it is used in a filesystem path or a remote
/// object key.
pub(crate) fn safe_task_id(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Error::msg("task id is empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
    {
        return Err(Error::msg(format!(
            "task id '{}' contains invalid characters",
            id
        )));
    }
    // "." and ".." would escape the workspace root and the task namespace.
    if id.chars().all(|c| c == '.') {
        return Err(Error::msg(format!(
            "task id '{}' consists only of dots",
            id
        )));
    }
    Ok(id.to_string())
}
