use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::log::LogSink;

/// Directory <-> compressed archive, delegated to an external archiving
/// capability. Callers must verify that `create_archive` actually produced
/// the destination file: the underlying tool can report success without
/// writing output.
#[async_trait]
pub trait Archiver: Send + Sync {
    async fn create_archive(&self, source_dir: &Path, dest: &Path) -> Result<()>;
    async fn extract_archive(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

/// Archiver backed by the system `tar` binary.
#[derive(Debug, Default)]
pub struct TarArchiver;

#[async_trait]
impl Archiver for TarArchiver {
    async fn create_archive(&self, source_dir: &Path, dest: &Path) -> Result<()> {
        let out = Command::new("tar")
            .arg("-czf")
            .arg(dest)
            .arg("-C")
            .arg(source_dir)
            .arg(".")
            .output()
            .await
            .map_err(|e| Error::msg(format!("failed to spawn tar: {e}")))?;
        if !out.status.success() {
            return Err(Error::msg(format!(
                "tar -czf {} failed: {}",
                dest.display(),
                command_summary(&out)
            )));
        }
        Ok(())
    }

    async fn extract_archive(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dest_dir).await.map_err(|e| {
            Error::msg(format!("failed to create {}: {e}", dest_dir.display()))
        })?;
        let out = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(dest_dir)
            .output()
            .await
            .map_err(|e| Error::msg(format!("failed to spawn tar: {e}")))?;
        if !out.status.success() {
            return Err(Error::msg(format!(
                "tar -xzf {} failed: {}",
                archive.display(),
                command_summary(&out)
            )));
        }
        Ok(())
    }
}

fn command_summary(out: &Output) -> String {
    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    if !stdout.is_empty() {
        return stdout;
    }
    format!("status {}", out.status)
}

/// A uniquely-named scratch archive path, removed when dropped. Save and
/// load route every local archive through one of these so no temp file
/// outlives the operation, on success or failure.
pub struct TempArchive {
    path: PathBuf,
    sink: Arc<dyn LogSink>,
}

impl TempArchive {
    pub fn for_task(task_id: &str, sink: Arc<dyn LogSink>) -> Self {
        let name = format!(
            "task-{}-{}-{}.tar.gz",
            task_id,
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );
        Self {
            path: std::env::temp_dir().join(name),
            sink,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArchive {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                self.sink.warn(&format!(
                    "failed to remove temp archive {}: {e}",
                    self.path.display()
                ));
            }
        }
    }
}
