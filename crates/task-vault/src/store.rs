use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::archive::{Archiver, TempArchive};
use crate::codec::{self, PersistedTaskState};
use crate::error::{Error, Result};
use crate::gateway::ObjectStoreGateway;
use crate::log::LogSink;
use crate::task::Task;
use crate::workspace::{WorkspaceLayout, safe_task_id};

fn metadata_key(task_id: &str) -> String {
    format!("tasks/{task_id}/metadata.tar.gz")
}

fn workspace_key(task_id: &str) -> String {
    format!("tasks/{task_id}/workspace.tar.gz")
}

/// The durable-persistence contract. `load` returning `Ok(None)` means no
/// record exists for the id; it is never an error.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn save(&self, task: &Task) -> Result<()>;
    async fn load(&self, task_id: &str) -> Result<Option<Task>>;
}

/// Persists tasks to a remote bucket as two artifacts per id: a metadata
/// archive (always written) and a workspace archive (written only when the
/// task has a local working directory).
pub struct RemoteTaskStore {
    gateway: ObjectStoreGateway,
    archiver: Arc<dyn Archiver>,
    layout: WorkspaceLayout,
    sink: Arc<dyn LogSink>,
}

impl RemoteTaskStore {
    pub fn new(
        gateway: ObjectStoreGateway,
        archiver: Arc<dyn Archiver>,
        layout: WorkspaceLayout,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            gateway,
            archiver,
            layout,
            sink,
        }
    }

    async fn save_workspace(&self, task_id: &str) -> Result<()> {
        let workdir = self.layout.target_dir_for(task_id)?;
        if !workdir.is_dir() {
            return Ok(());
        }

        let tmp = TempArchive::for_task(task_id, self.sink.clone());
        self.archiver.create_archive(&workdir, tmp.path()).await?;
        if !tmp.path().is_file() {
            return Err(Error::msg(format!(
                "tar reported success but did not create expected archive {}",
                tmp.path().display()
            )));
        }
        self.gateway
            .upload_file(&workspace_key(task_id), tmp.path())
            .await?;
        self.sink
            .info(&format!("saved workspace archive for task {task_id}"));
        Ok(())
    }

    async fn restore_workspace(&self, task_id: &str) -> Result<()> {
        let target = self.layout.target_dir_for(task_id)?;
        let tmp = TempArchive::for_task(task_id, self.sink.clone());
        let body = self.gateway.get_object(&workspace_key(task_id)).await?;
        tokio::fs::write(tmp.path(), &body).await.map_err(|e| {
            Error::msg(format!(
                "failed to write temp archive {}: {e}",
                tmp.path().display()
            ))
        })?;
        self.archiver.extract_archive(tmp.path(), &target).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for RemoteTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        let task_id = safe_task_id(&task.id)?;
        self.gateway.ensure_initialized().await?;

        let state = PersistedTaskState {
            agent_state: task.persisted_state().cloned().unwrap_or(Value::Null),
            context_id: task.context_id.clone(),
            status: task.status,
        };
        let body = codec::encode_state(&state)?;
        self.gateway.put_object(&metadata_key(&task_id), body).await?;
        self.sink
            .info(&format!("saved metadata archive for task {task_id}"));

        self.save_workspace(&task_id).await
    }

    async fn load(&self, task_id: &str) -> Result<Option<Task>> {
        let task_id = safe_task_id(task_id)?;
        self.gateway.ensure_initialized().await?;

        let meta_key = metadata_key(&task_id);
        if !self.gateway.object_exists(&meta_key).await? {
            return Ok(None);
        }
        let body = self.gateway.get_object(&meta_key).await?;
        let state = codec::decode_state(&body)?;
        let task = Task::new(task_id.clone(), state.context_id, state.status)
            .with_persisted_state(state.agent_state);

        if !self.gateway.object_exists(&workspace_key(&task_id)).await? {
            self.sink
                .info(&format!("workspace archive not found for task {task_id}"));
            return Ok(Some(task));
        }
        self.restore_workspace(&task_id).await?;
        Ok(Some(task))
    }
}

/// Decorator that disables persistence while keeping reads live: `save`
/// never reaches the delegate, `load` always does.
pub struct NoOpTaskStore {
    delegate: Arc<dyn TaskStore>,
    sink: Arc<dyn LogSink>,
}

impl NoOpTaskStore {
    pub fn new(delegate: Arc<dyn TaskStore>, sink: Arc<dyn LogSink>) -> Self {
        Self { delegate, sink }
    }
}

#[async_trait]
impl TaskStore for NoOpTaskStore {
    async fn save(&self, task: &Task) -> Result<()> {
        self.sink
            .info(&format!("persistence disabled; not saving task {}", task.id));
        Ok(())
    }

    async fn load(&self, task_id: &str) -> Result<Option<Task>> {
        self.delegate.load(task_id).await
    }
}
