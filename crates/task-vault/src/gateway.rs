use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::log::LogSink;
use crate::object_store::ObjectStore;

/// Bucket-scoped front to the object store. Owns the one-time bucket
/// lifecycle: the bucket is verified or created at most once per gateway
/// instance, and every later operation assumes it exists.
pub struct ObjectStoreGateway {
    client: Arc<dyn ObjectStore>,
    bucket: String,
    sink: Arc<dyn LogSink>,
    initialized: Mutex<bool>,
}

impl ObjectStoreGateway {
    pub fn new(client: Arc<dyn ObjectStore>, bucket: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            sink,
            initialized: Mutex::new(false),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Verify the bucket exists, creating it if not. Idempotent per
    /// instance; concurrent first callers serialize on the guard so at most
    /// one creation attempt runs. A creation failure is fatal to every
    /// subsequent operation on this gateway.
    pub async fn ensure_initialized(&self) -> Result<()> {
        let mut done = self.initialized.lock().await;
        if *done {
            return Ok(());
        }
        let buckets = self.client.list_buckets().await.map_err(|e| {
            Error::msg(format!("failed to list buckets for '{}': {e}", self.bucket))
        })?;
        if buckets.iter().any(|b| b == &self.bucket) {
            self.sink
                .info(&format!("bucket '{}' already exists", self.bucket));
        } else {
            self.client.create_bucket(&self.bucket).await.map_err(|e| {
                Error::msg(format!("failed to create bucket '{}': {e}", self.bucket))
            })?;
            self.sink.info(&format!("created bucket '{}'", self.bucket));
        }
        *done = true;
        Ok(())
    }

    pub async fn object_exists(&self, key: &str) -> Result<bool> {
        self.client.object_exists(&self.bucket, key).await
    }

    pub async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.client.put_object(&self.bucket, key, body).await
    }

    pub async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        self.client.get_object(&self.bucket, key).await
    }

    pub async fn upload_file(&self, key: &str, path: &Path) -> Result<()> {
        self.client.upload_file(&self.bucket, key, path).await
    }
}
