use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::error::{Error, Result};

/// The remote object-store client boundary. Bucket/object CRUD lives behind
/// this trait; the gateway and store never talk to a concrete backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>>;

    /// Create a bucket. Creating a bucket that already exists is not an
    /// error.
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Upload a local file, streaming its contents rather than requiring the
    /// caller to buffer them.
    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()>;
}

/// In-memory backend for development and testing. Counts bucket-creation and
/// object-download calls so initialization and short-circuit behavior can be
/// observed from tests.
#[derive(Default)]
pub struct MemoryObjectStore {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
    create_bucket_calls: AtomicUsize,
    get_object_calls: AtomicUsize,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bucket_calls(&self) -> usize {
        self.create_bucket_calls.load(Ordering::SeqCst)
    }

    pub fn get_object_calls(&self) -> usize {
        self.get_object_calls.load(Ordering::SeqCst)
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> Error {
    Error::msg(format!("object store lock poisoned: {e}"))
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let buckets = self.buckets.read().map_err(lock_err)?;
        Ok(buckets.keys().cloned().collect())
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.create_bucket_calls.fetch_add(1, Ordering::SeqCst);
        let mut buckets = self.buckets.write().map_err(lock_err)?;
        buckets.entry(bucket.to_string()).or_default();
        Ok(())
    }

    async fn object_exists(&self, bucket: &str, key: &str) -> Result<bool> {
        let buckets = self.buckets.read().map_err(lock_err)?;
        Ok(buckets
            .get(bucket)
            .is_some_and(|objects| objects.contains_key(key)))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let mut buckets = self.buckets.write().map_err(lock_err)?;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| Error::msg(format!("bucket '{bucket}' not found")))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        self.get_object_calls.fetch_add(1, Ordering::SeqCst);
        let buckets = self.buckets.read().map_err(lock_err)?;
        buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| Error::msg(format!("object '{key}' not found in bucket '{bucket}'")))
    }

    async fn upload_file(&self, bucket: &str, key: &str, path: &Path) -> Result<()> {
        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::msg(format!("failed to open {}: {e}", path.display())))?;
        let mut body = Vec::new();
        file.read_to_end(&mut body)
            .await
            .map_err(|e| Error::msg(format!("failed to read {}: {e}", path.display())))?;
        self.put_object(bucket, key, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bucket_and_object_lifecycle() {
        let store = MemoryObjectStore::new();
        assert!(store.list_buckets().await.expect("list").is_empty());

        store.create_bucket("b1").await.expect("create bucket");
        assert_eq!(store.list_buckets().await.expect("list"), vec!["b1"]);

        assert!(!store.object_exists("b1", "k").await.expect("exists"));
        store
            .put_object("b1", "k", b"body".to_vec())
            .await
            .expect("put");
        assert!(store.object_exists("b1", "k").await.expect("exists"));
        assert_eq!(store.get_object("b1", "k").await.expect("get"), b"body");
    }

    #[tokio::test]
    async fn create_bucket_is_idempotent_but_counted() {
        let store = MemoryObjectStore::new();
        store.create_bucket("b1").await.expect("first create");
        store
            .put_object("b1", "k", b"body".to_vec())
            .await
            .expect("put");
        store.create_bucket("b1").await.expect("second create");
        // The object survives re-creation; both calls are observable.
        assert!(store.object_exists("b1", "k").await.expect("exists"));
        assert_eq!(store.create_bucket_calls(), 2);
    }

    #[tokio::test]
    async fn put_into_missing_bucket_fails() {
        let store = MemoryObjectStore::new();
        let err = store
            .put_object("nope", "k", Vec::new())
            .await
            .expect_err("missing bucket");
        assert!(err.to_string().contains("nope"));
    }
}
