/// Fire-and-forget log sink. Implementations must never fail; callers treat
/// every emit as best-effort.
pub trait LogSink: Send + Sync {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Production sink: forwards to the `tracing` macros.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}
