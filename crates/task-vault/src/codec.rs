use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::task::TaskStatus;

/// The JSON-serializable state persisted per task. `agent_state` is owned by
/// the orchestration layer and passes through untouched.
///
/// Wire shape (decompressed):
/// `{"agentState": ..., "contextId": "...", "status": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTaskState {
    pub agent_state: Value,
    pub context_id: String,
    pub status: TaskStatus,
}

/// Encode persisted state to gzip-compressed JSON bytes.
pub fn encode_state(state: &PersistedTaskState) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(state)
        .map_err(|e| Error::msg(format!("failed to encode task metadata: {e}")))?;
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&json)
        .map_err(|e| Error::msg(format!("failed to compress task metadata: {e}")))?;
    enc.finish()
        .map_err(|e| Error::msg(format!("failed to compress task metadata: {e}")))
}

/// Decode persisted state from gzip-compressed JSON bytes.
pub fn decode_state(bytes: &[u8]) -> Result<PersistedTaskState> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(|e| Error::msg(format!("failed to decompress task metadata: {e}")))?;
    serde_json::from_slice(&json)
        .map_err(|e| Error::msg(format!("failed to parse task metadata: {e}")))
}
