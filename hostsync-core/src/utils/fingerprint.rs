//! Payload fingerprints
//!
//! SHA-256 over the JSON of the normalized payload. Two payloads that differ
//! only in natural-key case share a fingerprint.

use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};
use crate::mappers::mapper_for;
use crate::types::ResourcePayload;

/// Hex-encoded fingerprint of `payload`.
pub fn payload_fingerprint(payload: &ResourcePayload) -> CoreResult<String> {
    let normalized = mapper_for(payload.kind()).normalize(payload)?;
    let bytes = serde_json::to_vec(&normalized)
        .map_err(|e| CoreError::SerializationError(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
