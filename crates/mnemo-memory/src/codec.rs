// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed wrapper over the store's opaque payload.
//!
//! The vector store only sees bytes; this module owns the mapping between a
//! [`MemoryPoint`] and a [`VectorEntry`] and the `memory_<nanos>` key scheme.

use chrono::{DateTime, Utc};
use mnemo_core::{MemoryPoint, MnemoError, VectorEntry};

/// Prefix shared by every memory key.
pub const KEY_PREFIX: &str = "memory_";

/// A decoded point together with the storage key it lives under.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPoint {
    pub key: String,
    pub point: MemoryPoint,
}

/// Serialize a point's payload. The vector is stored by the backend, not here.
pub fn encode_point(point: &MemoryPoint) -> Result<Vec<u8>, MnemoError> {
    serde_json::to_vec(point).map_err(|e| MnemoError::Internal(format!("encode memory point: {e}")))
}

/// Decode an entry's payload, restoring the vector from the entry itself.
pub fn decode_entry(entry: &VectorEntry) -> Result<MemoryPoint, MnemoError> {
    let mut point: MemoryPoint = serde_json::from_slice(&entry.metadata).map_err(|e| {
        MnemoError::InvalidInput(format!("payload of `{}` is not a memory point: {e}", entry.key))
    })?;
    point.vector = entry.vector.clone();
    Ok(point)
}

/// Nanosecond timestamp used in keys. Falls back to microsecond precision
/// outside the range representable in an `i64` of nanoseconds.
pub fn key_nanos(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt()
        .unwrap_or_else(|| at.timestamp_micros().saturating_mul(1000))
}

/// Key for the point created at `nanos`.
pub fn memory_key(nanos: i64) -> String {
    format!("{KEY_PREFIX}{nanos}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn key_uses_creation_nanos() {
        let at = Utc.timestamp_opt(1_700_000_000, 123).single().unwrap();
        assert_eq!(memory_key(key_nanos(at)), "memory_1700000000000000123");
    }

    #[test]
    fn decode_restores_vector_from_entry() {
        let mut point = MemoryPoint::new(["go"], "user is a Go developer", "likes Go");
        point.id = 7;
        point.total_weight = 1.25;
        let entry = VectorEntry::new("memory_1", vec![0.5, 0.5], encode_point(&point).unwrap());

        let decoded = decode_entry(&entry).unwrap();
        assert_eq!(decoded.vector, vec![0.5, 0.5]);
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.content, point.content);
        assert_eq!(decoded.total_weight, 1.25);
    }

    #[test]
    fn garbage_payload_is_invalid_input() {
        let entry = VectorEntry::new("memory_1", vec![], b"not json".to_vec());
        assert!(matches!(
            decode_entry(&entry),
            Err(MnemoError::InvalidInput(_))
        ));
    }
}
