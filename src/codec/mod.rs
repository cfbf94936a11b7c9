//! Lossless serialization of a buffer's geometry and raw region bytes.
//!
//! [`encode`](crate::encode) snapshots a live buffer into a [`record::SerializedBuffer`];
//! [`decode`](crate::decode) allocates a fresh buffer and fills it from a record. The record
//! is plain serde data, so any serde format works; JSON helpers are provided.

/// Record to buffer.
pub mod decode;
/// Buffer to record.
pub mod encode;
/// Serialized record types.
pub mod record;
