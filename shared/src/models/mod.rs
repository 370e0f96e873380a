//! Data models
//!
//! Shared between the manifest client and the backend API.
//! All IDs are `i64`.

pub mod cargo_record;
pub mod manifest;
pub mod reference;

/// Identifier of a cargo record in the remote pool
pub type RecordId = i64;

// Re-exports
pub use cargo_record::*;
pub use manifest::*;
pub use reference::*;
