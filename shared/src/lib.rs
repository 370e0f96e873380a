//! Shared types for the manifest back office
//!
//! Common types used by the manifest client and the backend API:
//! cargo records, manifest commit DTOs, reference data, the unified
//! error system and response envelopes.

pub mod error;
pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{AssignmentFlag, CargoRecord, RecordId};
pub use response::{ApiResponse, Pagination};
