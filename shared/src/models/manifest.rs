//! Manifest Model (配载单)

use serde::{Deserialize, Serialize};

use super::{CargoRecord, RecordId};

/// Manifest form payload edited alongside the draft item list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestForm {
    /// Origin port reference (required)
    pub origin_port_id: Option<i64>,
    /// Destination port reference (required)
    pub destination_port_id: Option<i64>,
    /// Shipping method reference
    pub shipping_method_id: Option<i64>,
    /// Departure date, YYYY-MM-DD (required)
    pub departure_date: Option<String>,
    /// Estimated arrival date, YYYY-MM-DD
    pub arrival_date: Option<String>,
    /// Manifest status reference (required)
    pub status_id: Option<i64>,
    pub carrier: Option<String>,
    /// Vehicle plate / container number
    pub vehicle_number: Option<String>,
    pub note: Option<String>,
}

/// Operator identity supplied by the session collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub user_id: i64,
    pub branch_id: i64,
}

/// Commit request body for `POST /api/manifests`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestPayload {
    /// Client-generated idempotency key
    pub request_id: String,
    /// Ordered record ids, in draft order
    pub record_ids: Vec<RecordId>,
    pub origin_port_id: i64,
    pub destination_port_id: i64,
    pub shipping_method_id: Option<i64>,
    pub departure_date: String,
    pub arrival_date: Option<String>,
    pub status_id: i64,
    pub carrier: Option<String>,
    pub vehicle_number: Option<String>,
    pub note: Option<String>,
    pub created_by: i64,
    pub branch_id: i64,
}

/// Successful commit data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCreated {
    pub manifest_id: i64,
}

/// Conflict body carried by a 409 commit response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Submitted ids another session claimed first
    pub conflict_ids: Vec<RecordId>,
}

/// Outcome of `commitManifest` when the call itself succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResponse {
    Committed { manifest_id: i64 },
    Conflict(ConflictReport),
}

/// Context parameters forwarded to the import endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportContext {
    pub branch_id: i64,
    /// Lifecycle status the imported records are created with
    pub target_status: String,
}

/// Uploaded spreadsheet bytes
#[derive(Debug, Clone)]
pub struct ImportUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImportUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Response shape of the import endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum ImportResponse {
    /// Endpoint reported the created/matched records
    Returned(Vec<CargoRecord>),
    /// Legacy endpoint: import ran but no records were reported
    Unconfirmed,
}
