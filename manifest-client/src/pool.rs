//! Remote cargo pool interface
//!
//! The pool's storage, indexing and assignment bookkeeping live on the
//! server; the client only sees it through these operations.

use async_trait::async_trait;
use shared::models::{
    AssignmentFlag, CargoRecord, CommitResponse, ImportContext, ImportResponse, ImportUpload,
    ManifestPayload, ReferenceKind, ReferenceOption,
};

use crate::error::ClientResult;

/// Filter for one `queryPool` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolFilter {
    /// Reference text; `None` lists the whole bucket
    pub text: Option<String>,
    pub assignment: AssignmentFlag,
}

impl PoolFilter {
    /// Baseline browsing set: every free record
    pub fn free() -> Self {
        Self {
            text: None,
            assignment: AssignmentFlag::Free,
        }
    }

    pub fn matching(text: impl Into<String>, assignment: AssignmentFlag) -> Self {
        let text = text.into();
        let text = text.trim();
        Self {
            text: (!text.is_empty()).then(|| text.to_string()),
            assignment,
        }
    }
}

/// Remote operations consumed by the authoring session
#[async_trait]
pub trait CargoPool: Send + Sync {
    /// List free or used records, optionally text-filtered
    async fn query_pool(&self, filter: &PoolFilter) -> ClientResult<Vec<CargoRecord>>;

    /// Bulk-create/claim records from an uploaded spreadsheet
    async fn import_batch(
        &self,
        upload: &ImportUpload,
        context: &ImportContext,
    ) -> ClientResult<ImportResponse>;

    /// Commit a manifest; conflicts are a successful call with a conflict body
    async fn commit_manifest(&self, payload: &ManifestPayload) -> ClientResult<CommitResponse>;

    /// Static reference data for form selects
    async fn fetch_reference(&self, kind: ReferenceKind) -> ClientResult<Vec<ReferenceOption>>;
}
