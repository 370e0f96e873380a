//! Manifest Client - cargo manifest reservation builder
//!
//! In-process logic layer between operator UI events and the remote
//! cargo pool. An [`AuthoringSession`] lets one operator browse unclaimed
//! cargo records, stage a selection, promote it into a manifest draft and
//! commit it, while other sessions claim records from the same pool.
//!
//! # Components
//!
//! ```text
//! QueryEngine ──> StagingController ──promote──> DraftManager ⇄ ReservationTracker
//!                                                     │
//!                       ImportReconciler ─────────────┤
//!                                                     ▼
//!                                            SubmissionCoordinator
//!                                     (commit | conflict rollback + refresh)
//! ```
//!
//! There is no locking of pool records: the commit response is the single
//! source of truth for conflicts, reconciled optimistically on the client.

pub mod config;
pub mod draft;
pub mod error;
pub mod http;
pub mod import;
pub mod logging;
pub mod pool;
pub mod query;
pub mod reference;
pub mod reservation;
pub mod session;
pub mod staging;
pub mod submission;

pub use config::ClientConfig;
pub use draft::DraftManager;
pub use error::{ClientError, ClientResult, ValidationIssue};
pub use http::HttpPool;
pub use import::{ImportOutcome, ImportPlan, ImportReconciler, InferenceBasis};
pub use pool::{CargoPool, PoolFilter};
pub use query::{ApplyStatus, PoolSnapshot, QueryEngine, ResultBuckets, SearchOutcome, SearchTicket};
pub use reference::ReferenceCache;
pub use reservation::{ReservationReason, ReservationTracker};
pub use session::AuthoringSession;
pub use staging::{PromoteSummary, StagingController, ToggleAll};
pub use submission::{SubmissionCoordinator, SubmitOutcome};

// Re-export shared types for convenience
pub use shared::models::{
    ActingUser, AssignmentFlag, CargoRecord, CommitResponse, ConflictReport, ImportContext,
    ImportResponse, ImportUpload, ManifestForm, ManifestPayload, RecordId, ReferenceKind,
    ReferenceOption,
};
