//! Unified error codes for the manifest back office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Manifest errors
//! - 6xxx: Cargo pool errors
//! - 7xxx: Import errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1002,
    /// Token is invalid
    TokenInvalid = 1003,
    /// Session has expired
    SessionExpired = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Operator cannot act for this branch
    BranchAccessDenied = 2002,

    // ==================== 4xxx: Manifest ====================
    /// Manifest not found
    ManifestNotFound = 4001,
    /// Manifest has no records
    ManifestEmpty = 4002,
    /// Some submitted records were claimed by another manifest
    RecordsAlreadyAssigned = 4003,
    /// Same commit request submitted twice
    DuplicateSubmission = 4004,
    /// Origin and destination are invalid
    InvalidRoute = 4005,

    // ==================== 6xxx: Cargo ====================
    /// Cargo record not found
    RecordNotFound = 6001,
    /// Cargo record is not free
    RecordNotFree = 6002,

    // ==================== 7xxx: Import ====================
    /// Import failed
    ImportFailed = 7001,
    /// Uploaded file could not be parsed
    ImportFormatInvalid = 7002,
    /// Uploaded file too large
    ImportTooLarge = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::SessionExpired => "Session has expired",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::BranchAccessDenied => "Operator cannot act for this branch",

            // Manifest
            ErrorCode::ManifestNotFound => "Manifest not found",
            ErrorCode::ManifestEmpty => "Manifest has no records",
            ErrorCode::RecordsAlreadyAssigned => "Some records were already assigned",
            ErrorCode::DuplicateSubmission => "Manifest was already submitted",
            ErrorCode::InvalidRoute => "Invalid route",

            // Cargo
            ErrorCode::RecordNotFound => "Cargo record not found",
            ErrorCode::RecordNotFree => "Cargo record is not free",

            // Import
            ErrorCode::ImportFailed => "Import failed",
            ErrorCode::ImportFormatInvalid => "Import file could not be parsed",
            ErrorCode::ImportTooLarge => "Import file is too large",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::TokenExpired),
            1003 => Ok(ErrorCode::TokenInvalid),
            1004 => Ok(ErrorCode::SessionExpired),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::BranchAccessDenied),

            // Manifest
            4001 => Ok(ErrorCode::ManifestNotFound),
            4002 => Ok(ErrorCode::ManifestEmpty),
            4003 => Ok(ErrorCode::RecordsAlreadyAssigned),
            4004 => Ok(ErrorCode::DuplicateSubmission),
            4005 => Ok(ErrorCode::InvalidRoute),

            // Cargo
            6001 => Ok(ErrorCode::RecordNotFound),
            6002 => Ok(ErrorCode::RecordNotFree),

            // Import
            7001 => Ok(ErrorCode::ImportFailed),
            7002 => Ok(ErrorCode::ImportFormatInvalid),
            7003 => Ok(ErrorCode::ImportTooLarge),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
