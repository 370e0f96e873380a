//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::NotFound | Self::ManifestNotFound | Self::RecordNotFound => {
                StatusCode::NOT_FOUND
            }

            Self::AlreadyExists
            | Self::RecordsAlreadyAssigned
            | Self::DuplicateSubmission
            | Self::RecordNotFree => StatusCode::CONFLICT,

            Self::NotAuthenticated
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::SessionExpired => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied | Self::BranchAccessDenied => StatusCode::FORBIDDEN,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ManifestEmpty
            | Self::InvalidRoute
            | Self::ImportFormatInvalid => StatusCode::BAD_REQUEST,

            Self::ImportTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            Self::TimeoutError => StatusCode::GATEWAY_TIMEOUT,
            Self::NetworkError => StatusCode::BAD_GATEWAY,

            Self::Unknown | Self::ImportFailed | Self::InternalError | Self::DatabaseError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Map an HTTP status without a parsable body to the closest code
    pub fn from_http_status(status: StatusCode) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::NotAuthenticated,
            StatusCode::FORBIDDEN => Self::PermissionDenied,
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => Self::RecordsAlreadyAssigned,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationFailed,
            StatusCode::PAYLOAD_TOO_LARGE => Self::ImportTooLarge,
            StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => Self::TimeoutError,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Self::NetworkError,
            _ => Self::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(ErrorCode::RecordNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::RecordsAlreadyAssigned.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::ManifestEmpty.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::TokenExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_from_http_status() {
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::FORBIDDEN),
            ErrorCode::PermissionDenied
        );
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::SERVICE_UNAVAILABLE),
            ErrorCode::NetworkError
        );
        assert_eq!(
            ErrorCode::from_http_status(StatusCode::IM_A_TEAPOT),
            ErrorCode::InternalError
        );
    }
}
