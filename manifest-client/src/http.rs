//! HTTP implementation of [`CargoPool`]

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CargoRecord, CommitResponse, ConflictReport, ImportContext, ImportResponse, ImportUpload,
    ManifestCreated, ManifestPayload, ReferenceKind, ReferenceOption,
};
use shared::response::ApiResponse;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pool::{CargoPool, PoolFilter};

/// REST client for the cargo pool API
#[derive(Debug, Clone)]
pub struct HttpPool {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPool {
    /// Create a new HTTP pool client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Build authorization header value
    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Url> {
        let raw = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Config(format!("invalid URL {raw}: {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }
        request
    }

    /// Send a request and unwrap the `data` of a successful envelope
    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> ClientResult<Option<T>> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::trace!(%status, len = text.len(), "Pool API response");
        Self::handle_response(status, &text)
    }

    /// Handle the HTTP response
    fn handle_response<T: DeserializeOwned>(status: StatusCode, text: &str) -> ClientResult<Option<T>> {
        if !status.is_success() {
            return Err(error_from_body(status, text));
        }
        let envelope: ApiResponse<T> = serde_json::from_str(text)?;
        if !envelope.is_success() {
            return Err(ClientError::Server(envelope.to_error()));
        }
        Ok(envelope.data)
    }
}

/// Map a non-success response to a client error
fn error_from_body(status: StatusCode, text: &str) -> ClientError {
    if status == StatusCode::UNAUTHORIZED {
        return ClientError::Unauthorized;
    }
    match serde_json::from_str::<ApiResponse<serde_json::Value>>(text) {
        Ok(envelope) if envelope.code.is_some_and(|c| c != 0) => {
            ClientError::Server(envelope.to_error())
        }
        _ => {
            let code = ErrorCode::from_http_status(status);
            let message = if text.trim().is_empty() {
                code.message().to_string()
            } else {
                text.trim().to_string()
            };
            ClientError::Server(AppError::with_message(code, message))
        }
    }
}

/// Conflict ids carried in either the envelope's `data` or its `details`
fn conflict_ids(text: &str) -> Option<ConflictReport> {
    let envelope: ApiResponse<serde_json::Value> = serde_json::from_str(text).ok()?;
    let from_data = envelope
        .data
        .and_then(|data| serde_json::from_value::<ConflictReport>(data).ok());
    let from_details = || {
        envelope
            .details
            .as_ref()
            .and_then(|d| d.get("conflict_ids"))
            .and_then(|ids| serde_json::from_value(ids.clone()).ok())
            .map(|conflict_ids| ConflictReport { conflict_ids })
    };
    from_data
        .filter(|r| !r.conflict_ids.is_empty())
        .or_else(from_details)
        .filter(|r| !r.conflict_ids.is_empty())
}

fn parse_commit(status: StatusCode, text: &str) -> ClientResult<CommitResponse> {
    let assigned = ErrorCode::RecordsAlreadyAssigned.code();
    let conflict_status = status == StatusCode::CONFLICT
        || serde_json::from_str::<ApiResponse<serde_json::Value>>(text)
            .is_ok_and(|e| e.code == Some(assigned));
    if conflict_status && let Some(report) = conflict_ids(text) {
        return Ok(CommitResponse::Conflict(report));
    }

    let created: ManifestCreated = HttpPool::handle_response(status, text)?
        .ok_or_else(|| ClientError::InvalidResponse("Missing manifest data".to_string()))?;
    Ok(CommitResponse::Committed {
        manifest_id: created.manifest_id,
    })
}

fn import_response(data: Option<Vec<CargoRecord>>) -> ImportResponse {
    match data {
        Some(records) if !records.is_empty() => ImportResponse::Returned(records),
        _ => ImportResponse::Unconfirmed,
    }
}

#[async_trait]
impl CargoPool for HttpPool {
    async fn query_pool(&self, filter: &PoolFilter) -> ClientResult<Vec<CargoRecord>> {
        let mut query = vec![("assignment", filter.assignment.as_query_value())];
        if let Some(text) = filter.text.as_deref() {
            query.push(("q", text));
        }
        let url = self.url("/api/cargo", &query)?;
        let records = Self::send::<Vec<CargoRecord>>(self.authorized(self.client.get(url)))
            .await?
            .unwrap_or_default();
        tracing::debug!(
            assignment = filter.assignment.as_query_value(),
            count = records.len(),
            "Pool queried"
        );
        Ok(records)
    }

    async fn import_batch(
        &self,
        upload: &ImportUpload,
        ctx: &ImportContext,
    ) -> ClientResult<ImportResponse> {
        let branch_id = ctx.branch_id.to_string();
        let url = self.url(
            "/api/cargo/import",
            &[
                ("branch_id", branch_id.as_str()),
                ("status", ctx.target_status.as_str()),
                ("file_name", upload.file_name.as_str()),
            ],
        )?;
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(upload.bytes.clone());
        let data = Self::send::<Vec<CargoRecord>>(self.authorized(request)).await?;
        Ok(import_response(data))
    }

    async fn commit_manifest(&self, payload: &ManifestPayload) -> ClientResult<CommitResponse> {
        let url = self.url("/api/manifests", &[])?;
        let response = self
            .authorized(self.client.post(url).json(payload))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        parse_commit(status, &text)
    }

    async fn fetch_reference(&self, kind: ReferenceKind) -> ClientResult<Vec<ReferenceOption>> {
        let url = self.url(&format!("/api/reference/{}", kind.path()), &[])?;
        Self::send(self.authorized(self.client.get(url)))
            .await?
            .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", kind.path())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(base: &str) -> HttpPool {
        HttpPool::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let url = pool("http://localhost:8080/")
            .url("/api/cargo", &[("assignment", "free"), ("q", "INV 1001")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/cargo?assignment=free&q=INV+1001"
        );

        let url = pool("http://localhost:8080").url("api/manifests", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/manifests");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = pool("not a url").url("/api/cargo", &[]).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_auth_header() {
        let pool = pool("http://localhost:8080").with_token("abc");
        assert_eq!(pool.auth_header().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_error_from_body() {
        assert!(matches!(
            error_from_body(StatusCode::UNAUTHORIZED, ""),
            ClientError::Unauthorized
        ));

        let body = r#"{"code":6001,"message":"Record 9 not found"}"#;
        match error_from_body(StatusCode::NOT_FOUND, body) {
            ClientError::Server(e) => {
                assert_eq!(e.code, ErrorCode::RecordNotFound);
                assert_eq!(e.message, "Record 9 not found");
            }
            other => panic!("unexpected {other:?}"),
        }

        match error_from_body(StatusCode::BAD_GATEWAY, "upstream down") {
            ClientError::Server(e) => {
                assert_eq!(e.code, ErrorCode::NetworkError);
                assert_eq!(e.message, "upstream down");
                assert!(ClientError::Server(e).is_retryable());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_handle_response_envelope_error() {
        let body = r#"{"code":4005,"message":"Origin equals destination"}"#;
        let err = HttpPool::handle_response::<ManifestCreated>(StatusCode::OK, body).unwrap_err();
        match err {
            ClientError::Server(e) => assert_eq!(e.code, ErrorCode::InvalidRoute),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_commit() {
        let ok = r#"{"code":0,"message":"OK","data":{"manifest_id":42}}"#;
        assert_eq!(
            parse_commit(StatusCode::OK, ok).unwrap(),
            CommitResponse::Committed { manifest_id: 42 }
        );

        let conflict = r#"{"code":4003,"message":"Records already assigned","data":{"conflict_ids":[2,5]}}"#;
        assert_eq!(
            parse_commit(StatusCode::CONFLICT, conflict).unwrap(),
            CommitResponse::Conflict(ConflictReport {
                conflict_ids: vec![2, 5]
            })
        );

        let in_details = r#"{"code":4003,"message":"taken","details":{"conflict_ids":[7]}}"#;
        assert_eq!(
            parse_commit(StatusCode::CONFLICT, in_details).unwrap(),
            CommitResponse::Conflict(ConflictReport {
                conflict_ids: vec![7]
            })
        );

        let bare = r#"{"code":4004,"message":"Duplicate submission"}"#;
        match parse_commit(StatusCode::CONFLICT, bare).unwrap_err() {
            ClientError::Server(e) => assert_eq!(e.code, ErrorCode::DuplicateSubmission),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_import_response_shapes() {
        assert_eq!(import_response(None), ImportResponse::Unconfirmed);
        assert_eq!(import_response(Some(vec![])), ImportResponse::Unconfirmed);
    }
}
