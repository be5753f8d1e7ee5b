//! HTTP client for the backup service.
//!
//! The wire contract is small: two form-encoded credential operations
//! (`register`, `login`), one multipart photo upload, a filename listing,
//! and a raw-bytes download. [`BackupApi`] declares them as a trait so the
//! workflow can be exercised against mock servers; [`ReqwestBackupApi`] is
//! the real implementation.
//!
//! The service address is fixed at build time. [`ReqwestBackupApi::shared`]
//! hands out one memoized client bound to it; nothing about the factory is
//! configurable at runtime.

use crate::error::{Error, Result};
use crate::types::UserId;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Address of the backup service, baked in at build time.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Every upload is tagged with this content type; the service stores photos
/// and nothing else.
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// The one process-wide client. Building it is not expected to fail; if it
/// does there is nothing sensible to recover to, so the first dependent
/// call aborts.
static SHARED: Lazy<Arc<ReqwestBackupApi>> = Lazy::new(|| {
    let base_url = Url::parse(DEFAULT_BASE_URL).expect("Failed to parse default base URL");
    Arc::new(ReqwestBackupApi::new(base_url))
});

/// Successful login reply. The backend sends more fields (at least a
/// human-readable message); only `user_id` is contractual, and it must be
/// a plain non-negative integer.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
}

/// One photo upload, assembled by the workflow after a pick has resolved
/// to a readable file. Not persisted anywhere.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub user_id: UserId,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The remote operations offered by the backup service.
#[async_trait]
pub trait BackupApi: Send + Sync {
    /// Create an account. Returns the backend's opaque confirmation text.
    async fn register(&self, username: &str, password: &str) -> Result<String>;

    /// Exchange credentials for the numeric account id.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;

    /// Store one photo under the given account. Returns the backend's
    /// opaque confirmation text.
    async fn upload(&self, request: &UploadRequest) -> Result<String>;

    /// Names of the files backed up for an account, in backend order.
    async fn list_files(&self, user_id: UserId) -> Result<Vec<String>>;

    /// Fetch a previously backed-up file as raw bytes.
    async fn download(&self, user_id: UserId, filename: &str) -> Result<Vec<u8>>;
}

/// The concrete [`BackupApi`] talking to the service with `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestBackupApi {
    client: Client,
    base_url: Url,
}

impl ReqwestBackupApi {
    /// The client bound to [`DEFAULT_BASE_URL`]. Memoized: the first call
    /// constructs the underlying HTTP client, every later call returns the
    /// same instance.
    pub fn shared() -> Arc<ReqwestBackupApi> {
        SHARED.clone()
    }

    /// A client bound to an arbitrary base address. Used by tests; the
    /// production path goes through [`ReqwestBackupApi::shared`].
    pub fn new(base_url: Url) -> Self {
        let client = Client::builder().build().expect("Failed to create HTTP client");
        Self { client, base_url }
    }

    /// Join operation path segments onto the base URL. Segments are
    /// percent-encoded individually, so filenames with awkward characters
    /// stay single segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("base URL must accept path segments")
            .pop_if_empty()
            .extend(segments);
        url
    }
}

/// Pass a successful response through, turning any other status into
/// [`Error::Backend`] with the body text kept verbatim for display.
async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    Err(Error::Backend { status, message })
}

#[async_trait]
impl BackupApi for ReqwestBackupApi {
    #[tracing::instrument(skip_all, fields(username = %username))]
    async fn register(&self, username: &str, password: &str) -> Result<String> {
        let url = self.endpoint(&["register"]);
        tracing::debug!(%url, "Registering account");

        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        Ok(ensure_success(response).await?.text().await?)
    }

    #[tracing::instrument(skip_all, fields(username = %username))]
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let url = self.endpoint(&["login"]);
        tracing::debug!(%url, "Logging in");

        let response = self
            .client
            .post(url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let body = ensure_success(response).await?.text().await?;
        tracing::debug!(body = %body, "Login response body");

        match serde_json::from_str::<LoginResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                tracing::error!(error = %e, body = %body, "Login response did not match the contract");
                Err(Error::MalformedResponse { source: e })
            }
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = request.user_id, file_name = %request.file_name))]
    async fn upload(&self, request: &UploadRequest) -> Result<String> {
        let url = self.endpoint(&["upload"]);
        tracing::debug!(%url, size = request.bytes.len(), "Uploading file");

        let part = Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(IMAGE_CONTENT_TYPE)?;
        let form = Form::new()
            .text("user_id", request.user_id.to_string())
            .part("file", part);

        let response = self.client.post(url).multipart(form).send().await?;
        Ok(ensure_success(response).await?.text().await?)
    }

    #[tracing::instrument(skip_all, fields(user_id = user_id))]
    async fn list_files(&self, user_id: UserId) -> Result<Vec<String>> {
        let url = self.endpoint(&["files", &user_id.to_string()]);
        tracing::debug!(%url, "Listing backed-up files");

        let response = self.client.get(url).send().await?;
        let body = ensure_success(response).await?.text().await?;

        match serde_json::from_str::<Vec<String>>(&body) {
            Ok(files) => Ok(files),
            Err(e) => {
                tracing::error!(error = %e, body = %body, "File listing did not match the contract");
                Err(Error::MalformedResponse { source: e })
            }
        }
    }

    #[tracing::instrument(skip_all, fields(user_id = user_id, filename = %filename))]
    async fn download(&self, user_id: UserId, filename: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&["download", &user_id.to_string(), filename]);
        tracing::debug!(%url, "Downloading file");

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn install_crypto_provider() {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    }

    fn api_for(server: &MockServer) -> ReqwestBackupApi {
        install_crypto_provider();
        let base_url = Url::parse(&server.uri()).unwrap();
        ReqwestBackupApi::new(base_url)
    }

    #[tokio::test]
    async fn register_returns_confirmation_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=hunter2"))
            .respond_with(ResponseTemplate::new(201).set_body_string("account created"))
            .expect(1)
            .mount(&server)
            .await;

        let text = api_for(&server).register("alice", "hunter2").await.unwrap();
        assert_eq!(text, "account created");
    }

    #[tokio::test]
    async fn register_surfaces_backend_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(400).set_body_string("username already exists"))
            .expect(1)
            .mount(&server)
            .await;

        let err = api_for(&server).register("alice", "hunter2").await.unwrap_err();
        match err {
            Error::Backend { status, message } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(message, "username already exists");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test_log::test(tokio::test)]
    async fn login_decodes_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_string_contains("username=alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "welcome back",
                "user_id": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let login = api_for(&server).login("alice", "hunter2").await.unwrap();
        assert_eq!(login.user_id, 7);
    }

    #[tokio::test]
    async fn login_without_user_id_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = api_for(&server).login("alice", "hunter2").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn login_with_mistyped_user_id_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user_id": "7" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = api_for(&server).login("alice", "hunter2").await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn upload_sends_multipart_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_string("stored"))
            .expect(1)
            .mount(&server)
            .await;

        let request = UploadRequest {
            user_id: 4,
            file_name: "cat.jpg".to_string(),
            bytes: b"fake image data".to_vec(),
        };
        let text = api_for(&server).upload(&request).await.unwrap();
        assert_eq!(text, "stored");

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("name=\"user_id\""), "body was: {body}");
        assert!(body.contains("\r\n4\r\n"), "body was: {body}");
        assert!(body.contains("filename=\"cat.jpg\""), "body was: {body}");
        assert!(body.contains("Content-Type: image/jpeg"), "body was: {body}");
        assert!(body.contains("fake image data"), "body was: {body}");
    }

    #[tokio::test]
    async fn list_files_preserves_backend_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a.jpg", "b.png"])))
            .expect(1)
            .mount(&server)
            .await;

        let files = api_for(&server).list_files(42).await.unwrap();
        assert_eq!(files, vec!["a.jpg".to_string(), "b.png".to_string()]);
    }

    #[tokio::test]
    async fn list_files_rejects_non_array_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/files/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = api_for(&server).list_files(42).await.unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/7/cat.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JPEGDATA".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let bytes = api_for(&server).download(7, "cat.jpg").await.unwrap();
        assert_eq!(bytes, b"JPEGDATA".to_vec());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Point to a port that's not listening
        install_crypto_provider();
        let base_url = Url::parse("http://127.0.0.1:1").unwrap();
        let api = ReqwestBackupApi::new(base_url);

        let err = api.register("alice", "hunter2").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    #[test]
    fn shared_factory_memoizes() {
        install_crypto_provider();
        let first = ReqwestBackupApi::shared();
        let second = ReqwestBackupApi::shared();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn endpoint_keeps_filenames_single_segments() {
        install_crypto_provider();
        let api = ReqwestBackupApi::new(Url::parse("http://127.0.0.1:5000/").unwrap());
        let url = api.endpoint(&["download", "7", "my photo#1.jpg"]);
        assert_eq!(url.path(), "/download/7/my%20photo%231.jpg");
    }
}
