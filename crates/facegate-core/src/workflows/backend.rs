use std::time::Duration;

use serde::Deserialize;

use crate::encode::EncodedPayload;
use crate::errors::{AppError, AppResult};

/// Default timeout for backend exchanges.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const ENROLL_ROUTE: &str = "api/enroll";
const VERIFY_ROUTE: &str = "api/verify";

/// Raw JSON response from the enrollment endpoint:
/// `{"success": bool, "message": string}`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EnrollmentReply {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Raw JSON response from the verification endpoint. Everything beyond
/// `success` is optional; `confidence` is backend-opaque and passed through
/// unmodified.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VerificationReply {
    pub success: bool,
    #[serde(default)]
    pub authenticated: Option<bool>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The recognition service seam. One request per call, no retries.
#[allow(async_fn_in_trait)]
pub trait RecognitionBackend {
    async fn enroll(&self, subject: &str, payload: &EncodedPayload) -> AppResult<EnrollmentReply>;
    async fn verify(&self, payload: &EncodedPayload) -> AppResult<VerificationReply>;
}

/// HTTP client for the recognition backend (reusable connection pool).
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), route)
    }

    async fn post_image(
        &self,
        route: &str,
        form: reqwest::multipart::Form,
    ) -> AppResult<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoint(route))
            .multipart(form)
            .send()
            .await
            .map_err(classify_request_error)?;

        if !response.status().is_success() {
            return Err(AppError::Transport(format!(
                "HTTP status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

impl RecognitionBackend for HttpBackend {
    async fn enroll(&self, subject: &str, payload: &EncodedPayload) -> AppResult<EnrollmentReply> {
        let form = reqwest::multipart::Form::new()
            .text("name", subject.to_string())
            .part("image", image_part(payload, "capture.jpg")?);

        let response = self.post_image(ENROLL_ROUTE, form).await?;
        response.json::<EnrollmentReply>().await.map_err(|err| {
            AppError::InvalidResponse(format!("failed to parse enrollment response: {err}"))
        })
    }

    async fn verify(&self, payload: &EncodedPayload) -> AppResult<VerificationReply> {
        let form = reqwest::multipart::Form::new()
            .part("image", image_part(payload, "verification.jpg")?);

        let response = self.post_image(VERIFY_ROUTE, form).await?;
        response.json::<VerificationReply>().await.map_err(|err| {
            AppError::InvalidResponse(format!("failed to parse verification response: {err}"))
        })
    }
}

fn image_part(
    payload: &EncodedPayload,
    file_name: &'static str,
) -> AppResult<reqwest::multipart::Part> {
    reqwest::multipart::Part::bytes(payload.bytes.clone())
        .file_name(file_name)
        .mime_str(&payload.mime_type)
        .map_err(|err| AppError::Transport(format!("invalid payload mime type: {err}")))
}

fn classify_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Transport(format!("request timed out: {err}"))
    } else if err.is_connect() {
        AppError::Transport(format!("connection failed: {err}"))
    } else {
        AppError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_without_doubling_slashes() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/");
        assert_eq!(
            backend.endpoint(ENROLL_ROUTE),
            "http://127.0.0.1:5000/api/enroll"
        );

        let backend = HttpBackend::new("http://127.0.0.1:5000");
        assert_eq!(
            backend.endpoint(VERIFY_ROUTE),
            "http://127.0.0.1:5000/api/verify"
        );
    }

    #[test]
    fn verification_reply_tolerates_missing_fields() {
        let reply: VerificationReply =
            serde_json::from_str(r#"{"success": true, "authenticated": false}"#).unwrap();
        assert!(reply.success);
        assert_eq!(reply.authenticated, Some(false));
        assert!(reply.user.is_none());
        assert!(reply.confidence.is_none());
        assert!(reply.message.is_none());
    }

    #[test]
    fn verification_reply_carries_match_fields() {
        let reply: VerificationReply = serde_json::from_str(
            r#"{"success": true, "authenticated": true, "user": "Alice", "confidence": 0.93}"#,
        )
        .unwrap();
        assert_eq!(reply.user.as_deref(), Some("Alice"));
        assert_eq!(reply.confidence, Some(0.93));
    }
}
