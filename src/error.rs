//! Crate-level error types for the Messenger Platform integration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alias for `Result<T, BotError>`.
pub type BotResult<T> = Result<T, BotError>;

/// Uniform error type used across the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotError {
    pub code: BotErrorCode,
    pub message: String,
    /// Optional sub-error detail from the upstream API.
    pub details: Option<String>,
    /// HTTP status code if originated from an API call.
    pub http_status: Option<u16>,
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref d) = self.details {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for BotError {}

/// Categorised error codes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotErrorCode {
    // ── Auth ─────────────────────────────────────────────
    InvalidAccessToken,
    InsufficientPermissions,
    // ── API ──────────────────────────────────────────────
    ResourceNotFound,
    RateLimited,
    RemoteRejected,
    // ── Webhooks ─────────────────────────────────────────
    WebhookVerificationFailed,
    MalformedPayload,
    // ── Internal ─────────────────────────────────────────
    NotConfigured,
    NetworkError,
    InternalError,
}

impl BotError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self {
            code: BotErrorCode::NotConfigured,
            message: msg.into(),
            details: None,
            http_status: None,
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self {
            code: BotErrorCode::NetworkError,
            message: msg.into(),
            details: None,
            http_status: None,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: BotErrorCode::InternalError,
            message: msg.into(),
            details: None,
            http_status: None,
        }
    }

    pub fn verification_failed(msg: impl Into<String>) -> Self {
        Self {
            code: BotErrorCode::WebhookVerificationFailed,
            message: msg.into(),
            details: None,
            http_status: Some(500),
        }
    }

    pub fn malformed_payload(msg: impl Into<String>) -> Self {
        Self {
            code: BotErrorCode::MalformedPayload,
            message: msg.into(),
            details: None,
            http_status: None,
        }
    }

    /// Build from an upstream API error response.
    ///
    /// The Graph API returns
    /// `{"error": {"message": "...", "type": "...", "code": N, "error_subcode": N, "fbtrace_id": "..."}}`.
    /// The status and body are surfaced to the caller as-is; classification
    /// only picks an error code, it never triggers recovery.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let (msg, details) = Self::parse_graph_error(body);
        Self {
            code: Self::classify_status(status),
            message: msg,
            details: Some(details),
            http_status: Some(status),
        }
    }

    fn parse_graph_error(body: &str) -> (String, String) {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
            let err = &v["error"];
            let msg = err["message"]
                .as_str()
                .unwrap_or("Unknown API error")
                .to_string();
            let detail = format!(
                "type={}, code={}, error_subcode={}, fbtrace_id={}",
                err["type"].as_str().unwrap_or(""),
                err["code"].as_u64().unwrap_or(0),
                err["error_subcode"].as_u64().unwrap_or(0),
                err["fbtrace_id"].as_str().unwrap_or(""),
            );
            (msg, detail)
        } else {
            (
                "Unparseable API error".to_string(),
                body.chars().take(500).collect(),
            )
        }
    }

    fn classify_status(status: u16) -> BotErrorCode {
        match status {
            401 => BotErrorCode::InvalidAccessToken,
            403 => BotErrorCode::InsufficientPermissions,
            404 => BotErrorCode::ResourceNotFound,
            429 => BotErrorCode::RateLimited,
            _ => BotErrorCode::RemoteRejected,
        }
    }
}
