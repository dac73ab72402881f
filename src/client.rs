//! Low-level HTTP client for the Messenger Platform (Meta Graph API).
//!
//! Authenticates every request with the page token as an `access_token`
//! query parameter and issues exactly one attempt per call: transport
//! failures and non-2xx responses are surfaced to the caller unmodified,
//! never retried, never reinterpreted.

use crate::error::{BotError, BotResult};
use crate::types::BotConfig;
use log::debug;
use std::time::Duration;
use url::Url;

const DEFAULT_API_BASE: &str = "https://graph.facebook.com";

/// Graph API version the wire contract is pinned to.
const GRAPH_API_VERSION: &str = "v2.10";

/// Low-level Graph API HTTP client.
#[derive(Debug, Clone)]
pub struct GraphApiClient {
    http: reqwest::Client,
    page_token: String,
    api_base: String,
}

impl GraphApiClient {
    /// Create a new client from configuration.
    ///
    /// Fails when no page access token is configured; the token is
    /// immutable for the client's lifetime.
    pub fn new(config: &BotConfig) -> BotResult<Self> {
        if config.page_token.is_empty() {
            return Err(BotError::not_configured(
                "Page access token missing. See the Messenger Platform quickstart for details.",
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BotError::network(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            page_token: config.page_token.clone(),
            api_base: config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    // ─── URL helpers ─────────────────────────────────────────────────

    /// Build a versioned Graph API URL: `{base}/{version}/{path}`.
    fn versioned(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, GRAPH_API_VERSION, path)
    }

    /// Send API endpoint.
    pub fn messages_url(&self) -> String {
        self.versioned("me/messages")
    }

    /// Legacy thread-settings endpoint.
    pub fn thread_settings_url(&self) -> String {
        self.versioned("me/thread_settings")
    }

    /// Messenger-profile settings endpoint.
    pub fn messenger_profile_url(&self) -> String {
        self.versioned("me/messenger_profile")
    }

    /// User-profile endpoint for the given user id.
    pub fn profile_url(&self, user_id: &str) -> String {
        self.versioned(user_id)
    }

    /// Attach `access_token` (and any extra parameters) to a URL.
    fn authed_url(&self, url: &str, extra: &[(&str, &str)]) -> BotResult<Url> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(extra.len() + 1);
        params.extend_from_slice(extra);
        params.push(("access_token", self.page_token.as_str()));
        Url::parse_with_params(url, &params)
            .map_err(|e| BotError::internal(format!("Invalid URL: {}", e)))
    }

    /// The page token redacted for log lines.
    pub fn masked_token(&self) -> String {
        if self.page_token.len() > 10 {
            format!(
                "{}...{}",
                &self.page_token[..4],
                &self.page_token[self.page_token.len() - 4..]
            )
        } else {
            "***".to_string()
        }
    }

    // ─── HTTP primitives ─────────────────────────────────────────────

    /// POST a JSON body.
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> BotResult<serde_json::Value> {
        let url = self.authed_url(url, &[])?;
        self.request(reqwest::Method::POST, url, Some(body)).await
    }

    /// GET with query parameters.
    pub async fn get_with_params(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> BotResult<serde_json::Value> {
        let url = self.authed_url(url, params)?;
        self.request(reqwest::Method::GET, url, None).await
    }

    /// DELETE with a JSON body.
    pub async fn delete_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> BotResult<serde_json::Value> {
        let url = self.authed_url(url, &[])?;
        self.request(reqwest::Method::DELETE, url, Some(body)).await
    }

    // ─── Core request method ─────────────────────────────────────────

    /// Single-attempt request. 2xx parses the body as JSON (empty body
    /// becomes `{"success": true}`); anything else is an error carrying
    /// the verbatim status and body.
    async fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> BotResult<serde_json::Value> {
        debug!("{} {}", method, url.path());

        let mut req = self.http.request(method, url);
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BotError::network(e.to_string()))?;

        let status = resp.status().as_u16();
        let resp_body = resp.text().await.unwrap_or_default();

        if (200..300).contains(&status) {
            if resp_body.is_empty() {
                return Ok(serde_json::json!({"success": true}));
            }
            return serde_json::from_str(&resp_body)
                .map_err(|e| BotError::internal(format!("JSON parse error: {}", e)));
        }

        Err(BotError::from_api_response(status, &resp_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BotConfig {
        BotConfig {
            page_token: "PAGE_TOKEN_1234".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_messages_url() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.messages_url(),
            "https://graph.facebook.com/v2.10/me/messages"
        );
    }

    #[test]
    fn test_settings_urls() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.thread_settings_url(),
            "https://graph.facebook.com/v2.10/me/thread_settings"
        );
        assert_eq!(
            client.messenger_profile_url(),
            "https://graph.facebook.com/v2.10/me/messenger_profile"
        );
    }

    #[test]
    fn test_profile_url() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        assert_eq!(
            client.profile_url("1234567890"),
            "https://graph.facebook.com/v2.10/1234567890"
        );
    }

    #[test]
    fn test_base_url_override() {
        let config = BotConfig {
            page_token: "T".repeat(12),
            api_base_url: Some("http://127.0.0.1:9999".to_string()),
            ..Default::default()
        };
        let client = GraphApiClient::new(&config).unwrap();
        assert_eq!(client.messages_url(), "http://127.0.0.1:9999/v2.10/me/messages");
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = BotConfig::default();
        let err = GraphApiClient::new(&config).unwrap_err();
        assert_eq!(err.code, crate::error::BotErrorCode::NotConfigured);
    }

    #[test]
    fn test_access_token_attached_for_every_endpoint_family() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        for url in [
            client.messages_url(),
            client.thread_settings_url(),
            client.messenger_profile_url(),
            client.profile_url("1234567890"),
        ] {
            let authed = client.authed_url(&url, &[]).unwrap();
            let token: Vec<(_, _)> = authed
                .query_pairs()
                .filter(|(k, _)| k == "access_token")
                .collect();
            assert_eq!(token.len(), 1);
            assert_eq!(token[0].1, "PAGE_TOKEN_1234");
        }
    }

    #[test]
    fn test_extra_params_preserved_alongside_token() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        let url = client
            .authed_url(&client.profile_url("42"), &[("fields", "first_name,last_name")])
            .unwrap();
        let query: std::collections::HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(query["fields"], "first_name,last_name");
        assert_eq!(query["access_token"], "PAGE_TOKEN_1234");
    }

    #[test]
    fn test_connection_failure_surfaces_as_network_error() {
        let config = BotConfig {
            page_token: "PAGE_TOKEN_1234".to_string(),
            // TCP port 9 (discard) is not listening; the connect fails fast.
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        };
        let client = GraphApiClient::new(&config).unwrap();
        let err = tokio_test::block_on(
            client.post_json(&client.messages_url(), &serde_json::json!({})),
        )
        .unwrap_err();
        assert_eq!(err.code, crate::error::BotErrorCode::NetworkError);
    }

    #[test]
    fn test_masked_token() {
        let client = GraphApiClient::new(&test_config()).unwrap();
        let masked = client.masked_token();
        assert!(masked.starts_with("PAGE"));
        assert!(masked.ends_with("1234"));
        assert!(masked.contains("..."));
        assert!(!masked.contains("TOKEN"));
    }
}
