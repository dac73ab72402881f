//! User-profile fetch and page-level Messenger settings.
//!
//! Two endpoint families:
//! - the legacy thread-settings endpoint (greeting text, get-started
//!   button, flat persistent menu);
//! - the messenger-profile endpoint (nested persistent menu, menu
//!   deletion, domain whitelisting).
//!
//! Every operation is a single authenticated call; the remote response is
//! passed through uninterpreted.

use crate::client::GraphApiClient;
use crate::error::{BotError, BotResult};
use crate::types::{Button, PersistentMenu, UserProfile};
use log::info;
use serde_json::json;

/// Field set requested on every user-profile fetch.
const PROFILE_FIELDS: &str = "first_name,last_name,profile_pic,locale,timezone,gender";

// ─── Pure body builders ──────────────────────────────────────────────

/// Thread-settings body for the greeting text.
pub fn greeting_body(text: &str) -> serde_json::Value {
    json!({
        "setting_type": "greeting",
        "greeting": { "text": text },
    })
}

/// Thread-settings body for the get-started button.
pub fn get_started_body(payload: &str) -> serde_json::Value {
    json!({
        "setting_type": "call_to_actions",
        "thread_state": "new_thread",
        "call_to_actions": [ { "payload": payload } ],
    })
}

/// Thread-settings body for the flat persistent menu.
pub fn persistent_menu_body(buttons: &[Button]) -> serde_json::Value {
    json!({
        "setting_type": "call_to_actions",
        "thread_state": "existing_thread",
        "call_to_actions": serde_json::to_value(buttons).unwrap_or_default(),
    })
}

/// Messenger-profile body for the nested persistent menu.
pub fn nested_menu_body(menu: &[PersistentMenu]) -> serde_json::Value {
    json!({
        "persistent_menu": serde_json::to_value(menu).unwrap_or_default(),
    })
}

/// Messenger-profile body deleting the persistent menu.
pub fn delete_menu_body() -> serde_json::Value {
    json!({ "fields": [ "PERSISTENT_MENU" ] })
}

/// Messenger-profile body whitelisting domains for webviews/extensions.
pub fn whitelist_body(domains: &[String]) -> serde_json::Value {
    json!({ "whitelisted_domains": domains })
}

// ─── Operations ──────────────────────────────────────────────────────

/// Profile and settings operations backed by the Graph API HTTP client.
#[derive(Debug, Clone)]
pub struct ProfileManager {
    client: GraphApiClient,
}

impl ProfileManager {
    pub fn new(client: GraphApiClient) -> Self {
        Self { client }
    }

    /// Fetch a user's public profile (fixed field set).
    pub async fn get_user_profile(&self, user_id: &str) -> BotResult<UserProfile> {
        let resp = self
            .client
            .get_with_params(&self.client.profile_url(user_id), &[("fields", PROFILE_FIELDS)])
            .await?;
        serde_json::from_value(resp)
            .map_err(|e| BotError::internal(format!("Unexpected profile shape: {}", e)))
    }

    /// Set the greeting text shown before the first interaction.
    pub async fn set_greeting_text(&self, text: &str) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .post_json(&self.client.thread_settings_url(), &greeting_body(text))
            .await?;
        info!("Greeting text updated");
        Ok(resp)
    }

    /// Set the get-started button payload for new threads.
    pub async fn set_get_started_button(&self, payload: &str) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .post_json(&self.client.thread_settings_url(), &get_started_body(payload))
            .await?;
        info!("Get-started button updated");
        Ok(resp)
    }

    /// Set the flat persistent menu for existing threads.
    pub async fn set_persistent_menu(&self, buttons: &[Button]) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .post_json(
                &self.client.thread_settings_url(),
                &persistent_menu_body(buttons),
            )
            .await?;
        info!("Persistent menu updated ({} entries)", buttons.len());
        Ok(resp)
    }

    /// Set a nested persistent menu via the messenger-profile endpoint.
    pub async fn set_nested_persistent_menu(
        &self,
        menu: &[PersistentMenu],
    ) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .post_json(&self.client.messenger_profile_url(), &nested_menu_body(menu))
            .await?;
        info!("Nested persistent menu updated");
        Ok(resp)
    }

    /// Remove the persistent menu.
    pub async fn delete_persistent_menu(&self) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .delete_json(&self.client.messenger_profile_url(), &delete_menu_body())
            .await?;
        info!("Persistent menu deleted");
        Ok(resp)
    }

    /// Whitelist domains for webviews and Messenger extensions.
    pub async fn whitelist_domains(&self, domains: &[String]) -> BotResult<serde_json::Value> {
        let resp = self
            .client
            .post_json(&self.client.messenger_profile_url(), &whitelist_body(domains))
            .await?;
        info!("Whitelisted {} domain(s)", domains.len());
        Ok(resp)
    }
}
