//! Shared types for the Messenger Platform integration.
//!
//! Models cover configuration, outbound Send API payloads (buttons,
//! template elements, receipts, quick replies, sender actions), the send
//! response, and the user profile returned by the Graph API.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Configuration for connecting a page to the Messenger Platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Page-scoped access token. Immutable for the life of the bot.
    pub page_token: String,
    /// Webhook verify token (only needed when serving the verification
    /// handshake).
    #[serde(default)]
    pub verify_token: Option<String>,
    /// Base URL override (default: `https://graph.facebook.com`).
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Timeout in seconds for API calls.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            page_token: String::new(),
            verify_token: None,
            api_base_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Send API enums
// ═══════════════════════════════════════════════════════════════════════

/// Push behaviour attached to every outbound send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[default]
    Regular,
    SilentPush,
    NoPush,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Regular => "REGULAR",
            NotificationType::SilentPush => "SILENT_PUSH",
            NotificationType::NoPush => "NO_PUSH",
        }
    }
}

/// Typing / read indicators sent outside the message envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
    TypingOff,
    MarkSeen,
}

impl SenderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderAction::TypingOn => "typing_on",
            SenderAction::TypingOff => "typing_off",
            SenderAction::MarkSeen => "mark_seen",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Buttons & menus
// ═══════════════════════════════════════════════════════════════════════

/// A call-to-action button used in button templates, generic/list template
/// elements, and the flat persistent menu.
///
/// Platform limit (not enforced here): button titles render up to 20
/// characters, at most 3 buttons per template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub button_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

impl Button {
    /// A `web_url` button opening the given URL.
    pub fn web_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            button_type: "web_url".into(),
            title: title.into(),
            url: Some(url.into()),
            payload: None,
        }
    }

    /// A `postback` button returning the given payload through the webhook.
    pub fn postback(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            button_type: "postback".into(),
            title: title.into(),
            url: None,
            payload: Some(payload.into()),
        }
    }
}

/// One entry of a nested persistent menu (Messenger profile API).
///
/// `nested` items carry their own `call_to_actions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_actions: Option<Vec<MenuItem>>,
}

/// One locale block of a nested persistent menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentMenu {
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composer_input_disabled: Option<bool>,
    pub call_to_actions: Vec<MenuItem>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Template elements
// ═══════════════════════════════════════════════════════════════════════

/// A bubble of the generic (carousel) template.
///
/// Platform limits (not enforced here): 45-character titles, 80-character
/// subtitles, 3 buttons per bubble, 10 bubbles per message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericElement {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
}

/// Default tap action for a list element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger_extensions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webview_height_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_url: Option<String>,
}

/// A row of the list template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListElement {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<DefaultAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<Button>>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Receipt template
// ═══════════════════════════════════════════════════════════════════════

/// One purchased item on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptElement {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Shipping address block of a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptAddress {
    pub street_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

/// Cost summary block of a receipt. Only `total_cost` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,
    pub total_cost: f64,
}

/// A discount or other adjustment line on a receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptAdjustment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// Receipt template payload.
///
/// `template_type` may be left unset; the builder fills in `"receipt"`
/// and preserves any caller-set value unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_type: Option<String>,
    pub recipient_name: String,
    pub order_number: String,
    pub currency: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<ReceiptElement>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<ReceiptAddress>,
    pub summary: ReceiptSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<Vec<ReceiptAdjustment>>,
}

// ═══════════════════════════════════════════════════════════════════════
//  Quick replies
// ═══════════════════════════════════════════════════════════════════════

/// A quick-reply option presented above the composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickReply {
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl QuickReply {
    /// A text quick reply whose selection posts back `payload`.
    pub fn text(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            content_type: "text".into(),
            title: Some(title.into()),
            payload: Some(payload.into()),
            image_url: None,
        }
    }

    /// A location-sharing quick reply.
    pub fn location() -> Self {
        Self {
            content_type: "location".into(),
            title: None,
            payload: None,
            image_url: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Responses
// ═══════════════════════════════════════════════════════════════════════

/// Parsed response of a successful Send API call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub recipient_id: String,
    pub message_id: String,
}

/// User profile fields returned by the Graph API profile endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_pic: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub timezone: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
}
