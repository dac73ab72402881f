//! Inbound webhook handling for the Messenger Platform.
//!
//! Handles:
//! - Verification handshake (`GET /webhook` with `hub.*` query parameters)
//! - Incoming event batches (`POST /webhook`): acknowledge, parse,
//!   classify, emit through the event bus
//!
//! The POST acknowledgment is unconditional — an empty JSON object with
//! status 200 goes back before dispatch runs, so a malformed body can
//! never surface to the remote platform as a delivery failure.

use crate::error::{BotError, BotResult};
use crate::events::{BotEvent, EventBus};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Fixed body returned on a failed verification handshake.
pub const VERIFY_ERROR_BODY: &str = "Error, wrong validation token";

/// Query parameters of the verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub hub_mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub hub_verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub hub_challenge: Option<String>,
}

/// Webhook processor bound to the bot's event bus.
#[derive(Clone)]
pub struct WebhookDispatcher {
    verify_token: Option<String>,
    events: Arc<EventBus>,
}

impl WebhookDispatcher {
    pub fn new(verify_token: Option<String>, events: Arc<EventBus>) -> Self {
        Self {
            verify_token,
            events,
        }
    }

    /// The event bus this dispatcher emits into.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    // ─── Verification handshake ──────────────────────────────────────

    /// Compare the presented token against the configured verify token.
    ///
    /// Returns the `hub.challenge` value to echo back on success. With no
    /// verify token configured every handshake fails.
    pub fn verify(
        &self,
        presented_token: Option<&str>,
        challenge: Option<&str>,
    ) -> BotResult<String> {
        match (self.verify_token.as_deref(), presented_token) {
            (Some(expected), Some(token)) if token == expected => {
                debug!("Webhook verification handshake accepted");
                Ok(challenge.unwrap_or_default().to_string())
            }
            _ => Err(BotError::verification_failed("Verify token mismatch")),
        }
    }

    // ─── Classification & dispatch ───────────────────────────────────

    /// Parse a raw webhook POST body and emit one local event per
    /// classified condition.
    ///
    /// Only `entry[0].messaging` is consulted. Per messaging event:
    /// an echo or a quick reply is terminal for that event; text,
    /// postback, attachments, and referral checks are independent, so a
    /// single event can produce several emissions (text before
    /// attachments).
    ///
    /// Returns the number of events emitted. A malformed body or an
    /// event missing required structure aborts the remaining batch;
    /// events classified before the failure have already fired.
    pub fn dispatch_payload(&self, raw_body: &str) -> BotResult<usize> {
        let payload: serde_json::Value = serde_json::from_str(raw_body)
            .map_err(|e| BotError::malformed_payload(format!("Webhook JSON parse: {}", e)))?;

        let messaging = payload["entry"][0]["messaging"]
            .as_array()
            .ok_or_else(|| BotError::malformed_payload("Missing entry[0].messaging"))?;

        let mut emitted = 0usize;

        for event in messaging {
            let sender = event["sender"]["id"]
                .as_str()
                .ok_or_else(|| BotError::malformed_payload("Messaging event missing sender.id"))?;

            let message = &event["message"];

            // An echo of the bot's own outbound message. Terminal: no
            // further checks run for this event.
            if message["is_echo"].as_bool().unwrap_or(false) {
                let recipient = event["recipient"]["id"].as_str().ok_or_else(|| {
                    BotError::malformed_payload("Echo event missing recipient.id")
                })?;
                self.events.emit(&BotEvent::Echo {
                    recipient_id: recipient.to_string(),
                    text: message["text"].as_str().map(String::from),
                });
                emitted += 1;
                continue;
            }

            // A quick-reply selection. Also terminal.
            if message["quick_reply"].is_object() {
                self.events.emit(&BotEvent::QuickReply {
                    sender_id: sender.to_string(),
                    payload: message["quick_reply"]["payload"]
                        .as_str()
                        .unwrap_or_default()
                        .to_string(),
                });
                emitted += 1;
                continue;
            }

            // The remaining checks are independent; one event can match
            // several of them.
            if let Some(text) = message["text"].as_str() {
                self.events.emit(&BotEvent::Message {
                    sender_id: sender.to_string(),
                    text: text.to_string(),
                });
                emitted += 1;
            }

            if let Some(postback_payload) = event["postback"]["payload"].as_str() {
                let referral = match &event["postback"]["referral"] {
                    serde_json::Value::Null => None,
                    other => Some(other.clone()),
                };
                self.events.emit(&BotEvent::Postback {
                    sender_id: sender.to_string(),
                    payload: postback_payload.to_string(),
                    referral,
                });
                emitted += 1;
            }

            if let Some(attachments) = message["attachments"].as_array() {
                self.events.emit(&BotEvent::Attachment {
                    sender_id: sender.to_string(),
                    attachments: attachments.clone(),
                });
                emitted += 1;
            }

            if !event["referral"].is_null() {
                self.events.emit(&BotEvent::Referral {
                    sender_id: sender.to_string(),
                    referral: event["referral"].clone(),
                });
                emitted += 1;
            }
        }

        debug!("Dispatched {} webhook event(s)", emitted);
        Ok(emitted)
    }
}

// ─── HTTP termination ────────────────────────────────────────────────

/// Build the axum router terminating the webhook HTTP surface at
/// `/webhook`.
pub fn router(dispatcher: Arc<WebhookDispatcher>) -> Router {
    Router::new()
        .route("/webhook", get(verify_handler).post(receive_handler))
        .with_state(dispatcher)
}

/// GET handler: the verification handshake.
async fn verify_handler(
    State(dispatcher): State<Arc<WebhookDispatcher>>,
    Query(params): Query<VerifyQuery>,
) -> impl IntoResponse {
    debug!("Webhook verification request (mode {:?})", params.hub_mode);

    match dispatcher.verify(
        params.hub_verify_token.as_deref(),
        params.hub_challenge.as_deref(),
    ) {
        Ok(challenge) => (StatusCode::OK, challenge),
        Err(e) => {
            warn!("Webhook verification failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, VERIFY_ERROR_BODY.to_string())
        }
    }
}

/// POST handler: acknowledge unconditionally, then dispatch.
///
/// Dispatch runs off the response path; a parse failure is logged and
/// never reflected in the response the platform sees.
async fn receive_handler(
    State(dispatcher): State<Arc<WebhookDispatcher>>,
    body: String,
) -> impl IntoResponse {
    tokio::spawn(async move {
        if let Err(e) = dispatcher.dispatch_payload(&body) {
            error!("Webhook dispatch failed: {}", e);
        }
    });

    (StatusCode::OK, Json(json!({})))
}
