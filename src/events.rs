//! Typed event bus for inbound webhook events.
//!
//! Application code registers listeners per event kind; the webhook
//! dispatcher is the sole emitter. Listeners for a kind run synchronously
//! in registration order; there is no further ordering or concurrency
//! guarantee.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// The event kinds a webhook batch can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Echo,
    QuickReply,
    Message,
    Postback,
    Attachment,
    Referral,
}

impl EventKind {
    /// The event name as exposed to application code.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Echo => "echo",
            EventKind::QuickReply => "quickreply",
            EventKind::Message => "message",
            EventKind::Postback => "postback",
            EventKind::Attachment => "attachment",
            EventKind::Referral => "messagingReferral",
        }
    }
}

/// A classified inbound messaging event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum BotEvent {
    /// A message the bot itself sent, echoed back through the webhook.
    /// Carries the id of the message's original recipient.
    #[serde(rename = "echo")]
    Echo {
        recipient_id: String,
        text: Option<String>,
    },
    /// A quick-reply selection.
    #[serde(rename = "quickreply")]
    QuickReply { sender_id: String, payload: String },
    /// A plain text message.
    #[serde(rename = "message")]
    Message { sender_id: String, text: String },
    /// A button/menu postback, optionally carrying a referral.
    #[serde(rename = "postback")]
    Postback {
        sender_id: String,
        payload: String,
        referral: Option<serde_json::Value>,
    },
    /// One or more media attachments.
    #[serde(rename = "attachment")]
    Attachment {
        sender_id: String,
        attachments: Vec<serde_json::Value>,
    },
    /// A standalone referral (e.g. an m.me link with a ref parameter).
    #[serde(rename = "messagingReferral")]
    Referral {
        sender_id: String,
        referral: serde_json::Value,
    },
}

impl BotEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BotEvent::Echo { .. } => EventKind::Echo,
            BotEvent::QuickReply { .. } => EventKind::QuickReply,
            BotEvent::Message { .. } => EventKind::Message,
            BotEvent::Postback { .. } => EventKind::Postback,
            BotEvent::Attachment { .. } => EventKind::Attachment,
            BotEvent::Referral { .. } => EventKind::Referral,
        }
    }
}

/// Listener callback invoked on emit.
pub type EventListener = Box<dyn Fn(&BotEvent) + Send + Sync>;

/// Ordered listener registry keyed by event kind.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<EventListener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an event kind. Listeners fire in
    /// registration order.
    pub fn on(&self, kind: EventKind, listener: impl Fn(&BotEvent) + Send + Sync + 'static) {
        let mut map = match self.listeners.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(kind).or_default().push(Box::new(listener));
    }

    /// Emit an event to every listener registered for its kind.
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &BotEvent) -> usize {
        let map = match self.listeners.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match map.get(&event.kind()) {
            Some(listeners) => {
                for listener in listeners {
                    listener(event);
                }
                listeners.len()
            }
            None => 0,
        }
    }

    /// Number of listeners registered for a kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        let map = match self.listeners.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.get(&kind).map(Vec::len).unwrap_or(0)
    }
}
