//! Bot facade — wires configuration, client, messaging, profile
//! management, the event bus, and the webhook dispatcher together.

use crate::client::GraphApiClient;
use crate::error::BotResult;
use crate::events::{BotEvent, EventBus, EventKind};
use crate::messaging::Messaging;
use crate::profile::ProfileManager;
use crate::webhook::{self, WebhookDispatcher};
use crate::types::BotConfig;
use log::info;
use std::fmt;
use std::sync::Arc;

/// A configured Messenger Platform bot.
///
/// Holds the immutable page credential (inside the client) and exposes
/// the messaging and profile surfaces, listener registration, and the
/// webhook router.
pub struct MessengerBot {
    messaging: Messaging,
    profile: ProfileManager,
    events: Arc<EventBus>,
    dispatcher: WebhookDispatcher,
}

impl fmt::Debug for MessengerBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessengerBot").finish_non_exhaustive()
    }
}

impl MessengerBot {
    /// Construct a bot from configuration.
    ///
    /// Fails before any network activity when the page access token is
    /// missing. The verify token is optional and only consulted by the
    /// webhook verification handshake.
    pub fn new(config: BotConfig) -> BotResult<Self> {
        let client = GraphApiClient::new(&config)?;
        info!("Messenger bot configured (token {})", client.masked_token());

        let events = Arc::new(EventBus::new());
        let dispatcher = WebhookDispatcher::new(config.verify_token.clone(), events.clone());

        Ok(Self {
            messaging: Messaging::new(client.clone()),
            profile: ProfileManager::new(client),
            events,
            dispatcher,
        })
    }

    /// Send API surface.
    pub fn messaging(&self) -> &Messaging {
        &self.messaging
    }

    /// User-profile and page-settings surface.
    pub fn profile(&self) -> &ProfileManager {
        &self.profile
    }

    /// The webhook dispatcher (for embedding into an existing server).
    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }

    /// Register a listener for an inbound event kind.
    pub fn on(&self, kind: EventKind, listener: impl Fn(&BotEvent) + Send + Sync + 'static) {
        self.events.on(kind, listener);
    }

    /// Build an axum router serving the webhook endpoint.
    pub fn router(&self) -> axum::Router {
        webhook::router(Arc::new(self.dispatcher.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotErrorCode;
    use std::sync::Mutex;

    fn test_config() -> BotConfig {
        BotConfig {
            page_token: "PAGE_TOKEN_1234".to_string(),
            verify_token: Some("verify_me".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_page_token_is_fatal() {
        let err = MessengerBot::new(BotConfig::default()).unwrap_err();
        assert_eq!(err.code, BotErrorCode::NotConfigured);
    }

    #[test]
    fn test_listeners_receive_dispatched_events() {
        let bot = MessengerBot::new(test_config()).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let s = seen.clone();
        bot.on(EventKind::Message, move |e| {
            s.lock().unwrap().push(e.clone());
        });

        let body = r#"{"entry":[{"messaging":[{"sender":{"id":"U2"},"message":{"text":"hello"}}]}]}"#;
        bot.dispatcher().dispatch_payload(body).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(matches!(&seen[0], BotEvent::Message { sender_id, text }
            if sender_id == "U2" && text == "hello"));
    }

    #[test]
    fn test_dispatcher_uses_configured_verify_token() {
        let bot = MessengerBot::new(test_config()).unwrap();
        assert_eq!(
            bot.dispatcher().verify(Some("verify_me"), Some("ch")).unwrap(),
            "ch"
        );
        assert!(bot.dispatcher().verify(Some("nope"), Some("ch")).is_err());
    }
}
