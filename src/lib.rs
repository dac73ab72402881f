//! # pagebot — Messenger Platform Bot Framework
//!
//! Client and webhook adapter for the Facebook Messenger Platform.
//!
//! ## Capabilities
//!
//! - **Messaging** – text, image, audio, video, and file attachments by
//!   URL; button, generic (carousel), receipt, and list templates; quick
//!   replies and location requests; sender actions (typing indicators,
//!   read receipts).
//! - **Profile & Settings** – user-profile fetch, greeting text,
//!   get-started button, flat and nested persistent menus, domain
//!   whitelisting.
//! - **Webhooks** – verification handshake, inbound event classification,
//!   and typed event emission (`echo`, `quickreply`, `message`,
//!   `postback`, `attachment`, `messagingReferral`) through a synchronous
//!   event bus; an axum router terminates the HTTP side.
//!
//! Every outbound call is a single authenticated HTTP request carrying
//! the page token as an `access_token` query parameter. There are no
//! retries, no persistence, and no shared mutable state beyond the
//! immutable credential.

pub mod types;
pub mod error;
pub mod client;
pub mod messaging;
pub mod profile;
pub mod events;
pub mod webhook;
pub mod bot;

// Re-exports
pub use bot::MessengerBot;
pub use error::{BotError, BotErrorCode, BotResult};
pub use events::{BotEvent, EventBus, EventKind, EventListener};
pub use types::*;
pub use webhook::{router, WebhookDispatcher};
