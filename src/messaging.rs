//! Send API messaging — envelope assembly and the message-builder surface.
//!
//! Covers plain text, URL attachments (image, audio, video, file), the
//! button / generic / receipt / list templates, quick replies, location
//! requests, and sender actions (typing indicators, read receipts).
//!
//! The builders are pure payload constructors: no platform limit (title or
//! subtitle length, button or element counts) is validated locally — a
//! malformed payload is rejected by the remote service and the error is
//! surfaced to the caller untouched.

use crate::client::GraphApiClient;
use crate::error::BotResult;
use crate::types::{
    Button, GenericElement, ListElement, NotificationType, QuickReply, Receipt, SendResponse,
    SenderAction,
};
use log::debug;
use serde_json::json;

// ─── Pure payload builders ───────────────────────────────────────────

/// Envelope common to every outbound send:
/// `{recipient: {id}, message, notification_type}`.
///
/// `notification_type` defaults to `REGULAR` when not supplied.
pub fn build_envelope(
    recipient: &str,
    message: serde_json::Value,
    notification: Option<NotificationType>,
) -> serde_json::Value {
    json!({
        "recipient": { "id": recipient },
        "message": message,
        "notification_type": notification.unwrap_or_default().as_str(),
    })
}

/// Plain text message body.
pub fn text_message(text: &str) -> serde_json::Value {
    json!({ "text": text })
}

/// URL attachment body: `{attachment: {type, payload: {url}}}`.
pub fn attachment_message(attachment_type: &str, url: &str) -> serde_json::Value {
    json!({
        "attachment": {
            "type": attachment_type,
            "payload": { "url": url }
        }
    })
}

/// Button template body.
pub fn button_template(text: &str, buttons: &[Button]) -> serde_json::Value {
    json!({
        "attachment": {
            "type": "template",
            "payload": {
                "template_type": "button",
                "text": text,
                "buttons": serde_json::to_value(buttons).unwrap_or_default(),
            }
        }
    })
}

/// Generic (carousel) template body.
pub fn generic_template(elements: &[GenericElement]) -> serde_json::Value {
    json!({
        "attachment": {
            "type": "template",
            "payload": {
                "template_type": "generic",
                "elements": serde_json::to_value(elements).unwrap_or_default(),
            }
        }
    })
}

/// Receipt template body. Fills in `template_type: "receipt"` only when the
/// receipt does not already carry one; a caller-set value is preserved
/// unchanged.
pub fn receipt_template(receipt: &Receipt) -> serde_json::Value {
    let mut payload = serde_json::to_value(receipt).unwrap_or_default();
    if payload.get("template_type").is_none() {
        payload["template_type"] = json!("receipt");
    }
    json!({
        "attachment": {
            "type": "template",
            "payload": payload,
        }
    })
}

/// List template body. The list always renders with
/// `top_element_style: "compact"`.
pub fn list_template(elements: &[ListElement]) -> serde_json::Value {
    json!({
        "attachment": {
            "type": "template",
            "payload": {
                "template_type": "list",
                "top_element_style": "compact",
                "elements": serde_json::to_value(elements).unwrap_or_default(),
            }
        }
    })
}

/// Text message with quick-reply options.
pub fn quick_reply_message(text: &str, replies: &[QuickReply]) -> serde_json::Value {
    json!({
        "text": text,
        "quick_replies": serde_json::to_value(replies).unwrap_or_default(),
    })
}

/// Text message asking the user to share their location.
pub fn location_request(text: &str) -> serde_json::Value {
    json!({
        "text": text,
        "quick_replies": [ { "content_type": "location" } ],
    })
}

/// Sender-action body, posted to the messages endpoint outside the
/// message envelope.
pub fn sender_action_body(recipient: &str, action: SenderAction) -> serde_json::Value {
    json!({
        "recipient": { "id": recipient },
        "sender_action": action.as_str(),
    })
}

// ─── Send surface ────────────────────────────────────────────────────

/// Message sender backed by the Graph API HTTP client.
#[derive(Debug, Clone)]
pub struct Messaging {
    client: GraphApiClient,
}

impl Messaging {
    pub fn new(client: GraphApiClient) -> Self {
        Self { client }
    }

    /// Core send primitive: wrap `message` in the Send API envelope and
    /// POST it. The remote response is parsed into a [`SendResponse`];
    /// any transport failure or non-2xx rejection propagates unmodified.
    pub async fn send(
        &self,
        recipient: &str,
        message: serde_json::Value,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        let envelope = build_envelope(recipient, message, notification);
        let resp = self
            .client
            .post_json(&self.client.messages_url(), &envelope)
            .await?;

        Ok(SendResponse {
            recipient_id: resp["recipient_id"].as_str().unwrap_or_default().to_string(),
            message_id: resp["message_id"].as_str().unwrap_or_default().to_string(),
        })
    }

    /// Send a plain text message.
    pub async fn send_text(
        &self,
        recipient: &str,
        text: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        debug!("Sending text to {}", recipient);
        self.send(recipient, text_message(text), notification).await
    }

    /// Send an image by URL.
    pub async fn send_image(
        &self,
        recipient: &str,
        image_url: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, attachment_message("image", image_url), notification)
            .await
    }

    /// Send an audio clip by URL.
    pub async fn send_audio(
        &self,
        recipient: &str,
        audio_url: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, attachment_message("audio", audio_url), notification)
            .await
    }

    /// Send a video by URL.
    ///
    /// Goes out with attachment type `"file"`: the deployed wire contract
    /// has the video and file labels crossed, and existing consumers
    /// depend on the labels as shipped.
    pub async fn send_video(
        &self,
        recipient: &str,
        video_url: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, attachment_message("file", video_url), notification)
            .await
    }

    /// Send a file by URL. Goes out with attachment type `"video"`; see
    /// [`Messaging::send_video`].
    pub async fn send_file(
        &self,
        recipient: &str,
        file_url: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, attachment_message("video", file_url), notification)
            .await
    }

    /// Send a button template.
    pub async fn send_buttons(
        &self,
        recipient: &str,
        text: &str,
        buttons: &[Button],
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, button_template(text, buttons), notification)
            .await
    }

    /// Send a generic (carousel) template.
    pub async fn send_generic(
        &self,
        recipient: &str,
        elements: &[GenericElement],
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, generic_template(elements), notification)
            .await
    }

    /// Alias for [`Messaging::send_generic`].
    pub async fn send_bubbles(
        &self,
        recipient: &str,
        elements: &[GenericElement],
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send_generic(recipient, elements, notification).await
    }

    /// Send a receipt template.
    pub async fn send_receipt(
        &self,
        recipient: &str,
        receipt: &Receipt,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, receipt_template(receipt), notification)
            .await
    }

    /// Send a list template.
    pub async fn send_list(
        &self,
        recipient: &str,
        elements: &[ListElement],
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, list_template(elements), notification)
            .await
    }

    /// Send a text message with quick-reply options.
    pub async fn send_quick_replies(
        &self,
        recipient: &str,
        text: &str,
        replies: &[QuickReply],
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, quick_reply_message(text, replies), notification)
            .await
    }

    /// Ask the user to share their location.
    pub async fn send_location_request(
        &self,
        recipient: &str,
        text: &str,
        notification: Option<NotificationType>,
    ) -> BotResult<SendResponse> {
        self.send(recipient, location_request(text), notification)
            .await
    }

    // ─── Sender actions ──────────────────────────────────────────────

    /// Send a sender action (typing indicator or read receipt). The
    /// remote response is passed through uninterpreted.
    pub async fn sender_action(
        &self,
        recipient: &str,
        action: SenderAction,
    ) -> BotResult<serde_json::Value> {
        debug!("Sender action {} for {}", action.as_str(), recipient);
        self.client
            .post_json(
                &self.client.messages_url(),
                &sender_action_body(recipient, action),
            )
            .await
    }

    /// Turn the typing indicator on.
    pub async fn typing_on(&self, recipient: &str) -> BotResult<serde_json::Value> {
        self.sender_action(recipient, SenderAction::TypingOn).await
    }

    /// Turn the typing indicator off.
    pub async fn typing_off(&self, recipient: &str) -> BotResult<serde_json::Value> {
        self.sender_action(recipient, SenderAction::TypingOff).await
    }

    /// Mark the last received message as seen.
    pub async fn mark_seen(&self, recipient: &str) -> BotResult<serde_json::Value> {
        self.sender_action(recipient, SenderAction::MarkSeen).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReceiptSummary;
    use serde_json::json;

    #[test]
    fn test_envelope_defaults_to_regular() {
        let envelope = build_envelope("U1", text_message("hi"), None);
        assert_eq!(
            envelope,
            json!({
                "recipient": { "id": "U1" },
                "message": { "text": "hi" },
                "notification_type": "REGULAR",
            })
        );
    }

    #[test]
    fn test_envelope_explicit_notification() {
        let envelope = build_envelope("U1", text_message("hi"), Some(NotificationType::NoPush));
        assert_eq!(envelope["notification_type"], "NO_PUSH");
        assert_eq!(envelope["recipient"]["id"], "U1");
    }

    #[test]
    fn test_image_and_audio_attachment_types() {
        let msg = attachment_message("image", "https://x.test/a.png");
        assert_eq!(msg["attachment"]["type"], "image");
        assert_eq!(msg["attachment"]["payload"]["url"], "https://x.test/a.png");

        let msg = attachment_message("audio", "https://x.test/a.mp3");
        assert_eq!(msg["attachment"]["type"], "audio");
    }

    // The video/file labels are crossed on the wire; pin the shipped
    // mapping.
    #[test]
    fn test_video_goes_out_as_file_and_file_as_video() {
        let msg = attachment_message("file", "https://x.test/clip.mp4");
        assert_eq!(msg["attachment"]["type"], "file");
        let msg = attachment_message("video", "https://x.test/doc.pdf");
        assert_eq!(msg["attachment"]["type"], "video");
    }

    #[test]
    fn test_button_template_shape() {
        let buttons = vec![
            Button::web_url("Open", "https://example.com"),
            Button::postback("Buy", "BUY_1"),
        ];
        let msg = button_template("Pick one", &buttons);
        let payload = &msg["attachment"]["payload"];
        assert_eq!(msg["attachment"]["type"], "template");
        assert_eq!(payload["template_type"], "button");
        assert_eq!(payload["text"], "Pick one");
        assert_eq!(payload["buttons"].as_array().unwrap().len(), 2);
        assert_eq!(payload["buttons"][1]["payload"], "BUY_1");
    }

    #[test]
    fn test_generic_template_shape() {
        let elements = vec![GenericElement {
            title: "Item".into(),
            subtitle: Some("Sub".into()),
            image_url: None,
            item_url: None,
            buttons: None,
        }];
        let msg = generic_template(&elements);
        let payload = &msg["attachment"]["payload"];
        assert_eq!(payload["template_type"], "generic");
        assert_eq!(payload["elements"][0]["title"], "Item");
        assert!(payload["elements"][0].get("image_url").is_none());
    }

    fn minimal_receipt(template_type: Option<String>) -> Receipt {
        Receipt {
            template_type,
            recipient_name: "Stephane".into(),
            order_number: "12345".into(),
            currency: "USD".into(),
            payment_method: "Visa 1234".into(),
            order_url: None,
            timestamp: None,
            elements: None,
            address: None,
            summary: ReceiptSummary {
                subtotal: None,
                shipping_cost: None,
                total_tax: None,
                total_cost: 56.14,
            },
            adjustments: None,
        }
    }

    #[test]
    fn test_receipt_template_type_defaulted() {
        let msg = receipt_template(&minimal_receipt(None));
        assert_eq!(msg["attachment"]["payload"]["template_type"], "receipt");
        assert_eq!(msg["attachment"]["payload"]["order_number"], "12345");
    }

    #[test]
    fn test_receipt_template_type_preserved() {
        let msg = receipt_template(&minimal_receipt(Some("custom_receipt".into())));
        assert_eq!(
            msg["attachment"]["payload"]["template_type"],
            "custom_receipt"
        );
    }

    #[test]
    fn test_list_template_is_compact() {
        let elements = vec![ListElement {
            title: "Row".into(),
            subtitle: None,
            image_url: None,
            default_action: None,
            buttons: None,
        }];
        let msg = list_template(&elements);
        let payload = &msg["attachment"]["payload"];
        assert_eq!(payload["template_type"], "list");
        assert_eq!(payload["top_element_style"], "compact");
        assert_eq!(payload["elements"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_quick_reply_message_shape() {
        let replies = vec![
            QuickReply::text("Red", "COLOR_RED"),
            QuickReply::text("Blue", "COLOR_BLUE"),
        ];
        let msg = quick_reply_message("Pick a colour", &replies);
        assert_eq!(msg["text"], "Pick a colour");
        assert_eq!(msg["quick_replies"].as_array().unwrap().len(), 2);
        assert_eq!(msg["quick_replies"][0]["payload"], "COLOR_RED");
    }

    #[test]
    fn test_location_request_shape() {
        let msg = location_request("Where are you?");
        assert_eq!(
            msg,
            json!({
                "text": "Where are you?",
                "quick_replies": [ { "content_type": "location" } ],
            })
        );
    }

    #[test]
    fn test_sender_action_body_shape() {
        let body = sender_action_body("U9", SenderAction::TypingOn);
        assert_eq!(
            body,
            json!({
                "recipient": { "id": "U9" },
                "sender_action": "typing_on",
            })
        );
    }

    #[test]
    fn test_text_send_wire_shape() {
        // The exact body a send_text("U1", "hi", None) puts on the wire.
        let envelope = build_envelope("U1", text_message("hi"), None);
        assert_eq!(
            envelope,
            json!({
                "recipient": { "id": "U1" },
                "message": { "text": "hi" },
                "notification_type": "REGULAR",
            })
        );
    }
}
