use serde::{Deserialize, Serialize};

/// Outbound message payload in the WhatsApp Cloud API wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub messaging_product: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Template,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Template => "template",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateBody {
    pub name: String,
    pub language: LanguageCode,
    pub components: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCode {
    pub code: String,
}

impl MessagePayload {
    pub fn text(to: String, body: String) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: MessageKind::Text,
            text: Some(TextBody { body }),
            template: None,
        }
    }

    pub fn template(
        to: String,
        name: String,
        language_code: String,
        components: Vec<serde_json::Value>,
    ) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: MessageKind::Template,
            text: None,
            template: Some(TemplateBody {
                name,
                language: LanguageCode { code: language_code },
                components,
            }),
        }
    }
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendReceipt {
    pub message_id: String,
    pub phone: String,
    pub kind: MessageKind,
}

/// Strip control characters from user-supplied message text while keeping
/// emojis and formatting intact.
pub fn sanitize_message(message: &str) -> String {
    message
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_payload_serializes_to_wire_shape() {
        let payload = MessagePayload::text("+919876543210".to_string(), "Hello".to_string());
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messaging_product"], "whatsapp");
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"]["body"], "Hello");
        assert!(json.get("template").is_none());
    }

    #[test]
    fn template_payload_serializes_to_wire_shape() {
        let payload = MessagePayload::template(
            "+919876543210".to_string(),
            "booking_confirmed".to_string(),
            "en".to_string(),
            vec![],
        );
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "template");
        assert_eq!(json["template"]["name"], "booking_confirmed");
        assert_eq!(json["template"]["language"]["code"], "en");
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize_message("hi\u{0}there\u{7f}"), "hithere");
        assert_eq!(sanitize_message("  padded  "), "padded");
        assert_eq!(sanitize_message("line\none 🙏"), "line\none 🙏");
    }
}
