use std::collections::HashMap;

use crate::error::RelayError;
use crate::message::SendReceipt;
use crate::transport::{SendRequest, TransportSelector};
use crate::{phone, template};

/// Placeholder values for template rendering.
pub type Substitutions = HashMap<String, String>;

/// Contact details of the lead being messaged.
#[derive(Debug, Clone)]
pub struct LeadContact {
    pub name: String,
    pub whatsapp_number: String,
}

/// Render a template for a lead into a ready-to-send request. The lead's
/// name fills `{name}` unless the caller supplied its own value.
pub fn build_lead_request(
    lead: &LeadContact,
    template_key: &str,
    substitutions: &Substitutions,
) -> Result<SendRequest, RelayError> {
    let tpl = template::lookup(template_key)
        .ok_or_else(|| RelayError::UnknownTemplate(template_key.to_string()))?;

    let mut subs = substitutions.clone();
    subs.entry("name".to_string()).or_insert_with(|| lead.name.clone());

    let message = template::render(tpl.text, &subs);

    Ok(SendRequest {
        phone_number: phone::normalize(&lead.whatsapp_number),
        message: (!message.is_empty()).then_some(message),
        template_name: Some(tpl.name.to_string()),
        template_data: None,
    })
}

/// Format a template for a lead and dispatch it through the configured
/// transports.
pub async fn send_lead_message(
    selector: &TransportSelector,
    lead: &LeadContact,
    template_key: &str,
    substitutions: &Substitutions,
) -> Result<SendReceipt, RelayError> {
    let request = build_lead_request(lead, template_key, substitutions)?;
    selector.send(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use crate::transport::Transport;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    struct CapturingTransport {
        last: Mutex<Option<SendRequest>>,
    }

    #[async_trait]
    impl Transport for CapturingTransport {
        async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError> {
            *self.last.lock().await = Some(request.clone());
            Ok(SendReceipt {
                message_id: "wamid-test".to_string(),
                phone: request.phone_number.clone(),
                kind: MessageKind::Text,
            })
        }

        fn name(&self) -> &'static str {
            "capture"
        }
    }

    fn lead() -> LeadContact {
        LeadContact {
            name: "Asha".to_string(),
            whatsapp_number: "9876543210".to_string(),
        }
    }

    #[tokio::test]
    async fn renders_and_dispatches_the_template() {
        let capture = Arc::new(CapturingTransport {
            last: Mutex::new(None),
        });
        let selector = TransportSelector::new(None, capture.clone());

        let mut subs = Substitutions::new();
        subs.insert("tripName".to_string(), "Spiti Valley".to_string());

        send_lead_message(&selector, &lead(), "booking_confirmed", &subs)
            .await
            .unwrap();

        let sent = capture.last.lock().await.clone().unwrap();
        assert_eq!(sent.phone_number, "+919876543210");
        let body = sent.message.unwrap();
        assert!(body.contains("Asha"));
        assert!(body.contains("Spiti Valley"));
        assert!(!body.contains("{name}"));
    }

    #[tokio::test]
    async fn unknown_template_is_a_typed_error() {
        let capture = Arc::new(CapturingTransport {
            last: Mutex::new(None),
        });
        let selector = TransportSelector::new(None, capture);

        let err = send_lead_message(&selector, &lead(), "promo_blast", &Substitutions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::UnknownTemplate(_)));
    }
}
