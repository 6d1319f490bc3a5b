use std::collections::HashMap;

/// A canned message with `{placeholder}` tokens.
pub struct MessageTemplate {
    pub name: &'static str,
    pub text: &'static str,
}

/// The fixed template registry. Placeholders: {name}, {tripName},
/// {date}, {guests}, {amount}, {location}.
pub const TEMPLATES: &[MessageTemplate] = &[
    MessageTemplate {
        name: "welcome",
        text: "Namaste {name}! 🙏\n\nGreetings from *Tripnezt* - Your Trusted Travel Partner!\n\nThank you for your interest in our travel packages.\n\nHow can I assist you today?\n\n*Why Choose Tripnezt?*\n✓ Authentic India Experiences\n✓ Best Prices Guaranteed\n✓ 24/7 Support\n✓ Verified Local Partners\n\nLooking forward to plan your next adventure! 🌍✈️",
    },
    MessageTemplate {
        name: "booking_confirmed",
        text: "🎉 Your booking has been confirmed!\n\nDear {name},\n\nThank you for choosing Tripnezt for your travel adventure.\n\n*Booking Details:*\n📍 Trip: {tripName}\n📅 Date: {date}\n👥 Guests: {guests}\n\nWe will send you detailed information shortly.\n\nFor any queries, feel free to reach out!",
    },
    MessageTemplate {
        name: "payment_reminder",
        text: "💰 Payment Reminder\n\nDear {name},\n\nThis is a friendly reminder regarding your pending payment for {tripName}.\n\n*Amount Due: {amount}*\n\nPlease complete the payment to confirm your booking.\n\nIf you have any questions, please let us know!",
    },
    MessageTemplate {
        name: "trip_reminder",
        text: "✈️ Trip Reminder\n\nDear {name},\n\nYour exciting journey ({tripName}) is just around the corner!\n\n📅 Departure: {date}\n📍 Meeting Point: {location}\n\n*Please ensure:*\n✓ All travel documents are ready\n✓ Payment is completed\n✓ Packing is done\n\nSee you soon! 🌍",
    },
    MessageTemplate {
        name: "follow_up",
        text: "👋 Following up on your inquiry\n\nDear {name},\n\nWe wanted to check if you have any questions about our travel packages.\n\nOur team is here to help you plan the perfect trip!\n\n*Special Offer:* Book within 48 hours and get 10% off on select packages.\n\nFeel free to reach out!",
    },
    MessageTemplate {
        name: "custom",
        text: "",
    },
];

pub fn lookup(key: &str) -> Option<&'static MessageTemplate> {
    TEMPLATES.iter().find(|t| t.name == key)
}

/// Text sent when a template name arrives without a message body;
/// unknown keys fall back to the welcome text.
pub fn default_message(template_name: &str) -> &'static str {
    match lookup(template_name) {
        Some(t) if !t.text.is_empty() => t.text,
        _ => TEMPLATES[0].text,
    }
}

/// Literal `{placeholder}` substitution.
///
/// Placeholders without a supplied value are left intact rather than
/// failing the render.
pub fn render(text: &str, substitutions: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (key, value) in substitutions {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn welcome_substitutes_name() {
        let template = lookup("welcome").unwrap();
        let rendered = render(template.text, &subs(&[("name", "Asha")]));
        assert!(rendered.contains("Asha"));
        assert!(!rendered.contains("{name}"));
    }

    #[test]
    fn unresolved_placeholders_stay_literal() {
        let template = lookup("booking_confirmed").unwrap();
        let rendered = render(template.text, &subs(&[("name", "Asha")]));
        assert!(rendered.contains("{tripName}"));
        assert!(rendered.contains("{date}"));
    }

    #[test]
    fn all_placeholders_resolve() {
        let template = lookup("trip_reminder").unwrap();
        let rendered = render(
            template.text,
            &subs(&[
                ("name", "Asha"),
                ("tripName", "Spiti Valley"),
                ("date", "14 Mar 2026"),
                ("location", "Manali"),
            ]),
        );
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(lookup("promo_blast").is_none());
    }

    #[test]
    fn default_message_falls_back_to_welcome() {
        assert_eq!(default_message("no_such_template"), lookup("welcome").unwrap().text);
        assert_eq!(default_message("custom"), lookup("welcome").unwrap().text);
        assert_eq!(
            default_message("payment_reminder"),
            lookup("payment_reminder").unwrap().text
        );
    }
}
