// Outbound mail and the payment confirmation it carries

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{RegistrationId, RegistrationKey};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
}

#[derive(Debug, Clone)]
pub struct PaymentConfirmationNotice {
    pub registration_id: RegistrationId,
    pub registration_key: RegistrationKey,
    pub contact_name: String,
    pub contact_email: String,
    pub total_amount: i64,
    pub event_title: Option<String>,
    pub event_starts_at: Option<DateTime<Utc>>,
    pub location_name: Option<String>,
    pub registration_url: String,
}

impl PaymentConfirmationNotice {
    pub fn to_email(&self) -> OutboundEmail {
        let title = self.event_title.as_deref().unwrap_or("your event");
        let mut body = format!(
            "Hi {},\n\nYour payment of {} for {} has been confirmed.\n",
            self.contact_name, self.total_amount, title
        );
        if let Some(starts_at) = self.event_starts_at {
            body.push_str(&format!("When: {}\n", starts_at.format("%Y-%m-%d %H:%M UTC")));
        }
        if let Some(location) = &self.location_name {
            body.push_str(&format!("Where: {location}\n"));
        }
        body.push_str(&format!(
            "\nYour registration and check-in code: {}\n",
            self.registration_url
        ));
        OutboundEmail {
            to: self.contact_email.clone(),
            subject: format!("Payment confirmed: {title}"),
            text_body: body,
        }
    }
}

/// Result of one delivery attempt, kept for the ops view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDeliveryRecord {
    pub registration_id: RegistrationId,
    pub recipient: String,
    pub transport: String,
    pub success: bool,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_mentions_event_details_when_known() {
        let notice = PaymentConfirmationNotice {
            registration_id: RegistrationId::new(),
            registration_key: RegistrationKey::generate(),
            contact_name: "Ada".to_string(),
            contact_email: "ada@example.com".to_string(),
            total_amount: 500,
            event_title: Some("Friday Social".to_string()),
            event_starts_at: None,
            location_name: Some("Hall B".to_string()),
            registration_url: "https://turnout.test/registrations/k".to_string(),
        };
        let email = notice.to_email();
        assert_eq!(email.to, "ada@example.com");
        assert_eq!(email.subject, "Payment confirmed: Friday Social");
        assert!(email.text_body.contains("Where: Hall B"));
        assert!(!email.text_body.contains("When:"));
    }
}
