use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use validator::ValidateEmail;

use crate::entities::{Attendee, CreateRegistrationRequest, Event, PurchaseItem, Registration};
use crate::utils::normalize_optional_text;
use crate::value_objects::{
    AttendeeId, AttendeeRole, EventId, EventStatus, PaymentMethod, PaymentStatus, PurchaseItemId,
    RegistrationId, RegistrationKey,
};

/// Every problem found in a submission, reported together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl ValidationError {
    pub fn single(problem: impl Into<String>) -> Self {
        Self {
            problems: vec![problem.into()],
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.problems.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeDraft {
    pub name: String,
    pub role: AttendeeRole,
}

/// A submission that passed every field-level check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    pub event_id: EventId,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub purchase_item_id: Option<PurchaseItemId>,
    pub total_amount: i64,
    pub payment_method: Option<PaymentMethod>,
    pub attendees: Vec<AttendeeDraft>,
}

impl RegistrationDraft {
    /// Builds the rows to insert, with a fresh key and pending payment.
    pub fn into_records(self, now: DateTime<Utc>) -> (Registration, Vec<Attendee>) {
        let registration = Registration {
            id: RegistrationId::new(),
            registration_key: RegistrationKey::generate(),
            event_id: self.event_id,
            contact_name: self.contact_name,
            contact_phone: self.contact_phone,
            contact_email: self.contact_email,
            purchase_item_id: self.purchase_item_id,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_screenshot_url: None,
            payment_note: None,
            created_at: now,
            updated_at: None,
        };
        let attendees = self
            .attendees
            .into_iter()
            .map(|draft| Attendee {
                id: AttendeeId::new(),
                registration_id: registration.id,
                name: draft.name,
                role: draft.role,
                checked_in: false,
                checked_in_at: None,
                created_at: now,
                updated_at: None,
            })
            .collect();
        (registration, attendees)
    }
}

/// Field-level checks. Nothing here touches storage.
pub fn parse_registration(
    request: &CreateRegistrationRequest,
) -> Result<RegistrationDraft, ValidationError> {
    let mut problems = Vec::new();

    let event_id = match normalize_optional_text(request.event_id.as_deref()) {
        Some(raw) => match raw.parse::<EventId>() {
            Ok(id) => Some(id),
            Err(_) => {
                problems.push("eventId is not a valid id".to_string());
                None
            }
        },
        None => {
            problems.push("eventId is required".to_string());
            None
        }
    };

    let contact_name = required_text(&request.contact_name, "contactName", &mut problems);
    let contact_phone = required_text(&request.contact_phone, "contactPhone", &mut problems);
    let contact_email = required_text(&request.contact_email, "contactEmail", &mut problems);
    if !contact_email.is_empty() && !contact_email.validate_email() {
        problems.push("contactEmail is not a valid email address".to_string());
    }

    let total_amount = match parse_total_amount(request.total_amount.as_ref()) {
        Some(amount) => amount,
        None => {
            problems.push("totalAmount must be a positive integer".to_string());
            0
        }
    };

    let purchase_item_id = match normalize_optional_text(request.purchase_item_id.as_deref()) {
        Some(raw) => match raw.parse::<PurchaseItemId>() {
            Ok(id) => Some(id),
            Err(_) => {
                problems.push("purchaseItemId is not a valid id".to_string());
                None
            }
        },
        None => None,
    };

    let payment_method = match normalize_optional_text(request.payment_method.as_deref()) {
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(err) => {
                problems.push(format!("paymentMethod: {err}"));
                None
            }
        },
        None => None,
    };

    if request.attendees.is_empty() {
        problems.push("at least one attendee is required".to_string());
    }
    let mut attendees = Vec::with_capacity(request.attendees.len());
    for (index, input) in request.attendees.iter().enumerate() {
        let name = normalize_optional_text(input.name.as_deref());
        if name.is_none() {
            problems.push(format!("attendees[{index}].name is required"));
        }
        let role = match input.role.as_deref().map(str::parse::<AttendeeRole>) {
            Some(Ok(role)) => Some(role),
            Some(Err(_)) | None => {
                problems.push(format!(
                    "attendees[{index}].role must be one of Leader, Follower, Not sure"
                ));
                None
            }
        };
        if let (Some(name), Some(role)) = (name, role) {
            attendees.push(AttendeeDraft { name, role });
        }
    }

    match event_id {
        Some(event_id) if problems.is_empty() => Ok(RegistrationDraft {
            event_id,
            contact_name,
            contact_phone,
            contact_email,
            purchase_item_id,
            total_amount,
            payment_method,
            attendees,
        }),
        _ => Err(ValidationError { problems }),
    }
}

/// Checks that need the stored event and the referenced purchase item.
pub fn check_registration_target(
    draft: &RegistrationDraft,
    event: &Event,
    purchase_item: Option<&PurchaseItem>,
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();
    if event.status != EventStatus::Published {
        problems.push("event is not open for registration".to_string());
    }
    if let Some(item_id) = draft.purchase_item_id {
        match purchase_item {
            Some(item) if item.id == item_id && item.event_id == event.id => {}
            _ => problems.push("purchaseItemId does not belong to this event".to_string()),
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}

fn required_text(value: &Option<String>, field: &str, problems: &mut Vec<String>) -> String {
    match normalize_optional_text(value.as_deref()) {
        Some(text) => text,
        None => {
            problems.push(format!("{field} is required"));
            String::new()
        }
    }
}

fn parse_total_amount(value: Option<&Value>) -> Option<i64> {
    let amount = match value? {
        Value::Number(number) => number.as_i64()?,
        Value::String(text) => text.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (amount > 0).then_some(amount)
}
