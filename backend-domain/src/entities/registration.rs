// Registration and attendee records plus their request shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{BankAccount, Event, Location, Organizer, PurchaseItem};
use crate::value_objects::{
    AttendeeId, AttendeeRole, EventId, PaymentMethod, PaymentStatus, PurchaseItemId,
    RegistrationId, RegistrationKey, TeamId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: RegistrationId,
    pub registration_key: RegistrationKey,
    pub event_id: EventId,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub purchase_item_id: Option<PurchaseItemId>,
    pub total_amount: i64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatus,
    pub payment_screenshot_url: Option<String>,
    pub payment_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub id: AttendeeId,
    pub registration_id: RegistrationId,
    pub name: String,
    pub role: AttendeeRole,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Ownership chain of an attendee, used to authorize check-in.
#[derive(Debug, Clone)]
pub struct AttendeeScope {
    pub attendee: Attendee,
    pub event_id: EventId,
    pub team_id: TeamId,
}

/// Public registration submission. Fields stay loose so every problem is
/// reported as a validation failure rather than a decoding failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub purchase_item_id: Option<String>,
    #[serde(default)]
    pub total_amount: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub attendees: Vec<AttendeeInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// One evidence field of a payment report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EvidenceField {
    #[default]
    Unchanged,
    Clear,
    Set(String),
}

impl EvidenceField {
    /// Omitted keeps, null clears, blank text counts as null.
    pub fn from_wire(value: Option<Option<String>>) -> Self {
        match value {
            None => Self::Unchanged,
            Some(None) => Self::Clear,
            Some(Some(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Self::Clear
                } else {
                    Self::Set(trimmed.to_string())
                }
            }
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    pub fn apply_to(&self, slot: &mut Option<String>) {
        match self {
            Self::Unchanged => {}
            Self::Clear => *slot = None,
            Self::Set(value) => *slot = Some(value.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentEvidence {
    pub screenshot_url: EvidenceField,
    pub note: EvidenceField,
}

impl PaymentEvidence {
    pub fn sets_any(&self) -> bool {
        self.screenshot_url.is_set() || self.note.is_set()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEvidenceRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub screenshot_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub note: Option<Option<String>>,
}

impl From<PaymentEvidenceRequest> for PaymentEvidence {
    fn from(request: PaymentEvidenceRequest) -> Self {
        Self {
            screenshot_url: EvidenceField::from_wire(request.screenshot_url),
            note: EvidenceField::from_wire(request.note),
        }
    }
}

// Distinguishes an explicit `null` from an absent key.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusRequest {
    pub payment_status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: Registration,
    pub check_in_url: String,
    pub attendees: Vec<Attendee>,
}

/// Everything the key holder may see about their registration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDetails {
    pub registration: Registration,
    pub check_in_url: String,
    pub attendees: Vec<Attendee>,
    pub event: Event,
    pub purchase_item: Option<PurchaseItem>,
    pub location: Option<Location>,
    pub organizer: Option<Organizer>,
    pub bank_account: Option<BankAccount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationSummary {
    #[serde(flatten)]
    pub registration: Registration,
    pub attendee_count: u32,
    pub checked_in_count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInStatus {
    pub attendee: Attendee,
    pub already_checked_in: bool,
    pub message: String,
}
