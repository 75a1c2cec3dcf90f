use chrono::{DateTime, Utc};

use crate::entities::{Attendee, CheckInStatus};

/// Outcome of a check-in attempt on an existing attendee.
#[derive(Debug, Clone)]
pub enum CheckInOutcome {
    CheckedIn(Attendee),
    AlreadyCheckedIn(Attendee),
}

impl CheckInOutcome {
    pub fn attendee(&self) -> &Attendee {
        match self {
            Self::CheckedIn(attendee) | Self::AlreadyCheckedIn(attendee) => attendee,
        }
    }

    pub fn is_first(&self) -> bool {
        matches!(self, Self::CheckedIn(_))
    }

    pub fn into_status(self) -> CheckInStatus {
        match self {
            Self::CheckedIn(attendee) => CheckInStatus {
                message: format!("{} checked in", attendee.name),
                attendee,
                already_checked_in: false,
            },
            Self::AlreadyCheckedIn(attendee) => CheckInStatus {
                message: format!("{} is already checked in", attendee.name),
                attendee,
                already_checked_in: true,
            },
        }
    }
}

/// One-way flip. Returns `false` and leaves the record untouched when the
/// attendee was already checked in.
pub fn check_in(attendee: &mut Attendee, now: DateTime<Utc>) -> bool {
    if attendee.checked_in {
        return false;
    }
    attendee.checked_in = true;
    attendee.checked_in_at = Some(now);
    attendee.updated_at = Some(now);
    true
}
