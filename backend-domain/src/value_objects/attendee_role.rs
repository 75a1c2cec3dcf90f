// Attendee role value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendeeRole {
    Leader,
    Follower,
    #[serde(rename = "Not sure")]
    NotSure,
}

impl AttendeeRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendeeRole::Leader => "Leader",
            AttendeeRole::Follower => "Follower",
            AttendeeRole::NotSure => "Not sure",
        }
    }
}

impl fmt::Display for AttendeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendeeRole {
    type Err = UnknownVariant;

    /// Labels are matched exactly; they are shown verbatim in the registration form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Leader" => Ok(AttendeeRole::Leader),
            "Follower" => Ok(AttendeeRole::Follower),
            "Not sure" => Ok(AttendeeRole::NotSure),
            _ => Err(UnknownVariant::new("attendee role", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_sure_uses_label_with_space() {
        assert_eq!("Not sure".parse::<AttendeeRole>(), Ok(AttendeeRole::NotSure));
        let json = serde_json::to_string(&AttendeeRole::NotSure).expect("serialize");
        assert_eq!(json, "\"Not sure\"");
    }

    #[test]
    fn role_labels_are_case_sensitive() {
        assert!("leader".parse::<AttendeeRole>().is_err());
        assert!("NotSure".parse::<AttendeeRole>().is_err());
    }
}
