// Payment status value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Reported,
    Confirmed,
    Rejected,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Reported,
        PaymentStatus::Confirmed,
        PaymentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Reported => "reported",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "reported" => Ok(PaymentStatus::Reported),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "rejected" => Ok(PaymentStatus::Rejected),
            _ => Err(UnknownVariant::new("payment status", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_wire_value() {
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>(), Ok(status));
        }
        assert_eq!(" Confirmed ".parse::<PaymentStatus>(), Ok(PaymentStatus::Confirmed));
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "paid".parse::<PaymentStatus>().expect_err("unknown status");
        assert_eq!(err.value, "paid");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Reported).expect("serialize");
        assert_eq!(json, "\"reported\"");
    }
}
