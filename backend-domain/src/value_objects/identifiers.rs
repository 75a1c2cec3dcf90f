// Identifier value objects

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! surrogate_id {
    ($($name:ident),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub Uuid);

            impl $name {
                pub fn new() -> Self {
                    Self(Uuid::new_v4())
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl FromStr for $name {
                type Err = uuid::Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Uuid::parse_str(s.trim()).map(Self)
                }
            }
        )+
    };
}

surrogate_id!(
    UserId,
    TeamId,
    EventId,
    RegistrationId,
    AttendeeId,
    PurchaseItemId,
    LocationId,
    OrganizerId,
    BankAccountId,
);

/// Bytes of entropy behind every public key; encodes to 16 URL-safe characters.
pub const PUBLIC_KEY_BYTES: usize = 12;

/// Random URL-safe text with no separators. Not re-checked against stored rows.
pub fn generate_public_token() -> String {
    let mut bytes = [0u8; PUBLIC_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn is_public_token(value: &str) -> bool {
    value.len() >= 16
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Bearer credential for one registration's public page and payment evidence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationKey(String);

impl RegistrationKey {
    pub fn generate() -> Self {
        Self(generate_public_token())
    }

    /// Wraps a value read back from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// Accepts a key from untrusted input; `None` when it cannot be one we issued.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        is_public_token(trimmed).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shareable key for an event's public registration page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn generate() -> Self {
        Self(generate_public_token())
    }

    /// Wraps a value read back from storage.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        is_public_token(trimmed).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_keys_are_url_safe_and_long_enough() {
        let key = RegistrationKey::generate();
        assert_eq!(key.as_str().len(), 16);
        assert!(key
            .as_str()
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'));
    }

    #[test]
    fn generated_keys_do_not_repeat() {
        let keys = (0..2_000)
            .map(|_| PublicKey::generate())
            .collect::<HashSet<_>>();
        assert_eq!(keys.len(), 2_000);
    }

    #[test]
    fn parse_rejects_short_or_foreign_text() {
        assert!(RegistrationKey::parse("short").is_none());
        assert!(RegistrationKey::parse("has space in the key!!").is_none());
        let key = RegistrationKey::generate();
        let padded = format!("  {}  ", key.as_str());
        assert_eq!(RegistrationKey::parse(&padded), Some(key));
    }

    #[test]
    fn surrogate_ids_parse_from_uuid_text() {
        let id = AttendeeId::new();
        let parsed: AttendeeId = id.to_string().parse().expect("parse id");
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<AttendeeId>().is_err());
    }
}
