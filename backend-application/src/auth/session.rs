use anyhow::anyhow;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use backend_domain::{Principal, UserId};

use crate::AppError;

const TOKEN_PREFIX: &str = "turnout";
const TOKEN_VERSION: &str = "v1";

type HmacSha256 = Hmac<Sha256>;

/// `turnout.v1.<user_id>.<expires_unix>.<hmac hex>`
pub fn issue_session_token(
    secret: &str,
    user_id: UserId,
    expires_at: DateTime<Utc>,
) -> Result<String, AppError> {
    let expires = expires_at.timestamp();
    let payload = signing_payload(user_id, expires);
    let mac = new_mac(secret)?;
    let signature = to_hex(&sign(mac, &payload));
    Ok(format!(
        "{}.{}.{}.{}.{}",
        TOKEN_PREFIX, TOKEN_VERSION, user_id, expires, signature
    ))
}

/// Resolves a token into its principal; `None` for forged, malformed or expired tokens.
pub fn verify_session_token(secret: &str, token: &str, now: DateTime<Utc>) -> Option<Principal> {
    let mut parts = token.trim().split('.');
    let (prefix, version, user, expires, signature) = (
        parts.next()?,
        parts.next()?,
        parts.next()?,
        parts.next()?,
        parts.next()?,
    );
    if parts.next().is_some() || prefix != TOKEN_PREFIX || version != TOKEN_VERSION {
        return None;
    }
    let user_id: UserId = user.parse().ok()?;
    let expires: i64 = expires.parse().ok()?;
    let signature = from_hex(signature)?;

    let mut mac = new_mac(secret).ok()?;
    mac.update(signing_payload(user_id, expires).as_bytes());
    mac.verify_slice(&signature).ok()?;

    if expires <= now.timestamp() {
        return None;
    }
    Some(Principal { user_id })
}

fn signing_payload(user_id: UserId, expires: i64) -> String {
    format!("{}|{}|{}|{}", TOKEN_PREFIX, TOKEN_VERSION, user_id, expires)
}

fn new_mac(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| AppError::Internal(anyhow!("hmac init failed: {err}")))
}

fn sign(mut mac: HmacSha256, payload: &str) -> Vec<u8> {
    mac.update(payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

fn from_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|idx| u8::from_str_radix(text.get(idx..idx + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_resolves_to_its_user() {
        let user_id = UserId::new();
        let now = Utc::now();
        let token = issue_session_token(SECRET, user_id, now + Duration::minutes(5)).expect("issue");
        assert!(token.starts_with("turnout.v1."));
        let principal = verify_session_token(SECRET, &token, now).expect("valid token");
        assert_eq!(principal.user_id, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token =
            issue_session_token(SECRET, UserId::new(), now - Duration::seconds(1)).expect("issue");
        assert!(verify_session_token(SECRET, &token, now).is_none());
    }

    #[test]
    fn tampered_or_foreign_tokens_are_rejected() {
        let now = Utc::now();
        let token =
            issue_session_token(SECRET, UserId::new(), now + Duration::hours(1)).expect("issue");
        let other_user = token.replacen(
            token.split('.').nth(2).expect("user segment"),
            &UserId::new().to_string(),
            1,
        );
        assert!(verify_session_token(SECRET, &other_user, now).is_none());
        assert!(verify_session_token("another-secret-another-secret-xx", &token, now).is_none());
        assert!(verify_session_token(SECRET, "turnout.v1.garbage", now).is_none());
    }

    #[test]
    fn hex_decoding_rejects_odd_or_non_hex() {
        assert_eq!(from_hex("0aff"), Some(vec![0x0a, 0xff]));
        assert!(from_hex("abc").is_none());
        assert!(from_hex("zz").is_none());
    }
}
