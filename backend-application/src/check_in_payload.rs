// QR payloads: a check-in URL or a bare registration key

use backend_domain::RegistrationKey;

const CHECK_IN_SEGMENT: &str = "/check-in/";

/// Extracts the registration key. The payload is only a lookup hint and is
/// not trusted beyond that.
pub fn parse_check_in_payload(payload: &str) -> Option<RegistrationKey> {
    let trimmed = payload.trim();
    let candidate = match trimmed.rfind(CHECK_IN_SEGMENT) {
        Some(idx) => {
            let rest = &trimmed[idx + CHECK_IN_SEGMENT.len()..];
            rest.split(['?', '#', '/']).next().unwrap_or_default()
        }
        None => trimmed,
    };
    RegistrationKey::parse(candidate)
}
