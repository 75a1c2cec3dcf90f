use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

use backend_application::auth::verify_session_token;
use backend_application::AppState;
use backend_domain::{Principal, RuntimeConfig};

use crate::error::HttpError;

/// Resolves the caller from a bearer token or the session cookie.
/// Runs before any resource lookup.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, HttpError> {
    let token = extract_bearer(headers)
        .or_else(|| extract_cookie(headers, &state.config.session_cookie_name))
        .ok_or(HttpError::Unauthenticated)?;
    verify_session_token(&state.config.session_secret, &token, Utc::now())
        .ok_or(HttpError::Unauthenticated)
}

/// Ops endpoints are open when no `ops_token` is configured.
pub fn authorize_ops(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(ops_token) = &config.ops_token {
        return extract_bearer(headers)
            .map(|v| v == *ops_token)
            .unwrap_or(false);
    }
    true
}

pub fn session_cookie(config: &RuntimeConfig, token: &str, expires_at: DateTime<Utc>) -> String {
    let max_age = (expires_at - Utc::now()).num_seconds().max(0);
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, token, max_age
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(config: &RuntimeConfig) -> String {
    let mut cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie_name
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn config(ops_token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            public_base_url: "http://localhost:3240".to_string(),
            session_secret: "s".repeat(32),
            session_ttl_minutes: 60,
            session_cookie_name: "turnout_session".to_string(),
            session_cookie_secure: true,
            ops_token: ops_token.map(str::to_string),
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn bearer_requires_prefix_and_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer  abc "));
        assert_eq!(extract_bearer(&headers).as_deref(), Some("abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_none());
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer(&headers).is_none());
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; turnout_session=tok.en; other=1"),
        );
        assert_eq!(
            extract_cookie(&headers, "turnout_session").as_deref(),
            Some("tok.en")
        );
        assert!(extract_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn ops_token_gates_only_when_configured() {
        let mut headers = HeaderMap::new();
        assert!(authorize_ops(&config(None), &headers));
        assert!(!authorize_ops(&config(Some("ops")), &headers));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer ops"));
        assert!(authorize_ops(&config(Some("ops")), &headers));
    }

    #[test]
    fn cookies_carry_the_session_flags() {
        let config = config(None);
        let cookie = session_cookie(&config, "tok", Utc::now() + chrono::Duration::minutes(5));
        assert!(cookie.starts_with("turnout_session=tok; Path=/; HttpOnly; SameSite=Lax"));
        assert!(cookie.ends_with("; Secure"));
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
    }
}
