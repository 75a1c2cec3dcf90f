// Runtime configuration shared with the application layer

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub public_base_url: String,
    pub session_secret: String,
    pub session_ttl_minutes: u64,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
    pub ops_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl RuntimeConfig {
    /// Link printed into QR codes and emails for one registration.
    pub fn check_in_url(&self, registration_key: &str) -> String {
        format!(
            "{}/check-in/{}",
            self.public_base_url.trim_end_matches('/'),
            registration_key
        )
    }

    pub fn registration_url(&self, registration_key: &str) -> String {
        format!(
            "{}/registrations/{}",
            self.public_base_url.trim_end_matches('/'),
            registration_key
        )
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    Log,
    Smtp,
    Webhook,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
    pub timeout_seconds: u64,
}
