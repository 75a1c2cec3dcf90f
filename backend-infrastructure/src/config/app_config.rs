use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, MailConfig, MailTransport, RuntimeConfig};

const ENV_PREFIX: &str = "TURNOUT_";
const MIN_SESSION_SECRET_BYTES: usize = 32;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub public_base_url: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub session_secret: String,
    pub allow_insecure_session_secret: bool,
    pub session_ttl_minutes: u64,
    pub session_cookie_name: String,
    pub session_cookie_secure: bool,
    pub ops_token: Option<String>,
    pub mail_transport: String,
    pub mail_from: String,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_webhook_url: Option<String>,
    pub mail_webhook_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_format: String,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            public_base_url: "http://127.0.0.1:3240".to_string(),
            database_url: None,
            database_max_connections: 10,
            session_secret: String::new(),
            allow_insecure_session_secret: false,
            session_ttl_minutes: 60 * 24 * 7,
            session_cookie_name: "turnout_session".to_string(),
            session_cookie_secure: false,
            ops_token: None,
            mail_transport: "log".to_string(),
            mail_from: "Turnout <no-reply@turnout.local>".to_string(),
            smtp_host: None,
            smtp_port: None,
            smtp_username: None,
            smtp_password: None,
            mail_webhook_url: None,
            mail_webhook_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            log_format: "text".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("TURNOUT_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!("{} not found, using defaults", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        if let Some(base_dir) = file_path.parent() {
            config.resolve_paths(base_dir);
        }
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        for slot in [
            &mut self.database_url,
            &mut self.ops_token,
            &mut self.smtp_host,
            &mut self.smtp_username,
            &mut self.smtp_password,
            &mut self.mail_webhook_url,
            &mut self.mail_webhook_token,
            &mut self.log_dir,
        ] {
            normalize_optional(slot);
        }
        self.mail_transport = self.mail_transport.trim().to_lowercase();
        self.log_format = self.log_format.trim().to_lowercase();
        self.public_base_url = self.public_base_url.trim().trim_end_matches('/').to_string();
        self.session_cookie_name = self.session_cookie_name.trim().to_string();
        if self.smtp_host.is_some() && self.smtp_port.is_none() {
            self.smtp_port = Some(587);
        }
    }

    pub fn resolve_paths(&mut self, base_dir: &Path) {
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base_dir, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.public_base_url.is_empty() {
            return Err(anyhow!("public_base_url must not be empty"));
        }
        if self.session_secret.len() < MIN_SESSION_SECRET_BYTES
            && !self.allow_insecure_session_secret
        {
            return Err(anyhow!(
                "session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            ));
        }
        if self.session_ttl_minutes == 0 {
            return Err(anyhow!("session_ttl_minutes must be greater than 0"));
        }
        if self.session_cookie_name.is_empty() {
            return Err(anyhow!("session_cookie_name must not be empty"));
        }
        if self.database_max_connections == 0 {
            return Err(anyhow!("database_max_connections must be greater than 0"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        match self.mail_transport()? {
            MailTransport::Smtp if self.smtp_host.is_none() => {
                return Err(anyhow!("mail_transport 'smtp' requires smtp_host"));
            }
            MailTransport::Webhook if self.mail_webhook_url.is_none() => {
                return Err(anyhow!("mail_transport 'webhook' requires mail_webhook_url"));
            }
            _ => {}
        }
        if self.log_format != "text" && self.log_format != "json" {
            return Err(anyhow!("log_format must be 'text' or 'json'"));
        }
        Ok(())
    }

    pub fn mail_transport(&self) -> Result<MailTransport> {
        match self.mail_transport.as_str() {
            "log" => Ok(MailTransport::Log),
            "smtp" => Ok(MailTransport::Smtp),
            "webhook" => Ok(MailTransport::Webhook),
            other => Err(anyhow!("unknown mail_transport '{}'", other)),
        }
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            public_base_url: self.public_base_url.clone(),
            session_secret: self.session_secret.clone(),
            session_ttl_minutes: self.session_ttl_minutes,
            session_cookie_name: self.session_cookie_name.clone(),
            session_cookie_secure: self.session_cookie_secure,
            ops_token: self.ops_token.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
        }
    }

    pub fn to_mail_config(&self) -> Result<MailConfig> {
        Ok(MailConfig {
            transport: self.mail_transport()?,
            from: self.mail_from.clone(),
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port.unwrap_or(587),
            smtp_username: self.smtp_username.clone(),
            smtp_password: self.smtp_password.clone(),
            webhook_url: self.mail_webhook_url.clone(),
            webhook_token: self.mail_webhook_token.clone(),
            timeout_seconds: self.request_timeout_seconds.max(3),
        })
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(format!("{ENV_PREFIX}{key}")).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Some(value) = lookup("PUBLIC_BASE_URL") {
            self.public_base_url = value;
        }
        if let Some(value) = lookup("DATABASE_URL") {
            self.database_url = Some(value);
        }
        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections = value.parse().unwrap_or(self.database_max_connections);
        }
        if let Some(value) = lookup("SESSION_SECRET") {
            self.session_secret = value;
        }
        if let Some(value) = lookup("ALLOW_INSECURE_SESSION_SECRET") {
            self.allow_insecure_session_secret =
                value.parse().unwrap_or(self.allow_insecure_session_secret);
        }
        if let Some(value) = lookup("SESSION_TTL_MINUTES") {
            self.session_ttl_minutes = value.parse().unwrap_or(self.session_ttl_minutes);
        }
        if let Some(value) = lookup("SESSION_COOKIE_NAME") {
            self.session_cookie_name = value;
        }
        if let Some(value) = lookup("SESSION_COOKIE_SECURE") {
            self.session_cookie_secure = value.parse().unwrap_or(self.session_cookie_secure);
        }
        if let Some(value) = lookup("OPS_TOKEN") {
            self.ops_token = Some(value);
        }
        if let Some(value) = lookup("MAIL_TRANSPORT") {
            self.mail_transport = value;
        }
        if let Some(value) = lookup("MAIL_FROM") {
            self.mail_from = value;
        }
        if let Some(value) = lookup("SMTP_HOST") {
            self.smtp_host = Some(value);
        }
        if let Some(value) = lookup("SMTP_PORT") {
            self.smtp_port = value.parse().ok().or(self.smtp_port);
        }
        if let Some(value) = lookup("SMTP_USERNAME") {
            self.smtp_username = Some(value);
        }
        if let Some(value) = lookup("SMTP_PASSWORD") {
            self.smtp_password = Some(value);
        }
        if let Some(value) = lookup("MAIL_WEBHOOK_URL") {
            self.mail_webhook_url = Some(value);
        }
        if let Some(value) = lookup("MAIL_WEBHOOK_TOKEN") {
            self.mail_webhook_token = Some(value);
        }
        if let Some(value) = lookup("MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Some(value) = lookup("REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Some(value) = lookup("LOG_FORMAT") {
            self.log_format = value;
        }
        if let Some(value) = lookup("LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn normalize_optional(slot: &mut Option<String>) {
    *slot = slot
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    let path = Path::new(trimmed);
    if path.is_absolute() || base.as_os_str().is_empty() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            session_secret: "s".repeat(MIN_SESSION_SECRET_BYTES),
            ..AppConfig::default()
        }
    }

    #[test]
    fn defaults_need_a_session_secret() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());

        let insecure = AppConfig {
            session_secret: "dev".to_string(),
            allow_insecure_session_secret: true,
            ..AppConfig::default()
        };
        assert!(insecure.validate().is_ok());
    }

    #[test]
    fn normalize_drops_blank_optionals() {
        let mut config = AppConfig {
            database_url: Some("   ".to_string()),
            ops_token: Some(" token ".to_string()),
            public_base_url: "https://tickets.example.org/".to_string(),
            mail_transport: " SMTP ".to_string(),
            smtp_host: Some("smtp.example.org".to_string()),
            ..valid()
        };
        config.normalize();
        assert_eq!(config.database_url, None);
        assert_eq!(config.ops_token.as_deref(), Some("token"));
        assert_eq!(config.public_base_url, "https://tickets.example.org");
        assert_eq!(config.smtp_port, Some(587));
        assert_eq!(config.mail_transport().expect("transport"), MailTransport::Smtp);
    }

    #[test]
    fn transport_requirements_are_enforced() {
        let mut webhook = AppConfig {
            mail_transport: "webhook".to_string(),
            ..valid()
        };
        assert!(webhook.validate().is_err());
        webhook.mail_webhook_url = Some("https://hooks.example.org/mail".to_string());
        assert!(webhook.validate().is_ok());

        let unknown = AppConfig {
            mail_transport: "pigeon".to_string(),
            ..valid()
        };
        assert!(unknown.validate().is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("DATABASE_URL", "postgres://turnout@db/turnout"),
            ("SESSION_TTL_MINUTES", "30"),
            ("SMTP_PORT", "not-a-port"),
        ]);
        let mut config = valid();
        config.apply_overrides(|key| vars.get(key).map(|value| value.to_string()));
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(
            config.to_db_config().database_url.as_deref(),
            Some("postgres://turnout@db/turnout")
        );
        assert_eq!(config.session_ttl_minutes, 30);
        assert_eq!(config.smtp_port, None);
    }
}
