//! # Mail Configuration
//!
//! SMTP account and recipient addresses, loaded from environment variables.

use shop_core::ShopError;
use std::env;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP account and notification recipients
#[derive(Clone)]
pub struct MailConfig {
    /// Account used to authenticate and as the `From` address
    pub user: String,

    /// Account password (app password for Gmail)
    pub password: String,

    /// Receives purchase/reservation notices
    pub admin_email: String,

    /// Receives contact form messages
    pub receiver_email: String,

    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `EMAIL_USER`
    /// - `EMAIL_PASS`
    ///
    /// Optional: `ADMIN_EMAIL` (defaults to `EMAIL_USER`), `RECEIVER_EMAIL`
    /// (defaults to the admin address), `SMTP_HOST`, `SMTP_PORT`.
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok();

        let user = env::var("EMAIL_USER")
            .map_err(|_| ShopError::Configuration("EMAIL_USER not set".to_string()))?;
        let password = env::var("EMAIL_PASS")
            .map_err(|_| ShopError::Configuration("EMAIL_PASS not set".to_string()))?;

        let admin_email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| user.clone());
        let receiver_email = env::var("RECEIVER_EMAIL").unwrap_or_else(|_| admin_email.clone());

        let smtp_port = match env::var("SMTP_PORT") {
            Ok(port) => port.parse().map_err(|_| {
                ShopError::Configuration(format!("SMTP_PORT is not a port number: {}", port))
            })?,
            Err(_) => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            user,
            password,
            admin_email,
            receiver_email,
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            admin_email: user.clone(),
            receiver_email: user.clone(),
            user,
            password: password.into(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
        }
    }

    /// Port 587 speaks STARTTLS; everything else is implicit TLS
    pub fn uses_starttls(&self) -> bool {
        self.smtp_port == 587
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("admin_email", &self.admin_email)
            .field("receiver_email", &self.receiver_email)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}
