//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the configuration and the three outbound adapters.

use axum::http::HeaderValue;
use shop_core::{
    BoxedMailer, BoxedPaymentStrategy, BoxedTableReader, CheckoutUrls, ShopError, ShopResult,
};
use shop_db::MySqlTableReader;
use shop_mail::{MailConfig, SmtpMailer};
use shop_stripe::StripeCheckoutStrategy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Storefront origin allowed by CORS when `CORS_ORIGIN` is unset
pub const DEFAULT_CORS_ORIGIN: &str = "https://salone-new-flower.vercel.app";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ShopError::Configuration(format!(
                "LOG_FORMAT must be pretty or json, got {}",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// The one browser origin allowed to call the API
    pub cors_origin: String,
    /// Storefront base URL for the checkout redirects
    pub frontend_url: String,
    /// Directory served for unmatched GET requests
    pub static_dir: Option<PathBuf>,
    /// Also mail the contact form sender a copy
    pub contact_copy_to_sender: bool,
    pub log_format: LogFormat,
}

/// Strip the trailing slash browsers never send in `Origin`
pub fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

fn parse_bool(key: &str, raw: &str) -> ShopResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(ShopError::Configuration(format!(
            "{} must be true or false, got {}",
            key, other
        ))),
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> ShopResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let port = match std::env::var("PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ShopError::Configuration(format!("PORT is not a port number: {}", p)))?,
            Err(_) => defaults.port,
        };

        let cors_origin = std::env::var("CORS_ORIGIN")
            .map(|o| normalize_origin(&o))
            .unwrap_or(defaults.cors_origin);
        HeaderValue::from_str(&cors_origin).map_err(|_| {
            ShopError::Configuration(format!("CORS_ORIGIN is not a valid origin: {}", cors_origin))
        })?;

        let frontend_url = std::env::var("FRONTEND_URL")
            .map(|u| normalize_origin(&u))
            .unwrap_or_else(|_| cors_origin.clone());

        let contact_copy_to_sender = match std::env::var("CONTACT_COPY_TO_SENDER") {
            Ok(raw) => parse_bool("CONTACT_COPY_TO_SENDER", &raw)?,
            Err(_) => false,
        };

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port,
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            cors_origin,
            frontend_url,
            static_dir: std::env::var("STATIC_DIR")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from),
            contact_copy_to_sender,
            log_format,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ShopResult<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            ShopError::Configuration(format!("Invalid bind address {}:{}", self.host, self.port))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            frontend_url: DEFAULT_CORS_ORIGIN.to_string(),
            static_dir: None,
            contact_copy_to_sender: false,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Where shop-side notifications go
#[derive(Debug, Clone)]
pub struct Recipients {
    /// Purchase, reservation and payment notices
    pub admin: String,
    /// Contact form messages
    pub receiver: String,
}

impl From<&MailConfig> for Recipients {
    fn from(config: &MailConfig) -> Self {
        Self {
            admin: config.admin_email.clone(),
            receiver: config.receiver_email.clone(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub payments: BoxedPaymentStrategy,
    pub mailer: BoxedMailer,
    pub table: BoxedTableReader,
    pub recipients: Recipients,
    /// Checkout redirect targets on the storefront
    pub urls: CheckoutUrls,
}

impl AppState {
    /// Assemble state from already-built adapters
    pub fn new(
        config: AppConfig,
        payments: BoxedPaymentStrategy,
        mailer: BoxedMailer,
        table: BoxedTableReader,
        recipients: Recipients,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.frontend_url);
        Self {
            config,
            payments,
            mailer,
            table,
            recipients,
            urls,
        }
    }

    /// Build the Stripe, SMTP and MySQL adapters from the environment.
    /// Must run inside the tokio runtime.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let stripe = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let mail_config = MailConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load mail settings: {}", e))?;
        let mailer = SmtpMailer::new(&mail_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize SMTP: {}", e))?;

        let table = MySqlTableReader::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize MySQL: {}", e))?;

        Ok(Self::new(
            config,
            Arc::new(stripe),
            Arc::new(mailer),
            Arc::new(table),
            Recipients::from(&mail_config),
        ))
    }
}
