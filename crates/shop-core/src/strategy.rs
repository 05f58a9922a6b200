//! # Adapter Traits
//!
//! Narrow interfaces for the three outbound dependencies of the shop.
//! Each is held as `Arc<dyn Trait>` in the API state so tests can swap in
//! mocks.
//!
//! ```text
//! ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐
//! │ PaymentStrategy  │  │      Mailer      │  │   TableReader    │
//! │ create_checkout  │  │      send        │  │   fetch_all      │
//! │ verify_webhook   │  │                  │  │                  │
//! └────────▲─────────┘  └────────▲─────────┘  └────────▲─────────┘
//!          │                     │                     │
//!  StripeCheckoutStrategy    SmtpMailer        MySqlTableReader
//! ```

use crate::error::ShopResult;
use crate::order::{CheckoutSession, OrderRequest, WebhookEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Payment provider integration.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session for a single-product order.
    ///
    /// # Arguments
    /// * `order` - The order to check out
    /// * `urls` - Where the provider redirects the customer afterwards
    async fn create_checkout(
        &self,
        order: &OrderRequest,
        urls: &CheckoutUrls,
    ) -> ShopResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Redirect targets after the hosted payment page
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Storefront base URL (e.g., "https://salone-new-flower.vercel.app")
    pub base_url: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

impl CheckoutUrls {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            success_path: "/success".to_string(),
            cancel_path: "/cancel".to_string(),
        }
    }

    /// Success URL with the provider's session id placeholder
    pub fn success_url(&self) -> String {
        format!(
            "{}{}?session_id={{CHECKOUT_SESSION_ID}}",
            self.base_url, self.success_path
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.base_url, self.cancel_path)
    }
}

/// Body of an outbound mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum EmailBody {
    Html(String),
    Text(String),
}

impl EmailBody {
    pub fn content(&self) -> &str {
        match self {
            EmailBody::Html(s) | EmailBody::Text(s) => s,
        }
    }
}

/// A fully composed mail, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: EmailBody,
}

impl Email {
    pub fn html(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            reply_to: None,
            subject: subject.into(),
            body: EmailBody::Html(html.into()),
        }
    }

    pub fn text(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            reply_to: None,
            subject: subject.into(),
            body: EmailBody::Text(text.into()),
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// Outbound mail transport. The sender address is owned by the
/// implementation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> ShopResult<()>;
}

pub type BoxedMailer = Arc<dyn Mailer>;

/// One table row as a JSON object keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Read-only access to the single backing table.
#[async_trait]
pub trait TableReader: Send + Sync {
    /// Every row currently in the table, unfiltered
    async fn fetch_all(&self) -> ShopResult<Vec<Row>>;
}

pub type BoxedTableReader = Arc<dyn TableReader>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app/");

        assert_eq!(
            urls.success_url(),
            "https://salone-new-flower.vercel.app/success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(urls.cancel_url(), "https://salone-new-flower.vercel.app/cancel");
    }

    #[test]
    fn test_email_builders() {
        let email = Email::text("shop@example.com", "山田", "こんにちは")
            .with_reply_to("yamada@example.com");

        assert_eq!(email.reply_to.as_deref(), Some("yamada@example.com"));
        assert_eq!(email.body.content(), "こんにちは");
        assert!(matches!(email.body, EmailBody::Text(_)));
    }
}
