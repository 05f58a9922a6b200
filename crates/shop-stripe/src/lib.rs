//! # shop-stripe
//!
//! Stripe adapter for the flower-shop backend.
//!
//! - **StripeCheckoutStrategy** creates hosted Checkout Sessions for a single
//!   product with free domestic shipping, and verifies webhook signatures.
//! - **webhook** turns a verified `checkout.session.completed` event back
//!   into the order that was attached as session metadata.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeCheckoutStrategy;
//! use shop_core::{CheckoutUrls, PaymentStrategy};
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app");
//! let session = strategy.create_checkout(&order, &urls).await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use shop_stripe::{dispatch_webhook_event, CheckoutCompletedData, WebhookHandler};
//!
//! struct Notify;
//!
//! #[async_trait]
//! impl WebhookHandler for Notify {
//!     async fn on_checkout_completed(&self, data: CheckoutCompletedData) -> ShopResult<()> {
//!         println!("{} paid {}", data.order().name, data.amount_total);
//!         Ok(())
//!     }
//! }
//!
//! let event = strategy.verify_webhook(payload, signature).await?;
//! dispatch_webhook_event(&Notify, event).await?;
//! ```

pub mod checkout;
pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use signature::{signature_header, verify_signature};
pub use webhook::{
    dispatch_webhook_event, CheckoutCompletedData, WebhookHandler,
};
