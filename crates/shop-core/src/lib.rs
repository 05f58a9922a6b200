//! # shop-core
//!
//! Core types and traits for the flower-shop storefront backend.
//!
//! This crate provides:
//! - `OrderRequest`, `PaymentMethod`, `ReservationRequest`, `ContactMessage`
//!   for the storefront forms
//! - `ProductSnapshot` and `Yen` for the product sent with each request
//! - `PaymentStrategy`, `Mailer` and `TableReader` adapter traits
//! - `ShopError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutUrls, OrderRequest, PaymentStrategy};
//!
//! let order: OrderRequest = serde_json::from_str(body)?;
//! let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app");
//! let session = strategy.create_checkout(&order, &urls).await?;
//!
//! // Hand session.session_id back to the storefront for the redirect
//! ```

pub mod error;
pub mod order;
pub mod product;
pub mod reservation;
pub mod strategy;

// Re-exports for convenience
pub use error::{ShopError, ShopResult};
pub use order::{
    metadata_keys, BankDetails, CardDetails, CheckoutSession, OrderRequest, PaymentMethod,
    WebhookEvent, WebhookEventType,
};
pub use product::{ProductSnapshot, Yen};
pub use reservation::{ContactMessage, ReservationRequest};
pub use strategy::{
    BoxedMailer, BoxedPaymentStrategy, BoxedTableReader, CheckoutUrls, Email, EmailBody, Mailer,
    PaymentStrategy, Row, TableReader,
};
