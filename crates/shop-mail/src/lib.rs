//! # shop-mail
//!
//! Transactional mail for the flower-shop backend.
//!
//! - `templates` composes the customer and admin mails for purchases,
//!   reservations, completed payments and the contact form
//! - `smtp` delivers them through an authenticated SMTP relay
//! - `format` holds the card masking and Japanese date helpers

pub mod config;
pub mod format;
pub mod smtp;
pub mod templates;

pub use config::MailConfig;
pub use format::{format_date, mask_card_number};
pub use smtp::SmtpMailer;
