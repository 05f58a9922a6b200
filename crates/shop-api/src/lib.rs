//! # shop-api
//!
//! HTTP API layer for the flower-shop storefront backend.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Greeting |
//! | GET | `/health` | Health check |
//! | POST | `/create-checkout-session` | Create Stripe checkout session |
//! | POST | `/send-purchase` | Purchase mails |
//! | POST | `/send-reservation` | Reservation mails |
//! | POST | `/send-email` | Contact form |
//! | POST | `/webhook` | Stripe webhook |
//! | GET | `/api/data` | Table rows |

pub mod handlers;
pub mod notify;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, LogFormat, Recipients};
