//! # checkout-api
//!
//! HTTP API layer for paypal-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints wrapping the six Checkout V2 operations
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v2/orders` | Create order |
//! | GET | `/api/v2/orders/{order_id}` | Get order |
//! | POST | `/api/v2/orders/{order_id}/capture` | Capture order |
//! | POST | `/api/v2/orders/{order_id}/authorize` | Authorize order |
//! | POST | `/api/v2/authorizations/{authorization_id}/capture` | Capture authorization |
//! | POST | `/api/v2/captures/{capture_id}/refund` | Refund capture |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
