//! # pay-api
//!
//! HTTP API layer for the pricing and order-intake service.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Pricing, order and payment-status endpoints
//! - Enrollment acknowledgment and Razorpay webhook handling
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness probe |
//! | GET | `/health` | Health check |
//! | GET | `/api/pricing` | Current pricing and final price |
//! | POST | `/create_order` | Create gateway order (also `/api/create-order`, `/api/razorpay/order`) |
//! | GET | `/check_payment_status/{payment_id}` | Verified payment status |
//! | GET | `/api/user_transactions?email=` | Payment history for an email |
//! | POST | `/api/enroll` | Enrollment acknowledgment (also `/api/payment`) |
//! | POST | `/webhook/razorpay` | Razorpay webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
