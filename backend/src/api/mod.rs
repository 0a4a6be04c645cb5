//! # REST API Module
//!
//! HTTP endpoints of the vault backend.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | API information |
//! | GET | `/health` | Health check |
//! | POST | `/vault/initialize` | Create the owner's vault |
//! | POST | `/vault/deposit` | Deposit lamports |
//! | POST | `/vault/withdraw` | Withdraw lamports |
//! | POST | `/vault/close` | Close the vault |
//! | POST | `/vault/submit` | Relay a signed transaction |
//! | GET | `/vault/balance/{owner}` | Get vault balance |
//! | GET | `/vault/addresses/{owner}` | Derived vault addresses |
//!
//! ## Request/Response Format
//!
//! All requests and responses use JSON:
//!
//! ```json
//! // Success response
//! {
//!     "success": true,
//!     "data": { ... }
//! }
//!
//! // Error response
//! {
//!     "success": false,
//!     "error": {
//!         "code": "ERROR_CODE",
//!         "message": "Human readable message"
//!     }
//! }
//! ```

pub mod handlers;
pub mod routes;

pub use routes::configure_routes;
