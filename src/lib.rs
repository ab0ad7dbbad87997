//! FlexPay client library.
//!
//! A client for the Amazon Flexible Payments Service (FPS) REST API. The
//! crate does two things with real machinery and keeps everything else thin:
//!
//! - **Request signing**: canonicalizes a flat parameter set (sorted,
//!   percent-encoded, signature parameters stripped) and signs it with an
//!   HMAC keyed by the caller's secret, honoring the provider's legacy
//!   SHA-1 hint on redirect-back verification.
//! - **Response trees**: parses each XML response body in a single streaming
//!   pass into a generic, dynamically-shaped [`ResponseNode`] tree, dropping
//!   the wrapper envelope and capturing the `RequestId` correlation field.
//!
//! API operations (`Pay`, `Refund`, `Reserve`, ...) are flat parameter
//! builders over those two pieces, dispatched with an explicit
//! build → sign → send sequence.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexpay::{ChargeFeeTo, FlexPayClient};
//!
//! let client = FlexPayClient::sandbox("AKIA...", "secret...")?;
//! let result = client
//!     .pay("order-1", "sender-token", 9.99, ChargeFeeTo::Recipient)
//!     .await?;
//! if let Some(txn) = result.get_child("TransactionId") {
//!     println!("paid: {} (request {})", txn, result.request_id().unwrap_or("?"));
//! }
//! ```
//!
//! # Features
//!
//! - `tracing`: instrument the client operations with the `tracing` crate.

pub mod client;
pub mod config;
pub mod errors;
pub mod params;
pub mod prelude;
pub mod response;
pub mod signature;
pub mod types;

pub use client::{CbuiRequest, FlexPayClient};
pub use config::ApiConfig;
pub use errors::FlexPayError;
pub use params::{ParamValue, Params};
pub use response::{parse_response, ResponseNode};
pub use signature::{canonicalize, sign, SignatureMethod};
pub use types::{
    CbuiPipeline, CbuiStatus, ChargeFeeTo, CurrencyCode, PaymentMethod, RefundPolicy,
};

/// Common result alias for FlexPay operations.
pub type Result<T> = std::result::Result<T, FlexPayError>;
