//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types for quick setup:
//!
//! ```rust,ignore
//! use flexpay::prelude::*;
//! ```

// Client and configuration
pub use crate::client::{CbuiRequest, FlexPayClient};
pub use crate::config::ApiConfig;

// Error handling
pub use crate::errors::FlexPayError;
pub use crate::Result;

// Request parameters and signing
pub use crate::params::{ParamValue, Params};
pub use crate::signature::SignatureMethod;

// Response trees
pub use crate::response::ResponseNode;

// Enumerated value domains
pub use crate::types::{
    CbuiPipeline, CbuiStatus, ChargeFeeTo, CurrencyCode, PaymentMethod, RefundPolicy,
};
