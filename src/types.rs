//! Enumerated value domains used by the FPS API.
//!
//! Every type here is a closed set of wire tokens: `as_str` is the canonical
//! rendering sent to the service, and `FromStr` is the reverse lookup, which
//! fails with [`FlexPayError::UnknownValue`] on unrecognized input.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::FlexPayError;

/// Payment instruments available on FPS.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Credit card.
    Cc,
    /// Bank account withdrawal (ACH).
    Ach,
    /// Amazon Payments balance transfer.
    Abt,
}

impl PaymentMethod {
    /// All methods, in the order offered to CBUI senders by default.
    pub const ALL: [PaymentMethod; 3] = [Self::Abt, Self::Ach, Self::Cc];

    /// The wire token for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cc => "CC",
            Self::Ach => "ACH",
            Self::Abt => "ABT",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CC" => Ok(Self::Cc),
            "ACH" => Ok(Self::Ach),
            "ABT" => Ok(Self::Abt),
            other => Err(FlexPayError::UnknownValue {
                domain: "PaymentMethod",
                value: other.to_string(),
            }),
        }
    }
}

/// Pipelines offered by the Co-Branded User Interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CbuiPipeline {
    /// One-time payment pipeline.
    #[default]
    SingleUse,
    /// Token reusable across multiple payments.
    MultiUse,
    /// Payments of a fixed amount at regular intervals.
    Recurring,
    /// Caller acts as a third party between buyer and seller.
    Recipient,
    /// Prepaid instrument setup.
    SetupPrepaid,
    /// Postpaid instrument setup.
    SetupPostpaid,
    /// Edit an existing payment token.
    EditToken,
}

impl CbuiPipeline {
    /// The wire token for this pipeline.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleUse => "SingleUse",
            Self::MultiUse => "MultiUse",
            Self::Recurring => "Recurring",
            Self::Recipient => "Recipient",
            Self::SetupPrepaid => "SetupPrepaid",
            Self::SetupPostpaid => "SetupPostpaid",
            Self::EditToken => "EditToken",
        }
    }
}

impl fmt::Display for CbuiPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CbuiPipeline {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SingleUse" => Ok(Self::SingleUse),
            "MultiUse" => Ok(Self::MultiUse),
            "Recurring" => Ok(Self::Recurring),
            "Recipient" => Ok(Self::Recipient),
            "SetupPrepaid" => Ok(Self::SetupPrepaid),
            "SetupPostpaid" => Ok(Self::SetupPostpaid),
            "EditToken" => Ok(Self::EditToken),
            other => Err(FlexPayError::UnknownValue {
                domain: "CbuiPipeline",
                value: other.to_string(),
            }),
        }
    }
}

/// Status codes returned by the CBUI when the sender is redirected back.
///
/// `SA`/`SB`/`SC` are the success codes for the ABT, ACH, and credit-card
/// payment methods respectively; everything else is a failure or abandonment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CbuiStatus {
    /// Success with the ABT payment method.
    Sa,
    /// Success with the ACH (bank account) payment method.
    Sb,
    /// Success with the credit-card payment method.
    Sc,
    /// System error.
    Se,
    /// Buyer abandoned the pipeline.
    A,
    /// Caller exception.
    Ce,
    /// Payment method mismatch: the buyer lacks the requested method.
    Pe,
    /// Any number of additional problems.
    Np,
}

impl CbuiStatus {
    /// The wire token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sa => "SA",
            Self::Sb => "SB",
            Self::Sc => "SC",
            Self::Se => "SE",
            Self::A => "A",
            Self::Ce => "CE",
            Self::Pe => "PE",
            Self::Np => "NP",
        }
    }

    /// Whether the redirect reports a completed payment.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sa | Self::Sb | Self::Sc)
    }
}

impl fmt::Display for CbuiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CbuiStatus {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SA" => Ok(Self::Sa),
            "SB" => Ok(Self::Sb),
            "SC" => Ok(Self::Sc),
            "SE" => Ok(Self::Se),
            "A" => Ok(Self::A),
            "CE" => Ok(Self::Ce),
            "PE" => Ok(Self::Pe),
            "NP" => Ok(Self::Np),
            other => Err(FlexPayError::UnknownValue {
                domain: "CbuiStatus",
                value: other.to_string(),
            }),
        }
    }
}

/// Transaction currency. USD is the only currency FPS supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// United States dollars.
    #[default]
    Usd,
}

impl CurrencyCode {
    /// The wire token for this currency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USD" => Ok(Self::Usd),
            other => Err(FlexPayError::UnknownValue {
                domain: "CurrencyCode",
                value: other.to_string(),
            }),
        }
    }
}

/// Which party the transaction fee is charged to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeFeeTo {
    /// The payment recipient pays the fee.
    #[default]
    Recipient,
    /// The caller pays the fee.
    Caller,
}

impl ChargeFeeTo {
    /// The wire token for this fee target.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recipient => "Recipient",
            Self::Caller => "Caller",
        }
    }
}

impl fmt::Display for ChargeFeeTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChargeFeeTo {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Recipient" => Ok(Self::Recipient),
            "Caller" => Ok(Self::Caller),
            other => Err(FlexPayError::UnknownValue {
                domain: "ChargeFeeTo",
                value: other.to_string(),
            }),
        }
    }
}

/// Marketplace refund policy for the Refund operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundPolicy {
    /// Refund only the master transaction.
    #[default]
    MasterTxnOnly,
    /// Refund only the recipient transaction.
    RecipientTxnOnly,
    /// Refund both the master and recipient transactions.
    MasterAndRecipientTxn,
}

impl RefundPolicy {
    /// The wire token for this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MasterTxnOnly => "MasterTxnOnly",
            Self::RecipientTxnOnly => "RecipientTxnOnly",
            Self::MasterAndRecipientTxn => "MasterAndRecipientTxn",
        }
    }
}

impl fmt::Display for RefundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RefundPolicy {
    type Err = FlexPayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MasterTxnOnly" => Ok(Self::MasterTxnOnly),
            "RecipientTxnOnly" => Ok(Self::RecipientTxnOnly),
            "MasterAndRecipientTxn" => Ok(Self::MasterAndRecipientTxn),
            other => Err(FlexPayError::UnknownValue {
                domain: "RefundPolicy",
                value: other.to_string(),
            }),
        }
    }
}
