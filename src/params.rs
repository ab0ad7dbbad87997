//! Request parameter sets.
//!
//! An FPS request is a flat, unordered mapping from parameter name to value.
//! Values are typed at the edges (text, integers, monetary amounts, enumerated
//! tokens) and rendered to canonical wire text before signing; ordering is
//! imposed later, by canonicalization, never by the map itself.

use std::collections::HashMap;

use crate::errors::FlexPayError;
use crate::types::{
    CbuiPipeline, CbuiStatus, ChargeFeeTo, CurrencyCode, PaymentMethod, RefundPolicy,
};
use crate::Result;

/// A single request parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Free-form text.
    Text(String),
    /// An integral value.
    Int(i64),
    /// A monetary amount. Must be finite to render.
    Amount(f64),
}

impl ParamValue {
    /// Canonical wire text for this value.
    ///
    /// The only failure is a non-finite amount, which has no wire rendering.
    pub fn render(&self) -> Result<String> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Int(i) => Ok(i.to_string()),
            Self::Amount(a) if a.is_finite() => Ok(format!("{}", a)),
            Self::Amount(a) => Err(FlexPayError::Encoding {
                parameter: String::new(),
                reason: format!("amount {} has no canonical text form", a),
            }),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(a: f64) -> Self {
        Self::Amount(a)
    }
}

impl From<PaymentMethod> for ParamValue {
    fn from(v: PaymentMethod) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<CbuiPipeline> for ParamValue {
    fn from(v: CbuiPipeline) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<CbuiStatus> for ParamValue {
    fn from(v: CbuiStatus) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<CurrencyCode> for ParamValue {
    fn from(v: CurrencyCode) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<ChargeFeeTo> for ParamValue {
    fn from(v: ChargeFeeTo) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

impl From<RefundPolicy> for ParamValue {
    fn from(v: RefundPolicy) -> Self {
        Self::Text(v.as_str().to_string())
    }
}

/// An unordered set of request parameters.
///
/// Map semantics enforce the no-duplicate-names invariant: inserting a name
/// twice replaces the earlier value.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: HashMap<String, ParamValue>,
}

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any earlier value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Insert a parameter only when a value is present.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<impl Into<ParamValue>>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries.get(name)
    }

    /// Remove a parameter by name, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.entries.remove(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over parameters in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render every parameter to `(name, text)` pairs, in unspecified order.
    ///
    /// Fails with [`FlexPayError::Encoding`] naming the offending parameter
    /// if any value has no canonical text form.
    pub fn render(&self) -> Result<Vec<(String, String)>> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (name, value) in &self.entries {
            let text = match value.render() {
                Ok(text) => text,
                Err(FlexPayError::Encoding { reason, .. }) => {
                    return Err(FlexPayError::Encoding {
                        parameter: name.clone(),
                        reason,
                    })
                }
                Err(err) => return Err(err),
            };
            pairs.push((name.clone(), text));
        }
        Ok(pairs)
    }
}
