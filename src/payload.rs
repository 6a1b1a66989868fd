//! Inbound event payloads and scalar property values
//!
//! The messaging SDK hands us an opaque payload per event. This module
//! defines the minimal capability trait the resolver needs from it
//! ([`EventPayload`]), the scalar value type the analytics sink accepts
//! ([`PropertyValue`]), and the flat output map ([`AttributeSet`]).
//!
//! Custom-payload values arrive as [`serde_json::Value`] because their shape
//! is outside our control; only simple scalars survive the conversion into a
//! [`PropertyValue`], everything else is rejected by
//! [`PropertyValue::from_json`].
//!
//! # Usage Examples
//!
//! ```rust
//! use attribution_core::{EventPayload, PropertyValue};
//! use serde_json::json;
//!
//! struct OpenedPush;
//!
//! impl EventPayload for OpenedPush {
//!     fn deeplink(&self) -> Option<&str> {
//!         Some("https://example.com?utm_campaign=spring_sale")
//!     }
//!
//!     fn custom_value(&self, key: &str) -> Option<serde_json::Value> {
//!         (key == "utm_source").then(|| json!("crm"))
//!     }
//! }
//!
//! assert_eq!(
//!     PropertyValue::from_json(json!("crm")),
//!     Some(PropertyValue::String("crm".into()))
//! );
//! assert_eq!(PropertyValue::from_json(json!(["not", "scalar"])), None);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Flat, ordered property map handed to the analytics sink.
///
/// Built fresh per dispatch and never mutated afterwards. A `BTreeMap` keeps
/// iteration deterministic, so identical payloads serialize identically.
pub type AttributeSet = BTreeMap<String, PropertyValue>;

/// A simple scalar property value.
///
/// The analytics sink accepts strings, numbers and booleans; nothing nested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl PropertyValue {
    /// Converts a JSON value into a scalar property value.
    ///
    /// Returns `None` for arrays, objects and null — non-scalar custom
    /// payload values are silently skipped by the merger rather than
    /// flattened or stringified.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Some(PropertyValue::String(s)),
            serde_json::Value::Bool(b) => Some(PropertyValue::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(PropertyValue::Integer(i))
                } else {
                    n.as_f64().map(PropertyValue::Float)
                }
            }
            _ => None,
        }
    }

    /// Returns the string contents if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => f.write_str(s),
            PropertyValue::Integer(i) => write!(f, "{i}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(x: f64) -> Self {
        PropertyValue::Float(x)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Capability trait over the messaging SDK's event payload.
///
/// Every accessor defaults to `None`, so producers (and test doubles) only
/// implement the fields an event actually carries.
pub trait EventPayload {
    /// Tracking identifier attached to an in-app campaign, if any.
    fn tracking_id(&self) -> Option<&str> {
        None
    }

    /// Analytics identifier of the web view an in-app click originated from.
    fn web_view_analytics_id(&self) -> Option<&str> {
        None
    }

    /// Raw deep-link string delivered with the event. May carry surrounding
    /// whitespace; the resolver trims it before parsing.
    fn deeplink(&self) -> Option<&str> {
        None
    }

    /// Looks up a value from the event's custom key-value payload.
    fn custom_value(&self, key: &str) -> Option<serde_json::Value> {
        let _ = key;
        None
    }
}
