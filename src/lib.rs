//! # attribution-core — event attribution for messaging SDK events
//!
//! This crate translates analytics event notifications coming out of a
//! mobile push/in-app messaging SDK into a normalized, flat property set for
//! a third-party analytics SDK. The substance is the deterministic
//! field-resolution algorithm: attribution data can arrive from a deep
//! link's query string, the deep link's fragment, and the event's custom
//! payload, and the three sources are merged per field with strict
//! precedence (defaults, then fragment, then query, then custom payload).
//!
//! The surrounding SDKs stay out of the picture: the producer is anything
//! implementing [`EventPayload`], the consumer anything implementing
//! [`AnalyticsSink`]. Resolution itself is pure and synchronous — no I/O, no
//! persistence, no background work.
//!
//! ## Usage Examples
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use attribution_core::{
//!     AnalyticsSink, AttributeResolver, AttributeSet, EventCategory, EventPayload,
//! };
//!
//! // The event producer's payload, reduced to the capability trait.
//! struct OpenedPush;
//!
//! impl EventPayload for OpenedPush {
//!     fn deeplink(&self) -> Option<&str> {
//!         Some("https://example.com?utm_campaign=spring_sale&utm_source=crm")
//!     }
//! }
//!
//! // A sink that records what it is asked to track.
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<(String, Option<AttributeSet>)>>);
//!
//! impl AnalyticsSink for Recorder {
//!     fn track(&self, event_name: &str, properties: Option<AttributeSet>) {
//!         self.0.lock().unwrap().push((event_name.to_string(), properties));
//!     }
//! }
//!
//! let recorder = Arc::new(Recorder::default());
//! let resolver = AttributeResolver::with_sink(recorder.clone());
//!
//! resolver.dispatch(EventCategory::NotificationOpen, &OpenedPush);
//!
//! let tracked = recorder.0.lock().unwrap();
//! let (name, attrs) = &tracked[0];
//! assert_eq!(name, "batch_notification_open");
//! let attrs = attrs.as_ref().unwrap();
//! assert_eq!(attrs["$source"].to_string(), "batch");
//! assert_eq!(attrs["utm_campaign"].to_string(), "spring_sale");
//! assert_eq!(attrs["utm_source"].to_string(), "crm");
//! ```

pub mod deeplink;
pub mod error;
pub mod events;
pub mod payload;
pub mod resolver;
pub mod sink;

pub use deeplink::DeeplinkParams;
pub use error::{AttributionError, Result};
pub use events::EventCategory;
pub use payload::{AttributeSet, EventPayload, PropertyValue};
pub use resolver::{keys, messaging_attributes, notification_attributes, AttributeResolver};
pub use sink::AnalyticsSink;
