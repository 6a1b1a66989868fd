//! Attribute resolution and event dispatch
//!
//! This is the core of the crate: the deterministic field-resolution
//! algorithm that merges attribution data from a deep link's query string,
//! its fragment string, and the event's custom payload into one flat
//! [`AttributeSet`], and the orchestrator that hands the result to the
//! analytics sink.
//!
//! Two merge variants exist, one per event family:
//!
//! - **Notification** (push): defaults, then fragment overlay, then query
//!   overlay, then custom-payload overlay — later steps override earlier
//!   ones per field. The custom-payload step reads campaign, source and
//!   medium but not content; several integrations depend on that exact
//!   behavior, so it is kept as-is.
//! - **Messaging** (in-app): defaults, tracking id (which feeds both
//!   `utm_campaign` and `batch_tracking_id`), web-view analytics id, a
//!   content-only overlay from the deep link, then the custom-payload
//!   overlay for campaign, source and medium.
//!
//! A step only ever writes a field it can resolve to a non-empty scalar; it
//! never clears a previously set field.
//!
//! # Usage Examples
//!
//! ```rust
//! use attribution_core::{AttributeResolver, EventCategory, EventPayload};
//!
//! struct OpenedPush;
//!
//! impl EventPayload for OpenedPush {
//!     fn deeplink(&self) -> Option<&str> {
//!         Some("https://example.com?utm_campaign=spring_sale")
//!     }
//! }
//!
//! let resolver = AttributeResolver::new();
//! let attrs = resolver
//!     .resolve(EventCategory::NotificationOpen, &OpenedPush)
//!     .unwrap();
//!
//! assert_eq!(attrs["$source"].to_string(), "batch");
//! assert_eq!(attrs["utm_medium"].to_string(), "push");
//! assert_eq!(attrs["utm_campaign"].to_string(), "spring_sale");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::deeplink::DeeplinkParams;
use crate::events::EventCategory;
use crate::payload::{AttributeSet, EventPayload, PropertyValue};
use crate::sink::AnalyticsSink;

/// Well-known attribute keys and values.
///
/// The `utm_*` literals double as lookup keys for the fragment, query and
/// custom-payload reads and as output keys of the resolved attribute set.
pub mod keys {
    /// Integration marker key, always set to [`SOURCE_BATCH`].
    pub const INTEGRATION_ID: &str = "$source";
    pub const CAMPAIGN: &str = "utm_campaign";
    pub const SOURCE: &str = "utm_source";
    pub const MEDIUM: &str = "utm_medium";
    pub const CONTENT: &str = "utm_content";
    pub const TRACKING_ID: &str = "batch_tracking_id";
    pub const WEBVIEW_ANALYTICS_ID: &str = "batch_webview_analytics_id";

    pub const SOURCE_BATCH: &str = "batch";
    pub const MEDIUM_PUSH: &str = "push";
    pub const MEDIUM_IN_APP: &str = "in-app";
}

/// Resolves attribute sets for incoming events and forwards them to a sink.
///
/// The sink is optional: a resolver without one still resolves, and warns
/// once per instance the first time a dispatch has nowhere to go.
pub struct AttributeResolver {
    sink: Option<Arc<dyn AnalyticsSink>>,
    warned_missing_sink: AtomicBool,
}

impl AttributeResolver {
    /// Creates a resolver with no sink configured.
    pub fn new() -> Self {
        AttributeResolver {
            sink: None,
            warned_missing_sink: AtomicBool::new(false),
        }
    }

    /// Creates a resolver forwarding to the given sink.
    pub fn with_sink(sink: Arc<dyn AnalyticsSink>) -> Self {
        AttributeResolver {
            sink: Some(sink),
            warned_missing_sink: AtomicBool::new(false),
        }
    }

    /// Configures (or replaces) the sink.
    pub fn set_sink(&mut self, sink: Arc<dyn AnalyticsSink>) {
        self.sink = Some(sink);
    }

    /// Removes the configured sink.
    pub fn clear_sink(&mut self) {
        self.sink = None;
    }

    /// Resolves the attribute set for an event without forwarding it.
    ///
    /// Returns `None` for categories that belong to neither event family
    /// (absent, not empty) — the unknown sentinel still gets a wire name but
    /// carries no properties.
    pub fn resolve(
        &self,
        category: EventCategory,
        payload: &dyn EventPayload,
    ) -> Option<AttributeSet> {
        if category.is_notification_event() {
            Some(notification_attributes(payload))
        } else if category.is_messaging_event() {
            Some(messaging_attributes(payload))
        } else {
            None
        }
    }

    /// Resolves an event and hands `(wire name, attributes)` to the sink.
    ///
    /// With no sink configured the call is a no-op; the first such call per
    /// resolver instance logs a warning, repeats are suppressed. The warning
    /// flag is atomic so concurrent dispatches cannot double-log.
    pub fn dispatch(&self, category: EventCategory, payload: &dyn EventPayload) {
        let attributes = self.resolve(category, payload);

        match self.sink.as_deref() {
            Some(sink) => sink.track(category.wire_name(), attributes),
            None => {
                if !self.warned_missing_sink.swap(true, Ordering::Relaxed) {
                    warn!(
                        "no analytics sink configured, dropping {} event; \
                         set a sink on the resolver to forward events",
                        category.wire_name()
                    );
                }
            }
        }
    }
}

impl Default for AttributeResolver {
    fn default() -> Self {
        AttributeResolver::new()
    }
}

/// Builds the attribute set for a push notification event.
pub fn notification_attributes(payload: &dyn EventPayload) -> AttributeSet {
    let mut attrs = AttributeSet::new();

    // Default values
    attrs.insert(keys::INTEGRATION_ID.into(), keys::SOURCE_BATCH.into());
    attrs.insert(keys::MEDIUM.into(), keys::MEDIUM_PUSH.into());

    if let Some(deeplink) = payload.deeplink() {
        let link = DeeplinkParams::parse(deeplink);

        // Override with values from URL fragment parameters
        overlay_fragment(&mut attrs, &link, keys::CAMPAIGN, keys::CAMPAIGN);
        overlay_fragment(&mut attrs, &link, keys::SOURCE, keys::SOURCE);
        overlay_fragment(&mut attrs, &link, keys::MEDIUM, keys::MEDIUM);
        overlay_fragment(&mut attrs, &link, keys::CONTENT, keys::CONTENT);

        // Override with values from URL query parameters
        overlay_query(&mut attrs, &link, keys::CAMPAIGN, keys::CAMPAIGN);
        overlay_query(&mut attrs, &link, keys::SOURCE, keys::SOURCE);
        overlay_query(&mut attrs, &link, keys::MEDIUM, keys::MEDIUM);
        overlay_query(&mut attrs, &link, keys::CONTENT, keys::CONTENT);
    }

    // Override with values from the custom payload. Content is deliberately
    // not re-read here.
    overlay_custom(&mut attrs, payload, keys::CAMPAIGN, keys::CAMPAIGN);
    overlay_custom(&mut attrs, payload, keys::SOURCE, keys::SOURCE);
    overlay_custom(&mut attrs, payload, keys::MEDIUM, keys::MEDIUM);

    attrs
}

/// Builds the attribute set for an in-app messaging event.
pub fn messaging_attributes(payload: &dyn EventPayload) -> AttributeSet {
    let mut attrs = AttributeSet::new();

    // Default values
    attrs.insert(keys::INTEGRATION_ID.into(), keys::SOURCE_BATCH.into());
    attrs.insert(keys::MEDIUM.into(), keys::MEDIUM_IN_APP.into());

    if let Some(tracking_id) = payload.tracking_id().filter(|id| !id.is_empty()) {
        attrs.insert(keys::CAMPAIGN.into(), tracking_id.into());
        attrs.insert(keys::TRACKING_ID.into(), tracking_id.into());
    }

    if let Some(webview_id) = payload.web_view_analytics_id().filter(|id| !id.is_empty()) {
        attrs.insert(keys::WEBVIEW_ANALYTICS_ID.into(), webview_id.into());
    }

    // Only content is deep-link-sourced for messaging events; campaign,
    // source and medium come from the tracking id and the custom payload.
    if let Some(deeplink) = payload.deeplink() {
        let link = DeeplinkParams::parse(deeplink);
        overlay_fragment(&mut attrs, &link, keys::CONTENT, keys::CONTENT);
        overlay_query(&mut attrs, &link, keys::CONTENT, keys::CONTENT);
    }

    // Override with values from the custom payload
    overlay_custom(&mut attrs, payload, keys::CAMPAIGN, keys::CAMPAIGN);
    overlay_custom(&mut attrs, payload, keys::SOURCE, keys::SOURCE);
    overlay_custom(&mut attrs, payload, keys::MEDIUM, keys::MEDIUM);

    attrs
}

fn overlay_fragment(attrs: &mut AttributeSet, link: &DeeplinkParams, from_key: &str, to_key: &str) {
    if let Some(value) = link.fragment_value(from_key).filter(|v| !v.is_empty()) {
        attrs.insert(to_key.into(), value.into());
    }
}

fn overlay_query(attrs: &mut AttributeSet, link: &DeeplinkParams, from_key: &str, to_key: &str) {
    if let Some(value) = link.query_value(from_key).filter(|v| !v.is_empty()) {
        attrs.insert(to_key.into(), value.into());
    }
}

fn overlay_custom(attrs: &mut AttributeSet, payload: &dyn EventPayload, from_key: &str, to_key: &str) {
    let Some(value) = payload.custom_value(from_key).and_then(PropertyValue::from_json) else {
        return;
    };
    // an empty string is "unresolved", same as an absent value
    if matches!(&value, PropertyValue::String(s) if s.is_empty()) {
        return;
    }
    attrs.insert(to_key.into(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct TestPayload {
        deeplink: Option<String>,
        custom: Vec<(String, serde_json::Value)>,
    }

    impl EventPayload for TestPayload {
        fn deeplink(&self) -> Option<&str> {
            self.deeplink.as_deref()
        }

        fn custom_value(&self, key: &str) -> Option<serde_json::Value> {
            self.custom
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn notification_defaults() {
        let attrs = notification_attributes(&TestPayload::default());
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[keys::INTEGRATION_ID], "batch".into());
        assert_eq!(attrs[keys::MEDIUM], "push".into());
    }

    #[test]
    fn messaging_defaults() {
        let attrs = messaging_attributes(&TestPayload::default());
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[keys::INTEGRATION_ID], "batch".into());
        assert_eq!(attrs[keys::MEDIUM], "in-app".into());
    }

    #[test]
    fn notification_skips_content_from_custom_payload() {
        let payload = TestPayload {
            deeplink: None,
            custom: vec![
                ("utm_campaign".into(), json!("camp")),
                ("utm_content".into(), json!("never-read")),
            ],
        };

        let attrs = notification_attributes(&payload);
        assert_eq!(attrs[keys::CAMPAIGN], "camp".into());
        assert!(!attrs.contains_key(keys::CONTENT));
    }

    #[test]
    fn non_scalar_custom_value_leaves_field_unchanged() {
        let payload = TestPayload {
            deeplink: Some("https://batch.com?utm_source=fromquery".into()),
            custom: vec![("utm_source".into(), json!(["array", "value"]))],
        };

        let attrs = notification_attributes(&payload);
        assert_eq!(attrs[keys::SOURCE], "fromquery".into());
    }

    #[test]
    fn scalar_number_and_bool_custom_values_pass_through() {
        let payload = TestPayload {
            deeplink: None,
            custom: vec![
                ("utm_campaign".into(), json!(42)),
                ("utm_source".into(), json!(true)),
            ],
        };

        let attrs = notification_attributes(&payload);
        assert_eq!(attrs[keys::CAMPAIGN], PropertyValue::Integer(42));
        assert_eq!(attrs[keys::SOURCE], PropertyValue::Bool(true));
    }

    #[test]
    fn empty_string_custom_value_does_not_clear_field() {
        let payload = TestPayload {
            deeplink: Some("https://batch.com?utm_source=fromquery".into()),
            custom: vec![("utm_source".into(), json!(""))],
        };

        let attrs = notification_attributes(&payload);
        assert_eq!(attrs[keys::SOURCE], "fromquery".into());
    }

    #[test]
    fn resolve_is_absent_for_unknown_category() {
        let resolver = AttributeResolver::new();
        assert!(resolver
            .resolve(EventCategory::Unknown, &TestPayload::default())
            .is_none());
    }
}
