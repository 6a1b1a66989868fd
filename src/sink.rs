//! Outbound analytics sink abstraction
//!
//! The destination analytics SDK is only ever referenced through this
//! minimal capability trait, so a test double or an alternate backend can be
//! substituted without touching resolution logic.

use crate::payload::AttributeSet;

/// Destination for resolved events.
///
/// `properties` is `None` when the event category produced no attribute set
/// (unknown categories), which is distinct from an empty map.
pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event_name: &str, properties: Option<AttributeSet>);
}
