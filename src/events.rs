//! Event categories and their wire-level names
//!
//! Every event delivered by the messaging SDK falls into one of the
//! categories below. Each category maps to exactly one wire event name, the
//! string the analytics sink receives. The mapping is total: categories this
//! crate does not recognize fall back to [`EventCategory::Unknown`] and the
//! `batch_unknown` sentinel name, so a newer SDK can never make the mapper
//! fail.
//!
//! # Usage Examples
//!
//! ```rust
//! use attribution_core::EventCategory;
//!
//! assert_eq!(EventCategory::NotificationOpen.wire_name(), "batch_notification_open");
//! assert!(EventCategory::NotificationOpen.is_notification_event());
//! assert!(EventCategory::MessagingClick.is_messaging_event());
//! assert!(!EventCategory::Unknown.is_messaging_event());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of an event received from the messaging SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// A push notification was opened by the user
    NotificationOpen,
    /// An in-app message was displayed
    MessagingShow,
    /// An in-app message was closed by the user
    MessagingClose,
    /// An in-app message closed itself after its auto-dismiss delay
    MessagingAutoClose,
    /// An in-app message failed to close cleanly
    MessagingCloseError,
    /// A link inside an in-app message's web view was activated
    MessagingWebViewClick,
    /// An in-app message's call-to-action was activated
    MessagingClick,
    /// Forward-compatibility fallback for categories introduced by a newer SDK
    Unknown,
}

impl EventCategory {
    /// Returns the fixed wire name sent to the analytics sink for this
    /// category. Total for every input, including [`EventCategory::Unknown`].
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventCategory::NotificationOpen => "batch_notification_open",
            EventCategory::MessagingShow => "batch_in_app_show",
            EventCategory::MessagingClose => "batch_in_app_close",
            EventCategory::MessagingAutoClose => "batch_in_app_auto_close",
            EventCategory::MessagingCloseError => "batch_in_app_close_error",
            EventCategory::MessagingWebViewClick => "batch_in_app_webview_click",
            EventCategory::MessagingClick => "batch_in_app_click",
            EventCategory::Unknown => "batch_unknown",
        }
    }

    /// True for categories produced by the push notification pipeline.
    pub fn is_notification_event(&self) -> bool {
        matches!(self, EventCategory::NotificationOpen)
    }

    /// True for categories produced by the in-app messaging pipeline.
    /// [`EventCategory::Unknown`] belongs to neither family.
    pub fn is_messaging_event(&self) -> bool {
        matches!(
            self,
            EventCategory::MessagingShow
                | EventCategory::MessagingClose
                | EventCategory::MessagingAutoClose
                | EventCategory::MessagingCloseError
                | EventCategory::MessagingWebViewClick
                | EventCategory::MessagingClick
        )
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
