//! Notification texts.
//!
//! Every message the watcher sends is built here, so the loop never formats
//! user-visible text itself.

use crate::canonical::CanonicalKey;
use crate::diff::EventSet;

/// Sent at startup when the agenda is empty.
pub const NO_EVENTS: &str = "📋 No events at the moment.";

/// Heading of the startup summary.
pub const CURRENT_EVENTS_HEADING: &str = "📋 Current events:";

/// Sent when the operator stops the watcher.
pub const STOPPED_MANUALLY: &str = "⏹ Checker stopped manually.";

/// Sent when the loop dies on an unexpected error.
pub const CRASHED: &str = "❌ Checker crashed.";

/// Builds the startup summary of everything currently visible.
pub fn baseline_summary(events: &EventSet) -> String {
    if events.is_empty() {
        return NO_EVENTS.to_string();
    }

    let mut text = String::from(CURRENT_EVENTS_HEADING);
    for key in events {
        text.push('\n');
        text.push_str(&bulletize(key.as_str()));
    }
    text
}

/// Message for one entry that appeared since the last poll.
pub fn event_added(key: &CanonicalKey) -> String {
    format!("[NEW EVENT] {key}")
}

/// Message for one entry that disappeared since the last poll.
pub fn event_removed(key: &CanonicalKey) -> String {
    format!("[EVENT REMOVED] {key}")
}

/// Prefixes a line with a bullet.
pub fn bulletize(line: &str) -> String {
    format!("• {line}")
}
