//! Raw agenda entries as read from the rendered page.
//!
//! A [`RawEvent`] is produced fresh on every poll by a content provider and
//! consumed immediately by the canonicalizer. It is never persisted.

use serde::{Deserialize, Serialize};

/// One agenda card as rendered on the observed page.
///
/// Text fields hold whatever the page showed. Missing elements are `None`;
/// the canonicalizer treats an empty string the same as a missing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Start time as displayed, usually `HH:MM`.
    pub time_start: String,

    /// End time as displayed, if the card shows one.
    #[serde(default)]
    pub time_end: Option<String>,

    /// Card title. Unlabeled entries carry the generic placeholder `"Event"`.
    #[serde(default)]
    pub title: Option<String>,

    /// Card description.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the card carries the mandatory-attendance badge.
    #[serde(default)]
    pub is_mandatory: bool,
}

impl RawEvent {
    /// Creates a raw event with only a start time.
    pub fn new(time_start: impl Into<String>) -> Self {
        Self {
            time_start: time_start.into(),
            time_end: None,
            title: None,
            description: None,
            is_mandatory: false,
        }
    }

    /// Builder: set the end time.
    pub fn with_end(mut self, time_end: impl Into<String>) -> Self {
        self.time_end = Some(time_end.into());
        self
    }

    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the mandatory flag.
    pub fn with_mandatory(mut self, is_mandatory: bool) -> Self {
        self.is_mandatory = is_mandatory;
        self
    }

    /// Returns the trimmed end time, or `None` when absent or blank.
    pub fn end(&self) -> Option<&str> {
        non_blank(self.time_end.as_deref())
    }

    /// Returns the trimmed title, or `None` when absent or blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Returns the trimmed description, or `None` when absent or blank.
    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let event = RawEvent::new("09:00")
            .with_end("10:00")
            .with_title("Standup")
            .with_description("Daily sync")
            .with_mandatory(true);

        assert_eq!(event.time_start, "09:00");
        assert_eq!(event.end(), Some("10:00"));
        assert_eq!(event.title(), Some("Standup"));
        assert_eq!(event.description(), Some("Daily sync"));
        assert!(event.is_mandatory);
    }

    #[test]
    fn blank_fields_read_as_missing() {
        let event = RawEvent::new("09:00")
            .with_end("  ")
            .with_title("")
            .with_description("\n\t");

        assert_eq!(event.end(), None);
        assert_eq!(event.title(), None);
        assert_eq!(event.description(), None);
    }

    #[test]
    fn deserializes_with_missing_optionals() {
        let event: RawEvent = serde_json::from_str(r#"{"time_start":"11:00"}"#).unwrap();
        assert_eq!(event, RawEvent::new("11:00"));
    }
}
