//! Marker — the substring that identifies a trigger line in the game log.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Chat line the game prints when the weapon is knocked out of hand.
pub const WEAPON_KNOCKED_OUT: &str = "У вас выбили оружие из рук!";

/// A non-empty substring searched for in each log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Marker(String);

impl Marker {
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyMarker`] when `pattern` is empty.
    pub fn new(pattern: impl Into<String>) -> Result<Self, ValidationError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(ValidationError::EmptyMarker);
        }
        Ok(Self(pattern))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a single log line contains the marker.
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        line.contains(self.0.as_str())
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self(WEAPON_KNOCKED_OUT.to_string())
    }
}

impl TryFrom<String> for Marker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Marker> for String {
    fn from(marker: Marker) -> Self {
        marker.0
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_empty_marker() {
        assert_eq!(Marker::new(""), Err(ValidationError::EmptyMarker));
    }

    #[test]
    fn should_match_line_containing_default_marker() {
        let marker = Marker::default();
        assert!(marker.matches("[12:01:33] [CHAT] У вас выбили оружие из рук!"));
        assert!(!marker.matches("[12:01:34] [CHAT] Hello"));
    }

    #[test]
    fn should_match_custom_marker_anywhere_in_line() {
        let marker = Marker::new("disarmed").unwrap();
        assert!(marker.matches("you were disarmed by a goblin"));
    }
}
