//! Target matches reported by the on-screen detectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which detector produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// The weapon icon inside the open inventory grid.
    Inventory,
    /// The weapon icon on the hotbar.
    Hotbar,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inventory => f.write_str("inventory"),
            Self::Hotbar => f.write_str("hotbar"),
        }
    }
}

/// A located target: screen coordinates of its centre and detector confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetMatch {
    pub x: i32,
    pub y: i32,
    pub kind: TargetKind,
    pub confidence: f64,
}

/// Raw output of both detectors for a single screen capture.
///
/// Thresholding happens inside each detector; a `Some` here is already a
/// candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Detections {
    pub inventory: Option<TargetMatch>,
    pub hotbar: Option<TargetMatch>,
}

impl Detections {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Pick the candidate to act on.
    ///
    /// A sole candidate wins regardless of its confidence. When both
    /// detectors report, the strictly higher confidence wins and a tie goes
    /// to the inventory detector, which is consulted first.
    #[must_use]
    pub fn best(&self) -> Option<TargetMatch> {
        match (self.inventory, self.hotbar) {
            (Some(inventory), Some(hotbar)) => {
                if hotbar.confidence > inventory.confidence {
                    Some(hotbar)
                } else {
                    Some(inventory)
                }
            }
            (Some(only), None) | (None, Some(only)) => Some(only),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(kind: TargetKind, confidence: f64) -> TargetMatch {
        TargetMatch {
            x: 10,
            y: 20,
            kind,
            confidence,
        }
    }

    #[test]
    fn should_return_none_when_no_detector_reports() {
        assert_eq!(Detections::none().best(), None);
    }

    #[test]
    fn should_pick_sole_candidate_regardless_of_confidence() {
        let detections = Detections {
            inventory: None,
            hotbar: Some(candidate(TargetKind::Hotbar, 0.01)),
        };
        assert_eq!(detections.best().unwrap().kind, TargetKind::Hotbar);
    }

    #[test]
    fn should_pick_higher_confidence_when_both_report() {
        let detections = Detections {
            inventory: Some(candidate(TargetKind::Inventory, 0.80)),
            hotbar: Some(candidate(TargetKind::Hotbar, 0.95)),
        };
        assert_eq!(detections.best().unwrap().kind, TargetKind::Hotbar);
    }

    #[test]
    fn should_prefer_inventory_on_equal_confidence() {
        let detections = Detections {
            inventory: Some(candidate(TargetKind::Inventory, 0.9)),
            hotbar: Some(candidate(TargetKind::Hotbar, 0.9)),
        };
        assert_eq!(detections.best().unwrap().kind, TargetKind::Inventory);
    }
}
