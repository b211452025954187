//! What the sonar bounced off.

use serde::{Deserialize, Serialize};

use super::alert::AlertMode;

/// Classification outcome for one signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectClass {
    /// Dataset label `R`.
    Rock,
    /// Dataset label `M` (metal cylinder). The dangerous outcome.
    Mine,
}

impl ObjectClass {
    /// Parse the dataset label column. Surrounding whitespace is ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "R" | "r" => Some(Self::Rock),
            "M" | "m" => Some(Self::Mine),
            _ => None,
        }
    }

    /// The dataset label for this class.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rock => "R",
            Self::Mine => "M",
        }
    }

    /// Text shown in the result box.
    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Rock => "The Object is ROCK",
            Self::Mine => "WARNING! It's a MINE",
        }
    }

    /// Text handed to the speech backend.
    #[must_use]
    pub const fn announcement(self) -> &'static str {
        match self {
            Self::Rock => "The Object is rock",
            Self::Mine => "WARNING It's a Mine",
        }
    }

    /// Mines get a repeating alert, rocks are announced once.
    #[must_use]
    pub const fn alert_mode(self) -> AlertMode {
        match self {
            Self::Rock => AlertMode::Once,
            Self::Mine => AlertMode::Continuous,
        }
    }

    #[must_use]
    pub const fn is_dangerous(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl std::fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rock => f.write_str("rock"),
            Self::Mine => f.write_str("mine"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for class in [ObjectClass::Rock, ObjectClass::Mine] {
            assert_eq!(ObjectClass::from_label(class.label()), Some(class));
        }
        assert_eq!(ObjectClass::from_label(" M "), Some(ObjectClass::Mine));
        assert_eq!(ObjectClass::from_label("X"), None);
    }

    #[test]
    fn only_mines_loop() {
        assert_eq!(ObjectClass::Rock.alert_mode(), AlertMode::Once);
        assert_eq!(ObjectClass::Mine.alert_mode(), AlertMode::Continuous);
        assert!(ObjectClass::Mine.is_dangerous());
        assert!(!ObjectClass::Rock.is_dangerous());
    }
}
