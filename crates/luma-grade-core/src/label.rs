use serde::{Deserialize, Serialize};
use std::fmt;

/// Brightness grade of a frame.
///
/// The discriminant order is a contract with model training: class index 0
/// is `Low`, 1 is `Optimal`, 2 is `High`. Weights trained against one
/// ordering silently misclassify under any other, so the mapping lives here
/// in one place and is covered by tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrightnessLabel {
    Low,
    Optimal,
    High,
}

impl BrightnessLabel {
    /// All labels in class-index order.
    pub const ALL: [Self; 3] = [Self::Low, Self::Optimal, Self::High];

    /// Label for a model class index, or `None` when the index is outside
    /// the known table.
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Class index used during training.
    #[inline]
    pub fn class_index(self) -> usize {
        self as usize
    }

    /// Wire/display form: exactly `"Low"`, `"Optimal"` or `"High"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Optimal => "Optimal",
            Self::High => "High",
        }
    }
}

impl fmt::Display for BrightnessLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
