//! Global anomaly intensity knob.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Anomaly intensity level, always within `0..=3`.
///
/// Serialized as a bare integer; out-of-range values are rejected on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AnomalyIntensity(u8);

impl AnomalyIntensity {
    pub const CALM: Self = Self(0);
    pub const UNSETTLING: Self = Self(1);
    pub const UNSTABLE: Self = Self(2);
    pub const CATASTROPHIC: Self = Self(3);

    /// Highest representable level.
    pub const MAX_LEVEL: u8 = 3;

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "Calm",
            1 => "Unsettling",
            2 => "Unstable",
            _ => "Catastrophic",
        }
    }

    /// Every level in ascending order.
    pub fn all() -> [Self; 4] {
        [
            Self::CALM,
            Self::UNSETTLING,
            Self::UNSTABLE,
            Self::CATASTROPHIC,
        ]
    }
}

impl Default for AnomalyIntensity {
    fn default() -> Self {
        Self::UNSTABLE
    }
}

/// Requested intensity is outside `0..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityOutOfRange(pub u8);

impl Display for IntensityOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "anomaly intensity {} is out of range; expected 0..={}",
            self.0,
            AnomalyIntensity::MAX_LEVEL
        )
    }
}

impl Error for IntensityOutOfRange {}

impl TryFrom<u8> for AnomalyIntensity {
    type Error = IntensityOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX_LEVEL {
            return Err(IntensityOutOfRange(value));
        }
        Ok(Self(value))
    }
}

impl From<AnomalyIntensity> for u8 {
    fn from(value: AnomalyIntensity) -> Self {
        value.0
    }
}
