//! One-click adjustment presets.
//!
//! A preset overwrites only the fields it names; everything else keeps
//! its current value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Adjustments;

/// A named bundle of adjustment values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Brighter, punchier, more colorful.
    Vibrant,
    /// Lighter and flatter with a slight blur.
    Soft,
    /// Strong sharpening plus edge enhancement.
    MaxSharpness,
}

impl Preset {
    /// All presets, in display order.
    pub const ALL: [Self; 3] = [Self::Vibrant, Self::Soft, Self::MaxSharpness];

    /// Kebab-case identifier, as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vibrant => "vibrant",
            Self::Soft => "soft",
            Self::MaxSharpness => "max-sharpness",
        }
    }

    /// Label for buttons and menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vibrant => "Vibrant",
            Self::Soft => "Soft",
            Self::MaxSharpness => "Max Sharpness",
        }
    }

    /// Overwrite the fields this preset controls.
    pub fn apply_to(self, adjustments: &mut Adjustments) {
        match self {
            Self::Vibrant => {
                adjustments.brightness = 1.1;
                adjustments.contrast = 1.3;
                adjustments.saturation = 1.4;
            }
            Self::Soft => {
                adjustments.brightness = 1.2;
                adjustments.contrast = 0.9;
                adjustments.blur_radius = 0.8;
            }
            Self::MaxSharpness => {
                adjustments.sharpness = 1.8;
                adjustments.contrast = 1.2;
                adjustments.enhance_edges = true;
            }
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned by [`Preset::from_str`] for an unknown name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset {0:?} (expected vibrant, soft or max-sharpness)")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

impl Adjustments {
    /// Copy of `self` with `preset` applied.
    #[must_use]
    pub fn with_preset(mut self, preset: Preset) -> Self {
        preset.apply_to(&mut self);
        self
    }
}
