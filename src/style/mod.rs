//! Pure mapping from a bar's height and the user's style choices to fill color, outline and glow.

pub(crate) mod color;
pub(crate) mod shape;

use std::str::FromStr;

use crate::foundation::error::VizError;

/// Color law applied to each bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorScheme {
    /// Green for quiet bars fading to red for loud ones.
    #[default]
    GreenRed,
    /// Cyan-blue to magenta.
    BluePurple,
    /// Hue sweep from blue (quiet) to red (loud).
    Rainbow,
    /// Constant white with height-dependent alpha.
    White,
    /// Purple to gold.
    PurpleGold,
    /// Light ocean blues.
    OceanBlue,
    /// Orange to pink.
    Sunset,
    /// Neon green to teal.
    Neon,
}

/// Outline of each bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarShape {
    /// Axis-aligned box.
    #[default]
    Rectangle,
    /// Box with a 4px radius on the leading corners.
    Rounded,
    /// Box with half-width radius on the leading corners.
    Pill,
    /// Isosceles triangle pointing away from the anchor edge.
    Triangle,
}

/// Frame edge the bars grow from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    /// Bars hang down from the top edge.
    Top,
    /// Bars grow up from the bottom edge.
    #[default]
    Bottom,
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for ColorScheme {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_name(s).as_str() {
            "greenred" => Self::GreenRed,
            "bluepurple" => Self::BluePurple,
            "rainbow" => Self::Rainbow,
            "white" => Self::White,
            "purplegold" => Self::PurpleGold,
            "oceanblue" => Self::OceanBlue,
            "sunset" => Self::Sunset,
            "neon" => Self::Neon,
            _ => {
                return Err(VizError::validation(format!("unknown color scheme '{s}'")));
            }
        })
    }
}

impl FromStr for BarShape {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_name(s).as_str() {
            "rectangle" | "rect" => Self::Rectangle,
            "rounded" => Self::Rounded,
            "pill" => Self::Pill,
            "triangle" => Self::Triangle,
            _ => return Err(VizError::validation(format!("unknown bar shape '{s}'"))),
        })
    }
}

impl FromStr for Anchor {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match normalize_name(s).as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => return Err(VizError::validation(format!("unknown bar position '{s}'"))),
        })
    }
}

pub use color::{BarColor, resolve_color};
pub use shape::{GLOW_RADIUS_PX, GlowStyle, ResolvedBar, resolve_bar, resolve_glow, resolve_path};

#[cfg(test)]
#[path = "../../tests/unit/style/names.rs"]
mod tests;
