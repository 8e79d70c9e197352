use std::fmt;

use crate::style::ColorScheme;

/// Straight-alpha RGBA8 fill color of one bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BarColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl BarColor {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Alpha as a fraction in `[0, 1]`.
    pub fn alpha(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Premultiplied RGBA8 bytes.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let p = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), a);
        [p(self.r), p(self.g), p(self.b), self.a]
    }
}

/// CSS color syntax: `rgb(r, g, b)` when opaque, `rgba(r, g, b, a)` otherwise.
impl fmt::Display for BarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.alpha()
            )
        }
    }
}

fn channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Relative height `bar / max`, clamped to `[0, 1]`. Degenerate inputs map to 0.
pub(crate) fn relative_height(bar_height_px: f64, max_bar_height_px: f64) -> f64 {
    if max_bar_height_px.is_nan() || max_bar_height_px <= 0.0 || !bar_height_px.is_finite() {
        return 0.0;
    }
    (bar_height_px / max_bar_height_px).clamp(0.0, 1.0)
}

/// Fill color for a bar of `bar_height_px` under `scheme`.
pub fn resolve_color(bar_height_px: f64, max_bar_height_px: f64, scheme: ColorScheme) -> BarColor {
    let p = relative_height(bar_height_px, max_bar_height_px);
    match scheme {
        ColorScheme::GreenRed => BarColor::rgb(channel(255.0 * p), channel(255.0 * (1.0 - p)), 0),
        ColorScheme::BluePurple => BarColor::rgb(
            channel(255.0 * p),
            channel(100.0 + 155.0 * (1.0 - p)),
            255,
        ),
        ColorScheme::Rainbow => hsl_full(240.0 * (1.0 - p)),
        ColorScheme::PurpleGold => BarColor::rgb(
            channel(147.0 + 108.0 * p),
            channel(51.0 + 191.0 * p),
            channel(234.0 - 198.0 * p),
        ),
        ColorScheme::OceanBlue => BarColor::rgb(
            channel(14.0 + 59.0 * p),
            channel(165.0 - 35.0 * p),
            channel(233.0 + 13.0 * p),
        ),
        ColorScheme::Sunset => BarColor::rgb(
            channel(249.0 - 13.0 * p),
            channel(115.0 - 43.0 * p),
            channel(22.0 + 131.0 * p),
        ),
        ColorScheme::Neon => BarColor::rgb(
            channel(34.0 - 14.0 * p),
            channel(197.0 - 13.0 * p),
            channel(94.0 + 72.0 * p),
        ),
        ColorScheme::White => BarColor {
            r: 255,
            g: 255,
            b: 255,
            a: channel((0.3 + 0.7 * p) * 255.0),
        },
    }
}

// hsl(hue, 100%, 50%)
fn hsl_full(hue_deg: f64) -> BarColor {
    let h = hue_deg.rem_euclid(360.0) / 60.0;
    let x = 1.0 - ((h % 2.0) - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    BarColor::rgb(channel(r * 255.0), channel(g * 255.0), channel(b * 255.0))
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
