use kurbo::{RoundedRect, RoundedRectRadii, Shape};

use crate::config::VisualizerSettings;
use crate::foundation::core::{BezPath, Point, Rect};
use crate::style::color::{BarColor, resolve_color};
use crate::style::{Anchor, BarShape};

/// Blur radius of the glow halo in pixels.
pub const GLOW_RADIUS_PX: f64 = 15.0;

const ROUNDED_CORNER_RADIUS_PX: f64 = 4.0;
const PATH_TOLERANCE: f64 = 0.1;

/// Halo drawn behind a bar, colored like its fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlowStyle {
    /// Blur radius in pixels.
    pub radius_px: f64,
    /// Halo color (same as the fill).
    pub color: BarColor,
}

/// Everything needed to paint one bar.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedBar {
    /// Fill color.
    pub color: BarColor,
    /// Outline in canvas pixels; empty for zero-height bars.
    pub path: BezPath,
    /// Optional halo.
    pub glow: Option<GlowStyle>,
}

/// Outline of a bar whose bounding box is `(x, y, width, height)` (top-left origin).
///
/// The leading edge is the one facing away from `anchor`: the top edge for bottom-anchored bars
/// and the bottom edge for top-anchored ones. Only leading corners are rounded.
pub fn resolve_path(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    shape: BarShape,
    anchor: Anchor,
) -> BezPath {
    if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
        return BezPath::new();
    }
    let rect = Rect::new(x, y, x + width, y + height);
    match shape {
        BarShape::Rectangle => rect.to_path(PATH_TOLERANCE),
        BarShape::Rounded => leading_rounded(rect, ROUNDED_CORNER_RADIUS_PX, anchor),
        BarShape::Pill => leading_rounded(rect, width / 2.0, anchor),
        BarShape::Triangle => {
            let mid = x + width / 2.0;
            let (base_y, apex_y) = match anchor {
                Anchor::Bottom => (y + height, y),
                Anchor::Top => (y, y + height),
            };
            let mut path = BezPath::new();
            path.move_to(Point::new(x, base_y));
            path.line_to(Point::new(mid, apex_y));
            path.line_to(Point::new(x + width, base_y));
            path.close_path();
            path
        }
    }
}

fn leading_rounded(rect: Rect, radius: f64, anchor: Anchor) -> BezPath {
    let r = radius.min(rect.width().min(rect.height()) / 2.0).max(0.0);
    let radii = match anchor {
        Anchor::Bottom => RoundedRectRadii::new(r, r, 0.0, 0.0),
        Anchor::Top => RoundedRectRadii::new(0.0, 0.0, r, r),
    };
    RoundedRect::from_rect(rect, radii).to_path(PATH_TOLERANCE)
}

/// Glow halo for `color`, or `None` when glow is disabled.
pub fn resolve_glow(color: BarColor, glow: bool) -> Option<GlowStyle> {
    glow.then_some(GlowStyle {
        radius_px: GLOW_RADIUS_PX,
        color,
    })
}

/// Resolve color, outline and glow for one bar in a single call.
pub fn resolve_bar(
    bounds: Rect,
    max_bar_height_px: f64,
    settings: &VisualizerSettings,
) -> ResolvedBar {
    let color = resolve_color(bounds.height(), max_bar_height_px, settings.color_scheme);
    ResolvedBar {
        color,
        path: resolve_path(
            bounds.x0,
            bounds.y0,
            bounds.width(),
            bounds.height(),
            settings.shape,
            settings.position,
        ),
        glow: resolve_glow(color, settings.glow),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/shape.rs"]
mod tests;
