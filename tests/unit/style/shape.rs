use super::*;
use kurbo::Shape;

fn contains(path: &BezPath, x: f64, y: f64) -> bool {
    path.contains(Point::new(x, y))
}

#[test]
fn zero_height_yields_empty_path() {
    for shape in [
        BarShape::Rectangle,
        BarShape::Rounded,
        BarShape::Pill,
        BarShape::Triangle,
    ] {
        assert!(resolve_path(0.0, 100.0, 8.0, 0.0, shape, Anchor::Bottom).is_empty());
    }
}

#[test]
fn rectangle_covers_its_box() {
    let p = resolve_path(10.0, 20.0, 8.0, 30.0, BarShape::Rectangle, Anchor::Bottom);
    let bb = p.bounding_box();
    assert_eq!(bb, Rect::new(10.0, 20.0, 18.0, 50.0));
    assert!(contains(&p, 10.2, 20.2));
}

#[test]
fn rounded_only_rounds_the_leading_edge() {
    let bottom = resolve_path(0.0, 0.0, 10.0, 40.0, BarShape::Rounded, Anchor::Bottom);
    // top-left corner is cut, bottom-left is square
    assert!(!contains(&bottom, 0.2, 0.2));
    assert!(contains(&bottom, 0.2, 39.8));

    let top = resolve_path(0.0, 0.0, 10.0, 40.0, BarShape::Rounded, Anchor::Top);
    assert!(contains(&top, 0.2, 0.2));
    assert!(!contains(&top, 0.2, 39.8));
}

#[test]
fn pill_radius_is_half_the_width() {
    let p = resolve_path(0.0, 0.0, 20.0, 60.0, BarShape::Pill, Anchor::Bottom);
    // (3,3) lies outside a 10px-radius arc centred at (10,10)
    assert!(!contains(&p, 3.0, 3.0));
    assert!(contains(&p, 10.0, 0.5));
    let area = p.area().abs();
    let expected = 20.0 * 60.0 - (100.0 - std::f64::consts::PI * 25.0) * 2.0;
    assert!((area - expected).abs() < 1.0, "area {area} vs {expected}");
}

#[test]
fn triangle_apex_points_away_from_anchor() {
    let up = resolve_path(0.0, 10.0, 10.0, 50.0, BarShape::Triangle, Anchor::Bottom);
    assert!(contains(&up, 5.0, 11.0));
    assert!(!contains(&up, 1.0, 11.0));
    assert!(contains(&up, 1.0, 59.0));

    let down = resolve_path(0.0, 0.0, 10.0, 50.0, BarShape::Triangle, Anchor::Top);
    assert!(contains(&down, 5.0, 49.0));
    assert!(contains(&down, 1.0, 1.0));
    assert!(!contains(&down, 1.0, 49.0));
}

#[test]
fn glow_uses_fixed_radius_and_fill_color() {
    let c = BarColor::rgb(1, 2, 3);
    let g = resolve_glow(c, true).unwrap();
    assert_eq!(g.radius_px, 15.0);
    assert_eq!(g.color, c);
    assert!(resolve_glow(c, false).is_none());
}

#[test]
fn resolve_bar_bundles_color_path_and_glow() {
    let settings = VisualizerSettings {
        glow: true,
        ..VisualizerSettings::default()
    };
    let bar = resolve_bar(Rect::new(0.0, 50.0, 8.0, 100.0), 100.0, &settings);
    assert_eq!(bar.color, resolve_color(50.0, 100.0, settings.color_scheme));
    assert_eq!(bar.glow.unwrap().color, bar.color);
    assert!(!bar.path.is_empty());
}
