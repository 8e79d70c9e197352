use super::*;

fn endpoints(scheme: ColorScheme) -> (BarColor, BarColor) {
    (
        resolve_color(0.0, 100.0, scheme),
        resolve_color(100.0, 100.0, scheme),
    )
}

#[test]
fn every_scheme_hits_its_endpoints() {
    let cases = [
        (ColorScheme::GreenRed, (0, 255, 0), (255, 0, 0)),
        (ColorScheme::BluePurple, (0, 255, 255), (255, 100, 255)),
        (ColorScheme::Rainbow, (0, 0, 255), (255, 0, 0)),
        (ColorScheme::PurpleGold, (147, 51, 234), (255, 242, 36)),
        (ColorScheme::OceanBlue, (14, 165, 233), (73, 130, 246)),
        (ColorScheme::Sunset, (249, 115, 22), (236, 72, 153)),
        (ColorScheme::Neon, (34, 197, 94), (20, 184, 166)),
    ];
    for (scheme, lo, hi) in cases {
        let (c0, c1) = endpoints(scheme);
        assert_eq!((c0.r, c0.g, c0.b, c0.a), (lo.0, lo.1, lo.2, 255), "{scheme:?} p=0");
        assert_eq!((c1.r, c1.g, c1.b, c1.a), (hi.0, hi.1, hi.2, 255), "{scheme:?} p=1");
    }
}

#[test]
fn white_varies_only_alpha() {
    let (c0, c1) = endpoints(ColorScheme::White);
    assert_eq!((c0.r, c0.g, c0.b), (255, 255, 255));
    assert_eq!(c0.a, 77);
    assert_eq!(c1, BarColor::rgb(255, 255, 255));
}

#[test]
fn position_is_clamped() {
    assert_eq!(
        resolve_color(500.0, 100.0, ColorScheme::GreenRed),
        BarColor::rgb(255, 0, 0)
    );
    assert_eq!(
        resolve_color(-5.0, 100.0, ColorScheme::GreenRed),
        BarColor::rgb(0, 255, 0)
    );
    assert_eq!(
        resolve_color(10.0, 0.0, ColorScheme::GreenRed),
        BarColor::rgb(0, 255, 0)
    );
}

#[test]
fn midpoint_follows_formula() {
    let c = resolve_color(50.0, 100.0, ColorScheme::GreenRed);
    assert_eq!((c.r, c.g, c.b), (128, 128, 0));

    // hue 120 is pure green
    let c = resolve_color(50.0, 100.0, ColorScheme::Rainbow);
    assert_eq!((c.r, c.g, c.b), (0, 255, 0));
}

#[test]
fn css_formatting() {
    assert_eq!(BarColor::rgb(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    let c = resolve_color(0.0, 1.0, ColorScheme::White);
    assert_eq!(c.to_string(), "rgba(255, 255, 255, 0.302)");
}

#[test]
fn premultiplied_scales_channels() {
    let c = BarColor {
        r: 255,
        g: 128,
        b: 0,
        a: 128,
    };
    assert_eq!(c.premultiplied(), [128, 64, 0, 128]);
}
