use super::*;

#[test]
fn resolution_presets_map_to_explicit_sizes() {
    assert_eq!(Resolution::P720.dimensions(), (1280, 720));
    assert_eq!(Resolution::P1080.dimensions(), (1920, 1080));
    assert_eq!(Resolution::P480.dimensions(), (854, 480));
}

#[test]
fn resolution_parses_presets_and_custom() {
    assert_eq!("720p".parse::<Resolution>().unwrap(), Resolution::P720);
    assert_eq!(
        "640x360".parse::<Resolution>().unwrap(),
        Resolution::Custom {
            width: 640,
            height: 360
        }
    );
    assert!("big".parse::<Resolution>().is_err());
}

#[test]
fn resolution_json_forms() {
    let r: Resolution = serde_json::from_str("\"720p\"").unwrap();
    assert_eq!(r, Resolution::P720);
    let r: Resolution = serde_json::from_str(r#"{"custom":{"width":320,"height":240}}"#).unwrap();
    assert_eq!(r.dimensions(), (320, 240));
}

#[test]
fn export_settings_reject_odd_or_oversized_frames() {
    let mut s = ExportSettings {
        resolution: Resolution::Custom {
            width: 641,
            height: 360,
        },
        ..ExportSettings::default()
    };
    assert!(s.validate().is_err());
    s.resolution = Resolution::Custom {
        width: 9000,
        height: 360,
    };
    assert!(s.validate().is_err());
    s.resolution = Resolution::P720;
    assert!(s.validate().is_ok());
}

#[test]
fn export_settings_reject_fps_out_of_range() {
    let mut s = ExportSettings::default();
    s.fps = 0;
    assert!(s.validate().is_err());
    s.fps = 121;
    assert!(s.validate().is_err());
    s.fps = 60;
    assert!(s.validate().is_ok());
}

#[test]
fn quality_maps_to_bitrate() {
    assert_eq!(Quality::High.video_bitrate(), "8M");
    assert_eq!(Quality::Medium.video_bitrate(), "5M");
    assert_eq!(Quality::Low.video_bitrate(), "2M");
    assert_eq!("LOW".parse::<Quality>().unwrap(), Quality::Low);
}

#[test]
fn visualizer_settings_validate_ranges() {
    let mut v = VisualizerSettings::default();
    assert!(v.validate().is_ok());
    v.bar_spacing = -1.0;
    assert!(v.validate().is_err());
    v.bar_spacing = 0.0;
    v.bar_height_scale = 0.0;
    assert!(v.validate().is_err());
}

#[test]
fn visualizer_settings_use_camel_case_keys() {
    let v: VisualizerSettings = serde_json::from_str(
        r#"{"barSpacing":0,"barHeightScale":1.5,"colorScheme":"rainbow","position":"top","shape":"triangle","glow":true}"#,
    )
    .unwrap();
    assert_eq!(v.bar_spacing, 0.0);
    assert_eq!(v.color_scheme, ColorScheme::Rainbow);
    assert_eq!(v.position, Anchor::Top);
    assert_eq!(v.shape, BarShape::Triangle);
    assert!(v.glow);
}
