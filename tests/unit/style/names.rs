use super::*;

#[test]
fn scheme_names_accept_camel_and_kebab_case() {
    assert_eq!("greenRed".parse::<ColorScheme>().unwrap(), ColorScheme::GreenRed);
    assert_eq!("ocean-blue".parse::<ColorScheme>().unwrap(), ColorScheme::OceanBlue);
    assert_eq!("NEON".parse::<ColorScheme>().unwrap(), ColorScheme::Neon);
    assert!("plaid".parse::<ColorScheme>().is_err());
}

#[test]
fn serde_names_match_settings_json() {
    assert_eq!(
        serde_json::to_string(&ColorScheme::PurpleGold).unwrap(),
        "\"purpleGold\""
    );
    assert_eq!(serde_json::to_string(&BarShape::Pill).unwrap(), "\"pill\"");
    let anchor: Anchor = serde_json::from_str("\"top\"").unwrap();
    assert_eq!(anchor, Anchor::Top);
}

#[test]
fn shape_and_anchor_parse() {
    assert_eq!("triangle".parse::<BarShape>().unwrap(), BarShape::Triangle);
    assert_eq!("Bottom".parse::<Anchor>().unwrap(), Anchor::Bottom);
    assert!("middle".parse::<Anchor>().is_err());
}
