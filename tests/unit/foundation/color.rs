use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: PadColor = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, PadColor::rgb(255, 0, 0));

    let c: PadColor = serde_json::from_value(json!("#0000FF80")).unwrap();
    assert_eq!(c.to_rgba(), [0, 0, 255, 128]);

    assert_eq!("101010".parse::<PadColor>().unwrap(), PadColor::rgb(16, 16, 16));
}

#[test]
fn parses_arrays() {
    let c: PadColor = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(c, PadColor::rgb(1, 2, 3));

    let c: PadColor = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c.to_rgba(), [1, 2, 3, 4]);

    assert!(serde_json::from_value::<PadColor>(json!([1, 2])).is_err());
}

#[test]
fn rejects_malformed_hex() {
    assert!("#fff".parse::<PadColor>().is_err());
    assert!("#gg0000".parse::<PadColor>().is_err());
    assert!("#ééé".parse::<PadColor>().is_err());
}

#[test]
fn display_round_trips_through_serde() {
    let c = PadColor::rgb(0x12, 0xab, 0x00);
    assert_eq!(c.to_string(), "#12ab00");
    let v = serde_json::to_value(c).unwrap();
    assert_eq!(v, json!("#12ab00"));
    assert_eq!(PadColor::BLACK.to_string(), "#000000");
}
