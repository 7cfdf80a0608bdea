use super::*;

#[test]
fn hex_parses_short_long_and_alpha_forms() {
    assert_eq!(Rgba8::from_hex("#fff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::from_hex("#0b4f6c").unwrap(),
        Rgba8::opaque(0x0b, 0x4f, 0x6c)
    );
    assert_eq!(Rgba8::from_hex("#00000080").unwrap().a, 0x80);
    assert!(Rgba8::from_hex("0b4f6c").is_err());
    assert!(Rgba8::from_hex("#12345").is_err());
    assert!(Rgba8::from_hex("#zzzzzz").is_err());
}

#[test]
fn premul_scales_channels_by_alpha() {
    let c = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 128,
    };
    assert_eq!(c.premul_bytes(), [100, 50, 0, 128]);
    assert_eq!(Rgba8::WHITE.premul_bytes(), [255, 255, 255, 255]);
}
