use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(100, 128), 50);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn premultiply_zeroes_transparent_pixels() {
    let mut px = vec![200u8, 100, 50, 0, 100, 50, 200, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[0, 0, 0, 0]);
    assert_eq!(
        &px[4..],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128
        ]
    );
}

#[test]
fn flatten_alpha_0_returns_background() {
    assert_eq!(flatten_premul_to_rgb8(&[0, 0, 0, 0], [10, 20, 30]), vec![10, 20, 30]);
}

#[test]
fn flatten_opaque_is_identity() {
    assert_eq!(flatten_premul_to_rgb8(&[1, 2, 3, 255], [10, 20, 30]), vec![1, 2, 3]);
}
