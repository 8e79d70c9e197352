use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn image_asset_from_input_sniffs_and_decodes() {
    let input = MediaInput::new("bg.png", png_bytes(3, 2, [1, 2, 3, 255]));
    let img = ImageAsset::from_input(&input).unwrap();
    assert_eq!((img.width, img.height), (3, 2));
}

#[test]
fn corrupt_image_is_an_image_decode_error() {
    let mut bytes = png_bytes(4, 4, [0, 0, 0, 255]);
    bytes.truncate(20);
    let err = ImageAsset::from_input(&MediaInput::new("bg.png", bytes)).unwrap_err();
    assert!(matches!(err, VizError::ImageDecode(_)));

    let err = ImageAsset::from_input(&MediaInput::new("bg.txt", b"text".to_vec())).unwrap_err();
    assert!(matches!(err, VizError::ImageDecode(_)));
}
