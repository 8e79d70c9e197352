pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Convert straight-alpha RGBA8 into premultiplied RGBA8 in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

/// Flatten premultiplied RGBA8 over an opaque background into packed RGB8.
pub(crate) fn flatten_premul_to_rgb8(src_premul: &[u8], bg_rgb: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src_premul.len() / 4 * 3);
    for s in src_premul.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let v = u16::from(s[c]) + mul_div255_u16(u16::from(bg_rgb[c]), inv);
            out.push(v.min(255) as u8);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
