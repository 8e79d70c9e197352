use crate::foundation::error::{VizError, VizResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied source-over of one pixel.
pub(crate) fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    match src[3] {
        0 => dst,
        255 => src,
        sa => {
            let inv = 255 - u16::from(sa);
            let mut out = [0u8; 4];
            for c in 0..4 {
                out[c] = src[c].saturating_add(mul_div255_u8(u16::from(dst[c]), inv));
            }
            out
        }
    }
}

/// `dst = src over dst` for equal-length premultiplied RGBA8 buffers.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> VizResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(VizError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
