use crate::foundation::error::{VizError, VizResult};

/// Normalized 1D Gaussian in Q16 fixed point (weights sum to exactly 65536).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GaussianKernel {
    weights: Vec<u32>,
}

impl GaussianKernel {
    /// Build a kernel spanning `-radius..=radius`.
    pub fn new(radius: u32, sigma: f32) -> VizResult<Self> {
        if radius == 0 {
            return Ok(Self {
                weights: vec![1 << 16],
            });
        }
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(VizError::validation("blur sigma must be > 0"));
        }

        let r = radius as i32;
        let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
        let raw: Vec<f64> = (-r..=r)
            .map(|i| (-f64::from(i * i) / denom).exp())
            .collect();
        let sum: f64 = raw.iter().sum();

        let mut weights: Vec<u32> = raw
            .iter()
            .map(|w| ((w / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
            .collect();
        // push the rounding residue into the centre tap
        let total: i64 = weights.iter().map(|&w| i64::from(w)).sum();
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + 65536 - total).clamp(0, 65536) as u32;
        Ok(Self { weights })
    }

    /// Reach of the kernel on each side of the centre tap.
    pub fn radius(&self) -> usize {
        self.weights.len() / 2
    }

    /// Q16 weights, centre tap in the middle.
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    /// Separable blur of a premultiplied RGBA8 image. Edges clamp.
    pub fn blur_rgba8_premul(&self, src: &[u8], width: u32, height: u32) -> VizResult<Vec<u8>> {
        let (w, h) = (width as usize, height as usize);
        let expected = w
            .checked_mul(h)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| VizError::render("blur buffer size overflow"))?;
        if src.len() != expected {
            return Err(VizError::render(
                "blur expects src matching width*height*4",
            ));
        }
        if self.weights.len() == 1 || expected == 0 {
            return Ok(src.to_vec());
        }

        let mut tmp = vec![0u8; expected];
        let mut out = vec![0u8; expected];
        // rows: step 1 pixel within a line of w; columns: step w pixels within a line of h
        self.pass(src, &mut tmp, h, w, w, 1);
        self.pass(&tmp, &mut out, w, h, 1, w);
        Ok(out)
    }

    fn pass(
        &self,
        src: &[u8],
        dst: &mut [u8],
        lines: usize,
        len: usize,
        line_stride: usize,
        step: usize,
    ) {
        let r = self.radius() as isize;
        let last = len as isize - 1;
        for line in 0..lines {
            let base = line * line_stride;
            for i in 0..len {
                let mut acc = [0u64; 4];
                for (k, &kw) in self.weights.iter().enumerate() {
                    let j = (i as isize + k as isize - r).clamp(0, last) as usize;
                    let idx = (base + j * step) * 4;
                    for (a, &v) in acc.iter_mut().zip(&src[idx..idx + 4]) {
                        *a += u64::from(kw) * u64::from(v);
                    }
                }
                let o = (base + i * step) * 4;
                for (d, a) in dst[o..o + 4].iter_mut().zip(acc) {
                    *d = q16_to_u8(a);
                }
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
