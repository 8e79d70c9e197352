use std::sync::Arc;

use crate::assets::ImageAsset;
use crate::audio::FrequencySpectrum;
use crate::config::VisualizerSettings;
use crate::foundation::core::{Affine, BezPath, Rect};
use crate::foundation::error::{VizError, VizResult};
use crate::render::blur::GaussianKernel;
use crate::render::canvas::FrameCanvas;
use crate::render::composite::over_in_place;
use crate::style::{Anchor, BarColor, GLOW_RADIUS_PX, ResolvedBar, resolve_bar, resolve_color};

/// Bars reach at most this fraction of the frame height before `barHeightScale` is applied.
pub const MAX_BAR_HEIGHT_FRACTION: f64 = 0.3;

/// Placement and color of one bar, in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    /// Left edge.
    pub x: f64,
    /// Top edge (may be negative when scaling pushes a bar past the frame).
    pub y: f64,
    /// Bar width.
    pub width: f64,
    /// Bar height, unclamped.
    pub height: f64,
    /// Fill color from the active scheme.
    pub color: BarColor,
}

impl BarGeometry {
    /// Bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

fn max_bar_height(frame_height: u32) -> f64 {
    MAX_BAR_HEIGHT_FRACTION * f64::from(frame_height)
}

/// Lay out one bar per spectrum bin so the row spans the full frame width.
///
/// `bar_width = (W - (N - 1) * spacing) / N` and
/// `height = value * barHeightScale * (0.3 * H / 255)`.
pub fn layout_bars(
    width: u32,
    height: u32,
    spectrum: &FrequencySpectrum,
    settings: &VisualizerSettings,
) -> VizResult<Vec<BarGeometry>> {
    let n = spectrum.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let (w, h) = (f64::from(width), f64::from(height));
    let spacing = settings.bar_spacing;
    let bar_width = (w - (n - 1) as f64 * spacing) / n as f64;
    if bar_width <= 0.0 {
        return Err(VizError::validation(format!(
            "barSpacing {spacing} leaves no room for {n} bars in {width}px"
        )));
    }

    let max_h = max_bar_height(height);
    let unit = settings.bar_height_scale * (max_h / 255.0);
    Ok(spectrum
        .bins()
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let bar_h = f64::from(v) * unit;
            let y = match settings.position {
                Anchor::Bottom => h - bar_h,
                Anchor::Top => 0.0,
            };
            BarGeometry {
                x: i as f64 * (bar_width + spacing),
                y,
                width: bar_width,
                height: bar_h,
                color: resolve_color(bar_h, max_h, settings.color_scheme),
            }
        })
        .collect())
}

#[derive(Clone)]
struct BackgroundPaint {
    source: Arc<Vec<u8>>,
    paint: vello_cpu::Image,
    width: u32,
    height: u32,
}

/// Draws frames: stretched background image plus styled bars.
///
/// Holds only caches (raster context, background paint, glow scratch); output depends solely
/// on the arguments of [`Compositor::render_frame`].
pub struct Compositor {
    ctx: Option<vello_cpu::RenderContext>,
    background: Option<BackgroundPaint>,
    glow_layer: Option<vello_cpu::Pixmap>,
    glow_kernel: Option<GaussianKernel>,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("has_background", &self.background.is_some())
            .finish()
    }
}

impl Compositor {
    /// Create a compositor with empty caches.
    pub fn new() -> Self {
        Self {
            ctx: None,
            background: None,
            glow_layer: None,
            glow_kernel: None,
        }
    }

    /// Overwrite `canvas` with one frame. Safe to call repeatedly on the same canvas.
    pub fn render_frame(
        &mut self,
        canvas: &mut FrameCanvas,
        image: &ImageAsset,
        spectrum: &FrequencySpectrum,
        settings: &VisualizerSettings,
    ) -> VizResult<()> {
        settings.validate()?;
        let (w, h) = (canvas.width(), canvas.height());
        let max_h = max_bar_height(h);
        let bars: Vec<ResolvedBar> = layout_bars(w, h, spectrum, settings)?
            .iter()
            .map(|b| resolve_bar(b.bounds(), max_h, settings))
            .collect();
        let background = self.background_for(image)?;

        canvas.clear();
        let mut ctx = self.take_ctx(w as u16, h as u16);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(Affine::scale_non_uniform(
            f64::from(w) / f64::from(background.width),
            f64::from(h) / f64::from(background.height),
        )));
        ctx.set_paint(background.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(background.width),
            f64::from(background.height),
        ));
        if !settings.glow {
            draw_bars(&mut ctx, &bars);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut canvas.pixmap);

        let out = if settings.glow {
            self.draw_glowing_bars(&mut ctx, canvas, &bars)
        } else {
            Ok(())
        };
        self.ctx = Some(ctx);
        out
    }

    fn draw_glowing_bars(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        canvas: &mut FrameCanvas,
        bars: &[ResolvedBar],
    ) -> VizResult<()> {
        let (w, h) = (canvas.width(), canvas.height());
        let Some((top, bottom)) = bar_rows(bars, h) else {
            return Ok(());
        };
        let kernel = match self.glow_kernel.take() {
            Some(k) => k,
            None => GaussianKernel::new(GLOW_RADIUS_PX as u32, GLOW_RADIUS_PX as f32 / 2.0)?,
        };

        let layer = match self.glow_layer.take() {
            Some(p) if u32::from(p.width()) == w && u32::from(p.height()) == h => p,
            _ => vello_cpu::Pixmap::new(w as u16, h as u16),
        };
        let mut layer = layer;
        layer.data_as_u8_slice_mut().fill(0);

        ctx.reset();
        draw_bars(ctx, bars);
        ctx.flush();
        ctx.render_to_pixmap(&mut layer);

        // only rows within blur reach of a bar can change
        let reach = kernel.radius() as u32;
        let y0 = top.saturating_sub(reach);
        let y1 = (bottom + reach).min(h);
        let row = (w as usize) * 4;
        let band = (y0 as usize) * row..(y1 as usize) * row;

        let halo = kernel.blur_rgba8_premul(
            &layer.data_as_u8_slice()[band.clone()],
            w,
            y1 - y0,
        )?;
        let dst = &mut canvas.data_mut()[band.clone()];
        over_in_place(dst, &halo)?;
        over_in_place(dst, &layer.data_as_u8_slice()[band])?;

        self.glow_layer = Some(layer);
        self.glow_kernel = Some(kernel);
        Ok(())
    }

    fn take_ctx(&mut self, width: u16, height: u16) -> vello_cpu::RenderContext {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        ctx
    }

    fn background_for(&mut self, image: &ImageAsset) -> VizResult<BackgroundPaint> {
        if let Some(bg) = &self.background
            && Arc::ptr_eq(&bg.source, &image.rgba8_premul)
        {
            return Ok(bg.clone());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let bg = BackgroundPaint {
            source: Arc::clone(&image.rgba8_premul),
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: image.width,
            height: image.height,
        };
        self.background = Some(bg.clone());
        Ok(bg)
    }
}

/// One-shot [`Compositor::render_frame`] with fresh caches.
pub fn render_frame(
    canvas: &mut FrameCanvas,
    image: &ImageAsset,
    spectrum: &FrequencySpectrum,
    settings: &VisualizerSettings,
) -> VizResult<()> {
    Compositor::new().render_frame(canvas, image, spectrum, settings)
}

fn draw_bars(ctx: &mut vello_cpu::RenderContext, bars: &[ResolvedBar]) {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    for bar in bars.iter().filter(|b| !b.path.is_empty()) {
        let c = bar.color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        ctx.fill_path(&bezpath_to_cpu(&bar.path));
    }
}

/// Pixel rows `[top, bottom)` touched by any bar, clamped to the frame.
fn bar_rows(bars: &[ResolvedBar], frame_height: u32) -> Option<(u32, u32)> {
    let mut rows: Option<(f64, f64)> = None;
    for bar in bars.iter().filter(|b| !b.path.is_empty()) {
        let bb = kurbo::Shape::bounding_box(&bar.path);
        rows = Some(match rows {
            Some((t, b)) => (t.min(bb.y0), b.max(bb.y1)),
            None => (bb.y0, bb.y1),
        });
    }
    let (t, b) = rows?;
    let h = f64::from(frame_height);
    let top = t.floor().clamp(0.0, h) as u32;
    let bottom = b.ceil().clamp(0.0, h) as u32;
    (top < bottom).then_some((top, bottom))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(bytes: &[u8], width: u32, height: u32) -> VizResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VizError::image_decode("image width exceeds 65535"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VizError::image_decode("image height exceeds 65535"))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(VizError::render("image byte length mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
