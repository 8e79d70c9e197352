pub(crate) mod blur;
pub(crate) mod canvas;
pub(crate) mod composite;
pub(crate) mod compositor;

pub use blur::GaussianKernel;
pub use canvas::{FrameCanvas, FrameRGBA};
pub use compositor::{BarGeometry, Compositor, MAX_BAR_HEIGHT_FRACTION, layout_bars, render_frame};
