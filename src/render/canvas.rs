use crate::foundation::core::Canvas;
use crate::foundation::error::VizResult;

/// A rendered frame as tightly packed, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }
}

/// Reusable pixel buffer the compositor draws into. Premultiplied RGBA8.
pub struct FrameCanvas {
    canvas: Canvas,
    pub(crate) pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for FrameCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCanvas")
            .field("width", &self.canvas.width)
            .field("height", &self.canvas.height)
            .finish()
    }
}

impl FrameCanvas {
    /// Allocate a transparent canvas.
    pub fn new(width: u32, height: u32) -> VizResult<Self> {
        let canvas = Canvas::new(width, height)?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(width as u16, height as u16),
        })
    }

    /// Dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Premultiplied RGBA8 bytes.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data_mut().fill(0);
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.canvas.width as usize) + x as usize) * 4;
        let d = self.data();
        [d[i], d[i + 1], d[i + 2], d[i + 3]]
    }

    /// Copy the current contents out.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data().to_vec(),
            premultiplied: true,
        }
    }
}
