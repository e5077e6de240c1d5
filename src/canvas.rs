//! The fixed-size page preview surface.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::PreviewError;
use crate::ports::PageImage;

/// Book page width in pixels.
pub const PAGE_WIDTH: u32 = 146;
/// Book page height in pixels.
pub const PAGE_HEIGHT: u32 = 180;

/// An in-memory stand-in for the preview canvas element.
///
/// Successful renders are blitted at the origin; a failed render leaves the
/// prior contents untouched.
#[derive(Debug, Clone)]
pub struct PageCanvas {
    pixels: RgbaImage,
    drawn: u64,
}

impl PageCanvas {
    /// Create an empty (fully transparent) page canvas.
    #[must_use]
    pub fn new() -> Self {
        Self { pixels: RgbaImage::new(PAGE_WIDTH, PAGE_HEIGHT), drawn: 0 }
    }

    /// Decode `image` and draw it at the origin.
    ///
    /// The decode buffer is transient; it is dropped as soon as the blit
    /// completes. Decode failures leave the canvas unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded as an image.
    pub fn draw(&mut self, image: &PageImage) -> Result<(), PreviewError> {
        let decoded = image::load_from_memory(&image.data)
            .map_err(|e| PreviewError::Decode(format!("unusable page image: {e}")))?;
        image::imageops::overlay(&mut self.pixels, &decoded.to_rgba8(), 0, 0);
        Ok(())
    }

    /// Record the sequence number of the request whose image was just drawn.
    pub(crate) fn mark_drawn(&mut self, seq: u64) {
        self.drawn = seq;
    }

    /// Sequence number of the last drawn request, or 0 if nothing has been
    /// drawn yet.
    #[must_use]
    pub fn last_drawn(&self) -> u64 {
        self.drawn
    }

    /// Encode the current canvas contents as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_png(&self) -> Result<Vec<u8>, PreviewError> {
        let mut buffer = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| PreviewError::Decode(format!("failed to encode canvas: {e}")))?;
        Ok(buffer)
    }

    /// The RGBA pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self::new()
    }
}
