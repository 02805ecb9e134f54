//! Greyscale raster types consumed by the feature extractor.
//!
//! Decoding, resizing and RGB-to-luma conversion happen upstream; this crate
//! only sees a validated single-channel buffer.

/// Frame edge length the serving pipeline expects (frames are resized to
/// `FRAME_SIZE`×`FRAME_SIZE` before feature extraction, matching training).
pub const FRAME_SIZE: usize = 128;

/// Errors raised when constructing a [`GrayFrame`].
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("frame buffer length {got} does not match {width}x{height}")]
    BufferLength {
        width: usize,
        height: usize,
        got: usize,
    },
    #[error("frame dimensions {width}x{height} are below the 3x3 minimum")]
    TooSmall { width: usize, height: usize },
}

/// Borrowed view over a row-major greyscale raster.
#[derive(Clone, Copy, Debug)]
pub struct GrayFrameView<'a> {
    pub width: usize,
    pub height: usize,
    /// Row-major, `len == width * height`.
    pub data: &'a [u8],
}

impl GrayFrameView<'_> {
    /// Intensity at `(x, y)`. Callers stay within bounds; the gradient pass
    /// only touches interior pixels.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }
}

/// Owned greyscale raster with validated dimensions.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayFrame {
    /// Build a frame from a row-major buffer.
    ///
    /// Gradient computation needs a one-pixel border, so both dimensions
    /// must be at least 3.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        if width < 3 || height < 3 {
            return Err(FrameError::TooSmall { width, height });
        }
        if data.len() != width * height {
            return Err(FrameError::BufferLength {
                width,
                height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn view(&self) -> GrayFrameView<'_> {
        GrayFrameView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}
