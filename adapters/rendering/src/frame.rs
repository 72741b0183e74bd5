//! In-memory raster surface used for headless rendering.

use crate::{BufferLayout, RasterError, RasterSurface};

/// Row-major indexed-colour frame held in memory, one byte per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedFrame {
    layout: BufferLayout,
    pixels: Vec<u8>,
    locked: bool,
    presented: u32,
}

impl IndexedFrame {
    /// Allocates a frame cleared to palette index zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let len = usize::try_from(i64::from(width) * i64::from(height)).unwrap_or(0);
        Self {
            layout: BufferLayout {
                width,
                height,
                stride: width,
            },
            pixels: vec![0; len],
            locked: false,
            presented: 0,
        }
    }

    /// Frame width in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.layout.width
    }

    /// Frame height in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.layout.height
    }

    /// Raw pixel indices in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Palette index at the provided pixel, if it lies inside the frame.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x >= self.layout.width || y >= self.layout.height {
            return None;
        }
        let offset = usize::try_from(y * self.layout.stride + x).ok()?;
        self.pixels.get(offset).copied()
    }

    /// Sets every pixel to the provided index.
    pub fn clear(&mut self, color: u8) {
        self.pixels.fill(color);
    }

    /// Reports whether the buffer is currently locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of frames presented so far.
    #[must_use]
    pub const fn presented(&self) -> u32 {
        self.presented
    }
}

impl RasterSurface for IndexedFrame {
    fn acquire_pixel_buffer(&mut self) -> Result<BufferLayout, RasterError> {
        if self.locked {
            return Err(RasterError::AlreadyLocked);
        }
        self.locked = true;
        Ok(self.layout)
    }

    fn pixel_buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.locked.then_some(self.pixels.as_mut_slice())
    }

    fn layout(&self) -> BufferLayout {
        self.layout
    }

    fn release_pixel_buffer(&mut self) {
        self.locked = false;
    }

    fn present(&mut self) -> Result<(), RasterError> {
        if self.locked {
            return Err(RasterError::PresentWhileLocked);
        }
        self.presented = self.presented.saturating_add(1);
        Ok(())
    }
}
