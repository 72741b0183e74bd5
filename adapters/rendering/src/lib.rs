#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tactical display for the grid world.
//!
//! The [`Viewport`] owns a [`tactical_world::Grid`] and maps between screen
//! pixels and world or cell coordinates. Each frame it locks a
//! [`RasterSurface`], hands every visible cell to a [`LayerPainter`] in
//! row-major order, draws the cursor and selection overlays, then unlocks
//! and presents the surface.

use thiserror::Error;

mod frame;
pub mod palette;
mod painter;
mod surface;
mod viewport;

pub use frame::IndexedFrame;
pub use painter::{LayerPainter, PalettePainter, Tile};
pub use surface::{BufferLayout, Canvas, PixelRect, RasterSurface, SurfaceLock};
pub use viewport::{
    CellWindow, CursorStyle, ScreenPoint, Viewport, ViewportConfig, MAX_TACTICAL_EXTENT,
};

/// Failures reported by raster backends.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RasterError {
    /// The pixel buffer was locked twice without a release in between.
    #[error("pixel buffer is already locked")]
    AlreadyLocked,
    /// A frame was presented while the pixel buffer was still locked.
    #[error("cannot present while the pixel buffer is locked")]
    PresentWhileLocked,
    /// The backend could not provide a pixel buffer.
    #[error("raster backend unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description of the failure.
        reason: String,
    },
}

/// Counters describing what a call to [`Viewport::render`] drew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells visited in the visible window.
    pub cells: usize,
    /// Cells covered by opaque shroud.
    pub shrouded: usize,
    /// Cells dimmed by fog.
    pub fogged: usize,
    /// Cells whose overlay was drawn.
    pub overlays: usize,
    /// Cells whose occupants were drawn.
    pub occupied: usize,
}
