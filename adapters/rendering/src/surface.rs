//! Raster backend capability and the drawing primitives built on it.

use std::ops::{Deref, DerefMut};

use glam::IVec2;
use tracing::warn;

use crate::RasterError;

/// Dimensions of a locked indexed-colour pixel buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferLayout {
    /// Visible pixel columns.
    pub width: i32,
    /// Visible pixel rows.
    pub height: i32,
    /// Bytes between the starts of consecutive rows.
    pub stride: i32,
}

impl BufferLayout {
    /// Rectangle covering the whole buffer.
    #[must_use]
    pub const fn rect(&self) -> PixelRect {
        PixelRect::new(IVec2::ZERO, IVec2::new(self.width, self.height))
    }

    fn offset(&self, point: IVec2) -> Option<usize> {
        if !self.rect().contains(point) {
            return None;
        }
        usize::try_from(point.y * self.stride + point.x).ok()
    }
}

/// Axis-aligned pixel rectangle with an inclusive origin and exclusive far edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    /// Top-left corner.
    pub origin: IVec2,
    /// Width and height.
    pub size: IVec2,
}

impl PixelRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: IVec2, size: IVec2) -> Self {
        Self { origin, size }
    }

    /// Smallest rectangle containing both corners, in any order.
    #[must_use]
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min, max - min + IVec2::ONE)
    }

    /// Corner one past the bottom-right pixel.
    #[must_use]
    pub fn end(&self) -> IVec2 {
        self.origin + self.size
    }

    /// Reports whether the rectangle covers no pixel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// Reports whether the point lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, point: IVec2) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.size.x
            && point.y < self.origin.y + self.size.y
    }

    /// Overlap of two rectangles, possibly empty.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let origin = self.origin.max(other.origin);
        let end = self.end().min(other.end());
        Self::new(origin, (end - origin).max(IVec2::ZERO))
    }
}

/// Indexed-colour raster backend the viewport draws onto.
///
/// Implementors supply buffer locking and presentation. Drawing primitives
/// are provided on top of the locked buffer and clip to its extent; they do
/// nothing while the buffer is not locked.
pub trait RasterSurface {
    /// Locks the pixel buffer for writing.
    fn acquire_pixel_buffer(&mut self) -> Result<BufferLayout, RasterError>;

    /// Locked pixel buffer, or `None` while unlocked.
    fn pixel_buffer_mut(&mut self) -> Option<&mut [u8]>;

    /// Layout of the buffer.
    fn layout(&self) -> BufferLayout;

    /// Unlocks the pixel buffer.
    fn release_pixel_buffer(&mut self);

    /// Hands the finished frame to the display.
    fn present(&mut self) -> Result<(), RasterError>;

    /// Writes one pixel.
    fn put_pixel(&mut self, point: IVec2, color: u8) {
        let Some(offset) = self.layout().offset(point) else {
            return;
        };
        if let Some(pixel) = self.pixel_buffer_mut().and_then(|buffer| buffer.get_mut(offset)) {
            *pixel = color;
        }
    }

    /// Fills a rectangle.
    fn fill_rect(&mut self, rect: PixelRect, color: u8) {
        let layout = self.layout();
        let rect = rect.intersect(&layout.rect());
        if rect.is_empty() {
            return;
        }
        let Some(buffer) = self.pixel_buffer_mut() else {
            return;
        };
        for y in rect.origin.y..rect.end().y {
            let (Some(start), Some(end)) = (
                layout.offset(IVec2::new(rect.origin.x, y)),
                layout.offset(IVec2::new(rect.end().x - 1, y)),
            ) else {
                continue;
            };
            if let Some(row) = buffer.get_mut(start..=end) {
                row.fill(color);
            }
        }
    }

    /// Draws a one-pixel line between two inclusive end points.
    fn draw_line(&mut self, from: IVec2, to: IVec2, color: u8) {
        if from.y == to.y {
            let start = IVec2::new(from.x.min(to.x), from.y);
            self.fill_rect(PixelRect::new(start, IVec2::new((to.x - from.x).abs() + 1, 1)), color);
            return;
        }
        if from.x == to.x {
            let start = IVec2::new(from.x, from.y.min(to.y));
            self.fill_rect(PixelRect::new(start, IVec2::new(1, (to.y - from.y).abs() + 1)), color);
            return;
        }
        for point in bresenham(from, to) {
            self.put_pixel(point, color);
        }
    }
}

/// Points of the Bresenham line between two inclusive end points.
pub(crate) fn bresenham(from: IVec2, to: IVec2) -> impl Iterator<Item = IVec2> {
    let delta = IVec2::new((to.x - from.x).abs(), -(to.y - from.y).abs());
    let step = IVec2::new((to.x - from.x).signum(), (to.y - from.y).signum());
    let mut point = from;
    let mut error = delta.x + delta.y;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let current = point;
        if point == to {
            done = true;
            return Some(current);
        }
        let doubled = 2 * error;
        if doubled >= delta.y {
            error += delta.y;
            point.x += step.x;
        }
        if doubled <= delta.x {
            error += delta.x;
            point.y += step.y;
        }
        Some(current)
    })
}

/// Scoped lock on a raster surface.
///
/// The pixel buffer is released when the lock is dropped, so every exit
/// path out of a drawing scope unlocks the surface.
#[derive(Debug)]
pub struct SurfaceLock<'a, S: RasterSurface + ?Sized> {
    surface: &'a mut S,
    layout: BufferLayout,
}

impl<'a, S: RasterSurface + ?Sized> SurfaceLock<'a, S> {
    /// Locks the surface's pixel buffer.
    pub fn acquire(surface: &'a mut S) -> Result<Self, RasterError> {
        match surface.acquire_pixel_buffer() {
            Ok(layout) => Ok(Self { surface, layout }),
            Err(error) => {
                warn!(error = %error, "surface_lock_failed");
                Err(error)
            }
        }
    }

    /// Layout reported when the lock was taken.
    #[must_use]
    pub const fn layout(&self) -> BufferLayout {
        self.layout
    }
}

impl<S: RasterSurface + ?Sized> Deref for SurfaceLock<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: RasterSurface + ?Sized> DerefMut for SurfaceLock<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: RasterSurface + ?Sized> Drop for SurfaceLock<'_, S> {
    fn drop(&mut self) {
        self.surface.release_pixel_buffer();
    }
}

/// Drawing target handed to painters, clipped to the tactical area.
pub struct Canvas<'a> {
    surface: &'a mut dyn RasterSurface,
    clip: PixelRect,
}

impl<'a> Canvas<'a> {
    /// Wraps a locked surface, restricting drawing to `clip`.
    pub fn new(surface: &'a mut dyn RasterSurface, clip: PixelRect) -> Self {
        let clip = clip.intersect(&surface.layout().rect());
        Self { surface, clip }
    }

    /// Rectangle drawing is restricted to.
    #[must_use]
    pub const fn clip(&self) -> PixelRect {
        self.clip
    }

    /// Writes one pixel if it lies inside the clip rectangle.
    pub fn put_pixel(&mut self, point: IVec2, color: u8) {
        if self.clip.contains(point) {
            self.surface.put_pixel(point, color);
        }
    }

    /// Fills the part of `rect` inside the clip rectangle.
    pub fn fill_rect(&mut self, rect: PixelRect, color: u8) {
        let rect = rect.intersect(&self.clip);
        if !rect.is_empty() {
            self.surface.fill_rect(rect, color);
        }
    }

    /// Draws the part of a line inside the clip rectangle.
    pub fn draw_line(&mut self, from: IVec2, to: IVec2, color: u8) {
        if from.x == to.x || from.y == to.y {
            let span = PixelRect::from_corners(from, to).intersect(&self.clip);
            if !span.is_empty() {
                self.surface.draw_line(span.origin, span.end() - IVec2::ONE, color);
            }
            return;
        }
        for point in bresenham(from, to) {
            self.put_pixel(point, color);
        }
    }

    /// Outlines a rectangle given two opposite corners in any order.
    pub fn draw_box(&mut self, a: IVec2, b: IVec2, color: u8) {
        let min = a.min(b);
        let max = a.max(b);
        self.draw_line(min, IVec2::new(max.x, min.y), color);
        self.draw_line(IVec2::new(max.x, min.y), max, color);
        self.draw_line(max, IVec2::new(min.x, max.y), color);
        self.draw_line(IVec2::new(min.x, max.y), min, color);
    }

    /// Covers every other pixel of `rect` in a checkerboard pattern.
    pub fn dither_rect(&mut self, rect: PixelRect, color: u8) {
        let rect = rect.intersect(&self.clip);
        for y in rect.origin.y..rect.end().y {
            let first = rect.origin.x + (rect.origin.x + y).rem_euclid(2);
            for x in (first..rect.end().x).step_by(2) {
                self.surface.put_pixel(IVec2::new(x, y), color);
            }
        }
    }
}
