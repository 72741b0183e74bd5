//! Per-cell drawing strategies used by the viewport.

use glam::IVec2;
use tactical_core::{CellIndex, PIXELS_PER_CELL};
use tactical_world::Cell;

use crate::{palette, Canvas, PixelRect};

/// One cell scheduled for drawing, with its on-screen footprint.
#[derive(Clone, Copy, Debug)]
pub struct Tile<'a> {
    /// Grid index of the cell.
    pub index: CellIndex,
    /// Cell state.
    pub cell: &'a Cell,
    /// Screen rectangle covered by the cell.
    pub rect: PixelRect,
}

impl Tile<'_> {
    /// Screen pixel at the centre of the cell.
    #[must_use]
    pub fn center(&self) -> IVec2 {
        self.rect.origin + IVec2::splat(PIXELS_PER_CELL / 2)
    }
}

/// Draws the layers of a single cell.
///
/// The viewport calls the layers in a fixed order per cell: shroud alone for
/// never-seen cells, otherwise terrain, overlay, occupants and finally fog
/// for cells that are not currently visible.
pub trait LayerPainter {
    /// Covers a never-seen cell.
    fn draw_shroud(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        canvas.fill_rect(tile.rect, palette::SHROUD);
    }

    /// Draws the terrain of the cell.
    fn draw_terrain(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>);

    /// Draws the overlay of the cell; only called when one is present.
    fn draw_overlay(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>);

    /// Draws the occupants of the cell; only called when any are present.
    fn draw_occupants(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>);

    /// Dims a cell that was seen before but is not in view now.
    fn draw_fog(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        canvas.dither_rect(tile.rect, palette::SHROUD);
    }
}

/// Painter drawing flat palette placeholders instead of terrain artwork.
#[derive(Clone, Copy, Debug, Default)]
pub struct PalettePainter;

impl LayerPainter for PalettePainter {
    fn draw_terrain(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        let color = match tile.cell.terrain() {
            Some(_) => palette::land_color(tile.cell.land_class()),
            None => palette::NO_TERRAIN,
        };
        canvas.fill_rect(tile.rect, color);
    }

    fn draw_overlay(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        let Some(overlay) = tile.cell.overlay() else {
            return;
        };
        let kind = overlay.kind();
        if kind.is_resource() {
            let center = tile.center();
            for offset in [
                IVec2::ZERO,
                IVec2::new(-2, 0),
                IVec2::new(2, 0),
                IVec2::new(0, -2),
                IVec2::new(0, 2),
            ] {
                canvas.put_pixel(center + offset, palette::RESOURCE_SPARKLE);
            }
        } else if kind.is_wall() {
            let inset = IVec2::splat(2);
            canvas.draw_box(
                tile.rect.origin + inset,
                tile.rect.end() - inset - IVec2::ONE,
                palette::ROCK,
            );
        }
    }

    fn draw_occupants(&mut self, canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        let center = tile.center();
        for offset in [
            IVec2::new(0, -3),
            IVec2::new(-3, 0),
            IVec2::new(3, 0),
            IVec2::new(0, 3),
        ] {
            canvas.put_pixel(center + offset, palette::OCCUPANT);
        }
    }
}
