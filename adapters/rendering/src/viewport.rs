//! Tactical display: the scrollable window onto the grid.

use glam::IVec2;
use serde::Deserialize;
use tactical_core::{
    cell_to_world, CellIndex, ScrollRequest, ViewSnapshot, Visibility, WorldPosition,
    LEPTONS_PER_CELL, LEPTONS_PER_PIXEL, PIXELS_PER_CELL,
};
use tactical_world::Grid;
use tracing::{debug, trace};

use crate::{
    palette, Canvas, FrameStats, LayerPainter, PixelRect, RasterError, RasterSurface,
    SurfaceLock, Tile,
};

/// Largest edge, in pixels, of the tactical area and of its screen offset.
///
/// Wider than the whole grid, so a larger area would only show border.
pub const MAX_TACTICAL_EXTENT: i32 = 4096;

/// Placement of the tactical area on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Screen column of the left edge.
    pub screen_x: i32,
    /// Screen row of the top edge, below the tab bar.
    pub screen_y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Whether scrolling is kept inside the play area.
    pub constrained: bool,
}

impl ViewportConfig {
    /// The 640 by 384 tactical area under a 16 pixel tab bar.
    pub const CLASSIC: Self = Self {
        screen_x: 0,
        screen_y: 16,
        width: 640,
        height: 384,
        constrained: true,
    };
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::CLASSIC
    }
}

/// Half-open range of cells `[x0, x1) x [y0, y1)` considered for drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellWindow {
    /// First column.
    pub x0: i32,
    /// First row.
    pub y0: i32,
    /// Column one past the last.
    pub x1: i32,
    /// Row one past the last.
    pub y1: i32,
}

impl CellWindow {
    /// Reports whether the window holds no cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Reports whether the cell lies in the window.
    #[must_use]
    pub const fn contains(&self, cell: CellIndex) -> bool {
        !cell.is_none()
            && cell.x() >= self.x0
            && cell.x() < self.x1
            && cell.y() >= self.y0
            && cell.y() < self.y1
    }

    /// Cells of the window in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellIndex> {
        let window = *self;
        (window.y0..window.y1)
            .flat_map(move |y| (window.x0..window.x1).map(move |x| CellIndex::from_xy(x, y)))
    }
}

/// Screen position of a world point and whether it falls near the tactical area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenPoint {
    /// Screen column.
    pub x: i32,
    /// Screen row.
    pub y: i32,
    /// Whether the point lies within one cell of the tactical area.
    pub visible: bool,
}

impl ScreenPoint {
    const HIDDEN: Self = Self {
        x: 0,
        y: 0,
        visible: false,
    };

    /// Point as a vector.
    #[must_use]
    pub const fn to_ivec2(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// Colour context of the cursor highlight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorStyle {
    /// Pointing at something friendly or empty ground.
    #[default]
    Ally,
    /// Pointing at something hostile.
    Enemy,
    /// Pointing at something neutral.
    Neutral,
}

impl CursorStyle {
    const fn color(self) -> u8 {
        match self {
            Self::Ally => palette::CURSOR_ALLY,
            Self::Enemy => palette::CURSOR_ENEMY,
            Self::Neutral => palette::CURSOR_NEUTRAL,
        }
    }
}

/// Scrollable window onto a grid it owns.
#[derive(Clone, Debug)]
pub struct Viewport {
    grid: Grid,
    origin: WorldPosition,
    area: PixelRect,
    constrained: bool,
    cursor: CellIndex,
    cursor_style: CursorStyle,
    selection: Option<(IVec2, IVec2)>,
}

impl Viewport {
    /// Creates a viewport over `grid`, placed at the top-left of the play area.
    #[must_use]
    pub fn new(grid: Grid, config: ViewportConfig) -> Self {
        let bounds = grid.bounds();
        let mut viewport = Self {
            grid,
            origin: WorldPosition::new(
                bounds.x() * LEPTONS_PER_CELL,
                bounds.y() * LEPTONS_PER_CELL,
            ),
            area: tactical_rect(config.screen_x, config.screen_y, config.width, config.height),
            constrained: config.constrained,
            cursor: CellIndex::NONE,
            cursor_style: CursorStyle::default(),
            selection: None,
        };
        viewport.origin = viewport.clamp_origin(viewport.origin);
        viewport
    }

    /// Grid shown by the viewport.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access to the grid shown by the viewport.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Gives up the viewport, returning its grid.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    /// World position of the top-left corner of the view.
    #[must_use]
    pub const fn origin(&self) -> WorldPosition {
        self.origin
    }

    /// Screen rectangle of the tactical area.
    #[must_use]
    pub const fn tactical_area(&self) -> PixelRect {
        self.area
    }

    /// Moves or resizes the tactical area and re-applies the scroll clamp.
    ///
    /// Offsets and sizes are clamped to `0..=MAX_TACTICAL_EXTENT`.
    pub fn set_tactical_area(&mut self, screen_x: i32, screen_y: i32, width: i32, height: i32) {
        self.area = tactical_rect(screen_x, screen_y, width, height);
        self.origin = self.clamp_origin(self.origin);
    }

    /// Reports whether scrolling is kept inside the play area.
    #[must_use]
    pub const fn is_constrained(&self) -> bool {
        self.constrained
    }

    /// Turns the play-area scroll clamp on or off.
    pub fn set_constrained(&mut self, constrained: bool) {
        self.constrained = constrained;
        self.origin = self.clamp_origin(self.origin);
    }

    /// Description of the view for camera systems.
    #[must_use]
    pub const fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            origin: self.origin,
            screen_x: self.area.origin.x,
            screen_y: self.area.origin.y,
            width: self.area.size.x,
            height: self.area.size.y,
        }
    }

    /// Cells touched by the view grown by one pixel on every side, clamped to
    /// the play area.
    ///
    /// Partially scrolled cells on either edge are always included; when an
    /// edge is cell-aligned the next cell beyond it is included as well.
    /// Such a cell lies wholly off screen: `cell_to_screen` still reports it
    /// visible, but `screen_to_cell` on its centre returns the sentinel. The
    /// screen round trip only holds for window cells whose centre falls
    /// inside the tactical area.
    #[must_use]
    pub fn visible_cell_window(&self) -> CellWindow {
        if self.area.is_empty() {
            return CellWindow::default();
        }
        let (ox, oy) = self.origin.to_pixels();
        let bounds = self.grid.bounds();
        let x0 = (ox - 1).div_euclid(PIXELS_PER_CELL).max(bounds.x());
        let y0 = (oy - 1).div_euclid(PIXELS_PER_CELL).max(bounds.y());
        let x1 = ((ox + self.area.size.x).div_euclid(PIXELS_PER_CELL) + 1).min(bounds.right());
        let y1 = ((oy + self.area.size.y).div_euclid(PIXELS_PER_CELL) + 1).min(bounds.bottom());
        CellWindow {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    /// World position under a screen pixel, or the sentinel outside the tactical area.
    #[must_use]
    pub fn screen_to_world(&self, sx: i32, sy: i32) -> WorldPosition {
        let point = IVec2::new(sx, sy);
        if !self.area.contains(point) {
            return WorldPosition::NONE;
        }
        let (ox, oy) = self.origin.to_pixels();
        let local = point - self.area.origin;
        WorldPosition::from_pixels(ox + local.x, oy + local.y)
    }

    /// Play-area cell under a screen pixel, or the sentinel.
    #[must_use]
    pub fn screen_to_cell(&self, sx: i32, sy: i32) -> CellIndex {
        let position = self.screen_to_world(sx, sy);
        if position.is_none() {
            return CellIndex::NONE;
        }
        let (x, y) = position.cell_xy();
        if !self.grid.bounds().contains(x, y) {
            return CellIndex::NONE;
        }
        CellIndex::from_xy(x, y)
    }

    /// Screen position of a world point.
    #[must_use]
    pub fn world_to_screen(&self, position: WorldPosition) -> ScreenPoint {
        if position.is_none() {
            return ScreenPoint::HIDDEN;
        }
        let (ox, oy) = self.origin.to_pixels();
        let (px, py) = position.to_pixels();
        let x = px - ox + self.area.origin.x;
        let y = py - oy + self.area.origin.y;
        let near = self.area.origin - IVec2::splat(PIXELS_PER_CELL);
        let far = self.area.end() + IVec2::splat(PIXELS_PER_CELL);
        ScreenPoint {
            x,
            y,
            visible: x >= near.x && x <= far.x && y >= near.y && y <= far.y,
        }
    }

    /// Screen position of the centre of a cell.
    #[must_use]
    pub fn cell_to_screen(&self, cell: CellIndex) -> ScreenPoint {
        self.world_to_screen(cell_to_world(cell))
    }

    fn cell_rect(&self, cell: CellIndex) -> PixelRect {
        let (ox, oy) = self.origin.to_pixels();
        let origin = IVec2::new(
            cell.x() * PIXELS_PER_CELL - ox,
            cell.y() * PIXELS_PER_CELL - oy,
        ) + self.area.origin;
        PixelRect::new(origin, IVec2::splat(PIXELS_PER_CELL))
    }

    /// Scrolls by a pixel delta; positive values move right and down.
    pub fn scroll(&mut self, dx: i32, dy: i32) {
        let moved = self.origin.offset(
            dx.saturating_mul(LEPTONS_PER_PIXEL),
            dy.saturating_mul(LEPTONS_PER_PIXEL),
        );
        self.origin = self.clamp_origin(moved);
    }

    /// Places the top-left corner of the view at `position`.
    pub fn scroll_to(&mut self, position: WorldPosition) {
        if position.is_none() {
            return;
        }
        self.origin = self.clamp_origin(position);
    }

    /// Places the top-left corner of the view at the top-left corner of `cell`.
    pub fn jump_to_cell(&mut self, cell: CellIndex) {
        if cell.is_none() {
            return;
        }
        self.scroll_to(WorldPosition::new(
            cell.x() * LEPTONS_PER_CELL,
            cell.y() * LEPTONS_PER_CELL,
        ));
    }

    /// Centres the view on `position`.
    pub fn center_on(&mut self, position: WorldPosition) {
        if position.is_none() {
            return;
        }
        self.scroll_to(self.snapshot().origin_centering(position));
        debug!(x = self.origin.x(), y = self.origin.y(), "viewport_centered");
    }

    /// Centres the view on the centre of `cell`.
    pub fn center_on_cell(&mut self, cell: CellIndex) {
        self.center_on(cell_to_world(cell));
    }

    /// Applies a request produced by a camera system.
    pub fn apply(&mut self, request: ScrollRequest) {
        match request {
            ScrollRequest::By { dx, dy } => self.scroll(dx, dy),
            ScrollRequest::To { position } => self.scroll_to(position),
            ScrollRequest::CenterOn { position } => self.center_on(position),
        }
    }

    /// Keeps the view inside the play area when constrained.
    ///
    /// A view larger than the play area pins to its top-left corner.
    fn clamp_origin(&self, position: WorldPosition) -> WorldPosition {
        if !self.constrained {
            return position;
        }
        let bounds = self.grid.bounds();
        let clamp_axis = |value: i32, start: i32, end: i32, extent: i32| {
            let min = start * LEPTONS_PER_CELL;
            let max = (end * LEPTONS_PER_CELL)
                .saturating_sub(extent.saturating_mul(LEPTONS_PER_PIXEL));
            if max < min {
                min
            } else {
                value.clamp(min, max)
            }
        };
        WorldPosition::new(
            clamp_axis(position.x(), bounds.x(), bounds.right(), self.area.size.x),
            clamp_axis(position.y(), bounds.y(), bounds.bottom(), self.area.size.y),
        )
    }

    /// Cell last reported under the pointer.
    #[must_use]
    pub const fn cursor_cell(&self) -> CellIndex {
        self.cursor
    }

    /// Replaces the cursor cell.
    pub fn set_cursor_cell(&mut self, cell: CellIndex) {
        self.cursor = cell;
    }

    /// Sets the cursor cell to whatever lies under a screen pixel.
    pub fn track_pointer(&mut self, sx: i32, sy: i32) -> CellIndex {
        self.cursor = self.screen_to_cell(sx, sy);
        self.cursor
    }

    /// Replaces the colour context of the cursor highlight.
    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    /// Starts a drag selection anchored at a screen pixel.
    pub fn begin_selection(&mut self, anchor: IVec2) {
        self.selection = Some((anchor, anchor));
    }

    /// Moves the free corner of the drag selection.
    pub fn update_selection(&mut self, corner: IVec2) {
        if let Some((_, free)) = self.selection.as_mut() {
            *free = corner;
        }
    }

    /// Abandons the drag selection.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Normalised screen rectangle of the drag selection, if one is active.
    #[must_use]
    pub fn selection(&self) -> Option<PixelRect> {
        self.selection
            .map(|(anchor, corner)| PixelRect::from_corners(anchor, corner))
    }

    /// Draws the visible cells followed by the cursor and selection overlays.
    ///
    /// The surface stays locked only while drawing and is presented after it
    /// has been released. A viewport with an empty tactical area releases the
    /// lock without drawing or presenting.
    pub fn render<S, P>(&self, surface: &mut S, painter: &mut P) -> Result<FrameStats, RasterError>
    where
        S: RasterSurface,
        P: LayerPainter + ?Sized,
    {
        let mut stats = FrameStats::default();
        {
            let mut lock = SurfaceLock::acquire(surface)?;
            if self.area.is_empty() {
                debug!("viewport_uninitialised");
                return Ok(stats);
            }
            let mut canvas = Canvas::new(&mut *lock, self.area);

            for index in self.visible_cell_window().cells() {
                let tile = Tile {
                    index,
                    cell: self.grid.cell(index),
                    rect: self.cell_rect(index),
                };
                stats.cells += 1;

                if tile.cell.visibility() == Visibility::NeverSeen {
                    painter.draw_shroud(&mut canvas, &tile);
                    stats.shrouded += 1;
                    continue;
                }
                painter.draw_terrain(&mut canvas, &tile);
                if tile.cell.overlay().is_some() {
                    painter.draw_overlay(&mut canvas, &tile);
                    stats.overlays += 1;
                }
                if tile.cell.is_occupied() {
                    painter.draw_occupants(&mut canvas, &tile);
                    stats.occupied += 1;
                }
                if !tile.cell.is_visible() {
                    painter.draw_fog(&mut canvas, &tile);
                    stats.fogged += 1;
                }
            }

            self.draw_cursor(&mut canvas);
            self.draw_selection(&mut canvas);
        }
        surface.present()?;
        trace!(
            cells = stats.cells,
            shrouded = stats.shrouded,
            fogged = stats.fogged,
            "frame_rendered"
        );
        Ok(stats)
    }

    fn draw_cursor(&self, canvas: &mut Canvas<'_>) {
        if !self.visible_cell_window().contains(self.cursor) {
            return;
        }
        let rect = self.cell_rect(self.cursor);
        canvas.draw_box(
            rect.origin,
            rect.end() - IVec2::ONE,
            self.cursor_style.color(),
        );
    }

    fn draw_selection(&self, canvas: &mut Canvas<'_>) {
        if let Some((anchor, corner)) = self.selection {
            canvas.draw_box(anchor, corner, palette::SELECTION);
        }
    }
}

fn tactical_rect(screen_x: i32, screen_y: i32, width: i32, height: i32) -> PixelRect {
    let limit = |value: i32| value.clamp(0, MAX_TACTICAL_EXTENT);
    PixelRect::new(
        IVec2::new(limit(screen_x), limit(screen_y)),
        IVec2::new(limit(width), limit(height)),
    )
}
