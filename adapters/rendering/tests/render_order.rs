use glam::IVec2;
use tactical_core::{CellIndex, Command, OccupantId, OverlayKind, OverlayRef, TerrainRef};
use tactical_rendering::{
    palette, BufferLayout, Canvas, FrameStats, IndexedFrame, LayerPainter, PalettePainter,
    RasterError, RasterSurface, Tile, Viewport, ViewportConfig,
};
use tactical_world::{apply, Grid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layer {
    Shroud,
    Terrain,
    Overlay,
    Occupants,
    Fog,
}

#[derive(Default)]
struct RecordingPainter {
    calls: Vec<(CellIndex, Layer)>,
}

impl RecordingPainter {
    fn layers_of(&self, cell: CellIndex) -> Vec<Layer> {
        self.calls
            .iter()
            .filter(|(index, _)| *index == cell)
            .map(|(_, layer)| *layer)
            .collect()
    }
}

impl LayerPainter for RecordingPainter {
    fn draw_shroud(&mut self, _canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        self.calls.push((tile.index, Layer::Shroud));
    }

    fn draw_terrain(&mut self, _canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        self.calls.push((tile.index, Layer::Terrain));
    }

    fn draw_overlay(&mut self, _canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        self.calls.push((tile.index, Layer::Overlay));
    }

    fn draw_occupants(&mut self, _canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        self.calls.push((tile.index, Layer::Occupants));
    }

    fn draw_fog(&mut self, _canvas: &mut Canvas<'_>, tile: &Tile<'_>) {
        self.calls.push((tile.index, Layer::Fog));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SurfaceCall {
    Acquire,
    Release,
    Present,
}

struct RecordingSurface {
    layout: BufferLayout,
    pixels: Vec<u8>,
    locked: bool,
    refuse_lock: bool,
    calls: Vec<SurfaceCall>,
}

impl RecordingSurface {
    fn new() -> Self {
        Self {
            layout: BufferLayout {
                width: 640,
                height: 400,
                stride: 640,
            },
            pixels: vec![0; 640 * 400],
            locked: false,
            refuse_lock: false,
            calls: Vec::new(),
        }
    }
}

impl RasterSurface for RecordingSurface {
    fn acquire_pixel_buffer(&mut self) -> Result<BufferLayout, RasterError> {
        if self.refuse_lock {
            return Err(RasterError::Unavailable {
                reason: "display lost".to_owned(),
            });
        }
        assert!(!self.locked, "surface locked twice");
        self.locked = true;
        self.calls.push(SurfaceCall::Acquire);
        Ok(self.layout)
    }

    fn pixel_buffer_mut(&mut self) -> Option<&mut [u8]> {
        self.locked.then_some(self.pixels.as_mut_slice())
    }

    fn layout(&self) -> BufferLayout {
        self.layout
    }

    fn release_pixel_buffer(&mut self) {
        assert!(self.locked, "released a surface that was not locked");
        self.locked = false;
        self.calls.push(SurfaceCall::Release);
    }

    fn present(&mut self) -> Result<(), RasterError> {
        assert!(!self.locked, "presented while locked");
        self.calls.push(SurfaceCall::Present);
        Ok(())
    }
}

fn run(grid: &mut Grid, commands: impl IntoIterator<Item = Command>) {
    let mut events = Vec::new();
    for command in commands {
        apply(grid, command, &mut events);
    }
}

/// Viewport at cell 10,10 with one visible clear cell and one fogged clear cell.
fn scene() -> Viewport {
    let mut grid = Grid::new();
    let visible = CellIndex::from_xy(10, 10);
    let fogged = CellIndex::from_xy(11, 10);
    run(
        &mut grid,
        [
            Command::SetTerrain {
                cell: visible,
                terrain: Some(TerrainRef::new(0, 0)),
            },
            Command::RevealCell {
                cell: visible,
                make_visible: true,
            },
            Command::SetTerrain {
                cell: fogged,
                terrain: Some(TerrainRef::new(0, 0)),
            },
            Command::RevealCell {
                cell: fogged,
                make_visible: false,
            },
        ],
    );
    let mut viewport = Viewport::new(grid, ViewportConfig::CLASSIC);
    viewport.jump_to_cell(visible);
    viewport
}

#[test]
fn never_seen_cells_only_receive_shroud() {
    let viewport = scene();
    let mut painter = RecordingPainter::default();
    let mut surface = RecordingSurface::new();
    let _ = viewport.render(&mut surface, &mut painter).expect("render");

    assert_eq!(
        painter.layers_of(CellIndex::from_xy(20, 15)),
        vec![Layer::Shroud]
    );
    assert_eq!(
        painter.layers_of(CellIndex::from_xy(10, 10)),
        vec![Layer::Terrain]
    );
}

#[test]
fn layers_are_drawn_bottom_up() {
    let mut viewport = scene();
    let cell = CellIndex::from_xy(11, 10);
    run(
        viewport.grid_mut(),
        [
            Command::SetOverlay {
                cell,
                overlay: Some(OverlayRef::new(OverlayKind::Gold3, 2)),
            },
            Command::PlaceOccupant {
                cell,
                occupant: OccupantId::new(7),
            },
        ],
    );

    let mut painter = RecordingPainter::default();
    let mut surface = RecordingSurface::new();
    let stats = viewport.render(&mut surface, &mut painter).expect("render");

    assert_eq!(
        painter.layers_of(cell),
        vec![Layer::Terrain, Layer::Overlay, Layer::Occupants, Layer::Fog]
    );
    assert_eq!(stats.overlays, 1);
    assert_eq!(stats.occupied, 1);
    assert_eq!(stats.fogged, 1);
}

#[test]
fn cells_are_visited_in_row_major_order() {
    let viewport = scene();
    let mut painter = RecordingPainter::default();
    let mut surface = RecordingSurface::new();
    let stats = viewport.render(&mut surface, &mut painter).expect("render");

    let mut visited: Vec<CellIndex> = Vec::new();
    for (cell, _) in &painter.calls {
        if visited.last() != Some(cell) {
            visited.push(*cell);
        }
    }
    let expected: Vec<CellIndex> = viewport.visible_cell_window().cells().collect();
    assert_eq!(visited, expected);
    assert_eq!(stats.cells, expected.len());
    assert_eq!(stats.cells, 28 * 18);
    assert_eq!(stats.shrouded, stats.cells - 2);
}

#[test]
fn surface_is_released_before_present() {
    let viewport = scene();
    let mut surface = RecordingSurface::new();
    let _ = viewport
        .render(&mut surface, &mut RecordingPainter::default())
        .expect("render");
    assert_eq!(
        surface.calls,
        vec![SurfaceCall::Acquire, SurfaceCall::Release, SurfaceCall::Present]
    );
}

#[test]
fn empty_tactical_area_releases_without_drawing() {
    let mut viewport = scene();
    viewport.set_tactical_area(0, 16, 0, 0);

    let mut painter = RecordingPainter::default();
    let mut surface = RecordingSurface::new();
    let stats = viewport.render(&mut surface, &mut painter).expect("render");

    assert_eq!(stats, FrameStats::default());
    assert!(painter.calls.is_empty());
    assert_eq!(
        surface.calls,
        vec![SurfaceCall::Acquire, SurfaceCall::Release]
    );
}

#[test]
fn lock_failure_is_reported() {
    let viewport = scene();
    let mut surface = RecordingSurface::new();
    surface.refuse_lock = true;

    let result = viewport.render(&mut surface, &mut RecordingPainter::default());
    assert!(matches!(result, Err(RasterError::Unavailable { .. })));
    assert!(surface.calls.is_empty());
}

#[test]
fn palette_painter_fills_indexed_frame() {
    let mut viewport = scene();
    viewport.set_cursor_cell(CellIndex::from_xy(10, 10));
    viewport.begin_selection(IVec2::new(100, 100));
    viewport.update_selection(IVec2::new(120, 130));

    let mut frame = IndexedFrame::new(640, 400);
    frame.clear(7);
    let _ = viewport
        .render(&mut frame, &mut PalettePainter)
        .expect("render");

    assert!(!frame.is_locked());
    assert_eq!(frame.presented(), 1);

    assert_eq!(frame.pixel(5, 5), Some(7), "tab bar stays untouched");
    assert_eq!(frame.pixel(5, 20), Some(palette::CLEAR));

    assert_eq!(frame.pixel(0, 16), Some(palette::CURSOR_ALLY));
    assert_eq!(frame.pixel(23, 30), Some(palette::CURSOR_ALLY));

    assert_eq!(frame.pixel(24, 16), Some(palette::SHROUD), "fog dither");
    assert_eq!(frame.pixel(25, 16), Some(palette::CLEAR));

    assert_eq!(frame.pixel(100, 100), Some(palette::SELECTION));
    assert_eq!(frame.pixel(110, 130), Some(palette::SELECTION));
    assert_eq!(frame.pixel(110, 115), Some(palette::SHROUD));
}
