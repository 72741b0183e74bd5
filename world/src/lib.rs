#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the tactical map.
//!
//! The [`Grid`] owns every [`Cell`] of the fixed-size map together with the
//! scenario play area. Adapters mutate it through [`apply`], which executes a
//! single [`Command`] and reports what changed as [`Event`] values; read-only
//! helpers live in [`query`].

mod cell;
mod terrain;

pub use cell::{Cell, Harvest};
pub use terrain::{template_land_class, TEMPLATE_CLEAR};

use tactical_core::{
    world_to_cell, CellIndex, CellRejection, Command, Event, GridBounds, LandClass, Theater,
    WorldPosition, GRID_CELL_COUNT,
};
use tracing::{debug, info, trace};

/// Fixed-size cell array plus the scenario play area inside it.
///
/// Every lookup funnels through one physical-array check. Lookups that miss
/// land on a private scratch cell instead of failing; it never belongs to the
/// live map and is wiped by [`Grid::reset`].
#[derive(Clone, Debug)]
pub struct Grid {
    cells: Vec<Cell>,
    bounds: GridBounds,
    theater: Theater,
    dummy: Cell,
}

impl Grid {
    /// Allocates a cleared grid with the default play area.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::new(); GRID_CELL_COUNT],
            bounds: GridBounds::DEFAULT,
            theater: Theater::default(),
            dummy: Cell::new(),
        }
    }

    /// Clears every cell for a new scenario and restores the default play area.
    pub fn reset(&mut self, theater: Theater) {
        self.cells.iter_mut().for_each(Cell::clear);
        self.dummy.clear();
        self.bounds = GridBounds::DEFAULT;
        self.theater = theater;
        info!(?theater, "grid_reset");
    }

    /// Terrain theme of the loaded scenario.
    #[must_use]
    pub const fn theater(&self) -> Theater {
        self.theater
    }

    /// Scenario play area.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Replaces the play area, clamped to fit inside the physical grid.
    ///
    /// Returns the area actually applied.
    pub fn set_bounds(&mut self, x: i32, y: i32, width: i32, height: i32) -> GridBounds {
        self.bounds = GridBounds::new(x, y, width, height).clamped_to_grid();
        info!(
            x = self.bounds.x(),
            y = self.bounds.y(),
            width = self.bounds.width(),
            height = self.bounds.height(),
            "grid_bounds_set"
        );
        self.bounds
    }

    /// Reports whether the cell addresses the physical array.
    #[must_use]
    pub fn is_valid(&self, cell: CellIndex) -> bool {
        self.slot(cell).is_some()
    }

    /// Reports whether the cell lies inside the play area.
    #[must_use]
    pub fn is_in_bounds(&self, cell: CellIndex) -> bool {
        !cell.is_none() && self.bounds.contains(cell.x(), cell.y())
    }

    /// Top-left cell of the play area.
    #[must_use]
    pub const fn first_cell(&self) -> CellIndex {
        CellIndex::from_xy(self.bounds.x(), self.bounds.y())
    }

    /// Bottom-right cell of the play area.
    #[must_use]
    pub const fn last_cell(&self) -> CellIndex {
        CellIndex::from_xy(self.bounds.right() - 1, self.bounds.bottom() - 1)
    }

    fn slot(&self, cell: CellIndex) -> Option<usize> {
        cell.slot().filter(|slot| *slot < self.cells.len())
    }

    /// Cell at the index, if it addresses the physical array.
    #[must_use]
    pub fn get(&self, cell: CellIndex) -> Option<&Cell> {
        self.slot(cell).and_then(|slot| self.cells.get(slot))
    }

    /// Mutable cell at the index, if it addresses the physical array.
    pub fn get_mut(&mut self, cell: CellIndex) -> Option<&mut Cell> {
        self.slot(cell).and_then(|slot| self.cells.get_mut(slot))
    }

    /// Cell at the index, or the scratch cell for an invalid index.
    #[must_use]
    pub fn cell(&self, cell: CellIndex) -> &Cell {
        match self.slot(cell) {
            Some(slot) => &self.cells[slot],
            None => {
                trace!(raw = cell.raw(), "grid_dummy_read");
                &self.dummy
            }
        }
    }

    /// Mutable cell at the index, or the scratch cell for an invalid index.
    pub fn cell_mut(&mut self, cell: CellIndex) -> &mut Cell {
        match self.slot(cell) {
            Some(slot) => &mut self.cells[slot],
            None => {
                trace!(raw = cell.raw(), "grid_dummy_write");
                &mut self.dummy
            }
        }
    }

    /// Cell at the column and row.
    #[must_use]
    pub fn cell_at(&self, x: i32, y: i32) -> &Cell {
        self.cell(CellIndex::from_xy(x, y))
    }

    /// Mutable cell at the column and row.
    pub fn cell_at_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        self.cell_mut(CellIndex::from_xy(x, y))
    }

    /// Cell containing the world position.
    #[must_use]
    pub fn cell_at_position(&self, position: WorldPosition) -> &Cell {
        self.cell(world_to_cell(position))
    }

    /// Mutable cell containing the world position.
    pub fn cell_at_position_mut(&mut self, position: WorldPosition) -> &mut Cell {
        self.cell_mut(world_to_cell(position))
    }

    /// Pushes a column and row to the nearest point of the play area, per axis.
    #[must_use]
    pub fn clamp_to_bounds(&self, x: i32, y: i32) -> (i32, i32) {
        (
            x.clamp(self.bounds.x(), self.bounds.right() - 1),
            y.clamp(self.bounds.y(), self.bounds.bottom() - 1),
        )
    }

    /// Pushes a cell to the nearest cell of the play area.
    ///
    /// The sentinel carries no coordinates and is returned unchanged.
    #[must_use]
    pub fn clamp_cell_to_bounds(&self, cell: CellIndex) -> CellIndex {
        if cell.is_none() {
            return cell;
        }
        let (x, y) = self.clamp_to_bounds(cell.x(), cell.y());
        CellIndex::from_xy(x, y)
    }

    /// Pushes a world position to the nearest cell of the play area.
    #[must_use]
    pub fn clamp_position_to_bounds(&self, position: WorldPosition) -> CellIndex {
        if position.is_none() {
            return CellIndex::NONE;
        }
        let (x, y) = position.cell_xy();
        let (x, y) = self.clamp_to_bounds(x, y);
        CellIndex::from_xy(x, y)
    }

    /// Re-derives the land class of every cell inside the play area.
    pub fn recalculate_all(&mut self) {
        self.recalculate_all_with(|_, _, _| {});
    }

    fn recalculate_all_with<F>(&mut self, mut on_change: F)
    where
        F: FnMut(CellIndex, LandClass, LandClass),
    {
        let bounds = self.bounds;
        for y in bounds.y()..bounds.bottom() {
            for x in bounds.x()..bounds.right() {
                let index = CellIndex::from_xy(x, y);
                let Some(cell) = self.get_mut(index) else {
                    continue;
                };
                let before = cell.land_class();
                cell.recalculate_land();
                if cell.land_class() != before {
                    on_change(index, before, cell.land_class());
                }
            }
        }
    }

    /// Cells of the play area in row-major order.
    pub fn cells_in_bounds(&self) -> impl Iterator<Item = (CellIndex, &Cell)> + '_ {
        let bounds = self.bounds;
        (bounds.y()..bounds.bottom())
            .flat_map(move |y| (bounds.x()..bounds.right()).map(move |x| CellIndex::from_xy(x, y)))
            .map(move |index| (index, self.cell(index)))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the grid, emitting resulting events.
pub fn apply(grid: &mut Grid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResetGrid { theater } => {
            grid.reset(theater);
            out_events.push(Event::GridReset { theater });
        }
        Command::SetBounds { bounds } => {
            let bounds = grid.set_bounds(bounds.x(), bounds.y(), bounds.width(), bounds.height());
            out_events.push(Event::BoundsChanged { bounds });
        }
        Command::SetTerrain { cell, terrain } => {
            with_land_tracking(grid, cell, out_events, |target| target.set_terrain(terrain));
        }
        Command::SetOverlay { cell, overlay } => {
            with_land_tracking(grid, cell, out_events, |target| target.set_overlay(overlay));
        }
        Command::HarvestResource { cell, amount } => {
            let has_resource = grid
                .get(cell)
                .map(|target| target.resource_value() > 0);
            match has_resource {
                None => reject(cell, CellRejection::OutOfMap, out_events),
                Some(false) => reject(cell, CellRejection::NoResource, out_events),
                Some(true) => {
                    let mut harvest = Harvest::default();
                    with_land_tracking(grid, cell, out_events, |target| {
                        harvest = target.harvest(amount);
                    });
                    out_events.push(Event::ResourceHarvested {
                        cell,
                        value: harvest.value,
                    });
                    if harvest.depleted {
                        out_events.push(Event::ResourceDepleted { cell });
                    }
                }
            }
        }
        Command::RevealCell { cell, make_visible } => {
            with_visibility_tracking(grid, cell, out_events, |target| {
                let _ = target.reveal(make_visible);
            });
        }
        Command::ShroudCell { cell } => {
            with_visibility_tracking(grid, cell, out_events, |target| {
                let _ = target.shroud();
            });
        }
        Command::PlaceOccupant { cell, occupant } => {
            let Some(target) = grid.get_mut(cell) else {
                reject(cell, CellRejection::OutOfMap, out_events);
                return;
            };
            if target.has_occupant(occupant) {
                reject(cell, CellRejection::AlreadyPresent, out_events);
            } else if target.add_occupant(occupant) {
                out_events.push(Event::OccupantPlaced { cell, occupant });
            } else {
                reject(cell, CellRejection::CellFull, out_events);
            }
        }
        Command::RemoveOccupant { cell, occupant } => match grid.get_mut(cell) {
            Some(target) => {
                if target.remove_occupant(occupant) {
                    out_events.push(Event::OccupantRemoved { cell, occupant });
                }
            }
            None => reject(cell, CellRejection::OutOfMap, out_events),
        },
        Command::SetCellFlags { cell, flags } => match grid.get_mut(cell) {
            Some(target) => target.set_flags(flags),
            None => reject(cell, CellRejection::OutOfMap, out_events),
        },
        Command::RecalculateLand => {
            grid.recalculate_all_with(|cell, from, to| {
                out_events.push(Event::LandChanged { cell, from, to });
            });
        }
    }
}

fn with_land_tracking<F>(grid: &mut Grid, cell: CellIndex, out_events: &mut Vec<Event>, edit: F)
where
    F: FnOnce(&mut Cell),
{
    let Some(target) = grid.get_mut(cell) else {
        reject(cell, CellRejection::OutOfMap, out_events);
        return;
    };
    let from = target.land_class();
    edit(target);
    let to = target.land_class();
    if from != to {
        out_events.push(Event::LandChanged { cell, from, to });
    }
}

fn with_visibility_tracking<F>(
    grid: &mut Grid,
    cell: CellIndex,
    out_events: &mut Vec<Event>,
    edit: F,
) where
    F: FnOnce(&mut Cell),
{
    let Some(target) = grid.get_mut(cell) else {
        reject(cell, CellRejection::OutOfMap, out_events);
        return;
    };
    let from = target.visibility();
    edit(target);
    let to = target.visibility();
    if from != to {
        out_events.push(Event::VisibilityChanged { cell, from, to });
    }
}

fn reject(cell: CellIndex, reason: CellRejection, out_events: &mut Vec<Event>) {
    debug!(raw = cell.raw(), ?reason, "cell_command_rejected");
    out_events.push(Event::CommandRejected { cell, reason });
}

/// Query functions that provide read-only access to the grid.
pub mod query {
    use super::Grid;
    use tactical_core::{CellIndex, GridBounds, LandClass, Theater};

    /// Scenario play area.
    #[must_use]
    pub fn bounds(grid: &Grid) -> GridBounds {
        grid.bounds()
    }

    /// Terrain theme of the loaded scenario.
    #[must_use]
    pub fn theater(grid: &Grid) -> Theater {
        grid.theater()
    }

    /// Land class of the cell, or clear for an invalid index.
    #[must_use]
    pub fn land_class(grid: &Grid, cell: CellIndex) -> LandClass {
        grid.cell(cell).land_class()
    }

    /// Number of play-area cells that are in view right now.
    #[must_use]
    pub fn visible_cell_count(grid: &Grid) -> usize {
        grid.cells_in_bounds()
            .filter(|(_, cell)| cell.is_visible())
            .count()
    }

    /// Play-area cells holding at least one occupant, in row-major order.
    #[must_use]
    pub fn occupied_cells(grid: &Grid) -> Vec<CellIndex> {
        grid.cells_in_bounds()
            .filter(|(_, cell)| cell.is_occupied())
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactical_core::{OccupantId, OverlayKind, OverlayRef, TerrainRef, GRID_WIDTH};

    #[test]
    fn new_grid_uses_default_bounds() {
        let grid = Grid::new();
        assert_eq!(grid.bounds(), GridBounds::DEFAULT);
        assert_eq!(grid.first_cell(), CellIndex::from_xy(1, 1));
        assert_eq!(grid.last_cell(), CellIndex::from_xy(126, 126));
    }

    #[test]
    fn clamp_pushes_each_axis_independently() {
        let mut grid = Grid::new();
        let _ = grid.set_bounds(10, 10, 50, 50);
        assert_eq!(grid.clamp_to_bounds(5, 5), (10, 10));
        assert_eq!(grid.clamp_to_bounds(30, 100), (30, 59));
        assert_eq!(grid.clamp_to_bounds(70, 20), (59, 20));
        assert_eq!(grid.clamp_to_bounds(30, 30), (30, 30));
    }

    #[test]
    fn clamp_is_idempotent() {
        let mut grid = Grid::new();
        let _ = grid.set_bounds(4, 7, 20, 9);
        for (x, y) in [(-3, 2), (0, 100), (50, 50), (10, 10), (127, -9)] {
            let once = grid.clamp_to_bounds(x, y);
            assert_eq!(grid.clamp_to_bounds(once.0, once.1), once);
        }
    }

    #[test]
    fn clamping_a_cell_keeps_the_sentinel() {
        let grid = Grid::new();
        assert!(grid.clamp_cell_to_bounds(CellIndex::NONE).is_none());
        assert_eq!(
            grid.clamp_cell_to_bounds(CellIndex::from_xy(0, 127)),
            CellIndex::from_xy(1, 126)
        );
    }

    #[test]
    fn clamping_a_position_uses_raw_cell_coordinates() {
        let grid = Grid::new();
        let beyond = WorldPosition::new(-50_000, 10 * tactical_core::LEPTONS_PER_CELL);
        assert_eq!(
            grid.clamp_position_to_bounds(beyond),
            CellIndex::from_xy(1, 10)
        );
    }

    #[test]
    fn set_bounds_fits_inside_physical_grid() {
        let mut grid = Grid::new();
        let applied = grid.set_bounds(-4, 100, 0, 90);
        assert_eq!(applied, GridBounds::new(0, 100, 1, 28));
        assert_eq!(grid.bounds(), applied);
    }

    #[test]
    fn lookups_agree_across_addressing_modes() {
        let mut grid = Grid::new();
        grid.cell_at_mut(12, 34).set_template(30, 1);
        let index = CellIndex::from_xy(12, 34);
        let position = tactical_core::cell_to_world(index);
        assert_eq!(grid.cell(index).land_class(), LandClass::Road);
        assert_eq!(grid.cell_at_position(position).land_class(), LandClass::Road);
        assert_eq!(grid.cell_at(12, 34).terrain(), Some(TerrainRef::new(30, 1)));
    }

    #[test]
    fn invalid_access_lands_on_scratch_cell() {
        let mut grid = Grid::new();
        grid.cell_mut(CellIndex::NONE).set_template(20, 0);
        grid.cell_at_mut(GRID_WIDTH, 0).set_template(20, 0);
        assert_eq!(grid.cell_at(-1, -1).land_class(), LandClass::Rock);
        assert!(grid
            .cells
            .iter()
            .all(|cell| cell.land_class() == LandClass::Clear));

        grid.reset(Theater::Snow);
        assert_eq!(grid.cell(CellIndex::NONE).land_class(), LandClass::Clear);
        assert_eq!(grid.theater(), Theater::Snow);
    }

    #[test]
    fn reset_clears_cells_and_bounds() {
        let mut grid = Grid::new();
        let _ = grid.set_bounds(20, 20, 40, 20);
        assert!(grid.cell_at_mut(30, 30).reveal(true));
        grid.reset(Theater::Temperate);
        assert_eq!(grid.bounds(), GridBounds::DEFAULT);
        assert!(!grid.cell_at(30, 30).is_revealed());
    }

    #[test]
    fn in_bounds_iteration_is_row_major() {
        let mut grid = Grid::new();
        let _ = grid.set_bounds(5, 8, 3, 2);
        let order: Vec<(i32, i32)> = grid
            .cells_in_bounds()
            .map(|(index, _)| (index.x(), index.y()))
            .collect();
        assert_eq!(
            order,
            vec![(5, 8), (6, 8), (7, 8), (5, 9), (6, 9), (7, 9)]
        );
    }

    #[test]
    fn apply_reports_land_changes() {
        let mut grid = Grid::new();
        let mut events = Vec::new();
        let cell = CellIndex::from_xy(64, 64);

        apply(
            &mut grid,
            Command::SetOverlay {
                cell,
                overlay: Some(OverlayRef::new(OverlayKind::Gold2, 10)),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::LandChanged {
                cell,
                from: LandClass::Clear,
                to: LandClass::Resource,
            }]
        );
    }

    #[test]
    fn apply_rejects_full_cells() {
        let mut grid = Grid::new();
        let mut events = Vec::new();
        let cell = CellIndex::from_xy(3, 3);
        for id in 0..5 {
            apply(
                &mut grid,
                Command::PlaceOccupant {
                    cell,
                    occupant: OccupantId::new(id),
                },
                &mut events,
            );
        }
        assert_eq!(
            events.last(),
            Some(&Event::CommandRejected {
                cell,
                reason: CellRejection::CellFull,
            })
        );
        assert_eq!(grid.cell(cell).occupant_count(), 4);
        assert!(!grid.cell(cell).has_occupant(OccupantId::new(4)));
    }

    #[test]
    fn apply_never_touches_scratch_cell() {
        let mut grid = Grid::new();
        let mut events = Vec::new();
        apply(
            &mut grid,
            Command::SetTerrain {
                cell: CellIndex::NONE,
                terrain: Some(TerrainRef::new(20, 0)),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CommandRejected {
                cell: CellIndex::NONE,
                reason: CellRejection::OutOfMap,
            }]
        );
        assert_eq!(grid.cell(CellIndex::NONE).land_class(), LandClass::Clear);
    }

    #[test]
    fn recalculate_is_stable_after_setters() {
        let mut grid = Grid::new();
        let _ = grid.set_bounds(10, 10, 2, 2);
        grid.cell_at_mut(10, 11).set_template(12, 0);
        grid.cell_at_mut(0, 0).set_template(20, 0);
        let mut events = Vec::new();
        apply(&mut grid, Command::RecalculateLand, &mut events);
        assert!(events.is_empty());
        grid.recalculate_all();
        assert_eq!(
            query::land_class(&grid, CellIndex::from_xy(10, 11)),
            LandClass::Beach
        );
        assert_eq!(query::land_class(&grid, CellIndex::from_xy(0, 0)), LandClass::Rock);
    }
}
