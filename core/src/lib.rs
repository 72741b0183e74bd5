#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tactical map engine.
//!
//! This crate defines the coordinate vocabulary and the message surface that
//! connects adapters, the authoritative grid, and pure systems. Adapters
//! submit [`Command`] values describing desired cell mutations, the world
//! executes those commands via its `apply` entry point, and then reports
//! [`Event`] values describing what actually changed. Systems that steer the
//! camera respond with [`ScrollRequest`] batches instead of touching the
//! viewport directly.

use serde::{Deserialize, Serialize};

pub mod coord;

pub use coord::{
    adjacent_cell, cell_distance, cell_to_world, direction, distance, move_position,
    snap_to_cell_center, world_to_cell, CellIndex, Direction, Facing, WorldPosition,
    GRID_CELL_COUNT, GRID_HEIGHT, GRID_WIDTH, LEPTONS_PER_CELL, LEPTONS_PER_PIXEL,
    MAP_HEIGHT_LEPTONS, MAP_WIDTH_LEPTONS, PIXELS_PER_CELL, PIXEL_LEPTON_SHIFT,
};

/// Maximum number of occupants a single cell can hold.
pub const CELL_OCCUPANT_CAPACITY: usize = 4;

/// Commands that express all permissible grid mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Clears every cell and restores the default play area for a new scenario.
    ResetGrid {
        /// Terrain theme of the scenario being loaded.
        theater: Theater,
    },
    /// Replaces the scenario play area.
    SetBounds {
        /// Requested play area, clamped to the physical grid by the world.
        bounds: GridBounds,
    },
    /// Assigns terrain to a cell.
    SetTerrain {
        /// Cell receiving the terrain.
        cell: CellIndex,
        /// Terrain reference, or `None` to clear it.
        terrain: Option<TerrainRef>,
    },
    /// Assigns an overlay to a cell.
    SetOverlay {
        /// Cell receiving the overlay.
        cell: CellIndex,
        /// Overlay reference, or `None` to clear it.
        overlay: Option<OverlayRef>,
    },
    /// Removes resource stages from a resource overlay.
    HarvestResource {
        /// Cell holding the resource.
        cell: CellIndex,
        /// Number of stages to remove.
        amount: u8,
    },
    /// Lifts the shroud from a cell.
    RevealCell {
        /// Cell being revealed.
        cell: CellIndex,
        /// Whether the cell becomes currently visible rather than previously seen.
        make_visible: bool,
    },
    /// Drops a currently visible cell back to previously seen.
    ShroudCell {
        /// Cell being shrouded.
        cell: CellIndex,
    },
    /// Places an occupant into a cell.
    PlaceOccupant {
        /// Cell receiving the occupant.
        cell: CellIndex,
        /// Opaque handle of the occupant.
        occupant: OccupantId,
    },
    /// Removes an occupant from a cell.
    RemoveOccupant {
        /// Cell the occupant leaves.
        cell: CellIndex,
        /// Opaque handle of the occupant.
        occupant: OccupantId,
    },
    /// Replaces the marker flags of a cell.
    SetCellFlags {
        /// Cell whose flags change.
        cell: CellIndex,
        /// New flag set.
        flags: CellFlags,
    },
    /// Re-derives the land class of every cell inside the play area.
    RecalculateLand,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that every cell was cleared for a new scenario.
    GridReset {
        /// Terrain theme now active.
        theater: Theater,
    },
    /// Confirms the authoritative play area after clamping.
    BoundsChanged {
        /// Play area now in force.
        bounds: GridBounds,
    },
    /// Reports that the derived land class of a cell changed.
    LandChanged {
        /// Cell whose classification changed.
        cell: CellIndex,
        /// Classification before the change.
        from: LandClass,
        /// Classification after the change.
        to: LandClass,
    },
    /// Reports a shroud transition.
    VisibilityChanged {
        /// Cell whose visibility changed.
        cell: CellIndex,
        /// Visibility before the change.
        from: Visibility,
        /// Visibility after the change.
        to: Visibility,
    },
    /// Confirms that an occupant entered a cell.
    OccupantPlaced {
        /// Cell that received the occupant.
        cell: CellIndex,
        /// Opaque handle of the occupant.
        occupant: OccupantId,
    },
    /// Confirms that an occupant left a cell.
    OccupantRemoved {
        /// Cell the occupant left.
        cell: CellIndex,
        /// Opaque handle of the occupant.
        occupant: OccupantId,
    },
    /// Reports the value of resources removed from a cell.
    ResourceHarvested {
        /// Cell the resource was taken from.
        cell: CellIndex,
        /// Credit value of the harvested stages.
        value: u32,
    },
    /// Reports that a resource overlay ran out and was removed.
    ResourceDepleted {
        /// Cell that no longer holds a resource.
        cell: CellIndex,
    },
    /// Reports that a command addressing a cell was ignored.
    CommandRejected {
        /// Cell named by the rejected command.
        cell: CellIndex,
        /// Specific reason the command failed.
        reason: CellRejection,
    },
}

/// Reasons a cell command can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellRejection {
    /// The cell is the sentinel or lies outside the physical grid.
    OutOfMap,
    /// The cell already holds the maximum number of occupants.
    CellFull,
    /// The occupant is already present in the cell.
    AlreadyPresent,
    /// The cell holds no resource to harvest.
    NoResource,
}

/// Camera movements requested by systems and adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollRequest {
    /// Moves the view by a pixel delta.
    By {
        /// Horizontal delta in pixels; positive scrolls right.
        dx: i32,
        /// Vertical delta in pixels; positive scrolls down.
        dy: i32,
    },
    /// Places the top-left corner of the view at the provided position.
    To {
        /// Target top-left corner.
        position: WorldPosition,
    },
    /// Centres the view on the provided position.
    CenterOn {
        /// Target centre.
        position: WorldPosition,
    },
}

/// Read-only description of the viewport handed to camera systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSnapshot {
    /// World position of the top-left corner of the view.
    pub origin: WorldPosition,
    /// Screen column of the left edge of the tactical area.
    pub screen_x: i32,
    /// Screen row of the top edge of the tactical area.
    pub screen_y: i32,
    /// Width of the tactical area in pixels.
    pub width: i32,
    /// Height of the tactical area in pixels.
    pub height: i32,
}

impl ViewSnapshot {
    /// World position at the centre of the view.
    #[must_use]
    pub const fn center(&self) -> WorldPosition {
        self.origin.offset(
            (self.width / 2).saturating_mul(LEPTONS_PER_PIXEL),
            (self.height / 2).saturating_mul(LEPTONS_PER_PIXEL),
        )
    }

    /// Top-left position that would centre the view on `position`.
    #[must_use]
    pub const fn origin_centering(&self, position: WorldPosition) -> WorldPosition {
        position.offset(
            (self.width / 2).saturating_mul(-LEPTONS_PER_PIXEL),
            (self.height / 2).saturating_mul(-LEPTONS_PER_PIXEL),
        )
    }
}

/// Opaque handle of an entity situated within a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OccupantId(u32);

impl OccupantId {
    /// Creates a new occupant handle.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Terrain template and icon assigned to a cell by the asset resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainRef {
    template: u8,
    icon: u8,
}

impl TerrainRef {
    /// Creates a terrain reference.
    #[must_use]
    pub const fn new(template: u8, icon: u8) -> Self {
        Self { template, icon }
    }

    /// Template identifier.
    #[must_use]
    pub const fn template(&self) -> u8 {
        self.template
    }

    /// Sub-icon within the template.
    #[must_use]
    pub const fn icon(&self) -> u8 {
        self.icon
    }
}

/// Kinds of overlay that can decorate a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Gold ore, sparse.
    Gold1 = 0,
    /// Gold ore, light.
    Gold2 = 1,
    /// Gold ore, medium.
    Gold3 = 2,
    /// Gold ore, dense.
    Gold4 = 3,
    /// Gems, sparse.
    Gems1 = 4,
    /// Gems, light.
    Gems2 = 5,
    /// Gems, medium.
    Gems3 = 6,
    /// Gems, dense.
    Gems4 = 7,
    /// Sandbag wall.
    Sandbag = 8,
    /// Chain-link fence.
    Cyclone = 9,
    /// Concrete wall.
    Brick = 10,
    /// Barbed wire.
    Barbwire = 11,
    /// Wooden fence.
    Wood = 12,
    /// Supply crate.
    Crate = 13,
    /// Single haystack.
    Haystack = 14,
    /// Stacked hay bales.
    HayBales = 15,
}

impl OverlayKind {
    /// Decodes an overlay identifier issued by the asset resolver.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => Self::Gold1,
            1 => Self::Gold2,
            2 => Self::Gold3,
            3 => Self::Gold4,
            4 => Self::Gems1,
            5 => Self::Gems2,
            6 => Self::Gems3,
            7 => Self::Gems4,
            8 => Self::Sandbag,
            9 => Self::Cyclone,
            10 => Self::Brick,
            11 => Self::Barbwire,
            12 => Self::Wood,
            13 => Self::Crate,
            14 => Self::Haystack,
            15 => Self::HayBales,
            _ => return None,
        })
    }

    /// Identifier understood by the asset resolver.
    #[must_use]
    pub const fn raw(&self) -> u8 {
        *self as u8
    }

    /// Reports whether the overlay is harvestable gold or gems.
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        (*self as u8) <= Self::Gems4 as u8
    }

    /// Reports whether the overlay is gems rather than gold.
    #[must_use]
    pub const fn is_gems(&self) -> bool {
        matches!(self, Self::Gems1 | Self::Gems2 | Self::Gems3 | Self::Gems4)
    }

    /// Reports whether the overlay is a wall segment.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(
            self,
            Self::Sandbag | Self::Cyclone | Self::Brick | Self::Barbwire | Self::Wood
        )
    }

    /// Density stage of a resource overlay in `1..=4`, or `0` for other overlays.
    #[must_use]
    pub const fn resource_stage(&self) -> u8 {
        if self.is_resource() {
            (*self as u8 % 4) + 1
        } else {
            0
        }
    }
}

/// Overlay assigned to a cell together with its auxiliary byte.
///
/// The auxiliary byte holds the remaining resource amount for ore and gems
/// and the structural integrity for walls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayRef {
    kind: OverlayKind,
    aux: u8,
}

impl OverlayRef {
    /// Creates an overlay reference.
    #[must_use]
    pub const fn new(kind: OverlayKind, aux: u8) -> Self {
        Self { kind, aux }
    }

    /// Overlay kind.
    #[must_use]
    pub const fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Auxiliary byte.
    #[must_use]
    pub const fn aux(&self) -> u8 {
        self.aux
    }

    /// Copy of the reference with a different auxiliary byte.
    #[must_use]
    pub const fn with_aux(&self, aux: u8) -> Self {
        Self {
            kind: self.kind,
            aux,
        }
    }
}

/// Derived passability category of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandClass {
    /// Open ground.
    #[default]
    Clear,
    /// Paved road.
    Road,
    /// Open water.
    Water,
    /// Impassable rock.
    Rock,
    /// Wall overlay.
    Wall,
    /// Harvestable ore or gems.
    Resource,
    /// Shoreline.
    Beach,
    /// Broken ground.
    Rough,
    /// River bed.
    River,
}

impl LandClass {
    /// Ground speed on this land expressed as a percentage of clear terrain.
    #[must_use]
    pub const fn speed_multiplier(&self) -> u8 {
        match self {
            Self::Road => 150,
            Self::Clear => 100,
            Self::Resource => 80,
            Self::Beach => 70,
            Self::Rough => 50,
            Self::Water | Self::Rock | Self::Wall | Self::River => 0,
        }
    }
}

/// Fog-of-war state of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// The player has never seen the cell.
    #[default]
    NeverSeen,
    /// The cell was seen earlier but is not in view now.
    PreviouslySeen,
    /// The cell is in view now.
    CurrentlyVisible,
}

/// Marker flags carried by a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellFlags {
    /// The cell is part of a bridge.
    pub bridge: bool,
    /// The cell is a scenario waypoint.
    pub waypoint: bool,
    /// The cell marks a scenario objective.
    pub objective: bool,
}

/// Terrain theme of a scenario.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theater {
    /// Temperate outdoor terrain.
    #[default]
    Temperate,
    /// Winter outdoor terrain.
    Snow,
    /// Indoor terrain.
    Interior,
}

/// Scenario play area within the physical grid, measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl GridBounds {
    /// Play area leaving a one-cell border unused around the physical grid.
    pub const DEFAULT: Self = Self::new(1, 1, GRID_WIDTH - 2, GRID_HEIGHT - 2);

    /// Creates a play area from its origin and size.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamps the area so it has a positive size and fits inside the physical grid.
    #[must_use]
    pub fn clamped_to_grid(&self) -> Self {
        let x = self.x.clamp(0, GRID_WIDTH - 1);
        let y = self.y.clamp(0, GRID_HEIGHT - 1);
        let width = self.width.clamp(1, GRID_WIDTH - x);
        let height = self.height.clamp(1, GRID_HEIGHT - y);
        Self::new(x, y, width, height)
    }

    /// Leftmost column of the area.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Topmost row of the area.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Number of columns in the area.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Number of rows in the area.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Column one past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Row one past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the provided column and row lie inside the area.
    #[must_use]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

impl Default for GridBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}
