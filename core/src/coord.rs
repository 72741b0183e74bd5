//! Fixed-point coordinate math shared by every layer of the tactical map.
//!
//! Three spaces are related here: world positions measured in leptons, cell
//! indices into the fixed-size grid, and pixels. Every conversion is integer
//! only so results are identical on every platform.

use serde::{Deserialize, Serialize};

/// Number of leptons that make up a single pixel.
pub const LEPTONS_PER_PIXEL: i32 = 256;

/// Shift converting leptons to pixels and back.
pub const PIXEL_LEPTON_SHIFT: u32 = 8;

/// Edge length of a square cell in pixels.
pub const PIXELS_PER_CELL: i32 = 24;

/// Edge length of a square cell in leptons.
pub const LEPTONS_PER_CELL: i32 = PIXELS_PER_CELL * LEPTONS_PER_PIXEL;

/// Number of cell columns in the physical grid.
pub const GRID_WIDTH: i32 = 128;

/// Number of cell rows in the physical grid.
pub const GRID_HEIGHT: i32 = 128;

/// Total number of cells in the physical grid.
pub const GRID_CELL_COUNT: usize = (GRID_WIDTH * GRID_HEIGHT) as usize;

/// Width of the whole map expressed in leptons.
pub const MAP_WIDTH_LEPTONS: i32 = GRID_WIDTH * LEPTONS_PER_CELL;

/// Height of the whole map expressed in leptons.
pub const MAP_HEIGHT_LEPTONS: i32 = GRID_HEIGHT * LEPTONS_PER_CELL;

const CELL_DISTANCE_NONE: i32 = 0x7FFF;

/// Arctangent of `i / 32` for `i` in `0..=32`, expressed in 256-step angle units.
const ATAN_TABLE: [u8; 33] = [
    0, 1, 3, 4, 5, 6, 8, 9, 10, 11, 12, 13, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 25, 26, 27,
    28, 29, 29, 30, 31, 31, 32,
];

/// Quarter sine wave scaled to 127, indexed by 256-step angle in `0..=64`.
const SINE_TABLE: [i32; 65] = [
    0, 3, 6, 9, 12, 16, 19, 22, 25, 28, 31, 34, 37, 40, 43, 46, 49, 51, 54, 57, 60, 63, 65, 68, 71,
    73, 76, 78, 81, 83, 85, 88, 90, 92, 94, 96, 98, 100, 102, 104, 106, 107, 109, 111, 112, 113,
    115, 116, 117, 118, 120, 121, 122, 122, 123, 124, 125, 125, 126, 126, 126, 127, 127, 127, 127,
];

const SINE_SCALE: i64 = 127;

/// Position in the world measured in leptons from the top-left map corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPosition {
    x: i32,
    y: i32,
}

impl WorldPosition {
    /// Sentinel denoting the absence of a position.
    pub const NONE: Self = Self {
        x: i32::MIN,
        y: i32::MIN,
    };

    /// Creates a position from lepton coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a position from world pixel coordinates.
    #[must_use]
    pub const fn from_pixels(x: i32, y: i32) -> Self {
        Self {
            x: x << PIXEL_LEPTON_SHIFT,
            y: y << PIXEL_LEPTON_SHIFT,
        }
    }

    /// Horizontal coordinate in leptons.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate in leptons.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Reports whether the position is the sentinel.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.x == i32::MIN && self.y == i32::MIN
    }

    /// World pixel coordinates containing the position.
    ///
    /// The arithmetic shift rounds towards negative infinity, so positions
    /// left of or above the map land on negative pixels.
    #[must_use]
    pub const fn to_pixels(&self) -> (i32, i32) {
        (self.x >> PIXEL_LEPTON_SHIFT, self.y >> PIXEL_LEPTON_SHIFT)
    }

    /// Raw cell column and row containing the position, without any clamping.
    #[must_use]
    pub fn cell_xy(&self) -> (i32, i32) {
        let (px, py) = self.to_pixels();
        (px.div_euclid(PIXELS_PER_CELL), py.div_euclid(PIXELS_PER_CELL))
    }

    /// Offsets the position by the provided lepton deltas.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Index of a single cell packed as `y * GRID_WIDTH + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(u16);

impl CellIndex {
    /// Sentinel denoting the absence of a cell.
    pub const NONE: Self = Self(u16::MAX);

    /// Creates an index for the provided column and row.
    ///
    /// Coordinates outside the physical grid produce [`CellIndex::NONE`].
    #[must_use]
    pub const fn from_xy(x: i32, y: i32) -> Self {
        if x < 0 || y < 0 || x >= GRID_WIDTH || y >= GRID_HEIGHT {
            return Self::NONE;
        }
        Self((y * GRID_WIDTH + x) as u16)
    }

    /// Reinterprets a packed value, mapping anything outside the grid to the sentinel.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        if (raw as usize) < GRID_CELL_COUNT {
            Self(raw)
        } else {
            Self::NONE
        }
    }

    /// Packed representation of the index.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.0
    }

    /// Reports whether the index is the sentinel.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == u16::MAX
    }

    /// Column of the cell, or `-1` for the sentinel.
    #[must_use]
    pub const fn x(&self) -> i32 {
        if self.is_none() {
            return -1;
        }
        self.0 as i32 % GRID_WIDTH
    }

    /// Row of the cell, or `-1` for the sentinel.
    #[must_use]
    pub const fn y(&self) -> i32 {
        if self.is_none() {
            return -1;
        }
        self.0 as i32 / GRID_WIDTH
    }

    /// Position of the cell inside the flat cell array.
    #[must_use]
    pub const fn slot(&self) -> Option<usize> {
        if self.is_none() {
            None
        } else {
            Some(self.0 as usize)
        }
    }
}

/// Circular direction in 256 steps; 0 points up and 64 points right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    /// Facing towards decreasing rows.
    pub const NORTH: Self = Self(0);
    /// Facing towards increasing columns and decreasing rows.
    pub const NORTH_EAST: Self = Self(32);
    /// Facing towards increasing columns.
    pub const EAST: Self = Self(64);
    /// Facing towards increasing columns and rows.
    pub const SOUTH_EAST: Self = Self(96);
    /// Facing towards increasing rows.
    pub const SOUTH: Self = Self(128);
    /// Facing towards decreasing columns and increasing rows.
    pub const SOUTH_WEST: Self = Self(160);
    /// Facing towards decreasing columns.
    pub const WEST: Self = Self(192);
    /// Facing towards decreasing columns and rows.
    pub const NORTH_WEST: Self = Self(224);

    /// Creates a direction from its raw step value.
    #[must_use]
    pub const fn new(steps: u8) -> Self {
        Self(steps)
    }

    /// Raw step value in `0..256`.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        Self(self.0.wrapping_add(128))
    }

    /// Signed shortest turn from `self` to `other` in `-128..=127`.
    #[must_use]
    pub const fn delta_to(&self, other: Self) -> i32 {
        other.0.wrapping_sub(self.0) as i8 as i32
    }

    /// Rounds the direction to the nearest of the eight compass facings.
    #[must_use]
    pub const fn to_facing(&self) -> Facing {
        Facing::ALL[((self.0 as usize + 16) >> 5) & 7]
    }

    /// Direction matching the provided compass facing.
    #[must_use]
    pub const fn from_facing(facing: Facing) -> Self {
        Self((facing as u8) << 5)
    }

    fn sine(&self) -> i32 {
        let quadrant = self.0 >> 6;
        let step = usize::from(self.0 & 63);
        match quadrant {
            0 => SINE_TABLE[step],
            1 => SINE_TABLE[64 - step],
            2 => -SINE_TABLE[step],
            _ => -SINE_TABLE[64 - step],
        }
    }

    fn cosine(&self) -> i32 {
        Self(self.0.wrapping_add(64)).sine()
    }
}

/// The eight compass facings in clockwise order starting at north.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Up.
    North = 0,
    /// Up and right.
    NorthEast = 1,
    /// Right.
    East = 2,
    /// Down and right.
    SouthEast = 3,
    /// Down.
    South = 4,
    /// Down and left.
    SouthWest = 5,
    /// Left.
    West = 6,
    /// Up and left.
    NorthWest = 7,
}

impl Facing {
    /// All facings in clockwise order starting at north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Column and row offset of the neighbouring cell in this facing.
    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }
}

/// Position at the centre of the provided cell.
#[must_use]
pub const fn cell_to_world(cell: CellIndex) -> WorldPosition {
    if cell.is_none() {
        return WorldPosition::NONE;
    }
    let half = PIXELS_PER_CELL / 2;
    WorldPosition::from_pixels(
        cell.x() * PIXELS_PER_CELL + half,
        cell.y() * PIXELS_PER_CELL + half,
    )
}

/// Cell containing the provided position.
///
/// The conversion never clamps. Positions outside the physical grid yield
/// [`CellIndex::NONE`]; use [`WorldPosition::cell_xy`] to inspect the raw
/// coordinates instead.
#[must_use]
pub fn world_to_cell(position: WorldPosition) -> CellIndex {
    if position.is_none() {
        return CellIndex::NONE;
    }
    let (x, y) = position.cell_xy();
    CellIndex::from_xy(x, y)
}

/// Octagonal distance in leptons: the larger axis plus half of the smaller.
///
/// Returns `i32::MAX` when either side is the sentinel.
#[must_use]
pub fn distance(from: WorldPosition, to: WorldPosition) -> i32 {
    if from.is_none() || to.is_none() {
        return i32::MAX;
    }
    let dx = u64::from(from.x().abs_diff(to.x()));
    let dy = u64::from(from.y().abs_diff(to.y()));
    let octagonal = dx.max(dy) + dx.min(dy) / 2;
    i32::try_from(octagonal).unwrap_or(i32::MAX)
}

/// Chebyshev distance between two cells, counted in cells.
#[must_use]
pub fn cell_distance(from: CellIndex, to: CellIndex) -> i32 {
    if from.is_none() || to.is_none() {
        return CELL_DISTANCE_NONE;
    }
    (from.x() - to.x()).abs().max((from.y() - to.y()).abs())
}

/// Direction from one position to another, derived from their pixel deltas.
///
/// Coincident positions and the sentinel both face north.
#[must_use]
pub fn direction(from: WorldPosition, to: WorldPosition) -> Direction {
    if from.is_none() || to.is_none() {
        return Direction::NORTH;
    }
    let (fx, fy) = from.to_pixels();
    let (tx, ty) = to.to_pixels();
    let right = i64::from(tx) - i64::from(fx);
    let up = i64::from(fy) - i64::from(ty);

    let steps = match (right >= 0, up >= 0) {
        (true, true) => first_quadrant_angle(right, up),
        (true, false) => 128 - first_quadrant_angle(right, -up),
        (false, false) => 128 + first_quadrant_angle(-right, -up),
        (false, true) => (256 - first_quadrant_angle(-right, up)) & 255,
    };
    Direction::new(steps as u8)
}

/// Clockwise angle from straight up for a non-negative right/up delta.
fn first_quadrant_angle(right: i64, up: i64) -> i64 {
    if right == 0 && up == 0 {
        return 0;
    }
    if right <= up {
        atan_steps(right, up)
    } else {
        64 - atan_steps(up, right)
    }
}

/// Angle in steps whose tangent is `small / large`, with `small <= large`.
fn atan_steps(small: i64, large: i64) -> i64 {
    let slot = (small * 32 + large / 2) / large;
    let slot = usize::try_from(slot.clamp(0, 32)).unwrap_or(32);
    i64::from(ATAN_TABLE[slot])
}

/// Moves a position `amount` leptons in the provided direction.
///
/// The result is clamped to the map extent; the sentinel stays unchanged.
#[must_use]
pub fn move_position(position: WorldPosition, direction: Direction, amount: i32) -> WorldPosition {
    if position.is_none() {
        return position;
    }
    let amount = i64::from(amount);
    let dx = i64::from(direction.sine()) * amount / SINE_SCALE;
    let dy = -i64::from(direction.cosine()) * amount / SINE_SCALE;
    let x = (i64::from(position.x()) + dx).clamp(0, i64::from(MAP_WIDTH_LEPTONS - 1));
    let y = (i64::from(position.y()) + dy).clamp(0, i64::from(MAP_HEIGHT_LEPTONS - 1));
    WorldPosition::new(x as i32, y as i32)
}

/// Snaps a position onto the centre of the cell that contains it.
#[must_use]
pub fn snap_to_cell_center(position: WorldPosition) -> WorldPosition {
    if position.is_none() {
        return position;
    }
    let (x, y) = position.cell_xy();
    let half = PIXELS_PER_CELL / 2;
    WorldPosition::from_pixels(x * PIXELS_PER_CELL + half, y * PIXELS_PER_CELL + half)
}

/// Neighbouring cell in the provided facing, or the sentinel when it leaves the grid.
#[must_use]
pub const fn adjacent_cell(cell: CellIndex, facing: Facing) -> CellIndex {
    if cell.is_none() {
        return CellIndex::NONE;
    }
    let (dx, dy) = facing.offset();
    CellIndex::from_xy(cell.x() + dx, cell.y() + dy)
}
