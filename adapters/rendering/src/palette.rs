//! Palette indices used by the placeholder painter and UI overlays.

use tactical_core::LandClass;

/// Opaque shroud over never-seen cells and the dithered fog colour.
pub const SHROUD: u8 = 0;
/// Cells without terrain.
pub const NO_TERRAIN: u8 = 0;
/// Clear ground and anything without a dedicated colour.
pub const CLEAR: u8 = 141;
/// Paved road.
pub const ROAD: u8 = 176;
/// Open water and river beds.
pub const WATER: u8 = 154;
/// Rock and wall outlines.
pub const ROCK: u8 = 8;
/// Resource fields.
pub const RESOURCE: u8 = 144;
/// Shoreline.
pub const BEACH: u8 = 157;
/// Broken ground.
pub const ROUGH: u8 = 134;
/// Sparkle drawn over resource overlays.
pub const RESOURCE_SPARKLE: u8 = 113;
/// Occupant marker.
pub const OCCUPANT: u8 = 15;
/// Cursor highlight for friendly context.
pub const CURSOR_ALLY: u8 = 120;
/// Cursor highlight for hostile context.
pub const CURSOR_ENEMY: u8 = 123;
/// Cursor highlight for neutral context.
pub const CURSOR_NEUTRAL: u8 = 176;
/// Drag-selection outline.
pub const SELECTION: u8 = 120;

/// Flat terrain colour for a land class.
#[must_use]
pub const fn land_color(class: LandClass) -> u8 {
    match class {
        LandClass::Road => ROAD,
        LandClass::Water | LandClass::River => WATER,
        LandClass::Rock => ROCK,
        LandClass::Resource => RESOURCE,
        LandClass::Beach => BEACH,
        LandClass::Rough => ROUGH,
        LandClass::Clear | LandClass::Wall => CLEAR,
    }
}
