//! Template catalogue mapping terrain templates to land classes.

use tactical_core::LandClass;

/// Template identifier reserved for plain clear ground.
pub const TEMPLATE_CLEAR: u8 = 0;

/// Contiguous template ranges and the land class each range classifies as.
///
/// Templates not covered by any range fall back to clear ground.
const TEMPLATE_RANGES: [(u8, u8, LandClass); 6] = [
    (1, 8, LandClass::Water),
    (9, 16, LandClass::Beach),
    (17, 24, LandClass::Rock),
    (25, 40, LandClass::Road),
    (41, 56, LandClass::River),
    (57, 64, LandClass::Rough),
];

/// Land class implied by a terrain template on its own.
#[must_use]
pub fn template_land_class(template: u8) -> LandClass {
    TEMPLATE_RANGES
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&template))
        .map_or(LandClass::Clear, |(_, _, class)| *class)
}
