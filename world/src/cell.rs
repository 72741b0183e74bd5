//! State of a single grid tile.

use arrayvec::ArrayVec;
use tactical_core::{
    CellFlags, LandClass, OccupantId, OverlayKind, OverlayRef, TerrainRef, Visibility,
    CELL_OCCUPANT_CAPACITY,
};

use crate::terrain::template_land_class;

const GOLD_STAGE_VALUE: u32 = 25;
const GEMS_STAGE_VALUE: u32 = 50;

/// Terrain, overlay, fog and occupancy of one grid tile.
///
/// The land class is derived from terrain and overlay and is refreshed by
/// every mutator that touches either of them; nothing else may change it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    terrain: Option<TerrainRef>,
    overlay: Option<OverlayRef>,
    land: LandClass,
    visibility: Visibility,
    occupants: ArrayVec<OccupantId, CELL_OCCUPANT_CAPACITY>,
    flags: CellFlags,
}

/// Outcome of harvesting a resource overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Harvest {
    /// Credit value of the stages removed.
    pub value: u32,
    /// Whether the overlay ran out and was removed.
    pub depleted: bool,
}

impl Cell {
    /// Creates an empty, never-seen cell of clear ground.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the cell to its freshly allocated state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Terrain assigned to the cell, if any.
    #[must_use]
    pub const fn terrain(&self) -> Option<TerrainRef> {
        self.terrain
    }

    /// Replaces the terrain and re-derives the land class.
    pub fn set_terrain(&mut self, terrain: Option<TerrainRef>) {
        self.terrain = terrain;
        self.recalculate_land();
    }

    /// Assigns a terrain template and icon and re-derives the land class.
    pub fn set_template(&mut self, template: u8, icon: u8) {
        self.set_terrain(Some(TerrainRef::new(template, icon)));
    }

    /// Overlay assigned to the cell, if any.
    #[must_use]
    pub const fn overlay(&self) -> Option<OverlayRef> {
        self.overlay
    }

    /// Replaces the overlay and re-derives the land class.
    pub fn set_overlay(&mut self, overlay: Option<OverlayRef>) {
        self.overlay = overlay;
        self.recalculate_land();
    }

    /// Derived land class.
    #[must_use]
    pub const fn land_class(&self) -> LandClass {
        self.land
    }

    /// Re-derives the land class from terrain and overlay.
    ///
    /// Resource overlays win over wall overlays, which win over the terrain
    /// template; a cell with neither is clear.
    pub fn recalculate_land(&mut self) {
        self.land = match (self.overlay.map(|overlay| overlay.kind()), self.terrain) {
            (Some(kind), _) if kind.is_resource() => LandClass::Resource,
            (Some(kind), _) if kind.is_wall() => LandClass::Wall,
            (_, Some(terrain)) => template_land_class(terrain.template()),
            (_, None) => LandClass::Clear,
        };
    }

    /// Reports whether a mover may enter the cell.
    ///
    /// Water admits only amphibious movers and walls only ground-light movers
    /// such as infantry. Rock and river admit nobody.
    #[must_use]
    pub const fn is_passable(&self, is_amphibious: bool, is_ground_light: bool) -> bool {
        match self.land {
            LandClass::Water => is_amphibious,
            LandClass::Wall => is_ground_light,
            LandClass::Rock | LandClass::River => false,
            _ => true,
        }
    }

    /// Ground speed on the cell as a percentage of clear terrain.
    #[must_use]
    pub const fn speed_multiplier(&self) -> u8 {
        self.land.speed_multiplier()
    }

    /// Credit value of one harvest from the resource overlay, or zero.
    #[must_use]
    pub fn resource_value(&self) -> u32 {
        match self.overlay.map(|overlay| overlay.kind()) {
            Some(kind) if kind.is_resource() => {
                let base = if kind.is_gems() {
                    GEMS_STAGE_VALUE
                } else {
                    GOLD_STAGE_VALUE
                };
                base * u32::from(kind.resource_stage())
            }
            _ => 0,
        }
    }

    /// Removes `amount` units from the resource overlay.
    ///
    /// Once the remaining amount is exhausted the overlay is removed and the
    /// land class re-derived. Cells without a resource are left untouched.
    pub fn harvest(&mut self, amount: u8) -> Harvest {
        let Some(overlay) = self.overlay.filter(|overlay| overlay.kind().is_resource()) else {
            return Harvest::default();
        };
        let unit_value = self.resource_value();
        if overlay.aux() > amount {
            self.overlay = Some(overlay.with_aux(overlay.aux() - amount));
            Harvest {
                value: unit_value * u32::from(amount),
                depleted: false,
            }
        } else {
            self.set_overlay(None);
            Harvest {
                value: unit_value * u32::from(overlay.aux()),
                depleted: true,
            }
        }
    }

    /// Current fog-of-war state.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Reports whether the cell has ever been seen.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        !matches!(self.visibility, Visibility::NeverSeen)
    }

    /// Reports whether the cell is in view right now.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        matches!(self.visibility, Visibility::CurrentlyVisible)
    }

    /// Lifts the shroud, returning whether the state changed.
    ///
    /// A full reveal makes the cell currently visible; a partial reveal only
    /// marks a never-seen cell as previously seen.
    pub fn reveal(&mut self, make_visible: bool) -> bool {
        let next = match (make_visible, self.visibility) {
            (true, _) => Visibility::CurrentlyVisible,
            (false, Visibility::NeverSeen) => Visibility::PreviouslySeen,
            (false, current) => current,
        };
        self.transition(next)
    }

    /// Drops a currently visible cell back to previously seen.
    pub fn shroud(&mut self) -> bool {
        if self.is_visible() {
            self.transition(Visibility::PreviouslySeen)
        } else {
            false
        }
    }

    /// Sets the visibility directly, refusing to forget a cell that was seen.
    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        if self.is_revealed() && visibility == Visibility::NeverSeen {
            return false;
        }
        self.transition(visibility)
    }

    fn transition(&mut self, next: Visibility) -> bool {
        let changed = self.visibility != next;
        self.visibility = next;
        changed
    }

    /// Adds an occupant, returning `false` when the cell is full or already holds it.
    pub fn add_occupant(&mut self, occupant: OccupantId) -> bool {
        if self.has_occupant(occupant) {
            return false;
        }
        self.occupants.try_push(occupant).is_ok()
    }

    /// Removes an occupant, returning whether it was present.
    pub fn remove_occupant(&mut self, occupant: OccupantId) -> bool {
        match self.occupants.iter().position(|present| *present == occupant) {
            Some(slot) => {
                let _ = self.occupants.swap_remove(slot);
                true
            }
            None => false,
        }
    }

    /// Reports whether the occupant is situated in the cell.
    #[must_use]
    pub fn has_occupant(&self, occupant: OccupantId) -> bool {
        self.occupants.contains(&occupant)
    }

    /// Occupants in no particular order.
    #[must_use]
    pub fn occupants(&self) -> &[OccupantId] {
        &self.occupants
    }

    /// Number of occupants.
    #[must_use]
    pub fn occupant_count(&self) -> usize {
        self.occupants.len()
    }

    /// Reports whether any occupant is present.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    /// Reports whether no further occupant fits.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupants.is_full()
    }

    /// Marker flags.
    #[must_use]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Replaces the marker flags.
    pub fn set_flags(&mut self, flags: CellFlags) {
        self.flags = flags;
    }

    /// Reports whether the cell is part of a bridge.
    #[must_use]
    pub const fn is_bridge(&self) -> bool {
        self.flags.bridge
    }

    /// Reports whether the cell is a scenario waypoint.
    #[must_use]
    pub const fn is_waypoint(&self) -> bool {
        self.flags.waypoint
    }

    /// Reports whether the cell marks an objective.
    #[must_use]
    pub const fn is_objective(&self) -> bool {
        self.flags.objective
    }

    /// Reports whether the cell holds an overlay of the provided kind.
    #[must_use]
    pub fn has_overlay(&self, kind: OverlayKind) -> bool {
        self.overlay.is_some_and(|overlay| overlay.kind() == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(stage_kind: OverlayKind, amount: u8) -> Option<OverlayRef> {
        Some(OverlayRef::new(stage_kind, amount))
    }

    #[test]
    fn fresh_cell_is_clear_and_unseen() {
        let cell = Cell::new();
        assert_eq!(cell.land_class(), LandClass::Clear);
        assert_eq!(cell.visibility(), Visibility::NeverSeen);
        assert!(!cell.is_occupied());
        assert_eq!(cell.flags(), CellFlags::default());
    }

    #[test]
    fn terrain_template_drives_land_class() {
        let mut cell = Cell::new();
        cell.set_template(3, 0);
        assert_eq!(cell.land_class(), LandClass::Water);
        cell.set_template(30, 2);
        assert_eq!(cell.land_class(), LandClass::Road);
        cell.set_terrain(None);
        assert_eq!(cell.land_class(), LandClass::Clear);
    }

    #[test]
    fn resource_overlay_outranks_any_terrain() {
        let mut cell = Cell::new();
        cell.set_template(20, 0);
        cell.set_overlay(gold(OverlayKind::Gold2, 10));
        assert_eq!(cell.land_class(), LandClass::Resource);
        cell.set_template(1, 0);
        assert_eq!(cell.land_class(), LandClass::Resource);
    }

    #[test]
    fn wall_overlay_outranks_terrain() {
        let mut cell = Cell::new();
        cell.set_template(26, 0);
        cell.set_overlay(Some(OverlayRef::new(OverlayKind::Brick, 0)));
        assert_eq!(cell.land_class(), LandClass::Wall);
        cell.set_overlay(None);
        assert_eq!(cell.land_class(), LandClass::Road);
    }

    #[test]
    fn decorative_overlay_keeps_terrain_class() {
        let mut cell = Cell::new();
        cell.set_template(60, 0);
        cell.set_overlay(Some(OverlayRef::new(OverlayKind::Crate, 0)));
        assert_eq!(cell.land_class(), LandClass::Rough);
    }

    #[test]
    fn passability_depends_on_mover() {
        let mut cell = Cell::new();
        cell.set_template(2, 0);
        assert!(!cell.is_passable(false, true));
        assert!(cell.is_passable(true, false));

        cell.set_template(0, 0);
        cell.set_overlay(Some(OverlayRef::new(OverlayKind::Sandbag, 0)));
        assert!(!cell.is_passable(false, false));
        assert!(cell.is_passable(false, true));

        cell.set_overlay(None);
        cell.set_template(20, 0);
        assert!(!cell.is_passable(true, true));
        cell.set_template(45, 0);
        assert!(!cell.is_passable(true, true));
    }

    #[test]
    fn visibility_never_returns_to_unseen() {
        let mut cell = Cell::new();
        assert!(!cell.shroud());
        assert!(cell.reveal(false));
        assert_eq!(cell.visibility(), Visibility::PreviouslySeen);
        assert!(!cell.reveal(false));
        assert!(cell.reveal(true));
        assert_eq!(cell.visibility(), Visibility::CurrentlyVisible);
        assert!(cell.shroud());
        assert_eq!(cell.visibility(), Visibility::PreviouslySeen);
        assert!(!cell.set_visibility(Visibility::NeverSeen));
        assert_eq!(cell.visibility(), Visibility::PreviouslySeen);
    }

    #[test]
    fn full_reveal_skips_previously_seen() {
        let mut cell = Cell::new();
        assert!(cell.reveal(true));
        assert_eq!(cell.visibility(), Visibility::CurrentlyVisible);
    }

    #[test]
    fn fifth_occupant_is_rejected_without_side_effects() {
        let mut cell = Cell::new();
        for id in 1..=4 {
            assert!(cell.add_occupant(OccupantId::new(id)));
        }
        let before = cell.occupants().to_vec();
        assert!(!cell.add_occupant(OccupantId::new(5)));
        assert_eq!(cell.occupants(), before.as_slice());
        assert!(cell.is_full());
    }

    #[test]
    fn removing_absent_occupant_is_a_no_op() {
        let mut cell = Cell::new();
        assert!(cell.add_occupant(OccupantId::new(1)));
        assert!(cell.add_occupant(OccupantId::new(2)));
        assert!(!cell.remove_occupant(OccupantId::new(9)));
        assert_eq!(cell.occupant_count(), 2);
        assert!(cell.remove_occupant(OccupantId::new(1)));
        assert_eq!(cell.occupants(), &[OccupantId::new(2)]);
    }

    #[test]
    fn duplicate_occupant_is_refused() {
        let mut cell = Cell::new();
        assert!(cell.add_occupant(OccupantId::new(3)));
        assert!(!cell.add_occupant(OccupantId::new(3)));
        assert_eq!(cell.occupant_count(), 1);
    }

    #[test]
    fn resource_value_scales_with_stage() {
        let mut cell = Cell::new();
        cell.set_overlay(gold(OverlayKind::Gold3, 5));
        assert_eq!(cell.resource_value(), 75);
        cell.set_overlay(gold(OverlayKind::Gems2, 5));
        assert_eq!(cell.resource_value(), 100);
        cell.set_overlay(Some(OverlayRef::new(OverlayKind::Wood, 5)));
        assert_eq!(cell.resource_value(), 0);
    }

    #[test]
    fn harvesting_depletes_and_reclassifies() {
        let mut cell = Cell::new();
        cell.set_template(30, 0);
        cell.set_overlay(gold(OverlayKind::Gold1, 3));

        let first = cell.harvest(2);
        assert_eq!(first, Harvest { value: 50, depleted: false });
        assert_eq!(cell.overlay().map(|overlay| overlay.aux()), Some(1));
        assert_eq!(cell.land_class(), LandClass::Resource);

        let second = cell.harvest(2);
        assert_eq!(second, Harvest { value: 25, depleted: true });
        assert_eq!(cell.overlay(), None);
        assert_eq!(cell.land_class(), LandClass::Road);
    }

    #[test]
    fn harvesting_non_resource_changes_nothing() {
        let mut cell = Cell::new();
        cell.set_overlay(Some(OverlayRef::new(OverlayKind::Brick, 9)));
        assert_eq!(cell.harvest(4), Harvest::default());
        assert_eq!(cell.overlay().map(|overlay| overlay.aux()), Some(9));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut cell = Cell::new();
        cell.set_template(5, 1);
        assert!(cell.reveal(true));
        assert!(cell.add_occupant(OccupantId::new(1)));
        cell.set_flags(CellFlags {
            bridge: true,
            ..CellFlags::default()
        });
        cell.clear();
        assert_eq!(cell, Cell::new());
    }
}
