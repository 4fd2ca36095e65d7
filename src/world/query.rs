//! The world-query seam.
//!
//! The map view never owns tiles or creatures. It asks a [`WorldQuery`]
//! every time it needs one and keeps nothing but positions and ids between
//! frames, so the world stays the sole owner of its data.

use glam::IVec2;

use crate::world::geometry::AwareRange;
use crate::world::position::Position;

/// Runtime handle of a creature, stable for as long as the world keeps it.
pub type CreatureId = u32;
/// Runtime handle of a missile, static text or animated text.
pub type ThingId = u32;

/// Ambient light.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Light {
    pub intensity: u8,
    pub color: u8,
}

/// Snapshot of the creature state the compositor reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreatureState {
    pub position: Position,
    pub dead: bool,
    pub can_be_seen: bool,
    pub walking: bool,
    pub direction: crate::world::position::Direction,
    /// Sub-tile pixel offset while walking, at scale factor 1.
    pub walk_offset: IVec2,
}

/// A missile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissileRef {
    pub id: ThingId,
    pub position: Position,
}

/// A static or animated text anchored to a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRef {
    pub id: ThingId,
    pub position: Position,
    /// Static texts without a message mode are not drawn.
    pub has_message: bool,
}

/// Read-only questions the map view asks about one tile.
pub trait TileView {
    fn position(&self) -> Position;

    /// Anything at all to draw?
    fn is_drawable(&self) -> bool;
    fn has_ground(&self) -> bool;
    fn has_surface(&self) -> bool;
    fn has_effect(&self) -> bool;
    fn is_clickable(&self) -> bool;
    /// Contributes a shade to the light layer.
    fn can_shade(&self) -> bool;

    /// Does this tile hide the floors above it?
    ///
    /// `free_view` is true when the tile is looked at straight through
    /// (e.g. over a window) rather than from below.
    fn limits_floors_view(&self, free_view: bool) -> bool;

    /// Creatures standing here, bottom of the stack first.
    fn creatures(&self) -> &[CreatureId];

    /// Is the tile inside the viewport for this camera?
    ///
    /// Tiles on other floors are shifted back onto the camera floor first.
    /// The right and bottom edge rows are only drawn while the view is
    /// scrolling (`draw_edge`).
    fn can_render(&self, camera: Position, viewport: AwareRange, draw_edge: bool) -> bool {
        let pos = self.position();
        let dz = pos.z - camera.z;
        let check = pos.translated(dz, dz);
        let dx = check.x - camera.x;
        let dy = check.y - camera.y;

        if -dx >= viewport.left || -dy >= viewport.top {
            return false;
        }
        if dx > viewport.right || dy > viewport.bottom {
            return false;
        }
        if !draw_edge && (dx == viewport.right || dy == viewport.bottom) {
            return false;
        }
        true
    }
}

/// Everything the map view needs from the world store.
pub trait WorldQuery {
    type Tile: TileView;

    fn tile(&self, pos: Position) -> Option<&Self::Tile>;

    /// Can sight pass through `pos` (no wall, closed door …)?
    fn is_look_possible(&self, pos: Position) -> bool;

    fn creature(&self, id: CreatureId) -> Option<CreatureState>;

    fn floor_missiles(&self, z: u8) -> &[MissileRef];
    fn static_texts(&self) -> &[TextRef];
    fn animated_texts(&self) -> &[TextRef];

    /// Creatures within the asymmetric `range` around `center`.
    fn spectators_in_range(
        &self,
        center: Position,
        multi_floor: bool,
        range: AwareRange,
    ) -> Vec<CreatureId>;

    /// Outdoor ambient light.
    fn light(&self) -> Light;

    /// Default aware range; the map view narrows it to its draw window.
    fn aware_range(&self) -> AwareRange;

    /// Is the tile at `pos` hidden by a view-limiting tile above it?
    ///
    /// Walks up the covered diagonal, but never past `first_floor`.
    fn is_covered(&self, pos: Position, first_floor: u8) -> bool {
        let mut p = pos;
        while p.covered_up(1) && p.z >= first_floor as i32 {
            if self.tile(p).is_some_and(|t| t.limits_floors_view(false)) {
                return true;
            }
        }
        false
    }
}
