//! In-memory world – a small sparse tile store implementing [`WorldQuery`].
//!
//! * Tiles live in a `HashMap` keyed by position; only occupied cells are
//!   allocated.
//! * Each tile keeps its creature stack in a `SmallVec`: a handful of
//!   creatures per tile is the common case, so this rarely allocates.
//!
//! Used by the viewer binary and by the tests; a real client plugs its own
//! map store in behind the same trait.

use std::collections::HashMap;

use glam::IVec2;
use smallvec::SmallVec;

use crate::defs::{FLOOR_COUNT, TileFlags};
use crate::world::geometry::AwareRange;
use crate::world::position::{Direction, Position};
use crate::world::query::{
    CreatureId, CreatureState, Light, MissileRef, TextRef, ThingId, TileView, WorldQuery,
};

/// Default aware range of a freshly created world.
pub const DEFAULT_AWARE_RANGE: AwareRange = AwareRange::new(8, 9, 6, 7);

/*──────────────────────── tiles ────────────────────────*/

#[derive(Clone, Debug)]
pub struct GridTile {
    position: Position,
    pub flags: TileFlags,
    creatures: SmallVec<[CreatureId; 4]>,
}

impl GridTile {
    fn new(position: Position, flags: TileFlags) -> Self {
        Self {
            position,
            flags,
            creatures: SmallVec::new(),
        }
    }
}

impl TileView for GridTile {
    fn position(&self) -> Position {
        self.position
    }

    fn is_drawable(&self) -> bool {
        self.flags.is_drawable() || !self.creatures.is_empty()
    }

    fn has_ground(&self) -> bool {
        self.flags.contains(TileFlags::GROUND)
    }

    fn has_surface(&self) -> bool {
        self.flags.contains(TileFlags::SURFACE) || !self.creatures.is_empty()
    }

    fn has_effect(&self) -> bool {
        self.flags.contains(TileFlags::EFFECT)
    }

    fn is_clickable(&self) -> bool {
        self.flags.contains(TileFlags::CLICKABLE)
    }

    fn can_shade(&self) -> bool {
        self.flags.contains(TileFlags::SHADE)
    }

    fn limits_floors_view(&self, free_view: bool) -> bool {
        self.flags.contains(TileFlags::LIMITS_VIEW)
            || (free_view && self.flags.contains(TileFlags::LIMITS_FREE))
    }

    fn creatures(&self) -> &[CreatureId] {
        &self.creatures
    }
}

/*──────────────────────── world ────────────────────────*/

pub struct GridWorld {
    tiles: HashMap<Position, GridTile>,
    creatures: HashMap<CreatureId, CreatureState>,
    missiles: Vec<Vec<MissileRef>>,
    static_texts: Vec<TextRef>,
    animated_texts: Vec<TextRef>,
    light: Light,
    aware_range: AwareRange,
    next_id: u32,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GridWorld {
    pub fn new() -> Self {
        Self {
            tiles: HashMap::new(),
            creatures: HashMap::new(),
            missiles: vec![Vec::new(); FLOOR_COUNT],
            static_texts: Vec::new(),
            animated_texts: Vec::new(),
            light: Light {
                intensity: 255,
                color: 215,
            },
            aware_range: DEFAULT_AWARE_RANGE,
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---------------------------------------------------------------------
    // Tiles
    // ---------------------------------------------------------------------

    /// Insert or overwrite the flags of the tile at `pos`.
    pub fn set_tile(&mut self, pos: Position, flags: TileFlags) -> &mut GridTile {
        let tile = self
            .tiles
            .entry(pos)
            .or_insert_with(|| GridTile::new(pos, TileFlags::empty()));
        tile.flags = flags;
        tile
    }

    /// Fill the inclusive box `from ..= to` on floor `z`.
    pub fn fill(&mut self, z: i32, from: IVec2, to: IVec2, flags: TileFlags) {
        for y in from.y..=to.y {
            for x in from.x..=to.x {
                self.set_tile(Position::new(x, y, z), flags);
            }
        }
    }

    pub fn remove_tile(&mut self, pos: Position) -> Option<GridTile> {
        self.tiles.remove(&pos)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    // ---------------------------------------------------------------------
    // Creatures
    // ---------------------------------------------------------------------

    pub fn add_creature(&mut self, pos: Position) -> CreatureId {
        let id = self.alloc_id();
        self.creatures.insert(
            id,
            CreatureState {
                position: pos,
                dead: false,
                can_be_seen: true,
                walking: false,
                direction: Direction::South,
                walk_offset: IVec2::ZERO,
            },
        );
        self.push_on_tile(id, pos);
        id
    }

    pub fn move_creature(&mut self, id: CreatureId, to: Position) {
        let Some(state) = self.creatures.get_mut(&id) else {
            return;
        };
        let from = state.position;
        state.direction = from.direction_to(&to);
        state.position = to;
        if let Some(tile) = self.tiles.get_mut(&from) {
            tile.creatures.retain(|c| *c != id);
        }
        self.push_on_tile(id, to);
    }

    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut CreatureState> {
        self.creatures.get_mut(&id)
    }

    fn push_on_tile(&mut self, id: CreatureId, pos: Position) {
        self.tiles
            .entry(pos)
            .or_insert_with(|| GridTile::new(pos, TileFlags::empty()))
            .creatures
            .push(id);
    }

    // ---------------------------------------------------------------------
    // Missiles, texts, light
    // ---------------------------------------------------------------------

    pub fn add_missile(&mut self, pos: Position) -> ThingId {
        let id = self.alloc_id();
        if let Some(floor) = self.missiles.get_mut(pos.floor() as usize) {
            floor.push(MissileRef { id, position: pos });
        }
        id
    }

    pub fn add_static_text(&mut self, pos: Position, has_message: bool) -> ThingId {
        let id = self.alloc_id();
        self.static_texts.push(TextRef {
            id,
            position: pos,
            has_message,
        });
        id
    }

    pub fn add_animated_text(&mut self, pos: Position) -> ThingId {
        let id = self.alloc_id();
        self.animated_texts.push(TextRef {
            id,
            position: pos,
            has_message: true,
        });
        id
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
    }

    pub fn set_aware_range(&mut self, range: AwareRange) {
        self.aware_range = range;
    }
}

impl WorldQuery for GridWorld {
    type Tile = GridTile;

    fn tile(&self, pos: Position) -> Option<&GridTile> {
        self.tiles.get(&pos)
    }

    fn is_look_possible(&self, pos: Position) -> bool {
        self.tiles
            .get(&pos)
            .is_none_or(|t| !t.flags.contains(TileFlags::BLOCKS_LOOK))
    }

    fn creature(&self, id: CreatureId) -> Option<CreatureState> {
        self.creatures.get(&id).copied()
    }

    fn floor_missiles(&self, z: u8) -> &[MissileRef] {
        self.missiles.get(z as usize).map_or(&[], Vec::as_slice)
    }

    fn static_texts(&self) -> &[TextRef] {
        &self.static_texts
    }

    fn animated_texts(&self) -> &[TextRef] {
        &self.animated_texts
    }

    fn spectators_in_range(
        &self,
        center: Position,
        multi_floor: bool,
        range: AwareRange,
    ) -> Vec<CreatureId> {
        let mut out: Vec<CreatureId> = self
            .creatures
            .iter()
            .filter(|(_, c)| {
                center.is_in_range_ex(
                    &c.position,
                    range.left,
                    range.right,
                    range.top,
                    range.bottom,
                    multi_floor,
                )
            })
            .map(|(id, _)| *id)
            .collect();
        out.sort_unstable();
        out
    }

    fn light(&self) -> Light {
        self.light
    }

    fn aware_range(&self) -> AwareRange {
        self.aware_range
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moving_creature_updates_tile_stacks() {
        let mut w = GridWorld::new();
        let a = Position::new(10, 10, 7);
        let b = Position::new(11, 10, 7);
        let id = w.add_creature(a);
        assert_eq!(w.tile(a).unwrap().creatures(), &[id]);

        w.move_creature(id, b);
        assert!(w.tile(a).unwrap().creatures().is_empty());
        assert_eq!(w.tile(b).unwrap().creatures(), &[id]);
        assert_eq!(w.creature(id).unwrap().direction, Direction::East);
    }

    #[test]
    fn free_view_limit_only_when_looking_through() {
        let mut w = GridWorld::new();
        let p = Position::new(5, 5, 6);
        w.set_tile(p, TileFlags::SURFACE | TileFlags::LIMITS_FREE);
        let t = w.tile(p).unwrap();
        assert!(t.limits_floors_view(true));
        assert!(!t.limits_floors_view(false));
    }

    #[test]
    fn covered_follows_the_diagonal() {
        let mut w = GridWorld::new();
        let ground = Position::new(100, 100, 7);
        w.set_tile(ground, TileFlags::GROUND);
        // roof one floor up, on the covering cell
        w.set_tile(Position::new(101, 101, 6), TileFlags::GROUND | TileFlags::LIMITS_VIEW);
        assert!(w.is_covered(ground, 0));
        // first floor below the roof: nothing to check
        assert!(!w.is_covered(ground, 7));
    }

    #[test]
    fn spectators_respect_floor_flag() {
        let mut w = GridWorld::new();
        let c = Position::new(100, 100, 7);
        let same = w.add_creature(c.translated(2, 0));
        let above = w.add_creature(Position::new(100, 100, 6));
        w.add_creature(c.translated(30, 0));

        let range = AwareRange::new(8, 9, 6, 7);
        assert_eq!(w.spectators_in_range(c, false, range), vec![same]);
        assert_eq!(w.spectators_in_range(c, true, range), vec![same, above]);
    }
}
