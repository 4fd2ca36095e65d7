//! Per-floor cache of the tiles a frame draws, in draw order.
//!
//! * Rebuilt wholesale, lazily, when the view marks it dirty.
//! * Tiles are kept by position only; the world stays their owner.
//! * Cells are visited along anti-diagonals from the top-left corner so
//!   that, within a floor, tiles further down-right are drawn later and
//!   overlap the ones behind them.

use std::ops::RangeInclusive;

use glam::{IVec2, ivec2};
use tracing::trace;

use crate::defs::FLOOR_COUNT;
use crate::world::{AwareRange, CreatureId, Position, TileView, WorldQuery};

/// The four draw lists of one floor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloorTiles {
    pub grounds: Vec<Position>,
    pub surfaces: Vec<Position>,
    pub effects: Vec<Position>,
    /// Tiles casting a shade onto the light layer.
    pub shades: Vec<Position>,
}

impl FloorTiles {
    fn clear(&mut self) {
        self.grounds.clear();
        self.surfaces.clear();
        self.effects.clear();
        self.shades.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.grounds.is_empty()
            && self.surfaces.is_empty()
            && self.effects.is_empty()
            && self.shades.is_empty()
    }
}

/// Every cell of a `size.x × size.y` grid, one anti-diagonal at a time.
///
/// Diagonal `d` holds the cells with `x + y == d`, visited with `x`
/// ascending.
pub fn diagonal_cells(size: IVec2) -> impl Iterator<Item = IVec2> {
    let (w, h) = (size.x.max(0), size.y.max(0));
    let diagonals = if w == 0 || h == 0 { 0 } else { w + h - 1 };
    (0..diagonals).flat_map(move |d| {
        let start = (d - (h - 1)).max(0);
        let end = d.min(w - 1);
        (start..=end).map(move |ix| ivec2(ix, d - ix))
    })
}

/// Inputs of one cache rebuild.
#[derive(Clone, Debug)]
pub struct RebuildParams {
    pub camera: Position,
    /// Floors to walk, sky-most first.
    pub floors: RangeInclusive<u8>,
    pub draw: IVec2,
    pub center_offset: IVec2,
    /// Collect shades (lights are on and it is dark).
    pub shades: bool,
    pub effects_on_top: bool,
    /// Re-collect creatures on tiles inside this range of the camera.
    pub creatures: Option<AwareRange>,
}

#[derive(Clone, Debug)]
pub struct VisibleTiles {
    floors: [FloorTiles; FLOOR_COUNT],
    creatures: Vec<CreatureId>,
    floor_min: u8,
    floor_max: u8,
}

impl Default for VisibleTiles {
    fn default() -> Self {
        Self {
            floors: std::array::from_fn(|_| FloorTiles::default()),
            creatures: Vec::new(),
            floor_min: 0,
            floor_max: 0,
        }
    }
}

impl VisibleTiles {
    #[inline]
    pub fn floor(&self, z: u8) -> &FloorTiles {
        &self.floors[(z as usize).min(FLOOR_COUNT - 1)]
    }

    /// Shallowest floor holding something to draw.
    #[inline]
    pub fn floor_min(&self) -> u8 {
        self.floor_min
    }

    /// Deepest floor holding something to draw.
    #[inline]
    pub fn floor_max(&self) -> u8 {
        self.floor_max
    }

    /// Creatures in draw order, as of the last creature refresh.
    #[inline]
    pub fn creatures(&self) -> &[CreatureId] {
        &self.creatures
    }

    pub fn rebuild<W: WorldQuery>(&mut self, world: &W, p: &RebuildParams) {
        for floor in &mut self.floors {
            floor.clear();
        }
        if p.creatures.is_some() {
            self.creatures.clear();
        }

        let cam = p.camera;
        self.floor_min = cam.floor();
        self.floor_max = cam.floor();

        // deepest floor first
        for z in p.floors.clone().rev() {
            let floor = &mut self.floors[(z as usize).min(FLOOR_COUNT - 1)];
            let mut found = false;

            for cell in diagonal_cells(p.draw) {
                let mut pos = cam.translated(cell.x - p.center_offset.x, cell.y - p.center_offset.y);
                pos.covered_up(cam.z - z as i32);

                let Some(tile) = world.tile(pos) else {
                    continue;
                };
                if !tile.is_drawable() {
                    continue;
                }

                if let Some(r) = p.creatures {
                    if cam.is_in_range_ex(&pos, r.left, r.right, r.top, r.bottom, false) {
                        self.creatures.extend(tile.creatures().iter().rev());
                    }
                }

                if p.shades && tile.can_shade() {
                    floor.shades.push(pos);
                }
                if tile.has_ground() {
                    floor.grounds.push(pos);
                }
                if tile.has_surface() {
                    floor.surfaces.push(pos);
                }
                if p.effects_on_top && tile.has_effect() {
                    floor.effects.push(pos);
                }
                found = true;
            }

            if found {
                self.floor_min = self.floor_min.min(z);
                self.floor_max = self.floor_max.max(z);
            }
        }

        trace!(
            floor_min = self.floor_min,
            floor_max = self.floor_max,
            creatures = self.creatures.len(),
            "visible tiles rebuilt"
        );
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
