//! Which floors take part in a frame.
//!
//! Floors are numbered from the sky down, so the *first* visible floor is
//! the top-most one drawn and the *last* is the deepest.

use crate::defs::{AWARE_UNDERGROUND_FLOOR_RANGE, MAX_Z, SEA_FLOOR, UNDERGROUND_FLOOR};
use crate::world::{Position, TileView, WorldQuery};

/// Top-most floor that can be seen from `camera`.
///
/// * `lock` pins the answer (manual lock or the locked view mode).
/// * With `check_limits`, the camera tile and its orthogonal neighbours
///   that can be looked through are walked upwards; the first tile hiding
///   the view, physically above or covering the same screen cell, caps the
///   result one floor below it.
pub fn first_visible_floor<W: WorldQuery>(
    world: &W,
    camera: Option<Position>,
    lock: Option<u8>,
    check_limits: bool,
) -> u8 {
    let z = match (lock, camera) {
        (Some(locked), _) => locked as i32,
        (None, None) => SEA_FLOOR as i32,
        (None, Some(cam)) => scan_occluders(world, cam, check_limits),
    };
    z.clamp(0, MAX_Z as i32) as u8
}

fn scan_occluders<W: WorldQuery>(world: &W, cam: Position, check_limits: bool) -> i32 {
    // nothing limiting the view: everything from the sky down
    let mut first = 0;

    // underground only the floors around the camera
    if cam.z > SEA_FLOOR as i32 {
        first = (cam.z - AWARE_UNDERGROUND_FLOOR_RANGE as i32).max(UNDERGROUND_FLOOR as i32);
    }

    if !check_limits {
        return first;
    }

    'scan: for ix in -1..=1 {
        for iy in -1..=1 {
            if first >= cam.z {
                break 'scan;
            }
            let pos = cam.translated(ix, iy);
            let look_possible = world.is_look_possible(pos);
            let center = ix == 0 && iy == 0;
            let orthogonal = i32::abs(ix) != i32::abs(iy);
            if !(center || (orthogonal && look_possible)) {
                continue;
            }

            let mut upper = pos;
            let mut covered = pos;
            while covered.covered_up(1) && upper.up(1) && upper.z >= first {
                // physically above
                if world
                    .tile(upper)
                    .is_some_and(|t| t.limits_floors_view(!look_possible))
                {
                    first = upper.z + 1;
                    break;
                }
                // geometrically above
                if world
                    .tile(covered)
                    .is_some_and(|t| t.limits_floors_view(look_possible))
                {
                    first = covered.z + 1;
                    break;
                }
            }
        }
    }
    first
}

/// Deepest floor drawn for `camera`, never above `lock`.
pub fn last_visible_floor(camera: Option<Position>, lock: Option<u8>) -> u8 {
    let mut z = match camera {
        Some(cam) if cam.z > SEA_FLOOR as i32 => cam.z + AWARE_UNDERGROUND_FLOOR_RANGE as i32,
        _ => SEA_FLOOR as i32,
    };
    if let Some(locked) = lock {
        z = z.max(locked as i32);
    }
    z.clamp(0, MAX_Z as i32) as u8
}

/// `(first, last)` with `last` raised to `first` when they cross.
pub fn visible_floor_range<W: WorldQuery>(
    world: &W,
    camera: Option<Position>,
    lock: Option<u8>,
    check_limits: bool,
) -> (u8, u8) {
    let first = first_visible_floor(world, camera, lock, check_limits);
    let last = last_visible_floor(camera, lock).max(first);
    debug_assert!(first <= MAX_Z && last <= MAX_Z);
    (first, last)
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
