use crate::world::position::Position;
use crate::world::query::{CreatureId, CreatureState, WorldQuery};

/// Map view eye point.
///
/// * Follow mode: the position of a creature, re-read from the world every
///   time it is needed.
/// * Fixed mode: an explicit position, panned by [`Camera::shift`].
///
/// The fixed position is kept while following so switching back resumes
/// where the view was left.
#[derive(Clone, Copy, Debug, Default)]
pub struct Camera {
    follow: Option<CreatureId>,
    fixed: Position,
}

impl Camera {
    pub fn fixed(pos: Position) -> Self {
        Self {
            follow: None,
            fixed: pos,
        }
    }

    #[inline]
    pub fn is_following(&self) -> bool {
        self.follow.is_some()
    }

    #[inline]
    pub fn followed(&self) -> Option<CreatureId> {
        self.follow
    }

    pub fn follow(&mut self, creature: CreatureId) {
        self.follow = Some(creature);
    }

    pub fn set_fixed(&mut self, pos: Position) {
        self.follow = None;
        self.fixed = pos;
    }

    #[inline]
    pub fn fixed_position(&self) -> Position {
        self.fixed
    }

    /// Pan the fixed position by whole tiles.
    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.fixed = self.fixed.translated(dx, dy);
    }

    /// State of the followed creature, if any and known to the world.
    pub fn followed_state<W: WorldQuery>(&self, world: &W) -> Option<CreatureState> {
        self.follow.and_then(|id| world.creature(id))
    }

    /// Current eye position, or `None` while it is unknown or off-map
    /// (e.g. the followed creature is not resolved yet).
    pub fn position<W: WorldQuery>(&self, world: &W) -> Option<Position> {
        let pos = match self.follow {
            Some(id) => world.creature(id)?.position,
            None => self.fixed,
        };
        pos.is_valid().then_some(pos)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::GridWorld;

    #[test]
    fn fixed_camera_reports_its_position() {
        let world = GridWorld::new();
        let cam = Camera::fixed(Position::new(100, 100, 7));
        assert_eq!(cam.position(&world), Some(Position::new(100, 100, 7)));
    }

    #[test]
    fn follow_reads_creature_every_time() {
        let mut world = GridWorld::new();
        let id = world.add_creature(Position::new(50, 60, 7));
        let mut cam = Camera::fixed(Position::new(100, 100, 7));
        cam.follow(id);
        assert_eq!(cam.position(&world), Some(Position::new(50, 60, 7)));

        world.move_creature(id, Position::new(51, 60, 7));
        assert_eq!(cam.position(&world), Some(Position::new(51, 60, 7)));
        // fixed position survives
        assert_eq!(cam.fixed_position(), Position::new(100, 100, 7));
    }

    #[test]
    fn unresolved_follow_target_has_no_position() {
        let world = GridWorld::new();
        let mut cam = Camera::default();
        cam.follow(42);
        assert_eq!(cam.position(&world), None);
    }

    #[test]
    fn off_map_fixed_position_is_unknown() {
        let world = GridWorld::new();
        let cam = Camera::fixed(Position::new(-1, 5, 7));
        assert_eq!(cam.position(&world), None);
    }
}
