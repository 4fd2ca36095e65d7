mod camera;
mod geometry;
mod grid;
mod position;
mod query;

pub use camera::Camera;

pub use geometry::{AwareRange, Rect, scale_keep_aspect};

pub use grid::{DEFAULT_AWARE_RANGE, GridTile, GridWorld};

pub use position::{Direction, MAX_XY, Position};

pub use query::{
    CreatureId, CreatureState, Light, MissileRef, TextRef, ThingId, TileView, WorldQuery,
};
