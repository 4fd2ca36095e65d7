mod compositor;
mod fade;
mod floors;
mod light;
mod map_view;
mod projection;
mod shader;
mod timer;
mod types;
mod visibility;

pub use map_view::{MapView, ViewError};

pub use projection::{DRAW_MARGIN, Projection};

pub use timer::{Clock, ManualClock, SystemClock, Timer};

pub use fade::{DEFAULT_FLOOR_FADING, FloorFader};
pub use shader::{ShaderFader, ShaderPhase};

pub use floors::{first_visible_floor, last_visible_floor, visible_floor_range};
pub use light::LightView;
pub use types::RectCache;
pub use visibility::{FloorTiles, RebuildParams, VisibleTiles, diagonal_cells};
