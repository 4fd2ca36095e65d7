use bitflags::bitflags;

bitflags! {
    /// Which creature overlays the compositor asks the backend to draw.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct InfoFlags: u32 {
        const NAMES    = 0x0000_0001;
        const BARS     = 0x0000_0002;
        const MANA_BAR = 0x0000_0004;
    }
}

bitflags! {
    /// Capability bits carried by every tile of the in-memory world.
    ///
    /// Real worlds answer the same questions through
    /// [`TileView`](crate::world::TileView); these bits just store them.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TileFlags: u32 {
        const GROUND        = 0x0000_0001;
        const SURFACE       = 0x0000_0002;
        const EFFECT        = 0x0000_0004;
        const CLICKABLE     = 0x0000_0008;

        // Occlusion
        /// Blocks the view of floors above no matter how it is looked at.
        const LIMITS_VIEW   = 0x0000_0010;
        /// Only blocks when seen straight through (free view).
        const LIMITS_FREE   = 0x0000_0020;
        /// Casts a shade onto the light layer of the floor above.
        const SHADE         = 0x0000_0040;

        // Sight
        /// Walls, closed doors: nothing is seen past this tile.
        const BLOCKS_LOOK   = 0x0000_0100;
    }
}

impl TileFlags {
    /// Anything that produces pixels.
    #[inline]
    pub fn is_drawable(self) -> bool {
        self.intersects(TileFlags::GROUND | TileFlags::SURFACE | TileFlags::EFFECT)
    }
}
