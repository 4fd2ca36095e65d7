use glam::{IVec2, ivec2};

/*------------------------- screen rectangles -------------------------*/

/// Integer rectangle in pixel space: `origin` is the top-left corner.
///
/// A zero-sized rect doubles as "nothing cached yet".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub origin: IVec2,
    pub size: IVec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            origin: IVec2::new(x, y),
            size: IVec2::new(w, h),
        }
    }

    #[inline]
    pub fn from_size(size: IVec2) -> Self {
        Self {
            origin: IVec2::ZERO,
            size,
        }
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        self.origin
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.size.y
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// Centre pixel (rounded towards the top-left).
    #[inline]
    pub fn center(&self) -> IVec2 {
        self.origin + (self.size - IVec2::ONE) / 2
    }

    /// Half-open containment test.
    #[inline]
    pub fn contains(&self, p: IVec2) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size.x
            && p.y < self.origin.y + self.size.y
    }
}

/// Scale `size` to fit inside `bounds`, keeping its aspect ratio.
///
/// Integer maths throughout, so the result is stable frame to frame.
pub fn scale_keep_aspect(size: IVec2, bounds: IVec2) -> IVec2 {
    if size.x == 0 || size.y == 0 {
        return bounds;
    }
    let rw = (bounds.y * size.x) / size.y;
    if rw <= bounds.x {
        ivec2(rw, bounds.y)
    } else {
        ivec2(bounds.x, (bounds.x * size.y) / size.x)
    }
}

/*-------------------------- aware range ------------------------------*/

/// Tile margins around the camera, in each direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AwareRange {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl AwareRange {
    #[inline]
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Shrink every side, used for "in sight" checks.
    #[inline]
    pub fn shrunk(&self, left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self::new(
            self.left - left,
            self.right - right,
            self.top - top,
            self.bottom - bottom,
        )
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
