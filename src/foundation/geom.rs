use crate::foundation::core::{Rect, RenderScale};
use crate::foundation::error::{FramevaultError, FramevaultResult};

/// Axis-aligned integer rectangle in pixel coordinates.
///
/// Half-open on both axes (`x1 <= x < x2`, `y1 <= y < y2`), y-up. An
/// empty rectangle has `x2 <= x1` or `y2 <= y1`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct RectI {
    /// Left edge (inclusive).
    pub x1: i32,
    /// Bottom edge (inclusive).
    pub y1: i32,
    /// Right edge (exclusive).
    pub x2: i32,
    /// Top edge (exclusive).
    pub y2: i32,
}

fn floor_to_multiple(v: i32, m: i32) -> i32 {
    v.div_euclid(m) * m
}

fn ceil_to_multiple(v: i32, m: i32) -> i32 {
    let d = v.div_euclid(m);
    if v.rem_euclid(m) == 0 { d * m } else { (d + 1) * m }
}

impl RectI {
    /// Construct from edges; no ordering requirement (an inverted rect
    /// is simply empty).
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `true` when the rectangle contains no pixel.
    pub fn is_empty(self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Horizontal pixel count (0 when empty).
    pub fn width(self) -> i32 {
        (self.x2 - self.x1).max(0)
    }

    /// Vertical pixel count (0 when empty).
    pub fn height(self) -> i32 {
        (self.y2 - self.y1).max(0)
    }

    /// Total pixel count.
    pub fn area(self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// `true` when the pixel `(x, y)` is inside.
    pub fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// `true` when `other` is entirely inside `self`. Empty rectangles
    /// are contained everywhere.
    pub fn contains_rect(self, other: RectI) -> bool {
        other.is_empty()
            || (other.x1 >= self.x1
                && other.x2 <= self.x2
                && other.y1 >= self.y1
                && other.y2 <= self.y2)
    }

    /// Intersection, or `None` when disjoint or either side is empty.
    pub fn intersect(self, other: RectI) -> Option<RectI> {
        if self.is_empty() || other.is_empty() {
            return None;
        }
        let r = RectI {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        };
        if r.is_empty() { None } else { Some(r) }
    }

    /// Bounding box of both rectangles. An empty side yields the other.
    pub fn union(self, other: RectI) -> RectI {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        RectI {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Shift both corners by `(dx, dy)`.
    pub fn translate(self, dx: i32, dy: i32) -> RectI {
        RectI {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Snap outward to tile granularity: `x1`/`y1` floored and
    /// `x2`/`y2` ceiled to multiples of the tile size. The result
    /// always contains `self`.
    pub fn round_to_tile_size(self, tile_size_x: i32, tile_size_y: i32) -> RectI {
        debug_assert!(tile_size_x > 0 && tile_size_y > 0);
        RectI {
            x1: floor_to_multiple(self.x1, tile_size_x),
            y1: floor_to_multiple(self.y1, tile_size_y),
            x2: ceil_to_multiple(self.x2, tile_size_x),
            y2: ceil_to_multiple(self.y2, tile_size_y),
        }
    }

    /// Smallest rectangle at mip level `level` enclosing `self`
    /// (coordinates divided by `2^level`, rounded outward).
    pub fn downscale_po2(self, level: u32) -> RectI {
        if level == 0 {
            return self;
        }
        let po2 = 1i32 << level.min(30);
        RectI {
            x1: floor_to_multiple(self.x1, po2) / po2,
            y1: floor_to_multiple(self.y1, po2) / po2,
            x2: ceil_to_multiple(self.x2, po2) / po2,
            y2: ceil_to_multiple(self.y2, po2) / po2,
        }
    }

    /// Map back to mip level 0 coordinates (multiply by `2^level`).
    pub fn upscale_po2(self, level: u32) -> RectI {
        let po2 = 1i32 << level.min(30);
        RectI {
            x1: self.x1 * po2,
            y1: self.y1 * po2,
            x2: self.x2 * po2,
            y2: self.y2 * po2,
        }
    }

    /// Origins of the tile-aligned tiles covering `self`, bottom-up
    /// row-major.
    pub fn tile_origins(self, tile_size_x: i32, tile_size_y: i32) -> Vec<(i32, i32)> {
        let rounded = self.round_to_tile_size(tile_size_x, tile_size_y);
        let mut out = Vec::new();
        if self.is_empty() {
            return out;
        }
        let mut ty = rounded.y1;
        while ty < rounded.y2 {
            let mut tx = rounded.x1;
            while tx < rounded.x2 {
                out.push((tx, ty));
                tx += tile_size_x;
            }
            ty += tile_size_y;
        }
        out
    }

    /// Convert pixel coordinates to canonical coordinates, undoing the
    /// proxy scale, mip reduction and pixel aspect ratio.
    pub fn to_canonical(self, scale: RenderScale, par: f64, mip_level: u32) -> Rect {
        let s = scale.with_mip_level(mip_level);
        Rect::new(
            f64::from(self.x1) * par / s.x,
            f64::from(self.y1) / s.y,
            f64::from(self.x2) * par / s.x,
            f64::from(self.y2) / s.y,
        )
    }
}

/// Smallest pixel rectangle enclosing a canonical-coordinate rectangle
/// at the given proxy scale, pixel aspect ratio and mip level.
pub fn canonical_to_pixel_enclosing(
    rect: Rect,
    scale: RenderScale,
    par: f64,
    mip_level: u32,
) -> FramevaultResult<RectI> {
    if !(par > 0.0) {
        return Err(FramevaultError::validation(
            "pixel aspect ratio must be > 0",
        ));
    }
    let s = scale.with_mip_level(mip_level);
    Ok(RectI {
        x1: (rect.x0 * s.x / par).floor() as i32,
        y1: (rect.y0 * s.y).floor() as i32,
        x2: (rect.x1 * s.x / par).ceil() as i32,
        y2: (rect.y1 * s.y).ceil() as i32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geom.rs"]
mod tests;
