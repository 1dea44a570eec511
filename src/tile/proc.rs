//! Pixel algorithms used when populating, finalizing and
//! mip-mapping tiled cache entries.
//!
//! Everything here is pure and stateless; different threads may
//! process disjoint buffers concurrently. Runtime depth dispatch is an
//! exhaustive match over the three processed depths, and a mismatched
//! or unsupported depth is an explicit error rather than a skipped
//! operation.

use crate::foundation::error::{FramevaultError, FramevaultResult};
use crate::foundation::geom::RectI;
use crate::tile::pixel::{BufView, BufViewMut, Pixel, PixelStorage, PixelView, PixelViewMut};

fn depth_mismatch(what: &str) -> FramevaultError {
    FramevaultError::pixel_format(format!("{what}: source and destination bit depths differ"))
}

/// Copy the pixels inside `window` from `src` to `dst`.
///
/// When both sides are packed (`x_stride == 1`) each scanline is one
/// bulk copy; otherwise samples are copied one by one. The caller
/// guarantees `window` is inside both views (debug-asserted; release
/// builds clip to the intersection). Debug builds assert the source
/// window carries no NaN.
pub fn copy_pixels(window: RectI, src: &BufView<'_>, dst: &mut BufViewMut<'_>) -> FramevaultResult<()> {
    match (src, dst) {
        (BufView::Byte(s), BufViewMut::Byte(d)) => copy_pixels_typed(window, s, d),
        (BufView::Short(s), BufViewMut::Short(d)) => copy_pixels_typed(window, s, d),
        (BufView::Float(s), BufViewMut::Float(d)) => copy_pixels_typed(window, s, d),
        _ => return Err(depth_mismatch("copy_pixels")),
    }
    Ok(())
}

fn copy_pixels_typed<T: Pixel>(window: RectI, src: &PixelView<'_, T>, dst: &mut PixelViewMut<'_, T>) {
    debug_assert!(src.bounds.contains_rect(window), "window outside source");
    debug_assert!(dst.bounds.contains_rect(window), "window outside destination");
    let w = match window.intersect(src.bounds).and_then(|r| r.intersect(dst.bounds)) {
        Some(r) => r,
        None => return,
    };

    if src.x_stride == 1 && dst.x_stride == 1 {
        let n = w.width() as usize;
        for y in w.y1..w.y2 {
            let si = src.index_of(w.x1, y);
            let di = dst.index_of(w.x1, y);
            if cfg!(debug_assertions) {
                for &p in &src.data[si..si + n] {
                    debug_assert!(!p.is_nan_sample(), "NaN in copy_pixels source");
                }
            }
            dst.data[di..di + n].copy_from_slice(&src.data[si..si + n]);
        }
    } else {
        for y in w.y1..w.y2 {
            for x in w.x1..w.x2 {
                let p = src.data[src.index_of(x, y)];
                debug_assert!(!p.is_nan_sample(), "NaN in copy_pixels source");
                let di = dst.index_of(x, y);
                dst.data[di] = p;
            }
        }
    }
}

/// Write `value` to every pixel of `roi` (clipped to the view bounds).
pub fn fill_with_constant(dst: &mut BufViewMut<'_>, roi: RectI, value: f64) -> FramevaultResult<()> {
    debug_assert!(!value.is_nan(), "NaN fill value");
    match dst {
        BufViewMut::Byte(d) => fill_typed(d, roi, u8::from_f64(value)),
        BufViewMut::Short(d) => fill_typed(d, roi, u16::from_f64(value)),
        BufViewMut::Float(d) => fill_typed(d, roi, f32::from_f64(value)),
    }
    Ok(())
}

fn fill_typed<T: Pixel>(dst: &mut PixelViewMut<'_, T>, roi: RectI, value: T) {
    let r = match roi.intersect(dst.bounds) {
        Some(r) => r,
        None => return,
    };
    if dst.x_stride == 1 {
        let n = r.width() as usize;
        for y in r.y1..r.y2 {
            let di = dst.index_of(r.x1, y);
            dst.data[di..di + n].fill(value);
        }
    } else {
        for y in r.y1..r.y2 {
            for x in r.x1..r.x2 {
                let di = dst.index_of(x, y);
                dst.data[di] = value;
            }
        }
    }
}

/// Extrapolate a partially-populated tile to its full tile rect by
/// nearest-edge replication.
///
/// `storage` holds one full tile (`tile_size_x * tile_size_y` packed
/// samples) whose valid data occupies `bounds`; the tile rect is
/// `bounds` rounded outward to tile granularity. Exactly 8 border
/// regions are filled - 4 corners with the nearest corner pixel, 4
/// edge strips with the nearest row/column - and zero-area regions are
/// skipped, so the call is a no-op on a fully-populated tile.
pub fn repeat_edges(
    storage: &mut PixelStorage,
    bounds: RectI,
    tile_size_x: i32,
    tile_size_y: i32,
) -> FramevaultResult<()> {
    if tile_size_x <= 0 || tile_size_y <= 0 {
        return Err(FramevaultError::validation("tile sizes must be > 0"));
    }
    if bounds.is_empty() {
        return Err(FramevaultError::validation(
            "repeat_edges requires non-empty valid bounds",
        ));
    }
    let rounded = bounds.round_to_tile_size(tile_size_x, tile_size_y);
    if rounded.width() != tile_size_x || rounded.height() != tile_size_y {
        return Err(FramevaultError::validation(
            "repeat_edges bounds must lie within a single tile",
        ));
    }
    if storage.len() != (tile_size_x as usize) * (tile_size_y as usize) {
        return Err(FramevaultError::validation(
            "repeat_edges storage must cover exactly one tile",
        ));
    }
    match storage {
        PixelStorage::Byte(v) => repeat_edges_typed(v, bounds, rounded),
        PixelStorage::Short(v) => repeat_edges_typed(v, bounds, rounded),
        PixelStorage::Float(v) => repeat_edges_typed(v, bounds, rounded),
    }
    Ok(())
}

fn repeat_edges_typed<T: Pixel>(data: &mut [T], bounds: RectI, rounded: RectI) {
    let row = rounded.width() as usize;
    let idx =
        |x: i32, y: i32| ((y - rounded.y1) as usize) * row + (x - rounded.x1) as usize;

    let has_left = bounds.x1 > rounded.x1;
    let has_right = bounds.x2 < rounded.x2;
    let has_bottom = bounds.y1 > rounded.y1;
    let has_top = bounds.y2 < rounded.y2;

    // 4 corners: flat fill with the nearest corner pixel.
    if has_bottom && has_left {
        let v = data[idx(bounds.x1, bounds.y1)];
        for y in rounded.y1..bounds.y1 {
            for x in rounded.x1..bounds.x1 {
                data[idx(x, y)] = v;
            }
        }
    }
    if has_bottom && has_right {
        let v = data[idx(bounds.x2 - 1, bounds.y1)];
        for y in rounded.y1..bounds.y1 {
            for x in bounds.x2..rounded.x2 {
                data[idx(x, y)] = v;
            }
        }
    }
    if has_top && has_left {
        let v = data[idx(bounds.x1, bounds.y2 - 1)];
        for y in bounds.y2..rounded.y2 {
            for x in rounded.x1..bounds.x1 {
                data[idx(x, y)] = v;
            }
        }
    }
    if has_top && has_right {
        let v = data[idx(bounds.x2 - 1, bounds.y2 - 1)];
        for y in bounds.y2..rounded.y2 {
            for x in bounds.x2..rounded.x2 {
                data[idx(x, y)] = v;
            }
        }
    }

    // 4 edge strips: replicate the nearest row/column.
    if has_bottom {
        let src = idx(bounds.x1, bounds.y1);
        let n = bounds.width() as usize;
        for y in rounded.y1..bounds.y1 {
            data.copy_within(src..src + n, idx(bounds.x1, y));
        }
    }
    if has_top {
        let src = idx(bounds.x1, bounds.y2 - 1);
        let n = bounds.width() as usize;
        for y in bounds.y2..rounded.y2 {
            data.copy_within(src..src + n, idx(bounds.x1, y));
        }
    }
    if has_left {
        for y in bounds.y1..bounds.y2 {
            let v = data[idx(bounds.x1, y)];
            for x in rounded.x1..bounds.x1 {
                data[idx(x, y)] = v;
            }
        }
    }
    if has_right {
        for y in bounds.y1..bounds.y2 {
            let v = data[idx(bounds.x2 - 1, y)];
            for x in bounds.x2..rounded.x2 {
                data[idx(x, y)] = v;
            }
        }
    }
}

/// Build one tile at mip level `N + 1` from up to 4 sibling tiles at
/// level `N`.
///
/// Quadrants are indexed `qx + 2 * qy` with quadrant 0 at the tile's
/// origin corner. Each present quadrant contributes a 2x2 box average
/// (`(a+b+c+d)/4` in f64, narrowed with the destination type's
/// conversion) into its quarter of `dst`; the area the present
/// quadrants did not cover is then filled by [`repeat_edges`]. Tiles
/// come from the tile grid of a rectangular image, so the present set
/// always forms a (non-empty) rectangle of quadrants; edge and corner
/// tiles of the pyramid with 2 or 3 absent quadrants are the common
/// case, a fully absent set is an error.
pub fn downscale_mipmap(
    src_quadrants: [Option<&PixelStorage>; 4],
    dst: &mut PixelStorage,
    tile_size_x: i32,
    tile_size_y: i32,
) -> FramevaultResult<()> {
    if tile_size_x <= 0 || tile_size_y <= 0 || tile_size_x % 2 != 0 || tile_size_y % 2 != 0 {
        return Err(FramevaultError::validation(
            "downscale_mipmap tile sizes must be positive and even",
        ));
    }
    if src_quadrants.iter().all(Option::is_none) {
        return Err(FramevaultError::validation(
            "downscale_mipmap requires at least one source quadrant",
        ));
    }
    {
        let p = |i: usize| src_quadrants[i].is_some();
        let col = [p(0) || p(2), p(1) || p(3)];
        let row = [p(0) || p(1), p(2) || p(3)];
        debug_assert!(
            (0..4).all(|i| p(i) == (col[i % 2] && row[i / 2])),
            "present quadrants must form a rectangle"
        );
    }
    let tile_len = (tile_size_x as usize) * (tile_size_y as usize);
    if dst.len() != tile_len {
        return Err(FramevaultError::validation(
            "downscale_mipmap destination must cover exactly one tile",
        ));
    }
    for q in src_quadrants.iter().flatten() {
        if q.depth() != dst.depth() {
            return Err(depth_mismatch("downscale_mipmap"));
        }
        if q.len() != tile_len {
            return Err(FramevaultError::validation(
                "downscale_mipmap source quadrants must cover exactly one tile",
            ));
        }
    }

    let quadrant_slices = |i: usize| src_quadrants[i];
    let valid = match dst {
        PixelStorage::Byte(d) => downscale_typed::<u8>(
            [0, 1, 2, 3].map(|i| match quadrant_slices(i) {
                Some(PixelStorage::Byte(v)) => Some(v.as_slice()),
                _ => None,
            }),
            d,
            tile_size_x,
            tile_size_y,
        ),
        PixelStorage::Short(d) => downscale_typed::<u16>(
            [0, 1, 2, 3].map(|i| match quadrant_slices(i) {
                Some(PixelStorage::Short(v)) => Some(v.as_slice()),
                _ => None,
            }),
            d,
            tile_size_x,
            tile_size_y,
        ),
        PixelStorage::Float(d) => downscale_typed::<f32>(
            [0, 1, 2, 3].map(|i| match quadrant_slices(i) {
                Some(PixelStorage::Float(v)) => Some(v.as_slice()),
                _ => None,
            }),
            d,
            tile_size_x,
            tile_size_y,
        ),
    };

    if valid.width() < tile_size_x || valid.height() < tile_size_y {
        repeat_edges(dst, valid, tile_size_x, tile_size_y)?;
    }
    Ok(())
}

fn downscale_typed<T: Pixel>(
    src_quadrants: [Option<&[T]>; 4],
    dst: &mut [T],
    tile_size_x: i32,
    tile_size_y: i32,
) -> RectI {
    let half_x = tile_size_x / 2;
    let half_y = tile_size_y / 2;
    let row = tile_size_x as usize;
    let mut valid = RectI::default();

    for (i, q) in src_quadrants.iter().enumerate() {
        let Some(s) = q else { continue };
        let qx = (i % 2) as i32;
        let qy = (i / 2) as i32;
        let quarter = RectI::new(qx * half_x, qy * half_y, (qx + 1) * half_x, (qy + 1) * half_y);
        for y in 0..half_y {
            for x in 0..half_x {
                let sx = (2 * x) as usize;
                let sy = (2 * y) as usize;
                let a = s[sy * row + sx].to_f64();
                let b = s[sy * row + sx + 1].to_f64();
                let c = s[(sy + 1) * row + sx].to_f64();
                let d = s[(sy + 1) * row + sx + 1].to_f64();
                let avg = (a + b + c + d) / 4.0;
                dst[((quarter.y1 + y) as usize) * row + (quarter.x1 + x) as usize] =
                    T::from_f64(avg);
            }
        }
        valid = valid.union(quarter);
    }
    valid
}
