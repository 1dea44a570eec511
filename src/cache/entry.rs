use crate::cache::params::NonKeyParams;
use crate::foundation::core::BitDepth;
use crate::foundation::error::{FramevaultError, FramevaultResult};
use crate::foundation::geom::RectI;
use crate::tile::pixel::{BufView, BufViewMut, PixelStorage};
use crate::tile::proc;
use rayon::prelude::*;

/// One tile of a cache entry: a full tile-sized buffer plus the
/// sub-rect that holds real image data (the rest is populated by
/// edge-repeat when the entry is finalized).
#[derive(Clone, Debug)]
pub struct Tile {
    tile_rect: RectI,
    valid_bounds: RectI,
    storage: PixelStorage,
}

impl Tile {
    /// Tile-aligned rect this tile occupies.
    pub fn tile_rect(&self) -> RectI {
        self.tile_rect
    }

    /// Sub-rect of [`Tile::tile_rect`] holding real image data.
    pub fn valid_bounds(&self) -> RectI {
        self.valid_bounds
    }

    /// The tile's sample buffer (packed, covering the full tile rect).
    pub fn storage(&self) -> &PixelStorage {
        &self.storage
    }
}

/// Tiled pixel payload of one image cache entry.
///
/// Storage is a grid of fixed-size tiles covering `bounds` rounded to
/// tile granularity, each tile a packed buffer of the entry's bit
/// depth. Tiles are zero-filled at creation, populated through
/// [`ImageCacheEntry::write_region`], extrapolated to full tiles by
/// [`ImageCacheEntry::finalize_tiles`] and reduced level by level with
/// [`ImageCacheEntry::build_mip_level`].
#[derive(Clone, Debug)]
pub struct ImageCacheEntry {
    bounds: RectI,
    depth: BitDepth,
    tile_size_x: i32,
    tile_size_y: i32,
    mip_level: u32,
    tiles_rect: RectI,
    tiles_per_row: i32,
    tiles: Vec<Tile>,
}

impl ImageCacheEntry {
    /// Allocate a zero-filled entry covering `bounds`.
    ///
    /// Tile sizes must be positive and even (mip reduction halves
    /// them); the depth must be one of the processed depths.
    pub fn new(
        bounds: RectI,
        depth: BitDepth,
        tile_size_x: i32,
        tile_size_y: i32,
        mip_level: u32,
    ) -> FramevaultResult<Self> {
        if bounds.is_empty() {
            return Err(FramevaultError::validation(
                "cache entry bounds must be non-empty",
            ));
        }
        if tile_size_x <= 0 || tile_size_y <= 0 || tile_size_x % 2 != 0 || tile_size_y % 2 != 0 {
            return Err(FramevaultError::validation(
                "tile sizes must be positive and even",
            ));
        }
        let tiles_rect = bounds.round_to_tile_size(tile_size_x, tile_size_y);
        let tiles_per_row = tiles_rect.width() / tile_size_x;
        let tile_len = (tile_size_x as usize) * (tile_size_y as usize);
        let mut tiles = Vec::new();
        for (ox, oy) in tiles_rect.tile_origins(tile_size_x, tile_size_y) {
            let tile_rect = RectI::new(ox, oy, ox + tile_size_x, oy + tile_size_y);
            let valid_bounds = tile_rect
                .intersect(bounds)
                .expect("tile grid tiles intersect the entry bounds");
            tiles.push(Tile {
                tile_rect,
                valid_bounds,
                storage: PixelStorage::allocate(depth, tile_len)?,
            });
        }
        Ok(Self {
            bounds,
            depth,
            tile_size_x,
            tile_size_y,
            mip_level,
            tiles_rect,
            tiles_per_row,
            tiles,
        })
    }

    /// True data bounds of the entry.
    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    /// Sample depth of every tile.
    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    /// Mip level this entry stores (0 is full resolution).
    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    /// Tile size as `(x, y)`.
    pub fn tile_size(&self) -> (i32, i32) {
        (self.tile_size_x, self.tile_size_y)
    }

    /// The tiles, bottom-up row-major over the rounded bounds.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Total sample count across all tiles.
    pub fn elements_count(&self) -> u64 {
        self.tiles.len() as u64 * self.tile_size_x as u64 * self.tile_size_y as u64
    }

    /// Total payload size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.elements_count() * self.depth.component_bytes() as u64
    }

    /// Eviction hints for the storage layer.
    pub fn non_key_params(&self, cost: i64) -> NonKeyParams {
        NonKeyParams::new(cost, self.elements_count())
    }

    fn tile_index(&self, tile_origin_x: i32, tile_origin_y: i32) -> Option<usize> {
        if !self.tiles_rect.contains(tile_origin_x, tile_origin_y) {
            return None;
        }
        let col = (tile_origin_x - self.tiles_rect.x1) / self.tile_size_x;
        let row = (tile_origin_y - self.tiles_rect.y1) / self.tile_size_y;
        Some((row * self.tiles_per_row + col) as usize)
    }

    /// Copy `src` into every tile it overlaps, clipped to the entry
    /// bounds. Tiles are written concurrently.
    pub fn write_region(&mut self, src: &BufView<'_>) -> FramevaultResult<()> {
        if src.depth() != self.depth {
            return Err(FramevaultError::pixel_format(
                "write_region: source depth differs from entry depth",
            ));
        }
        let window = match src.bounds().intersect(self.bounds) {
            Some(w) => w,
            None => return Ok(()),
        };
        let tile_size_x = self.tile_size_x;
        self.tiles
            .par_iter_mut()
            .try_for_each(|tile| -> FramevaultResult<()> {
                let w = match window.intersect(tile.valid_bounds) {
                    Some(w) => w,
                    None => return Ok(()),
                };
                let mut dst = BufViewMut::from_storage(
                    &mut tile.storage,
                    tile.tile_rect,
                    1,
                    tile_size_x as usize,
                )?;
                proc::copy_pixels(w, src, &mut dst)
            })
    }

    /// Copy the overlap of `dst` and the entry bounds out of the tile
    /// grid into `dst`.
    pub fn read_region(&self, dst: &mut BufViewMut<'_>) -> FramevaultResult<()> {
        if dst.depth() != self.depth {
            return Err(FramevaultError::pixel_format(
                "read_region: destination depth differs from entry depth",
            ));
        }
        let window = match dst.bounds().intersect(self.bounds) {
            Some(w) => w,
            None => return Ok(()),
        };
        for tile in &self.tiles {
            let w = match window.intersect(tile.valid_bounds) {
                Some(w) => w,
                None => continue,
            };
            let src = BufView::from_storage(
                &tile.storage,
                tile.tile_rect,
                1,
                self.tile_size_x as usize,
            )?;
            proc::copy_pixels(w, &src, dst)?;
        }
        Ok(())
    }

    /// Write `value` over `roi` (clipped to the entry bounds).
    pub fn fill(&mut self, roi: RectI, value: f64) -> FramevaultResult<()> {
        let window = match roi.intersect(self.bounds) {
            Some(w) => w,
            None => return Ok(()),
        };
        let tile_size_x = self.tile_size_x;
        self.tiles
            .par_iter_mut()
            .try_for_each(|tile| -> FramevaultResult<()> {
                let w = match window.intersect(tile.valid_bounds) {
                    Some(w) => w,
                    None => return Ok(()),
                };
                let mut dst = BufViewMut::from_storage(
                    &mut tile.storage,
                    tile.tile_rect,
                    1,
                    tile_size_x as usize,
                )?;
                proc::fill_with_constant(&mut dst, w, value)
            })
    }

    /// Extrapolate every boundary tile to its full tile rect by
    /// edge-repeat, so later filtering never reads undefined samples.
    /// Tiles are processed concurrently.
    pub fn finalize_tiles(&mut self) -> FramevaultResult<()> {
        let (tile_size_x, tile_size_y) = (self.tile_size_x, self.tile_size_y);
        self.tiles
            .par_iter_mut()
            .try_for_each(|tile| -> FramevaultResult<()> {
                if tile.valid_bounds == tile.tile_rect {
                    return Ok(());
                }
                proc::repeat_edges(&mut tile.storage, tile.valid_bounds, tile_size_x, tile_size_y)
            })
    }

    /// Produce the entry one mip level down by box-filtering each 2x2
    /// tile quad. Expects a finalized entry (see
    /// [`ImageCacheEntry::finalize_tiles`]); destination tiles are
    /// built concurrently.
    pub fn build_mip_level(&self) -> FramevaultResult<ImageCacheEntry> {
        let dst_bounds = self.bounds.downscale_po2(1);
        let mut dst = ImageCacheEntry::new(
            dst_bounds,
            self.depth,
            self.tile_size_x,
            self.tile_size_y,
            self.mip_level + 1,
        )?;
        let (tile_size_x, tile_size_y) = (self.tile_size_x, self.tile_size_y);
        dst.tiles
            .par_iter_mut()
            .try_for_each(|dst_tile| -> FramevaultResult<()> {
                let ox = dst_tile.tile_rect.x1 * 2;
                let oy = dst_tile.tile_rect.y1 * 2;
                let quadrant = |qx: i32, qy: i32| -> Option<&PixelStorage> {
                    self.tile_index(ox + qx * tile_size_x, oy + qy * tile_size_y)
                        .map(|i| &self.tiles[i].storage)
                };
                let quadrants = [
                    quadrant(0, 0),
                    quadrant(1, 0),
                    quadrant(0, 1),
                    quadrant(1, 1),
                ];
                proc::downscale_mipmap(quadrants, &mut dst_tile.storage, tile_size_x, tile_size_y)
            })?;
        Ok(dst)
    }
}
