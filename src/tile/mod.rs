//! Tile-level pixel storage and the cache-entry pixel algorithms
//! (strided copy, constant fill, edge-repeat, mipmap downscale).

/// Sample types, typed storage and strided views.
pub mod pixel;
/// Pixel algorithms over tiles and strided windows.
pub mod proc;
