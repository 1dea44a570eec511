//! Framevault is the content-addressed frame cache and hashing core
//! of a node-based compositing engine.
//!
//! The crate covers the machinery between "a node graph changed" and
//! "these cached pixels are still valid":
//!
//! 1. **Hash**: each node/knob registers in a [`HashGraph`] and
//!    contributes its content through [`HashSource`]; computed hashes
//!    are cached per `(time, view)` and invalidated up the parent
//!    chain on any mutation.
//! 2. **Key**: the ambient render context (tracked per thread by
//!    [`EffectTlsData`]) plus the node hash produce a [`FrameKey`].
//! 3. **Locate**: the key addresses a [`FrameCache`] entry holding
//!    [`FrameParams`]/[`ImageParams`] metadata and a tiled
//!    [`ImageCacheEntry`] payload; 64-bit hash collisions are resolved
//!    by full key equality.
//! 4. **Populate**: tile pixels are written, edge-extrapolated and
//!    mip-reduced with the kernels in [`copy_pixels`],
//!    [`repeat_edges`] and [`downscale_mipmap`].
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic hashing**: identical append sequences always
//!   produce identical 64-bit values, and a finalized hash is never 0
//!   (0 is the "not computed" sentinel).
//! - **Short critical sections**: every lock covers one
//!   find/compute/store sequence; nothing blocks on IO.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod cache;
mod context;
mod foundation;
mod hash;
mod tile;

pub use cache::entry::{ImageCacheEntry, Tile};
pub use cache::key::{FrameKey, TextureRect};
pub use cache::params::{
    FrameParams, ImageFielding, ImageParams, ImagePremult, NonKeyParams, PARAMS_FORMAT_VERSION,
    PlaneDesc, StorageDescriptor, StorageMode, from_versioned_json, to_versioned_json,
};
pub use cache::store::{CachedFrame, FrameCache, FrameCacheOpts, FrameCacheStats};
pub use context::action::{
    ActionFrame, ActionScope, EffectTlsData, GenericActionArgs, PlaneBinding, RENDER_ACTION_NAME,
    RenderActionArgs,
};
pub use context::tls::{AbortFlag, FrameRenderArgs, TlsHolder};
pub use foundation::core::{Affine, BitDepth, Point, Rect, RenderScale, TimeValue, Vec2, ViewIdx};
pub use foundation::error::{FramevaultError, FramevaultResult};
pub use foundation::geom::{RectI, canonical_to_pixel_enclosing};
pub use hash::graph::{HashArgs, HashGraph, HashSlot, HashSource};
pub use hash::hasher::Hash64;
pub use tile::pixel::{BufView, BufViewMut, Pixel, PixelStorage, PixelView, PixelViewMut};
pub use tile::proc::{copy_pixels, downscale_mipmap, fill_with_constant, repeat_edges};
