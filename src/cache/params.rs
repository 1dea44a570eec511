use crate::cache::key::TextureRect;
use crate::foundation::core::{BitDepth, Rect};
use crate::foundation::error::{FramevaultError, FramevaultResult};
use crate::foundation::geom::RectI;

/// Where a cache entry's pixel payload lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StorageMode {
    /// Process memory.
    Ram,
    /// An OpenGL texture owned by the viewer.
    GlTexture,
    /// The disk-backed cache.
    Disk,
}

/// Field ordering of an interlaced image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageFielding {
    /// Progressive (no fields).
    None,
    /// Lower field first.
    Lower,
    /// Upper field first.
    Upper,
}

/// Alpha premultiplication state of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImagePremult {
    /// No alpha, fully opaque.
    Opaque,
    /// Color channels premultiplied by alpha.
    Premultiplied,
    /// Straight alpha.
    Unpremultiplied,
}

/// Descriptor of one image plane: its identifier and channel names.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PlaneDesc {
    plane_id: String,
    channels: Vec<String>,
}

impl PlaneDesc {
    /// Arbitrary plane with explicit channel names.
    pub fn new(plane_id: impl Into<String>, channels: Vec<String>) -> Self {
        Self {
            plane_id: plane_id.into(),
            channels,
        }
    }

    /// The color plane with R, G, B and A channels.
    pub fn rgba() -> Self {
        Self::new("Color", vec!["R".into(), "G".into(), "B".into(), "A".into()])
    }

    /// The color plane with R, G and B channels.
    pub fn rgb() -> Self {
        Self::new("Color", vec!["R".into(), "G".into(), "B".into()])
    }

    /// A single-channel alpha plane.
    pub fn alpha() -> Self {
        Self::new("Color", vec!["A".into()])
    }

    /// Plane identifier (e.g. `Color`, `Backward.Motion`).
    pub fn plane_id(&self) -> &str {
        &self.plane_id
    }

    /// Channel names, in storage order.
    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    /// Number of components per pixel.
    pub fn num_components(&self) -> u32 {
        self.channels.len() as u32
    }
}

/// Eviction hints attached to every cache entry: how expensive the
/// entry was to produce and how large it is.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NonKeyParams {
    cost: i64,
    elements_count: u64,
}

impl NonKeyParams {
    /// New hints; `cost` ranks how expensive the entry is to recompute
    /// and `elements_count` how many samples it stores.
    pub fn new(cost: i64, elements_count: u64) -> Self {
        Self {
            cost,
            elements_count,
        }
    }

    /// Recompute-cost rank (higher survives eviction longer).
    pub fn cost(&self) -> i64 {
        self.cost
    }

    /// Stored sample count.
    pub fn elements_count(&self) -> u64 {
        self.elements_count
    }
}

/// Physical storage layout of a cache entry's pixel payload.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct StorageDescriptor {
    mode: StorageMode,
    bounds: RectI,
    bytes_per_component: u32,
    num_components: u32,
    texture_target: u32,
}

impl StorageDescriptor {
    /// Derive the layout from the entry's depth and plane.
    ///
    /// Pure function of `{bit_depth, plane}` with a fixed size table;
    /// a depth outside the table is an explicit error.
    pub fn derive(
        bit_depth: BitDepth,
        plane: &PlaneDesc,
        mode: StorageMode,
        bounds: RectI,
        texture_target: u32,
    ) -> FramevaultResult<Self> {
        let bytes_per_component = match bit_depth {
            BitDepth::Byte => 1,
            BitDepth::Short => 2,
            BitDepth::Float => 4,
            other => {
                return Err(FramevaultError::pixel_format(format!(
                    "unsupported bit depth for cache storage: {other:?}"
                )));
            }
        };
        Ok(Self {
            mode,
            bounds,
            bytes_per_component,
            num_components: plane.num_components(),
            texture_target,
        })
    }

    /// Storage location of the payload.
    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Pixel bounds the payload covers.
    pub fn bounds(&self) -> RectI {
        self.bounds
    }

    /// Bytes per component.
    pub fn bytes_per_component(&self) -> u32 {
        self.bytes_per_component
    }

    /// Components per pixel.
    pub fn num_components(&self) -> u32 {
        self.num_components
    }

    /// GL texture target when `mode` is [`StorageMode::GlTexture`],
    /// 0 otherwise. Stored, never interpreted, by this layer.
    pub fn texture_target(&self) -> u32 {
        self.texture_target
    }

    /// Payload size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.bounds.area()
            * u64::from(self.bytes_per_component)
            * u64::from(self.num_components)
    }
}

/// Value metadata of a full image cache entry.
///
/// Constructed once when a render task is set up, immutable
/// thereafter, attached 1:1 to a cache entry. Equality compares every
/// field that affects reproducibility of the cached pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageParams {
    base: NonKeyParams,
    rod: Rect,
    par: f64,
    plane: PlaneDesc,
    bit_depth: BitDepth,
    premult: ImagePremult,
    fielding: ImageFielding,
    mip_level: u32,
    is_project_format: bool,
    storage: StorageDescriptor,
}

impl ImageParams {
    /// Build the params, deriving the storage descriptor from the
    /// depth and plane.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        base: NonKeyParams,
        rod: Rect,
        par: f64,
        plane: PlaneDesc,
        bit_depth: BitDepth,
        premult: ImagePremult,
        fielding: ImageFielding,
        mip_level: u32,
        is_project_format: bool,
        mode: StorageMode,
        bounds: RectI,
        texture_target: u32,
    ) -> FramevaultResult<Self> {
        if !(par > 0.0) {
            return Err(FramevaultError::validation(
                "pixel aspect ratio must be > 0",
            ));
        }
        let storage = StorageDescriptor::derive(bit_depth, &plane, mode, bounds, texture_target)?;
        Ok(Self {
            base,
            rod,
            par,
            plane,
            bit_depth,
            premult,
            fielding,
            mip_level,
            is_project_format,
            storage,
        })
    }

    /// Eviction hints.
    pub fn base(&self) -> &NonKeyParams {
        &self.base
    }

    /// Region of definition in canonical coordinates.
    pub fn rod(&self) -> Rect {
        self.rod
    }

    /// Pixel aspect ratio.
    pub fn par(&self) -> f64 {
        self.par
    }

    /// Plane descriptor.
    pub fn plane(&self) -> &PlaneDesc {
        &self.plane
    }

    /// Sample depth.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Premultiplication state.
    pub fn premult(&self) -> ImagePremult {
        self.premult
    }

    /// Field ordering.
    pub fn fielding(&self) -> ImageFielding {
        self.fielding
    }

    /// Mip level of the stored pixels.
    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }

    /// `true` when the RoD equals the project format rect.
    pub fn is_project_format(&self) -> bool {
        self.is_project_format
    }

    /// Physical storage layout.
    pub fn storage(&self) -> &StorageDescriptor {
        &self.storage
    }
}

/// Value metadata of a viewer-texture cache entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameParams {
    base: NonKeyParams,
    rod: Rect,
    bit_depth: BitDepth,
    texture_rect: TextureRect,
    mip_level: u32,
}

impl FrameParams {
    /// Build the params for one viewer texture.
    pub fn new(
        base: NonKeyParams,
        rod: Rect,
        bit_depth: BitDepth,
        texture_rect: TextureRect,
        mip_level: u32,
    ) -> Self {
        Self {
            base,
            rod,
            bit_depth,
            texture_rect,
            mip_level,
        }
    }

    /// Eviction hints.
    pub fn base(&self) -> &NonKeyParams {
        &self.base
    }

    /// Region of definition in canonical coordinates.
    pub fn rod(&self) -> Rect {
        self.rod
    }

    /// Sample depth of the texture.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Texture rect the entry covers.
    pub fn texture_rect(&self) -> TextureRect {
        self.texture_rect
    }

    /// Mip level of the stored pixels.
    pub fn mip_level(&self) -> u32 {
        self.mip_level
    }
}

/// On-disk format version of the params serialization. Bump on any
/// breaking change so older readers fail loudly instead of misreading.
pub const PARAMS_FORMAT_VERSION: u32 = 1;

#[derive(serde::Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    params: &'a T,
}

#[derive(serde::Deserialize)]
struct Envelope<T> {
    version: u32,
    params: T,
}

/// Serialize params (or any metadata value) inside a versioned
/// envelope.
pub fn to_versioned_json<T: serde::Serialize>(params: &T) -> FramevaultResult<String> {
    serde_json::to_string(&EnvelopeRef {
        version: PARAMS_FORMAT_VERSION,
        params,
    })
    .map_err(|e| FramevaultError::serde(e.to_string()))
}

/// Load params serialized by [`to_versioned_json`], verifying the
/// format version.
pub fn from_versioned_json<T: serde::de::DeserializeOwned>(json: &str) -> FramevaultResult<T> {
    let env: Envelope<T> =
        serde_json::from_str(json).map_err(|e| FramevaultError::serde(e.to_string()))?;
    if env.version != PARAMS_FORMAT_VERSION {
        return Err(FramevaultError::serde(format!(
            "unsupported cache params version {} (expected {})",
            env.version, PARAMS_FORMAT_VERSION
        )));
    }
    Ok(env.params)
}

#[cfg(test)]
#[path = "../../tests/unit/cache/params.rs"]
mod tests;
