use crate::foundation::error::{FramevaultError, FramevaultResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Timeline time in frames, possibly fractional (retimed inputs).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct TimeValue(pub f64);

/// 0-based view index (stereo/multi-view projects).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ViewIdx(pub u32);

/// Proxy render scale applied on top of the mip-map reduction.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenderScale {
    /// Horizontal scale factor, must be > 0.
    pub x: f64,
    /// Vertical scale factor, must be > 0.
    pub y: f64,
}

impl RenderScale {
    /// The 1:1 scale.
    pub fn identity() -> Self {
        Self { x: 1.0, y: 1.0 }
    }

    /// Create a validated scale with both factors > 0.
    pub fn new(x: f64, y: f64) -> FramevaultResult<Self> {
        if !(x > 0.0) || !(y > 0.0) {
            return Err(FramevaultError::validation(
                "RenderScale factors must be > 0",
            ));
        }
        Ok(Self { x, y })
    }

    /// Combined scale after applying a power-of-two mip reduction.
    pub fn with_mip_level(self, mip_level: u32) -> Self {
        let po2 = f64::from(1u32 << mip_level.min(31));
        Self {
            x: self.x / po2,
            y: self.y / po2,
        }
    }

    /// The scale as a kurbo affine transform.
    pub fn to_affine(self) -> Affine {
        Affine::scale_non_uniform(self.x, self.y)
    }
}

/// Per-component storage depth of an image buffer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum BitDepth {
    /// 8-bit unsigned integer.
    Byte,
    /// 16-bit unsigned integer.
    Short,
    /// 16-bit float. Declared for format completeness; rejected by
    /// storage derivation and pixel kernels.
    Half,
    /// 32-bit float.
    Float,
}

impl BitDepth {
    /// Bytes occupied by one component at this depth.
    pub fn component_bytes(self) -> usize {
        match self {
            BitDepth::Byte => 1,
            BitDepth::Short | BitDepth::Half => 2,
            BitDepth::Float => 4,
        }
    }

    /// Stable one-byte tag used when feeding the depth to a hash.
    pub fn hash_byte(self) -> u8 {
        match self {
            BitDepth::Byte => 0,
            BitDepth::Short => 1,
            BitDepth::Half => 2,
            BitDepth::Float => 3,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
