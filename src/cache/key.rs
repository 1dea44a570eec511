use crate::context::action::RenderActionArgs;
use crate::foundation::core::{BitDepth, RenderScale, TimeValue, ViewIdx};
use crate::hash::hasher::Hash64;

/// The tile rect a viewer texture covers within a full texture of
/// `w x h` pixels at power-of-two reduction `closest_po2`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TextureRect {
    /// Left edge (inclusive).
    pub x1: i32,
    /// Bottom edge (inclusive).
    pub y1: i32,
    /// Right edge (exclusive).
    pub x2: i32,
    /// Top edge (exclusive).
    pub y2: i32,
    /// Full texture width.
    pub w: i32,
    /// Full texture height.
    pub h: i32,
    /// Power-of-two reduction the texture was rendered at.
    pub closest_po2: u32,
}

impl TextureRect {
    /// Horizontal pixel count of the rect.
    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).max(0)
    }

    /// Vertical pixel count of the rect.
    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).max(0)
    }
}

/// Content-addressed cache key for one rendered frame tile.
///
/// Immutable after construction. The 64-bit hash is how the storage
/// layer indexes entries; it is not how identity is decided - two
/// distinct keys may collide, and the storage layer breaks ties with
/// `==` over every field.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameKey {
    time: TimeValue,
    tree_version: u64,
    gain: f64,
    lut: i32,
    bit_depth: BitDepth,
    channels: u32,
    view: ViewIdx,
    texture_rect: TextureRect,
    scale: RenderScale,
    input_name: String,
}

impl FrameKey {
    /// Build a key from its fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: TimeValue,
        tree_version: u64,
        gain: f64,
        lut: i32,
        bit_depth: BitDepth,
        channels: u32,
        view: ViewIdx,
        texture_rect: TextureRect,
        scale: RenderScale,
        input_name: impl Into<String>,
    ) -> Self {
        Self {
            time,
            tree_version,
            gain,
            lut,
            bit_depth,
            channels,
            view,
            texture_rect,
            scale,
            input_name: input_name.into(),
        }
    }

    /// Build a key from the ambient render-action context plus the
    /// node content hash obtained from the hash graph.
    #[allow(clippy::too_many_arguments)]
    pub fn from_render_context(
        render: &RenderActionArgs,
        tree_version: u64,
        gain: f64,
        lut: i32,
        bit_depth: BitDepth,
        channels: u32,
        texture_rect: TextureRect,
        input_name: impl Into<String>,
    ) -> Self {
        Self::new(
            render.time,
            tree_version,
            gain,
            lut,
            bit_depth,
            channels,
            render.view,
            texture_rect,
            render.scale,
            input_name,
        )
    }

    /// Timeline time the key addresses.
    pub fn time(&self) -> TimeValue {
        self.time
    }

    /// Hash of the node tree that produced the frame.
    pub fn tree_version(&self) -> u64 {
        self.tree_version
    }

    /// View the key addresses.
    pub fn view(&self) -> ViewIdx {
        self.view
    }

    /// Sample depth of the cached texture.
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Texture rect of the cached texture.
    pub fn texture_rect(&self) -> TextureRect {
        self.texture_rect
    }

    /// Script name of the rendered input node.
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    /// Append every equality-relevant field to `hash`, always in the
    /// same order.
    pub fn fill_hash(&self, hash: &mut Hash64) {
        hash.append_f64(self.time.0);
        hash.append_u64(self.tree_version);
        hash.append_f64(self.gain);
        hash.append_i32(self.lut);
        hash.append_u8(self.bit_depth.hash_byte());
        hash.append_u32(self.channels);
        hash.append_u32(self.view.0);
        hash.append_i32(self.texture_rect.x1);
        hash.append_i32(self.texture_rect.y1);
        hash.append_i32(self.texture_rect.x2);
        hash.append_i32(self.texture_rect.y2);
        hash.append_i32(self.texture_rect.w);
        hash.append_i32(self.texture_rect.h);
        hash.append_u32(self.texture_rect.closest_po2);
        hash.append_f64(self.scale.x);
        hash.append_f64(self.scale.y);
        hash.append_str(&self.input_name);
    }

    /// The key's 64-bit index hash.
    pub fn hash(&self) -> u64 {
        let mut h = Hash64::new();
        self.fill_hash(&mut h);
        h.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/key.rs"]
mod tests;
