use super::*;

fn texture_rect() -> TextureRect {
    TextureRect {
        x1: 0,
        y1: 0,
        x2: 256,
        y2: 256,
        w: 1920,
        h: 1080,
        closest_po2: 2,
    }
}

fn base_key() -> FrameKey {
    FrameKey::new(
        TimeValue(24.0),
        0xdead_beef,
        1.0,
        2,
        BitDepth::Float,
        4,
        ViewIdx(0),
        texture_rect(),
        RenderScale::identity(),
        "Read1",
    )
}

#[test]
fn equal_keys_hash_equal() {
    let a = base_key();
    let b = base_key();
    assert_eq!(a, b);
    assert_eq!(a.hash(), b.hash());
}

#[test]
fn every_field_feeds_the_hash() {
    let base = base_key();
    let variants = [
        FrameKey::new(
            TimeValue(25.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_bee0,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            2.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            3,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Byte,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            3,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(1),
            texture_rect(),
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            TextureRect {
                closest_po2: 3,
                ..texture_rect()
            },
            RenderScale::identity(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::new(0.5, 1.0).unwrap(),
            "Read1",
        ),
        FrameKey::new(
            TimeValue(24.0),
            0xdead_beef,
            1.0,
            2,
            BitDepth::Float,
            4,
            ViewIdx(0),
            texture_rect(),
            RenderScale::identity(),
            "Read2",
        ),
    ];

    for variant in &variants {
        assert_ne!(*variant, base);
        assert_ne!(variant.hash(), base.hash());
    }
}

#[test]
fn equality_is_independent_of_the_hash() {
    // Identity is decided by field comparison; the hash is only an
    // index. Whatever the 64-bit values do, distinct keys must
    // compare unequal.
    let a = base_key();
    let b = FrameKey::new(
        TimeValue(24.0),
        0xdead_beef,
        1.0,
        2,
        BitDepth::Float,
        4,
        ViewIdx(0),
        texture_rect(),
        RenderScale::identity(),
        "Read2",
    );
    assert_ne!(a, b);
}

#[test]
fn fill_hash_appends_in_a_fixed_order() {
    let key = base_key();
    let mut a = Hash64::new();
    key.fill_hash(&mut a);
    let mut b = Hash64::new();
    key.fill_hash(&mut b);
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn from_render_context_copies_the_ambient_fields() {
    let render = RenderActionArgs {
        time: TimeValue(12.5),
        view: ViewIdx(1),
        scale: RenderScale::new(0.5, 0.5).unwrap(),
        mip_level: 1,
        render_window: crate::foundation::geom::RectI::new(0, 0, 64, 64),
        output_planes: std::collections::HashMap::new(),
    };
    let key = FrameKey::from_render_context(
        &render,
        99,
        1.0,
        0,
        BitDepth::Byte,
        4,
        texture_rect(),
        "Merge1",
    );
    assert_eq!(key.time(), TimeValue(12.5));
    assert_eq!(key.view(), ViewIdx(1));
    assert_eq!(key.tree_version(), 99);
    assert_eq!(key.input_name(), "Merge1");
}
