use super::*;

#[test]
fn render_scale_rejects_non_positive_factors() {
    assert!(RenderScale::new(0.5, 1.0).is_ok());
    assert!(RenderScale::new(0.0, 1.0).is_err());
    assert!(RenderScale::new(1.0, -2.0).is_err());
    assert!(RenderScale::new(f64::NAN, 1.0).is_err());
}

#[test]
fn mip_level_halves_the_scale() {
    let s = RenderScale::identity().with_mip_level(2);
    assert_eq!((s.x, s.y), (0.25, 0.25));

    let s = RenderScale::new(0.5, 1.0).unwrap().with_mip_level(1);
    assert_eq!((s.x, s.y), (0.25, 0.5));
}

#[test]
fn scale_converts_to_affine() {
    let s = RenderScale::new(0.5, 0.25).unwrap();
    assert_eq!(s.to_affine(), Affine::scale_non_uniform(0.5, 0.25));
}

#[test]
fn bit_depth_component_sizes_match_the_storage_table() {
    assert_eq!(BitDepth::Byte.component_bytes(), 1);
    assert_eq!(BitDepth::Short.component_bytes(), 2);
    assert_eq!(BitDepth::Half.component_bytes(), 2);
    assert_eq!(BitDepth::Float.component_bytes(), 4);
}

#[test]
fn bit_depth_hash_bytes_are_distinct() {
    let tags = [
        BitDepth::Byte.hash_byte(),
        BitDepth::Short.hash_byte(),
        BitDepth::Half.hash_byte(),
        BitDepth::Float.hash_byte(),
    ];
    for (i, a) in tags.iter().enumerate() {
        for b in &tags[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
