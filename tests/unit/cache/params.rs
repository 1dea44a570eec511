use super::*;

fn rgba_image_params(cost: i64) -> ImageParams {
    ImageParams::new(
        NonKeyParams::new(cost, 64 * 64 * 4),
        Rect::new(0.0, 0.0, 64.0, 64.0),
        1.0,
        PlaneDesc::rgba(),
        BitDepth::Float,
        ImagePremult::Premultiplied,
        ImageFielding::None,
        0,
        true,
        StorageMode::Ram,
        RectI::new(0, 0, 64, 64),
        0,
    )
    .unwrap()
}

#[test]
fn storage_derivation_follows_the_size_table() {
    let bounds = RectI::new(0, 0, 8, 8);
    for (depth, bytes) in [
        (BitDepth::Byte, 1),
        (BitDepth::Short, 2),
        (BitDepth::Float, 4),
    ] {
        let s = StorageDescriptor::derive(depth, &PlaneDesc::rgba(), StorageMode::Ram, bounds, 0)
            .unwrap();
        assert_eq!(s.bytes_per_component(), bytes);
        assert_eq!(s.num_components(), 4);
        assert_eq!(s.byte_size(), 64 * u64::from(bytes) * 4);
    }

    let err = StorageDescriptor::derive(
        BitDepth::Half,
        &PlaneDesc::alpha(),
        StorageMode::Ram,
        bounds,
        0,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unsupported bit depth"));
}

#[test]
fn plane_descriptors_know_their_component_count() {
    assert_eq!(PlaneDesc::rgba().num_components(), 4);
    assert_eq!(PlaneDesc::rgb().num_components(), 3);
    assert_eq!(PlaneDesc::alpha().num_components(), 1);
    let motion = PlaneDesc::new("Backward.Motion", vec!["U".into(), "V".into()]);
    assert_eq!(motion.num_components(), 2);
    assert_eq!(motion.plane_id(), "Backward.Motion");
}

#[test]
fn image_params_equality_covers_every_field() {
    let a = rgba_image_params(1);
    let b = rgba_image_params(1);
    assert_eq!(a, b);

    // A different cost is a different value.
    assert_ne!(rgba_image_params(2), a);

    // A different plane changes both the comparison and the derived
    // storage.
    let alpha = ImageParams::new(
        NonKeyParams::new(1, 64 * 64 * 4),
        Rect::new(0.0, 0.0, 64.0, 64.0),
        1.0,
        PlaneDesc::alpha(),
        BitDepth::Float,
        ImagePremult::Premultiplied,
        ImageFielding::None,
        0,
        true,
        StorageMode::Ram,
        RectI::new(0, 0, 64, 64),
        0,
    )
    .unwrap();
    assert_ne!(alpha, a);
    assert_eq!(alpha.storage().num_components(), 1);
}

#[test]
fn image_params_reject_bad_inputs() {
    assert!(
        ImageParams::new(
            NonKeyParams::new(0, 0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            0.0,
            PlaneDesc::rgba(),
            BitDepth::Float,
            ImagePremult::Opaque,
            ImageFielding::None,
            0,
            false,
            StorageMode::Ram,
            RectI::new(0, 0, 1, 1),
            0,
        )
        .is_err()
    );
    assert!(
        ImageParams::new(
            NonKeyParams::new(0, 0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            1.0,
            PlaneDesc::rgba(),
            BitDepth::Half,
            ImagePremult::Opaque,
            ImageFielding::None,
            0,
            false,
            StorageMode::Ram,
            RectI::new(0, 0, 1, 1),
            0,
        )
        .is_err()
    );
}

#[test]
fn versioned_serialization_round_trips() {
    let params = rgba_image_params(3);
    let json = to_versioned_json(&params).unwrap();
    let loaded: ImageParams = from_versioned_json(&json).unwrap();
    assert_eq!(loaded, params);
}

#[test]
fn versioned_serialization_round_trips_frame_params() {
    let params = FrameParams::new(
        NonKeyParams::new(0, 256 * 256),
        Rect::new(0.0, 0.0, 256.0, 256.0),
        BitDepth::Byte,
        TextureRect {
            x1: 0,
            y1: 0,
            x2: 256,
            y2: 256,
            w: 256,
            h: 256,
            closest_po2: 1,
        },
        0,
    );
    let json = to_versioned_json(&params).unwrap();
    let loaded: FrameParams = from_versioned_json(&json).unwrap();
    assert_eq!(loaded, params);
}

#[test]
fn version_mismatch_fails_loudly() {
    let params = rgba_image_params(1);
    let json = to_versioned_json(&params).unwrap();
    let bumped = json.replacen(
        &format!("\"version\":{PARAMS_FORMAT_VERSION}"),
        &format!("\"version\":{}", PARAMS_FORMAT_VERSION + 1),
        1,
    );
    assert_ne!(json, bumped);
    let err = from_versioned_json::<ImageParams>(&bumped).unwrap_err();
    assert!(err.to_string().contains("unsupported cache params version"));
}
