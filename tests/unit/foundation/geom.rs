use super::*;

#[test]
fn empty_and_dimensions() {
    let r = RectI::new(2, 3, 10, 7);
    assert!(!r.is_empty());
    assert_eq!((r.width(), r.height()), (8, 4));
    assert_eq!(r.area(), 32);

    assert!(RectI::new(5, 0, 5, 10).is_empty());
    assert!(RectI::new(6, 0, 5, 10).is_empty());
    assert_eq!(RectI::new(6, 0, 5, 10).width(), 0);
}

#[test]
fn intersect_and_union() {
    let a = RectI::new(0, 0, 10, 10);
    let b = RectI::new(5, 5, 15, 15);
    assert_eq!(a.intersect(b), Some(RectI::new(5, 5, 10, 10)));
    assert_eq!(a.union(b), RectI::new(0, 0, 15, 15));

    let disjoint = RectI::new(20, 20, 30, 30);
    assert_eq!(a.intersect(disjoint), None);
    // Touching edges do not intersect (half-open rects).
    assert_eq!(a.intersect(RectI::new(10, 0, 20, 10)), None);

    let empty = RectI::default();
    assert_eq!(a.intersect(empty), None);
    assert_eq!(a.union(empty), a);
}

#[test]
fn contains_points_and_rects() {
    let r = RectI::new(0, 0, 4, 4);
    assert!(r.contains(0, 0));
    assert!(r.contains(3, 3));
    assert!(!r.contains(4, 0));
    assert!(r.contains_rect(RectI::new(1, 1, 4, 4)));
    assert!(!r.contains_rect(RectI::new(1, 1, 5, 4)));
    assert!(r.contains_rect(RectI::default()));
}

#[test]
fn tile_rounding_contains_the_original() {
    let r = RectI::new(-3, 1, 9, 6);
    let rounded = r.round_to_tile_size(4, 4);
    assert_eq!(rounded, RectI::new(-4, 0, 12, 8));
    assert!(rounded.contains_rect(r));

    // Already aligned rects are unchanged.
    assert_eq!(rounded.round_to_tile_size(4, 4), rounded);
}

#[test]
fn tile_origins_cover_the_rounded_rect() {
    let r = RectI::new(0, 0, 9, 5);
    let origins = r.tile_origins(4, 4);
    assert_eq!(
        origins,
        vec![(0, 0), (4, 0), (8, 0), (0, 4), (4, 4), (8, 4)]
    );
    assert!(RectI::default().tile_origins(4, 4).is_empty());
}

#[test]
fn po2_downscale_encloses_and_upscale_inverts() {
    let r = RectI::new(1, 3, 9, 5);
    let down = r.downscale_po2(1);
    assert_eq!(down, RectI::new(0, 1, 5, 3));
    assert!(down.upscale_po2(1).contains_rect(r));
    assert_eq!(r.downscale_po2(0), r);
}

#[test]
fn canonical_round_trip_contains_the_original() {
    let rod = Rect::new(10.3, -4.7, 220.9, 101.2);
    let scale = RenderScale::new(0.5, 0.5).unwrap();
    let par = 2.0;

    let px = canonical_to_pixel_enclosing(rod, scale, par, 1).unwrap();
    let back = px.to_canonical(scale, par, 1);
    assert!(back.x0 <= rod.x0 && back.y0 <= rod.y0);
    assert!(back.x1 >= rod.x1 && back.y1 >= rod.y1);
}

#[test]
fn canonical_to_pixel_applies_par_to_x_only() {
    let rod = Rect::new(0.0, 0.0, 100.0, 100.0);
    let px = canonical_to_pixel_enclosing(rod, RenderScale::identity(), 2.0, 0).unwrap();
    assert_eq!(px, RectI::new(0, 0, 50, 100));

    assert!(canonical_to_pixel_enclosing(rod, RenderScale::identity(), 0.0, 0).is_err());
}
