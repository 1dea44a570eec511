use super::*;
use crate::context::tls::AbortFlag;
use crate::foundation::core::BitDepth;

fn scale() -> RenderScale {
    RenderScale::identity()
}

fn push_render(tls: &EffectTlsData, time: f64) {
    tls.push_render_action_args(
        TimeValue(time),
        ViewIdx(0),
        scale(),
        0,
        RectI::new(0, 0, 64, 64),
        HashMap::new(),
    );
}

#[test]
fn n_pushes_then_n_pops_return_to_empty() {
    let tls = EffectTlsData::new();
    tls.push_action_args("getRegionOfDefinition", TimeValue(1.0), ViewIdx(0), scale());
    push_render(&tls, 1.0);
    tls.push_action_args("getImage", TimeValue(1.0), ViewIdx(0), scale());
    assert_eq!(tls.stack_depth(), 3);
    assert_eq!(tls.action_recursion_level(), 3);
    assert_eq!(tls.render_recursion_level(), 1);

    for _ in 0..3 {
        tls.pop_args().unwrap();
    }
    assert_eq!(tls.stack_depth(), 0);
    assert_eq!(tls.action_recursion_level(), 0);
    assert_eq!(tls.render_recursion_level(), 0);
    assert!(tls.current_action_args().is_none());
}

#[test]
fn pop_on_empty_stack_is_an_error() {
    let tls = EffectTlsData::new();
    let err = tls.pop_args().unwrap_err();
    assert!(err.to_string().contains("empty action stack"));
}

#[test]
fn current_args_track_the_innermost_frame() {
    let tls = EffectTlsData::new();
    tls.push_action_args("getFrameRange", TimeValue(3.0), ViewIdx(2), scale());
    let top = tls.current_action_args().unwrap();
    assert_eq!(top.action, "getFrameRange");
    assert_eq!(top.time, TimeValue(3.0));
    assert_eq!(top.view, ViewIdx(2));
    assert!(tls.current_render_action_args().is_none());

    push_render(&tls, 4.0);
    let top = tls.current_action_args().unwrap();
    assert_eq!(top.action, RENDER_ACTION_NAME);
    assert_eq!(top.time, TimeValue(4.0));
    let render = tls.current_render_action_args().unwrap();
    assert_eq!(render.render_window, RectI::new(0, 0, 64, 64));

    tls.pop_args().unwrap();
    // Back to the outer generic frame; the render accessor fails
    // again.
    assert!(tls.current_render_action_args().is_none());
    assert_eq!(tls.current_action_args().unwrap().action, "getFrameRange");
    tls.pop_args().unwrap();
}

#[test]
fn action_membership_matches_pushed_not_popped() {
    let tls = EffectTlsData::new();
    assert!(!tls.has_action_in_stack("isIdentity"));
    tls.push_action_args("isIdentity", TimeValue(0.0), ViewIdx(0), scale());
    tls.push_action_args("getImage", TimeValue(0.0), ViewIdx(0), scale());

    assert!(tls.is_current_action("getImage"));
    assert!(!tls.is_current_action("isIdentity"));
    assert!(tls.has_action_in_stack("isIdentity"));
    assert!(tls.has_action_in_stack("getImage"));

    tls.pop_args().unwrap();
    assert!(!tls.has_action_in_stack("getImage"));
    assert!(tls.is_current_action("isIdentity"));
    tls.pop_args().unwrap();
    assert!(!tls.has_action_in_stack("isIdentity"));
}

#[test]
fn scopes_pop_on_every_exit_path() {
    let tls = EffectTlsData::new();
    {
        let _outer = tls.enter_action("getComponents", TimeValue(0.0), ViewIdx(0), scale());
        {
            let _inner = tls.enter_render_action(
                TimeValue(0.0),
                ViewIdx(0),
                scale(),
                0,
                RectI::new(0, 0, 8, 8),
                HashMap::new(),
            );
            assert_eq!(tls.stack_depth(), 2);
        }
        assert_eq!(tls.stack_depth(), 1);
    }
    assert_eq!(tls.stack_depth(), 0);
}

#[test]
fn clear_action_stack_resets_everything() {
    let tls = EffectTlsData::new();
    push_render(&tls, 1.0);
    push_render(&tls, 2.0);
    tls.clear_action_stack();
    assert_eq!(tls.stack_depth(), 0);
    assert_eq!(tls.action_recursion_level(), 0);
    assert_eq!(tls.render_recursion_level(), 0);
}

#[test]
fn snapshot_is_deep_and_independent() {
    let tls = EffectTlsData::new();
    tls.push_action_args("getRegionOfDefinition", TimeValue(1.0), ViewIdx(0), scale());
    push_render(&tls, 1.0);
    tls.push_action_args("getImage", TimeValue(1.0), ViewIdx(0), scale());
    tls.set_viewer_texture_index(1);
    let frame_args = Arc::new(FrameRenderArgs {
        time: TimeValue(1.0),
        view: ViewIdx(0),
        tree_version: 11,
        abort: Arc::new(AbortFlag::new()),
    });
    tls.set_frame_render_args(frame_args.clone());

    let copy = tls.snapshot();
    assert_eq!(copy.stack_depth(), 3);
    assert_eq!(copy.action_recursion_level(), 3);
    assert_eq!(copy.render_recursion_level(), 1);
    assert_eq!(copy.viewer_texture_index(), 1);
    // The whole-frame bundle is shared by handle.
    assert!(Arc::ptr_eq(&copy.frame_render_args().unwrap(), &frame_args));

    // Draining the copy leaves the original in-flight state alone.
    copy.clear_action_stack();
    copy.set_viewer_texture_index(0);
    assert_eq!(tls.stack_depth(), 3);
    assert_eq!(tls.viewer_texture_index(), 1);
    assert!(tls.is_current_action("getImage"));
}

#[test]
fn render_frames_carry_output_plane_bindings() {
    let tls = EffectTlsData::new();
    let entry = ImageCacheEntry::new(RectI::new(0, 0, 8, 8), BitDepth::Float, 8, 8, 0).unwrap();
    let mut planes: HashMap<PlaneDesc, PlaneBinding> = HashMap::new();
    planes.insert(PlaneDesc::rgba(), Arc::new(Mutex::new(entry)));

    tls.push_render_action_args(
        TimeValue(0.0),
        ViewIdx(0),
        scale(),
        0,
        RectI::new(0, 0, 8, 8),
        planes,
    );
    let render = tls.current_render_action_args().unwrap();
    let binding = render.output_planes.get(&PlaneDesc::rgba()).unwrap();
    assert_eq!(
        binding.lock().unwrap().bounds(),
        RectI::new(0, 0, 8, 8)
    );
    tls.pop_args().unwrap();
}
