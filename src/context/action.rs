use crate::cache::entry::ImageCacheEntry;
use crate::cache::params::PlaneDesc;
use crate::context::tls::FrameRenderArgs;
use crate::foundation::core::{RenderScale, TimeValue, ViewIdx};
use crate::foundation::error::{FramevaultError, FramevaultResult};
use crate::foundation::geom::RectI;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Action name carried by render-action frames.
pub const RENDER_ACTION_NAME: &str = "render";

/// Binding from a plane descriptor to the in-flight output image the
/// render action writes into.
pub type PlaneBinding = Arc<Mutex<ImageCacheEntry>>;

/// Arguments of a generic (non-render) action.
#[derive(Clone, Debug)]
pub struct GenericActionArgs {
    /// Action name as handed to the plugin layer.
    pub action: String,
    /// Timeline time the action runs at.
    pub time: TimeValue,
    /// View the action runs for.
    pub view: ViewIdx,
    /// Proxy render scale of the action.
    pub scale: RenderScale,
}

/// Arguments of a render action.
#[derive(Clone, Debug)]
pub struct RenderActionArgs {
    /// Timeline time being rendered.
    pub time: TimeValue,
    /// View being rendered.
    pub view: ViewIdx,
    /// Proxy render scale of the render.
    pub scale: RenderScale,
    /// Mip level being rendered.
    pub mip_level: u32,
    /// Pixel window the render must produce.
    pub render_window: RectI,
    /// Output image for each rendered plane.
    pub output_planes: HashMap<PlaneDesc, PlaneBinding>,
}

/// One frame of the action stack.
///
/// A tagged union rather than a class hierarchy: the accessors match
/// exhaustively and a snapshot is a plain value copy.
#[derive(Clone, Debug)]
pub enum ActionFrame {
    /// A generic action (get RoD, get frame range, ...).
    Generic(GenericActionArgs),
    /// The render action, with its output bindings.
    Render(RenderActionArgs),
}

impl ActionFrame {
    /// The action name this frame runs under.
    pub fn action_name(&self) -> &str {
        match self {
            ActionFrame::Generic(a) => &a.action,
            ActionFrame::Render(_) => RENDER_ACTION_NAME,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct TlsState {
    stack: Vec<ActionFrame>,
    action_recursion: u32,
    render_recursion: u32,
    frame_args: Option<Arc<FrameRenderArgs>>,
    viewer_texture_index: u32,
}

/// Per-thread, per-effect context of the currently executing actions.
///
/// Logically owned by one rendering thread; the mutex exists so
/// another thread can take a consistent [`EffectTlsData::snapshot`]
/// of in-flight state when spawning a worker, and is uncontended for
/// the owner. Pushes and pops must pair on every exit path, which
/// callers normally get from [`EffectTlsData::enter_action`] /
/// [`EffectTlsData::enter_render_action`] scopes.
#[derive(Debug, Default)]
pub struct EffectTlsData {
    state: Mutex<TlsState>,
}

impl EffectTlsData {
    /// Empty context (no action running).
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TlsState> {
        self.state.lock().expect("effect TLS poisoned")
    }

    /// Push a generic action frame. Legal at any depth; recursive
    /// plugin callbacks push on top of the caller's frame.
    pub fn push_action_args(
        &self,
        action: impl Into<String>,
        time: TimeValue,
        view: ViewIdx,
        scale: RenderScale,
    ) {
        let mut st = self.lock();
        st.stack.push(ActionFrame::Generic(GenericActionArgs {
            action: action.into(),
            time,
            view,
            scale,
        }));
        st.action_recursion += 1;
    }

    /// Push a render action frame, bumping the begin/end-render
    /// counter in addition to the action counter.
    pub fn push_render_action_args(
        &self,
        time: TimeValue,
        view: ViewIdx,
        scale: RenderScale,
        mip_level: u32,
        render_window: RectI,
        output_planes: HashMap<PlaneDesc, PlaneBinding>,
    ) {
        let mut st = self.lock();
        st.stack.push(ActionFrame::Render(RenderActionArgs {
            time,
            view,
            scale,
            mip_level,
            render_window,
            output_planes,
        }));
        st.action_recursion += 1;
        st.render_recursion += 1;
    }

    /// Pop exactly one frame, in LIFO order with its push.
    pub fn pop_args(&self) -> FramevaultResult<()> {
        let mut st = self.lock();
        let frame = st
            .stack
            .pop()
            .ok_or_else(|| FramevaultError::context("pop on an empty action stack"))?;
        st.action_recursion = st.action_recursion.saturating_sub(1);
        if matches!(frame, ActionFrame::Render(_)) {
            st.render_recursion = st.render_recursion.saturating_sub(1);
        }
        Ok(())
    }

    /// Push a generic frame and pop it when the scope drops.
    pub fn enter_action(
        &self,
        action: impl Into<String>,
        time: TimeValue,
        view: ViewIdx,
        scale: RenderScale,
    ) -> ActionScope<'_> {
        self.push_action_args(action, time, view, scale);
        ActionScope { tls: self }
    }

    /// Push a render frame and pop it when the scope drops.
    pub fn enter_render_action(
        &self,
        time: TimeValue,
        view: ViewIdx,
        scale: RenderScale,
        mip_level: u32,
        render_window: RectI,
        output_planes: HashMap<PlaneDesc, PlaneBinding>,
    ) -> ActionScope<'_> {
        self.push_render_action_args(time, view, scale, mip_level, render_window, output_planes);
        ActionScope { tls: self }
    }

    /// Name, time, view and scale of the innermost action, or `None`
    /// on an empty stack. Render frames answer as the render action.
    pub fn current_action_args(&self) -> Option<GenericActionArgs> {
        let st = self.lock();
        st.stack.last().map(|frame| match frame {
            ActionFrame::Generic(a) => a.clone(),
            ActionFrame::Render(r) => GenericActionArgs {
                action: RENDER_ACTION_NAME.to_string(),
                time: r.time,
                view: r.view,
                scale: r.scale,
            },
        })
    }

    /// The innermost frame's render arguments, or `None` when the
    /// stack is empty or the innermost frame is not a render frame.
    pub fn current_render_action_args(&self) -> Option<RenderActionArgs> {
        let st = self.lock();
        match st.stack.last() {
            Some(ActionFrame::Render(r)) => Some(r.clone()),
            _ => None,
        }
    }

    /// `true` when the innermost action is `action`.
    pub fn is_current_action(&self, action: &str) -> bool {
        let st = self.lock();
        st.stack
            .last()
            .is_some_and(|f| f.action_name() == action)
    }

    /// `true` when `action` is anywhere in the stack (pushed and not
    /// yet popped). Used to detect illegal recursion into an action.
    pub fn has_action_in_stack(&self, action: &str) -> bool {
        let st = self.lock();
        st.stack.iter().any(|f| f.action_name() == action)
    }

    /// Number of frames currently on the stack.
    pub fn stack_depth(&self) -> usize {
        self.lock().stack.len()
    }

    /// Depth of nested actions (every push counts).
    pub fn action_recursion_level(&self) -> u32 {
        self.lock().action_recursion
    }

    /// Depth of nested render actions only.
    pub fn render_recursion_level(&self) -> u32 {
        self.lock().render_recursion
    }

    /// Hard reset for error recovery: drops every frame and zeroes
    /// both recursion counters.
    pub fn clear_action_stack(&self) {
        let mut st = self.lock();
        st.stack.clear();
        st.action_recursion = 0;
        st.render_recursion = 0;
    }

    /// Attach the whole-frame render bundle for the duration of a
    /// frame render.
    pub fn set_frame_render_args(&self, args: Arc<FrameRenderArgs>) {
        self.lock().frame_args = Some(args);
    }

    /// Detach the whole-frame render bundle.
    pub fn clear_frame_render_args(&self) {
        self.lock().frame_args = None;
    }

    /// The whole-frame render bundle, if a frame render is active.
    pub fn frame_render_args(&self) -> Option<Arc<FrameRenderArgs>> {
        self.lock().frame_args.clone()
    }

    /// Viewer texture index the current render draws into.
    pub fn viewer_texture_index(&self) -> u32 {
        self.lock().viewer_texture_index
    }

    /// Set the viewer texture index.
    pub fn set_viewer_texture_index(&self, index: u32) {
        self.lock().viewer_texture_index = index;
    }

    /// Deep, independent copy of the in-flight state, taken under the
    /// source's lock. The new instance is unshared, so the copy itself
    /// needs no destination lock; mutating either side afterwards
    /// never affects the other (frames are plain values; the frame
    /// args bundle is intentionally shared by handle).
    pub fn snapshot(&self) -> EffectTlsData {
        let st = self.lock();
        EffectTlsData {
            state: Mutex::new(st.clone()),
        }
    }
}

/// Scope guard pairing one push with one pop on every exit path.
#[must_use = "dropping the scope immediately pops the action frame"]
pub struct ActionScope<'a> {
    tls: &'a EffectTlsData,
}

impl Drop for ActionScope<'_> {
    fn drop(&mut self) {
        let popped = self.tls.pop_args();
        debug_assert!(popped.is_ok(), "action stack underflow on scope exit");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/context/action.rs"]
mod tests;
