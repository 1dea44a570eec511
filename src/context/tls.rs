use crate::context::action::EffectTlsData;
use crate::foundation::core::{TimeValue, ViewIdx};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// Cooperative abort signal supplied by the render scheduling layer.
///
/// The context layer stores it and hands it back; it never interprets
/// or polls it itself.
#[derive(Debug, Default)]
pub struct AbortFlag(AtomicBool);

impl AbortFlag {
    /// A flag in the not-aborted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the render to stop.
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` once [`AbortFlag::abort`] has been called.
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Whole-frame render bundle attached to every thread working on one
/// frame render.
#[derive(Debug)]
pub struct FrameRenderArgs {
    /// Timeline time of the frame render.
    pub time: TimeValue,
    /// View of the frame render.
    pub view: ViewIdx,
    /// Hash of the node tree at render start.
    pub tree_version: u64,
    /// Abort signal for the whole frame render.
    pub abort: Arc<AbortFlag>,
}

/// Per-effect registry handing each rendering thread its own
/// [`EffectTlsData`].
///
/// One holder lives on each effect. A thread gets (or lazily creates)
/// its own instance with [`TlsHolder::get_or_create`]; a spawned
/// worker that must inherit the spawning thread's in-flight context
/// installs a snapshot with [`TlsHolder::adopt_snapshot`].
#[derive(Debug, Default)]
pub struct TlsHolder {
    per_thread: Mutex<HashMap<ThreadId, Arc<EffectTlsData>>>,
}

impl TlsHolder {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ThreadId, Arc<EffectTlsData>>> {
        self.per_thread.lock().expect("TLS registry poisoned")
    }

    /// The calling thread's context, created empty on first use.
    pub fn get_or_create(&self) -> Arc<EffectTlsData> {
        self.lock()
            .entry(thread::current().id())
            .or_insert_with(|| Arc::new(EffectTlsData::new()))
            .clone()
    }

    /// The calling thread's context, or `None` when it has none yet.
    pub fn get(&self) -> Option<Arc<EffectTlsData>> {
        self.lock().get(&thread::current().id()).cloned()
    }

    /// Install a deep copy of `source` (typically another thread's
    /// context) as the calling thread's context.
    pub fn adopt_snapshot(&self, source: &EffectTlsData) -> Arc<EffectTlsData> {
        let copy = Arc::new(source.snapshot());
        self.lock().insert(thread::current().id(), copy.clone());
        copy
    }

    /// Drop the calling thread's context (worker teardown).
    pub fn release_current(&self) {
        self.lock().remove(&thread::current().id());
    }
}
