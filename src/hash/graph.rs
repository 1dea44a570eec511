use crate::foundation::core::{TimeValue, ViewIdx};
use crate::foundation::error::{FramevaultError, FramevaultResult};
use crate::hash::hasher::Hash64;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Times closer than this collapse into one hash-cache bucket. The
/// same rounding is applied on the store and lookup paths.
const TIME_HASH_EPSILON: f64 = 1e-6;

fn time_bucket(time: TimeValue) -> i64 {
    (time.0 / TIME_HASH_EPSILON).round() as i64
}

/// Arguments identifying one hash computation.
#[derive(Clone, Copy, Debug)]
pub struct HashArgs {
    /// Timeline time the hash is computed for.
    pub time: TimeValue,
    /// View the hash is computed for.
    pub view: ViewIdx,
}

/// Extension point through which an object (node, knob) contributes
/// its content-identifying fields to a hash computation.
///
/// Implementations may recurse into the graph for *other* slots (an
/// effect hashing its inputs); recursing into the slot currently being
/// computed deadlocks, which the acyclic parent topology rules out.
pub trait HashSource {
    /// Append every field that affects the rendered content at
    /// `args.time`/`args.view`.
    fn append_to_hash(&self, args: &HashArgs, hash: &mut Hash64);
}

/// Handle to one object's record in a [`HashGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HashSlot(u32);

#[derive(Default)]
struct SlotRecord {
    hashes: Mutex<HashMap<(i64, ViewIdx), u64>>,
}

struct SlotEntry {
    parent: Option<HashSlot>,
    record: Arc<SlotRecord>,
}

/// Arena of per-object hash caches.
///
/// Each registered slot owns a mutex-protected `(time, view) -> hash`
/// map and an optional parent handle used purely for invalidation
/// propagation (a knob's parent is the node holding it). Parent links
/// live in the arena and are guarded by the arena lock alone, so the
/// cycle check at mutation time never touches a slot mutex and
/// recursive invalidation always terminates.
#[derive(Default)]
pub struct HashGraph {
    slots: RwLock<Vec<SlotEntry>>,
}

impl HashGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new object and return its handle.
    pub fn register(&self) -> HashSlot {
        let mut slots = self.slots.write().expect("hash graph arena poisoned");
        let id = slots.len() as u32;
        slots.push(SlotEntry {
            parent: None,
            record: Arc::new(SlotRecord::default()),
        });
        HashSlot(id)
    }

    fn unknown_slot(slot: HashSlot) -> FramevaultError {
        FramevaultError::hash_graph(format!("unknown slot {}", slot.0))
    }

    fn record(&self, slot: HashSlot) -> FramevaultResult<Arc<SlotRecord>> {
        let slots = self.slots.read().expect("hash graph arena poisoned");
        slots
            .get(slot.0 as usize)
            .map(|e| e.record.clone())
            .ok_or_else(|| Self::unknown_slot(slot))
    }

    /// The slot's parent handle, if any.
    pub fn hash_parent(&self, slot: HashSlot) -> FramevaultResult<Option<HashSlot>> {
        let slots = self.slots.read().expect("hash graph arena poisoned");
        slots
            .get(slot.0 as usize)
            .map(|e| e.parent)
            .ok_or_else(|| Self::unknown_slot(slot))
    }

    /// Set or clear the slot's parent.
    ///
    /// The parent is a non-owning back-reference; it never extends the
    /// parent's lifetime and many children may share one parent. A
    /// parent assignment that would close a cycle is rejected, keeping
    /// recursive invalidation terminating by construction.
    pub fn set_hash_parent(
        &self,
        slot: HashSlot,
        parent: Option<HashSlot>,
    ) -> FramevaultResult<()> {
        // The arena write lock serializes topology mutations so two
        // concurrent assignments cannot weave a cycle past the check.
        let mut slots = self.slots.write().expect("hash graph arena poisoned");
        if slots.get(slot.0 as usize).is_none() {
            return Err(Self::unknown_slot(slot));
        }
        let mut cursor = parent;
        while let Some(p) = cursor {
            if p == slot {
                return Err(FramevaultError::hash_graph(format!(
                    "parent assignment on slot {} would create a cycle",
                    slot.0
                )));
            }
            cursor = slots
                .get(p.0 as usize)
                .ok_or_else(|| Self::unknown_slot(p))?
                .parent;
        }
        slots[slot.0 as usize].parent = parent;
        Ok(())
    }

    /// Lock-protected lookup of a previously computed hash.
    ///
    /// `args.time` is rounded to a fixed epsilon before the lookup,
    /// identically to the store path in [`HashGraph::compute_hash`].
    pub fn find_cached_hash(
        &self,
        slot: HashSlot,
        args: &HashArgs,
    ) -> FramevaultResult<Option<u64>> {
        let rec = self.record(slot)?;
        let hashes = rec.hashes.lock().expect("hash slot poisoned");
        Ok(hashes.get(&(time_bucket(args.time), args.view)).copied())
    }

    /// Find-or-compute-and-store under one critical section.
    ///
    /// On a miss the `source` hook contributes the object's domain
    /// fields, then the cache appends its own contribution (the time
    /// bucket and view) and finalizes. Concurrent calls for the same
    /// `(slot, time, view)` converge to one stored value. The returned
    /// hash is never 0.
    #[tracing::instrument(level = "trace", skip(self, source))]
    pub fn compute_hash(
        &self,
        slot: HashSlot,
        args: &HashArgs,
        source: &dyn HashSource,
    ) -> FramevaultResult<u64> {
        let rec = self.record(slot)?;
        let mut hashes = rec.hashes.lock().expect("hash slot poisoned");
        let bucket = (time_bucket(args.time), args.view);
        if let Some(&h) = hashes.get(&bucket) {
            return Ok(h);
        }
        let mut hash = Hash64::new();
        source.append_to_hash(args, &mut hash);
        hash.append_i64(bucket.0);
        hash.append_u32(args.view.0);
        let value = hash.finish();
        debug_assert_ne!(value, 0);
        hashes.insert(bucket, value);
        tracing::trace!(hash = value, "computed node hash");
        Ok(value)
    }

    /// Clear the slot's whole `(time, view)` map, then - unless
    /// `invalidate_parent` is `false` - every ancestor's, walking up
    /// the parent chain unconditionally.
    pub fn invalidate_hash_cache(
        &self,
        slot: HashSlot,
        invalidate_parent: bool,
    ) -> FramevaultResult<()> {
        let mut cursor = Some(slot);
        let mut first = true;
        while let Some(s) = cursor {
            let (record, parent) = {
                let slots = self.slots.read().expect("hash graph arena poisoned");
                let entry = slots
                    .get(s.0 as usize)
                    .ok_or_else(|| Self::unknown_slot(s))?;
                (entry.record.clone(), entry.parent)
            };
            record.hashes.lock().expect("hash slot poisoned").clear();
            if first && !invalidate_parent {
                break;
            }
            first = false;
            cursor = parent;
        }
        Ok(())
    }
}
