use std::rc::Rc;

use crate::{
    bytecode::bytecode::Bytecode,
    runtime::{
        gc::{gc_handle::GcHandle, heap_entry::HeapEntry, heap_object::HeapObject},
        lambda::Probe,
        leak_detector,
        native_function::NativeFunction,
    },
};

pub(crate) const DEFAULT_GC_THRESHOLD: usize = 10_000;
pub(crate) const MIN_GC_THRESHOLD: usize = 1024;

/// Reference-counted heap with a stop-the-world cycle collector.
///
/// Every value lives in a slot of `entries`. Dropping the last strong
/// reference to an acyclic value frees it (and any children that become
/// unreferenced) on the spot. Cycles keep each other's counts above zero and
/// are reclaimed by [`GcHeap::collect`], which marks from the entries that
/// still have host handles and sweeps everything else.
#[derive(Debug)]
pub struct GcHeap {
    entries: Vec<Option<HeapEntry>>,
    free_list: Vec<u32>,
    live: usize,
    allocation_count: usize,
    gc_threshold: usize,
    gc_enabled: bool,
    total_collections: usize,
    total_allocations: usize,
}

impl Default for GcHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl GcHeap {
    /// Creates a new GC heap with default collection settings.
    ///
    /// Defaults:
    /// - threshold: `10_000` allocations
    /// - automatic collection: `true`
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            allocation_count: 0,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            gc_enabled: true,
            total_collections: 0,
            total_allocations: 0,
        }
    }

    /// Creates a new heap with a custom automatic-collection threshold.
    ///
    /// Unlike [`Self::set_threshold`], this does not clamp to `MIN_GC_THRESHOLD`.
    pub fn with_threshold(threshold: usize) -> Self {
        let mut heap = Self::new();
        heap.gc_threshold = threshold;
        heap
    }

    /// Enables or disables automatic collection before allocations.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.gc_enabled = enabled
    }

    /// Sets the allocation threshold that triggers automatic collection.
    ///
    /// Values below `MIN_GC_THRESHOLD` are clamped upward.
    pub fn set_threshold(&mut self, threshold: usize) {
        self.gc_threshold = threshold.max(MIN_GC_THRESHOLD)
    }

    pub fn threshold(&self) -> usize {
        self.gc_threshold
    }

    /// Returns `true` when automatic collection is on and the threshold was reached.
    pub fn should_collect(&self) -> bool {
        self.gc_enabled && self.allocation_count >= self.gc_threshold
    }

    /// Allocates a new object and returns a handle holding one external reference.
    ///
    /// Every child handle inside `object` gains a reference. The caller must
    /// eventually balance the returned reference with [`Self::release`].
    pub fn alloc(&mut self, object: HeapObject) -> GcHandle {
        if self.should_collect() {
            self.collect();
        }

        leak_detector::record_gc_alloc();
        self.allocation_count += 1;
        self.total_allocations += 1;

        for child in object.children() {
            self.inc_ref(child);
        }

        let mut entry = HeapEntry::new(object);
        entry.ref_count = 1;
        entry.external = 1;
        self.live += 1;

        if let Some(idx) = self.free_list.pop() {
            self.entries[idx as usize] = Some(entry);
            GcHandle(idx)
        } else {
            let idx = self.entries.len() as u32;
            self.entries.push(Some(entry));
            GcHandle(idx)
        }
    }

    /// Returns an immutable reference to a live object by handle.
    ///
    /// Panics if the handle points to a free slot or is out of bounds. Handles
    /// reachable from a counted reference are always live.
    pub fn get(&self, handle: GcHandle) -> &HeapObject {
        &self.entries[handle.slot()]
            .as_ref()
            .expect("GcHeap::get: invalid or free handle")
            .object
    }

    pub fn try_get(&self, handle: GcHandle) -> Option<&HeapObject> {
        self.entries
            .get(handle.slot())
            .and_then(Option::as_ref)
            .map(|entry| &entry.object)
    }

    fn get_mut(&mut self, handle: GcHandle) -> Option<&mut HeapObject> {
        self.entries
            .get_mut(handle.slot())
            .and_then(Option::as_mut)
            .map(|entry| &mut entry.object)
    }

    pub fn contains(&self, handle: GcHandle) -> bool {
        self.try_get(handle).is_some()
    }

    /// Returns `(ref_count, external)` for a live handle.
    pub fn counts(&self, handle: GcHandle) -> Option<(u32, u32)> {
        self.entries
            .get(handle.slot())
            .and_then(Option::as_ref)
            .map(|entry| (entry.ref_count, entry.external))
    }

    /// Adds one external (host-held) reference.
    pub fn retain(&mut self, handle: GcHandle) {
        if let Some(entry) = self.entries.get_mut(handle.slot()).and_then(Option::as_mut) {
            entry.ref_count += 1;
            entry.external += 1;
        }
    }

    /// Drops one external reference, freeing the object if nothing else holds it.
    pub fn release(&mut self, handle: GcHandle) {
        if let Some(entry) = self.entries.get_mut(handle.slot()).and_then(Option::as_mut) {
            entry.external = entry.external.saturating_sub(1);
        }
        self.dec_ref(handle);
    }

    fn inc_ref(&mut self, handle: GcHandle) {
        if let Some(entry) = self.entries.get_mut(handle.slot()).and_then(Option::as_mut) {
            entry.ref_count += 1;
        }
    }

    fn dec_ref(&mut self, handle: GcHandle) {
        let mut worklist = vec![handle];

        while let Some(handle) = worklist.pop() {
            let idx = handle.slot();
            let Some(entry) = self.entries.get_mut(idx).and_then(Option::as_mut) else {
                continue;
            };
            entry.ref_count = entry.ref_count.saturating_sub(1);
            if entry.ref_count > 0 {
                continue;
            }

            if let Some(dead) = self.entries[idx].take() {
                dead.object.push_children(&mut worklist);
                self.free_list.push(idx as u32);
                self.live -= 1;
                leak_detector::record_eager_free();
            }
        }
    }

    /// Replaces the key slot of a key-value pair.
    pub fn set_key(&mut self, pair: GcHandle, key: GcHandle) -> Result<(), String> {
        self.inc_ref(key);
        let old = match self.get_mut(pair) {
            Some(HeapObject::KeyVal { key: slot, .. }) => std::mem::replace(slot, key),
            _ => {
                self.dec_ref(key);
                return Err("set_key: expected a key-value pair".to_string());
            }
        };
        self.dec_ref(old);
        Ok(())
    }

    /// Replaces the value slot of a key-value pair, named pair or wrapper.
    pub fn set_value(&mut self, pair: GcHandle, value: GcHandle) -> Result<(), String> {
        self.inc_ref(value);
        let old = match self.get_mut(pair) {
            Some(HeapObject::KeyVal { value: slot, .. })
            | Some(HeapObject::Named { value: slot, .. })
            | Some(HeapObject::Wrapper { value: slot }) => std::mem::replace(slot, value),
            _ => {
                self.dec_ref(value);
                return Err(
                    "set_value: expected a key-value pair, named pair or wrapper".to_string(),
                );
            }
        };
        self.dec_ref(old);
        Ok(())
    }

    /// Renames a named pair.
    pub fn set_name(&mut self, pair: GcHandle, name: String) -> Result<(), String> {
        match self.get_mut(pair) {
            Some(HeapObject::Named { name: slot, .. }) => {
                *slot = name;
                Ok(())
            }
            _ => Err("set_name: expected a named pair".to_string()),
        }
    }

    /// Installs a host callable and its parameter contract on a native-function slot.
    pub(crate) fn set_native(
        &mut self,
        handle: GcHandle,
        native: Rc<NativeFunction>,
        new_contract: GcHandle,
    ) -> Result<(), String> {
        self.inc_ref(new_contract);
        let old = match self.get_mut(handle) {
            Some(HeapObject::NativeFunction { function, contract }) => {
                *function = Some(native);
                contract.replace(new_contract)
            }
            _ => {
                self.dec_ref(new_contract);
                return Err("wrap: expected a native function".to_string());
            }
        };
        if let Some(old) = old {
            self.dec_ref(old);
        }
        Ok(())
    }

    /// Installs a compiled program, its default arguments and probe on a lambda slot.
    pub(crate) fn set_program(
        &mut self,
        handle: GcHandle,
        new_program: Rc<Bytecode>,
        new_defaults: GcHandle,
        new_probe: Option<Probe>,
    ) -> Result<(), String> {
        self.inc_ref(new_defaults);
        let old = match self.get_mut(handle) {
            Some(HeapObject::Lambda {
                program,
                defaults,
                probe,
            }) => {
                *program = Some(new_program);
                *probe = new_probe;
                defaults.replace(new_defaults)
            }
            _ => {
                self.dec_ref(new_defaults);
                return Err("load: expected a lambda".to_string());
            }
        };
        if let Some(old) = old {
            self.dec_ref(old);
        }
        Ok(())
    }

    /// Returns the number of currently live heap entries.
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Returns the total number of allocations performed by this heap.
    pub fn total_allocations(&self) -> usize {
        self.total_allocations
    }

    /// Returns the total number of completed collection passes.
    pub fn total_collections(&self) -> usize {
        self.total_collections
    }

    /// Runs a full stop-the-world mark-and-sweep pass and returns how many
    /// entries were freed.
    ///
    /// The root set is every entry with at least one external reference.
    pub fn collect(&mut self) -> usize {
        let live_before = self.live;

        let mut worklist = Vec::with_capacity(16);
        for (idx, slot) in self.entries.iter().enumerate() {
            if slot.as_ref().is_some_and(HeapEntry::is_root) {
                worklist.push(GcHandle(idx as u32));
            }
        }
        while let Some(handle) = worklist.pop() {
            self.mark_handle(handle, &mut worklist);
        }

        let collected = self.sweep();

        self.total_collections += 1;
        self.allocation_count = 0;
        leak_detector::record_collection(collected);
        tracing::debug!(collected, live = self.live, "gc collect");

        self.adapt_threshold(collected, live_before);
        collected
    }

    fn mark_handle(&mut self, handle: GcHandle, worklist: &mut Vec<GcHandle>) {
        let idx = handle.slot();

        // Mark first so cycles/shared nodes are visited once.
        if let Some(entry) = self.entries.get_mut(idx).and_then(Option::as_mut) {
            if entry.marked {
                return;
            }
            entry.marked = true;
            entry.object.push_children(worklist);
        }
    }

    fn sweep(&mut self) -> usize {
        let mut dead = Vec::new();
        for (idx, slot) in self.entries.iter().enumerate() {
            if let Some(entry) = slot {
                if !entry.marked {
                    dead.push(idx);
                }
            }
        }

        // Edges from swept entries into survivors no longer count.
        let mut children = Vec::new();
        for &idx in &dead {
            children.clear();
            if let Some(entry) = &self.entries[idx] {
                entry.object.push_children(&mut children);
            }
            for child in &children {
                if let Some(child) = self
                    .entries
                    .get_mut(child.slot())
                    .and_then(Option::as_mut)
                {
                    if child.marked {
                        child.ref_count = child.ref_count.saturating_sub(1);
                    }
                }
            }
        }

        for &idx in &dead {
            self.entries[idx] = None;
            self.free_list.push(idx as u32);
        }
        for entry in self.entries.iter_mut().flatten() {
            entry.marked = false;
        }

        self.live -= dead.len();
        dead.len()
    }

    fn adapt_threshold(&mut self, collected: usize, total_before: usize) {
        if total_before == 0 {
            return;
        }

        let ratio = collected as f64 / total_before as f64;
        if ratio < 0.25 {
            self.gc_threshold = (self.gc_threshold * 2).min(1_000_000);
        } else if ratio > 0.75 {
            self.gc_threshold = (self.gc_threshold / 2).max(MIN_GC_THRESHOLD)
        }
    }
}
