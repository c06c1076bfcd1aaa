use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    bytecode::program_cache::ProgramCache,
    runtime::{
        config::RuntimeConfig,
        error::{Error, Result},
        gc::{GcHandle, GcHeap, HeapObject},
        value::Value,
    },
};

/// Shared state behind a [`Heap`] and every [`Value`] minted from it.
pub(crate) struct HeapCore {
    gc: RefCell<GcHeap>,
    /// Handles whose host reference was dropped while `gc` was borrowed.
    pending_release: RefCell<Vec<GcHandle>>,
    pub(crate) config: RuntimeConfig,
    pub(crate) call_depth: Cell<usize>,
    pub(crate) programs: RefCell<ProgramCache>,
}

impl HeapCore {
    /// Runs `f` with exclusive access to the GC heap.
    ///
    /// Deferred releases are applied first. `f` must not call back into the
    /// heap.
    pub(crate) fn with_gc<R>(&self, f: impl FnOnce(&mut GcHeap) -> R) -> R {
        let mut gc = self.gc.borrow_mut();
        self.drain_pending(&mut gc);
        f(&mut gc)
    }

    fn drain_pending(&self, gc: &mut GcHeap) {
        loop {
            let pending = std::mem::take(&mut *self.pending_release.borrow_mut());
            if pending.is_empty() {
                break;
            }
            for handle in pending {
                gc.release(handle);
            }
        }
    }

    pub(crate) fn retain(&self, handle: GcHandle) {
        self.with_gc(|gc| gc.retain(handle));
    }

    /// Drops one host reference. Safe to call while the heap is borrowed.
    pub(crate) fn release(&self, handle: GcHandle) {
        match self.gc.try_borrow_mut() {
            Ok(mut gc) => {
                gc.release(handle);
                self.drain_pending(&mut gc);
            }
            Err(_) => self.pending_release.borrow_mut().push(handle),
        }
    }
}

/// Owner of every runtime value (the `GCSystem`).
///
/// Cloning a `Heap` is cheap and yields another handle to the same heap.
/// A heap and its values are confined to the thread that created them.
#[derive(Clone)]
pub struct Heap {
    pub(crate) core: Rc<HeapCore>,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("object_count", &self.object_count())
            .field("config", &self.core.config)
            .finish()
    }
}

impl Heap {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut gc = GcHeap::new();
        gc.set_threshold(config.effective_gc_threshold());
        gc.set_enabled(config.auto_collect);

        Self {
            core: Rc::new(HeapCore {
                gc: RefCell::new(gc),
                pending_release: RefCell::new(Vec::new()),
                config,
                call_depth: Cell::new(0),
                programs: RefCell::new(ProgramCache::new()),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.core.config
    }

    pub(crate) fn alloc(&self, object: HeapObject) -> Value {
        let handle = self.core.with_gc(|gc| gc.alloc(object));
        Value::from_retained(self.core.clone(), handle)
    }

    /// Returns `true` when `value` was minted by this heap.
    pub fn owns(&self, value: &Value) -> bool {
        Rc::ptr_eq(&self.core, &value.core)
    }

    pub(crate) fn check_owned(&self, value: &Value) -> Result<GcHandle> {
        if self.owns(value) {
            Ok(value.handle())
        } else {
            Err(Error::marshal("value belongs to a different heap"))
        }
    }

    pub fn new_int(&self, value: i64) -> Value {
        self.alloc(HeapObject::Integer(value))
    }

    pub fn new_float(&self, value: f64) -> Value {
        self.alloc(HeapObject::Float(value))
    }

    pub fn new_bool(&self, value: bool) -> Value {
        self.alloc(HeapObject::Boolean(value))
    }

    pub fn new_string(&self, value: impl Into<String>) -> Value {
        self.alloc(HeapObject::String(value.into()))
    }

    pub fn new_bytes(&self, value: impl Into<Vec<u8>>) -> Value {
        self.alloc(HeapObject::Bytes(value.into()))
    }

    pub fn new_null(&self) -> Value {
        self.alloc(HeapObject::Null)
    }

    pub fn new_keyval(&self, key: &Value, value: &Value) -> Result<Value> {
        let key = self.check_owned(key)?;
        let value = self.check_owned(value)?;
        Ok(self.alloc(HeapObject::KeyVal { key, value }))
    }

    pub fn new_named(&self, name: impl Into<String>, value: &Value) -> Result<Value> {
        let value = self.check_owned(value)?;
        Ok(self.alloc(HeapObject::Named {
            name: name.into(),
            value,
        }))
    }

    /// Boxes `value` in a wrapper whose slot can be replaced with `set_value`.
    pub fn new_wrapper(&self, value: &Value) -> Result<Value> {
        let value = self.check_owned(value)?;
        Ok(self.alloc(HeapObject::Wrapper { value }))
    }

    /// Builds a named pair whose name is given as a string value.
    pub fn new_named_value(&self, name: &Value, value: &Value) -> Result<Value> {
        self.check_owned(name)?;
        let name = name.as_string().ok_or_else(|| {
            Error::marshal(format!(
                "named pair name must be a String, got {}",
                name.kind()
            ))
        })?;
        self.new_named(name, value)
    }

    pub fn new_tuple(&self, elements: &[Value]) -> Result<Value> {
        let handles = elements
            .iter()
            .map(|element| self.check_owned(element))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.alloc(HeapObject::Tuple(handles)))
    }

    pub fn new_range(&self, start: i64, end: i64, step: i64) -> Result<Value> {
        if step == 0 {
            return Err(Error::marshal("range step must not be zero"));
        }
        Ok(self.alloc(HeapObject::Range { start, end, step }))
    }

    /// Creates an unloaded lambda; see [`crate::runtime::lambda::Lambda::load`].
    pub fn new_lambda(&self) -> Value {
        self.alloc(HeapObject::Lambda {
            program: None,
            defaults: None,
            probe: None,
        })
    }

    /// Creates an unwrapped native-function slot; see [`Value::wrap`].
    pub fn new_native_function(&self) -> Value {
        self.alloc(HeapObject::NativeFunction {
            function: None,
            contract: None,
        })
    }

    /// Number of live values, including unreachable cycles not yet collected.
    pub fn object_count(&self) -> usize {
        self.core.with_gc(|gc| gc.live_count())
    }

    /// Runs a full collection pass and returns how many values were freed.
    pub fn collect(&self) -> usize {
        self.core.with_gc(|gc| gc.collect())
    }

    pub fn total_collections(&self) -> usize {
        self.core.with_gc(|gc| gc.total_collections())
    }
}
