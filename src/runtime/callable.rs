//! Calling convention shared by bridged host functions and interpreted lambdas.
//!
//! Every call, whether it comes from a script `f(args)` or from the host via
//! [`Value::invoke`], goes through [`call_value`]: probe poll, depth check,
//! argument binding against the callee's contract, then [`Callable::invoke`].

use std::rc::Rc;

use crate::{
    bytecode::bytecode::Bytecode,
    runtime::{
        error::{Error, Result},
        gc::{GcHandle, HeapObject},
        heap::{Heap, HeapCore},
        lambda::{self, Probe},
        native_function::{self, NativeFunction},
        value::{Value, ValueKind},
    },
};

/// Arguments after binding against a contract.
#[derive(Debug, Default, Clone)]
pub struct BoundArgs {
    /// One entry per contract slot, in contract order.
    pub slots: Vec<(String, Value)>,
    /// Positional arguments beyond the last slot.
    pub rest: Vec<Value>,
    /// Named arguments matching no slot, in call order.
    pub extra: Vec<(String, Value)>,
    /// Per slot: whether the call supplied it (rather than the default).
    pub filled: Vec<bool>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots
            .iter()
            .chain(self.extra.iter())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Run conditions of every lambda activation on the current call path,
/// outermost first.
#[derive(Debug, Default, Clone)]
pub struct ProbeChain {
    probes: Vec<Probe>,
}

impl ProbeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain for a nested activation that adds `probe` (if any).
    pub fn extended(&self, probe: Option<&Probe>) -> Self {
        let mut probes = self.probes.clone();
        probes.extend(probe.cloned());
        Self { probes }
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Polls every probe; the first failure aborts.
    pub fn poll(&self) -> std::result::Result<(), String> {
        self.probes.iter().try_for_each(Probe::poll)
    }
}

/// Something a script can call.
pub trait Callable {
    fn name(&self) -> String;

    /// Ordered `(name, default)` parameter slots.
    fn contract(&self) -> &[(String, Value)];

    fn invoke(
        &self,
        heap: &Heap,
        args: BoundArgs,
        probes: &ProbeChain,
    ) -> std::result::Result<Value, String>;
}

/// A wrapped host function together with its contract.
pub(crate) struct NativeCallable {
    pub(crate) function: Rc<NativeFunction>,
    pub(crate) contract: Vec<(String, Value)>,
}

impl Callable for NativeCallable {
    fn name(&self) -> String {
        self.function.name().to_string()
    }

    fn contract(&self) -> &[(String, Value)] {
        &self.contract
    }

    fn invoke(
        &self,
        heap: &Heap,
        args: BoundArgs,
        _probes: &ProbeChain,
    ) -> std::result::Result<Value, String> {
        native_function::invoke_native(heap, &self.function, args)
    }
}

/// A loaded lambda: program, default-argument slots and own run condition.
pub(crate) struct LambdaCallable {
    pub(crate) program: Rc<Bytecode>,
    pub(crate) defaults: Vec<(String, Value)>,
    pub(crate) probe: Option<Probe>,
}

impl Callable for LambdaCallable {
    fn name(&self) -> String {
        "<lambda>".to_string()
    }

    fn contract(&self) -> &[(String, Value)] {
        &self.defaults
    }

    fn invoke(
        &self,
        heap: &Heap,
        args: BoundArgs,
        probes: &ProbeChain,
    ) -> std::result::Result<Value, String> {
        if !args.rest.is_empty() {
            return Err(format!(
                "lambda takes at most {} positional arguments, got {}",
                self.defaults.len(),
                self.defaults.len() + args.rest.len()
            ));
        }
        let frame = lambda::frame_from_bound(&self.program, args);
        if let Some(name) = lambda::first_missing(&self.program, &frame) {
            return Err(Error::binding(name).message());
        }
        let probes = probes.extended(self.probe.as_ref());
        lambda::activate(heap, self.program.clone(), frame, &probes)
    }
}

/// Reads `(name, value)` slots out of a contract or default-args tuple.
///
/// Elements must be named pairs or key-value pairs keyed by a string.
pub(crate) fn contract_slots(contract: &Value) -> Result<Vec<(String, Value)>> {
    if contract.kind() != ValueKind::Tuple {
        return Err(Error::marshal(format!(
            "argument contract must be a Tuple, got {}",
            contract.type_name()
        )));
    }
    let handle = contract.handle();
    let slots = contract.core.with_gc(|gc| {
        let HeapObject::Tuple(elements) = gc.get(handle) else {
            return Err(Error::marshal("argument contract must be a Tuple"));
        };
        let mut slots = Vec::with_capacity(elements.len());
        for element in elements {
            match gc.get(*element) {
                HeapObject::Named { name, value } => slots.push((name.clone(), *value)),
                HeapObject::KeyVal { key, value } => match gc.get(*key) {
                    HeapObject::String(name) => slots.push((name.clone(), *value)),
                    other => {
                        return Err(Error::marshal(format!(
                            "argument names must be Strings, got {}",
                            ValueKind::of(other)
                        )));
                    }
                },
                other => {
                    return Err(Error::marshal(format!(
                        "argument contract entries must be Named or KeyVal, got {}",
                        ValueKind::of(other)
                    )));
                }
            }
        }
        Ok(slots)
    })?;
    Ok(slots
        .into_iter()
        .map(|(name, handle)| (name, contract.sibling(handle)))
        .collect())
}

/// Binds call arguments against `contract`.
///
/// Slots start at their defaults; positional arguments fill them left to
/// right; named pairs replace the slot of the same name. Positional overflow
/// lands in `rest` and unknown names in `extra`.
pub fn bind_arguments(contract: &[(String, Value)], args: Vec<Value>) -> BoundArgs {
    let mut bound = BoundArgs {
        slots: contract.to_vec(),
        filled: vec![false; contract.len()],
        ..BoundArgs::default()
    };
    let mut position = 0;
    for arg in args {
        if arg.kind() == ValueKind::Named {
            let (Ok(name), Ok(value)) = (arg.name(), arg.get_value()) else {
                continue;
            };
            match bound.slots.iter().position(|(n, _)| *n == name) {
                Some(index) => {
                    bound.slots[index].1 = value;
                    bound.filled[index] = true;
                }
                None => match bound.extra.iter_mut().find(|(n, _)| *n == name) {
                    Some(extra) => extra.1 = value,
                    None => bound.extra.push((name, value)),
                },
            }
            continue;
        }
        match bound.slots.get_mut(position) {
            Some(slot) => {
                slot.1 = arg;
                bound.filled[position] = true;
            }
            None => bound.rest.push(arg),
        }
        position += 1;
    }
    bound
}

/// Resolves `callee` to its [`Callable`] implementation.
pub(crate) fn resolve(callee: &Value) -> std::result::Result<Box<dyn Callable>, String> {
    enum Resolved {
        Native(Rc<NativeFunction>, GcHandle),
        Lambda(Rc<Bytecode>, GcHandle, Option<Probe>),
        Unwrapped,
        Unloaded,
        NotCallable(ValueKind),
    }

    let resolved = callee.with_object(|_, object| match object {
        HeapObject::NativeFunction {
            function: Some(function),
            contract: Some(contract),
        } => Resolved::Native(function.clone(), *contract),
        HeapObject::NativeFunction { .. } => Resolved::Unwrapped,
        HeapObject::Lambda {
            program: Some(program),
            defaults: Some(defaults),
            probe,
        } => Resolved::Lambda(program.clone(), *defaults, probe.clone()),
        HeapObject::Lambda { .. } => Resolved::Unloaded,
        other => Resolved::NotCallable(ValueKind::of(other)),
    });

    let slots =
        |handle| contract_slots(&callee.sibling(handle)).map_err(|err| err.message());
    match resolved {
        Resolved::Native(function, contract) => Ok(Box::new(NativeCallable {
            function,
            contract: slots(contract)?,
        })),
        Resolved::Lambda(program, defaults, probe) => Ok(Box::new(LambdaCallable {
            program,
            defaults: slots(defaults)?,
            probe,
        })),
        Resolved::Unwrapped => Err("native function has not been wrapped".to_string()),
        Resolved::Unloaded => Err("lambda is not loaded".to_string()),
        Resolved::NotCallable(kind) => Err(format!("not callable: {}", kind)),
    }
}

/// Tracks nesting of activations on one heap.
pub(crate) struct CallDepthGuard<'a> {
    core: &'a HeapCore,
}

impl<'a> CallDepthGuard<'a> {
    pub(crate) fn enter(core: &'a HeapCore) -> std::result::Result<Self, String> {
        let depth = core.call_depth.get();
        if depth >= core.config.max_call_depth {
            return Err(format!(
                "maximum call depth of {} exceeded",
                core.config.max_call_depth
            ));
        }
        core.call_depth.set(depth + 1);
        Ok(Self { core })
    }
}

impl Drop for CallDepthGuard<'_> {
    fn drop(&mut self) {
        self.core.call_depth.set(self.core.call_depth.get() - 1);
    }
}

/// Calls `callee` with script-style arguments.
pub(crate) fn call_value(
    heap: &Heap,
    callee: &Value,
    args: Vec<Value>,
    probes: &ProbeChain,
) -> std::result::Result<Value, String> {
    probes.poll()?;
    let callable = resolve(callee)?;
    let _depth = CallDepthGuard::enter(&heap.core)?;
    let bound = bind_arguments(callable.contract(), args);
    callable.invoke(heap, bound, probes)
}

impl Value {
    /// Calls a function or lambda value from the host.
    ///
    /// Named-pair arguments bind by name, everything else by position.
    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        let heap = self.heap();
        for arg in args {
            heap.check_owned(arg)?;
        }
        call_value(&heap, self, args.to_vec(), &ProbeChain::new()).map_err(Error::execution)
    }
}
