//! The evaluator: a lambda value holding a compiled program, its default
//! arguments and an optional run condition.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{
    bytecode::{
        bytecode::Bytecode,
        compiler::compile_source,
        program_cache::{hash_bytes, to_hex},
    },
    runtime::{
        callable::{BoundArgs, CallDepthGuard, ProbeChain, contract_slots},
        error::{Error, Result},
        gc::HeapObject,
        heap::{Heap, HeapCore},
        host::HostValue,
        value::{Value, ValueKind},
        vm::VM,
    },
};

/// Host probe polled while a lambda runs. Returning `Err` aborts the run.
pub type RunCondition = Box<dyn FnMut() -> std::result::Result<(), String>>;

/// Shared handle to a lambda's [`RunCondition`].
#[derive(Clone)]
pub struct Probe(Rc<RefCell<RunCondition>>);

impl Probe {
    pub fn new(condition: RunCondition) -> Self {
        Self(Rc::new(RefCell::new(condition)))
    }

    /// Runs the condition once. A condition that is already running (it
    /// re-entered the runtime) is not polled again.
    pub fn poll(&self) -> std::result::Result<(), String> {
        let Ok(mut condition) = self.0.try_borrow_mut() else {
            return Ok(());
        };
        (*condition)().map_err(|reason| {
            tracing::warn!(%reason, "run condition aborted execution");
            format!("run condition failed: {}", reason)
        })
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Probe({:p})", Rc::as_ptr(&self.0))
    }
}

/// Name-to-value bindings of one activation.
pub(crate) type Bindings = HashMap<String, Value>;

/// A parameter of a script lambda declared without a default. Its slot in
/// the defaults tuple holds null but does not count as a binding.
fn is_placeholder(program: &Bytecode, name: &str) -> bool {
    program.parameters.iter().any(|p| p == name) && program.required.iter().any(|r| r == name)
}

pub(crate) fn frame_from_bound(program: &Bytecode, args: BoundArgs) -> Bindings {
    args.slots
        .into_iter()
        .zip(args.filled)
        .filter(|((name, _), filled)| *filled || !is_placeholder(program, name))
        .map(|(slot, _)| slot)
        .chain(args.extra)
        .collect()
}

/// First `@required` name of `program` with no binding in `frame`.
pub(crate) fn first_missing<'a>(program: &'a Bytecode, frame: &Bindings) -> Option<&'a str> {
    program
        .required
        .iter()
        .find(|name| !frame.contains_key(name.as_str()))
        .map(String::as_str)
}

/// Runs `program` in a fresh VM over `frame`.
pub(crate) fn activate(
    heap: &Heap,
    program: Rc<Bytecode>,
    frame: Bindings,
    probes: &ProbeChain,
) -> std::result::Result<Value, String> {
    let mut vm = VM::new(heap.clone(), program, frame, probes.clone());
    vm.run()
}

fn compile_cached(core: &HeapCore, code: &str) -> Result<Rc<Bytecode>> {
    let source_hash = hash_bytes(code.as_bytes());
    if let Some(program) = core.programs.borrow_mut().get(&source_hash) {
        tracing::debug!(hash = %to_hex(&source_hash), cached = true, "load");
        return Ok(program);
    }
    let program =
        Rc::new(compile_source(code).map_err(|diagnostics| Error::Compile { diagnostics })?);
    tracing::debug!(
        hash = %to_hex(&source_hash),
        cached = false,
        required = ?program.required,
        "load"
    );
    core.programs.borrow_mut().insert(source_hash, &program);
    Ok(program)
}

/// Typed view of a lambda value (the `VMLambda` of the host API).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    value: Value,
}

impl TryFrom<Value> for Lambda {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value.kind() {
            ValueKind::Lambda => Ok(Self { value }),
            other => Err(Error::marshal(format!("expected Lambda, got {}", other))),
        }
    }
}

impl From<Lambda> for Value {
    fn from(lambda: Lambda) -> Self {
        lambda.value
    }
}

impl Lambda {
    /// A fresh, unloaded lambda on `heap`.
    pub fn new(heap: &Heap) -> Self {
        Self {
            value: heap.new_lambda(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn is_loaded(&self) -> bool {
        self.value.with_object(|_, object| {
            matches!(object, HeapObject::Lambda { program: Some(_), .. })
        })
    }

    /// Required names of the loaded program, in declaration order.
    pub fn required(&self) -> Vec<String> {
        self.value.with_object(|_, object| match object {
            HeapObject::Lambda {
                program: Some(program),
                ..
            } => program.required.clone(),
            _ => Vec::new(),
        })
    }

    /// Compiles `code` and installs it with `default_args` and `run_condition`,
    /// replacing whatever was loaded before.
    ///
    /// `default_args` is a tuple of named pairs (or string-keyed key-value
    /// pairs) that seeds the frame of every call.
    pub fn load(
        &self,
        code: &str,
        default_args: &Value,
        run_condition: Option<RunCondition>,
    ) -> Result<()> {
        let heap = self.value.heap();
        let defaults = heap.check_owned(default_args)?;
        contract_slots(default_args)?;
        let program = compile_cached(&heap.core, code)?;
        let probe = run_condition.map(Probe::new);
        let handle = self.value.handle();
        heap.core
            .with_gc(|gc| gc.set_program(handle, program, defaults, probe))
            .map_err(Error::marshal)
    }

    /// Runs the program with the default args overlaid by `kwargs`.
    ///
    /// Fails with [`Error::Binding`] before anything runs when a required
    /// name is left unbound.
    pub fn call(&self, kwargs: &[(&str, &Value)]) -> Result<Value> {
        let heap = self.value.heap();
        let (program, defaults, probe) = self.loaded()?;

        let mut frame: Bindings = contract_slots(&defaults)?
            .into_iter()
            .filter(|(name, _)| !is_placeholder(&program, name))
            .collect();
        for (name, value) in kwargs {
            heap.check_owned(value)?;
            frame.insert(name.to_string(), (*value).clone());
        }
        if let Some(name) = first_missing(&program, &frame) {
            return Err(Error::binding(name));
        }

        tracing::debug!(required = ?program.required, frame = frame.len(), "lambda call");
        let _depth = CallDepthGuard::enter(&heap.core).map_err(Error::execution)?;
        let probes = ProbeChain::new().extended(probe.as_ref());
        activate(&heap, program, frame, &probes).map_err(Error::execution)
    }

    /// Like [`Lambda::call`], with keyword arguments given as a host map (or
    /// a list of named values).
    pub fn call_with(&self, kwargs: HostValue) -> Result<Value> {
        let heap = self.value.heap();
        let entries = match kwargs {
            HostValue::Null => Vec::new(),
            HostValue::Map(entries) => entries,
            HostValue::List(items) => items
                .into_iter()
                .map(|item| match item {
                    HostValue::Named(name, value) => Ok((name, *value)),
                    other => Err(Error::marshal(format!(
                        "keyword arguments must be named, got {}",
                        other.type_name()
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(Error::marshal(format!(
                    "keyword arguments must be a map, got {}",
                    other.type_name()
                )));
            }
        };
        let lowered = entries
            .into_iter()
            .map(|(name, value)| Ok((name, heap.from_host(value)?)))
            .collect::<Result<Vec<_>>>()?;
        let kwargs: Vec<(&str, &Value)> = lowered
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        self.call(&kwargs)
    }

    fn loaded(&self) -> Result<(Rc<Bytecode>, Value, Option<Probe>)> {
        let loaded = self.value.with_object(|_, object| match object {
            HeapObject::Lambda {
                program: Some(program),
                defaults: Some(defaults),
                probe,
            } => Some((program.clone(), *defaults, probe.clone())),
            _ => None,
        });
        let (program, defaults, probe) =
            loaded.ok_or_else(|| Error::execution("lambda is not loaded"))?;
        Ok((program, self.value.sibling(defaults), probe))
    }
}
