//! Host functions exposed to scripts (the bridge).

use std::{fmt, rc::Rc};

use crate::runtime::{
    callable::{BoundArgs, contract_slots},
    error::{Error, Result},
    heap::Heap,
    host::HostValue,
    value::Value,
};

/// Signature of a bridged host function.
pub type NativeFn = dyn Fn(&Heap, NativeArgs) -> std::result::Result<HostValue, String>;

pub struct NativeFunction {
    name: String,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&Heap, NativeArgs) -> std::result::Result<HostValue, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

/// Arguments handed to a host function, already bound and marshalled.
#[derive(Debug)]
pub struct NativeArgs {
    params: Vec<(String, HostValue)>,
    /// Positional arguments past the end of the contract.
    pub rest: Vec<HostValue>,
    /// Named arguments the contract does not declare, in call order.
    pub extra: Vec<(String, HostValue)>,
    raw: BoundArgs,
}

impl NativeArgs {
    fn marshal(raw: BoundArgs) -> Result<Self> {
        let params = raw
            .slots
            .iter()
            .map(|(name, value)| Ok((name.clone(), value.to_host()?)))
            .collect::<Result<Vec<_>>>()?;
        let rest = raw
            .rest
            .iter()
            .map(Value::to_host)
            .collect::<Result<Vec<_>>>()?;
        let extra = raw
            .extra
            .iter()
            .map(|(name, value)| Ok((name.clone(), value.to_host()?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            params,
            rest,
            extra,
            raw,
        })
    }

    /// Bound parameter (or extra named argument) called `name`.
    pub fn get(&self, name: &str) -> Option<&HostValue> {
        self.params
            .iter()
            .chain(self.extra.iter())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Contract parameters in order, followed by the overflow.
    pub fn positional(&self) -> Vec<&HostValue> {
        self.params
            .iter()
            .map(|(_, v)| v)
            .chain(self.rest.iter())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HostValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The runtime values the arguments were marshalled from.
    pub fn raw(&self) -> &BoundArgs {
        &self.raw
    }
}

pub(crate) fn invoke_native(
    heap: &Heap,
    function: &NativeFunction,
    args: BoundArgs,
) -> std::result::Result<Value, String> {
    let args = NativeArgs::marshal(args).map_err(|err| err.to_string())?;
    let result = (function.func)(heap, args)
        .map_err(|msg| format!("native function `{}` failed: {}", function.name, msg))?;
    heap.from_host(result).map_err(|err| err.to_string())
}

impl Value {
    /// Turns a native-function slot into a callable host function with the
    /// given parameter `contract` (a tuple of named defaults).
    pub fn wrap(
        &self,
        name: impl Into<String>,
        func: impl Fn(&Heap, NativeArgs) -> std::result::Result<HostValue, String> + 'static,
        contract: &Value,
    ) -> Result<()> {
        let heap = self.heap();
        let contract_handle = heap.check_owned(contract)?;
        contract_slots(contract)?;
        let native = Rc::new(NativeFunction::new(name, func));
        let handle = self.handle();
        heap.core
            .with_gc(|gc| gc.set_native(handle, native, contract_handle))
            .map_err(Error::marshal)
    }
}

impl Heap {
    /// Allocates and wraps a native function in one step.
    pub fn wrap_function(
        &self,
        name: impl Into<String>,
        func: impl Fn(&Heap, NativeArgs) -> std::result::Result<HostValue, String> + 'static,
        contract: &Value,
    ) -> Result<Value> {
        let function = self.new_native_function();
        function.wrap(name, func, contract)?;
        Ok(function)
    }
}

/// How a host parameter is passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// The method receiver (`self`); never part of the contract.
    Receiver,
    Positional,
    /// `*args`-style collector; never part of the contract.
    VarPositional,
    /// `**kwargs`-style collector; never part of the contract.
    VarKeyword,
}

/// Declared type of a host parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Int,
    Float,
    Str,
    Bool,
    List,
    Map,
}

/// Description of one host parameter, used to derive a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub hint: Option<TypeHint>,
    pub default: Option<HostValue>,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamKind::Positional,
            hint: None,
            default: None,
        }
    }

    pub fn receiver() -> Self {
        Self {
            kind: ParamKind::Receiver,
            ..Self::new("self")
        }
    }

    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarPositional,
            ..Self::new(name)
        }
    }

    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarKeyword,
            ..Self::new(name)
        }
    }

    pub fn with_hint(mut self, hint: TypeHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn with_default(mut self, default: impl Into<HostValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Default slot value: explicit default, else the hint's zero value, else null.
    fn slot_default(&self) -> HostValue {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match self.hint {
            Some(TypeHint::Int) => HostValue::Int(0),
            Some(TypeHint::Float) => HostValue::Float(0.0),
            Some(TypeHint::Str) => HostValue::Str(String::new()),
            Some(TypeHint::Bool) => HostValue::Bool(false),
            Some(TypeHint::List) | Some(TypeHint::Map) => HostValue::List(Vec::new()),
            None => HostValue::Null,
        }
    }
}

/// Builds a contract tuple of named defaults from host parameter descriptions.
pub fn contract_from_params(heap: &Heap, params: &[ParamSpec]) -> Result<Value> {
    let slots = params
        .iter()
        .filter(|param| param.kind == ParamKind::Positional)
        .map(|param| {
            let default = heap.from_host(param.slot_default())?;
            heap.new_named(param.name.clone(), &default)
        })
        .collect::<Result<Vec<_>>>()?;
    heap.new_tuple(&slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::callable::ProbeChain;

    fn add_contract(heap: &Heap) -> Value {
        contract_from_params(
            heap,
            &[
                ParamSpec::new("a").with_hint(TypeHint::Int),
                ParamSpec::new("b").with_hint(TypeHint::Int),
            ],
        )
        .unwrap()
    }

    fn add(_: &Heap, args: NativeArgs) -> std::result::Result<HostValue, String> {
        let a = args.get("a").and_then(HostValue::as_int).ok_or("a must be an int")?;
        let b = args.get("b").and_then(HostValue::as_int).ok_or("b must be an int")?;
        Ok(HostValue::Int(a + b))
    }

    #[test]
    fn contract_discovery_rules() {
        let heap = Heap::new();
        let contract = contract_from_params(
            &heap,
            &[
                ParamSpec::receiver(),
                ParamSpec::new("n").with_hint(TypeHint::Int),
                ParamSpec::new("x").with_hint(TypeHint::Float),
                ParamSpec::new("s").with_hint(TypeHint::Str),
                ParamSpec::new("flag").with_hint(TypeHint::Bool),
                ParamSpec::new("items").with_hint(TypeHint::List),
                ParamSpec::new("d").with_default("dflt"),
                ParamSpec::new("any"),
                ParamSpec::var_positional("args"),
                ParamSpec::var_keyword("kwargs"),
            ],
        )
        .unwrap();
        assert_eq!(
            contract.repr(),
            "VMTuple((VMNamed(\"n\" => VMInt(0)), VMNamed(\"x\" => VMFloat(0)), \
             VMNamed(\"s\" => VMString(\"\")), VMNamed(\"flag\" => VMBoolean(false)), \
             VMNamed(\"items\" => VMTuple(())), VMNamed(\"d\" => VMString(\"dflt\")), \
             VMNamed(\"any\" => VMNull())))"
        );
    }

    #[test]
    fn wrapped_function_binds_positionally() {
        let heap = Heap::new();
        let function = heap
            .wrap_function("add", add, &add_contract(&heap))
            .unwrap();
        assert_eq!(function.repr(), "VMNativeFunction(add)");
        let result = function
            .invoke(&[heap.new_int(1), heap.new_int(2)])
            .unwrap();
        assert_eq!(result.as_int(), Some(3));
    }

    #[test]
    fn host_errors_name_the_function() {
        let heap = Heap::new();
        let function = heap
            .wrap_function("add", add, &add_contract(&heap))
            .unwrap();
        let err = function.invoke(&[heap.new_string("x")]).unwrap_err();
        assert_eq!(
            err.message(),
            "native function `add` failed: a must be an int"
        );
    }

    #[test]
    fn rest_and_extra_reach_the_host() {
        let heap = Heap::new();
        let contract = contract_from_params(&heap, &[ParamSpec::new("a")]).unwrap();
        let function = heap
            .wrap_function(
                "collect",
                |_, args| {
                    Ok(HostValue::List(vec![
                        HostValue::Int(args.rest.len() as i64),
                        HostValue::Int(args.extra.len() as i64),
                        HostValue::Int(args.positional().len() as i64),
                    ]))
                },
                &contract,
            )
            .unwrap();
        let named = heap.new_named("z", &heap.new_int(1)).unwrap();
        let result = crate::runtime::callable::call_value(
            &heap,
            &function,
            vec![heap.new_int(1), heap.new_int(2), heap.new_int(3), named],
            &ProbeChain::new(),
        )
        .unwrap();
        assert_eq!(result.repr(), "VMTuple((VMInt(2), VMInt(1), VMInt(3)))");
    }

    #[test]
    fn wrap_rejects_bad_contract_and_non_function() {
        let heap = Heap::new();
        let slot = heap.new_native_function();
        assert!(slot.wrap("f", add, &heap.new_int(1)).is_err());
        let contract = add_contract(&heap);
        assert!(heap.new_int(1).wrap("f", add, &contract).is_err());
    }

    #[test]
    fn dropping_wrapped_function_frees_contract() {
        let heap = Heap::new();
        let baseline = heap.object_count();
        let function = heap
            .wrap_function("add", add, &add_contract(&heap))
            .unwrap();
        drop(function);
        assert_eq!(heap.object_count(), baseline);
    }
}
