//! Embeddable XLang runtime.
//!
//! A [`Heap`] owns every value. Host code builds values on it, wraps host
//! closures as native functions, and loads XLang source into [`Lambda`]s that
//! it then calls with keyword arguments:
//!
//! ```
//! use xlang::{Heap, Lambda};
//!
//! let heap = Heap::new();
//! let defaults = heap
//!     .new_tuple(&[heap.new_named("x", &heap.new_int(20)).unwrap()])
//!     .unwrap();
//! let lambda = Lambda::new(&heap);
//! lambda.load("@required x; x + 1", &defaults, None).unwrap();
//! assert_eq!(lambda.call(&[]).unwrap().as_int(), Some(21));
//! ```

pub mod bytecode;
pub mod frontend;
pub mod runtime;

pub use runtime::{
    BoundArgs, Callable, Error, Heap, HostValue, Lambda, NativeArgs, ParamKind, ParamSpec,
    Result, RunCondition, RuntimeConfig, TypeHint, Value, ValueKind, contract_from_params,
};
