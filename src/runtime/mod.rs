//! Runtime core: the GC heap, values, the bridge to host functions and the
//! lambda evaluator.
//!
//! # Ownership
//! Every heap object carries two counts: references held by other heap
//! objects and references held by host [`Value`] handles. Objects whose
//! counts both reach zero are freed on the spot. Anything left over from a
//! cycle is reclaimed by [`Heap::collect`], which marks from objects the host
//! still holds.

pub mod callable;
pub mod config;
pub mod error;
pub mod gc;
pub mod heap;
pub mod host;
pub mod lambda;
pub mod leak_detector;
pub mod native_function;
pub mod repr;
pub mod value;
pub(crate) mod vm;

pub use callable::{BoundArgs, Callable, ProbeChain};
pub use config::RuntimeConfig;
pub use error::{Error, Result};
pub use heap::Heap;
pub use host::HostValue;
pub use lambda::{Lambda, RunCondition};
pub use native_function::{NativeArgs, ParamKind, ParamSpec, TypeHint, contract_from_params};
pub use value::{Value, ValueKind};
