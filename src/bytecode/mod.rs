#[allow(clippy::module_inception)]
pub mod bytecode;
pub mod compilation_scope;
pub mod compiler;
pub mod constant;
pub mod debug_info;
pub mod emitted_instruction;
pub mod op_code;
pub mod program_cache;
