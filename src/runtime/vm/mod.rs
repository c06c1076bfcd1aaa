//! Stack machine that runs one lambda activation.
//!
//! Every activation gets its own `VM` over its own binding frame; calls made
//! by the script go through [`crate::runtime::callable::call_value`], which
//! starts a nested VM for interpreted callees. Stack slots and frame entries
//! are counted [`Value`]s, so unwinding on error releases them.

use std::rc::Rc;

use crate::{
    bytecode::{
        bytecode::Bytecode,
        constant::Constant,
        op_code::{OpCode, instruction_len},
    },
    runtime::{callable::ProbeChain, heap::Heap, lambda::Bindings, value::Value},
};

mod binary_ops;
mod comparison_ops;
mod dispatch;
mod function_call;
mod index_ops;
mod trace;

const MAX_STACK_SIZE: usize = 1 << 16;

/// What the dispatcher wants the run loop to do next.
pub(super) enum Flow {
    Next,
    Jump(usize),
    Return(Value),
}

pub struct VM {
    heap: Heap,
    program: Rc<Bytecode>,
    frame: Bindings,
    probes: ProbeChain,
    stack: Vec<Value>,
    trace: bool,
}

impl VM {
    pub fn new(heap: Heap, program: Rc<Bytecode>, frame: Bindings, probes: ProbeChain) -> Self {
        let trace = heap.config().trace;
        Self {
            heap,
            program,
            frame,
            probes,
            stack: Vec::with_capacity(64),
            trace,
        }
    }

    pub fn set_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    /// Runs the program to completion and returns its result.
    pub fn run(&mut self) -> Result<Value, String> {
        let program = self.program.clone();
        let instructions: &[u8] = &program.instructions;
        let mut ip = 0;

        while ip < instructions.len() {
            let op = OpCode::try_from(instructions[ip])?;
            if self.trace {
                self.trace_instruction(instructions, ip, op);
            }

            match self.dispatch_instruction(instructions, ip, op) {
                Ok(Flow::Next) => ip += instruction_len(op),
                Ok(Flow::Jump(target)) => ip = target,
                Ok(Flow::Return(value)) => return Ok(value),
                Err(err) => {
                    self.log_fault(ip, &err);
                    return Err(err);
                }
            }
        }

        Ok(self.heap.new_null())
    }

    /// Current binding frame.
    pub fn frame(&self) -> &Bindings {
        &self.frame
    }

    pub(crate) fn push(&mut self, value: Value) -> Result<(), String> {
        if self.stack.len() >= MAX_STACK_SIZE {
            return Err("stack overflow".to_string());
        }
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Value, String> {
        self.stack
            .pop()
            .ok_or_else(|| "stack underflow".to_string())
    }

    fn peek(&self) -> Result<&Value, String> {
        self.stack
            .last()
            .ok_or_else(|| "stack underflow".to_string())
    }

    /// Pops the top `count` values, oldest first.
    fn pop_n(&mut self, count: usize) -> Result<Vec<Value>, String> {
        if count > self.stack.len() {
            return Err("stack underflow".to_string());
        }
        let split = self.stack.len() - count;
        Ok(self.stack.split_off(split))
    }

    fn name(&self, index: usize) -> Result<&str, String> {
        self.program
            .names
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| format!("name index {} out of range", index))
    }

    fn constant(&self, index: usize) -> Result<&Constant, String> {
        self.program
            .constants
            .get(index)
            .ok_or_else(|| format!("constant index {} out of range", index))
    }

    fn constant_value(&self, index: usize) -> Result<Value, String> {
        Ok(match self.constant(index)? {
            Constant::Integer(v) => self.heap.new_int(*v),
            Constant::Float(v) => self.heap.new_float(*v),
            Constant::String(v) => self.heap.new_string(v.clone()),
            Constant::Bytes(v) => self.heap.new_bytes(v.clone()),
            Constant::Function(_) => {
                return Err("function constants are only loaded by OpLambda".to_string());
            }
        })
    }
}

#[cfg(test)]
mod comparison_ops_test;
#[cfg(test)]
mod function_call_test;
