use crate::bytecode::op_code::{OpCode, operand_widths, read_operand};

use super::VM;

impl VM {
    pub(super) fn trace_instruction(&self, instructions: &[u8], ip: usize, op: OpCode) {
        let mut offset = ip + 1;
        let mut operands = Vec::new();
        for width in operand_widths(op) {
            operands.push(read_operand(instructions, offset, *width));
            offset += *width;
        }
        tracing::trace!(
            target: "xlang::vm",
            ip,
            op = %op,
            operands = ?operands,
            stack = self.stack.len(),
            "exec"
        );
    }

    /// Records where an activation faulted.
    pub(super) fn log_fault(&self, ip: usize, err: &str) {
        let function = self
            .program
            .debug_info
            .as_ref()
            .and_then(|info| info.name.as_deref())
            .unwrap_or("<anonymous>");
        let position = self
            .program
            .debug_info
            .as_ref()
            .and_then(|info| info.location_at(ip));
        match position {
            Some(position) => tracing::debug!(
                target: "xlang::vm",
                function,
                ip,
                line = position.line,
                column = position.column,
                error = err,
                "runtime fault"
            ),
            None => tracing::debug!(target: "xlang::vm", function, ip, error = err, "runtime fault"),
        }
    }
}
