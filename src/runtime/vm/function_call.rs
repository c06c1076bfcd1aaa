use crate::runtime::callable::call_value;

use super::VM;

impl VM {
    /// Pops `num_args` arguments and the callee below them, calls it and
    /// pushes the result.
    pub(crate) fn execute_call(&mut self, num_args: usize) -> Result<(), String> {
        let args = self.pop_n(num_args)?;
        let callee = self.pop()?;
        let result = call_value(&self.heap, &callee, args, &self.probes)?;
        self.push(result)
    }
}
