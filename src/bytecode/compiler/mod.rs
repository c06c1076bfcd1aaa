use crate::{
    bytecode::{
        bytecode::Bytecode,
        compilation_scope::CompilationScope,
        debug_info::FunctionDebugInfo,
        op_code::OpCode,
    },
    frontend::{
        diagnostic::{Diagnostic, render_diagnostics},
        parser,
        position::Position,
        program::Program,
        statement::Statement,
    },
};

mod builder;
mod expression;
mod statement;

type CompileResult<T> = Result<T, Box<Diagnostic>>;

pub struct Compiler {
    pub(super) scopes: Vec<CompilationScope>,
    pub(super) scope_index: usize,
    pub errors: Vec<Diagnostic>,
    pub(super) file_path: String,
    pub(super) current_position: Option<Position>,
}


impl Compiler {
    pub fn new() -> Self {
        Self::new_with_file_path("<script>")
    }

    pub fn new_with_file_path(file_path: impl Into<String>) -> Self {
        Self {
            scopes: vec![CompilationScope::new()],
            scope_index: 0,
            errors: Vec::new(),
            file_path: file_path.into(),
            current_position: None,
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), Vec<Diagnostic>> {
        self.compile_body(&program.statements);

        if !self.errors.is_empty() {
            return Err(std::mem::take(&mut self.errors));
        }

        Ok(())
    }

    /// Compiles a statement sequence that forms a whole program or lambda
    /// body. A trailing expression statement becomes the result.
    pub(super) fn compile_body(&mut self, statements: &[Statement]) {
        let count = statements.len();
        for (index, statement) in statements.iter().enumerate() {
            let result = match statement {
                Statement::Expression { expression } if index + 1 == count => self
                    .compile_expression(expression)
                    .map(|_| {
                        self.emit(OpCode::OpReturnValue, &[]);
                    }),
                _ => self.compile_statement(statement),
            };
            // Continue compilation even if there are errors
            if let Err(err) = result {
                self.errors.push(*err);
            }
        }

        if !self.last_instruction_is(OpCode::OpReturnValue)
            && !self.last_instruction_is(OpCode::OpReturn)
        {
            self.emit(OpCode::OpReturn, &[]);
        }
    }

    pub(super) fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::new());
        self.scope_index += 1;
    }

    pub(super) fn leave_scope(&mut self) -> Option<CompilationScope> {
        let scope = self.scopes.pop()?;
        self.scope_index -= 1;
        Some(scope)
    }

    pub(super) fn scope(&mut self) -> &mut CompilationScope {
        &mut self.scopes[self.scope_index]
    }

    pub(super) fn scope_to_bytecode(
        scope: CompilationScope,
        name: &str,
        parameters: Vec<String>,
    ) -> Bytecode {
        Bytecode {
            instructions: scope.instructions,
            constants: scope.constants,
            names: scope.names,
            required: scope.required,
            parameters,
            debug_info: Some(FunctionDebugInfo::new(
                Some(name.to_string()),
                scope.locations,
            )),
        }
    }

    pub fn bytecode(&self) -> Bytecode {
        Self::scope_to_bytecode(
            self.scopes[self.scope_index].clone(),
            "<main>",
            Vec::new(),
        )
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses and compiles `code`, rendering every diagnostic on failure.
pub fn compile_source(code: &str) -> Result<Bytecode, String> {
    let program = parser::parse(code).map_err(|errs| render_diagnostics(&errs, Some(code), None))?;
    let mut compiler = Compiler::new();
    compiler
        .compile(&program)
        .map_err(|errs| render_diagnostics(&errs, Some(code), None))?;
    Ok(compiler.bytecode())
}
