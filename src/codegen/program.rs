//! Whole-program assembly.
//!
//! Lowering runs first so the string and lambda tables fill up, then the
//! module is assembled in its fixed order: prologue, interned strings,
//! hoisted quotations, `@main`.

use super::runtime::emit_prologue;
use super::{CodeGen, CodeGenError};
use crate::parser::AstNode;
use std::fmt::Write as _;

impl CodeGen {
    /// Generate the complete LLVM IR module for a parsed program.
    pub fn codegen_program(&mut self, program: &[AstNode]) -> Result<String, CodeGenError> {
        writeln!(&mut self.output, "define i32 @main() {{")?;
        writeln!(&mut self.output, "entry:")?;
        writeln!(&mut self.output, "  call void @stack_init()")?;
        self.codegen_statements(program)?;
        writeln!(&mut self.output, "  call void @stack_free()")?;
        writeln!(&mut self.output, "  ret i32 0")?;
        writeln!(&mut self.output, "}}")?;

        let mut ir = String::new();
        writeln!(&mut ir, "; ModuleID = 'false'")?;
        writeln!(&mut ir)?;
        emit_prologue(&mut ir)?;

        if !self.string_globals.is_empty() {
            writeln!(&mut ir, "; string constants")?;
            ir.push_str(&self.string_globals);
            writeln!(&mut ir)?;
        }

        if !self.lambdas.is_empty() {
            writeln!(&mut ir, "; quotation functions")?;
            for lambda in &self.lambdas {
                ir.push_str(&lambda.definition);
                writeln!(&mut ir)?;
            }
        }

        ir.push_str(&self.output);
        Ok(ir)
    }
}
