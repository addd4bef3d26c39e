//! Quotation hoisting.
//!
//! A quotation body becomes a top-level `define void @lambda_K()`; the
//! quote itself lowers to pushing that function pointer. Bodies are
//! compared structurally against every previously hoisted body, so
//! syntactically identical quotes anywhere in the program share one
//! definition. Nested quotations register in the same flat list, however
//! deep they sit in the tree.

use super::state::Lambda;
use super::{CodeGen, CodeGenError};
use crate::parser::AstNode;
use std::fmt::Write as _;

impl CodeGen {
    /// Hoist a quotation body, reusing an existing lambda when an equal
    /// body was already emitted. Returns the `@lambda_K` name (without
    /// the `@`).
    ///
    /// Equality is the derived `PartialEq` on [`AstNode`]: all children,
    /// all payloads, recursively. Two bodies differing in any child get
    /// distinct lambdas.
    pub(super) fn hoist_quotation(&mut self, body: &[AstNode]) -> Result<String, CodeGenError> {
        if let Some(lambda) = self.lambdas.iter().find(|l| l.body.as_slice() == body) {
            return Ok(lambda.name.clone());
        }

        let name = format!("lambda_{}", self.lambda_counter);
        self.lambda_counter += 1;

        // Switch emission into a fresh function scope. Temporaries and
        // labels are per-function, so the counters reset and the outer
        // function's instruction buffer is parked until we return.
        let saved_output = std::mem::take(&mut self.output);
        let saved_temp = std::mem::replace(&mut self.temp_counter, 0);
        let saved_label = std::mem::replace(&mut self.label_counter, 0);

        writeln!(&mut self.output, "define void @{}() {{", name)?;
        writeln!(&mut self.output, "entry:")?;
        self.codegen_statements(body)?;
        writeln!(&mut self.output, "  ret void")?;
        writeln!(&mut self.output, "}}")?;

        let definition = std::mem::replace(&mut self.output, saved_output);
        self.temp_counter = saved_temp;
        self.label_counter = saved_label;

        self.lambdas.push(Lambda {
            body: body.to_vec(),
            name: name.clone(),
            definition,
        });
        Ok(name)
    }
}
