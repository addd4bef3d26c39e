//! CodeGen state and core types.
//!
//! One `CodeGen` instance lives for exactly one compilation. All name
//! counters, the string intern map, and the lambda registry are scoped
//! here so nothing leaks between compiles.

use crate::parser::AstNode;
use std::collections::HashMap;

/// A hoisted quotation: its source body, its assigned `@lambda_K` name,
/// and the emitted function definition text.
///
/// The body is kept so later quotations can be compared structurally
/// against it for deduplication.
pub(super) struct Lambda {
    pub body: Vec<AstNode>,
    pub name: String,
    pub definition: String,
}

pub struct CodeGen {
    /// Instruction buffer of the function currently being emitted.
    /// Swapped out while a nested quotation is hoisted.
    pub(super) output: String,
    /// Interned string constants, one `@str_K` definition per line,
    /// in first-use order.
    pub(super) string_globals: String,
    /// string content -> global name (with the leading `@`)
    pub(super) string_constants: HashMap<String, String>,
    /// All hoisted quotations, in registration order.
    pub(super) lambdas: Vec<Lambda>,
    pub(super) string_counter: usize,
    pub(super) lambda_counter: usize,
    /// Per-function counter for `%tN` temporaries.
    pub(super) temp_counter: usize,
    /// Per-function counter for `label_N` basic-block labels.
    pub(super) label_counter: usize,
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGen {
    pub fn new() -> Self {
        CodeGen {
            output: String::new(),
            string_globals: String::new(),
            string_constants: HashMap::new(),
            lambdas: Vec::new(),
            string_counter: 0,
            lambda_counter: 0,
            temp_counter: 0,
            label_counter: 0,
        }
    }

    /// Allocate a fresh `%tN` temporary name (without the `%`).
    pub(super) fn fresh_temp(&mut self) -> String {
        let name = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    /// Allocate a fresh `label_N` basic-block label.
    pub(super) fn fresh_label(&mut self) -> String {
        let name = format!("label_{}", self.label_counter);
        self.label_counter += 1;
        name
    }
}
