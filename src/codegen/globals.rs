//! Constant-string interning.
//!
//! Each distinct string literal gets one `@str_K` global; duplicates
//! reuse the same symbol. Definitions accumulate in first-use order so
//! output stays deterministic.

use super::{CodeGen, CodeGenError};
use std::fmt::Write as _;

impl CodeGen {
    /// Get or create the `@str_K` global for a string literal.
    ///
    /// The returned name includes the leading `@`. The constant encodes
    /// every byte of the literal as a two-digit hex escape followed by a
    /// NUL terminator, so the `[N x i8]` length is byte count + 1.
    pub(super) fn intern_string(&mut self, text: &str) -> Result<String, CodeGenError> {
        if let Some(name) = self.string_constants.get(text) {
            return Ok(name.clone());
        }

        let name = format!("@str_{}", self.string_counter);
        self.string_counter += 1;

        let escaped: String = text.bytes().map(|b| format!("\\{:02X}", b)).collect();
        writeln!(
            &mut self.string_globals,
            "{} = private unnamed_addr constant [{} x i8] c\"{}\\00\"",
            name,
            text.len() + 1,
            escaped
        )?;

        self.string_constants.insert(text.to_string(), name.clone());
        Ok(name)
    }
}
