//! FALSE compiler library.
//!
//! Provides compilation from FALSE source text to a self-contained LLVM
//! IR module. The pipeline is three pull-based stages: [`Lexer`] (bytes
//! to tokens), [`Parser`] (tokens to AST), and [`CodeGen`] (AST to `.ll`
//! text). Assembling and linking the output is the caller's business;
//! the module only assumes the C standard library.
//!
//! ```rust
//! let ir = falsec::compile_to_ir("1 2+.").unwrap();
//! assert!(ir.contains("define i32 @main()"));
//! ```

pub mod codegen;
pub mod lexer;
pub mod parser;

pub use codegen::{CodeGen, CodeGenError};
pub use lexer::{Lexer, Token};
pub use parser::{AstNode, Parser};

/// Compile FALSE source text to LLVM IR text.
///
/// All compiler state lives inside this call; compiling twice from the
/// same source yields byte-identical output.
pub fn compile_to_ir(source: &str) -> Result<String, String> {
    let mut parser = Parser::new(source);
    let program = parser.parse()?;

    let mut codegen = CodeGen::new();
    codegen.codegen_program(&program).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_to_ir_hello_world() {
        let ir = compile_to_ir("\"Hello, World!\"").unwrap();
        assert!(ir.contains("define i32 @main()"));
        assert!(ir.contains("@str_0"));
    }

    #[test]
    fn test_compile_to_ir_reports_lex_errors() {
        let err = compile_to_ir("{unterminated").unwrap_err();
        assert!(err.contains("unclosed comment"));
    }

    #[test]
    fn test_compile_to_ir_reports_parse_errors() {
        let err = compile_to_ir("`7").unwrap_err();
        assert!(err.contains("assembly not supported"));
    }

    #[test]
    fn test_compile_to_ir_is_deterministic() {
        let source = "[\"tick\"]! [\"tick\"]! 1 2+.";
        assert_eq!(compile_to_ir(source).unwrap(), compile_to_ir(source).unwrap());
    }
}
