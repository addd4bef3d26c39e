//! LLVM IR code generation.
//!
//! Lowers the FALSE AST to a self-contained textual module. The emitted
//! program is a stack machine: a growable heap buffer of 8-byte cells,
//! manipulated through typed push/pop/peek helpers, with 26 variable
//! cells alongside it. Quotations become named top-level functions and
//! are pushed as function pointers; string literals become interned
//! constants fed to `printf`.
//!
//! # Module structure
//!
//! - `state.rs`: the `CodeGen` struct, counters, lambda registry
//! - `error.rs`: `CodeGenError`
//! - `runtime.rs`: the fixed prologue (externs, cell type, stack helpers)
//! - `globals.rs`: string-constant interning
//! - `quotations.rs`: lambda hoisting and structural deduplication
//! - `statements.rs`: per-AST-kind lowering rules
//! - `program.rs`: final module assembly and `@main`

mod error;
mod globals;
mod program;
mod quotations;
mod runtime;
mod state;
mod statements;

pub use error::CodeGenError;
pub use state::CodeGen;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn compile(source: &str) -> String {
        let program = Parser::new(source).parse().unwrap();
        let mut codegen = CodeGen::new();
        codegen.codegen_program(&program).unwrap()
    }

    fn count_occurrences(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_prologue_declares_libc_externs() {
        let ir = compile("");
        for decl in [
            "declare ptr @malloc(i64)",
            "declare ptr @realloc(ptr, i64)",
            "declare void @free(ptr)",
            "declare i32 @putchar(i32)",
            "declare i32 @getchar()",
            "declare i32 @printf(ptr, ...)",
        ] {
            assert!(ir.contains(decl), "missing extern: {}", decl);
        }
    }

    #[test]
    fn test_prologue_defines_all_twelve_helpers() {
        let ir = compile("");
        for shape in ["push", "pop", "peek"] {
            for view in ["any", "int", "ref", "quote"] {
                let needle = format!("@{}_{}(", shape, view);
                assert!(ir.contains(&needle), "missing helper: {}", needle);
            }
        }
        assert!(ir.contains("define void @stack_init()"));
        assert!(ir.contains("define void @stack_free()"));
    }

    #[test]
    fn test_prologue_has_26_variable_cells() {
        let ir = compile("");
        assert_eq!(
            count_occurrences(&ir, "= global %union.FalseValue zeroinitializer"),
            26
        );
        assert!(ir.contains("@var_a = global %union.FalseValue zeroinitializer"));
        assert!(ir.contains("@var_z = global %union.FalseValue zeroinitializer"));
    }

    #[test]
    fn test_main_wraps_program_with_stack_lifecycle() {
        let ir = compile("1 2+.");
        let main_at = ir.find("define i32 @main()").unwrap();
        let body = &ir[main_at..];
        assert!(body.contains("call void @stack_init()"));
        assert!(body.contains("call void @stack_free()"));
        assert!(body.trim_end().ends_with("ret i32 0\n}"));
    }

    #[test]
    fn test_integer_and_arithmetic_lowering() {
        let ir = compile("1 2+.");
        assert!(ir.contains("call void @push_int(i32 1)"));
        assert!(ir.contains("call void @push_int(i32 2)"));
        assert!(ir.contains("add i32"));
        assert!(ir.contains("@printf(ptr @.num, i32"));
    }

    #[test]
    fn test_subtraction_operand_order() {
        // `-` computes second-from-top minus top: rhs pops first.
        let ir = compile("10 3-");
        assert!(ir.contains("%t2 = sub i32 %t1, %t0"));
    }

    #[test]
    fn test_division_is_signed() {
        let ir = compile("6 2/");
        assert!(ir.contains("sdiv i32"));
    }

    #[test]
    fn test_comparison_sign_extends_to_minus_one() {
        let ir = compile("1 2=");
        assert!(ir.contains("icmp eq i32"));
        assert!(ir.contains("sext i1"));
        let ir = compile("1 2>");
        assert!(ir.contains("icmp sgt i32"));
    }

    #[test]
    fn test_bit_invert_uses_xor() {
        let ir = compile("0~");
        assert!(ir.contains("xor i32 %t0, -1"));
    }

    #[test]
    fn test_string_prints_and_pushes_nothing() {
        let ir = compile("\"hi\"");
        assert!(ir.contains("@str_0 = private unnamed_addr constant [3 x i8] c\"\\68\\69\\00\""));
        assert!(ir.contains("call i32 (ptr, ...) @printf(ptr @.fmt, ptr @str_0)"));
        // Only @main's implicit stack traffic: the literal itself pushes nothing.
        let main_at = ir.find("define i32 @main()").unwrap();
        assert!(!ir[main_at..].contains("@push_"));
    }

    #[test]
    fn test_string_interning_reuses_symbol() {
        let ir = compile("\"x\" \"x\"");
        assert_eq!(count_occurrences(&ir, "@str_0 = "), 1);
        assert!(!ir.contains("@str_1"));
        assert_eq!(
            count_occurrences(&ir, "@printf(ptr @.fmt, ptr @str_0)"),
            2
        );
    }

    #[test]
    fn test_distinct_strings_get_distinct_symbols() {
        let ir = compile("\"x\" \"y\"");
        assert!(ir.contains("@str_0 = "));
        assert!(ir.contains("@str_1 = "));
    }

    #[test]
    fn test_variable_store_and_fetch() {
        let ir = compile("10a: a;.");
        assert!(ir.contains("call void @push_ref(ptr @var_a)"));
        assert!(ir.contains("call ptr @pop_ref()"));
        assert!(ir.contains("store %union.FalseValue"));
        assert!(ir.contains("load %union.FalseValue"));
    }

    #[test]
    fn test_identical_quotes_share_one_lambda() {
        let ir = compile("[1.]![1.]!");
        assert_eq!(count_occurrences(&ir, "define void @lambda_"), 1);
        assert_eq!(
            count_occurrences(&ir, "call void @push_quote(ptr @lambda_0)"),
            2
        );
    }

    #[test]
    fn test_quotes_differing_in_second_child_not_deduped() {
        // Bodies agree on the first child and diverge on the second;
        // equality must look past the first element.
        let ir = compile("[1 2]![1 3]!");
        assert!(ir.contains("define void @lambda_0()"));
        assert!(ir.contains("define void @lambda_1()"));
    }

    #[test]
    fn test_nested_quotes_flatten_to_top_level() {
        let ir = compile("[[1.]!]!");
        assert!(ir.contains("define void @lambda_0()"));
        assert!(ir.contains("define void @lambda_1()"));
        // The outer lambda pushes and calls the inner one.
        let outer = ir.find("define void @lambda_0()").unwrap();
        let outer_end = ir[outer..].find("\n}").unwrap() + outer;
        assert!(ir[outer..outer_end].contains("@push_quote(ptr @lambda_1)"));
    }

    #[test]
    fn test_lambda_bodies_end_with_ret_void() {
        let ir = compile("[$]!");
        let lambda = ir.find("define void @lambda_0()").unwrap();
        let end = ir[lambda..].find("\n}").unwrap() + lambda;
        assert!(ir[lambda..end].ends_with("ret void"));
    }

    #[test]
    fn test_execute_calls_through_popped_pointer() {
        let ir = compile("[1.]!");
        assert!(ir.contains("call ptr @pop_quote()"));
        assert!(ir.contains("call void %t0()"));
    }

    #[test]
    fn test_execute_if_branches_on_condition() {
        let ir = compile("1[2.]?");
        assert!(ir.contains("icmp ne i32"));
        assert!(ir.contains("br i1 %t2, label %label_0, label %label_1"));
        assert!(ir.contains("label_0:"));
        assert!(ir.contains("label_1:"));
    }

    #[test]
    fn test_while_emits_three_labels_and_back_edge() {
        let ir = compile("[$0>][$.1-]#%");
        for label in ["label_0:", "label_1:", "label_2:"] {
            assert!(ir.contains(label), "missing {}", label);
        }
        assert!(ir.contains("br label %label_0"));
        assert!(ir.contains("br i1 %t3, label %label_1, label %label_2"));
    }

    #[test]
    fn test_io_primitives() {
        let ir = compile("^,");
        assert!(ir.contains("call i32 @getchar()"));
        assert!(ir.contains("call i32 @putchar(i32"));
    }

    #[test]
    fn test_take_peeks_at_popped_depth() {
        let ir = compile("1 2 1O");
        assert!(ir.contains("sext i32 %t0 to i64"));
        assert!(ir.contains("call %union.FalseValue @peek_any(i64 %t1)"));
    }

    #[test]
    fn test_temporaries_restart_per_function() {
        // Both the lambda and main start their numbering at %t0.
        let ir = compile("[$] $");
        assert_eq!(count_occurrences(&ir, "%t0 = call %union.FalseValue @peek_any"), 2);
    }

    #[test]
    fn test_output_is_deterministic() {
        let source = "\"a\"\"b\"[1.]![2.]! 3 4+. [1.]!";
        assert_eq!(compile(source), compile(source));
    }

    #[test]
    fn test_fresh_codegen_state_per_compilation() {
        let first = {
            let program = Parser::new("[1.]!").parse().unwrap();
            CodeGen::new().codegen_program(&program).unwrap()
        };
        let second = {
            let program = Parser::new("[1.]!").parse().unwrap();
            CodeGen::new().codegen_program(&program).unwrap()
        };
        // Counters restart: the second compile names its lambda @lambda_0 too.
        assert_eq!(first, second);
        assert!(second.contains("@lambda_0"));
    }
}
