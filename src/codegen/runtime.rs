//! The fixed runtime prologue of every emitted module.
//!
//! The generated program runs against a single global cell stack plus 26
//! variable slots, all declared here: the libc externs, the 8-byte
//! `%union.FalseValue` cell type, the stack globals, and the push/pop/peek
//! helpers monomorphized per operand view. The helpers are emitted from
//! one template per shape so the four views cannot drift apart.

use super::error::CodeGenError;
use std::fmt::Write as _;

/// The four typed views of a stack cell: helper suffix and LLVM type.
///
/// There is no runtime tag; the consumer picks the view. `ref` and
/// `quote` are both opaque pointers at the IR level but stay separate
/// helper families, one per view the lowering rules use.
pub(super) const VALUE_VIEWS: [(&str, &str); 4] = [
    ("any", "%union.FalseValue"),
    ("int", "i32"),
    ("ref", "ptr"),
    ("quote", "ptr"),
];

/// Initial stack capacity in cells. The buffer doubles on overflow.
const INITIAL_CAPACITY: usize = 16;

/// Emit the complete fixed prologue into `ir`.
pub(super) fn emit_prologue(ir: &mut String) -> Result<(), CodeGenError> {
    writeln!(ir, "; libc externs")?;
    writeln!(ir, "declare ptr @malloc(i64)")?;
    writeln!(ir, "declare ptr @realloc(ptr, i64)")?;
    writeln!(ir, "declare void @free(ptr)")?;
    writeln!(ir, "declare i32 @putchar(i32)")?;
    writeln!(ir, "declare i32 @getchar()")?;
    writeln!(ir, "declare i32 @printf(ptr, ...)")?;
    writeln!(ir)?;

    writeln!(ir, "@.fmt = private unnamed_addr constant [3 x i8] c\"%s\\00\"")?;
    writeln!(ir, "@.num = private unnamed_addr constant [3 x i8] c\"%d\\00\"")?;
    writeln!(ir)?;

    writeln!(ir, "; an 8-byte stack cell, viewed as i32, ptr, or opaque bytes")?;
    writeln!(ir, "%union.FalseValue = type {{ [8 x i8] }}")?;
    writeln!(ir)?;

    writeln!(ir, "@stack = global ptr null")?;
    writeln!(ir, "@stack_size = global i64 0")?;
    writeln!(ir, "@stack_capacity = global i64 0")?;
    writeln!(ir)?;

    for name in b'a'..=b'z' {
        writeln!(
            ir,
            "@var_{} = global %union.FalseValue zeroinitializer",
            name as char
        )?;
    }
    writeln!(ir)?;

    writeln!(ir, "define void @stack_init() {{")?;
    writeln!(ir, "entry:")?;
    writeln!(ir, "  %buf = call ptr @malloc(i64 {})", INITIAL_CAPACITY * 8)?;
    writeln!(ir, "  store ptr %buf, ptr @stack")?;
    writeln!(ir, "  store i64 0, ptr @stack_size")?;
    writeln!(ir, "  store i64 {}, ptr @stack_capacity", INITIAL_CAPACITY)?;
    writeln!(ir, "  ret void")?;
    writeln!(ir, "}}")?;
    writeln!(ir)?;

    for (suffix, ty) in VALUE_VIEWS {
        emit_push(ir, suffix, ty)?;
        emit_pop(ir, suffix, ty)?;
        emit_peek(ir, suffix, ty)?;
    }

    writeln!(ir, "define void @stack_free() {{")?;
    writeln!(ir, "entry:")?;
    writeln!(ir, "  %buf = load ptr, ptr @stack")?;
    writeln!(ir, "  call void @free(ptr %buf)")?;
    writeln!(ir, "  ret void")?;
    writeln!(ir, "}}")?;
    writeln!(ir)?;

    Ok(())
}

/// `push_<view>`: grow by doubling when full, store at `size`, bump size.
fn emit_push(ir: &mut String, suffix: &str, ty: &str) -> Result<(), CodeGenError> {
    writeln!(ir, "define void @push_{}({} %value) {{", suffix, ty)?;
    writeln!(ir, "entry:")?;
    writeln!(ir, "  %size = load i64, ptr @stack_size")?;
    writeln!(ir, "  %capacity = load i64, ptr @stack_capacity")?;
    writeln!(ir, "  %full = icmp eq i64 %size, %capacity")?;
    writeln!(ir, "  br i1 %full, label %grow, label %store")?;
    writeln!(ir, "grow:")?;
    writeln!(ir, "  %new_capacity = mul i64 %capacity, 2")?;
    writeln!(ir, "  %new_bytes = mul i64 %new_capacity, 8")?;
    writeln!(ir, "  %old_buf = load ptr, ptr @stack")?;
    writeln!(ir, "  %new_buf = call ptr @realloc(ptr %old_buf, i64 %new_bytes)")?;
    writeln!(ir, "  store ptr %new_buf, ptr @stack")?;
    writeln!(ir, "  store i64 %new_capacity, ptr @stack_capacity")?;
    writeln!(ir, "  br label %store")?;
    writeln!(ir, "store:")?;
    writeln!(ir, "  %buf = load ptr, ptr @stack")?;
    writeln!(ir, "  %slot = getelementptr %union.FalseValue, ptr %buf, i64 %size")?;
    writeln!(ir, "  store {} %value, ptr %slot", ty)?;
    writeln!(ir, "  %new_size = add i64 %size, 1")?;
    writeln!(ir, "  store i64 %new_size, ptr @stack_size")?;
    writeln!(ir, "  ret void")?;
    writeln!(ir, "}}")?;
    writeln!(ir)?;
    Ok(())
}

/// `pop_<view>`: shrink size, load from the vacated cell.
fn emit_pop(ir: &mut String, suffix: &str, ty: &str) -> Result<(), CodeGenError> {
    writeln!(ir, "define {} @pop_{}() {{", ty, suffix)?;
    writeln!(ir, "entry:")?;
    writeln!(ir, "  %size = load i64, ptr @stack_size")?;
    writeln!(ir, "  %new_size = sub i64 %size, 1")?;
    writeln!(ir, "  store i64 %new_size, ptr @stack_size")?;
    writeln!(ir, "  %buf = load ptr, ptr @stack")?;
    writeln!(ir, "  %slot = getelementptr %union.FalseValue, ptr %buf, i64 %new_size")?;
    writeln!(ir, "  %value = load {}, ptr %slot", ty)?;
    writeln!(ir, "  ret {} %value", ty)?;
    writeln!(ir, "}}")?;
    writeln!(ir)?;
    Ok(())
}

/// `peek_<view>`: load at `size - depth - 1`. No bounds check.
fn emit_peek(ir: &mut String, suffix: &str, ty: &str) -> Result<(), CodeGenError> {
    writeln!(ir, "define {} @peek_{}(i64 %depth) {{", ty, suffix)?;
    writeln!(ir, "entry:")?;
    writeln!(ir, "  %size = load i64, ptr @stack_size")?;
    writeln!(ir, "  %top = sub i64 %size, 1")?;
    writeln!(ir, "  %index = sub i64 %top, %depth")?;
    writeln!(ir, "  %buf = load ptr, ptr @stack")?;
    writeln!(ir, "  %slot = getelementptr %union.FalseValue, ptr %buf, i64 %index")?;
    writeln!(ir, "  %value = load {}, ptr %slot", ty)?;
    writeln!(ir, "  ret {} %value", ty)?;
    writeln!(ir, "}}")?;
    writeln!(ir)?;
    Ok(())
}
