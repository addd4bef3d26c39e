//! Per-node lowering rules.
//!
//! Every AST kind expands to calls against the runtime stack helpers
//! declared in the prologue. The stack is the only data channel between
//! opcodes; temporaries exist just long enough to move one value between
//! a pop and the next push. Cells are untyped 8-byte slots, so each rule
//! picks the helper view it needs and correctness of the views is the
//! FALSE program's responsibility.

use super::{CodeGen, CodeGenError};
use crate::parser::AstNode;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn codegen_statements(&mut self, nodes: &[AstNode]) -> Result<(), CodeGenError> {
        for node in nodes {
            self.codegen_statement(node)?;
        }
        Ok(())
    }

    pub(super) fn codegen_statement(&mut self, node: &AstNode) -> Result<(), CodeGenError> {
        match node {
            AstNode::Variable(name) => self.codegen_variable(*name),
            AstNode::String(text) => self.codegen_string(text),
            AstNode::Integer(value) => self.codegen_integer(*value),
            AstNode::Quote(body) => self.codegen_quote(body),
            AstNode::GetVar => self.codegen_get_var(),
            AstNode::SetVar => self.codegen_set_var(),
            AstNode::Dup => self.codegen_dup(),
            AstNode::Discard => self.codegen_discard(),
            AstNode::Swap => self.codegen_swap(),
            AstNode::Rotate => self.codegen_rotate(),
            AstNode::Take => self.codegen_take(),
            AstNode::Plus => self.codegen_binary_op("add"),
            AstNode::Minus => self.codegen_binary_op("sub"),
            AstNode::Mul => self.codegen_binary_op("mul"),
            AstNode::Div => self.codegen_binary_op("sdiv"),
            AstNode::BitAnd => self.codegen_binary_op("and"),
            AstNode::BitOr => self.codegen_binary_op("or"),
            AstNode::Negate => self.codegen_negate(),
            AstNode::BitInvert => self.codegen_bit_invert(),
            AstNode::Equal => self.codegen_compare("eq"),
            AstNode::GreaterThan => self.codegen_compare("sgt"),
            AstNode::Execute => self.codegen_execute(),
            AstNode::ExecuteIf => self.codegen_execute_if(),
            AstNode::While => self.codegen_while(),
            AstNode::Getc => self.codegen_getc(),
            AstNode::Putc => self.codegen_putc(),
            AstNode::PrintInt => self.codegen_print_int(),
        }
    }

    /// Push the address of the named variable cell.
    fn codegen_variable(&mut self, name: char) -> Result<(), CodeGenError> {
        writeln!(&mut self.output, "  call void @push_ref(ptr @var_{})", name)?;
        Ok(())
    }

    fn codegen_integer(&mut self, value: i32) -> Result<(), CodeGenError> {
        writeln!(&mut self.output, "  call void @push_int(i32 {})", value)?;
        Ok(())
    }

    /// String literals print immediately; nothing is pushed.
    fn codegen_string(&mut self, text: &str) -> Result<(), CodeGenError> {
        let global = self.intern_string(text)?;
        let result = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = call i32 (ptr, ...) @printf(ptr @.fmt, ptr {})",
            result, global
        )?;
        Ok(())
    }

    fn codegen_quote(&mut self, body: &[AstNode]) -> Result<(), CodeGenError> {
        let name = self.hoist_quotation(body)?;
        writeln!(&mut self.output, "  call void @push_quote(ptr @{})", name)?;
        Ok(())
    }

    /// `;` - pop a variable reference, push the 8-byte value it holds.
    fn codegen_get_var(&mut self) -> Result<(), CodeGenError> {
        let cell = self.fresh_temp();
        let value = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call ptr @pop_ref()", cell)?;
        writeln!(
            &mut self.output,
            "  %{} = load %union.FalseValue, ptr %{}",
            value, cell
        )?;
        writeln!(
            &mut self.output,
            "  call void @push_any(%union.FalseValue %{})",
            value
        )?;
        Ok(())
    }

    /// `:` - pop a variable reference, pop a value, store it.
    fn codegen_set_var(&mut self) -> Result<(), CodeGenError> {
        let cell = self.fresh_temp();
        let value = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call ptr @pop_ref()", cell)?;
        writeln!(
            &mut self.output,
            "  %{} = call %union.FalseValue @pop_any()",
            value
        )?;
        writeln!(
            &mut self.output,
            "  store %union.FalseValue %{}, ptr %{}",
            value, cell
        )?;
        Ok(())
    }

    fn codegen_dup(&mut self) -> Result<(), CodeGenError> {
        let top = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = call %union.FalseValue @peek_any(i64 0)",
            top
        )?;
        writeln!(
            &mut self.output,
            "  call void @push_any(%union.FalseValue %{})",
            top
        )?;
        Ok(())
    }

    fn codegen_discard(&mut self) -> Result<(), CodeGenError> {
        let dropped = self.fresh_temp();
        writeln!(
            &mut self.output,
            "  %{} = call %union.FalseValue @pop_any()",
            dropped
        )?;
        Ok(())
    }

    fn codegen_swap(&mut self) -> Result<(), CodeGenError> {
        let a = self.fresh_temp();
        let b = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call %union.FalseValue @pop_any()", a)?;
        writeln!(&mut self.output, "  %{} = call %union.FalseValue @pop_any()", b)?;
        writeln!(
            &mut self.output,
            "  call void @push_any(%union.FalseValue %{})",
            a
        )?;
        writeln!(
            &mut self.output,
            "  call void @push_any(%union.FalseValue %{})",
            b
        )?;
        Ok(())
    }

    /// `@` - the third value from the top becomes the top.
    fn codegen_rotate(&mut self) -> Result<(), CodeGenError> {
        let a = self.fresh_temp();
        let b = self.fresh_temp();
        let c = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call %union.FalseValue @pop_any()", a)?;
        writeln!(&mut self.output, "  %{} = call %union.FalseValue @pop_any()", b)?;
        writeln!(&mut self.output, "  %{} = call %union.FalseValue @pop_any()", c)?;
        for value in [&b, &a, &c] {
            writeln!(
                &mut self.output,
                "  call void @push_any(%union.FalseValue %{})",
                value
            )?;
        }
        Ok(())
    }

    /// `O` - pop a depth, push a copy of the cell that far down.
    fn codegen_take(&mut self) -> Result<(), CodeGenError> {
        let depth = self.fresh_temp();
        let wide = self.fresh_temp();
        let value = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", depth)?;
        writeln!(&mut self.output, "  %{} = sext i32 %{} to i64", wide, depth)?;
        writeln!(
            &mut self.output,
            "  %{} = call %union.FalseValue @peek_any(i64 %{})",
            value, wide
        )?;
        writeln!(
            &mut self.output,
            "  call void @push_any(%union.FalseValue %{})",
            value
        )?;
        Ok(())
    }

    /// Two-operand 32-bit arithmetic and bitwise ops. The top of the
    /// stack is the right operand.
    fn codegen_binary_op(&mut self, op: &str) -> Result<(), CodeGenError> {
        let rhs = self.fresh_temp();
        let lhs = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", rhs)?;
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", lhs)?;
        writeln!(
            &mut self.output,
            "  %{} = {} i32 %{}, %{}",
            result, op, lhs, rhs
        )?;
        writeln!(&mut self.output, "  call void @push_int(i32 %{})", result)?;
        Ok(())
    }

    fn codegen_negate(&mut self) -> Result<(), CodeGenError> {
        let value = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", value)?;
        writeln!(&mut self.output, "  %{} = sub i32 0, %{}", result, value)?;
        writeln!(&mut self.output, "  call void @push_int(i32 %{})", result)?;
        Ok(())
    }

    fn codegen_bit_invert(&mut self) -> Result<(), CodeGenError> {
        let value = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", value)?;
        writeln!(&mut self.output, "  %{} = xor i32 %{}, -1", result, value)?;
        writeln!(&mut self.output, "  call void @push_int(i32 %{})", result)?;
        Ok(())
    }

    /// Comparisons push FALSE truth values: -1 for true, 0 for false.
    fn codegen_compare(&mut self, cond: &str) -> Result<(), CodeGenError> {
        let rhs = self.fresh_temp();
        let lhs = self.fresh_temp();
        let flag = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", rhs)?;
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", lhs)?;
        writeln!(
            &mut self.output,
            "  %{} = icmp {} i32 %{}, %{}",
            flag, cond, lhs, rhs
        )?;
        writeln!(&mut self.output, "  %{} = sext i1 %{} to i32", result, flag)?;
        writeln!(&mut self.output, "  call void @push_int(i32 %{})", result)?;
        Ok(())
    }

    /// `!` - pop a quotation pointer and call it.
    fn codegen_execute(&mut self) -> Result<(), CodeGenError> {
        let quote = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call ptr @pop_quote()", quote)?;
        writeln!(&mut self.output, "  call void %{}()", quote)?;
        Ok(())
    }

    /// `?` - pop a quotation and a condition; call the quotation when
    /// the condition is non-zero.
    fn codegen_execute_if(&mut self) -> Result<(), CodeGenError> {
        let quote = self.fresh_temp();
        let cond = self.fresh_temp();
        let flag = self.fresh_temp();
        let then_label = self.fresh_label();
        let done_label = self.fresh_label();
        writeln!(&mut self.output, "  %{} = call ptr @pop_quote()", quote)?;
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", cond)?;
        writeln!(&mut self.output, "  %{} = icmp ne i32 %{}, 0", flag, cond)?;
        writeln!(
            &mut self.output,
            "  br i1 %{}, label %{}, label %{}",
            flag, then_label, done_label
        )?;
        writeln!(&mut self.output, "{}:", then_label)?;
        writeln!(&mut self.output, "  call void %{}()", quote)?;
        writeln!(&mut self.output, "  br label %{}", done_label)?;
        writeln!(&mut self.output, "{}:", done_label)?;
        Ok(())
    }

    /// `#` - pop a body quotation and a condition quotation; run the
    /// condition, and while it leaves non-zero on the stack, run the body.
    fn codegen_while(&mut self) -> Result<(), CodeGenError> {
        let body = self.fresh_temp();
        let cond = self.fresh_temp();
        let head_label = self.fresh_label();
        let body_label = self.fresh_label();
        let done_label = self.fresh_label();
        writeln!(&mut self.output, "  %{} = call ptr @pop_quote()", body)?;
        writeln!(&mut self.output, "  %{} = call ptr @pop_quote()", cond)?;
        writeln!(&mut self.output, "  br label %{}", head_label)?;
        writeln!(&mut self.output, "{}:", head_label)?;
        writeln!(&mut self.output, "  call void %{}()", cond)?;
        let flag = self.fresh_temp();
        let nonzero = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", flag)?;
        writeln!(&mut self.output, "  %{} = icmp ne i32 %{}, 0", nonzero, flag)?;
        writeln!(
            &mut self.output,
            "  br i1 %{}, label %{}, label %{}",
            nonzero, body_label, done_label
        )?;
        writeln!(&mut self.output, "{}:", body_label)?;
        writeln!(&mut self.output, "  call void %{}()", body)?;
        writeln!(&mut self.output, "  br label %{}", head_label)?;
        writeln!(&mut self.output, "{}:", done_label)?;
        Ok(())
    }

    fn codegen_getc(&mut self) -> Result<(), CodeGenError> {
        let value = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @getchar()", value)?;
        writeln!(&mut self.output, "  call void @push_int(i32 %{})", value)?;
        Ok(())
    }

    fn codegen_putc(&mut self) -> Result<(), CodeGenError> {
        let value = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", value)?;
        writeln!(
            &mut self.output,
            "  %{} = call i32 @putchar(i32 %{})",
            result, value
        )?;
        Ok(())
    }

    fn codegen_print_int(&mut self) -> Result<(), CodeGenError> {
        let value = self.fresh_temp();
        let result = self.fresh_temp();
        writeln!(&mut self.output, "  %{} = call i32 @pop_int()", value)?;
        writeln!(
            &mut self.output,
            "  %{} = call i32 (ptr, ...) @printf(ptr @.num, i32 %{})",
            result, value
        )?;
        Ok(())
    }
}
