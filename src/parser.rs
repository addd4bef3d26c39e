//! Recursive-descent parser for FALSE.
//!
//! The grammar is flat apart from quotations:
//! ```text
//! Program    := Statement*
//! Statement  := Atom | '[' Statement* ']'
//! ```
//! Quotations nest to arbitrary depth and become [`AstNode::Quote`]
//! subtrees. `B` (flush) is recognized and dropped; the inline-assembly
//! form is rejected here rather than carried into the AST.

use crate::lexer::{Lexer, Token};

/// A node of the FALSE syntax tree.
///
/// The derived `PartialEq` is full structural equality - kinds and
/// payloads node for node, descending into nested quotation bodies -
/// which is what quotation deduplication in the code generator relies on.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Variable(char),
    String(String),
    Integer(i32),
    Quote(Vec<AstNode>),
    GetVar,
    SetVar,
    Dup,
    Discard,
    Swap,
    Rotate,
    Take,
    Plus,
    Minus,
    Mul,
    Div,
    Negate,
    BitAnd,
    BitOr,
    BitInvert,
    Equal,
    GreaterThan,
    Execute,
    ExecuteIf,
    While,
    Getc,
    Putc,
    PrintInt,
}

/// Parser over the lexer's token stream. One pulled token at a time is
/// all the lookahead the grammar needs.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            lexer: Lexer::new(source),
        }
    }

    /// Parse the top-level statement sequence.
    pub fn parse(&mut self) -> Result<Vec<AstNode>, String> {
        self.parse_sequence(false)
    }

    /// Parse statements until `]` or end of input.
    ///
    /// At the top level a `]` simply terminates the program; inside a
    /// quotation it closes the active `Quote`, and end of input before
    /// the closing bracket is an error.
    fn parse_sequence(&mut self, inside_quote: bool) -> Result<Vec<AstNode>, String> {
        let mut statements = Vec::new();

        loop {
            let token = match self.advance()? {
                Some(token) => token,
                None => {
                    if inside_quote {
                        return Err("unexpected end of input".to_string());
                    }
                    return Ok(statements);
                }
            };

            let node = match token {
                Token::OpenBracket => AstNode::Quote(self.parse_sequence(true)?),
                Token::CloseBracket => return Ok(statements),
                Token::Flush => continue,
                Token::Asm => {
                    return match self.advance()? {
                        Some(Token::Integer(_)) => Err("assembly not supported".to_string()),
                        _ => Err("syntax error: expected a short".to_string()),
                    };
                }
                Token::Variable(name) => AstNode::Variable(name),
                Token::String(text) => AstNode::String(text),
                Token::Integer(value) => AstNode::Integer(value),
                Token::GetVar => AstNode::GetVar,
                Token::SetVar => AstNode::SetVar,
                Token::Dup => AstNode::Dup,
                Token::Discard => AstNode::Discard,
                Token::Swap => AstNode::Swap,
                Token::Rotate => AstNode::Rotate,
                Token::Take => AstNode::Take,
                Token::Plus => AstNode::Plus,
                Token::Minus => AstNode::Minus,
                Token::Mul => AstNode::Mul,
                Token::Div => AstNode::Div,
                Token::Negate => AstNode::Negate,
                Token::BitAnd => AstNode::BitAnd,
                Token::BitOr => AstNode::BitOr,
                Token::BitInvert => AstNode::BitInvert,
                Token::Equal => AstNode::Equal,
                Token::GreaterThan => AstNode::GreaterThan,
                Token::Execute => AstNode::Execute,
                Token::ExecuteIf => AstNode::ExecuteIf,
                Token::While => AstNode::While,
                Token::Getc => AstNode::Getc,
                Token::Putc => AstNode::Putc,
                Token::PrintInt => AstNode::PrintInt,
            };
            statements.push(node);
        }
    }

    /// Consume and return the next token.
    fn advance(&mut self) -> Result<Option<Token>, String> {
        self.lexer.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Vec<AstNode>, String> {
        Parser::new(source).parse()
    }

    /// Count every `Quote` node in a tree, including nested ones.
    fn count_quotes(nodes: &[AstNode]) -> usize {
        nodes
            .iter()
            .map(|node| match node {
                AstNode::Quote(body) => 1 + count_quotes(body),
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_parse_flat_program() {
        let program = parse("1 2+.").unwrap();
        assert_eq!(
            program,
            vec![
                AstNode::Integer(1),
                AstNode::Integer(2),
                AstNode::Plus,
                AstNode::PrintInt,
            ]
        );
    }

    #[test]
    fn test_parse_quotation() {
        let program = parse("[1.]!").unwrap();
        assert_eq!(
            program,
            vec![
                AstNode::Quote(vec![AstNode::Integer(1), AstNode::PrintInt]),
                AstNode::Execute,
            ]
        );
    }

    #[test]
    fn test_parse_nested_quotations() {
        let program = parse("[[1]]").unwrap();
        assert_eq!(
            program,
            vec![AstNode::Quote(vec![AstNode::Quote(vec![
                AstNode::Integer(1)
            ])])]
        );
    }

    #[test]
    fn test_parse_quote_count_matches_brackets() {
        let program = parse("[$0>][$.1-]# [[2]]").unwrap();
        assert_eq!(count_quotes(&program), 4);
    }

    #[test]
    fn test_parse_countdown_loop() {
        let program = parse("[$0>][$.1-]#%").unwrap();
        assert_eq!(
            program,
            vec![
                AstNode::Quote(vec![
                    AstNode::Dup,
                    AstNode::Integer(0),
                    AstNode::GreaterThan,
                ]),
                AstNode::Quote(vec![
                    AstNode::Dup,
                    AstNode::PrintInt,
                    AstNode::Integer(1),
                    AstNode::Minus,
                ]),
                AstNode::While,
                AstNode::Discard,
            ]
        );
    }

    #[test]
    fn test_parse_flush_dropped() {
        let program = parse("1B2").unwrap();
        assert_eq!(program, vec![AstNode::Integer(1), AstNode::Integer(2)]);
    }

    #[test]
    fn test_parse_asm_rejected() {
        let err = parse("`7").unwrap_err();
        assert!(err.contains("assembly not supported"));
    }

    #[test]
    fn test_parse_asm_missing_operand() {
        let err = parse("`").unwrap_err();
        assert!(err.contains("syntax error: expected a short"));
    }

    #[test]
    fn test_parse_unclosed_quotation() {
        let err = parse("[1").unwrap_err();
        assert!(err.contains("unexpected end of input"));
    }

    #[test]
    fn test_parse_close_bracket_ends_input() {
        // A stray `]` at the outermost depth terminates parsing.
        let program = parse("1]2").unwrap();
        assert_eq!(program, vec![AstNode::Integer(1)]);
    }

    #[test]
    fn test_parse_lex_errors_propagate() {
        let err = parse("{oops").unwrap_err();
        assert!(err.contains("unclosed comment"));
    }
}
