//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the syntax error type, the token
//! helpers shared by every grammar procedure, and the recovery machinery.
//!
//! # Parser Architecture
//!
//! The Parser is a predictive recursive-descent analyzer. It builds no tree:
//! each procedure checks the grammar and, in the same pass, resolves names
//! against the [`SymbolTable`] and infers expression types.
//! - This module: Parser struct, helper methods, recovery and coordination
//! - `declarations`: structs, functions, parameters and variable declarations
//! - `statements`: control flow, assignments, `printf`/`scanf`, blocks
//! - `expressions`: the precedence ladder, each level returning a [`Type`]
//!
//! # Error Recovery
//!
//! A syntax error is a [`SyntaxError`] that unwinds with `?` to the nearest
//! statement-level loop (top level, block, struct body, switch body). That loop
//! reports it and skips to the next `;` or `}` (consumed) or end of file.
//! Semantic errors are reported in place and never unwind; the offending
//! expression takes the unknown type instead.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::diagnostics::{Diagnostics, Severity};
use crate::parser::lexer::{SourceLocation, Token, TokenKind};
use crate::parser::token_stream::TokenStream;
use crate::semantic::symbols::SymbolTable;
use crate::semantic::types::Type;
use std::fmt;

/// Parser error type
#[derive(Debug, Clone)]
pub struct SyntaxError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Syntax error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for SyntaxError {}

pub type PResult<T> = Result<T, SyntaxError>;

/// Function whose body is being analyzed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub(crate) name: String,
    pub(crate) return_type: Type,
}

/// Recursive descent parser and semantic analyzer
pub struct Parser<'d> {
    pub(crate) stream: TokenStream,
    pub(crate) symbols: SymbolTable,
    pub(crate) diagnostics: &'d mut Diagnostics,
    pub(crate) current_function: Option<FunctionContext>,
    pub(crate) current_struct: Option<String>,
    pub(crate) loop_depth: usize,
    pub(crate) switch_depth: usize,
}

impl<'d> Parser<'d> {
    pub fn new(stream: TokenStream, diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            stream,
            symbols: SymbolTable::new(),
            diagnostics,
            current_function: None,
            current_struct: None,
            loop_depth: 0,
            switch_depth: 0,
        }
    }

    /// Analyze the whole token stream and return the total error count
    ///
    /// The count includes anything already reported to the diagnostics (for
    /// example by the lexer that produced the stream).
    pub fn parse(&mut self) -> usize {
        self.symbols.open_scope();
        self.program();
        self.symbols.close_scope();
        self.diagnostics.count()
    }

    /// Functions and structs registered so far
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn position(&self) -> usize {
        self.stream.position()
    }

    // ===== Helper methods =====

    pub(crate) fn kind(&self) -> TokenKind {
        self.stream.current().kind
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Check the token `k` places ahead (`1` is the current token)
    pub(crate) fn check_ahead(&self, k: usize, kind: TokenKind) -> bool {
        self.stream.peek(k).kind == kind
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.stream.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> Token {
        self.stream.advance()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.stream.is_at_end()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.stream.current().location
    }

    /// Syntax error at the current token
    pub(crate) fn error_here(&self, message: impl fmt::Display) -> SyntaxError {
        SyntaxError {
            message: format!("{}, found {}", message, self.stream.current()),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, context: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_here(format!("Expected {} {}", kind, context)))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, context: &str) -> PResult<Token> {
        self.expect(TokenKind::Semicolon, context)
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> PResult<Token> {
        self.expect(TokenKind::Ident, context)
    }

    pub(crate) fn semantic_error(&mut self, message: impl Into<String>, location: SourceLocation) {
        self.diagnostics.report(Severity::Semantic, message, location);
    }

    /// Report a syntax error and resynchronize on the next statement boundary
    pub(crate) fn recover(&mut self, error: SyntaxError) {
        self.diagnostics
            .report(Severity::Syntax, error.message, error.location);
        self.synchronize();
    }

    /// Skip to `;` or `}` and consume it; stop without consuming at EOF
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() {
            let token = self.advance();
            if matches!(token.kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }
        }
    }

    /// Run `body` inside a fresh scope, closing it even when `body` fails
    pub(crate) fn scoped<T>(&mut self, body: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.symbols.open_scope();
        let result = body(self);
        self.symbols.close_scope();
        result
    }

    pub(crate) fn in_loop<T>(&mut self, body: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        self.loop_depth += 1;
        let result = body(self);
        self.loop_depth -= 1;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostic;
    use crate::parser::lexer::tokenize;
    use crate::semantic::types::BaseType;

    fn analyze(source: &str) -> (usize, Vec<Diagnostic>) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        let errors = Parser::new(TokenStream::new(tokens), &mut diagnostics).parse();
        (errors, diagnostics.records().to_vec())
    }

    fn semantic_messages(source: &str) -> Vec<String> {
        analyze(source)
            .1
            .into_iter()
            .filter(|d| d.severity == Severity::Semantic)
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn test_declare_then_assign() {
        let (errors, _) = analyze("int main() { int x; x = 5; }");
        assert_eq!(errors, 0);
    }

    #[test]
    fn test_undeclared_variable() {
        let (errors, records) = analyze("int main() { int x; y = 5; }");
        assert_eq!(errors, 1);
        assert_eq!(records[0].severity, Severity::Semantic);
        assert_eq!(records[0].message, "Variable 'y' undeclared");
        assert_eq!(records[0].location, SourceLocation::new(1, 21));
    }

    #[test]
    fn test_call_arity_mismatch() {
        let (errors, records) =
            analyze("int foo(int a){ return a; } int main(){ foo(1,2); }");
        assert_eq!(errors, 1);
        assert_eq!(
            records[0].message,
            "Wrong number of arguments to 'foo': expected 1, provided 2"
        );
    }

    #[test]
    fn test_arrow_on_struct_value() {
        let source = "struct Point{int x; int y;}; \
                      int main() { struct Point p; p.x = 1; p->y = 2; }";
        let messages = semantic_messages(source);
        assert_eq!(analyze(source).0, 1);
        assert!(messages[0].contains("'->'"), "{}", messages[0]);
    }

    #[test]
    fn test_dot_access_alone_is_clean() {
        let source = "struct Point{int x; int y;}; int main() { struct Point p; p.x = 1; }";
        assert_eq!(analyze(source).0, 0);
    }

    #[test]
    fn test_unterminated_string_completes() {
        let (_, records) = analyze("int main() { printf(\"hi); }");
        assert!(records.iter().any(|d| d.severity == Severity::Lexical));
    }

    #[test]
    fn test_prebuilt_token_stream() {
        let loc = SourceLocation::new(1, 1);
        let tokens = vec![
            Token::new(TokenKind::Int, "int", loc),
            Token::new(TokenKind::Ident, "g", loc),
            Token::new(TokenKind::Semicolon, ";", loc),
        ];
        let mut diagnostics = Diagnostics::new();
        let mut parser = Parser::new(TokenStream::new(tokens), &mut diagnostics);
        assert_eq!(parser.parse(), 0);
        assert_eq!(parser.position(), 3);
    }

    #[test]
    fn test_symbols_after_parse() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(
            "struct Node { int value; struct Node *next; }; \
             double scale(double v, int k) { return v * k; }",
            &mut diagnostics,
        );
        let mut parser = Parser::new(TokenStream::new(tokens), &mut diagnostics);
        assert_eq!(parser.parse(), 0);

        let symbols = parser.symbols();
        let scale = symbols.lookup_function("scale").unwrap();
        assert_eq!(scale.return_type, Type::new(BaseType::Double));
        assert_eq!(scale.parameters.len(), 2);
        assert_eq!(
            symbols.field_type("Node", "next"),
            Some(&Type::new(BaseType::Struct("Node".to_string())).with_pointer())
        );
        assert_eq!(symbols.scope_depth(), 0);
    }

    #[test]
    fn test_syntax_error_recovers_at_semicolon() {
        let (errors, records) = analyze("int main() { int x; x = ; x = 2; }");
        assert_eq!(errors, 1);
        assert_eq!(records[0].severity, Severity::Syntax);
    }

    #[test]
    fn test_invalid_global_declaration() {
        let (errors, records) = analyze("x = 1; int y;");
        assert_eq!(errors, 1);
        assert!(records[0]
            .message
            .starts_with("Expected a declaration at global scope"));
    }
}
