//! # Introduction
//!
//! csema is the front end of a compiler for a reduced C dialect. It tokenizes
//! source text, parses it by recursive descent and, in the same pass, resolves
//! every name against lexical scopes and checks the types of every expression.
//! The result is a list of diagnostics; no code is generated.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → TokenStream → Parser (+ SymbolTable) → Diagnostics
//! ```
//!
//! 1. [`parser::lexer`]: classifies characters into tokens, reporting lexical
//!    errors and carrying on.
//! 2. [`parser::token_stream`]: peekable cursor that yields EOF forever.
//! 3. [`parser::parse`]: grammar procedures that infer a [`semantic::types::Type`]
//!    for every expression and recover from syntax errors at `;` and `}`.
//! 4. [`semantic`]: scopes, function/struct registries, the promotion lattice
//!    and `printf`/`scanf` format checking.
//! 5. [`diagnostics`]: collects errors and forwards them to a sink.
//!
//! ## Example
//!
//! ```
//! let diagnostics = csema::analyze("int main() { int x; y = 5; }");
//! assert_eq!(diagnostics.count(), 1);
//! ```

pub mod diagnostics;
pub mod parser;
pub mod semantic;

use diagnostics::Diagnostics;
use parser::lexer::{LexTable, Lexer};
use parser::parse::Parser;
use parser::token_stream::TokenStream;

/// Analyze `source`, collecting diagnostics without printing them
pub fn analyze(source: &str) -> Diagnostics {
    analyze_with(source, Diagnostics::new())
}

/// Analyze `source`, reporting into the given collector
pub fn analyze_with(source: &str, mut diagnostics: Diagnostics) -> Diagnostics {
    let table = LexTable::new();
    let tokens = Lexer::new(source, &table).tokenize(&mut diagnostics);
    Parser::new(TokenStream::new(tokens), &mut diagnostics).parse();
    diagnostics
}
