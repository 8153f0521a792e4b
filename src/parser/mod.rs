//! C source front end
//!
//! This module turns C source text into a checked program in one pass:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`token_stream`]: Peekable cursor over the finished tokens
//! - [`parse`]: The [`parse::Parser`] and its recovery machinery, with the
//!   grammar split across `declarations`, `statements` and `expressions`
//!
//! # Supported C Subset
//!
//! - Types: `void char short int long float double` (with `signed`/`unsigned`),
//!   structs, pointers, one-dimensional arrays
//! - Statements: declarations, assignments, `if`, `while`, `do`, `for`,
//!   `switch`, `break`, `continue`, `return`, `printf`, `scanf`
//! - Expressions: arithmetic, relational, logical, ternary, unary, member
//!   access, subscripts, calls, `sizeof`
//! - Preprocessor directives are kept as single tokens and otherwise ignored
//! - No typedefs, unions, enums, bitwise expressions or function pointers
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent. No tree is built; names and types are
//! resolved while the tokens are consumed.

mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
pub mod token_stream;
