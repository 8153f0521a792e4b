//! Cursor over a finished token sequence
//!
//! The stream never runs out: reading at or past the end yields an EOF token,
//! and the cursor only ever moves forward.

use crate::parser::lexer::{SourceLocation, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: usize,
    eof: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof_location = tokens
            .last()
            .map(|t| t.location)
            .unwrap_or_else(|| SourceLocation::new(1, 1));
        Self {
            tokens,
            pos: 0,
            eof: Token::eof(eof_location),
        }
    }

    /// Token under the cursor
    pub fn current(&self) -> &Token {
        self.peek(1)
    }

    /// Token `k` places ahead, where `peek(1)` is the current token
    pub fn peek(&self, k: usize) -> &Token {
        self.tokens
            .get(self.pos + k.saturating_sub(1))
            .unwrap_or(&self.eof)
    }

    /// Move past the current token and return it
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub fn is_at_end(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, lexeme: &str, column: usize) -> Token {
        Token::new(kind, lexeme, SourceLocation::new(1, column))
    }

    #[test]
    fn test_peek_does_not_move_cursor() {
        let stream = TokenStream::new(vec![
            token(TokenKind::Int, "int", 1),
            token(TokenKind::Ident, "x", 5),
        ]);

        assert_eq!(stream.peek(1).kind, TokenKind::Int);
        assert_eq!(stream.peek(2).kind, TokenKind::Ident);
        assert_eq!(stream.peek(3).kind, TokenKind::Eof);
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_advance_clamps_at_end() {
        let mut stream = TokenStream::new(vec![token(TokenKind::Semicolon, ";", 1)]);

        assert_eq!(stream.advance().kind, TokenKind::Semicolon);
        assert!(stream.is_at_end());
        assert_eq!(stream.advance().kind, TokenKind::Eof);
        assert_eq!(stream.advance().kind, TokenKind::Eof);
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn test_empty_stream_is_eof() {
        let stream = TokenStream::new(Vec::new());
        assert!(stream.is_at_end());
        assert_eq!(stream.current().location, SourceLocation::new(1, 1));
    }
}
