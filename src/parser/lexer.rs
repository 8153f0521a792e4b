//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] sequence consumed by the
//! parser. The lexer never stops on bad input: malformed literals, unterminated
//! strings and stray characters are reported to [`Diagnostics`] as lexical
//! errors and scanning resumes after them.
//!
//! Keywords and operators come from a single immutable [`LexTable`], built
//! once and borrowed by every lexer. Operators are matched by maximal munch
//! with up to three characters of lookahead, so `<<=` wins over `<<` and `<`.

use crate::diagnostics::{Diagnostics, Severity};
use rustc_hash::FxHashMap;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Every kind of token the lexer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    Ident,
    Directive,

    // Type keywords
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Struct,

    // Qualifiers and storage classes
    Const,
    Static,
    Extern,
    Volatile,
    Register,
    Inline,

    // Other keywords
    If,
    Else,
    While,
    Do,
    For,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Goto,
    Sizeof,
    Typedef,
    Enum,
    Union,
    Main,

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    ShlEq,     // <<=
    ShrEq,     // >>=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=

    // Relational and logical
    EqEq,   // ==
    NotEq,  // !=
    Lt,     // <
    Le,     // <=
    Gt,     // >
    Ge,     // >=
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Punctuation
    Dot,
    Arrow,
    Question,
    Colon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,

    Eof,
}

/// Coarse lexical category of a [`TokenKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    Operator,
    Punctuation,
    Directive,
    Eof,
}

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("void", TokenKind::Void),
    ("char", TokenKind::Char),
    ("short", TokenKind::Short),
    ("int", TokenKind::Int),
    ("long", TokenKind::Long),
    ("float", TokenKind::Float),
    ("double", TokenKind::Double),
    ("signed", TokenKind::Signed),
    ("unsigned", TokenKind::Unsigned),
    ("struct", TokenKind::Struct),
    ("const", TokenKind::Const),
    ("static", TokenKind::Static),
    ("extern", TokenKind::Extern),
    ("volatile", TokenKind::Volatile),
    ("register", TokenKind::Register),
    ("inline", TokenKind::Inline),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("for", TokenKind::For),
    ("switch", TokenKind::Switch),
    ("case", TokenKind::Case),
    ("default", TokenKind::Default),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("return", TokenKind::Return),
    ("goto", TokenKind::Goto),
    ("sizeof", TokenKind::Sizeof),
    ("typedef", TokenKind::Typedef),
    ("enum", TokenKind::Enum),
    ("union", TokenKind::Union),
    ("main", TokenKind::Main),
];

const OPERATORS: &[(&str, TokenKind)] = &[
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("=", TokenKind::Eq),
    ("+=", TokenKind::PlusEq),
    ("-=", TokenKind::MinusEq),
    ("*=", TokenKind::StarEq),
    ("/=", TokenKind::SlashEq),
    ("%=", TokenKind::PercentEq),
    ("<<=", TokenKind::ShlEq),
    (">>=", TokenKind::ShrEq),
    ("&=", TokenKind::AmpEq),
    ("|=", TokenKind::PipeEq),
    ("^=", TokenKind::CaretEq),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<", TokenKind::Lt),
    ("<=", TokenKind::Le),
    (">", TokenKind::Gt),
    (">=", TokenKind::Ge),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("!", TokenKind::Bang),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("~", TokenKind::Tilde),
    ("<<", TokenKind::LtLt),
    (">>", TokenKind::GtGt),
    (".", TokenKind::Dot),
    ("->", TokenKind::Arrow),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("[", TokenKind::LBracket),
    ("]", TokenKind::RBracket),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
];

impl TokenKind {
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            IntLiteral => TokenCategory::IntLiteral,
            FloatLiteral => TokenCategory::FloatLiteral,
            CharLiteral => TokenCategory::CharLiteral,
            StringLiteral => TokenCategory::StringLiteral,
            Ident => TokenCategory::Identifier,
            Directive => TokenCategory::Directive,
            Eof => TokenCategory::Eof,
            Void | Char | Short | Int | Long | Float | Double | Signed | Unsigned | Struct
            | Const | Static | Extern | Volatile | Register | Inline | If | Else | While
            | Do | For | Switch | Case | Default | Break | Continue | Return | Goto
            | Sizeof | Typedef | Enum | Union | Main => TokenCategory::Keyword,
            Dot | Arrow | Question | Colon | LParen | RParen | LBrace | RBrace | LBracket
            | RBracket | Semicolon | Comma => TokenCategory::Punctuation,
            _ => TokenCategory::Operator,
        }
    }

    /// Keywords that can start a base type specifier
    pub fn is_type_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Void | Char | Short | Int | Long | Float | Double | Signed | Unsigned
        )
    }

    /// Qualifiers and storage classes accepted (and otherwise ignored) before a type
    pub fn is_qualifier(self) -> bool {
        use TokenKind::*;
        matches!(self, Const | Static | Extern | Volatile | Register | Inline)
    }

    fn spelling(self) -> Option<&'static str> {
        KEYWORDS
            .iter()
            .chain(OPERATORS.iter())
            .find(|(_, kind)| *kind == self)
            .map(|(text, _)| *text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral => write!(f, "integer literal"),
            TokenKind::FloatLiteral => write!(f, "float literal"),
            TokenKind::CharLiteral => write!(f, "char literal"),
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::Directive => write!(f, "preprocessor directive"),
            TokenKind::Eof => write!(f, "end of file"),
            other => match other.spelling() {
                Some(text) => write!(f, "'{}'", text),
                None => write!(f, "{:?}", other),
            },
        }
    }
}

/// A classified lexeme with its starting position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, "", location)
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => write!(f, "{} {}", self.kind, self.lexeme),
            TokenKind::Directive => write!(f, "directive '{}'", self.lexeme),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Reserved words and the operator table, keyed by leading character
#[derive(Debug, Clone)]
pub struct LexTable {
    keywords: FxHashMap<&'static str, TokenKind>,
    operators: FxHashMap<char, Vec<(&'static str, TokenKind)>>,
}

impl LexTable {
    pub fn new() -> Self {
        let keywords = KEYWORDS.iter().copied().collect();

        let mut operators: FxHashMap<char, Vec<(&'static str, TokenKind)>> =
            FxHashMap::default();
        for &(text, kind) in OPERATORS {
            if let Some(lead) = text.chars().next() {
                operators.entry(lead).or_default().push((text, kind));
            }
        }
        // Longest candidates first so the first hit is the maximal munch
        for candidates in operators.values_mut() {
            candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }

        Self {
            keywords,
            operators,
        }
    }

    pub fn keyword(&self, word: &str) -> Option<TokenKind> {
        self.keywords.get(word).copied()
    }

    /// Longest operator that is a prefix of `chars`, with its length
    pub fn match_operator(&self, chars: &[char]) -> Option<(TokenKind, usize)> {
        let lead = chars.first()?;
        self.operators.get(lead)?.iter().find_map(|(text, kind)| {
            let len = text.chars().count();
            let matches = len <= chars.len() && text.chars().zip(chars).all(|(a, b)| a == *b);
            matches.then_some((*kind, len))
        })
    }
}

impl Default for LexTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Character-level scanner over one source text
pub struct Lexer<'t> {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    table: &'t LexTable,
}

impl<'t> Lexer<'t> {
    pub fn new(input: &str, table: &'t LexTable) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            table,
        }
    }

    /// Scan the whole input. The result always ends with one EOF token.
    pub fn tokenize(&mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let token = match ch {
                c if c.is_whitespace() => {
                    self.advance();
                    None
                }
                '#' => Some(self.directive(diagnostics)),
                '/' if matches!(self.peek_ahead(1), Some('/') | Some('*')) => {
                    self.skip_comment();
                    None
                }
                c if c.is_alphabetic() || c == '_' => Some(self.identifier_or_keyword()),
                c if c.is_ascii_digit() => self.number_literal(diagnostics),
                '"' => self.string_literal(diagnostics),
                '\'' => self.char_literal(diagnostics),
                _ => self.operator(diagnostics),
            };
            tokens.extend(token);
        }

        tokens.push(Token::eof(self.current_location()));
        tokens
    }

    fn directive(&mut self, diagnostics: &mut Diagnostics) -> Token {
        let start = self.current_location();
        let mut lexeme = String::from('#');
        self.advance();

        while let Some(ch) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            lexeme.push(ch);
            self.advance();
        }
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }

        match self.peek() {
            Some(open @ ('<' | '"')) => {
                let close = if open == '<' { '>' } else { '"' };
                lexeme.push(' ');
                lexeme.push(open);
                self.advance();

                while let Some(ch) = self.peek().filter(|c| *c != close && *c != '\n') {
                    lexeme.push(ch);
                    self.advance();
                }

                if self.peek() == Some(close) {
                    lexeme.push(close);
                    self.advance();
                } else {
                    diagnostics.report(
                        Severity::Lexical,
                        format!("Unterminated directive '{}': expected '{}'", lexeme, close),
                        start,
                    );
                }
            }
            _ => {
                // #define and friends: the payload runs to end of line
                let mut payload = String::new();
                while let Some(ch) = self.peek().filter(|c| *c != '\n') {
                    payload.push(ch);
                    self.advance();
                }
                let payload = payload.trim_end();
                if !payload.is_empty() {
                    lexeme.push(' ');
                    lexeme.push_str(payload);
                }
            }
        }

        Token::new(TokenKind::Directive, lexeme, start)
    }

    fn skip_comment(&mut self) {
        self.advance(); // skip '/'
        if self.advance() == Some('/') {
            while self.peek().is_some_and(|c| c != '\n') {
                self.advance();
            }
            return;
        }

        // Block comment; an unterminated one simply runs to end of input
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }
    }

    fn identifier_or_keyword(&mut self) -> Token {
        let start = self.current_location();
        let mut lexeme = String::new();

        while let Some(ch) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            lexeme.push(ch);
            self.advance();
        }

        let kind = self.table.keyword(&lexeme).unwrap_or(TokenKind::Ident);
        Token::new(kind, lexeme, start)
    }

    fn number_literal(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.current_location();
        let mut lexeme = String::new();
        let mut kind = TokenKind::IntLiteral;

        self.take_digits(&mut lexeme);

        if self.peek() == Some('.') {
            lexeme.push('.');
            self.advance();
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                diagnostics.report(
                    Severity::Lexical,
                    format!("Malformed float literal '{}': expected digit after '.'", lexeme),
                    start,
                );
                return None;
            }
            self.take_digits(&mut lexeme);
            kind = TokenKind::FloatLiteral;
        }

        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            while let Some(ch) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
                lexeme.push(ch);
                self.advance();
            }
            diagnostics.report(
                Severity::Lexical,
                format!("Invalid numeric literal '{}'", lexeme),
                start,
            );
            return None;
        }

        Some(Token::new(kind, lexeme, start))
    }

    fn take_digits(&mut self, lexeme: &mut String) {
        while let Some(ch) = self.peek().filter(|c| c.is_ascii_digit()) {
            lexeme.push(ch);
            self.advance();
        }
    }

    fn string_literal(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.current_location();
        let mut lexeme = String::from('"');
        self.advance();

        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    lexeme.push(ch);
                    self.advance();
                    return Some(Token::new(TokenKind::StringLiteral, lexeme, start));
                }
                '\n' => break,
                '\\' => {
                    lexeme.push(ch);
                    self.advance();
                    if let Some(escaped) = self.peek().filter(|c| *c != '\n') {
                        lexeme.push(escaped);
                        self.advance();
                    }
                }
                _ => {
                    lexeme.push(ch);
                    self.advance();
                }
            }
        }

        diagnostics.report(Severity::Lexical, "Unterminated string literal", start);
        None
    }

    fn char_literal(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.current_location();
        let mut lexeme = String::from('\'');
        self.advance();

        match self.peek() {
            Some('\'') => {
                self.advance();
                diagnostics.report(Severity::Lexical, "Empty character literal", start);
                return None;
            }
            Some('\\') => {
                lexeme.push('\\');
                self.advance();
                if let Some(escaped) = self.peek().filter(|c| *c != '\n') {
                    lexeme.push(escaped);
                    self.advance();
                }
            }
            Some(ch) if ch != '\n' => {
                lexeme.push(ch);
                self.advance();
            }
            _ => {}
        }

        if self.peek() == Some('\'') {
            lexeme.push('\'');
            self.advance();
            Some(Token::new(TokenKind::CharLiteral, lexeme, start))
        } else {
            diagnostics.report(Severity::Lexical, "Unterminated character literal", start);
            None
        }
    }

    fn operator(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.current_location();
        let end = (self.position + 3).min(self.input.len());
        let window = &self.input[self.position..end];

        match self.table.match_operator(window) {
            Some((kind, len)) => {
                let lexeme: String = window[..len].iter().collect();
                for _ in 0..len {
                    self.advance();
                }
                Some(Token::new(kind, lexeme, start))
            }
            None => {
                let ch = self.advance();
                diagnostics.report(
                    Severity::Lexical,
                    format!("Unrecognized character '{}'", ch.unwrap_or_default()),
                    start,
                );
                None
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

/// Tokenize `source` with the standard table
pub fn tokenize(source: &str, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let table = LexTable::new();
    Lexer::new(source, &table).tokenize(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> (Vec<TokenKind>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(source, &mut diagnostics);
        (tokens.into_iter().map(|t| t.kind).collect(), diagnostics)
    }

    #[test]
    fn test_simple_tokens() {
        let (kinds, diagnostics) = kinds("int main() { return 0; }");

        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Main,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_operators_maximal_munch() {
        let (kinds, _) = kinds("<<= << <= < -> -- -= ++ && ||");

        assert_eq!(
            kinds,
            vec![
                TokenKind::ShlEq,
                TokenKind::LtLt,
                TokenKind::Le,
                TokenKind::Lt,
                TokenKind::Arrow,
                TokenKind::MinusMinus,
                TokenKind::MinusEq,
                TokenKind::PlusPlus,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_adjacent_operators_without_spaces() {
        let (kinds, _) = kinds("a+++b");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_division() {
        let (kinds, _) = kinds("a / b; // comment\nc /= 2; /* block\ncomment */ d");

        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::SlashEq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_is_silent() {
        let (kinds, diagnostics) = kinds("int x; /* never closed");
        assert_eq!(kinds.len(), 4);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_directives() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(
            "#include <stdio.h>\n#include \"util.h\"\n#define LIMIT 10\nint x;",
            &mut diagnostics,
        );

        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[0].lexeme, "#include <stdio.h>");
        assert_eq!(tokens[1].lexeme, "#include \"util.h\"");
        assert_eq!(tokens[2].lexeme, "#define LIMIT 10");
        assert_eq!(tokens[3].kind, TokenKind::Int);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_directive_still_produces_token() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("#include <stdio.h\nint x;", &mut diagnostics);

        assert_eq!(tokens[0].kind, TokenKind::Directive);
        assert_eq!(tokens[1].kind, TokenKind::Int);
        assert_eq!(diagnostics.count_of(Severity::Lexical), 1);
    }

    #[test]
    fn test_numbers() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("42 3.14 7", &mut diagnostics);

        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[0].lexeme, "42");
        assert_eq!(tokens[1].kind, TokenKind::FloatLiteral);
        assert_eq!(tokens[1].lexeme, "3.14");
        assert_eq!(tokens[2].kind, TokenKind::IntLiteral);
    }

    #[test]
    fn test_malformed_numbers_are_skipped() {
        let (kinds, diagnostics) = kinds("x = 12ab; y = 3.;");

        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(diagnostics.count_of(Severity::Lexical), 2);
    }

    #[test]
    fn test_string_and_char_literals() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(r#""say \"hi\"\n" 'a' '\n'"#, &mut diagnostics);

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].lexeme, r#""say \"hi\"\n""#);
        assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[1].lexeme, "'a'");
        assert_eq!(tokens[2].lexeme, "'\\n'");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_string_recovers_on_next_line() {
        let (kinds, diagnostics) = kinds("printf(\"hi);\nx = 1;");

        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::IntLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(diagnostics.count_of(Severity::Lexical), 1);
    }

    #[test]
    fn test_bad_char_literals() {
        let (_, diagnostics) = kinds("'' 'a");
        assert_eq!(diagnostics.count_of(Severity::Lexical), 2);
    }

    #[test]
    fn test_unrecognized_character_is_skipped() {
        let (kinds, diagnostics) = kinds("int @x;");

        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        assert_eq!(diagnostics.records()[0].message, "Unrecognized character '@'");
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize("int x;\n  x = 5;", &mut diagnostics);

        assert_eq!(tokens[1].location, SourceLocation::new(1, 5));
        assert_eq!(tokens[3].location, SourceLocation::new(2, 3));
        assert_eq!(tokens[5].location, SourceLocation::new(2, 7));
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::While.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Arrow.category(), TokenCategory::Punctuation);
        assert_eq!(TokenKind::ShlEq.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Ident.category(), TokenCategory::Identifier);
    }

    #[test]
    fn test_token_display() {
        let token = Token::new(TokenKind::Ident, "count", SourceLocation::new(1, 1));
        assert_eq!(token.to_string(), "identifier 'count'");
        assert_eq!(TokenKind::Semicolon.to_string(), "';'");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
