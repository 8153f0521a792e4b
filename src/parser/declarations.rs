//! Declaration parsing implementation
//!
//! This module handles the declaration forms of the language:
//!
//! - Struct definitions: `struct Name { fields };`
//! - Function definitions and prototypes: `type name(params) { ... }` / `;`
//! - Variable declarations with optional initializers
//! - Type specifiers, pointer stars and array suffixes
//!
//! # Grammar
//!
//! ```text
//! program      ::= (struct_def | function | declaration | directive)*
//! struct_def   ::= "struct" identifier "{" (type "*"* identifier array? ";")* "}" ";"
//! function     ::= type "*"* (identifier | "main") "(" params? ")" (block | ";")
//! params       ::= "void" | param ("," param)*
//! param        ::= "const"? type "*"* identifier ("[" int? "]")?
//! declaration  ::= qualifier* type declarator ("," declarator)* ";"
//! declarator   ::= "*"* identifier array? ("=" expression)?
//! array        ::= "[" (int | identifier) "]"
//! ```
//!
//! A type specifier starts a function exactly when, after the specifier and
//! its stars, an identifier (or `main`) is followed by `(`.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{FunctionContext, PResult, Parser};
use crate::semantic::symbols::{Function, Parameter, StructDef, Variable};
use crate::semantic::types::{BaseType, Type};

impl Parser<'_> {
    /// Parse top-level items until end of file
    pub(crate) fn program(&mut self) {
        while !self.is_at_end() {
            if let Err(err) = self.top_level_item() {
                self.recover(err);
            }
        }
    }

    fn top_level_item(&mut self) -> PResult<()> {
        if self.check(TokenKind::Directive) {
            self.advance();
            return Ok(());
        }
        if self.is_struct_definition() {
            return self.struct_definition();
        }
        if self.is_declaration_start() {
            return self.declaration_or_function();
        }
        Err(self.error_here("Expected a declaration at global scope"))
    }

    pub(crate) fn is_declaration_start(&self) -> bool {
        let kind = self.kind();
        kind.is_type_keyword() || kind.is_qualifier() || kind == TokenKind::Struct
    }

    /// `struct Name {`, as opposed to a declaration using `struct Name`
    pub(crate) fn is_struct_definition(&self) -> bool {
        self.check(TokenKind::Struct)
            && self.check_ahead(2, TokenKind::Ident)
            && self.check_ahead(3, TokenKind::LBrace)
    }

    /// Parse whichever of function or variable declaration the lookahead selects
    pub(crate) fn declaration_or_function(&mut self) -> PResult<()> {
        if self.is_function_header() {
            self.function_definition()
        } else {
            self.declaration()
        }
    }

    /// Look past the type specifier for `name (`
    fn is_function_header(&self) -> bool {
        let mut k = 1;
        while self.stream.peek(k).kind.is_qualifier() {
            k += 1;
        }
        if self.stream.peek(k).kind == TokenKind::Struct {
            k += 2;
        } else {
            while self.stream.peek(k).kind.is_type_keyword() {
                k += 1;
            }
        }
        while self.stream.peek(k).kind == TokenKind::Star {
            k += 1;
        }

        matches!(self.stream.peek(k).kind, TokenKind::Ident | TokenKind::Main)
            && self.check_ahead(k + 1, TokenKind::LParen)
    }

    /// Parse struct definition: struct Name { fields };
    pub(crate) fn struct_definition(&mut self) -> PResult<()> {
        self.advance(); // 'struct'
        let name = self.expect_identifier("after 'struct'")?;
        self.expect(TokenKind::LBrace, "after struct name")?;

        let mut definition = StructDef::new(name.lexeme.clone(), name.location.line);
        let enclosing = self.current_struct.replace(name.lexeme.clone());
        while self.is_declaration_start() {
            if let Err(err) = self.struct_field(&mut definition) {
                self.recover(err);
            }
        }
        self.current_struct = enclosing;

        if let Err(err) = self.symbols.declare_struct(definition) {
            self.semantic_error(err.to_string(), name.location);
        }

        self.expect(TokenKind::RBrace, "after struct fields")?;
        self.expect_semicolon("after struct definition")?;
        Ok(())
    }

    fn struct_field(&mut self, definition: &mut StructDef) -> PResult<()> {
        self.skip_qualifiers();
        let base = self.type_specifier()?;
        let ty = self.pointers(base);
        let field = self.expect_identifier("for struct field name")?;
        let ty = self.array_suffix(ty)?;
        self.expect_semicolon("after struct field")?;

        if let Err(err) = definition.add_field(field.lexeme, ty) {
            self.semantic_error(err.to_string(), field.location);
        }
        Ok(())
    }

    /// Parse function definition or prototype
    ///
    /// The function is registered before its body so it can call itself.
    pub(crate) fn function_definition(&mut self) -> PResult<()> {
        self.skip_qualifiers();
        let base = self.type_specifier()?;
        let return_type = self.pointers(base);

        let name = if self.check(TokenKind::Main) || self.check(TokenKind::Ident) {
            self.advance()
        } else {
            return Err(self.error_here("Expected function name"));
        };
        self.expect(TokenKind::LParen, "after function name")?;

        // Parameters get their own scope; the body block nests inside it
        self.scoped(|parser| parser.function_rest(name, return_type))
    }

    fn function_rest(&mut self, name: Token, return_type: Type) -> PResult<()> {
        let parameters = self.parameters()?;
        self.expect(TokenKind::RParen, "after parameters")?;
        let defined = !self.check(TokenKind::Semicolon);

        let function = Function {
            name: name.lexeme.clone(),
            return_type: return_type.clone(),
            parameters,
            decl_line: name.location.line,
            defined,
        };
        if let Err(err) = self.symbols.declare_function(function) {
            self.semantic_error(err.to_string(), name.location);
        }

        if !defined {
            self.advance(); // ';'
            return Ok(());
        }

        let context = FunctionContext {
            name: name.lexeme,
            return_type,
        };
        let enclosing = self.current_function.replace(context);
        let depths = (self.loop_depth, self.switch_depth);
        self.loop_depth = 0;
        self.switch_depth = 0;

        let result = self.block();

        self.current_function = enclosing;
        (self.loop_depth, self.switch_depth) = depths;
        result
    }

    /// Parse function parameters, declaring each in the parameter scope
    fn parameters(&mut self) -> PResult<Vec<Parameter>> {
        let mut parameters = Vec::new();

        if self.check(TokenKind::RParen) {
            return Ok(parameters);
        }
        if self.check(TokenKind::Void) && self.check_ahead(2, TokenKind::RParen) {
            self.advance();
            return Ok(parameters);
        }

        loop {
            let is_const = self.skip_qualifiers();
            let base = self.type_specifier()?;
            let mut ty = self.pointers(base);
            let name = self.expect_identifier("for parameter name")?;

            if self.match_token(TokenKind::LBracket) {
                self.match_token(TokenKind::IntLiteral);
                self.expect(TokenKind::RBracket, "after array parameter")?;
                ty = ty.with_array();
            }

            let variable =
                Variable::new(name.lexeme.clone(), ty.clone(), name.location.line).with_const(is_const);
            if let Err(err) = self.symbols.declare_variable(variable) {
                self.semantic_error(err.to_string(), name.location);
            }
            parameters.push(Parameter {
                name: name.lexeme,
                ty,
            });

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(parameters)
    }

    /// Parse variable declaration: qualifiers type declarator, ... ;
    pub(crate) fn declaration(&mut self) -> PResult<()> {
        let is_const = self.skip_qualifiers();
        let base = self.type_specifier()?;

        loop {
            self.declarator(&base, is_const)?;
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect_semicolon("after declaration")?;
        Ok(())
    }

    fn declarator(&mut self, base: &Type, is_const: bool) -> PResult<()> {
        let ty = self.pointers(base.clone());
        let name = self.expect_identifier("in declaration")?;
        let ty = self.array_suffix(ty)?;

        if ty.is_void() {
            self.semantic_error(
                format!("Variable '{}' declared void", name.lexeme),
                name.location,
            );
        }

        // Declared before the initializer, as in C
        let variable = Variable::new(name.lexeme.clone(), ty.clone(), name.location.line)
            .with_const(is_const);
        if let Err(err) = self.symbols.declare_variable(variable) {
            self.semantic_error(err.to_string(), name.location);
        }

        if self.match_token(TokenKind::Eq) {
            let location = self.current_location();
            let value = self.expression()?;
            if !ty.accepts(&value) {
                self.semantic_error(
                    format!(
                        "Incompatible types in initialization of '{}': expected {}, found {}",
                        name.lexeme, ty, value
                    ),
                    location,
                );
            }
        }

        Ok(())
    }

    /// Consume qualifiers and storage classes; returns whether `const` was seen
    pub(crate) fn skip_qualifiers(&mut self) -> bool {
        let mut is_const = false;
        while self.kind().is_qualifier() {
            is_const |= self.advance().kind == TokenKind::Const;
        }
        is_const
    }

    /// Parse a base type: a run of type keywords, or `struct Name`
    pub(crate) fn type_specifier(&mut self) -> PResult<Type> {
        if self.match_token(TokenKind::Struct) {
            let name = self.expect_identifier("after 'struct'")?;
            let known = self.symbols.lookup_struct(&name.lexeme).is_some()
                || self.current_struct.as_deref() == Some(name.lexeme.as_str());
            if !known {
                self.semantic_error(
                    format!("Struct '{}' not declared", name.lexeme),
                    name.location,
                );
            }
            return Ok(Type::new(BaseType::Struct(name.lexeme)));
        }

        let mut keywords = Vec::new();
        while self.kind().is_type_keyword() {
            keywords.push(self.advance().kind);
        }
        if keywords.is_empty() {
            return Err(self.error_here("Expected type specifier"));
        }

        Ok(Type::new(base_type_of(&keywords)))
    }

    /// Apply any `*` tokens to `ty`
    pub(crate) fn pointers(&mut self, mut ty: Type) -> Type {
        while self.match_token(TokenKind::Star) {
            ty = ty.with_pointer();
        }
        ty
    }

    /// Parse optional array suffix `[size]`
    pub(crate) fn array_suffix(&mut self, ty: Type) -> PResult<Type> {
        if !self.match_token(TokenKind::LBracket) {
            return Ok(ty);
        }

        // A named size is usually a #define constant, which has no binding
        if !matches!(self.kind(), TokenKind::IntLiteral | TokenKind::Ident) {
            return Err(self.error_here("Expected array size"));
        }
        self.advance();
        self.expect(TokenKind::RBracket, "after array size")?;

        Ok(ty.with_array())
    }
}

/// Combine a run of type keywords (`unsigned long int`) into one base type
fn base_type_of(keywords: &[TokenKind]) -> BaseType {
    let has = |kind: TokenKind| keywords.contains(&kind);

    if has(TokenKind::Void) {
        BaseType::Void
    } else if has(TokenKind::Double) {
        BaseType::Double
    } else if has(TokenKind::Float) {
        BaseType::Float
    } else if has(TokenKind::Char) {
        BaseType::Char
    } else if has(TokenKind::Short) {
        BaseType::Short
    } else if has(TokenKind::Long) {
        BaseType::Long
    } else {
        // int, signed, unsigned
        BaseType::Int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_type_combinations() {
        use TokenKind::*;
        assert_eq!(base_type_of(&[Unsigned, Long, Int]), BaseType::Long);
        assert_eq!(base_type_of(&[Long, Double]), BaseType::Double);
        assert_eq!(base_type_of(&[Unsigned]), BaseType::Int);
        assert_eq!(base_type_of(&[Short, Int]), BaseType::Short);
        assert_eq!(base_type_of(&[Signed, Char]), BaseType::Char);
    }
}
