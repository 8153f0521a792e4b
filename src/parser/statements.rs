//! Statement parsing implementation
//!
//! Handles blocks, control flow, assignments, calls used as statements and the
//! `printf`/`scanf` built-ins.
//!
//! # Supported Statements
//!
//! - Declarations (and nested struct/function definitions)
//! - Control flow: if/else, while, do-while, for, switch/case
//! - Jump statements: break, continue, return
//! - Assignments: `=`, compound operators, prefix and postfix `++`/`--`
//! - Function calls, `printf(...)`, `scanf(...)`
//! - Nested blocks and empty statements
//!
//! Every loop over statements is a recovery point: a [`SyntaxError`] raised
//! anywhere inside one statement is reported there and the loop resumes after
//! the next `;` or `}`.
//!
//! [`SyntaxError`]: crate::parser::parse::SyntaxError

use crate::parser::lexer::{SourceLocation, TokenKind};
use crate::parser::parse::{PResult, Parser};
use crate::semantic::format::{parse_format, Specifier};
use crate::semantic::types::Type;
use rustc_hash::FxHashSet;

/// Which built-in a format string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatCall {
    Printf,
    Scanf,
}

impl FormatCall {
    fn name(self) -> &'static str {
        match self {
            FormatCall::Printf => "printf",
            FormatCall::Scanf => "scanf",
        }
    }
}

/// Left-hand side of an assignment
pub(crate) struct Place {
    pub(crate) name: String,
    pub(crate) ty: Type,
    pub(crate) is_const: bool,
    pub(crate) location: SourceLocation,
}

impl Parser<'_> {
    /// Parse block statement: { statements }
    pub(crate) fn block(&mut self) -> PResult<()> {
        self.expect(TokenKind::LBrace, "to open block")?;
        self.symbols.open_scope();
        self.statements_until(TokenKind::RBrace);
        self.symbols.close_scope();
        self.expect(TokenKind::RBrace, "to close block")?;
        Ok(())
    }

    fn statements_until(&mut self, end: TokenKind) {
        while !self.check(end) && !self.is_at_end() {
            if let Err(err) = self.statement() {
                self.recover(err);
            }
        }
    }

    /// Body of a control statement: a block or a single statement
    fn body(&mut self) -> PResult<()> {
        if self.check(TokenKind::LBrace) {
            self.block()
        } else {
            self.scoped(|parser| parser.statement())
        }
    }

    /// Parse a single statement
    pub(crate) fn statement(&mut self) -> PResult<()> {
        if self.is_struct_definition() {
            return self.struct_definition();
        }
        if self.is_declaration_start() {
            return self.declaration_or_function();
        }

        match self.kind() {
            TokenKind::If => self.if_statement(),
            TokenKind::While => self.while_statement(),
            TokenKind::Do => self.do_while_statement(),
            TokenKind::For => self.for_statement(),
            TokenKind::Switch => self.switch_statement(),
            TokenKind::Return => self.return_statement(),
            TokenKind::Break | TokenKind::Continue => self.jump_statement(),
            TokenKind::LBrace => self.block(),
            TokenKind::Semicolon | TokenKind::Directive => {
                self.advance();
                Ok(())
            }
            TokenKind::Case | TokenKind::Default => {
                Err(self.error_here("Case label outside of switch"))
            }
            TokenKind::Main if self.check_ahead(2, TokenKind::LParen) => {
                self.function_call()?;
                self.expect_semicolon("after function call")?;
                Ok(())
            }
            TokenKind::Ident => match self.stream.current().lexeme.as_str() {
                "printf" => self.printf_statement(),
                "scanf" => self.scanf_statement(),
                _ if self.check_ahead(2, TokenKind::LParen) => {
                    self.function_call()?;
                    self.expect_semicolon("after function call")?;
                    Ok(())
                }
                _ => self.assignment(),
            },
            TokenKind::Star | TokenKind::PlusPlus | TokenKind::MinusMinus => self.assignment(),
            _ => Err(self.error_here("Expected statement")),
        }
    }

    fn if_statement(&mut self) -> PResult<()> {
        self.advance(); // 'if'
        self.condition("if")?;
        self.body()?;

        if self.match_token(TokenKind::Else) {
            self.body()?;
        }
        Ok(())
    }

    fn while_statement(&mut self) -> PResult<()> {
        self.advance(); // 'while'
        self.condition("while")?;
        self.in_loop(|parser| parser.body())
    }

    fn do_while_statement(&mut self) -> PResult<()> {
        self.advance(); // 'do'
        self.in_loop(|parser| parser.body())?;
        self.expect(TokenKind::While, "after do-while body")?;
        self.condition("do-while")?;
        self.expect_semicolon("after do-while condition")?;
        Ok(())
    }

    /// Parenthesised controlling expression
    fn condition(&mut self, statement: &str) -> PResult<()> {
        self.expect(TokenKind::LParen, &format!("after '{}'", statement))?;
        let location = self.current_location();
        let ty = self.expression()?;
        self.check_condition(&ty, statement, location);
        self.expect(TokenKind::RParen, "after condition")?;
        Ok(())
    }

    fn check_condition(&mut self, ty: &Type, statement: &str, location: SourceLocation) {
        if !(ty.is_unknown() || ty.is_numeric() || ty.decayed().is_pointer()) {
            self.semantic_error(
                format!(
                    "Condition of '{}' must be numeric or pointer, found {}",
                    statement, ty
                ),
                location,
            );
        }
    }

    /// Parse for loop; the header gets its own scope
    fn for_statement(&mut self) -> PResult<()> {
        self.advance(); // 'for'
        self.expect(TokenKind::LParen, "after 'for'")?;
        self.scoped(|parser| parser.for_rest())
    }

    fn for_rest(&mut self) -> PResult<()> {
        // Init
        if !self.match_token(TokenKind::Semicolon) {
            if self.is_declaration_start() {
                self.declaration()?;
            } else {
                self.assignment()?;
            }
        }

        // Condition
        if !self.check(TokenKind::Semicolon) {
            let location = self.current_location();
            let ty = self.expression()?;
            self.check_condition(&ty, "for", location);
        }
        self.expect_semicolon("after for condition")?;

        // Update
        if !self.check(TokenKind::RParen) {
            self.assignment_clause()?;
        }
        self.expect(TokenKind::RParen, "after for clauses")?;

        self.in_loop(|parser| parser.body())
    }

    fn switch_statement(&mut self) -> PResult<()> {
        self.advance(); // 'switch'
        self.expect(TokenKind::LParen, "after 'switch'")?;
        let location = self.current_location();
        let ty = self.expression()?;
        if !ty.is_unknown() && !ty.is_integral() {
            self.semantic_error(
                format!("Switch expression must be an integer, found {}", ty),
                location,
            );
        }
        self.expect(TokenKind::RParen, "after switch expression")?;
        self.expect(TokenKind::LBrace, "to open switch body")?;

        self.switch_depth += 1;
        self.symbols.open_scope();
        self.switch_body();
        self.symbols.close_scope();
        self.switch_depth -= 1;

        self.expect(TokenKind::RBrace, "to close switch body")?;
        Ok(())
    }

    fn switch_body(&mut self) {
        let mut labels = FxHashSet::default();
        let mut has_default = false;

        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            if let Err(err) = self.switch_item(&mut labels, &mut has_default) {
                self.recover(err);
            }
        }
    }

    fn switch_item(&mut self, labels: &mut FxHashSet<String>, has_default: &mut bool) -> PResult<()> {
        match self.kind() {
            TokenKind::Case => {
                self.advance();
                if !matches!(self.kind(), TokenKind::IntLiteral | TokenKind::CharLiteral) {
                    return Err(self.error_here("Expected constant after 'case'"));
                }
                let value = self.advance();
                if !labels.insert(value.lexeme.clone()) {
                    self.semantic_error(
                        format!("Duplicate case value {}", value.lexeme),
                        value.location,
                    );
                }
                self.expect(TokenKind::Colon, "after case value")?;
                Ok(())
            }
            TokenKind::Default => {
                let label = self.advance();
                if *has_default {
                    self.semantic_error("Multiple default labels in switch", label.location);
                }
                *has_default = true;
                self.expect(TokenKind::Colon, "after 'default'")?;
                Ok(())
            }
            _ => self.statement(),
        }
    }

    fn return_statement(&mut self) -> PResult<()> {
        let keyword = self.advance();
        let context = self.current_function.clone();

        if self.match_token(TokenKind::Semicolon) {
            if let Some(function) = context {
                if !function.return_type.is_void() && !function.return_type.is_unknown() {
                    self.semantic_error(
                        format!(
                            "Function '{}' must return a value of type {}",
                            function.name, function.return_type
                        ),
                        keyword.location,
                    );
                }
            }
            return Ok(());
        }

        let location = self.current_location();
        let value = self.expression()?;
        if let Some(function) = context {
            if function.return_type.is_void() {
                self.semantic_error(
                    format!("Void function '{}' cannot return a value", function.name),
                    location,
                );
            } else if !function.return_type.accepts(&value) {
                self.semantic_error(
                    format!(
                        "Incompatible return type in '{}': expected {}, found {}",
                        function.name, function.return_type, value
                    ),
                    location,
                );
            }
        }

        self.expect_semicolon("after return value")?;
        Ok(())
    }

    /// Parse break or continue
    fn jump_statement(&mut self) -> PResult<()> {
        let keyword = self.advance();
        let (allowed, context) = match keyword.kind {
            TokenKind::Break => (self.loop_depth > 0 || self.switch_depth > 0, "loop or switch"),
            _ => (self.loop_depth > 0, "loop"),
        };
        if !allowed {
            self.semantic_error(
                format!("'{}' outside of {}", keyword.lexeme, context),
                keyword.location,
            );
        }
        self.expect_semicolon(&format!("after '{}'", keyword.lexeme))?;
        Ok(())
    }

    /// Assignment statement terminated by `;`
    fn assignment(&mut self) -> PResult<()> {
        self.assignment_clause()?;
        self.expect_semicolon("after assignment")?;
        Ok(())
    }

    /// Assignment without the trailing `;`, as in a for-loop update
    fn assignment_clause(&mut self) -> PResult<()> {
        if matches!(self.kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let operator = self.advance();
            let place = self.place()?;
            self.check_increment(&place, &operator.lexeme);
            return Ok(());
        }

        let place = self.place()?;
        let operator = self.stream.current().clone();

        match operator.kind {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.advance();
                self.check_increment(&place, &operator.lexeme);
            }
            TokenKind::Eq => {
                self.advance();
                let location = self.current_location();
                let value = self.expression()?;
                self.check_writable(&place);
                if place.ty.is_array {
                    self.semantic_error(
                        format!("Cannot assign to array '{}'", place.name),
                        location,
                    );
                } else if !place.ty.accepts(&value) {
                    self.semantic_error(
                        format!(
                            "Incompatible types in assignment to '{}': expected {}, found {}",
                            place.name, place.ty, value
                        ),
                        location,
                    );
                }
            }
            TokenKind::PlusEq | TokenKind::MinusEq | TokenKind::StarEq | TokenKind::SlashEq => {
                self.advance();
                let value = self.expression()?;
                self.check_writable(&place);
                self.check_compound(&place, &value, &operator.lexeme, false, operator.location);
            }
            TokenKind::PercentEq
            | TokenKind::ShlEq
            | TokenKind::ShrEq
            | TokenKind::AmpEq
            | TokenKind::PipeEq
            | TokenKind::CaretEq => {
                self.advance();
                let value = self.expression()?;
                self.check_writable(&place);
                self.check_compound(&place, &value, &operator.lexeme, true, operator.location);
            }
            _ => {
                return Err(self.error_here(format!(
                    "Expected assignment operator after '{}'",
                    place.name
                )))
            }
        }

        Ok(())
    }

    fn check_writable(&mut self, place: &Place) {
        if place.is_const {
            self.semantic_error(
                format!("Cannot assign to const variable '{}'", place.name),
                place.location,
            );
        }
    }

    fn check_increment(&mut self, place: &Place, operator: &str) {
        self.check_writable(place);
        if !place.ty.is_unknown() && !place.ty.is_numeric() {
            self.semantic_error(
                format!("Operator '{}' requires a numeric operand, found {}", operator, place.ty),
                place.location,
            );
        }
    }

    fn check_compound(
        &mut self,
        place: &Place,
        value: &Type,
        operator: &str,
        integral: bool,
        location: SourceLocation,
    ) {
        if place.ty.is_unknown() || value.is_unknown() {
            return;
        }
        let fits = |ty: &Type| if integral { ty.is_integral() } else { ty.is_numeric() };
        if !fits(&place.ty) || !fits(value) {
            let kind = if integral { "integer" } else { "numeric" };
            self.semantic_error(
                format!(
                    "Operator '{}' requires {} operands, found {} and {}",
                    operator, kind, place.ty, value
                ),
                location,
            );
        } else if !place.ty.accepts(value) {
            self.semantic_error(
                format!(
                    "Incompatible types in assignment to '{}': expected {}, found {}",
                    place.name, place.ty, value
                ),
                location,
            );
        }
    }

    /// Parse assignable location: *... identifier access*
    pub(crate) fn place(&mut self) -> PResult<Place> {
        let mut derefs = Vec::new();
        while self.check(TokenKind::Star) {
            derefs.push(self.advance().location);
        }

        let name = self.expect_identifier("as assignment target")?;
        let variable = self.symbols.lookup_variable(&name.lexeme).cloned();
        let (mut ty, mut is_const) = match variable {
            Some(variable) => (variable.ty, variable.is_const),
            None => {
                self.semantic_error(
                    format!("Variable '{}' undeclared", name.lexeme),
                    name.location,
                );
                (Type::unknown(), false)
            }
        };

        // Writes through a pointer do not modify the variable itself
        if ty.is_pointer() || !derefs.is_empty() {
            is_const = false;
        }

        ty = self.access_chain(ty)?;
        for location in derefs.into_iter().rev() {
            ty = self.dereference(ty, location);
        }

        Ok(Place {
            name: name.lexeme,
            ty,
            is_const,
            location: name.location,
        })
    }

    /// printf '(' expression (',' expression)* ')' ';'
    fn printf_statement(&mut self) -> PResult<()> {
        self.advance(); // 'printf'
        self.expect(TokenKind::LParen, "after 'printf'")?;

        let format = self
            .check(TokenKind::StringLiteral)
            .then(|| self.stream.current().clone());
        self.expression()?;

        let arguments = self.trailing_arguments()?;
        self.expect(TokenKind::RParen, "after printf arguments")?;
        self.expect_semicolon("after printf")?;

        if let Some(format) = format {
            self.check_format(FormatCall::Printf, &format.lexeme, format.location, &arguments);
        }
        Ok(())
    }

    /// scanf '(' string (',' expression)* ')' ';'
    fn scanf_statement(&mut self) -> PResult<()> {
        self.advance(); // 'scanf'
        self.expect(TokenKind::LParen, "after 'scanf'")?;
        let format = self.expect(TokenKind::StringLiteral, "as scanf format")?;

        let arguments = self.trailing_arguments()?;
        self.expect(TokenKind::RParen, "after scanf arguments")?;
        self.expect_semicolon("after scanf")?;

        self.check_format(FormatCall::Scanf, &format.lexeme, format.location, &arguments);
        Ok(())
    }

    /// Arguments after the format string, with their positions
    fn trailing_arguments(&mut self) -> PResult<Vec<(Type, SourceLocation)>> {
        let mut arguments = Vec::new();
        while self.match_token(TokenKind::Comma) {
            let location = self.current_location();
            arguments.push((self.expression()?, location));
        }
        Ok(arguments)
    }

    fn check_format(
        &mut self,
        call: FormatCall,
        literal: &str,
        location: SourceLocation,
        arguments: &[(Type, SourceLocation)],
    ) {
        let text = literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(literal);

        let specifiers = match parse_format(text) {
            Ok(specifiers) => specifiers,
            Err(err) => {
                self.semantic_error(
                    format!("Invalid format string in '{}': {}", call.name(), err),
                    location,
                );
                return;
            }
        };

        if specifiers.len() != arguments.len() {
            self.semantic_error(
                format!(
                    "Format string of '{}' expects {} arguments, provided {}",
                    call.name(),
                    specifiers.len(),
                    arguments.len()
                ),
                location,
            );
        }

        for (specifier, (ty, arg_location)) in specifiers.iter().zip(arguments) {
            self.check_format_argument(call, specifier, ty, *arg_location);
        }
    }

    fn check_format_argument(
        &mut self,
        call: FormatCall,
        specifier: &Specifier,
        ty: &Type,
        location: SourceLocation,
    ) {
        let fits = match call {
            FormatCall::Printf => specifier.conversion.accepts_value(ty),
            FormatCall::Scanf => {
                if ty.is_unknown() {
                    true
                } else {
                    match ty.element() {
                        Some(target) => specifier.conversion.accepts_target(&target),
                        None => {
                            self.semantic_error(
                                format!("Argument of 'scanf' must be an address, found {}", ty),
                                location,
                            );
                            return;
                        }
                    }
                }
            }
        };

        if !fits {
            self.semantic_error(
                format!(
                    "Format '{}' of '{}' expects {} argument, found {}",
                    specifier.text,
                    call.name(),
                    specifier.conversion,
                    ty
                ),
                location,
            );
        }
    }
}
