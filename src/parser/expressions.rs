//! Expression parsing implementation
//!
//! One procedure per precedence level, lowest first. Each returns the [`Type`]
//! inferred for the sub-expression it consumed.
//!
//! # Operator Precedence (lowest to highest)
//!
//! 1. Ternary: `?:`
//! 2. Logical: `&&`, `||`
//! 3. Relational: `==`, `!=`, `<`, `<=`, `>`, `>=`
//! 4. Additive: `+`, `-`
//! 5. Multiplicative: `*`, `/`, `%`
//! 6. Subscript on an element: `[ ]`
//! 7. Unary: `*`, `&`, `!`, `-`, `++`, `--`, `sizeof`
//! 8. Access chain: `[ ]`, `.`, `->`, postfix `++`/`--`
//!
//! Operand checks never unwind. A failed check reports a semantic error and
//! yields the unknown type, which every later check accepts silently.

use crate::parser::lexer::{SourceLocation, Token, TokenKind};
use crate::parser::parse::{PResult, Parser};
use crate::semantic::types::{promote, BaseType, Type};

/// Called as functions without a declaration
const BUILTINS: &[&str] = &["printf", "scanf"];

impl Parser<'_> {
    pub(crate) fn expression(&mut self) -> PResult<Type> {
        self.ternary()
    }

    /// Ternary conditional: cond ? first : second
    fn ternary(&mut self) -> PResult<Type> {
        let condition = self.logical()?;

        if !self.check(TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();

        let first = self.expression()?;
        self.expect(TokenKind::Colon, "in ternary expression")?;
        let location = self.current_location();
        let second = self.expression()?;

        if !first.accepts(&second) {
            self.semantic_error(
                format!(
                    "Incompatible types in ternary branches: {} and {}",
                    first, second
                ),
                location,
            );
        }
        Ok(first)
    }

    fn logical(&mut self) -> PResult<Type> {
        let mut ty = self.relational()?;

        while matches!(self.kind(), TokenKind::AndAnd | TokenKind::OrOr) {
            let operator = self.advance();
            let right = self.relational()?;
            let fits = |t: &Type| t.is_unknown() || t.is_integral();
            if !fits(&ty) || !fits(&right) {
                self.operand_error(&operator, "integer", &ty, &right);
            }
            ty = Type::int();
        }

        Ok(ty)
    }

    fn relational(&mut self) -> PResult<Type> {
        let mut ty = self.arithmetic()?;

        while matches!(
            self.kind(),
            TokenKind::EqEq
                | TokenKind::NotEq
                | TokenKind::Lt
                | TokenKind::Le
                | TokenKind::Gt
                | TokenKind::Ge
        ) {
            let operator = self.advance();
            let right = self.arithmetic()?;
            let fits = |t: &Type| t.is_unknown() || t.is_numeric();
            if !fits(&ty) || !fits(&right) {
                self.operand_error(&operator, "numeric", &ty, &right);
            }
            ty = Type::int();
        }

        Ok(ty)
    }

    fn arithmetic(&mut self) -> PResult<Type> {
        let mut ty = self.term()?;

        while matches!(self.kind(), TokenKind::Plus | TokenKind::Minus) {
            let operator = self.advance();
            let right = self.term()?;
            ty = self.numeric_result(&operator, ty, right, false);
        }

        Ok(ty)
    }

    fn term(&mut self) -> PResult<Type> {
        let mut ty = self.factor()?;

        while matches!(
            self.kind(),
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent
        ) {
            let operator = self.advance();
            let right = self.factor()?;
            let integral = operator.kind == TokenKind::Percent;
            ty = self.numeric_result(&operator, ty, right, integral);
        }

        Ok(ty)
    }

    /// Type of a binary arithmetic operation, reporting non-numeric operands
    fn numeric_result(&mut self, operator: &Token, left: Type, right: Type, integral: bool) -> Type {
        if left.is_unknown() || right.is_unknown() {
            return Type::unknown();
        }

        let fits = |t: &Type| if integral { t.is_integral() } else { t.is_numeric() };
        if fits(&left) && fits(&right) {
            promote(&left, &right)
        } else {
            let kind = if integral { "integer" } else { "numeric" };
            self.operand_error(operator, kind, &left, &right);
            Type::unknown()
        }
    }

    fn operand_error(&mut self, operator: &Token, kind: &str, left: &Type, right: &Type) {
        self.semantic_error(
            format!(
                "Operands of '{}' must be {}, found {} and {}",
                operator.lexeme, kind, left, right
            ),
            operator.location,
        );
    }

    fn factor(&mut self) -> PResult<Type> {
        let ty = self.element()?;

        if self.check(TokenKind::LBracket) {
            return self.subscript(ty);
        }
        Ok(ty)
    }

    /// Unary operators, calls, variables, literals and parentheses
    pub(crate) fn element(&mut self) -> PResult<Type> {
        let token = self.stream.current().clone();

        match token.kind {
            TokenKind::Star => {
                self.advance();
                let operand = self.element()?;
                Ok(self.dereference(operand, token.location))
            }
            TokenKind::Amp => {
                self.advance();
                let operand = self.element()?;
                if operand.is_unknown() {
                    return Ok(operand);
                }
                Ok(operand.address_of())
            }
            TokenKind::Bang | TokenKind::Minus | TokenKind::PlusPlus | TokenKind::MinusMinus => {
                self.advance();
                let operand = self.element()?;
                Ok(self.numeric_operand(&token, operand))
            }
            TokenKind::Sizeof => self.sizeof_expression(),
            TokenKind::Ident | TokenKind::Main if self.check_ahead(2, TokenKind::LParen) => {
                self.function_call()
            }
            TokenKind::Ident => {
                self.advance();
                let mut ty = match self.symbols.lookup_variable(&token.lexeme) {
                    Some(variable) => variable.ty.clone(),
                    None => {
                        self.semantic_error(
                            format!("Variable '{}' undeclared", token.lexeme),
                            token.location,
                        );
                        Type::unknown()
                    }
                };
                ty = self.access_chain(ty)?;

                while matches!(self.kind(), TokenKind::PlusPlus | TokenKind::MinusMinus) {
                    let operator = self.advance();
                    ty = self.numeric_operand(&operator, ty);
                }
                Ok(ty)
            }
            TokenKind::IntLiteral => {
                self.advance();
                Ok(Type::int())
            }
            TokenKind::FloatLiteral => {
                self.advance();
                Ok(Type::new(BaseType::Float))
            }
            TokenKind::CharLiteral => {
                self.advance();
                Ok(Type::new(BaseType::Char))
            }
            TokenKind::StringLiteral => {
                self.advance();
                Ok(Type::new(BaseType::Char).with_pointer())
            }
            TokenKind::LParen => {
                self.advance();
                let ty = self.expression()?;
                self.expect(TokenKind::RParen, "after expression")?;
                self.access_chain(ty)
            }
            _ => Err(self.error_here("Expected expression")),
        }
    }

    fn numeric_operand(&mut self, operator: &Token, operand: Type) -> Type {
        if operand.is_unknown() || operand.is_numeric() {
            return operand;
        }
        self.semantic_error(
            format!(
                "Operator '{}' requires a numeric operand, found {}",
                operator.lexeme, operand
            ),
            operator.location,
        );
        Type::unknown()
    }

    /// Result of unary `*` on `operand`
    pub(crate) fn dereference(&mut self, operand: Type, location: SourceLocation) -> Type {
        if operand.is_unknown() {
            return operand;
        }
        match operand.decayed().deref() {
            Some(target) => target,
            None => {
                self.semantic_error(
                    format!("Cannot dereference non-pointer type {}", operand),
                    location,
                );
                Type::unknown()
            }
        }
    }

    /// sizeof '(' type | expression ')'
    fn sizeof_expression(&mut self) -> PResult<Type> {
        self.advance(); // 'sizeof'
        self.expect(TokenKind::LParen, "after 'sizeof'")?;

        if self.kind().is_type_keyword() || self.check(TokenKind::Struct) {
            let base = self.type_specifier()?;
            self.pointers(base);
        } else {
            self.expression()?;
        }

        self.expect(TokenKind::RParen, "after sizeof operand")?;
        Ok(Type::int())
    }

    /// Member access and subscripts following a primary expression
    pub(crate) fn access_chain(&mut self, mut ty: Type) -> PResult<Type> {
        loop {
            match self.kind() {
                TokenKind::LBracket => ty = self.subscript(ty)?,
                TokenKind::Dot | TokenKind::Arrow => {
                    let operator = self.advance();
                    let field = self.expect_identifier("after member access")?;
                    ty = self.member_type(ty, &operator, &field);
                }
                _ => return Ok(ty),
            }
        }
    }

    /// '[' expression ']' applied to `base`
    fn subscript(&mut self, base: Type) -> PResult<Type> {
        let bracket = self.advance();
        let index_location = self.current_location();
        let index = self.expression()?;
        self.expect(TokenKind::RBracket, "after array index")?;

        if !index.is_unknown() && !index.is_integral() {
            self.semantic_error(
                format!("Array index must be an integer, found {}", index),
                index_location,
            );
        }
        if base.is_unknown() {
            return Ok(base);
        }

        match base.element() {
            Some(element) => Ok(element),
            None => {
                self.semantic_error(
                    format!("Subscripted value of type {} is not an array or pointer", base),
                    bracket.location,
                );
                Ok(Type::unknown())
            }
        }
    }

    /// Field type for `base.field` or `base->field`
    fn member_type(&mut self, base: Type, operator: &Token, field: &Token) -> Type {
        if base.is_unknown() {
            return base;
        }

        let target = if operator.kind == TokenKind::Arrow {
            match base.decayed().deref() {
                Some(target) => target,
                None => {
                    self.semantic_error(
                        format!("Operator '->' used on non-pointer type {}", base),
                        operator.location,
                    );
                    return Type::unknown();
                }
            }
        } else if base.is_pointer() {
            self.semantic_error(
                format!("Operator '.' used on pointer type {}; use '->'", base),
                operator.location,
            );
            return Type::unknown();
        } else {
            base
        };

        let Some(struct_name) = target.struct_name() else {
            self.semantic_error(
                format!(
                    "Member '{}' requested from non-struct type {}",
                    field.lexeme, target
                ),
                field.location,
            );
            return Type::unknown();
        };

        let field_type = self
            .symbols
            .lookup_struct(struct_name)
            .map(|definition| definition.field(&field.lexeme).cloned());

        match field_type {
            Some(Some(ty)) => ty,
            Some(None) => {
                self.semantic_error(
                    format!("Struct '{}' has no field '{}'", struct_name, field.lexeme),
                    field.location,
                );
                Type::unknown()
            }
            // Undeclared struct, already reported where the type was written
            None => Type::unknown(),
        }
    }

    /// identifier '(' arguments? ')', checked against the callee's signature
    pub(crate) fn function_call(&mut self) -> PResult<Type> {
        let name = self.advance();
        self.expect(TokenKind::LParen, "after function name")?;

        if BUILTINS.contains(&name.lexeme.as_str()) {
            self.call_arguments()?;
            self.expect(TokenKind::RParen, "after arguments")?;
            return Ok(Type::int());
        }

        let function = self.symbols.lookup_function(&name.lexeme).cloned();
        if function.is_none() {
            self.semantic_error(
                format!("Function '{}' undeclared", name.lexeme),
                name.location,
            );
        }

        let arguments = self.call_arguments()?;
        self.expect(TokenKind::RParen, "after arguments")?;

        let Some(function) = function else {
            return Ok(Type::unknown());
        };

        if arguments.len() != function.parameters.len() {
            self.semantic_error(
                format!(
                    "Wrong number of arguments to '{}': expected {}, provided {}",
                    function.name,
                    function.parameters.len(),
                    arguments.len()
                ),
                name.location,
            );
        }

        for (position, (parameter, (ty, location))) in
            function.parameters.iter().zip(&arguments).enumerate()
        {
            if !parameter.ty.accepts(ty) {
                self.semantic_error(
                    format!(
                        "Incompatible type for argument {} of '{}': expected {}, found {}",
                        position + 1,
                        function.name,
                        parameter.ty,
                        ty
                    ),
                    *location,
                );
            }
        }

        Ok(function.return_type)
    }

    fn call_arguments(&mut self) -> PResult<Vec<(Type, SourceLocation)>> {
        let mut arguments = Vec::new();
        if self.check(TokenKind::RParen) {
            return Ok(arguments);
        }

        loop {
            let location = self.current_location();
            arguments.push((self.expression()?, location));
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(arguments)
    }
}
