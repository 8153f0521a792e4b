//! `printf`/`scanf` format strings
//!
//! Splits a format string into its conversion specifiers so the analyzer can
//! check the argument list against them. A specifier is
//!
//! ```text
//! % [flags -+ #0]* [width]? [.precision]? [h|hh|l|ll|L]? conversion
//! ```
//!
//! `%%` prints a literal percent sign and consumes no argument.

use crate::semantic::types::{BaseType, Type};
use std::fmt;

/// What kind of argument a conversion consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Integer,  // d i u o x X
    Char,     // c
    Floating, // f F e E g G
    String,   // s
    Pointer,  // p
}

impl Conversion {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            'd' | 'i' | 'u' | 'o' | 'x' | 'X' => Some(Conversion::Integer),
            'c' => Some(Conversion::Char),
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => Some(Conversion::Floating),
            's' => Some(Conversion::String),
            'p' => Some(Conversion::Pointer),
            _ => None,
        }
    }

    /// Whether a `printf` argument of type `ty` fits this conversion
    pub fn accepts_value(self, ty: &Type) -> bool {
        if ty.is_unknown() {
            return true;
        }
        match self {
            Conversion::Integer | Conversion::Char => ty.is_integral(),
            Conversion::Floating => ty.is_floating(),
            Conversion::String => is_char_string(ty),
            Conversion::Pointer => ty.decayed().is_pointer(),
        }
    }

    /// Whether a `scanf` destination whose pointee is `target` fits this conversion
    pub fn accepts_target(self, target: &Type) -> bool {
        if target.is_unknown() {
            return true;
        }
        match self {
            Conversion::Integer => target.is_integral(),
            Conversion::Char | Conversion::String => *target == Type::new(BaseType::Char),
            Conversion::Floating => target.is_floating(),
            Conversion::Pointer => target.is_pointer(),
        }
    }
}

fn is_char_string(ty: &Type) -> bool {
    let decayed = ty.decayed();
    decayed.base == BaseType::Char && decayed.pointer_depth == 1
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conversion::Integer => write!(f, "integer"),
            Conversion::Char => write!(f, "character"),
            Conversion::Floating => write!(f, "floating-point"),
            Conversion::String => write!(f, "string"),
            Conversion::Pointer => write!(f, "pointer"),
        }
    }
}

/// One conversion specifier as written, e.g. `%.2lf`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub conversion: Conversion,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    UnknownConversion { text: String },
    Incomplete { text: String },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownConversion { text } => {
                write!(f, "unknown conversion '{}'", text)
            }
            FormatError::Incomplete { text } => {
                write!(f, "incomplete conversion '{}' at end of format", text)
            }
        }
    }
}

impl std::error::Error for FormatError {}

/// Collect the argument-consuming specifiers of `format` in order
pub fn parse_format(format: &str) -> Result<Vec<Specifier>, FormatError> {
    let mut specifiers = Vec::new();
    let mut chars = format.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            continue;
        }
        let mut text = String::from('%');

        if chars.peek() == Some(&'%') {
            chars.next();
            continue;
        }

        while let Some(&c) = chars.peek() {
            if matches!(c, '-' | '+' | ' ' | '#' | '0'..='9' | '.' | 'h' | 'l' | 'L') {
                text.push(c);
                chars.next();
            } else {
                break;
            }
        }

        let Some(conversion_char) = chars.next() else {
            return Err(FormatError::Incomplete { text });
        };
        text.push(conversion_char);

        match Conversion::from_char(conversion_char) {
            Some(conversion) => specifiers.push(Specifier { conversion, text }),
            None => return Err(FormatError::UnknownConversion { text }),
        }
    }

    Ok(specifiers)
}
