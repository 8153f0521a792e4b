//! Type representation and the numeric promotion lattice
//!
//! A [`Type`] is a base kind plus a pointer depth and an array flag. Equality is
//! structural. The special [`BaseType::Unknown`] stands in for the type of any
//! expression that already produced a semantic error; every check treats it as
//! compatible so one mistake is reported once.
//!
//! # Promotion
//!
//! ```text
//! char < short < int < long < float < double
//! ```
//!
//! Arithmetic on two numeric operands yields the higher-ranked operand's type,
//! and a value may be stored into a slot of equal or higher rank.

use std::fmt;

/// Base types of the language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Struct(String), // Struct name
    Unknown,
}

impl BaseType {
    /// Position in the promotion lattice; `None` for non-arithmetic bases
    pub fn rank(&self) -> Option<u8> {
        match self {
            BaseType::Char => Some(0),
            BaseType::Short => Some(1),
            BaseType::Int => Some(2),
            BaseType::Long => Some(3),
            BaseType::Float => Some(4),
            BaseType::Double => Some(5),
            BaseType::Void | BaseType::Struct(_) | BaseType::Unknown => None,
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseType::Void => write!(f, "void"),
            BaseType::Char => write!(f, "char"),
            BaseType::Short => write!(f, "short"),
            BaseType::Int => write!(f, "int"),
            BaseType::Long => write!(f, "long"),
            BaseType::Float => write!(f, "float"),
            BaseType::Double => write!(f, "double"),
            BaseType::Struct(name) => write!(f, "struct {}", name),
            BaseType::Unknown => write!(f, "<unknown>"),
        }
    }
}

/// Type representation with pointers and arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub base: BaseType,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub is_array: bool,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Type {
            base,
            pointer_depth: 0,
            is_array: false,
        }
    }

    pub fn unknown() -> Self {
        Self::new(BaseType::Unknown)
    }

    pub fn int() -> Self {
        Self::new(BaseType::Int)
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.base == BaseType::Unknown
    }

    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }

    /// Plain `void`, as a function return type
    pub fn is_void(&self) -> bool {
        self.base == BaseType::Void && self.is_scalar()
    }

    fn is_scalar(&self) -> bool {
        self.pointer_depth == 0 && !self.is_array
    }

    pub fn rank(&self) -> Option<u8> {
        if self.is_scalar() {
            self.base.rank()
        } else {
            None
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.rank().is_some()
    }

    /// `char`, `short`, `int` or `long`
    pub fn is_integral(&self) -> bool {
        self.rank().is_some_and(|r| r <= 3)
    }

    pub fn is_floating(&self) -> bool {
        self.rank().is_some_and(|r| r >= 4)
    }

    /// Struct name when this is a struct value (not a pointer or array)
    pub fn struct_name(&self) -> Option<&str> {
        match &self.base {
            BaseType::Struct(name) if self.is_scalar() => Some(name.as_str()),
            _ => None,
        }
    }

    /// Result of unary `*`
    pub fn deref(&self) -> Option<Type> {
        if self.pointer_depth == 0 {
            return None;
        }
        let mut target = self.clone();
        target.pointer_depth -= 1;
        Some(target)
    }

    /// Result of unary `&`; the address of an array is the address of its first element
    pub fn address_of(&self) -> Type {
        if self.is_array {
            self.decayed()
        } else {
            self.clone().with_pointer()
        }
    }

    /// Result of `[index]`: drops the array level, or else one pointer level
    pub fn element(&self) -> Option<Type> {
        if self.is_array {
            let mut element = self.clone();
            element.is_array = false;
            Some(element)
        } else {
            self.deref()
        }
    }

    /// Arrays behave as pointers to their element type in value contexts
    pub fn decayed(&self) -> Type {
        if self.is_array {
            Type {
                base: self.base.clone(),
                pointer_depth: self.pointer_depth + 1,
                is_array: false,
            }
        } else {
            self.clone()
        }
    }

    /// Whether a value of type `source` may be stored where `self` is expected
    pub fn accepts(&self, source: &Type) -> bool {
        if self.is_unknown() || source.is_unknown() || self == source {
            return true;
        }

        if let (Some(target_rank), Some(source_rank)) = (self.rank(), source.rank()) {
            return source_rank <= target_rank;
        }

        let target = self.decayed();
        let source = source.decayed();
        if target == source {
            return true;
        }

        let is_void_pointer = |t: &Type| t.base == BaseType::Void && t.pointer_depth == 1;
        target.is_pointer()
            && source.is_pointer()
            && (is_void_pointer(&target) || is_void_pointer(&source))
    }
}

/// Result type of an arithmetic operation on two numeric operands
///
/// Returns [`Type::unknown`] when either side is not numeric.
pub fn promote(left: &Type, right: &Type) -> Type {
    match (left.rank(), right.rank()) {
        (Some(l), Some(r)) if l >= r => left.clone(),
        (Some(_), Some(_)) => right.clone(),
        _ => Type::unknown(),
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, "*".repeat(self.pointer_depth))?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_types() -> Vec<Type> {
        [
            BaseType::Char,
            BaseType::Short,
            BaseType::Int,
            BaseType::Long,
            BaseType::Float,
            BaseType::Double,
        ]
        .into_iter()
        .map(Type::new)
        .collect()
    }

    #[test]
    fn test_promotion_is_symmetric() {
        let types = numeric_types();
        for a in &types {
            for b in &types {
                assert_eq!(promote(a, b), promote(b, a), "{} vs {}", a, b);
            }
        }
    }

    #[test]
    fn test_promotion_picks_higher_rank() {
        let int = Type::int();
        let float = Type::new(BaseType::Float);
        let chr = Type::new(BaseType::Char);

        assert_eq!(promote(&int, &float), float);
        assert_eq!(promote(&chr, &int), int);
        assert_eq!(promote(&chr, &chr), chr);
        assert!(promote(&int, &int.clone().with_pointer()).is_unknown());
    }

    #[test]
    fn test_widening_only() {
        let int = Type::int();
        let double = Type::new(BaseType::Double);

        assert!(double.accepts(&int));
        assert!(!int.accepts(&double));
        assert!(int.accepts(&Type::new(BaseType::Char)));
    }

    #[test]
    fn test_unknown_is_compatible_with_everything() {
        let point = Type::new(BaseType::Struct("Point".to_string()));
        assert!(point.accepts(&Type::unknown()));
        assert!(Type::unknown().accepts(&point));
    }

    #[test]
    fn test_pointer_compatibility() {
        let char_ptr = Type::new(BaseType::Char).with_pointer();
        let char_array = Type::new(BaseType::Char).with_array();
        let int_ptr = Type::int().with_pointer();
        let void_ptr = Type::new(BaseType::Void).with_pointer();

        assert!(char_array.accepts(&char_ptr));
        assert!(char_ptr.accepts(&char_array));
        assert!(!int_ptr.accepts(&char_ptr));
        assert!(int_ptr.accepts(&void_ptr));
        assert!(!Type::int().accepts(&int_ptr));
    }

    #[test]
    fn test_pointer_and_array_levels() {
        let int_ptr_ptr = Type::int().with_pointer().with_pointer();
        assert_eq!(int_ptr_ptr.deref(), Some(Type::int().with_pointer()));
        assert_eq!(Type::int().deref(), None);

        let array = Type::int().with_array();
        assert_eq!(array.element(), Some(Type::int()));
        assert_eq!(array.address_of(), Type::int().with_pointer());
        assert_eq!(Type::int().with_pointer().element(), Some(Type::int()));
        assert_eq!(Type::int().element(), None);
    }

    #[test]
    fn test_display() {
        let point = Type::new(BaseType::Struct("Point".to_string())).with_pointer();
        assert_eq!(point.to_string(), "struct Point*");
        assert_eq!(Type::new(BaseType::Char).with_array().to_string(), "char[]");
    }
}
