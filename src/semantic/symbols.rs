//! Symbol tables
//!
//! Variables live in a [`ScopeStack`]: one map per open lexical scope, searched
//! innermost first so inner declarations shadow outer ones. Functions and
//! struct definitions are program-wide and live in flat registries.
//!
//! Every registry keeps the first binding for a name. A second declaration is
//! rejected with a [`SymbolError`] and leaves the table untouched.

use crate::semantic::types::Type;
use rustc_hash::FxHashMap;
use std::fmt;

/// Reasons a declaration was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    VariableRedeclared { name: String },
    FunctionRedeclared { name: String },
    ConflictingFunction { name: String },
    StructRedeclared { name: String },
    FieldRedeclared { structure: String, field: String },
    NoOpenScope { name: String },
}

impl fmt::Display for SymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolError::VariableRedeclared { name } => {
                write!(f, "Variable '{}' already declared in this scope", name)
            }
            SymbolError::FunctionRedeclared { name } => {
                write!(f, "Function '{}' already declared", name)
            }
            SymbolError::ConflictingFunction { name } => {
                write!(f, "Conflicting declaration of function '{}'", name)
            }
            SymbolError::StructRedeclared { name } => {
                write!(f, "Struct '{}' already declared", name)
            }
            SymbolError::FieldRedeclared { structure, field } => {
                write!(f, "Field '{}' already declared in struct '{}'", field, structure)
            }
            SymbolError::NoOpenScope { name } => {
                write!(f, "No open scope to declare '{}' in", name)
            }
        }
    }
}

impl std::error::Error for SymbolError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    pub is_const: bool,
    pub decl_line: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type, decl_line: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            is_const: false,
            decl_line,
        }
    }

    pub fn with_const(mut self, is_const: bool) -> Self {
        self.is_const = is_const;
        self
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: Type,
    pub parameters: Vec<Parameter>,
    pub decl_line: usize,
    /// False for a prototype (`int f(int);`)
    pub defined: bool,
}

impl Function {
    fn same_signature(&self, other: &Function) -> bool {
        self.return_type == other.return_type
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// Struct definition
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub decl_line: usize,
    fields: FxHashMap<String, Type>,
    field_order: Vec<String>,
}

impl StructDef {
    pub fn new(name: impl Into<String>, decl_line: usize) -> Self {
        Self {
            name: name.into(),
            decl_line,
            fields: FxHashMap::default(),
            field_order: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: impl Into<String>, ty: Type) -> Result<(), SymbolError> {
        let field = field.into();
        if self.fields.contains_key(&field) {
            return Err(SymbolError::FieldRedeclared {
                structure: self.name.clone(),
                field,
            });
        }
        self.field_order.push(field.clone());
        self.fields.insert(field, ty);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&Type> {
        self.fields.get(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.field_order
            .iter()
            .filter_map(|name| self.fields.get(name).map(|ty| (name.as_str(), ty)))
    }
}

/// Stack of lexical scopes holding variables
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<FxHashMap<String, Variable>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a new scope
    pub fn open_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Exit the current scope; does nothing when no scope is open
    pub fn close_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare_variable(&mut self, variable: Variable) -> Result<(), SymbolError> {
        let Some(scope) = self.scopes.last_mut() else {
            return Err(SymbolError::NoOpenScope {
                name: variable.name,
            });
        };
        if scope.contains_key(&variable.name) {
            return Err(SymbolError::VariableRedeclared {
                name: variable.name,
            });
        }
        scope.insert(variable.name.clone(), variable);
        Ok(())
    }

    /// Innermost visible binding for `name`
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

/// Scopes plus the program-wide function and struct registries
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: ScopeStack,
    functions: FxHashMap<String, Function>,
    structs: FxHashMap<String, StructDef>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scope(&mut self) {
        self.scopes.open_scope();
    }

    pub fn close_scope(&mut self) {
        self.scopes.close_scope();
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.depth()
    }

    pub fn declare_variable(&mut self, variable: Variable) -> Result<(), SymbolError> {
        self.scopes.declare_variable(variable)
    }

    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.scopes.lookup_variable(name)
    }

    /// Register a function or prototype
    ///
    /// A prototype and a definition with the same signature may both appear;
    /// the definition is kept. Two definitions, or mismatching signatures, are
    /// refused.
    pub fn declare_function(&mut self, function: Function) -> Result<(), SymbolError> {
        let Some(existing) = self.functions.get(&function.name) else {
            self.functions.insert(function.name.clone(), function);
            return Ok(());
        };

        if existing.defined && function.defined {
            return Err(SymbolError::FunctionRedeclared {
                name: function.name,
            });
        }
        if !existing.same_signature(&function) {
            return Err(SymbolError::ConflictingFunction {
                name: function.name,
            });
        }
        if function.defined {
            self.functions.insert(function.name.clone(), function);
        }
        Ok(())
    }

    pub fn lookup_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn declare_struct(&mut self, definition: StructDef) -> Result<(), SymbolError> {
        if self.structs.contains_key(&definition.name) {
            return Err(SymbolError::StructRedeclared {
                name: definition.name,
            });
        }
        self.structs.insert(definition.name.clone(), definition);
        Ok(())
    }

    pub fn lookup_struct(&self, name: &str) -> Option<&StructDef> {
        self.structs.get(name)
    }

    pub fn field_type(&self, structure: &str, field: &str) -> Option<&Type> {
        self.lookup_struct(structure)?.field(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::types::BaseType;

    fn function(name: &str, params: &[Type], defined: bool) -> Function {
        Function {
            name: name.to_string(),
            return_type: Type::int(),
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, ty)| Parameter {
                    name: format!("p{}", i),
                    ty: ty.clone(),
                })
                .collect(),
            decl_line: 1,
            defined,
        }
    }

    #[test]
    fn test_shadowing() {
        let mut scopes = ScopeStack::new();
        scopes.open_scope();
        scopes.declare_variable(Variable::new("x", Type::int(), 1)).unwrap();

        scopes.open_scope();
        let float = Type::new(BaseType::Float);
        scopes.declare_variable(Variable::new("x", float.clone(), 2)).unwrap();
        assert_eq!(scopes.lookup_variable("x").unwrap().ty, float);

        scopes.close_scope();
        assert_eq!(scopes.lookup_variable("x").unwrap().ty, Type::int());
    }

    #[test]
    fn test_duplicate_in_same_scope_keeps_first() {
        let mut scopes = ScopeStack::new();
        scopes.open_scope();
        scopes.declare_variable(Variable::new("x", Type::int(), 1)).unwrap();

        let err = scopes
            .declare_variable(Variable::new("x", Type::new(BaseType::Char), 2))
            .unwrap_err();
        assert_eq!(err.to_string(), "Variable 'x' already declared in this scope");
        assert_eq!(scopes.lookup_variable("x").unwrap().ty, Type::int());
        assert_eq!(scopes.lookup_variable("x").unwrap().decl_line, 1);
    }

    #[test]
    fn test_lookup_miss_and_empty_close() {
        let mut scopes = ScopeStack::new();
        scopes.close_scope();
        assert_eq!(scopes.depth(), 0);
        assert!(scopes.lookup_variable("y").is_none());
        assert!(matches!(
            scopes.declare_variable(Variable::new("y", Type::int(), 1)),
            Err(SymbolError::NoOpenScope { .. })
        ));
    }

    #[test]
    fn test_variables_vanish_with_their_scope() {
        let mut scopes = ScopeStack::new();
        scopes.open_scope();
        scopes.open_scope();
        scopes.declare_variable(Variable::new("tmp", Type::int(), 3)).unwrap();
        scopes.close_scope();
        assert!(scopes.lookup_variable("tmp").is_none());
    }

    #[test]
    fn test_function_first_definition_wins() {
        let mut table = SymbolTable::new();
        table.declare_function(function("f", &[Type::int()], true)).unwrap();

        let err = table.declare_function(function("f", &[], true)).unwrap_err();
        assert!(matches!(err, SymbolError::FunctionRedeclared { .. }));
        assert_eq!(table.lookup_function("f").unwrap().parameters.len(), 1);
    }

    #[test]
    fn test_prototype_then_definition() {
        let mut table = SymbolTable::new();
        table.declare_function(function("g", &[Type::int()], false)).unwrap();
        table.declare_function(function("g", &[Type::int()], true)).unwrap();
        assert!(table.lookup_function("g").unwrap().defined);

        let err = table
            .declare_function(function("g", &[Type::new(BaseType::Char)], false))
            .unwrap_err();
        assert!(matches!(err, SymbolError::ConflictingFunction { .. }));
    }

    #[test]
    fn test_struct_registry() {
        let mut table = SymbolTable::new();
        let mut point = StructDef::new("Point", 1);
        point.add_field("x", Type::int()).unwrap();
        point.add_field("y", Type::int()).unwrap();
        assert!(point.add_field("x", Type::new(BaseType::Char)).is_err());
        table.declare_struct(point).unwrap();

        assert_eq!(table.field_type("Point", "x"), Some(&Type::int()));
        assert_eq!(table.field_type("Point", "z"), None);
        assert!(table.declare_struct(StructDef::new("Point", 9)).is_err());
        assert_eq!(table.lookup_struct("Point").unwrap().fields().count(), 2);
    }
}
