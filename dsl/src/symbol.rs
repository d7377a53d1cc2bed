//! Data types and symbols.
//!
//! A symbol is a declared variable or procedure. Symbols are created by the
//! parser at the point of declaration and live in the scope maps; their
//! `ir_name` is bound exactly once, when the code generator emits the
//! defining instruction, which happens before the symbol is registered.
use core::fmt;

use thiserror::Error;

use crate::core::Id;

/// The four data types of the language.
///
/// The same enumeration drives type checking in the parser and type
/// lowering in the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Bool,
    String,
}

impl DataType {
    /// True for the types that arithmetic accepts.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => f.write_str("INTEGER"),
            DataType::Float => f.write_str("FLOAT"),
            DataType::Bool => f.write_str("BOOL"),
            DataType::String => f.write_str("STRING"),
        }
    }
}

/// The kinds of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Procedure,
}

/// Why a symbol could not be constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("strings cannot be arrays")]
    StringArray,
    #[error("array size must be greater than 0")]
    ZeroArraySize,
}

/// A declared variable or procedure.
///
/// Two symbols are equal when their names match case-insensitively. That is
/// only used for uniqueness checks and lookup, never as full structural
/// equality.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: Id,
    kind: SymbolKind,
    data_type: DataType,
    is_array: bool,
    array_size: u32,
    parameters: Vec<Symbol>,
    /// The name of the slot or definition in the emitted IR. Assigned once,
    /// by the code generator, before the symbol enters a scope map.
    pub ir_name: Option<String>,
}

impl Symbol {
    fn new(
        name: Id,
        kind: SymbolKind,
        data_type: DataType,
        is_array: bool,
        array_size: u32,
        parameters: Vec<Symbol>,
    ) -> Result<Self, SymbolError> {
        let text = name.original();
        let mut chars = text.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return Err(SymbolError::InvalidIdentifier(text.to_string())),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SymbolError::InvalidIdentifier(text.to_string()));
        }
        if data_type == DataType::String && is_array {
            return Err(SymbolError::StringArray);
        }
        if is_array && array_size == 0 {
            return Err(SymbolError::ZeroArraySize);
        }
        Ok(Self {
            name,
            kind,
            data_type,
            is_array,
            array_size,
            parameters,
            ir_name: None,
        })
    }

    /// Creates a scalar variable symbol.
    pub fn variable(name: Id, data_type: DataType) -> Result<Self, SymbolError> {
        Symbol::new(name, SymbolKind::Variable, data_type, false, 0, Vec::new())
    }

    /// Creates an array variable symbol. The size must be greater than zero
    /// and the element type must not be `STRING`.
    pub fn variable_array(
        name: Id,
        data_type: DataType,
        array_size: u32,
    ) -> Result<Self, SymbolError> {
        Symbol::new(
            name,
            SymbolKind::Variable,
            data_type,
            true,
            array_size,
            Vec::new(),
        )
    }

    /// Creates a procedure symbol. The data type is the return type and the
    /// parameters must all be variable symbols.
    pub fn procedure(
        name: Id,
        return_type: DataType,
        parameters: Vec<Symbol>,
    ) -> Result<Self, SymbolError> {
        debug_assert!(parameters
            .iter()
            .all(|parameter| parameter.kind == SymbolKind::Variable));
        Symbol::new(
            name,
            SymbolKind::Procedure,
            return_type,
            false,
            0,
            parameters,
        )
    }

    pub fn name(&self) -> &Id {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The declared array size, or 0 for scalars. This is the same encoding
    /// the expression rules use, where array size 0 means "scalar".
    pub fn array_size(&self) -> u32 {
        self.array_size
    }

    /// The ordered parameters of a procedure; empty for variables.
    pub fn parameters(&self) -> &[Symbol] {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut [Symbol] {
        &mut self.parameters
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Symbol {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_when_valid_then_scalar() {
        let symbol = Symbol::variable(Id::from("x"), DataType::Integer).unwrap();
        assert_eq!(symbol.kind(), SymbolKind::Variable);
        assert!(!symbol.is_array());
        assert_eq!(symbol.array_size(), 0);
    }

    #[test]
    fn variable_array_when_string_then_error() {
        let result = Symbol::variable_array(Id::from("s"), DataType::String, 4);
        assert_eq!(result.unwrap_err(), SymbolError::StringArray);
    }

    #[test]
    fn variable_array_when_zero_size_then_error() {
        let result = Symbol::variable_array(Id::from("a"), DataType::Integer, 0);
        assert_eq!(result.unwrap_err(), SymbolError::ZeroArraySize);
    }

    #[test]
    fn variable_when_name_starts_with_digit_then_error() {
        let result = Symbol::variable(Id::from("1st"), DataType::Integer);
        assert!(matches!(result, Err(SymbolError::InvalidIdentifier(_))));
    }

    #[test]
    fn symbol_when_names_differ_by_case_then_equal() {
        let a = Symbol::variable(Id::from("total"), DataType::Integer).unwrap();
        let b = Symbol::variable(Id::from("TOTAL"), DataType::Float).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn procedure_when_valid_then_keeps_parameter_order() {
        let parameters = vec![
            Symbol::variable(Id::from("first"), DataType::Integer).unwrap(),
            Symbol::variable(Id::from("second"), DataType::Float).unwrap(),
        ];
        let procedure = Symbol::procedure(Id::from("f"), DataType::Bool, parameters).unwrap();
        assert_eq!(procedure.parameters().len(), 2);
        assert_eq!(procedure.parameters()[0].name(), &Id::from("FIRST"));
        assert_eq!(procedure.parameters()[1].name(), &Id::from("second"));
    }
}
