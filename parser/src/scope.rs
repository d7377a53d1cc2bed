//! The symbol table and scope manager.
//!
//! One global map lives for the whole compilation. A stack of local frames
//! tracks active procedure bodies: one frame is pushed after a procedure's
//! header is parsed and popped when its body finishes. Lookup consults only
//! the innermost frame before falling back to global, so the locals of an
//! enclosing procedure are invisible to procedures nested within it.
use std::collections::HashMap;

use pasc_codegen::stdlib;
use pasc_dsl::core::Id;
use pasc_dsl::symbol::{DataType, Symbol};

/// Which map a declaration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTarget {
    Global,
    Local,
}

/// Tracks declared symbols and their visibility.
pub struct ScopeManager {
    global: HashMap<Id, Symbol>,
    local: Vec<HashMap<Id, Symbol>>,
}

impl ScopeManager {
    /// An empty manager with no built-ins, for tests that want full control.
    pub fn new() -> Self {
        Self {
            global: HashMap::new(),
            local: Vec::new(),
        }
    }

    /// The manager every compilation starts from: the global scope is
    /// pre-seeded with the built-in procedures.
    pub fn with_builtins() -> Self {
        let mut manager = Self::new();
        for builtin in builtin_procedures() {
            let _ = manager.declare(builtin, ScopeTarget::Global);
        }
        manager
    }

    /// Adds a new local frame for a procedure body.
    pub fn push_scope(&mut self) {
        self.local.push(HashMap::new());
    }

    /// Drops the innermost local frame and every symbol registered in it.
    pub fn pop_scope(&mut self) {
        self.local.pop();
    }

    /// True while at least one procedure body is being parsed.
    pub fn in_procedure(&self) -> bool {
        !self.local.is_empty()
    }

    /// True if the name already exists, case-insensitively, in the targeted
    /// map. A `Local` target with no active frame checks the global map,
    /// which is where such declarations land.
    pub fn contains(&self, name: &Id, target: ScopeTarget) -> bool {
        match self.frame(target) {
            Some(frame) => frame.contains_key(name),
            None => self.global.contains_key(name),
        }
    }

    /// Registers the symbol in the targeted map. Fails when the name is
    /// already declared there; the caller reports `DuplicateSymbol`.
    pub fn declare(&mut self, symbol: Symbol, target: ScopeTarget) -> Result<&mut Symbol, ()> {
        let map = match target {
            ScopeTarget::Local => self.local.last_mut().unwrap_or(&mut self.global),
            ScopeTarget::Global => &mut self.global,
        };
        let name = symbol.name().clone();
        if map.contains_key(&name) {
            return Err(());
        }
        Ok(map.entry(name).or_insert(symbol))
    }

    /// Looks the name up in the innermost local frame, then in the global
    /// map. Frames of enclosing procedures are never consulted.
    pub fn resolve(&self, name: &Id) -> Option<&Symbol> {
        if let Some(frame) = self.local.last() {
            if let Some(symbol) = frame.get(name) {
                return Some(symbol);
            }
        }
        self.global.get(name)
    }

    fn frame(&self, target: ScopeTarget) -> Option<&HashMap<Id, Symbol>> {
        match target {
            ScopeTarget::Local => self.local.last(),
            ScopeTarget::Global => Some(&self.global),
        }
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in procedures every program may call without declaring.
///
/// Each symbol is pre-bound to the runtime-library routine that implements
/// it, so calls lower exactly like calls to user procedures. Signatures live
/// here and nowhere else; adjusting one is a one-line change.
pub fn builtin_procedures() -> Vec<Symbol> {
    let value = |data_type| {
        Symbol::variable(Id::from("VALUE"), data_type).expect("built-in parameter is valid")
    };
    let procedure = |name: &str, return_type, parameters: Vec<Symbol>, ir_name: &str| {
        let mut symbol = Symbol::procedure(Id::from(name), return_type, parameters)
            .expect("built-in signature is valid");
        symbol.ir_name = Some(ir_name.to_string());
        symbol
    };
    vec![
        procedure("GETBOOL", DataType::Bool, vec![], stdlib::GET_BOOL),
        procedure("GETINTEGER", DataType::Integer, vec![], stdlib::GET_INTEGER),
        procedure("GETFLOAT", DataType::Float, vec![], stdlib::GET_FLOAT),
        procedure("GETSTRING", DataType::String, vec![], stdlib::GET_STRING),
        procedure(
            "PUTBOOL",
            DataType::Bool,
            vec![value(DataType::Bool)],
            stdlib::PUT_BOOL,
        ),
        procedure(
            "PUTINTEGER",
            DataType::Bool,
            vec![value(DataType::Integer)],
            stdlib::PUT_INTEGER,
        ),
        procedure(
            "PUTFLOAT",
            DataType::Bool,
            vec![value(DataType::Float)],
            stdlib::PUT_FLOAT,
        ),
        procedure(
            "PUTSTRING",
            DataType::Bool,
            vec![value(DataType::String)],
            stdlib::PUT_STRING,
        ),
        procedure(
            "SQRT",
            DataType::Float,
            vec![value(DataType::Integer)],
            stdlib::SQRT,
        ),
    ]
}
