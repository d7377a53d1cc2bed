//! Declaration productions.
//!
//! Declaring and emitting stay lock-stepped with parse order: a variable's
//! slot is emitted and its symbol registered in the same step that parses
//! the declaration, and a procedure's definition is opened as soon as its
//! header has been read.
use log::{debug, info, trace};

use pasc_dsl::core::Id;
use pasc_dsl::symbol::{DataType, Symbol, SymbolError};
use pasc_problems::Problem;

use crate::scope::ScopeTarget;
use crate::token::TokenType;

use super::{Parse, Parser};

impl Parser<'_> {
    /// Declaration := [GLOBAL] (VarDecl | ProcDecl)
    ///
    /// `is_global` is forced on at program level; inside a procedure body
    /// it reflects the `GLOBAL` prefix.
    pub(crate) fn declaration(&mut self, is_global: bool) -> Parse<()> {
        let mut is_global = is_global;
        if self.at(&TokenType::Global) {
            is_global = true;
            self.advance();
        }
        if self.at(&TokenType::Variable) {
            self.variable_declaration(is_global, true)?;
            Ok(())
        } else if self.at(&TokenType::Procedure) {
            self.procedure_declaration(is_global)
        } else {
            Err(self.error(
                Problem::SyntaxError,
                "\"VARIABLE\" or \"PROCEDURE\" expected before a declaration".to_string(),
            ))
        }
    }

    /// VarDecl := VARIABLE id : TypeMark [ "[" intLiteral "]" ]
    ///
    /// Returns the registered symbol so the parameter list can collect its
    /// entries in order. `emit` is false for parameters, whose slots are
    /// materialized by the procedure prologue instead.
    pub(crate) fn variable_declaration(&mut self, is_global: bool, emit: bool) -> Parse<Symbol> {
        self.expect(
            TokenType::Variable,
            "\"VARIABLE\" expected at the start of a declaration",
        )?;

        let id = match &self.current.token_type {
            TokenType::Identifier(name) => Id::from(name).with_span(self.current.span.clone()),
            _ => {
                return Err(self.error(
                    Problem::SyntaxError,
                    "Identifier expected after \"VARIABLE\"".to_string(),
                ))
            }
        };

        // The name must be unique in the targeted scope, checked before
        // anything is emitted.
        let target = if is_global {
            ScopeTarget::Global
        } else {
            ScopeTarget::Local
        };
        if self.scope.contains(&id, target) {
            let scope_name = if is_global { "global" } else { "local" };
            return Err(self.error(
                Problem::DuplicateSymbol,
                format!(
                    "Identifier \"{}\" already exists in the {} scope",
                    id, scope_name
                ),
            ));
        }
        self.advance();

        self.expect(TokenType::Colon, "\":\" expected after identifier")?;
        let data_type = self.type_mark()?;

        let constructed = if self.at(&TokenType::LeftBracket) {
            self.advance();
            let bound = match self.current.token_type {
                TokenType::IntegerLiteral(value) => value,
                _ => {
                    return Err(
                        self.error(Problem::SyntaxError, "Bound expected after \"[\"".to_string())
                    )
                }
            };
            if bound < 1 {
                return Err(self.error(
                    Problem::InvalidArrayBound,
                    format!("Array bound must be at least 1, found {}", bound),
                ));
            }
            self.advance();
            self.expect(TokenType::RightBracket, "\"]\" expected after bound")?;
            Symbol::variable_array(id.clone(), data_type, bound as u32)
        } else {
            Symbol::variable(id.clone(), data_type)
        };
        let mut symbol = match constructed {
            Ok(symbol) => symbol,
            Err(error) => {
                let problem = match error {
                    SymbolError::StringArray => Problem::TypeMismatch,
                    SymbolError::ZeroArraySize => Problem::InvalidArrayBound,
                    SymbolError::InvalidIdentifier(_) => Problem::SyntaxError,
                };
                return Err(self.error(problem, error.to_string()));
            }
        };

        if emit {
            let ir_name = self.generator.declare_variable(&symbol, is_global);
            symbol.ir_name = Some(ir_name);
        }
        debug!("Variable \"{}\" declared as \"{}\"", id, data_type);
        if self.scope.declare(symbol.clone(), target).is_err() {
            // Unreachable after the check above; kept so a registration
            // failure can never pass silently.
            return Err(self.error(
                Problem::DuplicateSymbol,
                format!("Identifier \"{}\" already exists", id),
            ));
        }
        Ok(symbol)
    }

    /// ProcDecl := ProcHeader ProcBody
    pub(crate) fn procedure_declaration(&mut self, is_global: bool) -> Parse<()> {
        let mut procedure = self.procedure_header(is_global)?;
        let target = if is_global {
            ScopeTarget::Global
        } else {
            ScopeTarget::Local
        };

        // Open the definition first: this binds the procedure's IR name and
        // its parameters' slots, which the registered symbol must carry.
        self.generator.start_procedure(&mut procedure);
        if self.scope.declare(procedure.clone(), target).is_err() {
            return Err(self.error(
                Problem::DuplicateSymbol,
                format!("Identifier \"{}\" already exists", procedure.name()),
            ));
        }

        // The body gets a fresh frame holding only the parameters; locals
        // of any enclosing procedure are invisible inside it.
        self.scope.push_scope();
        for parameter in procedure.parameters() {
            // Parameter names were checked for uniqueness when the list was
            // parsed, so this cannot fail.
            let _ = self.scope.declare(parameter.clone(), ScopeTarget::Local);
        }
        let body = self.procedure_body(procedure.data_type());
        self.scope.pop_scope();
        body?;

        self.generator.finish_procedure(&procedure);
        info!(
            "Procedure \"{}\" of type \"{}\" parsed",
            procedure.name(),
            procedure.data_type()
        );
        Ok(())
    }

    /// ProcHeader := PROCEDURE id : TypeMark ( [ParamList] )
    ///
    /// The name's uniqueness in the enclosing scope is checked here, at the
    /// identifier, before the parameter list is touched.
    fn procedure_header(&mut self, is_global: bool) -> Parse<Symbol> {
        self.expect(
            TokenType::Procedure,
            "\"PROCEDURE\" expected at the start of a declaration",
        )?;

        let id = match &self.current.token_type {
            TokenType::Identifier(name) => Id::from(name).with_span(self.current.span.clone()),
            _ => {
                return Err(self.error(
                    Problem::SyntaxError,
                    "Identifier expected after \"PROCEDURE\"".to_string(),
                ))
            }
        };
        let target = if is_global {
            ScopeTarget::Global
        } else {
            ScopeTarget::Local
        };
        if self.scope.contains(&id, target) {
            let scope_name = if is_global { "global" } else { "local" };
            return Err(self.error(
                Problem::DuplicateSymbol,
                format!(
                    "Identifier \"{}\" already exists in the {} scope",
                    id, scope_name
                ),
            ));
        }
        self.advance();

        self.expect(TokenType::Colon, "\":\" expected after identifier")?;
        let return_type = self.type_mark()?;
        self.expect(TokenType::LeftParen, "\"(\" expected after type mark")?;
        let parameters = if self.at(&TokenType::RightParen) {
            Vec::new()
        } else {
            self.parameter_list()?
        };
        self.expect(TokenType::RightParen, "\")\" expected after parameter list")?;

        match Symbol::procedure(id, return_type, parameters) {
            Ok(symbol) => {
                debug!("Parsed procedure header");
                Ok(symbol)
            }
            Err(error) => Err(self.error(Problem::SyntaxError, error.to_string())),
        }
    }

    /// ProcBody := DeclList BEGIN StmtList END PROCEDURE
    fn procedure_body(&mut self, return_type: DataType) -> Parse<()> {
        self.declaration_list(&[TokenType::Begin, TokenType::Eof], false)?;
        self.expect(TokenType::Begin, "\"BEGIN\" expected after declaration list")?;
        self.statement_list(&[TokenType::End, TokenType::Eof], Some(return_type))?;
        self.expect(TokenType::End, "\"END\" expected after statement list")?;
        self.expect(TokenType::Procedure, "\"PROCEDURE\" expected after \"END\"")?;
        debug!("Parsed procedure body");
        Ok(())
    }

    /// ParamList := VarDecl { , VarDecl }
    ///
    /// A dedicated frame catches duplicate parameter names; the frame is
    /// dropped once the list is collected and the body re-declares the
    /// parameters into its own frame.
    fn parameter_list(&mut self) -> Parse<Vec<Symbol>> {
        self.scope.push_scope();
        let result = self.parameter_list_items();
        self.scope.pop_scope();
        result
    }

    fn parameter_list_items(&mut self) -> Parse<Vec<Symbol>> {
        let mut parameters = vec![self.variable_declaration(false, false)?];
        while self.at(&TokenType::Comma) {
            self.advance();
            parameters.push(self.variable_declaration(false, false)?);
        }
        trace!("Parsed list of {} parameter(s)", parameters.len());
        Ok(parameters)
    }

    /// TypeMark := INTEGER | FLOAT | STRING | BOOL
    pub(crate) fn type_mark(&mut self) -> Parse<DataType> {
        let data_type = match self.current.token_type {
            TokenType::IntegerType => DataType::Integer,
            TokenType::FloatType => DataType::Float,
            TokenType::StringType => DataType::String,
            TokenType::BoolType => DataType::Bool,
            _ => {
                return Err(self.error(
                    Problem::SyntaxError,
                    "Type mark must be \"INTEGER\", \"FLOAT\", \"STRING\", or \"BOOL\"".to_string(),
                ))
            }
        };
        self.advance();
        Ok(data_type)
    }
}
