//! Statement productions.
//!
//! The expected return type threads through unchanged: it is absent at
//! program scope and set inside every procedure body, including nested
//! ones. If and loop statements never open a new scope or change it.
use log::trace;

use pasc_dsl::core::Id;
use pasc_dsl::symbol::{DataType, Symbol, SymbolKind};
use pasc_problems::Problem;

use crate::token::TokenType;
use crate::typing;

use super::{Parse, Parser};

impl Parser<'_> {
    /// Statement := Assignment | IfStmt | LoopStmt | ReturnStmt
    pub(crate) fn statement(&mut self, return_type: Option<DataType>) -> Parse<()> {
        match &self.current.token_type {
            TokenType::Identifier(_) => self.assignment_statement(),
            TokenType::If => self.if_statement(return_type),
            TokenType::For => self.loop_statement(return_type),
            TokenType::Return => match return_type {
                Some(return_type) => self.return_statement(return_type),
                None => Err(self.error(
                    Problem::ReturnOutsideProcedure,
                    "Return statements are not allowed in the global scope".to_string(),
                )),
            },
            _ => Err(self.error(Problem::SyntaxError, "Expected a statement".to_string())),
        }
    }

    /// Assignment := destination := Expression
    ///
    /// The destination must resolve to a variable. Types follow the
    /// compatibility table with a conversion inserted before the store when
    /// needed; array sizes must match exactly, assignment never broadcasts.
    pub(crate) fn assignment_statement(&mut self) -> Parse<()> {
        self.generator.comment("begin assignment statement");

        let id = match &self.current.token_type {
            TokenType::Identifier(name) => Id::from(name).with_span(self.current.span.clone()),
            _ => {
                return Err(self.error(
                    Problem::SyntaxError,
                    "Expected an identifier as a destination".to_string(),
                ))
            }
        };
        let symbol = match self.scope.resolve(&id) {
            Some(symbol) => symbol.clone(),
            None => {
                return Err(self.error(
                    Problem::UnknownSymbol,
                    format!("Reference to unknown symbol \"{}\"", id),
                ))
            }
        };
        if symbol.kind() != SymbolKind::Variable {
            return Err(self.error(
                Problem::TypeMismatch,
                "Assignment statements must begin with a variable reference".to_string(),
            ));
        }
        let (dest_type, dest_size, index) = self.variable_assignment(&symbol)?;

        self.expect(TokenType::Assign, "\":=\" expected after destination")?;
        let value = self.expression()?;

        if !typing::assign_compatible(dest_type, value.data_type) {
            return Err(self.error(
                Problem::TypeMismatch,
                format!(
                    "Type mismatch between \"{}\" and \"{}\"",
                    dest_type, value.data_type
                ),
            ));
        }
        if dest_size != value.array_size {
            return Err(self.error(
                Problem::ArraySizeMismatch,
                format!(
                    "Array size mismatch between \"{}\" and \"{}\"",
                    dest_size, value.array_size
                ),
            ));
        }

        let converted =
            self.apply_conversion(dest_type, &value.value, value.data_type, value.array_size);
        self.generator.assignment(&symbol, &converted, index.as_ref());
        trace!("Parsed assignment statement");
        Ok(())
    }

    /// The destination of an assignment: the variable itself, or one
    /// element of it. Returns the expected type, the expected array size
    /// (0 when indexing) and the index register to defer to the store.
    fn variable_assignment(
        &mut self,
        variable: &Symbol,
    ) -> Parse<(DataType, u32, Option<pasc_codegen::Reg>)> {
        self.advance(); // past the destination identifier

        let data_type = variable.data_type();
        let array_size = variable.array_size();
        if !self.at(&TokenType::LeftBracket) {
            return Ok((data_type, array_size, None));
        }

        if !variable.is_array() {
            return Err(self.error(
                Problem::TypeMismatch,
                "Cannot index a non-array variable".to_string(),
            ));
        }
        self.advance();
        let index = self.expression()?;
        if index.data_type != DataType::Integer || index.array_size != 0 {
            return Err(self.error(
                Problem::TypeMismatch,
                "Array bounds must be scalar integers".to_string(),
            ));
        }
        self.expect(TokenType::RightBracket, "\"]\" expected after expression")?;
        Ok((data_type, 0, Some(index.value)))
    }

    /// IfStmt := IF ( Expression ) THEN StmtList [ELSE StmtList] END IF
    ///
    /// The condition must reduce to a scalar boolean; a scalar integer is
    /// coerced.
    fn if_statement(&mut self, return_type: Option<DataType>) -> Parse<()> {
        self.expect(TokenType::If, "Expected an \"IF\"")?;
        self.generator.comment("begin if statement");

        self.expect(TokenType::LeftParen, "Expected \"(\" after \"IF\"")?;
        let condition = self.expression()?;
        if (condition.data_type != DataType::Bool && condition.data_type != DataType::Integer)
            || condition.array_size != 0
        {
            return Err(self.error(
                Problem::TypeMismatch,
                "Conditional expression must evaluate to a singular boolean".to_string(),
            ));
        }
        self.expect(TokenType::RightParen, "Expected \")\" after expression")?;

        let mut condition_value = condition.value;
        if condition.data_type == DataType::Integer {
            condition_value = self.generator.int_to_bool(&condition_value, 0);
        }
        let (then_label, next_label) = self.generator.if_header(&condition_value);

        self.expect(TokenType::Then, "Expected \"THEN\" after \")\"")?;
        self.generator.basic_block(&then_label);
        self.statement_list(
            &[TokenType::Else, TokenType::End, TokenType::Eof],
            return_type,
        )?;

        if self.at(&TokenType::Else) {
            let end_label = self.generator.if_else_transition(&next_label);
            self.advance();
            self.statement_list(&[TokenType::End, TokenType::Eof], return_type)?;
            self.generator.if_else_end(&end_label);
        } else {
            self.generator.if_end(&next_label);
        }

        self.expect(TokenType::End, "Expected \"END\" after the statement list")?;
        self.expect(TokenType::If, "Expected \"IF\" after \"END\"")?;
        trace!("Parsed if statement");
        Ok(())
    }

    /// LoopStmt := FOR ( Assignment ; Expression ) StmtList END FOR
    ///
    /// The initializer reuses the assignment production verbatim and runs
    /// once, before the condition block; the condition re-evaluates on
    /// every iteration.
    fn loop_statement(&mut self, return_type: Option<DataType>) -> Parse<()> {
        self.expect(TokenType::For, "Expected \"FOR\" at the start of a loop")?;
        self.generator.comment("begin loop statement");

        self.expect(TokenType::LeftParen, "Expected \"(\" after \"FOR\"")?;
        self.assignment_statement()?;
        self.expect(
            TokenType::Semicolon,
            "Expected \";\" after the assignment statement",
        )?;

        let condition_label = self.generator.for_begin();
        let condition = self.expression()?;
        if (condition.data_type != DataType::Bool && condition.data_type != DataType::Integer)
            || condition.array_size != 0
        {
            return Err(self.error(
                Problem::TypeMismatch,
                "Conditional expression must evaluate to a singular boolean".to_string(),
            ));
        }
        self.expect(TokenType::RightParen, "Expected \")\" after expression")?;

        let mut condition_value = condition.value;
        if condition.data_type == DataType::Integer {
            condition_value = self.generator.int_to_bool(&condition_value, 0);
        }
        let end_label = self.generator.for_body(&condition_value);

        self.statement_list(&[TokenType::End, TokenType::Eof], return_type)?;
        self.generator.for_end(&condition_label, &end_label);

        self.expect(TokenType::End, "Expected \"END\" after statement list")?;
        self.expect(TokenType::For, "Expected \"FOR\" after \"END\"")?;
        trace!("Parsed loop statement");
        Ok(())
    }

    /// ReturnStmt := RETURN Expression
    ///
    /// The expression must coerce to the procedure's declared return type
    /// and must not be an array.
    fn return_statement(&mut self, return_type: DataType) -> Parse<()> {
        self.generator.comment("begin return statement");
        self.expect(TokenType::Return, "Expected \"RETURN\"")?;

        let value = self.expression()?;
        if !typing::assign_compatible(return_type, value.data_type) {
            return Err(self.error(
                Problem::TypeMismatch,
                format!(
                    "Type mismatch between \"{}\" and \"{}\"",
                    return_type, value.data_type
                ),
            ));
        }
        if value.array_size != 0 {
            return Err(self.error(
                Problem::ArraySizeMismatch,
                "Cannot return an array".to_string(),
            ));
        }

        let converted = self.apply_conversion(return_type, &value.value, value.data_type, 0);
        self.generator.return_value(&converted, return_type);
        trace!("Parsed return statement");
        Ok(())
    }
}
