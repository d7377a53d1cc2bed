//! Expression productions.
//!
//! Every production returns the resolved data type, array size and value
//! handle of what it lowered. The resolved pair is a pure function of the
//! sub-expressions' pairs; the rules live in [`crate::typing`] and the
//! instruction selection in the code generator.
use log::trace;

use pasc_codegen::{ArithOp, BitwiseOp, Generator, RelationOp, TermOp};
use pasc_dsl::core::Id;
use pasc_dsl::symbol::{DataType, Symbol, SymbolKind};
use pasc_problems::Problem;

use crate::token::TokenType;
use crate::typing;

use super::{ExprInfo, Parse, Parser};

impl Parser<'_> {
    /// Expression := [NOT] ArithOp { (& | "|") [NOT] ArithOp }
    ///
    /// The logical operators work on integers only; booleans reach here as
    /// 0/1 integers and are combined bitwise.
    pub(crate) fn expression(&mut self) -> Parse<ExprInfo> {
        let negated = self.at(&TokenType::Not);
        if negated {
            self.advance();
        }
        let mut left = self.arith_op()?;
        if negated {
            left = self.complement(left)?;
        }

        loop {
            let (operation, symbol) = match self.current.token_type {
                TokenType::And => (BitwiseOp::And, "&"),
                TokenType::Or => (BitwiseOp::Or, "|"),
                _ => {
                    trace!("Parsed expression");
                    return Ok(left);
                }
            };
            if left.data_type != DataType::Integer {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "\"{}\" operator not allowed for type \"{}\"",
                        symbol, left.data_type
                    ),
                ));
            }
            self.advance();

            let negate_right = self.at(&TokenType::Not);
            if negate_right {
                self.advance();
            }
            let right = self.arith_op()?;
            if right.data_type != DataType::Integer {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "\"{}\" operator not allowed for type \"{}\"",
                        symbol, right.data_type
                    ),
                ));
            }
            let right = if negate_right {
                self.complement(right)?
            } else {
                right
            };

            let Some(array_size) = typing::reconcile_sizes(left.array_size, right.array_size)
            else {
                return Err(
                    self.error(Problem::ArraySizeMismatch, "Array size mismatch".to_string())
                );
            };
            let value = self.generator.bitwise(
                operation,
                &left.value,
                left.array_size,
                &right.value,
                right.array_size,
            );
            left = ExprInfo {
                data_type: DataType::Integer,
                array_size,
                value,
            };
        }
    }

    /// Applies `NOT`: a bitwise complement, legal on integers only.
    fn complement(&mut self, operand: ExprInfo) -> Parse<ExprInfo> {
        if operand.data_type != DataType::Integer {
            return Err(self.error(
                Problem::TypeMismatch,
                format!(
                    "\"NOT\" operator not allowed for type \"{}\"",
                    operand.data_type
                ),
            ));
        }
        let value = self.generator.complement(&operand.value, operand.array_size);
        Ok(ExprInfo {
            data_type: DataType::Integer,
            array_size: operand.array_size,
            value,
        })
    }

    /// ArithOp := Relation { (+|-) Relation }
    ///
    /// Operands must be numeric; the result is float when either side is.
    pub(crate) fn arith_op(&mut self) -> Parse<ExprInfo> {
        let mut left = self.relation()?;
        loop {
            let (operation, action) = match self.current.token_type {
                TokenType::Plus => (ArithOp::Add, "add"),
                TokenType::Minus => (ArithOp::Sub, "subtract"),
                _ => {
                    trace!("Parsed arithmetic operation");
                    return Ok(left);
                }
            };
            if !left.data_type.is_numeric() {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!("Cannot {} type \"{}\"", action, left.data_type),
                ));
            }
            self.advance();

            let right = self.relation()?;
            let Some(result_type) = typing::arithmetic_result(left.data_type, right.data_type)
            else {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!("Cannot {} type \"{}\"", action, right.data_type),
                ));
            };
            let Some(array_size) = typing::reconcile_sizes(left.array_size, right.array_size)
            else {
                return Err(
                    self.error(Problem::ArraySizeMismatch, "Array size mismatch".to_string())
                );
            };

            let left_value =
                self.apply_conversion(result_type, &left.value, left.data_type, left.array_size);
            let right_value =
                self.apply_conversion(result_type, &right.value, right.data_type, right.array_size);
            let value = self.generator.arith(
                operation,
                result_type,
                &left_value,
                left.array_size,
                &right_value,
                right.array_size,
            );
            left = ExprInfo {
                data_type: result_type,
                array_size,
                value,
            };
        }
    }

    /// Relation := Term { relop Term }
    ///
    /// `==` and `!=` additionally permit strings, routed to the runtime
    /// string compare. The result is always boolean.
    pub(crate) fn relation(&mut self) -> Parse<ExprInfo> {
        let mut left = self.term()?;
        loop {
            let (operation, symbol, equality) = match self.current.token_type {
                TokenType::Equal => (RelationOp::Eq, "==", true),
                TokenType::NotEqual => (RelationOp::Ne, "!=", true),
                TokenType::Greater => (RelationOp::Gt, ">", false),
                TokenType::GreaterEqual => (RelationOp::GtEq, ">=", false),
                TokenType::Less => (RelationOp::Lt, "<", false),
                TokenType::LessEqual => (RelationOp::LtEq, "<=", false),
                _ => {
                    trace!("Parsed relation");
                    return Ok(left);
                }
            };
            if !equality && left.data_type == DataType::String {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "\"{}\" operator not allowed for type \"{}\"",
                        symbol, left.data_type
                    ),
                ));
            }
            self.advance();

            let right = self.term()?;
            if !equality && right.data_type == DataType::String {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "\"{}\" operator not allowed for type \"{}\"",
                        symbol, right.data_type
                    ),
                ));
            }
            let Some((operand_type, _, _)) =
                typing::comparison_operands(left.data_type, right.data_type)
            else {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "Cannot compare \"{}\" with \"{}\"",
                        left.data_type, right.data_type
                    ),
                ));
            };
            let Some(array_size) = typing::reconcile_sizes(left.array_size, right.array_size)
            else {
                return Err(
                    self.error(Problem::ArraySizeMismatch, "Array size mismatch".to_string())
                );
            };

            let left_value =
                self.apply_conversion(operand_type, &left.value, left.data_type, left.array_size);
            let right_value = self.apply_conversion(
                operand_type,
                &right.value,
                right.data_type,
                right.array_size,
            );
            let value = if operand_type == DataType::String {
                self.generator
                    .relation_string(operation, &left_value, &right_value)
            } else {
                self.generator.relation(
                    operation,
                    operand_type,
                    &left_value,
                    left.array_size,
                    &right_value,
                    right.array_size,
                )
            };
            left = ExprInfo {
                data_type: DataType::Bool,
                array_size,
                value,
            };
        }
    }

    /// Term := Factor { (*|/) Factor }
    pub(crate) fn term(&mut self) -> Parse<ExprInfo> {
        let mut left = self.factor()?;
        loop {
            let (operation, action) = match self.current.token_type {
                TokenType::Times => (TermOp::Mul, "multiply"),
                TokenType::Divide => (TermOp::Div, "divide"),
                _ => {
                    trace!("Parsed term");
                    return Ok(left);
                }
            };
            if !left.data_type.is_numeric() {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!("Cannot {} type \"{}\"", action, left.data_type),
                ));
            }
            self.advance();

            let right = self.factor()?;
            let Some(result_type) = typing::arithmetic_result(left.data_type, right.data_type)
            else {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!("Cannot {} type \"{}\"", action, right.data_type),
                ));
            };
            let Some(array_size) = typing::reconcile_sizes(left.array_size, right.array_size)
            else {
                return Err(
                    self.error(Problem::ArraySizeMismatch, "Array size mismatch".to_string())
                );
            };

            let left_value =
                self.apply_conversion(result_type, &left.value, left.data_type, left.array_size);
            let right_value =
                self.apply_conversion(result_type, &right.value, right.data_type, right.array_size);
            let value = self.generator.term(
                operation,
                result_type,
                &left_value,
                left.array_size,
                &right_value,
                right.array_size,
            );
            left = ExprInfo {
                data_type: result_type,
                array_size,
                value,
            };
        }
    }

    /// Factor := ( Expression ) | [-] (id Reference) | [-] number | string | bool
    pub(crate) fn factor(&mut self) -> Parse<ExprInfo> {
        // A nested expression.
        if self.at(&TokenType::LeftParen) {
            self.advance();
            let inner = self.expression()?;
            self.expect(TokenType::RightParen, "\")\" expected after expression")?;
            trace!("Parsed factor as a nested expression");
            return Ok(inner);
        }

        // A reference to a declared symbol: a variable load or a call.
        if let TokenType::Identifier(name) = &self.current.token_type {
            let id = Id::from(name).with_span(self.current.span.clone());
            let symbol = match self.scope.resolve(&id) {
                Some(symbol) => symbol.clone(),
                None => {
                    return Err(self.error(
                        Problem::UnknownSymbol,
                        format!("Reference to unknown symbol \"{}\"", id),
                    ))
                }
            };
            let info = match symbol.kind() {
                SymbolKind::Variable => self.variable_reference(symbol)?,
                SymbolKind::Procedure => self.procedure_reference(symbol)?,
            };
            trace!("Parsed factor as symbol reference");
            return Ok(info);
        }

        // A minus starts either a negated variable or a negative number.
        if self.at(&TokenType::Minus) {
            self.advance();

            if let TokenType::Identifier(name) = &self.current.token_type {
                let id = Id::from(name).with_span(self.current.span.clone());
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
                        "Variable expected after \"-\"".to_string(),
                    ));
                }
                let info = self.variable_reference(symbol)?;
                if !info.data_type.is_numeric() {
                    return Err(self.error(
                        Problem::TypeMismatch,
                        format!("Type \"{}\" cannot be inverted", info.data_type),
                    ));
                }
                let value = self
                    .generator
                    .negate(&info.value, info.data_type, info.array_size);
                trace!("Parsed factor as inverted variable reference");
                return Ok(ExprInfo {
                    data_type: info.data_type,
                    array_size: info.array_size,
                    value,
                });
            }

            // Negative literals fold the sign into the constant.
            let info = match self.current.token_type {
                TokenType::IntegerLiteral(value) => ExprInfo {
                    data_type: DataType::Integer,
                    array_size: 0,
                    value: Generator::const_int(-value),
                },
                TokenType::FloatLiteral(value) => ExprInfo {
                    data_type: DataType::Float,
                    array_size: 0,
                    value: Generator::const_float(-value),
                },
                _ => {
                    return Err(self.error(
                        Problem::SyntaxError,
                        "Name or number expected after \"-\"".to_string(),
                    ))
                }
            };
            self.advance();
            trace!("Parsed factor as negative number literal");
            return Ok(info);
        }

        // Literals.
        let info = match &self.current.token_type {
            TokenType::IntegerLiteral(value) => ExprInfo {
                data_type: DataType::Integer,
                array_size: 0,
                value: Generator::const_int(*value),
            },
            TokenType::FloatLiteral(value) => ExprInfo {
                data_type: DataType::Float,
                array_size: 0,
                value: Generator::const_float(*value),
            },
            TokenType::StringLiteral(value) => {
                let value = value.clone();
                ExprInfo {
                    data_type: DataType::String,
                    array_size: 0,
                    value: self.generator.const_string(&value),
                }
            }
            TokenType::True => ExprInfo {
                data_type: DataType::Bool,
                array_size: 0,
                value: Generator::const_bool(true),
            },
            TokenType::False => ExprInfo {
                data_type: DataType::Bool,
                array_size: 0,
                value: Generator::const_bool(false),
            },
            _ => return Err(self.error(Problem::SyntaxError, "Expected a factor".to_string())),
        };
        self.advance();
        trace!("Parsed factor as literal");
        Ok(info)
    }

    /// A variable read, optionally of one element. The index must be a
    /// scalar integer and indexing is legal only on arrays.
    fn variable_reference(&mut self, variable: Symbol) -> Parse<ExprInfo> {
        self.advance(); // past the identifier

        let data_type = variable.data_type();
        let array_size = variable.array_size();
        if !self.at(&TokenType::LeftBracket) {
            let value = self.generator.variable_reference(&variable, None);
            return Ok(ExprInfo {
                data_type,
                array_size,
                value,
            });
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
        let value = self.generator.variable_reference(&variable, Some(&index.value));
        Ok(ExprInfo {
            data_type,
            array_size: 0,
            value,
        })
    }

    /// A call. Arity is checked first, then each argument against the
    /// declared parameter: the compatibility table applies with a
    /// conversion inserted where needed, and array sizes must match
    /// exactly.
    fn procedure_reference(&mut self, procedure: Symbol) -> Parse<ExprInfo> {
        self.advance(); // past the identifier

        self.expect(TokenType::LeftParen, "\"(\" expected after procedure name")?;
        let mut arguments = Vec::new();
        if !self.at(&TokenType::RightParen) {
            loop {
                arguments.push(self.expression()?);
                if self.at(&TokenType::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenType::RightParen, "\")\" expected after argument list")?;

        let parameters = procedure.parameters();
        if arguments.len() != parameters.len() {
            return Err(self.error(
                Problem::ArityMismatch,
                format!(
                    "\"{}\" expects {} argument(s) but {} were supplied",
                    procedure.name(),
                    parameters.len(),
                    arguments.len()
                ),
            ));
        }

        let mut lowered = Vec::with_capacity(arguments.len());
        for (argument, parameter) in arguments.iter().zip(parameters) {
            if !typing::assign_compatible(parameter.data_type(), argument.data_type) {
                return Err(self.error(
                    Problem::TypeMismatch,
                    format!(
                        "Type mismatch of \"{}\" and \"{}\"",
                        argument.data_type,
                        parameter.data_type()
                    ),
                ));
            }
            if parameter.array_size() != argument.array_size {
                return Err(self.error(
                    Problem::ArraySizeMismatch,
                    "Array size mismatch".to_string(),
                ));
            }
            let value = self.apply_conversion(
                parameter.data_type(),
                &argument.value,
                argument.data_type,
                argument.array_size,
            );
            lowered.push((value, parameter.data_type(), parameter.array_size()));
        }

        let value = self.generator.procedure_reference(&procedure, &lowered);
        trace!("Parsed procedure call \"{}\"", procedure.name());
        Ok(ExprInfo {
            data_type: procedure.data_type(),
            array_size: 0,
            value,
        })
    }
}
