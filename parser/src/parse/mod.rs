//! The recursive-descent parse-and-lower driver.
//!
//! Parsing, identifier resolution, type checking and IR emission all happen
//! in one traversal: each production performs its semantic checks and
//! drives the code generator inline before asking the lexer for the next
//! token. There is no AST and no backtracking. The first structural or
//! semantic violation is reported once, at the point of detection, and
//! aborts every enclosing production.
mod declarations;
mod expressions;
mod statements;

use log::{info, warn};

use pasc_codegen::{Generator, Reg};
use pasc_dsl::core::{FileId, Id};
use pasc_dsl::diagnostic::{Diagnostic, Diagnostics, Label};
use pasc_dsl::symbol::DataType;
use pasc_problems::Problem;

use crate::lexer::Lexer;
use crate::scope::ScopeManager;
use crate::token::{Token, TokenType};
use crate::typing::{self, Conversion};

/// Marker for a failed parse. The diagnostic was already reported at the
/// point of detection; the marker only unwinds the enclosing productions.
pub(crate) struct ParseFail;

/// The uniform outcome of every production.
pub(crate) type Parse<T> = Result<T, ParseFail>;

/// What an expression-family production resolves to on success.
pub(crate) struct ExprInfo {
    pub data_type: DataType,
    /// 0 for scalars, the element count for arrays.
    pub array_size: u32,
    /// Handle of the value in the emitted IR.
    pub value: Reg,
}

/// Parses the program, driving the scope manager and the code generator.
pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    pub(crate) scope: ScopeManager,
    pub(crate) generator: Generator,
    pub(crate) diagnostics: Diagnostics,
}

impl<'a> Parser<'a> {
    /// Creates a parser over the source text and primes the first token.
    pub(crate) fn new(source: &'a str, file_id: &FileId) -> Self {
        let mut diagnostics = Diagnostics::new();
        let mut lexer = Lexer::new(source, file_id);
        let current = lexer.next_token(&mut diagnostics);
        Self {
            lexer,
            current,
            scope: ScopeManager::with_builtins(),
            generator: Generator::new(),
            diagnostics,
        }
    }

    /// Releases the generator and the diagnostics once parsing is over.
    pub(crate) fn into_parts(self) -> (Generator, Diagnostics) {
        (self.generator, self.diagnostics)
    }

    /// Program := PROGRAM id IS DeclList BEGIN StmtList END PROGRAM .
    ///
    /// Anything after the final period is skipped with a warning; that is
    /// the sole non-fatal diagnostic.
    pub(crate) fn program(&mut self) -> Parse<()> {
        self.expect(
            TokenType::Program,
            "\"PROGRAM\" expected at the start of the program",
        )?;
        let name = self.identifier("Identifier expected after \"PROGRAM\"")?;
        info!("Parsing program \"{}\"", name);
        self.expect(TokenType::Is, "\"IS\" expected after identifier")?;

        // Declarations at program level are always global.
        self.declaration_list(&[TokenType::Begin, TokenType::Eof], true)?;
        self.expect(TokenType::Begin, "\"BEGIN\" expected after declaration list")?;

        // No return type is threaded at program scope, so RETURN is illegal
        // until a procedure body establishes one.
        self.statement_list(&[TokenType::End, TokenType::Eof], None)?;
        self.expect(TokenType::End, "\"END\" expected after statement list")?;
        self.expect(TokenType::Program, "\"PROGRAM\" expected after \"END\"")?;
        self.expect(TokenType::Period, "\".\" expected after \"PROGRAM\"")?;

        if !self.at(&TokenType::Eof) {
            let message = "Skipping everything past the end of the program";
            warn!("{}", message);
            self.diagnostics.push(Diagnostic::warning(
                Problem::TrailingContent,
                Label::span(&self.current.span, message),
            ));
        }
        info!("Finished parsing program \"{}\"", name);
        Ok(())
    }

    /// Parses declarations until one of the exit tokens could start the
    /// next item.
    pub(crate) fn declaration_list(
        &mut self,
        exit_tokens: &[TokenType],
        is_global: bool,
    ) -> Parse<()> {
        while !self.at_any(exit_tokens) {
            self.declaration(is_global)?;
            self.expect(TokenType::Semicolon, "\";\" expected after declaration")?;
        }
        Ok(())
    }

    /// Parses statements until one of the exit tokens could start the next
    /// item. The enclosing procedure's return type threads through
    /// unchanged; nested statement lists never alter it.
    pub(crate) fn statement_list(
        &mut self,
        exit_tokens: &[TokenType],
        return_type: Option<DataType>,
    ) -> Parse<()> {
        while !self.at_any(exit_tokens) {
            self.statement(return_type)?;
            self.expect(TokenType::Semicolon, "\";\" expected after statement")?;
        }
        Ok(())
    }

    /// Advances to the next token.
    pub(crate) fn advance(&mut self) {
        self.current = self.lexer.next_token(&mut self.diagnostics);
    }

    /// True when the current token has the given kind; literal payloads are
    /// not compared.
    pub(crate) fn at(&self, token_type: &TokenType) -> bool {
        std::mem::discriminant(&self.current.token_type) == std::mem::discriminant(token_type)
    }

    pub(crate) fn at_any(&self, token_types: &[TokenType]) -> bool {
        token_types.iter().any(|token_type| self.at(token_type))
    }

    /// Consumes the expected token or reports a syntax error.
    pub(crate) fn expect(&mut self, token_type: TokenType, message: &str) -> Parse<()> {
        if self.at(&token_type) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(Problem::SyntaxError, message.to_string()))
        }
    }

    /// Consumes an identifier token and returns it as an `Id`.
    pub(crate) fn identifier(&mut self, message: &str) -> Parse<Id> {
        if let TokenType::Identifier(name) = &self.current.token_type {
            let id = Id::from(name).with_span(self.current.span.clone());
            self.advance();
            Ok(id)
        } else {
            Err(self.error(Problem::SyntaxError, message.to_string()))
        }
    }

    /// Reports a diagnostic at the current token and returns the failure
    /// marker for the caller to propagate.
    pub(crate) fn error(&mut self, problem: Problem, message: String) -> ParseFail {
        log::error!("{}", message);
        self.diagnostics.push(Diagnostic::problem(
            problem,
            Label::span(&self.current.span, message),
        ));
        ParseFail
    }

    /// Emits whichever conversion takes `src` to `dest`, or passes the
    /// value through untouched when the types already match.
    pub(crate) fn apply_conversion(
        &mut self,
        dest: DataType,
        value: &Reg,
        src: DataType,
        array_size: u32,
    ) -> Reg {
        match typing::conversion(dest, src) {
            Some(Conversion::IntToBool) => self.generator.int_to_bool(value, array_size),
            Some(Conversion::BoolToInt) => self.generator.bool_to_int(value, array_size),
            Some(Conversion::IntToFloat) => self.generator.int_to_float(value, array_size),
            Some(Conversion::FloatToInt) => self.generator.float_to_int(value, array_size),
            None => value.clone(),
        }
    }
}
