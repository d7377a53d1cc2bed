//! The lexer, which turns source text into a stream of tokens.
//!
//! The parser pulls one token at a time, so diagnostics keep source order
//! even though lexing and parsing are interleaved. An illegal character is
//! reported and skipped; it does not stop the token stream, though the
//! error it reports still fails the compilation.
use log::error;
use logos::Logos;

use pasc_dsl::core::{FileId, SourceSpan};
use pasc_dsl::diagnostic::{Diagnostic, Diagnostics, Label};
use pasc_problems::Problem;

use crate::token::{Token, TokenType};

/// Produces tokens on demand. Exhausted input yields `Eof` forever.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenType>,
    file_id: FileId,
    length: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file_id: &FileId) -> Self {
        Self {
            inner: TokenType::lexer(source),
            file_id: file_id.clone(),
            length: source.len(),
        }
    }

    /// Scans forward to the next token. Illegal characters are reported to
    /// the diagnostic sink and skipped.
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        loop {
            match self.inner.next() {
                Some(Ok(token_type)) => {
                    let span = self.span();
                    return Token {
                        token_type,
                        span,
                        text: self.inner.slice().to_string(),
                    };
                }
                Some(Err(())) => {
                    let message =
                        format!("Illegal character \"{}\"", self.inner.slice());
                    error!("{}", message);
                    diagnostics.push(Diagnostic::problem(
                        Problem::IllegalCharacter,
                        Label::span(&self.span(), message),
                    ));
                }
                None => {
                    return Token {
                        token_type: TokenType::Eof,
                        span: SourceSpan::range(self.length, self.length)
                            .with_file_id(&self.file_id),
                        text: String::new(),
                    };
                }
            }
        }
    }

    fn span(&self) -> SourceSpan {
        let span = self.inner.span();
        SourceSpan::range(span.start, span.end).with_file_id(&self.file_id)
    }
}
