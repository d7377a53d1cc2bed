//! Single-pass front end for the pasc compiler.
//!
//! [`compile`] runs the whole pipeline in one traversal of the source: the
//! lexer produces tokens on demand, the recursive-descent parser recognizes
//! the grammar, resolves identifiers against the scope manager, checks
//! types and array sizes, and drives the code generator inline. The first
//! error aborts compilation; there is no recovery and no second pass.

pub mod lexer;
mod parse;
pub mod scope;
pub mod token;
pub mod typing;

#[cfg(test)]
mod tests;

use pasc_dsl::core::FileId;
use pasc_dsl::diagnostic::Diagnostics;

/// The outcome of one compilation.
pub struct CompileResult {
    /// The complete output program, present only when no error was
    /// reported. Partially generated text is discarded on failure.
    pub ir: Option<String>,
    /// Everything that was reported, in source order.
    pub diagnostics: Diagnostics,
}

/// Compiles one source text into IR.
///
/// Any error-level diagnostic suppresses the output, even when parsing
/// structurally reached the end of the input.
pub fn compile(source: &str, file_id: &FileId) -> CompileResult {
    let mut parser = parse::Parser::new(source, file_id);
    let parsed = parser.program().is_ok();
    let (generator, diagnostics) = parser.into_parts();
    let ir = if parsed && !diagnostics.has_errors() {
        Some(generator.finish())
    } else {
        None
    };
    CompileResult { ir, diagnostics }
}
