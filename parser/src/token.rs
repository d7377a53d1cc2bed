//! Provides definitions of tokens of the language.
//!
//! Keywords match without regard to case. Whitespace, line comments and
//! nested block comments are consumed between tokens and never surface.
use logos::{Lexer, Logos, Skip};

use pasc_dsl::core::SourceSpan;

/// Consumes a block comment, honoring nesting. An unterminated comment runs
/// to the end of the input, which then lexes as end of file.
fn block_comment(lex: &mut Lexer<TokenType>) -> Skip {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut index = 0usize;
    while index < bytes.len() && depth > 0 {
        if bytes[index] == b'/' && bytes.get(index + 1) == Some(&b'*') {
            depth += 1;
            index += 2;
        } else if bytes[index] == b'*' && bytes.get(index + 1) == Some(&b'/') {
            depth -= 1;
            index += 2;
        } else {
            index += 1;
        }
    }
    lex.bump(index);
    Skip
}

/// Strips the surrounding quotes from a string literal. Escape sequences
/// pass through unchanged.
fn string_literal(lex: &mut Lexer<TokenType>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenType {
    #[regex(r"/\*", block_comment)]
    BlockComment,

    // Grouping and other markers
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(".")]
    Period,

    // Operators
    #[token(":=")]
    Assign,
    #[token("&")]
    And,
    #[token("|")]
    Or,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Times,
    #[token("/")]
    Divide,
    #[token("==")]
    Equal,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,

    // Reserved words
    #[token("PROGRAM", ignore(case))]
    Program,
    #[token("IS", ignore(case))]
    Is,
    #[token("BEGIN", ignore(case))]
    Begin,
    #[token("END", ignore(case))]
    End,
    #[token("GLOBAL", ignore(case))]
    Global,
    #[token("PROCEDURE", ignore(case))]
    Procedure,
    #[token("VARIABLE", ignore(case))]
    Variable,
    #[token("INTEGER", ignore(case))]
    IntegerType,
    #[token("FLOAT", ignore(case))]
    FloatType,
    #[token("STRING", ignore(case))]
    StringType,
    #[token("BOOL", ignore(case))]
    BoolType,
    #[token("IF", ignore(case))]
    If,
    #[token("THEN", ignore(case))]
    Then,
    #[token("ELSE", ignore(case))]
    Else,
    #[token("FOR", ignore(case))]
    For,
    #[token("RETURN", ignore(case))]
    Return,
    #[token("NOT", ignore(case))]
    Not,
    #[token("TRUE", ignore(case))]
    True,
    #[token("FALSE", ignore(case))]
    False,

    // Literals. A number without a decimal point is an integer; with one it
    // is a float.
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    IntegerLiteral(i32),
    #[regex(r"[0-9]+\.[0-9]*", |lex| lex.slice().parse::<f64>().ok())]
    FloatLiteral(f64),
    #[regex(r#""([^"\\]|\\.)*""#, string_literal)]
    StringLiteral(String),
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    /// Produced by the token stream once the input is exhausted. The NUL
    /// pattern keeps the variant lexable but it never occurs in real text.
    #[token("\0")]
    Eof,
}

/// A token together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub span: SourceSpan,
    /// The matched source text, for diagnostics.
    pub text: String,
}
