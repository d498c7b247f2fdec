//! Error types for the filter tokenizer and parser.

use std::fmt;

use thiserror::Error;

/// A specialized Result type for filter compilation.
pub type ParseResult<T> = Result<T, ParseError>;

/// What kind of atomic segment was left open at end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unterminated {
    /// A `"` without its closing quote.
    Quote,
    /// An `attr~/pattern` without its closing `/`.
    Regex,
}

impl fmt::Display for Unterminated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unterminated::Quote => f.write_str("quoted string"),
            Unterminated::Regex => f.write_str("regex literal"),
        }
    }
}

/// Errors raised while scanning raw expression text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexError {
    /// A quoted string or regex literal was never closed.
    #[error("unterminated {kind} starting at offset {position}")]
    Unterminated {
        /// The kind of segment left open.
        kind: Unterminated,
        /// Character offset of the opening delimiter.
        position: usize,
    },
}

impl LexError {
    /// Returns the 0-based character offset of the error.
    pub fn offset(&self) -> usize {
        match self {
            LexError::Unterminated { position, .. } => *position,
        }
    }
}

/// Why a parenthesis could not be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenMismatch {
    /// A `(` was still open at end of input.
    UnclosedGroup,
    /// A `)` appeared with no open group.
    UnmatchedClose,
}

impl fmt::Display for ParenMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParenMismatch::UnclosedGroup => f.write_str("unclosed group"),
            ParenMismatch::UnmatchedClose => f.write_str("unmatched ')'"),
        }
    }
}

/// Errors that can occur while compiling a filter expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The expression text could not be tokenized.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The filter expression is empty.
    #[error("filter expression is empty")]
    EmptyExpression,

    /// A primary expression was expected but something else was found.
    #[error("unexpected token '{token}' at offset {position}")]
    UnexpectedToken {
        /// Source text of the offending token.
        token: String,
        /// Character offset of the offending token.
        position: usize,
    },

    /// The expression ended where an operand was still required.
    #[error("unexpected end of expression at offset {position}")]
    UnexpectedEndOfInput {
        /// Character offset of the end of input.
        position: usize,
    },

    /// Parentheses do not pair up.
    #[error("unbalanced parentheses: {reason} at offset {position}")]
    UnbalancedParens {
        /// Which side is missing.
        reason: ParenMismatch,
        /// Offset of the unclosed `(` or the stray `)`.
        position: usize,
    },
}

impl ParseError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, position: usize) -> Self {
        ParseError::UnexpectedToken {
            token: token.into(),
            position,
        }
    }

    /// Creates an error for a `(` that is never closed.
    pub fn unclosed_group(position: usize) -> Self {
        ParseError::UnbalancedParens {
            reason: ParenMismatch::UnclosedGroup,
            position,
        }
    }

    /// Creates an error for a `)` without a matching `(`.
    pub fn unmatched_close(position: usize) -> Self {
        ParseError::UnbalancedParens {
            reason: ParenMismatch::UnmatchedClose,
            position,
        }
    }

    /// Returns the 0-based character offset to highlight in the input.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Lex(err) => err.offset(),
            ParseError::EmptyExpression => 0,
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEndOfInput { position }
            | ParseError::UnbalancedParens { position, .. } => *position,
        }
    }
}
