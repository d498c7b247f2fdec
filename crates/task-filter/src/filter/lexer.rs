//! Lexer (tokenizer) for filter expressions.
//!
//! The lexer only finds token boundaries; deciding what a token means is the
//! classifier's job.

use std::iter::Peekable;
use std::str::Chars;

use super::error::{LexError, Unterminated};

/// A whitespace-delimited chunk of expression text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    /// Token text with quote characters removed.
    pub text: String,
    /// Character offset (0-indexed) where the token starts.
    pub position: usize,
    /// Character offset just past the token in the source, quotes included.
    pub end: usize,
    /// The token began with a `"`, so it is always free text.
    pub quoted: bool,
}

/// Lexer for splitting filter expressions into raw tokens.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Current character position in the input string.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input string.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    /// Consumes and returns the next character, updating position.
    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while let Some(&c) = self.peek() {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Reads a `"..."` segment, appending its contents to `out`.
    fn read_quoted(&mut self, out: &mut String) -> Result<(), LexError> {
        let start = self.position;
        self.next_char(); // opening quote

        while let Some(c) = self.next_char() {
            match c {
                '"' => return Ok(()),
                '\\' => {
                    if let Some(escaped) = self.next_char() {
                        out.push(escaped);
                    }
                }
                _ => out.push(c),
            }
        }

        Err(LexError::Unterminated {
            kind: Unterminated::Quote,
            position: start,
        })
    }

    /// Reads a `/pattern/` body after `~`, keeping both slashes in `out`.
    ///
    /// `\/` inside the pattern stands for a literal slash.
    fn read_regex(&mut self, out: &mut String) -> Result<(), LexError> {
        let start = self.position;
        self.next_char(); // opening slash
        out.push('/');

        while let Some(c) = self.next_char() {
            match c {
                '/' => {
                    out.push('/');
                    return Ok(());
                }
                '\\' => match self.next_char() {
                    Some('/') => out.push('/'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                _ => out.push(c),
            }
        }

        Err(LexError::Unterminated {
            kind: Unterminated::Regex,
            position: start,
        })
    }

    fn read_word(&mut self, position: usize) -> Result<RawToken, LexError> {
        let quoted = self.peek() == Some(&'"');
        let mut text = String::new();

        while let Some(&c) = self.peek() {
            match c {
                c if c.is_whitespace() => break,
                '(' | ')' => break,
                '"' => self.read_quoted(&mut text)?,
                '~' => {
                    self.next_char();
                    text.push('~');
                    if self.peek() == Some(&'/') {
                        self.read_regex(&mut text)?;
                    }
                }
                _ => {
                    self.next_char();
                    text.push(c);
                }
            }
        }

        Ok(RawToken {
            text,
            position,
            end: self.position,
            quoted,
        })
    }

    /// Returns the next token, or None at end of input.
    pub fn next_token(&mut self) -> Option<Result<RawToken, LexError>> {
        self.skip_whitespace();

        let c = *self.peek()?;
        let token_start = self.position;

        match c {
            '(' | ')' => {
                self.next_char();
                Some(Ok(RawToken {
                    text: c.to_string(),
                    position: token_start,
                    end: token_start + 1,
                    quoted: false,
                }))
            }
            _ => Some(self.read_word(token_start)),
        }
    }

    /// Collects all tokens, stopping at the first error.
    pub fn tokenize(mut self) -> Result<Vec<RawToken>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token?);
        }
        Ok(tokens)
    }
}

/// Splits `expression` into raw tokens.
pub fn tokenize(expression: &str) -> Result<Vec<RawToken>, LexError> {
    Lexer::new(expression).tokenize()
}
