//! Turns raw lexer output into typed tokens.
//!
//! Each raw token is offered to an ordered list of matchers; the first one
//! that recognises it decides its kind, and anything left over is free text.

use std::fmt;

use super::ast::AttributeOperator;
use super::catalog;
use super::lexer::RawToken;

/// Boolean operators, with their binding strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    Not,
}

impl Operator {
    /// `or` = 1 < `and` = 2 < `not` = 3.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Not => 3,
        }
    }

    pub fn is_unary(self) -> bool {
        self == Operator::Not
    }

    fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("and") {
            Some(Operator::And)
        } else if word.eq_ignore_ascii_case("or") {
            Some(Operator::Or)
        } else if word.eq_ignore_ascii_case("not") {
            Some(Operator::Not)
        } else {
            None
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => f.write_str("and"),
            Operator::Or => f.write_str("or"),
            Operator::Not => f.write_str("not"),
        }
    }
}

/// The meaning of a classified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Operator(Operator),
    LeftParen,
    RightParen,
    /// `attr:value` or `attr.modifier:value`.
    AttributeFilter {
        attribute: String,
        modifier: AttributeOperator,
        value: String,
    },
    /// `+tag` or `-tag`.
    TagFilter { tag: String, include: bool },
    /// A name from the virtual tag catalog, e.g. `+OVERDUE`.
    VirtualTag { name: String },
    /// `attr~/pattern/`.
    RegexFilter { attribute: String, pattern: String },
    /// Free text matched against the description.
    Literal { text: String },
}

impl TokenKind {
    /// True for tokens that stand for a complete predicate.
    pub fn is_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::AttributeFilter { .. }
                | TokenKind::TagFilter { .. }
                | TokenKind::VirtualTag { .. }
                | TokenKind::RegexFilter { .. }
                | TokenKind::Literal { .. }
        )
    }

    /// Can this token close a term (so a following term needs an `and`)?
    pub(crate) fn ends_term(&self) -> bool {
        self.is_operand() || *self == TokenKind::RightParen
    }

    /// Can this token open a term?
    fn starts_term(&self) -> bool {
        self.is_operand()
            || *self == TokenKind::LeftParen
            || *self == TokenKind::Operator(Operator::Not)
    }
}

/// A classified token with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, used in error messages.
    pub text: String,
    /// Character offset of the token in the expression.
    pub position: usize,
}

impl Token {
    fn implicit_and(position: usize) -> Self {
        Self {
            kind: TokenKind::Operator(Operator::And),
            text: "and".to_string(),
            position,
        }
    }
}

type Matcher = fn(&str) -> Option<TokenKind>;

/// Matchers in priority order.
const MATCHERS: &[Matcher] = &[
    match_paren,
    match_operator,
    match_modified_attribute,
    match_attribute,
    match_tag,
    match_virtual_tag,
    match_regex,
];

fn match_paren(text: &str) -> Option<TokenKind> {
    match text {
        "(" => Some(TokenKind::LeftParen),
        ")" => Some(TokenKind::RightParen),
        _ => None,
    }
}

fn match_operator(text: &str) -> Option<TokenKind> {
    Operator::from_keyword(text).map(TokenKind::Operator)
}

fn match_modified_attribute(text: &str) -> Option<TokenKind> {
    let (lhs, value) = text.split_once(':')?;
    let (attribute, modifier) = lhs.split_once('.')?;
    if !catalog::is_attribute_name(attribute) {
        return None;
    }
    let modifier = AttributeOperator::from_modifier(&modifier.to_lowercase())?;
    Some(TokenKind::AttributeFilter {
        attribute: attribute.to_lowercase(),
        modifier,
        value: value.to_string(),
    })
}

fn match_attribute(text: &str) -> Option<TokenKind> {
    let (attribute, value) = text.split_once(':')?;
    if !catalog::is_attribute_name(attribute) {
        return None;
    }
    Some(TokenKind::AttributeFilter {
        attribute: attribute.to_lowercase(),
        modifier: AttributeOperator::Equals,
        value: value.to_string(),
    })
}

fn match_tag(text: &str) -> Option<TokenKind> {
    let mut chars = text.chars();
    let include = match chars.next()? {
        '+' => true,
        '-' => false,
        _ => return None,
    };
    let tag = chars.as_str();
    if tag.is_empty() || tag.chars().any(char::is_whitespace) {
        return None;
    }
    if include && catalog::is_virtual_tag(tag) {
        return Some(TokenKind::VirtualTag {
            name: tag.to_string(),
        });
    }
    Some(TokenKind::TagFilter {
        tag: tag.to_string(),
        include,
    })
}

fn match_virtual_tag(text: &str) -> Option<TokenKind> {
    catalog::is_virtual_tag(text).then(|| TokenKind::VirtualTag {
        name: text.to_string(),
    })
}

fn match_regex(text: &str) -> Option<TokenKind> {
    let (attribute, rest) = text.split_once("~/")?;
    if !catalog::is_attribute_name(attribute) {
        return None;
    }
    let pattern = rest.strip_suffix('/')?;
    Some(TokenKind::RegexFilter {
        attribute: attribute.to_lowercase(),
        pattern: pattern.to_string(),
    })
}

/// Classifies a single raw token.
pub fn classify_token(raw: &RawToken) -> Token {
    let kind = if raw.quoted {
        None
    } else {
        MATCHERS.iter().find_map(|matcher| matcher(&raw.text))
    };

    Token {
        kind: kind.unwrap_or_else(|| TokenKind::Literal {
            text: raw.text.clone(),
        }),
        text: raw.text.clone(),
        position: raw.position,
    }
}

/// Classifies raw tokens and inserts the implicit `and` between adjacent terms.
pub fn classify(raw: Vec<RawToken>) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::with_capacity(raw.len());

    for token in raw.iter().map(classify_token) {
        let needs_and = tokens
            .last()
            .is_some_and(|prev| prev.kind.ends_term() && token.kind.starts_term());
        if needs_and {
            tokens.push(Token::implicit_and(token.position));
        }
        tokens.push(token);
    }

    tokens
}
