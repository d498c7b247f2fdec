//! Shunting-Yard parser for filter expressions.

use super::ast::FilterNode;
use super::classifier::{classify, Operator, Token, TokenKind};
use super::error::{ParseError, ParseResult};
use super::lexer::tokenize;

/// Parser for filter expressions.
///
/// Parsing runs in three stages: the lexer splits the text, the classifier
/// types each token (inserting implicit `and`s), and [`parse_tokens`] turns
/// the infix token stream into a [`FilterNode`] tree.
///
/// # Grammar
///
/// ```text
/// expression ::= or_expr
/// or_expr    ::= and_expr ("or" and_expr)*
/// and_expr   ::= unary_expr ("and" unary_expr)*
/// unary_expr ::= "not" unary_expr | primary
/// primary    ::= "(" expression ")" | attr_filter | tag | virtual_tag | regex | text
/// ```
///
/// # Operator Precedence (highest to lowest)
///
/// 1. `not` - unary, right-associative
/// 2. `and` - binary, left-associative (also implied between adjacent terms)
/// 3. `or` - binary, left-associative
///
/// # Example
///
/// ```
/// use task_filter_rs::filter::{FilterParser, FilterNode};
///
/// let filter = FilterParser::parse("+urgent or +home").unwrap();
/// assert!(matches!(filter, FilterNode::Or(_, _)));
/// ```
pub struct FilterParser;

impl FilterParser {
    /// Parses a filter expression string into a [`FilterNode`].
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Lex` for an unterminated quote or regex,
    /// `ParseError::EmptyExpression` if the input has no tokens,
    /// `ParseError::UnexpectedToken` / `UnexpectedEndOfInput` where an operand
    /// is missing, and `ParseError::UnbalancedParens` for mismatched groups.
    pub fn parse(input: &str) -> ParseResult<FilterNode> {
        let tokens = classify(tokenize(input)?);
        tracing::trace!(?tokens, "classified filter tokens");
        parse_tokens(&tokens)
    }
}

#[derive(Debug, Clone, Copy)]
enum StackEntry {
    Operator(Operator, usize),
    Group(usize),
}

#[derive(Debug)]
enum PostfixItem {
    Operand(FilterNode),
    Operator(Operator, usize),
}

/// Converts a classified token stream into a filter tree.
pub fn parse_tokens(tokens: &[Token]) -> ParseResult<FilterNode> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }

    let postfix = to_postfix(tokens)?;
    build_tree(postfix)
}

fn operand_node(kind: &TokenKind) -> Option<FilterNode> {
    let node = match kind {
        TokenKind::AttributeFilter {
            attribute,
            modifier,
            value,
        } => FilterNode::attribute(attribute.clone(), *modifier, value.clone()),
        TokenKind::TagFilter { tag, include } => FilterNode::tag(tag.clone(), *include),
        TokenKind::VirtualTag { name } => FilterNode::virtual_tag(name.clone()),
        TokenKind::RegexFilter { attribute, pattern } => {
            FilterNode::regex(attribute.clone(), pattern.clone())
        }
        TokenKind::Literal { text } => FilterNode::text(text.clone()),
        TokenKind::Operator(_) | TokenKind::LeftParen | TokenKind::RightParen => return None,
    };
    Some(node)
}

/// Character offset just past the last token.
fn end_of_input(tokens: &[Token]) -> usize {
    tokens
        .last()
        .map(|t| t.position + t.text.chars().count())
        .unwrap_or(0)
}

/// Shunting-Yard pass: infix tokens to postfix items.
fn to_postfix(tokens: &[Token]) -> ParseResult<Vec<PostfixItem>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<StackEntry> = Vec::new();
    let mut expect_operand = true;

    for token in tokens {
        let position = token.position;
        match (&token.kind, expect_operand) {
            (kind, true) if kind.is_operand() => {
                if let Some(node) = operand_node(kind) {
                    output.push(PostfixItem::Operand(node));
                }
                expect_operand = false;
            }
            (TokenKind::LeftParen, true) => stack.push(StackEntry::Group(position)),
            (TokenKind::Operator(Operator::Not), true) => {
                stack.push(StackEntry::Operator(Operator::Not, position));
            }
            (TokenKind::Operator(op), false) if !op.is_unary() => {
                while let Some(&StackEntry::Operator(top, top_position)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    stack.pop();
                    output.push(PostfixItem::Operator(top, top_position));
                }
                stack.push(StackEntry::Operator(*op, position));
                expect_operand = true;
            }
            (TokenKind::RightParen, false) => loop {
                match stack.pop() {
                    Some(StackEntry::Operator(op, op_position)) => {
                        output.push(PostfixItem::Operator(op, op_position));
                    }
                    Some(StackEntry::Group(_)) => break,
                    None => return Err(ParseError::unmatched_close(position)),
                }
            },
            _ => return Err(ParseError::unexpected_token(token.text.clone(), position)),
        }
    }

    let open_group = stack.iter().find_map(|entry| match entry {
        StackEntry::Group(position) => Some(*position),
        StackEntry::Operator(..) => None,
    });
    if let Some(position) = open_group {
        return Err(ParseError::unclosed_group(position));
    }
    if expect_operand {
        return Err(ParseError::UnexpectedEndOfInput {
            position: end_of_input(tokens),
        });
    }

    while let Some(entry) = stack.pop() {
        if let StackEntry::Operator(op, position) = entry {
            output.push(PostfixItem::Operator(op, position));
        }
    }

    Ok(output)
}

/// Folds postfix items into a tree with an operand stack.
fn build_tree(postfix: Vec<PostfixItem>) -> ParseResult<FilterNode> {
    let mut operands: Vec<FilterNode> = Vec::new();

    for item in postfix {
        match item {
            PostfixItem::Operand(node) => operands.push(node),
            PostfixItem::Operator(op, position) => {
                let missing = || ParseError::unexpected_token(op.to_string(), position);
                let node = match op {
                    Operator::Not => FilterNode::negate(operands.pop().ok_or_else(missing)?),
                    Operator::And | Operator::Or => {
                        let right = operands.pop().ok_or_else(missing)?;
                        let left = operands.pop().ok_or_else(missing)?;
                        if op == Operator::And {
                            FilterNode::and(left, right)
                        } else {
                            FilterNode::or(left, right)
                        }
                    }
                };
                operands.push(node);
            }
        }
    }

    match (operands.pop(), operands.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(ParseError::EmptyExpression),
    }
}
