//! Tests for the filter parser.

use super::*;

fn tag(name: &str) -> FilterNode {
    FilterNode::tag(name, true)
}

fn parse(input: &str) -> FilterNode {
    FilterParser::parse(input).unwrap()
}

fn parse_err(input: &str) -> ParseError {
    FilterParser::parse(input).unwrap_err()
}

// ==================== Term Tests ====================

#[test]
fn test_parse_tag() {
    assert_eq!(parse("+home"), tag("home"));
    assert_eq!(parse("-home"), FilterNode::tag("home", false));
}

#[test]
fn test_parse_attribute() {
    assert_eq!(
        parse("project:work"),
        FilterNode::attribute("project", AttributeOperator::Equals, "work")
    );
    assert_eq!(
        parse("due.before:eow"),
        FilterNode::attribute("due", AttributeOperator::Before, "eow")
    );
    assert_eq!(
        parse("description.has:milk"),
        FilterNode::attribute("description", AttributeOperator::Contains, "milk")
    );
}

#[test]
fn test_parse_quoted_attribute_value() {
    assert_eq!(
        parse("project:\"home office\""),
        FilterNode::attribute("project", AttributeOperator::Equals, "home office")
    );
}

#[test]
fn test_parse_unknown_modifier_is_text() {
    assert_eq!(parse("project.bogus:x"), FilterNode::text("project.bogus:x"));
}

#[test]
fn test_parse_regex() {
    assert_eq!(
        parse("description~/^a b$/"),
        FilterNode::regex("description", "^a b$")
    );
}

#[test]
fn test_parse_virtual_tags() {
    assert_eq!(parse("+OVERDUE"), FilterNode::virtual_tag("OVERDUE"));
    assert_eq!(parse("OVERDUE"), FilterNode::virtual_tag("OVERDUE"));
    assert_eq!(parse("-OVERDUE"), FilterNode::tag("OVERDUE", false));
}

#[test]
fn test_parse_literal() {
    assert_eq!(parse("milk"), FilterNode::text("milk"));
    // Quoted keywords are text, not operators.
    assert_eq!(parse("\"and\""), FilterNode::text("and"));
}

// ==================== Boolean Operator Tests ====================

#[test]
fn test_parse_and() {
    assert_eq!(parse("+a and +b"), FilterNode::and(tag("a"), tag("b")));
}

#[test]
fn test_parse_or() {
    assert_eq!(parse("+a or +b"), FilterNode::or(tag("a"), tag("b")));
}

#[test]
fn test_parse_not() {
    assert_eq!(parse("not +a"), FilterNode::negate(tag("a")));
}

#[test]
fn test_parse_double_not() {
    assert_eq!(
        parse("not not +a"),
        FilterNode::negate(FilterNode::negate(tag("a")))
    );
}

#[test]
fn test_keywords_case_insensitive() {
    assert_eq!(parse("+a AND +b"), parse("+a and +b"));
    assert_eq!(parse("+a Or +b"), parse("+a or +b"));
    assert_eq!(parse("NOT +a"), parse("not +a"));
}

// ==================== Implicit AND Tests ====================

#[test]
fn test_implicit_and_between_terms() {
    assert_eq!(parse("+a +b"), parse("+a and +b"));
    assert_eq!(
        parse("project:work milk"),
        FilterNode::and(
            FilterNode::attribute("project", AttributeOperator::Equals, "work"),
            FilterNode::text("milk"),
        )
    );
}

#[test]
fn test_implicit_and_around_groups() {
    assert_eq!(
        parse("(+a or +b) +c"),
        FilterNode::and(FilterNode::or(tag("a"), tag("b")), tag("c"))
    );
    assert_eq!(
        parse("+c (+a or +b)"),
        FilterNode::and(tag("c"), FilterNode::or(tag("a"), tag("b")))
    );
}

#[test]
fn test_implicit_and_before_not() {
    assert_eq!(
        parse("+a not +b"),
        FilterNode::and(tag("a"), FilterNode::negate(tag("b")))
    );
}

#[test]
fn test_implicit_and_binds_like_and() {
    assert_eq!(
        parse("+a or +b +c"),
        FilterNode::or(tag("a"), FilterNode::and(tag("b"), tag("c")))
    );
}

// ==================== Operator Precedence Tests ====================

#[test]
fn test_and_has_higher_precedence_than_or() {
    assert_eq!(
        parse("+a or +b and +c"),
        FilterNode::or(tag("a"), FilterNode::and(tag("b"), tag("c")))
    );
    assert_eq!(
        parse("+a and +b or +c"),
        FilterNode::or(FilterNode::and(tag("a"), tag("b")), tag("c"))
    );
}

#[test]
fn test_not_has_highest_precedence() {
    assert_eq!(
        parse("not +a and +b"),
        FilterNode::and(FilterNode::negate(tag("a")), tag("b"))
    );
    assert_eq!(
        parse("not +a or +b"),
        FilterNode::or(FilterNode::negate(tag("a")), tag("b"))
    );
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(
        parse("(+a or +b) and +c"),
        FilterNode::and(FilterNode::or(tag("a"), tag("b")), tag("c"))
    );
    assert_eq!(
        parse("not (+a or +b)"),
        FilterNode::negate(FilterNode::or(tag("a"), tag("b")))
    );
}

#[test]
fn test_binary_operators_left_associative() {
    assert_eq!(
        parse("+a or +b or +c"),
        FilterNode::or(FilterNode::or(tag("a"), tag("b")), tag("c"))
    );
    assert_eq!(
        parse("+a and +b and +c"),
        FilterNode::and(FilterNode::and(tag("a"), tag("b")), tag("c"))
    );
}

#[test]
fn test_parse_nested_parentheses() {
    assert_eq!(parse("((+a or (+b)))"), FilterNode::or(tag("a"), tag("b")));
}

// ==================== Error Tests ====================

#[test]
fn test_error_empty_expression() {
    assert_eq!(parse_err(""), ParseError::EmptyExpression);
    assert_eq!(parse_err("   "), ParseError::EmptyExpression);
    assert_eq!(parse_err("").offset(), 0);
}

#[test]
fn test_error_trailing_operator() {
    let err = parse_err("+a and");
    assert_eq!(err, ParseError::UnexpectedEndOfInput { position: 6 });
    assert_eq!(err.offset(), 6);

    assert_eq!(
        parse_err("not"),
        ParseError::UnexpectedEndOfInput { position: 3 }
    );
}

#[test]
fn test_error_leading_operator() {
    assert_eq!(parse_err("and +a"), ParseError::unexpected_token("and", 0));
}

#[test]
fn test_error_double_operator() {
    let err = parse_err("+a or or +b");
    assert_eq!(err, ParseError::unexpected_token("or", 6));
    assert_eq!(err.to_string(), "unexpected token 'or' at offset 6");
}

#[test]
fn test_error_empty_parens() {
    assert_eq!(parse_err("()"), ParseError::unexpected_token(")", 1));
    assert_eq!(parse_err(")"), ParseError::unexpected_token(")", 0));
}

#[test]
fn test_error_unclosed_group() {
    let err = parse_err("(+a");
    assert_eq!(err, ParseError::unclosed_group(0));
    assert_eq!(
        err.to_string(),
        "unbalanced parentheses: unclosed group at offset 0"
    );
}

#[test]
fn test_error_unclosed_group_reports_outermost() {
    assert_eq!(parse_err("((+a)"), ParseError::unclosed_group(0));
    assert_eq!(parse_err("+a (+b"), ParseError::unclosed_group(3));
}

#[test]
fn test_error_unmatched_close() {
    let err = parse_err("+a +b)");
    assert_eq!(err, ParseError::unmatched_close(5));
    assert_eq!(
        err.to_string(),
        "unbalanced parentheses: unmatched ')' at offset 5"
    );
}

#[test]
fn test_error_offsets_count_characters() {
    assert_eq!(parse_err("café +a)").offset(), 7);
}

#[test]
fn test_error_unterminated_quote() {
    let err = parse_err("+a \"open");
    assert_eq!(
        err,
        ParseError::Lex(LexError::Unterminated {
            kind: Unterminated::Quote,
            position: 3,
        })
    );
    assert_eq!(err.offset(), 3);
    assert_eq!(
        err.to_string(),
        "unterminated quoted string starting at offset 3"
    );
}

#[test]
fn test_error_unterminated_regex() {
    let err = parse_err("description~/abc");
    assert!(matches!(
        err,
        ParseError::Lex(LexError::Unterminated {
            kind: Unterminated::Regex,
            ..
        })
    ));
    assert_eq!(err.offset(), 12);
}

// ==================== Token Stream Tests ====================

#[test]
fn test_parse_tokens_directly() {
    let tokens = classify(tokenize("+a +b").unwrap());
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[1].kind, TokenKind::Operator(Operator::And));
    assert_eq!(
        parse_tokens(&tokens).unwrap(),
        FilterNode::and(tag("a"), tag("b"))
    );
}

#[test]
fn test_parse_tokens_empty() {
    assert_eq!(parse_tokens(&[]), Err(ParseError::EmptyExpression));
}

// ==================== AST Helper Tests ====================

#[test]
fn test_modifier_aliases() {
    let cases = [
        ("is", AttributeOperator::Equals),
        ("equals", AttributeOperator::Equals),
        ("has", AttributeOperator::Contains),
        ("left", AttributeOperator::StartsWith),
        ("above", AttributeOperator::Over),
        ("below", AttributeOperator::Under),
        ("none", AttributeOperator::None),
    ];
    for (modifier, expected) in cases {
        assert_eq!(AttributeOperator::from_modifier(modifier), Some(expected));
    }
    assert_eq!(AttributeOperator::from_modifier("near"), None);
}

#[test]
fn test_operator_display_is_canonical() {
    assert_eq!(AttributeOperator::Contains.to_string(), "contains");
    assert_eq!(AttributeOperator::StartsWith.to_string(), "startswith");
}

#[test]
fn test_text_is_description_contains() {
    assert_eq!(
        FilterNode::text("milk"),
        FilterNode::attribute("description", AttributeOperator::Contains, "milk")
    );
}

#[test]
fn test_filter_clone_and_debug() {
    let filter = parse("+a or not project:work");
    assert_eq!(filter.clone(), filter);
    assert!(format!("{filter:?}").contains("TagTest"));
}

// ==================== Long Expression Tests ====================

#[test]
fn test_parse_long_implicit_and_chain() {
    let expression = vec!["+a"; 20_000].join(" ");
    let filter = parse(&expression);
    assert!(matches!(filter, FilterNode::And(_, _)));

    let mut leaves = 0;
    filter.for_each_leaf(&mut |_| leaves += 1);
    assert_eq!(leaves, 20_000);
}

#[test]
fn test_parse_deeply_nested_groups_and_not() {
    let depth = 20_000;
    let expression = format!("{}+a{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse(&expression), tag("a"));

    let expression = format!("{}+a", "not ".repeat(depth));
    let filter = parse(&expression);
    assert!(matches!(filter, FilterNode::Not(_)));
}
