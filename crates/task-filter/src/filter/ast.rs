//! Abstract Syntax Tree (AST) for filter expressions.

use std::fmt;

/// Comparison applied by an [`FilterNode::AttributeTest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `attr:value` / `attr.is:value`
    Equals,
    /// `attr.has:value`, case-insensitive substring.
    Contains,
    /// `attr.startswith:value`
    StartsWith,
    /// `attr.word:value`, whole-word match.
    Word,
    /// `attr.noword:value`, whole-word non-match.
    NoWord,
    /// `attr.before:value`
    Before,
    /// `attr.after:value`
    After,
    /// `attr.over:value` / `attr.above:value`
    Over,
    /// `attr.under:value` / `attr.below:value`
    Under,
    /// `attr.none:` tests that the attribute is absent.
    None,
}

impl AttributeOperator {
    /// Maps a modifier keyword (already lowercased) to its operator.
    pub fn from_modifier(modifier: &str) -> Option<Self> {
        let op = match modifier {
            "is" | "equals" => AttributeOperator::Equals,
            "has" | "contains" => AttributeOperator::Contains,
            "startswith" | "left" => AttributeOperator::StartsWith,
            "word" => AttributeOperator::Word,
            "noword" => AttributeOperator::NoWord,
            "before" => AttributeOperator::Before,
            "after" => AttributeOperator::After,
            "over" | "above" => AttributeOperator::Over,
            "under" | "below" => AttributeOperator::Under,
            "none" => AttributeOperator::None,
            _ => return Option::None,
        };
        Some(op)
    }

    /// The canonical modifier keyword for this operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeOperator::Equals => "equals",
            AttributeOperator::Contains => "contains",
            AttributeOperator::StartsWith => "startswith",
            AttributeOperator::Word => "word",
            AttributeOperator::NoWord => "noword",
            AttributeOperator::Before => "before",
            AttributeOperator::After => "after",
            AttributeOperator::Over => "over",
            AttributeOperator::Under => "under",
            AttributeOperator::None => "none",
        }
    }
}

impl fmt::Display for AttributeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed filter expression.
///
/// A `FilterNode` is produced by [`compile_filter`](crate::compile_filter) and
/// is immutable afterwards, so one tree can be evaluated from many threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterNode {
    // ==================== Boolean Operators ====================
    /// Logical AND of two filters.
    And(Box<FilterNode>, Box<FilterNode>),

    /// Logical OR of two filters.
    Or(Box<FilterNode>, Box<FilterNode>),

    /// Logical NOT of a filter.
    Not(Box<FilterNode>),

    // ==================== Predicates ====================
    /// Compares a task attribute against a value.
    AttributeTest {
        /// Attribute name, lowercased (`due`, `project`, a UDA name, ...).
        attribute: String,
        /// How to compare.
        operator: AttributeOperator,
        /// Raw right-hand side; date attributes resolve it at evaluation time.
        value: String,
    },

    /// `+tag` / `-tag`.
    TagTest {
        /// Tag name without the sign.
        tag: String,
        /// `false` for the `-tag` exclusion form.
        include: bool,
    },

    /// `attr~/pattern/`.
    RegexTest {
        /// Attribute the pattern is matched against.
        attribute: String,
        /// Uncompiled pattern text.
        pattern: String,
    },

    /// A host-computed tag such as `OVERDUE`.
    VirtualTagTest {
        /// Uppercase catalog name.
        name: String,
    },
}

impl FilterNode {
    /// Creates an AND filter from two filters.
    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        FilterNode::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR filter from two filters.
    pub fn or(left: FilterNode, right: FilterNode) -> Self {
        FilterNode::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT filter from another filter.
    ///
    /// # Example
    ///
    /// ```
    /// use task_filter_rs::filter::FilterNode;
    ///
    /// let filter = FilterNode::negate(FilterNode::tag("done", true));
    /// assert!(matches!(filter, FilterNode::Not(_)));
    /// ```
    pub fn negate(inner: FilterNode) -> Self {
        FilterNode::Not(Box::new(inner))
    }

    /// Creates an attribute comparison.
    pub fn attribute(
        attribute: impl Into<String>,
        operator: AttributeOperator,
        value: impl Into<String>,
    ) -> Self {
        FilterNode::AttributeTest {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates a tag membership test.
    pub fn tag(tag: impl Into<String>, include: bool) -> Self {
        FilterNode::TagTest {
            tag: tag.into(),
            include,
        }
    }

    /// Creates a regex test.
    pub fn regex(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        FilterNode::RegexTest {
            attribute: attribute.into(),
            pattern: pattern.into(),
        }
    }

    /// Creates a virtual tag test.
    pub fn virtual_tag(name: impl Into<String>) -> Self {
        FilterNode::VirtualTagTest { name: name.into() }
    }

    /// Free text, which is a case-insensitive substring test on `description`.
    pub fn text(text: impl Into<String>) -> Self {
        FilterNode::attribute("description", AttributeOperator::Contains, text)
    }

    /// Visits every predicate leaf, left to right.
    pub(crate) fn for_each_leaf<'a>(&'a self, visit: &mut impl FnMut(&'a FilterNode)) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                FilterNode::And(left, right) | FilterNode::Or(left, right) => {
                    pending.push(right);
                    pending.push(left);
                }
                FilterNode::Not(inner) => pending.push(inner),
                leaf => visit(leaf),
            }
        }
    }

    /// Moves the children of a boolean node into `out`, leaving empty leaves.
    fn detach_children(&mut self, out: &mut Vec<FilterNode>) {
        match self {
            FilterNode::And(left, right) | FilterNode::Or(left, right) => {
                out.push(std::mem::replace(left.as_mut(), FilterNode::empty()));
                out.push(std::mem::replace(right.as_mut(), FilterNode::empty()));
            }
            FilterNode::Not(inner) => {
                out.push(std::mem::replace(inner.as_mut(), FilterNode::empty()));
            }
            _ => {}
        }
    }

    fn empty() -> Self {
        FilterNode::VirtualTagTest {
            name: String::new(),
        }
    }
}

// A long `and` chain nests one box per term; dropping it recursively would
// overflow the stack.
impl Drop for FilterNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}
