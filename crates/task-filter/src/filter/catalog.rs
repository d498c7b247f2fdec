//! Static vocabularies shared by the classifier, evaluator and suggestions.
//!
//! Declaration order matters: suggestions are presented in the order the
//! catalogs list their entries.

/// Boolean operator keywords.
pub const OPERATORS: &[&str] = &["and", "or", "not"];

/// Built-in task attributes, in suggestion order.
pub const ATTRIBUTES: &[&str] = &[
    "description",
    "project",
    "priority",
    "status",
    "due",
    "scheduled",
    "wait",
    "until",
    "entry",
    "modified",
    "urgency",
    "tags",
];

/// Attributes holding timestamps.
pub const DATE_ATTRIBUTES: &[&str] = &["due", "scheduled", "entry", "modified", "wait", "until"];

/// Attribute compared numerically.
pub const NUMERIC_ATTRIBUTE: &str = "urgency";

/// Modifier keywords accepted after `attr.`.
pub const MODIFIERS: &[&str] = &[
    "is",
    "equals",
    "has",
    "contains",
    "startswith",
    "left",
    "word",
    "noword",
    "before",
    "after",
    "over",
    "above",
    "under",
    "below",
    "none",
];

/// Virtual tags the host application may compute.
pub const VIRTUAL_TAGS: &[&str] = &[
    "OVERDUE",
    "TODAY",
    "TOMORROW",
    "WEEK",
    "MONTH",
    "YEAR",
    "PENDING",
    "COMPLETED",
    "DELETED",
    "WAITING",
    "RECURRING",
    "ACTIVE",
    "BLOCKED",
    "READY",
    "URGENT",
];

/// Symbolic dates understood without arithmetic.
pub const DATE_ABBREVIATIONS: &[&str] = &[
    "now",
    "today",
    "tomorrow",
    "yesterday",
    "sod",
    "eod",
    "sow",
    "eow",
    "soww",
    "eoww",
    "som",
    "eom",
    "soq",
    "eoq",
    "soy",
    "eoy",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
    "easter",
    "christmas",
    "newyear",
    "later",
    "someday",
];

pub fn is_date_attribute(name: &str) -> bool {
    DATE_ATTRIBUTES.contains(&name)
}

pub fn is_virtual_tag(name: &str) -> bool {
    VIRTUAL_TAGS.contains(&name)
}

/// Returns true for a name usable as an attribute: a letter or `_` followed
/// by letters, digits, `_` or `-`.
pub fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
