//! Filter expression parser and evaluator for task queries.
//!
//! This module compiles filter expressions typed into a command bar into a
//! [`FilterNode`] tree and evaluates that tree against tasks, without a
//! database round-trip.
//!
//! # Supported Syntax
//!
//! ## Attributes
//! - `project:work` - Attribute equals value
//! - `description.contains:milk` - Attribute with a modifier
//!   (`is`, `has`, `startswith`, `word`, `noword`, `before`, `after`,
//!   `over`, `under`, `none`)
//! - `project:"home office"` - Quoted value
//!
//! ## Tags
//! - `+home` / `-home` - Task has / lacks a tag
//! - `+OVERDUE`, `BLOCKED` - Virtual tags computed by the host
//!
//! ## Regular Expressions
//! - `description~/^fix (ci|build)/` - Attribute matches a regex
//!
//! ## Dates
//! - `due.before:eow` - Symbolic dates (`today`, `eom`, `soq`, `easter`, ...)
//! - `due:2024-06-05`, `due.after:today+3d` - Absolute dates and arithmetic
//! - `due.before:"2nd tuesday of next month"`, `due:"+3 business days"`
//!
//! ## Boolean Operators
//! - `and`, `or`, `not` - Case-insensitive keywords
//! - `()` - Grouping
//! - Adjacent terms are joined with an implicit `and`
//!
//! Anything else is free text matched against the description.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use task_filter_rs::filter::{FilterEvaluator, FilterNode, FilterParser, Task};
//!
//! // Parse a filter expression
//! let filter = FilterParser::parse("+home or project:errands").unwrap();
//! assert!(matches!(filter, FilterNode::Or(_, _)));
//!
//! // Create an evaluator with a fixed "now"
//! let now = NaiveDate::from_ymd_opt(2024, 6, 3)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//! let evaluator = FilterEvaluator::new(&filter, now);
//!
//! // Filter tasks
//! let mut errand = Task::new("Post letter");
//! errand.project = Some("errands".to_string());
//! let tasks = vec![Task::new("Read book"), errand];
//! let results = evaluator.filter_tasks(&tasks);
//! assert_eq!(results.len(), 1);
//! ```

mod ast;
pub mod catalog;
mod classifier;
mod dates;
mod error;
mod evaluator;
mod lexer;
mod parser;
mod suggest;
mod task;

pub use ast::{AttributeOperator, FilterNode};
pub use classifier::{classify, classify_token, Operator, Token, TokenKind};
pub use dates::{easter, resolve_date, DateResolver, Timestamp};
pub use error::{LexError, ParenMismatch, ParseError, ParseResult, Unterminated};
pub use evaluator::{evaluate, FilterEvaluator};
pub use lexer::{tokenize, Lexer, RawToken};
pub use parser::{parse_tokens, FilterParser};
pub use suggest::{suggest, SuggestionEngine};
pub use task::{Priority, Status, Task, TaskView};

#[cfg(test)]
mod tests;
