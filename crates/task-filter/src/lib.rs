//! Query filter engine for task lists.
//!
//! This crate compiles filter expressions such as
//! `(project:work or project:home) and not +done` into a [`FilterNode`] tree
//! and evaluates that tree against tasks supplied by the host application
//! through the [`TaskView`] trait.
//!
//! Parsing and evaluation are pure: relative dates resolve against a
//! reference time the caller passes in, except for the [`matches`]
//! convenience which reads the local clock once per call.

use serde::Serialize;

pub mod config;
pub mod filter;

pub use config::{ConfigError, FilterConfig, WeekStart};
pub use filter::{
    resolve_date, suggest, AttributeOperator, DateResolver, FilterEvaluator, FilterNode,
    FilterParser, LexError, ParseError, ParseResult, Priority, Status, SuggestionEngine, Task,
    TaskView, Timestamp,
};

/// Compiles a filter expression into an evaluable tree.
///
/// # Example
///
/// ```
/// use task_filter_rs::{compile_filter, FilterNode};
///
/// let node = compile_filter("+urgent -completed").unwrap();
/// assert!(matches!(node, FilterNode::And(_, _)));
///
/// let err = compile_filter("project:work and (").unwrap_err();
/// assert!(err.to_string().contains("unclosed group"));
/// ```
pub fn compile_filter(expression: &str) -> ParseResult<FilterNode> {
    let result = FilterParser::parse(expression);
    match &result {
        Ok(_) => tracing::debug!(%expression, "compiled filter"),
        Err(err) => tracing::debug!(%expression, error = %err, "filter failed to compile"),
    }
    result
}

/// Evaluates `node` against `task`, resolving relative dates against the
/// current local time.
///
/// The result of date tests therefore depends on when it is called. Use
/// [`matches_at`] or a [`FilterEvaluator`] with a fixed reference for
/// reproducible results, and a `FilterEvaluator` when checking many tasks.
pub fn matches<T: TaskView>(node: &FilterNode, task: &T) -> bool {
    matches_at(node, task, chrono::Local::now().naive_local())
}

/// Evaluates `node` against `task` with an explicit reference time.
pub fn matches_at<T: TaskView>(node: &FilterNode, task: &T, reference: Timestamp) -> bool {
    filter::evaluate(node, task, reference)
}

/// Why an expression failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub message: String,
    /// 0-based character offset to highlight.
    pub offset: usize,
}

/// Outcome of [`validate`], shaped for direct rendering by a UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ValidationError>,
}

impl From<ParseResult<FilterNode>> for ValidationResult {
    fn from(result: ParseResult<FilterNode>) -> Self {
        match result {
            Ok(_) => Self {
                is_valid: true,
                error: None,
            },
            Err(err) => Self {
                is_valid: false,
                error: Some(ValidationError {
                    message: err.to_string(),
                    offset: err.offset(),
                }),
            },
        }
    }
}

/// Checks whether an expression compiles, without keeping the tree.
pub fn validate(expression: &str) -> ValidationResult {
    FilterParser::parse(expression).into()
}

/// Configured entry point to the engine.
///
/// The free functions at the crate root use [`FilterConfig::default`]; hosts
/// with their own week start or limits go through a `FilterEngine`.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    config: FilterConfig,
}

impl FilterEngine {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Builds an engine from a TOML snippet.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(FilterConfig::from_toml_str(contents)?))
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn compile(&self, expression: &str) -> ParseResult<FilterNode> {
        compile_filter(expression)
    }

    pub fn validate(&self, expression: &str) -> ValidationResult {
        validate(expression)
    }

    pub fn suggest(&self, partial: &str, cursor: usize) -> Vec<String> {
        SuggestionEngine::from_config(&self.config).suggest(partial, cursor)
    }

    pub fn resolve_date(&self, expr: &str, reference: Timestamp) -> Option<Timestamp> {
        DateResolver::new(self.config.week_start).resolve(expr, reference)
    }

    /// Prepares `filter` for evaluation against many tasks.
    pub fn evaluator<'a>(
        &self,
        filter: &'a FilterNode,
        reference: Timestamp,
    ) -> FilterEvaluator<'a> {
        FilterEvaluator::with_config(filter, reference, &self.config)
    }
}
