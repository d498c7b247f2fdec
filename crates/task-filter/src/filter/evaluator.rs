//! Filter evaluation against tasks.
//!
//! This module provides the [`FilterEvaluator`] for evaluating parsed filter
//! expressions against anything implementing [`TaskView`].
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use task_filter_rs::filter::{FilterEvaluator, FilterParser, Task};
//!
//! let filter = FilterParser::parse("project:work +urgent").unwrap();
//! let now = NaiveDate::from_ymd_opt(2024, 6, 3)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//! let evaluator = FilterEvaluator::new(&filter, now);
//!
//! let mut task = Task::new("Prepare slides");
//! task.project = Some("work".to_string());
//! task.tags.insert("urgent".to_string());
//!
//! assert!(evaluator.matches(&task));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use rayon::prelude::*;
use regex::{Regex, RegexBuilder};

use super::ast::{AttributeOperator, FilterNode};
use super::catalog::{self, NUMERIC_ATTRIBUTE};
use super::dates::{DateResolver, Timestamp};
use super::task::{Priority, TaskView};
use crate::config::FilterConfig;

/// Absolute tolerance for urgency equality.
const URGENCY_EPSILON: f64 = 0.01;

/// Layout used when a date attribute is matched as text.
const DATE_TEXT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Evaluates a parsed filter against tasks.
///
/// Construction resolves every date value against the reference time and
/// compiles every regex in the tree, so [`matches`](Self::matches) does no
/// parsing. The evaluator holds no mutable state and can be shared across
/// threads.
#[derive(Debug)]
pub struct FilterEvaluator<'a> {
    filter: &'a FilterNode,
    reference: Timestamp,
    resolver: DateResolver,
    parallel_threshold: usize,
    /// Resolved right-hand sides of date comparisons, by source text.
    dates: HashMap<&'a str, Option<Timestamp>>,
    /// Compiled `attr~/pattern/` terms, by pattern text.
    patterns: HashMap<&'a str, Option<Regex>>,
    /// Compiled whole-word matchers for `.word` / `.noword`, by value.
    words: HashMap<&'a str, Option<Regex>>,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates an evaluator with the default configuration.
    ///
    /// # Arguments
    ///
    /// * `filter` - The parsed filter to evaluate
    /// * `reference` - "Now" for relative dates such as `today` or `eow`
    pub fn new(filter: &'a FilterNode, reference: Timestamp) -> Self {
        Self::with_config(filter, reference, &FilterConfig::default())
    }

    /// Creates an evaluator using the week start and batch settings of `config`.
    pub fn with_config(
        filter: &'a FilterNode,
        reference: Timestamp,
        config: &FilterConfig,
    ) -> Self {
        let mut evaluator = Self {
            filter,
            reference,
            resolver: DateResolver::new(config.week_start),
            parallel_threshold: config.parallel_threshold,
            dates: HashMap::new(),
            patterns: HashMap::new(),
            words: HashMap::new(),
        };
        evaluator.prepare();
        evaluator
    }

    fn prepare(&mut self) {
        let filter = self.filter;
        filter.for_each_leaf(&mut |leaf| match leaf {
            FilterNode::AttributeTest {
                attribute,
                operator,
                value,
            } => {
                if catalog::is_date_attribute(attribute) {
                    if !self.dates.contains_key(value.as_str()) {
                        let resolved = self.resolver.resolve(value, self.reference);
                        if resolved.is_none() && *operator != AttributeOperator::None {
                            tracing::debug!(%attribute, %value, "date value did not resolve");
                        }
                        self.dates.insert(value, resolved);
                    }
                } else if matches!(operator, AttributeOperator::Word | AttributeOperator::NoWord) {
                    self.words
                        .entry(value)
                        .or_insert_with(|| word_regex(value));
                }
            }
            FilterNode::RegexTest { pattern, .. } => {
                self.patterns
                    .entry(pattern)
                    .or_insert_with(|| compile_pattern(pattern));
            }
            _ => {}
        });

        tracing::debug!(
            dates = self.dates.len(),
            patterns = self.patterns.len(),
            words = self.words.len(),
            "prepared filter evaluator"
        );
    }

    /// Returns true if the task matches the filter.
    pub fn matches<T: TaskView>(&self, task: &T) -> bool {
        self.evaluate_node(self.filter, task)
    }

    /// Filters a slice of tasks, returning the matches in input order.
    ///
    /// Batches of at least `parallel_threshold` tasks are evaluated on the
    /// rayon thread pool.
    pub fn filter_tasks<'b, T: TaskView + Sync>(&self, tasks: &'b [T]) -> Vec<&'b T> {
        if tasks.len() >= self.parallel_threshold {
            tasks.par_iter().filter(|task| self.matches(*task)).collect()
        } else {
            tasks.iter().filter(|task| self.matches(*task)).collect()
        }
    }

    /// Evaluates a filter node against a task.
    ///
    /// Walks the tree with an explicit stack so long `and` chains cannot
    /// exhaust the thread stack.
    fn evaluate_node<T: TaskView>(&self, root: &FilterNode, task: &T) -> bool {
        let mut pending = vec![Step::Eval(root)];
        let mut result = false;

        while let Some(step) = pending.pop() {
            match step {
                Step::Eval(FilterNode::And(left, right)) => {
                    pending.push(Step::AndThen(right));
                    pending.push(Step::Eval(left));
                }
                Step::Eval(FilterNode::Or(left, right)) => {
                    pending.push(Step::OrElse(right));
                    pending.push(Step::Eval(left));
                }
                Step::Eval(FilterNode::Not(inner)) => {
                    pending.push(Step::Negate);
                    pending.push(Step::Eval(inner));
                }
                Step::Eval(leaf) => result = self.evaluate_leaf(leaf, task),
                // Short-circuit: the right side runs only when it can change the result.
                Step::AndThen(right) if result => pending.push(Step::Eval(right)),
                Step::OrElse(right) if !result => pending.push(Step::Eval(right)),
                Step::AndThen(_) | Step::OrElse(_) => {}
                Step::Negate => result = !result,
            }
        }

        result
    }

    fn evaluate_leaf<T: TaskView>(&self, leaf: &FilterNode, task: &T) -> bool {
        match leaf {
            FilterNode::TagTest { tag, include } => {
                let present = task.tags().contains(tag) || task.virtual_tags().contains(tag);
                present == *include
            }
            FilterNode::VirtualTagTest { name } => task.virtual_tags().contains(name),
            FilterNode::RegexTest { attribute, pattern } => {
                self.regex_matches(task, attribute, pattern)
            }
            FilterNode::AttributeTest {
                attribute,
                operator,
                value,
            } => {
                if catalog::is_date_attribute(attribute) {
                    self.date_matches(task, attribute, *operator, value)
                } else if attribute == NUMERIC_ATTRIBUTE {
                    urgency_matches(task.urgency(), *operator, value)
                } else if attribute == "priority" && is_ordering(*operator) {
                    priority_matches(task.priority(), *operator, value)
                } else {
                    self.text_matches(attribute_text(task, attribute), *operator, value)
                }
            }
            FilterNode::And(..) | FilterNode::Or(..) | FilterNode::Not(..) => {
                self.evaluate_node(leaf, task)
            }
        }
    }

    fn resolved_date(&self, value: &str) -> Option<Timestamp> {
        match self.dates.get(value) {
            Some(resolved) => *resolved,
            None => self.resolver.resolve(value, self.reference),
        }
    }

    fn date_matches<T: TaskView>(
        &self,
        task: &T,
        attribute: &str,
        operator: AttributeOperator,
        value: &str,
    ) -> bool {
        let actual = task.date(attribute);
        if operator == AttributeOperator::None {
            return actual.is_none();
        }

        let (Some(actual), Some(target)) = (actual, self.resolved_date(value)) else {
            return false;
        };

        match operator {
            AttributeOperator::Before | AttributeOperator::Under => actual < target,
            AttributeOperator::After | AttributeOperator::Over => actual > target,
            _ => actual.date() == target.date(),
        }
    }

    fn regex_matches<T: TaskView>(&self, task: &T, attribute: &str, pattern: &str) -> bool {
        let Some(text) = attribute_text(task, attribute) else {
            return false;
        };
        match self.patterns.get(pattern) {
            Some(Some(regex)) => regex.is_match(&text),
            Some(None) => false,
            None => compile_pattern(pattern).is_some_and(|regex| regex.is_match(&text)),
        }
    }

    fn word_matches(&self, text: &str, value: &str) -> Option<bool> {
        match self.words.get(value) {
            Some(regex) => regex.as_ref().map(|regex| regex.is_match(text)),
            None => word_regex(value).map(|regex| regex.is_match(text)),
        }
    }

    fn text_matches(
        &self,
        actual: Option<Cow<'_, str>>,
        operator: AttributeOperator,
        value: &str,
    ) -> bool {
        if operator == AttributeOperator::None {
            return actual.map_or(true, |text| text.is_empty());
        }
        let actual = actual.unwrap_or(Cow::Borrowed(""));
        let actual = actual.as_ref();

        match operator {
            AttributeOperator::Equals => actual == value,
            AttributeOperator::Contains => actual.to_lowercase().contains(&value.to_lowercase()),
            AttributeOperator::StartsWith => {
                actual.to_lowercase().starts_with(&value.to_lowercase())
            }
            AttributeOperator::Word => self.word_matches(actual, value).unwrap_or(false),
            AttributeOperator::NoWord => self.word_matches(actual, value).is_some_and(|hit| !hit),
            AttributeOperator::Before | AttributeOperator::Under => actual < value,
            AttributeOperator::After | AttributeOperator::Over => actual > value,
            AttributeOperator::None => false,
        }
    }
}

/// Pending work in the evaluation loop.
enum Step<'n> {
    Eval(&'n FilterNode),
    /// Evaluate the right operand of an `and` if the left was true.
    AndThen(&'n FilterNode),
    /// Evaluate the right operand of an `or` if the left was false.
    OrElse(&'n FilterNode),
    Negate,
}

fn is_ordering(operator: AttributeOperator) -> bool {
    matches!(
        operator,
        AttributeOperator::Before
            | AttributeOperator::After
            | AttributeOperator::Over
            | AttributeOperator::Under
    )
}

/// Evaluates `node` against a single task.
///
/// Convenience for one-off checks; prefer a [`FilterEvaluator`] when testing
/// many tasks against the same filter.
pub fn evaluate<T: TaskView>(node: &FilterNode, task: &T, reference: Timestamp) -> bool {
    FilterEvaluator::new(node, reference).matches(task)
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::debug!(%pattern, error = %err, "regex term failed to compile");
            None
        }
    }
}

fn word_regex(word: &str) -> Option<Regex> {
    RegexBuilder::new(&format!(r"\b{}\b", regex::escape(word)))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Text form of an attribute, or `None` when the task does not have it.
fn attribute_text<'t, T: TaskView>(task: &'t T, attribute: &str) -> Option<Cow<'t, str>> {
    match attribute {
        "description" => Some(Cow::Borrowed(task.description())),
        "project" => task.project().map(Cow::Borrowed),
        "priority" => task.priority().map(|p| Cow::Borrowed(p.as_str())),
        "status" => Some(Cow::Borrowed(task.status().as_str())),
        NUMERIC_ATTRIBUTE => Some(Cow::Owned(task.urgency().to_string())),
        "tags" => {
            let tags = task.tags();
            if tags.is_empty() {
                None
            } else {
                let joined: Vec<&str> = tags.iter().map(String::as_str).collect();
                Some(Cow::Owned(joined.join(" ")))
            }
        }
        attr if catalog::is_date_attribute(attr) => task
            .date(attr)
            .map(|ts| Cow::Owned(ts.format(DATE_TEXT_FORMAT).to_string())),
        uda => task.uda(uda).map(Cow::Borrowed),
    }
}

fn urgency_matches(urgency: f64, operator: AttributeOperator, value: &str) -> bool {
    if operator == AttributeOperator::None {
        return false;
    }
    let Ok(target) = value.trim().parse::<f64>() else {
        return false;
    };

    match operator {
        AttributeOperator::Over | AttributeOperator::After => urgency > target,
        AttributeOperator::Under | AttributeOperator::Before => urgency < target,
        _ => (urgency - target).abs() < URGENCY_EPSILON,
    }
}

/// H > M > L > unset.
fn priority_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(Priority::H) => 3,
        Some(Priority::M) => 2,
        Some(Priority::L) => 1,
        None => 0,
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value.trim().to_ascii_uppercase().as_str() {
        "H" => Some(Priority::H),
        "M" => Some(Priority::M),
        "L" => Some(Priority::L),
        _ => None,
    }
}

fn priority_matches(actual: Option<Priority>, operator: AttributeOperator, value: &str) -> bool {
    let actual = priority_rank(actual);
    let target = priority_rank(parse_priority(value));
    match operator {
        AttributeOperator::Over | AttributeOperator::After => actual > target,
        _ => actual < target,
    }
}
