//! Label matching logic.
//!
//! # Responsibilities
//! - Represent Alertmanager-style matchers (`=`, `!=`, `=~`, `!~`)
//! - Parse legacy matcher strings (`severity="critical"`)
//! - Evaluate matchers against a label set
//!
//! # Design Decisions
//! - Regexes are fully anchored, as Alertmanager does
//! - A missing label is treated as the empty string
//! - Empty matcher set = always matches (catch-all)

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::routing::error::{RoutingError, RoutingResult};
use crate::routing::tree::{Label, Labels};

/// Trait for matching label sets against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the label set satisfies this condition.
    fn matches(&self, labels: &Labels) -> bool;
}

/// Comparison applied between a label value and a matcher value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchOperator {
    Equal,
    NotEqual,
    Regex,
    NotRegex,
}

impl MatchOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperator::Equal => "=",
            MatchOperator::NotEqual => "!=",
            MatchOperator::Regex => "=~",
            MatchOperator::NotRegex => "!~",
        }
    }

    fn is_regex(&self) -> bool {
        matches!(self, MatchOperator::Regex | MatchOperator::NotRegex)
    }
}

impl fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchOperator {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" => Ok(MatchOperator::Equal),
            "!=" => Ok(MatchOperator::NotEqual),
            "=~" => Ok(MatchOperator::Regex),
            "!~" => Ok(MatchOperator::NotRegex),
            _ => Err(RoutingError::InvalidMatcher {
                input: s.to_string(),
                reason: "unknown operator",
            }),
        }
    }
}

impl Serialize for MatchOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MatchOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A `(name, operator, value)` matcher as it appears in policy definitions.
///
/// Serialized as a three-element array, e.g. `["severity", "=", "critical"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, MatchOperator, String)", into = "(String, MatchOperator, String)")]
pub struct ObjectMatcher {
    pub name: String,
    pub operator: MatchOperator,
    pub value: String,
}

impl ObjectMatcher {
    pub fn new(name: impl Into<String>, operator: MatchOperator, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator,
            value: value.into(),
        }
    }
}

impl From<(String, MatchOperator, String)> for ObjectMatcher {
    fn from((name, operator, value): (String, MatchOperator, String)) -> Self {
        Self { name, operator, value }
    }
}

impl From<ObjectMatcher> for (String, MatchOperator, String) {
    fn from(m: ObjectMatcher) -> Self {
        (m.name, m.operator, m.value)
    }
}

impl fmt::Display for ObjectMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:?}", self.name, self.operator, self.value)
    }
}

/// Parse a legacy matcher string such as `team=~"ops|sre"`.
///
/// The operator is the first `=` or `!` in the input; the value may be
/// wrapped in double quotes.
pub fn parse_matcher(input: &str) -> RoutingResult<ObjectMatcher> {
    let invalid = |reason| RoutingError::InvalidMatcher {
        input: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let op_start = trimmed
        .find(['=', '!'])
        .ok_or_else(|| invalid("missing operator"))?;

    let rest = &trimmed[op_start..];
    let operator = if rest.starts_with("=~") {
        MatchOperator::Regex
    } else if rest.starts_with("!~") {
        MatchOperator::NotRegex
    } else if rest.starts_with("!=") {
        MatchOperator::NotEqual
    } else if rest.starts_with('=') {
        MatchOperator::Equal
    } else {
        return Err(invalid("unknown operator"));
    };

    let name = trimmed[..op_start].trim();
    if name.is_empty() {
        return Err(invalid("empty label name"));
    }

    let raw_value = rest[operator.as_str().len()..].trim();
    let value = match raw_value.strip_prefix('"') {
        Some(inner) => inner
            .strip_suffix('"')
            .ok_or_else(|| invalid("unterminated quote"))?
            .replace("\\\"", "\""),
        None => raw_value.to_string(),
    };

    Ok(ObjectMatcher::new(name, operator, value))
}

/// A matcher with its regex compiled, ready for evaluation.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    matcher: ObjectMatcher,
    pattern: Option<Regex>,
}

impl LabelMatcher {
    /// Compile a matcher. Regex values are anchored on both ends.
    pub fn compile(matcher: ObjectMatcher) -> RoutingResult<Self> {
        let pattern = if matcher.operator.is_regex() {
            let anchored = format!("^(?:{})$", matcher.value);
            let regex = Regex::new(&anchored).map_err(|source| RoutingError::InvalidRegex {
                label: matcher.name.clone(),
                source,
            })?;
            Some(regex)
        } else {
            None
        };

        Ok(Self { matcher, pattern })
    }

    pub fn object(&self) -> &ObjectMatcher {
        &self.matcher
    }

    pub fn name(&self) -> &str {
        &self.matcher.name
    }

    /// Evaluate the operator against a single label value.
    pub fn matches_value(&self, value: &str) -> bool {
        match (self.matcher.operator, &self.pattern) {
            (MatchOperator::Equal, _) => value == self.matcher.value,
            (MatchOperator::NotEqual, _) => value != self.matcher.value,
            (MatchOperator::Regex, Some(re)) => re.is_match(value),
            (MatchOperator::NotRegex, Some(re)) => !re.is_match(value),
            // compile() always sets a pattern for regex operators
            (MatchOperator::Regex | MatchOperator::NotRegex, None) => false,
        }
    }

    /// True if this exact label (name and value) satisfies the matcher.
    pub fn matches_label(&self, label: &Label) -> bool {
        label.0 == self.matcher.name && self.matches_value(&label.1)
    }
}

impl Matcher for LabelMatcher {
    fn matches(&self, labels: &Labels) -> bool {
        let value = labels.get(&self.matcher.name).map(String::as_str).unwrap_or("");
        self.matches_value(value)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<LabelMatcher>,
}

impl MatcherSet {
    pub fn new(matchers: Vec<LabelMatcher>) -> Self {
        Self { matchers }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LabelMatcher> {
        self.matchers.iter()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for MatcherSet {
    fn matches(&self, labels: &Labels) -> bool {
        self.matchers.iter().all(|m| m.matches(labels))
    }
}
