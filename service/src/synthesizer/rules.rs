//! Rule-token compiler
//!
//! Turns a node's raw `validation_rules` into a [`PropertyConstraint`].
//! Recognised tokens:
//!
//! | Token | Effect |
//! |---|---|
//! | `regex match <p>` / `regex fullmatch <p>` / `regex search <p>` | `pattern`, anchored at start / both ends / not at all |
//! | `list`, `list like`, `list strict` | field holds a comma-delimited list |
//! | `inRange <min> <max>` | numeric bounds, either may be `None` |
//! | `int` `float` `num` `str` `bool` `date` `url` | lexical format |
//! | `unique` | value must not repeat across records |
//!
//! A trailing `error` or `warning` severity word is accepted and ignored.
//! Anything else is kept as an opaque rule and not enforced.

use regex::Regex;
use schematic_core::prelude::*;
use schematic_core::utils::parse_validation_rules;
use tracing::debug;

const SEVERITY_WORDS: [&str; 2] = ["error", "warning"];

/// Where a `regex` rule anchors its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexMode {
    /// Anchored at the start of the value
    Match,
    /// Anchored at both ends
    FullMatch,
    /// Found anywhere in the value
    Search,
}

impl RegexMode {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "match" => Some(Self::Match),
            "fullmatch" => Some(Self::FullMatch),
            "search" => Some(Self::Search),
            _ => None,
        }
    }

    /// Wrap `pattern` so that an unanchored search enforces this mode
    #[must_use]
    pub fn anchor(self, pattern: &str) -> String {
        match self {
            Self::Match => format!("^(?:{pattern})"),
            Self::FullMatch => format!("^(?:{pattern})$"),
            Self::Search => pattern.to_string(),
        }
    }
}

/// A single parsed rule token
#[derive(Debug, Clone, PartialEq)]
pub enum RuleToken {
    /// Regular-expression rule
    Regex {
        /// Anchoring mode
        mode: RegexMode,
        /// Pattern as written
        pattern: String,
    },
    /// List-valued field
    List {
        /// Items must come from the allowed values
        strict: bool,
    },
    /// Numeric bounds
    InRange(ValueRange),
    /// Lexical format
    Format(ValueFormat),
    /// Value must not repeat across records
    Unique,
    /// Unrecognised token
    Opaque(String),
}

fn strip_severity(token: &str) -> &str {
    match token.rsplit_once(char::is_whitespace) {
        Some((body, last)) if SEVERITY_WORDS.contains(&last) => body.trim_end(),
        _ => token,
    }
}

fn parse_bound(word: Option<&str>) -> Option<Option<f64>> {
    match word {
        None | Some("None" | "none") => Some(None),
        Some(word) => word.parse::<f64>().ok().map(Some),
    }
}

/// Parse one rule token
#[must_use]
pub fn parse_rule(token: &str) -> RuleToken {
    let body = strip_severity(token.trim());
    let opaque = || RuleToken::Opaque(token.trim().to_string());

    if let Some(rest) = body.strip_prefix("regex") {
        let rest = rest.trim_start();
        let Some((mode, pattern)) = rest.split_once(char::is_whitespace) else {
            return opaque();
        };
        let pattern = pattern.trim();
        return match RegexMode::parse(mode) {
            Some(mode) if !pattern.is_empty() => RuleToken::Regex {
                mode,
                pattern: pattern.to_string(),
            },
            _ => opaque(),
        };
    }

    let words: Vec<&str> = body.split_whitespace().collect();
    match words.as_slice() {
        ["list"] | ["list", "like"] => RuleToken::List { strict: false },
        ["list", "strict"] => RuleToken::List { strict: true },
        ["inRange", bounds @ ..] if bounds.len() <= 2 => {
            match (
                parse_bound(bounds.first().copied()),
                parse_bound(bounds.get(1).copied()),
            ) {
                (Some(minimum), Some(maximum)) => RuleToken::InRange(ValueRange { minimum, maximum }),
                _ => opaque(),
            }
        }
        ["int"] => RuleToken::Format(ValueFormat::Integer),
        ["float"] => RuleToken::Format(ValueFormat::Float),
        ["num"] => RuleToken::Format(ValueFormat::Number),
        ["str"] => RuleToken::Format(ValueFormat::String),
        ["bool"] => RuleToken::Format(ValueFormat::Boolean),
        ["date"] => RuleToken::Format(ValueFormat::Date),
        ["url"] => RuleToken::Format(ValueFormat::Url),
        ["unique"] => RuleToken::Unique,
        _ => opaque(),
    }
}

/// Compile a node's rules and allowed values into its base constraint
///
/// # Errors
///
/// Returns `SchematicError::MalformedGraph` if a `list strict` rule is set
/// on a node without allowed values or an `inRange` rule is inverted.
pub fn compile_constraint(node: &Node) -> Result<PropertyConstraint> {
    let mut constraint = PropertyConstraint::string();

    for token in parse_validation_rules(node.validation_rules.as_slice()) {
        match parse_rule(&token) {
            RuleToken::Regex { mode, pattern } => {
                let anchored = mode.anchor(&pattern);
                if constraint.pattern.is_some() {
                    debug!(label = %node.label, rule = %token, "Ignoring additional regex rule");
                    constraint.opaque_rules.push(token);
                } else if let Err(e) = Regex::new(&anchored) {
                    debug!(label = %node.label, rule = %token, "Regex rule does not compile: {e}");
                    constraint.opaque_rules.push(token);
                } else {
                    constraint.pattern = Some(anchored);
                }
            }
            RuleToken::List { strict } => {
                if strict && !node.is_enumerated() {
                    return Err(SchematicError::malformed_graph_at(
                        format!(
                            "Term '{}' uses 'list strict' but has no allowed values",
                            node.label
                        ),
                        node.label.clone(),
                    ));
                }
                constraint.field_type = FieldType::Array;
            }
            RuleToken::InRange(range) => {
                if let (Some(min), Some(max)) = (range.minimum, range.maximum)
                    && min > max
                {
                    return Err(SchematicError::malformed_graph_at(
                        format!("Term '{}' has an inverted range {min} > {max}", node.label),
                        node.label.clone(),
                    ));
                }
                constraint.range = Some(range);
            }
            RuleToken::Format(format) => {
                if constraint.format.is_none() {
                    constraint.format = Some(format);
                } else {
                    debug!(label = %node.label, rule = %token, "Ignoring additional format rule");
                    constraint.opaque_rules.push(token);
                }
            }
            RuleToken::Unique => constraint.unique = true,
            RuleToken::Opaque(rule) => {
                debug!(label = %node.label, %rule, "Keeping unrecognised rule as opaque");
                constraint.opaque_rules.push(rule);
            }
        }
    }

    if node.is_enumerated() {
        constraint.enumeration = Some(node.valid_values.clone());
    }
    if constraint.is_array() && node.required {
        constraint.min_items = Some(1);
    }

    Ok(constraint)
}
