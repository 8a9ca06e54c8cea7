//! Selector model, parsing and per-element matching.
//!
//! A selector string is a comma-separated list of *chains*. Each chain is a
//! sequence of *steps* separated by whitespace or `/`, and each step tests a
//! single element:
//!
//! ```text
//! [tag] [ #id | .class ] [ '[' [@] [!] key [ op value ] ']' ]
//! ```
//!
//! Consecutive steps require a **direct parent** relationship: `div p`
//! matches a `p` whose parent is a `div`, not a `p` anywhere below a `div`.

mod matcher;
mod parser;

use std::fmt;

use fancy_regex::Regex;
use strum_macros::{Display, EnumString};

use crate::error::ParseError;

pub use matcher::step_matches;
pub use parser::parse_selector_group;

/// The pseudo attribute that stands for an element's text content.
pub const PLAINTEXT: &str = "plaintext";

/// The tag part of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagFilter {
    /// No tag was written; any element passes.
    Any,
    /// `*`; any element passes, but the step must carry an attribute test.
    Wildcard,
    /// A lowercased tag name, compared case-insensitively.
    Name(String),
}

/// Comparison applied between an attribute value and the step's value.
///
/// Both sides are lowercased before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Operator {
    /// `[key=value]`: exact equality. Also the operator of `#id`, `.class`
    /// and of a bare `[key]` presence test.
    #[strum(serialize = "=")]
    Equals,
    /// `[key!=value]`: inequality.
    #[strum(serialize = "!=")]
    NotEquals,
    /// `[key^=value]`: the value starts with the pattern.
    #[strum(serialize = "^=")]
    StartsWith,
    /// `[key$=value]`: the value ends with the pattern.
    #[strum(serialize = "$=")]
    EndsWith,
    /// `[key*=pattern]`: regular-expression search, see [`ContainsPattern`].
    #[strum(serialize = "*=")]
    ContainsPattern,
}

/// The compiled regular expression of a `*=` test.
///
/// A pattern starting with `/` is taken as a delimited expression with
/// optional trailing flags (`/^https?:/i`). Any other pattern is searched for
/// case-insensitively anywhere in the value. The pattern is lowercased before
/// compiling.
#[derive(Debug, Clone)]
pub struct ContainsPattern {
    re: Regex,
}

impl ContainsPattern {
    /// Compile a pattern as written in the selector.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidPattern`] for an unterminated delimited
    /// pattern, an unknown flag, or an expression that does not compile.
    pub fn compile(pattern: &str) -> Result<Self, ParseError> {
        let lowered = pattern.to_lowercase();
        let invalid = |reason: String| ParseError::InvalidPattern {
            pattern: lowered.clone(),
            reason,
        };

        let source = if let Some(rest) = lowered.strip_prefix('/') {
            let Some(end) = rest.rfind('/') else {
                return Err(invalid("missing closing '/'".to_string()));
            };
            let body = rest[..end].replace("\\/", "/");
            let mut flags = String::new();
            for flag in rest[end + 1..].chars() {
                match flag {
                    'i' | 'm' | 's' | 'x' => flags.push(flag),
                    'u' => {}
                    other => return Err(invalid(format!("unsupported flag '{other}'"))),
                }
            }
            if flags.is_empty() {
                body
            } else {
                format!("(?{flags}){body}")
            }
        } else {
            format!("(?i){lowered}")
        };

        Regex::new(&source)
            .map(|re| Self { re })
            .map_err(|err| invalid(err.to_string()))
    }

    /// The expression handed to the regex engine.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.re.as_str()
    }

    /// Whether the expression matches somewhere in `haystack`.
    ///
    /// An engine failure (for example hitting the backtrack limit) counts as
    /// no match.
    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.re.is_match(haystack).unwrap_or(false)
    }
}

impl PartialEq for ContainsPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ContainsPattern {}

/// One link of a chain: the tests applied to a single element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorStep {
    /// The tag test.
    pub tag: TagFilter,
    /// Lowercased attribute key (`id` for `#x`, `class` for `.x`).
    pub attribute: Option<String>,
    /// `[!key]`: the attribute must be absent. No value is compared.
    pub negated: bool,
    /// Value to compare, as written. `None` means a presence test only.
    pub value: Option<String>,
    /// How the value is compared.
    pub operator: Operator,
    /// Compiled form of `value` when `operator` is [`Operator::ContainsPattern`].
    pub(crate) pattern: Option<ContainsPattern>,
}

impl SelectorStep {
    /// A step that only tests the tag name.
    #[must_use]
    pub fn for_tag(name: &str) -> Self {
        Self {
            tag: TagFilter::Name(name.to_lowercase()),
            attribute: None,
            negated: false,
            value: None,
            operator: Operator::Equals,
            pattern: None,
        }
    }

    /// Build a step with an attribute test.
    ///
    /// # Errors
    /// Returns [`ParseError::InvalidPattern`] if `operator` is `*=` and
    /// `value` does not compile.
    pub fn with_attribute(
        tag: TagFilter,
        attribute: &str,
        negated: bool,
        value: Option<String>,
        operator: Operator,
    ) -> Result<Self, ParseError> {
        let pattern = match (&value, operator) {
            (Some(value), Operator::ContainsPattern) if !negated && value != "*" => {
                Some(ContainsPattern::compile(value)?)
            }
            _ => None,
        };
        Ok(Self {
            tag,
            attribute: Some(attribute.to_lowercase()),
            negated,
            value,
            operator,
            pattern,
        })
    }

    /// Whether this step compares a value (as opposed to testing presence).
    #[must_use]
    pub fn compares_value(&self) -> bool {
        !self.negated && self.value.as_deref().is_some_and(|value| value != "*")
    }
}

impl fmt::Display for SelectorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            TagFilter::Any => {}
            TagFilter::Wildcard => f.write_str("*")?,
            TagFilter::Name(name) => f.write_str(name)?,
        }
        if let Some(attribute) = &self.attribute {
            let bang = if self.negated { "!" } else { "" };
            match &self.value {
                Some(value) => write!(f, "[{bang}{attribute}{}\"{value}\"]", self.operator)?,
                None => write!(f, "[{bang}{attribute}]")?,
            }
        }
        Ok(())
    }
}

/// Steps that must match an element and its direct parents, outermost first.
///
/// The last step tests the candidate element itself, the one before it tests
/// the candidate's parent, and so on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    steps: Vec<SelectorStep>,
}

impl SelectorChain {
    /// Build a chain from its steps, outermost first.
    ///
    /// # Errors
    /// Returns [`ParseError::EmptyChain`] if `steps` is empty.
    pub fn new(steps: Vec<SelectorStep>) -> Result<Self, ParseError> {
        if steps.is_empty() {
            return Err(ParseError::EmptyChain);
        }
        Ok(Self { steps })
    }

    /// The steps, outermost first.
    #[must_use]
    pub fn steps(&self) -> &[SelectorStep] {
        &self.steps
    }

    /// Number of links; always at least one.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

impl fmt::Display for SelectorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Comma-separated alternatives, searched one after another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorGroup {
    chains: Vec<SelectorChain>,
}

impl SelectorGroup {
    /// Build a group from its chains.
    ///
    /// # Errors
    /// Returns [`ParseError::Empty`] if `chains` is empty.
    pub fn new(chains: Vec<SelectorChain>) -> Result<Self, ParseError> {
        if chains.is_empty() {
            return Err(ParseError::Empty {
                selector: String::new(),
            });
        }
        Ok(Self { chains })
    }

    /// The alternatives in the order they were written.
    #[must_use]
    pub fn chains(&self) -> &[SelectorChain] {
        &self.chains
    }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.chains.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{chain}")?;
        }
        Ok(())
    }
}
