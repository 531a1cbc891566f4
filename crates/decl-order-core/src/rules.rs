//! Parsing of the custom declaration order into an ordered rule list.
//!
//! The order is written as fragments separated by `###`:
//!
//! ```text
//! Field(static) ### Field ### CTOR ### Method(public) ### Method ### InnerClass
//! ```
//!
//! Each fragment is a member category, optionally followed by a regular
//! expression in parentheses that is searched for in the member's flattened
//! modifier text. A bare category (or empty parentheses) matches any
//! modifiers.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Syntactic kind of a member declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MemberCategory {
    /// Field or interface constant.
    Field,
    /// Constructor.
    Constructor,
    /// Method or annotation element.
    Method,
    /// Nested class, interface, enum, record, or annotation type.
    InnerType,
}

impl MemberCategory {
    /// All categories, in declaration order of this enum.
    pub const ALL: [Self; 4] = [Self::Field, Self::Constructor, Self::Method, Self::InnerType];

    /// Returns the token used for this category in the order configuration.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Field => "Field",
            Self::Constructor => "CTOR",
            Self::Method => "Method",
            Self::InnerType => "InnerClass",
        }
    }

    /// Resolves a configuration token (case-sensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    /// Human-readable name used in messages.
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::InnerType => "inner type",
        }
    }
}

impl std::fmt::Display for MemberCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Token separating rule fragments. Surrounding whitespace is ignored.
pub const SEPARATOR: &str = "###";

/// Errors raised while parsing the declaration order.
#[derive(Debug, Error)]
pub enum RuleParseError {
    /// A `(` without its matching `)`.
    #[error("unbalanced parenthesis in order fragment `{fragment}`")]
    UnbalancedParenthesis {
        /// The offending fragment.
        fragment: String,
    },

    /// Text after the closing parenthesis.
    #[error("unexpected text `{trailing}` after pattern in order fragment `{fragment}`")]
    TrailingText {
        /// The offending fragment.
        fragment: String,
        /// Text found after the closing parenthesis.
        trailing: String,
    },

    /// Fragment without a category name.
    #[error("missing member category in order fragment `{fragment}`")]
    MissingCategory {
        /// The offending fragment.
        fragment: String,
    },

    /// Category token outside `Field`, `CTOR`, `Method`, `InnerClass`.
    #[error("unknown member category `{token}` (expected one of Field, CTOR, Method, InnerClass)")]
    UnknownCategory {
        /// The unrecognized token.
        token: String,
    },

    /// The modifier pattern is not a valid regular expression.
    #[error("unable to parse pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// Pattern source as written.
        pattern: String,
        /// Underlying regex error.
        source: regex::Error,
    },
}

/// The modifier constraint of a rule.
#[derive(Debug, Clone)]
pub enum RulePattern {
    /// No constraint; matches any modifier text.
    Any,
    /// Regular expression searched for in the modifier text.
    Regex(Regex),
}

impl RulePattern {
    /// Returns true if `modifiers` satisfies this pattern.
    #[must_use]
    pub fn matches(&self, modifiers: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Regex(re) => re.is_match(modifiers),
        }
    }
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone)]
pub struct MatchRule {
    category: MemberCategory,
    source: Option<String>,
    pattern: RulePattern,
    case_insensitive: bool,
}

impl MatchRule {
    /// Creates a rule, compiling `source` immediately.
    ///
    /// `None` or an empty source means the rule matches any modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`RuleParseError::InvalidPattern`] if the regex does not compile.
    pub fn new(
        category: MemberCategory,
        source: Option<&str>,
        case_insensitive: bool,
    ) -> Result<Self, RuleParseError> {
        let source = source.filter(|s| !s.is_empty()).map(str::to_owned);
        let pattern = compile(source.as_deref(), case_insensitive)?;
        Ok(Self {
            category,
            source,
            pattern,
            case_insensitive,
        })
    }

    /// Category this rule applies to.
    #[must_use]
    pub fn category(&self) -> MemberCategory {
        self.category
    }

    /// Pattern source as written, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether the pattern ignores case.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Returns true if a member of `category` with `modifiers` matches this rule.
    #[must_use]
    pub fn matches(&self, category: MemberCategory, modifiers: &str) -> bool {
        self.category == category && self.pattern.matches(modifiers)
    }

    /// Recompiles the pattern with a new case mode.
    ///
    /// # Errors
    ///
    /// Returns [`RuleParseError::InvalidPattern`] if recompilation fails.
    pub fn set_case_insensitive(&mut self, case_insensitive: bool) -> Result<(), RuleParseError> {
        self.pattern = compile(self.source.as_deref(), case_insensitive)?;
        self.case_insensitive = case_insensitive;
        Ok(())
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}({source})", self.category),
            None => write!(f, "{}", self.category),
        }
    }
}

fn compile(source: Option<&str>, case_insensitive: bool) -> Result<RulePattern, RuleParseError> {
    let Some(source) = source else {
        return Ok(RulePattern::Any);
    };
    RegexBuilder::new(source)
        .case_insensitive(case_insensitive)
        .build()
        .map(RulePattern::Regex)
        .map_err(|source_err| RuleParseError::InvalidPattern {
            pattern: source.to_owned(),
            source: source_err,
        })
}

/// The ordered list of match rules. List index is priority.
#[derive(Debug, Clone, Default)]
pub struct RuleList {
    rules: Vec<MatchRule>,
}

impl RuleList {
    /// Creates an empty rule list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `input` with case-sensitive patterns.
    ///
    /// # Errors
    ///
    /// See [`RuleParser::parse`].
    pub fn parse(input: &str) -> Result<Self, RuleParseError> {
        RuleParser::new().parse(input)
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MatchRule> {
        self.rules.get(index)
    }

    /// Iterates rules in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, MatchRule> {
        self.rules.iter()
    }

    /// Distinct categories named by the rules, in first-mention order.
    #[must_use]
    pub fn categories(&self) -> Vec<MemberCategory> {
        let mut seen = Vec::new();
        for rule in &self.rules {
            if !seen.contains(&rule.category) {
                seen.push(rule.category);
            }
        }
        seen
    }

    /// Recompiles every rule with a new case mode.
    ///
    /// # Errors
    ///
    /// Returns the first recompilation failure.
    pub fn set_ignore_case(&mut self, ignore_case: bool) -> Result<(), RuleParseError> {
        for rule in &mut self.rules {
            rule.set_case_insensitive(ignore_case)?;
        }
        Ok(())
    }
}

impl From<Vec<MatchRule>> for RuleList {
    fn from(rules: Vec<MatchRule>) -> Self {
        Self { rules }
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a MatchRule;
    type IntoIter = std::slice::Iter<'a, MatchRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Parser for the declaration order string.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleParser {
    ignore_case: bool,
}

impl RuleParser {
    /// Creates a parser producing case-sensitive rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the case mode given to every rule created by this parser.
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Parses the full order string into a rule list.
    ///
    /// Blank input yields an empty list. Trailing separators are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first malformed fragment, unknown category, or invalid
    /// pattern encountered.
    pub fn parse(&self, input: &str) -> Result<RuleList, RuleParseError> {
        if input.trim().is_empty() {
            return Ok(RuleList::new());
        }

        let mut fragments: Vec<&str> = input.split(SEPARATOR).collect();
        while fragments.last().is_some_and(|f| f.trim().is_empty()) {
            fragments.pop();
        }

        let rules = fragments
            .into_iter()
            .map(|fragment| self.parse_fragment(fragment))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Parsed {} declaration order rule(s)", rules.len());
        Ok(RuleList::from(rules))
    }

    /// Parses a single `Category(pattern)` fragment.
    ///
    /// # Errors
    ///
    /// See [`RuleParser::parse`].
    pub fn parse_fragment(&self, fragment: &str) -> Result<MatchRule, RuleParseError> {
        let fragment = fragment.trim();

        let (name, pattern) = match fragment.find('(') {
            None => (fragment, None),
            Some(open) => {
                let close = matching_paren(fragment, open).ok_or_else(|| {
                    RuleParseError::UnbalancedParenthesis {
                        fragment: fragment.to_owned(),
                    }
                })?;
                let trailing = fragment[close + 1..].trim();
                if !trailing.is_empty() {
                    return Err(RuleParseError::TrailingText {
                        fragment: fragment.to_owned(),
                        trailing: trailing.to_owned(),
                    });
                }
                (&fragment[..open], Some(&fragment[open + 1..close]))
            }
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(RuleParseError::MissingCategory {
                fragment: fragment.to_owned(),
            });
        }

        let category =
            MemberCategory::from_token(name).ok_or_else(|| RuleParseError::UnknownCategory {
                token: name.to_owned(),
            })?;

        MatchRule::new(category, pattern, self.ignore_case)
    }
}

/// Finds the `)` matching the `(` at byte index `open`.
///
/// Backslash escapes and `[...]` character classes are skipped so that
/// literal parentheses inside the pattern do not count. A `]` right after
/// `[` or `[^` is a class member, not the end of the class.
fn matching_paren(fragment: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_class = false;
    let mut chars = fragment[open..].char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' if !in_class => {
                in_class = true;
                chars.next_if(|&(_, c)| c == '^');
                chars.next_if(|&(_, c)| c == ']');
            }
            ']' if in_class => in_class = false,
            '(' if !in_class => depth += 1,
            ')' if !in_class => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }

    None
}
