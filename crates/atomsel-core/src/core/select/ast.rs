//! Abstract syntax tree of the selection language.
//!
//! Field and keyword names are resolved while parsing, so a [`Node`] never
//! carries an unresolved name. Every node renders through `Display` to a
//! canonical string: equivalent spellings (aliases, `10:20` vs `10 to 20`,
//! quoting, whitespace) produce the same text, which makes it usable as a
//! cache key.

use super::keywords;
use crate::core::models::field::Field;
use itertools::Itertools;
use regex::Regex;
use std::fmt;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }

    pub fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            CmpOp::Eq => lhs == rhs,
            CmpOp::Ne => lhs != rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Gt => lhs > rhs,
            CmpOp::Ge => lhs >= rhs,
        }
    }
}

/// Flag predicates resolved through the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    All,
    None,
    Protein,
    Water,
    Backbone,
    Sidechain,
    Calpha,
    Hydrogen,
    Heavy,
    Nucleic,
    Ion,
    Hetero,
    Acidic,
    Basic,
    Charged,
    Aromatic,
    Hydrophobic,
}

impl Keyword {
    pub fn name(self) -> &'static str {
        match self {
            Keyword::All => "all",
            Keyword::None => "none",
            Keyword::Protein => "protein",
            Keyword::Water => "water",
            Keyword::Backbone => "backbone",
            Keyword::Sidechain => "sidechain",
            Keyword::Calpha => "calpha",
            Keyword::Hydrogen => "hydrogen",
            Keyword::Heavy => "heavy",
            Keyword::Nucleic => "nucleic",
            Keyword::Ion => "ion",
            Keyword::Hetero => "hetero",
            Keyword::Acidic => "acidic",
            Keyword::Basic => "basic",
            Keyword::Charged => "charged",
            Keyword::Aromatic => "aromatic",
            Keyword::Hydrophobic => "hydrophobic",
        }
    }
}

/// A text value to match. Unquoted values containing `*` or `?` are globs;
/// quoted values always match literally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextPattern {
    Exact(String),
    Glob(Glob),
}

impl TextPattern {
    pub fn from_word(word: &str) -> Result<Self, regex::Error> {
        if word.contains(['*', '?']) {
            Ok(TextPattern::Glob(Glob::new(word)?))
        } else {
            Ok(TextPattern::Exact(word.to_string()))
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextPattern::Exact(value) => value == text,
            TextPattern::Glob(glob) => glob.is_match(text),
        }
    }
}

/// A name pattern where `*` matches any run of characters and `?` exactly one,
/// compiled once into an anchored regex. Compares and hashes by its source.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let mut body = String::with_capacity(pattern.len() + 8);
        body.push_str("(?s)^");
        let mut buf = [0u8; 4];
        for c in pattern.chars() {
            match c {
                '*' => body.push_str(".*"),
                '?' => body.push('.'),
                _ => body.push_str(&regex::escape(c.encode_utf8(&mut buf))),
            }
        }
        body.push('$');
        Ok(Self {
            source: pattern.to_string(),
            regex: Regex::new(&body)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Glob {}

impl Hash for Glob {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

/// A numeric literal, typed by the field it is compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
}

impl Scalar {
    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Integer(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericItem {
    Single(Scalar),
    /// Closed range `[low, high]`. Empty when `low > high`.
    Range(Scalar, Scalar),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericTest {
    Compare(CmpOp, Scalar),
    /// Matches when the value equals any single item or lies in any range.
    Members(Vec<NumericItem>),
}

impl NumericTest {
    pub fn matches_integer(&self, value: i64) -> bool {
        let matches_scalar = |op: CmpOp, scalar: Scalar| match scalar {
            Scalar::Integer(s) => op.compare(value, s),
            Scalar::Float(s) => op.compare(value as f64, s),
        };
        match self {
            NumericTest::Compare(op, scalar) => matches_scalar(*op, *scalar),
            NumericTest::Members(items) => items.iter().any(|item| match *item {
                NumericItem::Single(s) => matches_scalar(CmpOp::Eq, s),
                NumericItem::Range(lo, hi) => {
                    matches_scalar(CmpOp::Ge, lo) && matches_scalar(CmpOp::Le, hi)
                }
            }),
        }
    }

    pub fn matches_float(&self, value: f64) -> bool {
        match self {
            NumericTest::Compare(op, scalar) => op.compare(value, scalar.as_f64()),
            NumericTest::Members(items) => items.iter().any(|item| match *item {
                NumericItem::Single(s) => value == s.as_f64(),
                NumericItem::Range(lo, hi) => value >= lo.as_f64() && value <= hi.as_f64(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Test {
    Text {
        negated: bool,
        patterns: Vec<TextPattern>,
    },
    Numeric(NumericTest),
}

/// What `same ... as` groups atoms by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameEntity {
    /// The contiguous residue index.
    Residue,
    Field(Field),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Keyword(Keyword),
    Comparison {
        field: Field,
        test: Test,
    },
    Not(Box<Node>),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    /// Atoms within `radius` of any atom of `target`, including the target atoms.
    Within {
        radius: f64,
        target: Box<Node>,
    },
    /// Like `Within`, excluding the target atoms.
    Exwithin {
        radius: f64,
        target: Box<Node>,
    },
    SameAs {
        entity: SameEntity,
        target: Box<Node>,
    },
}

impl Node {
    /// Whether evaluating this node needs a spatial index.
    pub fn is_spatial(&self) -> bool {
        match self {
            Node::Within { .. } | Node::Exwithin { .. } => true,
            Node::Keyword(_) | Node::Comparison { .. } => false,
            Node::Not(inner) => inner.is_spatial(),
            Node::SameAs { target, .. } => target.is_spatial(),
            Node::And(l, r) | Node::Or(l, r) => l.is_spatial() || r.is_spatial(),
        }
    }

    /// Largest radius of any `within`/`exwithin` in the tree.
    pub fn max_radius(&self) -> Option<f64> {
        match self {
            Node::Within { radius, target } | Node::Exwithin { radius, target } => {
                Some(target.max_radius().map_or(*radius, |r| r.max(*radius)))
            }
            Node::Keyword(_) | Node::Comparison { .. } => None,
            Node::Not(inner) => inner.max_radius(),
            Node::SameAs { target, .. } => target.max_radius(),
            Node::And(l, r) | Node::Or(l, r) => match (l.max_radius(), r.max_radius()) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// Canonical text of the node, used as the cache key.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.contains(['*', '?'])
        || value.starts_with(['"', '\''])
        || value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '(' | ')' | '=' | '!' | '<' | '>' | ':')
        })
        || keywords::is_operator_word(value)
        || keywords::is_reserved_name(value)
}

fn write_exact(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if !needs_quotes(value) {
        f.write_str(value)
    } else if value.contains('"') {
        write!(f, "'{value}'")
    } else {
        write!(f, "\"{value}\"")
    }
}

impl fmt::Display for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextPattern::Exact(value) => write_exact(f, value),
            TextPattern::Glob(glob) => f.write_str(glob.as_str()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for NumericItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericItem::Single(v) => write!(f, "{v}"),
            NumericItem::Range(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

impl fmt::Display for SameEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameEntity::Residue => f.write_str("residue"),
            SameEntity::Field(field) => write!(f, "{field}"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Keyword(keyword) => f.write_str(keyword.name()),
            Node::Comparison { field, test } => {
                write!(f, "{field}")?;
                match test {
                    Test::Text { negated, patterns } => {
                        if *negated {
                            f.write_str(" !=")?;
                        }
                        write!(f, " {}", patterns.iter().join(" "))
                    }
                    Test::Numeric(NumericTest::Compare(op, value)) => {
                        write!(f, " {} {value}", op.symbol())
                    }
                    Test::Numeric(NumericTest::Members(items)) => {
                        write!(f, " {}", items.iter().join(" "))
                    }
                }
            }
            Node::Not(inner) => write!(f, "not {inner}"),
            Node::And(l, r) => write!(f, "({l} and {r})"),
            Node::Or(l, r) => write!(f, "({l} or {r})"),
            Node::Within { radius, target } => write!(f, "within {radius} of {target}"),
            Node::Exwithin { radius, target } => write!(f, "exwithin {radius} of {target}"),
            Node::SameAs { entity, target } => write!(f, "same {entity} as {target}"),
        }
    }
}
