// ── Tunable values ──
//
// The closed set of values an entity can expose: numbers, strings, and
// booleans. Colors, gradients, shadows, and easings are carried as strings.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Key → value mapping for one entity.
///
/// Iteration follows declaration order; equality ignores order.
pub type Configuration = IndexMap<String, TangentValue>;

/// A single tunable value.
///
/// Equality is structural: two numbers are equal when their `f64` values are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TangentValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// Discriminant of a [`TangentValue`], for display and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Number,
    Text,
}

impl TangentValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// False only for NaN and infinite numbers, which JSON cannot carry and
    /// which never compare equal to themselves.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Number(n) => n.is_finite(),
            _ => true,
        }
    }

    /// Parse a value with an explicit kind (`"12"` as text stays text).
    pub fn parse_as(raw: &str, kind: ValueKind) -> Result<Self, ParseValueError> {
        match kind {
            ValueKind::Text => Ok(Self::Text(raw.to_owned())),
            ValueKind::Bool => raw
                .parse::<bool>()
                .map(Self::Bool)
                .map_err(|_| ParseValueError::new(raw, kind)),
            ValueKind::Number => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Self::Number(n)),
                _ => Err(ParseValueError::new(raw, kind)),
            },
        }
    }
}

impl fmt::Display for TangentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Infers the kind: `true`/`false` are booleans, finite numbers are numbers,
/// everything else is text. Never fails.
impl FromStr for TangentValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_as(s, ValueKind::Bool)
            .or_else(|_| Self::parse_as(s, ValueKind::Number))
            .unwrap_or_else(|_| Self::Text(s.to_owned())))
    }
}

impl From<f64> for TangentValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for TangentValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for TangentValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for TangentValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for TangentValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// A raw string could not be read as the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse '{raw}' as {kind}")]
pub struct ParseValueError {
    pub raw: String,
    pub kind: ValueKind,
}

impl ParseValueError {
    fn new(raw: &str, kind: ValueKind) -> Self {
        Self {
            raw: raw.to_owned(),
            kind,
        }
    }
}
