/// Rule parameters.
///
/// Every rule applied to a field carries one [`RuleParam`]. Its meaning is
/// rule-specific: a boolean flag for `required`, a bound for `min`, a
/// two-element range for `rangeLength`, a related value for `equal`, a
/// compiled pattern for `format`. The engine never interprets it.
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::value::FieldValue;

/// The parameter handed to a rule alongside the captured field value.
#[derive(Clone)]
pub enum RuleParam {
    /// A plain value: flag, number, date string, range or related value.
    Value(FieldValue),
    /// A compiled regular expression, used by `format`.
    Pattern(Regex),
}

impl RuleParam {
    /// Compiles `pattern` into a [`RuleParam::Pattern`].
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] produced by the regex compiler when
    /// `pattern` is not a valid expression.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }

    /// Returns the wrapped value, or `None` for a pattern.
    pub fn as_value(&self) -> Option<&FieldValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Pattern(_) => None,
        }
    }

    /// Whether a flag parameter is switched on.
    ///
    /// A pattern counts as on; a value uses [`FieldValue::is_truthy`].
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Value(v) => v.is_truthy(),
            Self::Pattern(_) => true,
        }
    }

    /// The parameter as a single numeric bound.
    pub fn as_number(&self) -> Option<f64> {
        self.as_value().and_then(FieldValue::as_number)
    }

    /// The parameter as a `(min, max)` range.
    ///
    /// Reads the first two elements of an array parameter and orders them so
    /// the smaller one is always the minimum: `[5, 1]` and `[1, 5]` both yield
    /// `(1.0, 5.0)`.
    pub fn as_range(&self) -> Option<(f64, f64)> {
        let items = self.as_value()?.as_array()?;
        let a = items.first()?.as_number()?;
        let b = items.get(1)?.as_number()?;
        if a > b { Some((b, a)) } else { Some((a, b)) }
    }

    /// The parameter as text: a string value, or the source of a pattern.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Value(v) => v.as_str(),
            Self::Pattern(re) => Some(re.as_str()),
        }
    }
}

impl PartialEq for RuleParam {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            (Self::Value(_), Self::Pattern(_)) | (Self::Pattern(_), Self::Value(_)) => false,
        }
    }
}

impl fmt::Debug for RuleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
        }
    }
}

impl fmt::Display for RuleParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}"),
            Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

impl From<Regex> for RuleParam {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<FieldValue> for RuleParam {
    fn from(v: FieldValue) -> Self {
        Self::Value(v)
    }
}

macro_rules! param_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RuleParam {
                fn from(v: $ty) -> Self {
                    Self::Value(FieldValue::from(v))
                }
            }
        )*
    };
}

param_from_value!(bool, i32, i64, f64, &str, String, Vec<i32>, Vec<i64>, Vec<f64>, Vec<&str>);

/// Patterns serialize as their source string.
impl Serialize for RuleParam {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Pattern(re) => serializer.serialize_str(re.as_str()),
        }
    }
}

/// Always deserializes to [`RuleParam::Value`]; `format` compiles string
/// parameters when it runs.
impl<'de> Deserialize<'de> for RuleParam {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        FieldValue::deserialize(deserializer).map(Self::Value)
    }
}
