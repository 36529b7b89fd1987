/// Built-in validation rules and their default messages.
///
/// Each rule is a zero-sized struct implementing [`Rule`]. They are seeded into
/// every [`Registry`][crate::Registry] by
/// [`Registry::with_builtins`][crate::Registry::with_builtins] under the names
/// in [`names`].
///
/// Shared conventions:
///
/// - Flag rules (`required`, `checked`, `mobile`, `email`) only check when
///   their parameter is truthy.
/// - A value of the wrong shape for a rule passes it; `required` is the place
///   to demand presence.
/// - Range parameters are normalised so the smaller bound is the minimum.
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::param::RuleParam;
use crate::registry::{MessageEntry, MessageMap, Rule, RuleContext, RuleMap};

#[cfg(test)]
mod tests;

/// Names the built-in rules are registered under.
pub mod names {
    /// [`Required`][super::Required]
    pub const REQUIRED: &str = "required";
    /// [`Min`][super::Min]
    pub const MIN: &str = "min";
    /// [`MinExclude`][super::MinExclude]
    pub const MIN_EXCLUDE: &str = "minExclude";
    /// [`Max`][super::Max]
    pub const MAX: &str = "max";
    /// [`MaxExclude`][super::MaxExclude]
    pub const MAX_EXCLUDE: &str = "maxExclude";
    /// [`Range`][super::Range]
    pub const RANGE: &str = "range";
    /// [`MinLength`][super::MinLength]
    pub const MIN_LENGTH: &str = "minLength";
    /// [`MaxLength`][super::MaxLength]
    pub const MAX_LENGTH: &str = "maxLength";
    /// [`RangeLength`][super::RangeLength]
    pub const RANGE_LENGTH: &str = "rangeLength";
    /// [`MinDate`][super::MinDate]
    pub const MIN_DATE: &str = "minDate";
    /// [`MaxDate`][super::MaxDate]
    pub const MAX_DATE: &str = "maxDate";
    /// [`Checked`][super::Checked]
    pub const CHECKED: &str = "checked";
    /// [`Equal`][super::Equal]
    pub const EQUAL: &str = "equal";
    /// [`Unequal`][super::Unequal]
    pub const UNEQUAL: &str = "unequal";
    /// [`Mobile`][super::Mobile]
    pub const MOBILE: &str = "mobile";
    /// [`Email`][super::Email]
    pub const EMAIL: &str = "email";
    /// [`Format`][super::Format]
    pub const FORMAT: &str = "format";
}

// ---------------------------------------------------------------------------
// Compiled regex patterns
// ---------------------------------------------------------------------------

/// Mainland China mobile number, with optional `0`, `86` or `17951` prefix.
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|86|17951)?(1[0-9][0-9])[0-9]{8}$")
        .unwrap_or_else(|_| Regex::new(".").unwrap_or_else(|_| unreachable!("regex engine broken")))
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Za-z\-_\.]+)@([0-9a-z]+\.[a-z]{2,3}(\.[a-z]{2})?)$")
        .unwrap_or_else(|_| Regex::new(".").unwrap_or_else(|_| unreachable!("regex engine broken")))
});

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Rewrites `1970-01-01` style dates to `1970/01/01`.
pub fn normalize_date(date: &str) -> String {
    date.replace('-', "/")
}

/// Parses a normalised date, with an optional time of day.
///
/// Accepts `YYYY/MM/DD`, `YYYY/MM/DD HH:MM` and `YYYY/MM/DD HH:MM:SS`.
pub fn parse_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    NaiveDateTime::parse_from_str(date, "%Y/%m/%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(date, "%Y/%m/%d %H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y/%m/%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses both sides of a date rule. Either side failing to parse skips the
/// check.
fn date_pair(ctx: &RuleContext<'_>) -> Option<(NaiveDateTime, NaiveDateTime, String)> {
    let bound = normalize_date(ctx.param.as_text()?);
    let value = parse_date(&normalize_date(ctx.value.as_str()?))?;
    let limit = parse_date(&bound)?;
    Some((value, limit, bound))
}

fn length_of(ctx: &RuleContext<'_>) -> Option<f64> {
    ctx.value.length().map(|n| n as f64)
}

fn range_message(param: &RuleParam, unit: &str) -> String {
    match param.as_range() {
        Some((min, max)) => format!("Please enter {unit} between {min} and {max}"),
        None => format!("Please enter {unit} within the allowed range"),
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// Strings must be non-empty; other values must not be null.
pub struct Required;

impl Rule for Required {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if !ctx.param.is_enabled() {
            return None;
        }
        let missing = match ctx.value.as_str() {
            Some(s) => s.is_empty(),
            None => ctx.value.is_null(),
        };
        if missing { ctx.fail() } else { None }
    }
}

/// The value (typically a checkbox) must be truthy.
pub struct Checked;

impl Rule for Checked {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if ctx.param.is_enabled() && !ctx.value.is_truthy() {
            return ctx.fail();
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Numeric bounds
// ---------------------------------------------------------------------------

/// `value >= param`
pub struct Min;

impl Rule for Min {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, bound) = (ctx.value.as_number()?, ctx.param.as_number()?);
        if value < bound { ctx.fail() } else { None }
    }
}

/// `value > param`
pub struct MinExclude;

impl Rule for MinExclude {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, bound) = (ctx.value.as_number()?, ctx.param.as_number()?);
        if value <= bound { ctx.fail() } else { None }
    }
}

/// `value <= param`
pub struct Max;

impl Rule for Max {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, bound) = (ctx.value.as_number()?, ctx.param.as_number()?);
        if value > bound { ctx.fail() } else { None }
    }
}

/// `value < param`
pub struct MaxExclude;

impl Rule for MaxExclude {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, bound) = (ctx.value.as_number()?, ctx.param.as_number()?);
        if value >= bound { ctx.fail() } else { None }
    }
}

/// `min <= value <= max` for a two-element range parameter in either order.
pub struct Range;

impl Rule for Range {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let value = ctx.value.as_number()?;
        let (min, max) = ctx.param.as_range()?;
        if value < min || value > max {
            ctx.fail()
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Length bounds
// ---------------------------------------------------------------------------

/// At least `param` characters (or elements).
pub struct MinLength;

impl Rule for MinLength {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (len, bound) = (length_of(ctx)?, ctx.param.as_number()?);
        if len < bound { ctx.fail() } else { None }
    }
}

/// At most `param` characters (or elements).
pub struct MaxLength;

impl Rule for MaxLength {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (len, bound) = (length_of(ctx)?, ctx.param.as_number()?);
        if len > bound { ctx.fail() } else { None }
    }
}

/// Length within a two-element range parameter in either order.
pub struct RangeLength;

impl Rule for RangeLength {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let len = length_of(ctx)?;
        let (min, max) = ctx.param.as_range()?;
        if len < min || len > max {
            ctx.fail()
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// The date must not be earlier than the parameter date.
pub struct MinDate;

impl Rule for MinDate {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, limit, bound) = date_pair(ctx)?;
        if value < limit {
            ctx.fail_with(&RuleParam::from(bound))
        } else {
            None
        }
    }
}

/// The date must not be later than the parameter date.
pub struct MaxDate;

impl Rule for MaxDate {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let (value, limit, bound) = date_pair(ctx)?;
        if value > limit {
            ctx.fail_with(&RuleParam::from(bound))
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Related values
// ---------------------------------------------------------------------------

/// The value must equal the related value (e.g. a password confirmation).
pub struct Equal;

impl Rule for Equal {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let related = ctx.param.as_value()?;
        if ctx.value != related { ctx.fail() } else { None }
    }
}

/// The value must differ from the related value.
pub struct Unequal;

impl Rule for Unequal {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        let related = ctx.param.as_value()?;
        if ctx.value == related { ctx.fail() } else { None }
    }
}

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

/// A non-empty string must be a mobile phone number.
pub struct Mobile;

impl Rule for Mobile {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if !ctx.param.is_enabled() {
            return None;
        }
        match ctx.value.as_str() {
            Some(s) if !s.is_empty() && !MOBILE_RE.is_match(s) => ctx.fail(),
            Some(_) | None => None,
        }
    }
}

/// A non-empty string must be an email address.
pub struct Email;

impl Rule for Email {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if !ctx.param.is_enabled() {
            return None;
        }
        match ctx.value.as_str() {
            Some(s) if !s.is_empty() && !EMAIL_RE.is_match(s) => ctx.fail(),
            Some(_) | None => None,
        }
    }
}

/// A truthy value must match the parameter pattern.
///
/// The parameter is either a compiled [`RuleParam::Pattern`] or a string.
/// [`Validator::add_rule`][crate::Validator::add_rule] compiles strings once;
/// a string that reaches the rule is compiled on each run, and one that does
/// not compile skips the check.
pub struct Format;

impl Rule for Format {
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        if !ctx.value.is_truthy() {
            return None;
        }
        let text = ctx.value.render();
        let matched = match ctx.param {
            RuleParam::Pattern(re) => re.is_match(&text),
            RuleParam::Value(v) => {
                let source = v.as_str()?;
                match Regex::new(source) {
                    Ok(re) => re.is_match(&text),
                    Err(err) => {
                        tracing::warn!(pattern = source, %err, "invalid format pattern, skipping check");
                        return None;
                    }
                }
            }
        };
        if matched { None } else { ctx.fail() }
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// All built-in rules keyed by name.
pub fn builtin_rules() -> RuleMap {
    let entries: [(&str, Box<dyn Rule>); 17] = [
        (names::REQUIRED, Box::new(Required)),
        (names::MIN, Box::new(Min)),
        (names::MIN_EXCLUDE, Box::new(MinExclude)),
        (names::MAX, Box::new(Max)),
        (names::MAX_EXCLUDE, Box::new(MaxExclude)),
        (names::RANGE, Box::new(Range)),
        (names::MIN_LENGTH, Box::new(MinLength)),
        (names::MAX_LENGTH, Box::new(MaxLength)),
        (names::RANGE_LENGTH, Box::new(RangeLength)),
        (names::MIN_DATE, Box::new(MinDate)),
        (names::MAX_DATE, Box::new(MaxDate)),
        (names::CHECKED, Box::new(Checked)),
        (names::EQUAL, Box::new(Equal)),
        (names::UNEQUAL, Box::new(Unequal)),
        (names::MOBILE, Box::new(Mobile)),
        (names::EMAIL, Box::new(Email)),
        (names::FORMAT, Box::new(Format)),
    ];
    entries
        .into_iter()
        .map(|(name, rule)| (name.to_owned(), rule))
        .collect()
}

/// Default messages of the built-in rules keyed by name.
pub fn builtin_messages() -> MessageMap {
    let entries: [(&str, MessageEntry); 17] = [
        (names::REQUIRED, MessageEntry::literal("This field is required")),
        (
            names::MIN,
            MessageEntry::generator(|p| format!("Please enter a value no less than {p}")),
        ),
        (
            names::MIN_EXCLUDE,
            MessageEntry::generator(|p| format!("Please enter a value greater than {p}")),
        ),
        (
            names::MAX,
            MessageEntry::generator(|p| format!("Please enter a value no greater than {p}")),
        ),
        (
            names::MAX_EXCLUDE,
            MessageEntry::generator(|p| format!("Please enter a value less than {p}")),
        ),
        (
            names::RANGE,
            MessageEntry::generator(|p| range_message(p, "a value")),
        ),
        (
            names::MIN_LENGTH,
            MessageEntry::generator(|p| format!("Please enter at least {p} characters")),
        ),
        (
            names::MAX_LENGTH,
            MessageEntry::generator(|p| format!("Please enter no more than {p} characters")),
        ),
        (
            names::RANGE_LENGTH,
            MessageEntry::generator(|p| range_message(p, "a length")),
        ),
        (
            names::MIN_DATE,
            MessageEntry::generator(|p| format!("Please enter a date no earlier than {p}")),
        ),
        (
            names::MAX_DATE,
            MessageEntry::generator(|p| format!("Please enter a date no later than {p}")),
        ),
        (names::CHECKED, MessageEntry::literal("Please select this option")),
        (names::EQUAL, MessageEntry::literal("The two entries do not match")),
        (names::UNEQUAL, MessageEntry::literal("The two entries must differ")),
        (names::MOBILE, MessageEntry::literal("Invalid mobile phone number")),
        (names::EMAIL, MessageEntry::literal("Invalid email address")),
        (names::FORMAT, MessageEntry::literal("Invalid format")),
    ];
    entries
        .into_iter()
        .map(|(name, entry)| (name.to_owned(), entry))
        .collect()
}
