#![allow(clippy::expect_used)]

use super::names;
use super::{normalize_date, parse_date};
use crate::param::RuleParam;
use crate::registry::{Outcome, Registry};
use crate::value::FieldValue;

fn run(rule: &str, value: impl Into<FieldValue>, param: impl Into<RuleParam>) -> Outcome {
    Registry::with_builtins().check(rule, &value.into(), &param.into(), None)
}

fn passes(rule: &str, value: impl Into<FieldValue>, param: impl Into<RuleParam>) -> bool {
    run(rule, value, param) == Outcome::Passed
}

fn failed(message: &str) -> Outcome {
    Outcome::Failed(message.to_owned())
}

// ---------------------------------------------------------------------------
// required / checked
// ---------------------------------------------------------------------------

#[test]
fn required_rejects_empty_string() {
    assert_eq!(
        run(names::REQUIRED, "", true),
        failed("This field is required")
    );
}

#[test]
fn required_rejects_null() {
    assert_eq!(
        run(names::REQUIRED, FieldValue::Null, true),
        failed("This field is required")
    );
}

#[test]
fn required_accepts_zero_and_false() {
    assert!(passes(names::REQUIRED, 0, true));
    assert!(passes(names::REQUIRED, false, true));
    assert!(passes(names::REQUIRED, "x", true));
}

#[test]
fn required_off_never_fails() {
    assert!(passes(names::REQUIRED, "", false));
    assert!(passes(names::REQUIRED, FieldValue::Null, false));
}

#[test]
fn checked_requires_truthy_value() {
    assert_eq!(
        run(names::CHECKED, false, true),
        failed("Please select this option")
    );
    assert!(passes(names::CHECKED, true, true));
    assert!(passes(names::CHECKED, false, false));
}

// ---------------------------------------------------------------------------
// numeric bounds
// ---------------------------------------------------------------------------

#[test]
fn min_is_inclusive() {
    assert!(passes(names::MIN, 18, 18));
    assert_eq!(
        run(names::MIN, 17, 18),
        failed("Please enter a value no less than 18")
    );
}

#[test]
fn min_exclude_rejects_bound() {
    assert!(passes(names::MIN_EXCLUDE, 19, 18));
    assert_eq!(
        run(names::MIN_EXCLUDE, 18, 18),
        failed("Please enter a value greater than 18")
    );
}

#[test]
fn max_is_inclusive() {
    assert!(passes(names::MAX, 65, 65));
    assert_eq!(
        run(names::MAX, 66, 65),
        failed("Please enter a value no greater than 65")
    );
}

#[test]
fn max_ignores_infinity_text() {
    assert!(passes(names::MAX, "infinity", 10));
    assert!(passes(names::MIN, "-inf", 10));
}

#[test]
fn max_exclude_rejects_bound() {
    assert!(passes(names::MAX_EXCLUDE, 64, 65));
    assert_eq!(
        run(names::MAX_EXCLUDE, 65, 65),
        failed("Please enter a value less than 65")
    );
}

#[test]
fn numeric_rules_coerce_strings() {
    assert!(passes(names::MIN, "20", 18));
    assert!(!passes(names::MIN, "12", 18));
    assert!(passes(names::MAX, 1.5, "2"));
}

#[test]
fn numeric_rules_skip_non_numbers() {
    assert!(passes(names::MIN, "abc", 18));
    assert!(passes(names::MIN, "", 18));
    assert!(passes(names::MAX, FieldValue::Null, 1));
}

#[test]
fn range_bounds_are_inclusive() {
    assert!(passes(names::RANGE, 1, vec![1, 5]));
    assert!(passes(names::RANGE, 5, vec![1, 5]));
    assert_eq!(
        run(names::RANGE, 6, vec![1, 5]),
        failed("Please enter a value between 1 and 5")
    );
    assert!(!passes(names::RANGE, 0, vec![1, 5]));
}

#[test]
fn range_normalizes_reversed_bounds() {
    for value in [0, 1, 3, 5, 6] {
        assert_eq!(
            run(names::RANGE, value, vec![5, 1]),
            run(names::RANGE, value, vec![1, 5]),
            "value {value}"
        );
    }
    assert_eq!(
        run(names::RANGE, 9, vec![5, 1]),
        failed("Please enter a value between 1 and 5")
    );
}

#[test]
fn range_with_malformed_param_passes() {
    assert!(passes(names::RANGE, 100, 5));
    assert!(passes(names::RANGE, 100, vec![5]));
}

// ---------------------------------------------------------------------------
// length bounds
// ---------------------------------------------------------------------------

#[test]
fn min_length_counts_characters() {
    assert!(passes(names::MIN_LENGTH, "héllo", 5));
    assert_eq!(
        run(names::MIN_LENGTH, "abc", 6),
        failed("Please enter at least 6 characters")
    );
}

#[test]
fn min_length_treats_null_as_empty() {
    assert!(!passes(names::MIN_LENGTH, FieldValue::Null, 1));
}

#[test]
fn max_length_counts_characters() {
    assert!(passes(names::MAX_LENGTH, "abc", 3));
    assert_eq!(
        run(names::MAX_LENGTH, "abcd", 3),
        failed("Please enter no more than 3 characters")
    );
}

#[test]
fn length_rules_count_array_elements() {
    assert!(passes(names::MAX_LENGTH, vec!["a", "b"], 2));
    assert!(!passes(names::MAX_LENGTH, vec!["a", "b", "c"], 2));
}

#[test]
fn range_length_normalizes_reversed_bounds() {
    for value in ["", "a", "abc", "abcde", "abcdef"] {
        assert_eq!(
            run(names::RANGE_LENGTH, value, vec![5, 1]),
            run(names::RANGE_LENGTH, value, vec![1, 5]),
            "value {value:?}"
        );
    }
    assert_eq!(
        run(names::RANGE_LENGTH, "abcdef", vec![5, 1]),
        failed("Please enter a length between 1 and 5")
    );
    assert!(passes(names::RANGE_LENGTH, "abc", vec![5, 1]));
}

// ---------------------------------------------------------------------------
// dates
// ---------------------------------------------------------------------------

#[test]
fn normalize_date_swaps_separators() {
    assert_eq!(normalize_date("2023-03-30"), "2023/03/30");
    assert_eq!(normalize_date("2023/03/30"), "2023/03/30");
}

#[test]
fn parse_date_accepts_optional_time() {
    assert!(parse_date("2023/03/30").is_some());
    assert!(parse_date("2023/03/30 15:06").is_some());
    assert!(parse_date("2023/03/30 15:06:59").is_some());
    assert!(parse_date("not a date").is_none());
    assert!(parse_date("2023/02/30").is_none());
}

#[test]
fn min_date_compares_across_separators() {
    assert!(passes(names::MIN_DATE, "2023-03-30", "2023/03/30"));
    assert!(passes(names::MIN_DATE, "2023/04/01", "2023-03-30"));
    assert_eq!(
        run(names::MIN_DATE, "2023-03-29", "2023-03-30"),
        failed("Please enter a date no earlier than 2023/03/30")
    );
}

#[test]
fn max_date_compares_across_separators() {
    assert!(passes(names::MAX_DATE, "2023-03-30", "2023/03/30"));
    assert_eq!(
        run(names::MAX_DATE, "2023-03-31 00:00:01", "2023-03-31"),
        failed("Please enter a date no later than 2023/03/31")
    );
}

#[test]
fn date_rules_skip_unparseable_input() {
    assert!(passes(names::MIN_DATE, "", "2023-03-30"));
    assert!(passes(names::MIN_DATE, "garbage", "2023-03-30"));
    assert!(passes(names::MAX_DATE, "2023-03-30", "garbage"));
    assert!(passes(names::MAX_DATE, 20230330, "2023-03-30"));
}

// ---------------------------------------------------------------------------
// related values
// ---------------------------------------------------------------------------

#[test]
fn equal_compares_with_related_value() {
    assert!(passes(names::EQUAL, "secret", "secret"));
    assert_eq!(
        run(names::EQUAL, "secret", "Secret"),
        failed("The two entries do not match")
    );
    assert!(passes(names::EQUAL, 1, 1.0));
}

#[test]
fn unequal_compares_with_related_value() {
    assert!(passes(names::UNEQUAL, "new", "old"));
    assert_eq!(
        run(names::UNEQUAL, "same", "same"),
        failed("The two entries must differ")
    );
}

// ---------------------------------------------------------------------------
// formats
// ---------------------------------------------------------------------------

#[test]
fn mobile_accepts_known_shapes() {
    assert!(passes(names::MOBILE, "13812345678", true));
    assert!(passes(names::MOBILE, "8613812345678", true));
    assert!(passes(names::MOBILE, "013812345678", true));
}

#[test]
fn mobile_rejects_bad_numbers() {
    assert_eq!(
        run(names::MOBILE, "23812345678", true),
        failed("Invalid mobile phone number")
    );
    assert!(!passes(names::MOBILE, "1381234567", true));
}

#[test]
fn mobile_skips_empty_or_disabled() {
    assert!(passes(names::MOBILE, "", true));
    assert!(passes(names::MOBILE, "nope", false));
}

#[test]
fn email_validation() {
    assert!(passes(names::EMAIL, "jane.doe@example.com", true));
    assert!(passes(names::EMAIL, "a_b-c@mail.co.uk", true));
    assert_eq!(
        run(names::EMAIL, "not-an-email", true),
        failed("Invalid email address")
    );
    assert!(!passes(names::EMAIL, "user@Example.com", true));
    assert!(passes(names::EMAIL, "", true));
}

#[test]
fn format_with_compiled_pattern() {
    let digits = RuleParam::pattern(r"^\d{6}$").expect("valid pattern");
    assert!(passes(names::FORMAT, "123456", digits.clone()));
    assert!(passes(names::FORMAT, 123456, digits.clone()));
    assert_eq!(run(names::FORMAT, "12345a", digits), failed("Invalid format"));
}

#[test]
fn format_with_string_pattern() {
    assert!(passes(names::FORMAT, "abc", "^[a-z]+$"));
    assert!(!passes(names::FORMAT, "ABC", "^[a-z]+$"));
}

#[test]
fn format_skips_falsy_values_and_bad_patterns() {
    assert!(passes(names::FORMAT, "", "^[a-z]+$"));
    assert!(passes(names::FORMAT, FieldValue::Null, "^[a-z]+$"));
    assert!(passes(names::FORMAT, "abc", "("));
}

// ---------------------------------------------------------------------------
// override messages
// ---------------------------------------------------------------------------

#[test]
fn override_message_replaces_default() {
    let outcome = Registry::with_builtins().check(
        names::MIN,
        &FieldValue::from(3),
        &RuleParam::from(18),
        Some("too young"),
    );
    assert_eq!(outcome, failed("too young"));
}

#[test]
fn empty_override_message_falls_back_to_default() {
    let outcome = Registry::with_builtins().check(
        names::REQUIRED,
        &FieldValue::from(""),
        &RuleParam::from(true),
        Some(""),
    );
    assert_eq!(outcome, failed("This field is required"));
}

#[test]
fn override_message_is_not_used_on_pass() {
    let outcome = Registry::with_builtins().check(
        names::MIN,
        &FieldValue::from(30),
        &RuleParam::from(18),
        Some("too young"),
    );
    assert_eq!(outcome, Outcome::Passed);
}
