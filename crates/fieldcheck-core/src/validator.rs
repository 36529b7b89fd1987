/// The validation engine: deferred checks per validation key and their
/// execution.
///
/// A [`Validator`] owns a data store mapping a validation key (typically one
/// form instance) to its fields, and each field to an ordered list of
/// [`DeferredCheck`]s. Registration captures the field value, rule parameter
/// and override message; nothing is looked up in the registry until
/// [`Validator::execute`] runs, so rules added with
/// [`extend_rules`][crate::extend_rules] after registration are still honoured.
///
/// Registration is lenient: malformed input is skipped or ignored rather than
/// reported.
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::param::RuleParam;
use crate::registry::{Outcome, Registry, with_registry};
use crate::rules::names;
use crate::value::FieldValue;


/// Override messages keyed by rule name.
pub type OverrideMessages = BTreeMap<String, String>;

/// A field's identity and the value it held when its rules were registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationModel {
    /// Field name, unique within a validation key. A missing name
    /// deserializes as empty and [`Validator::add_rules`] skips the option.
    #[serde(default)]
    pub name: String,
    /// Snapshot of the field value. Never re-read after registration.
    #[serde(default)]
    pub value: FieldValue,
}

impl ValidationModel {
    /// Constructs a [`ValidationModel`].
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered list of `(rule name, parameter)` pairs with unique names.
///
/// Order is significant: checks run in the order rules were added and stop at
/// the first failure. Adding a name that is already present replaces its
/// parameter in place. Deserializes from a JSON object, keeping document
/// order; a repeated key keeps its first position and its last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<(String, RuleParam)>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, param: impl Into<RuleParam>) -> Self {
        self.push(name, param);
        self
    }

    /// Appends a rule in place, or replaces the parameter of an existing rule
    /// of the same name without moving it.
    pub fn push(&mut self, name: impl Into<String>, param: impl Into<RuleParam>) {
        let name = name.into();
        let param = param.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = param,
            None => self.rules.push((name, param)),
        }
    }

    /// The parameter of the rule `name`, if present.
    pub fn get(&self, name: &str) -> Option<&RuleParam> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, param)| param)
    }

    /// Iterates the rules in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleParam)> {
        self.rules.iter().map(|(name, param)| (name.as_str(), param))
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, RuleParam);
    type IntoIter = std::vec::IntoIter<(String, RuleParam)>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<N: Into<String>, P: Into<RuleParam>> FromIterator<(N, P)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, param) in iter {
            set.push(name, param);
        }
        set
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut m = serializer.serialize_map(Some(self.rules.len()))?;
        for (name, param) in &self.rules {
            m.serialize_entry(name, param)?;
        }
        m.end()
    }
}

impl<'de> Deserialize<'de> for RuleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RuleSetVisitor)
    }
}

struct RuleSetVisitor;

impl<'de> Visitor<'de> for RuleSetVisitor {
    type Value = RuleSet;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of rule names to parameters")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RuleSet, A::Error> {
        let mut set = RuleSet::new();
        while let Some((name, param)) = map.next_entry::<String, RuleParam>()? {
            set.push(name, param);
        }
        Ok(set)
    }
}

/// One entry of a bulk registration.
///
/// `model` and `rules` are optional so that incomplete entries can be
/// expressed; [`Validator::add_rules`] skips them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationOption {
    /// The field being validated.
    #[serde(default)]
    pub model: Option<ValidationModel>,
    /// The rules to apply, in order.
    #[serde(default)]
    pub rules: Option<RuleSet>,
    /// Per-rule override messages. An explicit `null` reads as none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub messages: OverrideMessages,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<OverrideMessages, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<OverrideMessages>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ValidationOption {
    /// An option with a model and rules and no override messages.
    pub fn new(model: ValidationModel, rules: RuleSet) -> Self {
        Self {
            model: Some(model),
            rules: Some(rules),
            messages: OverrideMessages::new(),
        }
    }

    /// Adds an override message for `rule`.
    #[must_use]
    pub fn message(mut self, rule: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(rule.into(), message.into());
        self
    }
}

/// A stored, not-yet-evaluated rule application.
///
/// Captures everything needed to run the rule later; the rule itself is
/// resolved by name when [`evaluate`][DeferredCheck::evaluate] runs.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredCheck {
    /// Rule name, resolved against the registry at evaluation time.
    pub rule: String,
    /// Field value captured at registration.
    pub value: FieldValue,
    /// Rule parameter.
    pub param: RuleParam,
    /// Override message, if the caller supplied one.
    pub message: Option<String>,
}

impl DeferredCheck {
    /// Runs the check against `registry`.
    pub fn evaluate(&self, registry: &Registry) -> Outcome {
        registry.check(&self.rule, &self.value, &self.param, self.message.as_deref())
    }
}

/// Compiles the string pattern of a `format` rule. A pattern that does not
/// compile is kept as text; the rule skips it when it runs.
fn prepare_param(rule: &str, param: RuleParam) -> RuleParam {
    if rule != names::FORMAT {
        return param;
    }
    match param.as_value().and_then(FieldValue::as_str).map(RuleParam::pattern) {
        Some(Ok(compiled)) => compiled,
        Some(Err(_)) | None => param,
    }
}

/// The verdict of one [`Validator::execute`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff no field under the key failed.
    pub status: bool,
    /// Failing fields only, each mapped to its first failing rule's message.
    pub data: BTreeMap<String, String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// A passing result with no errors.
    pub fn new() -> Self {
        Self {
            status: true,
            data: BTreeMap::new(),
        }
    }

    /// Records a failing field.
    pub fn record(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.status = false;
        self.data.insert(field.into(), message.into());
    }

    /// Returns `true` if no field failed.
    pub fn is_valid(&self) -> bool {
        self.status
    }

    /// The error message recorded for `field`, if it failed.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.data.get(field).map(String::as_str)
    }

    /// Iterates failing fields and their messages in field-name order.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// What [`Validator::execute`] does with a rule name the registry lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownRulePolicy {
    /// The check passes silently.
    #[default]
    Ignore,
    /// The field fails with an "unknown validation rule" message.
    Report,
}

/// Engine configuration.
///
/// # Default
///
/// ```
/// # use fieldcheck_core::{UnknownRulePolicy, ValidatorConfig};
/// let cfg = ValidatorConfig::default();
/// assert_eq!(cfg.unknown_rules, UnknownRulePolicy::Ignore);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidatorConfig {
    /// Handling of unregistered rule names. Default [`UnknownRulePolicy::Ignore`].
    pub unknown_rules: UnknownRulePolicy,
}

type FieldStore = BTreeMap<String, Vec<DeferredCheck>>;

/// Holds deferred checks per validation key and evaluates them on demand.
///
/// ```
/// use fieldcheck_core::{RuleSet, ValidationModel, Validator, OverrideMessages};
///
/// let mut validator = Validator::new();
/// validator.add_rule(
///     "loginForm",
///     ValidationModel::new("password", ""),
///     RuleSet::new().rule("required", true),
///     &OverrideMessages::new(),
/// );
/// let result = validator.execute("loginForm");
/// assert!(!result.status);
/// assert_eq!(result.error("password"), Some("This field is required"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
    store: BTreeMap<String, FieldStore>,
}

impl Validator {
    /// A validator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator with `config`.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            store: BTreeMap::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Registers `rules` for the field `model.name` under `key`.
    ///
    /// Replaces any checks previously registered for the same field. One
    /// [`DeferredCheck`] is stored per rule, capturing `model.value`, the
    /// parameter and `messages[rule]`. A string parameter of `format` is
    /// compiled here, once. Always returns `true`.
    pub fn add_rule(
        &mut self,
        key: &str,
        model: ValidationModel,
        rules: RuleSet,
        messages: &OverrideMessages,
    ) -> bool {
        let ValidationModel { name, value } = model;
        let checks: Vec<DeferredCheck> = rules
            .into_iter()
            .map(|(rule, param)| DeferredCheck {
                message: messages.get(&rule).cloned(),
                value: value.clone(),
                param: prepare_param(&rule, param),
                rule,
            })
            .collect();
        tracing::trace!(key, field = %name, checks = checks.len(), "registered field");
        self.store
            .entry(key.to_owned())
            .or_default()
            .insert(name, checks);
        true
    }

    /// Registers every option under `key`.
    ///
    /// Returns `false` without touching the store when `key` is empty. Options
    /// missing a model or rules are skipped and the rest are still registered.
    pub fn add_rules(&mut self, key: &str, options: Vec<ValidationOption>) -> bool {
        if key.is_empty() {
            return false;
        }
        for (index, option) in options.into_iter().enumerate() {
            let ValidationOption {
                model: Some(model),
                rules: Some(rules),
                messages,
            } = option
            else {
                tracing::debug!(key, index, "skipping option without model or rules");
                continue;
            };
            if model.name.is_empty() {
                tracing::debug!(key, index, "skipping option without a field name");
                continue;
            }
            self.add_rule(key, model, rules, &messages);
        }
        true
    }

    /// Evaluates every field under `key` against the process-wide registry.
    pub fn execute(&self, key: &str) -> ValidationResult {
        with_registry(|registry| self.execute_with(registry, key))
    }

    /// Evaluates every field under `key` against `registry`.
    ///
    /// Each field's checks run in registration order and stop at the first
    /// failure; every field is visited. A key with no fields passes.
    pub fn execute_with(&self, registry: &Registry, key: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        let Some(fields) = self.store.get(key) else {
            return result;
        };
        for (field, checks) in fields {
            if let Some(message) = self.first_failure(registry, field, checks) {
                tracing::debug!(key, field = %field, %message, "field failed validation");
                result.record(field.as_str(), message);
            }
        }
        result
    }

    fn first_failure(
        &self,
        registry: &Registry,
        field: &str,
        checks: &[DeferredCheck],
    ) -> Option<String> {
        for check in checks {
            tracing::trace!(field, rule = %check.rule, "evaluating check");
            match check.evaluate(registry) {
                Outcome::Passed => {}
                Outcome::Failed(message) => return Some(message),
                Outcome::UnknownRule => match self.config.unknown_rules {
                    UnknownRulePolicy::Ignore => {
                        tracing::debug!(field, rule = %check.rule, "unknown rule, skipping");
                    }
                    UnknownRulePolicy::Report => {
                        return Some(format!("unknown validation rule `{}`", check.rule));
                    }
                },
            }
        }
        None
    }

    /// The checks registered for `field` under `key`.
    pub fn checks(&self, key: &str, field: &str) -> Option<&[DeferredCheck]> {
        self.store.get(key)?.get(field).map(Vec::as_slice)
    }

    /// Field names registered under `key`, in sorted order.
    pub fn fields(&self, key: &str) -> impl Iterator<Item = &str> {
        self.store
            .get(key)
            .into_iter()
            .flat_map(|fields| fields.keys().map(String::as_str))
    }

    /// Validation keys with at least one registration.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.store.keys().map(String::as_str)
    }

    /// Drops everything registered under `key`. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.store.remove(key).is_some()
    }
}
