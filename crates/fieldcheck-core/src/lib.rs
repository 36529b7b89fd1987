#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod param;
pub mod registry;
pub mod rules;
pub mod validator;
pub mod value;

pub use param::RuleParam;
pub use registry::{
    Lookup, MessageEntry, MessageFn, MessageMap, MessageTable, Outcome, Registry, Rule,
    RuleContext, RuleMap, extend_rules, rule_fn, with_registry,
};
pub use rules::names;
pub use validator::{
    DeferredCheck, OverrideMessages, RuleSet, UnknownRulePolicy, ValidationModel,
    ValidationOption, ValidationResult, Validator, ValidatorConfig,
};
pub use value::FieldValue;

/// Returns the current version of the fieldcheck-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
