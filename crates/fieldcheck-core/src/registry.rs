/// The strategy registry: rule names, their predicates and default messages.
///
/// This module defines the [`Rule`] trait, [`RuleContext`], [`MessageEntry`],
/// [`MessageTable`] and [`Registry`], plus the process-wide registry shared by
/// every [`Validator`][crate::Validator] and its entry points
/// [`extend_rules`] and [`with_registry`].
///
/// The registry is append-only. [`Registry::extend`] inserts a rule or message
/// only when its name is still free, so the built-ins and every earlier
/// extension survive later calls regardless of the order independent modules
/// run their initialisation in.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::param::RuleParam;
use crate::rules;
use crate::value::FieldValue;


/// Everything a rule sees when it runs.
///
/// Built from a stored [`DeferredCheck`][crate::DeferredCheck] at execution
/// time, so `messages` is always the registry's current message table.
pub struct RuleContext<'a> {
    /// The name the rule was invoked under.
    pub name: &'a str,
    /// The field value captured at registration time.
    pub value: &'a FieldValue,
    /// The rule-specific parameter.
    pub param: &'a RuleParam,
    /// The caller's override message, if any.
    pub message: Option<&'a str>,
    /// The registry's default messages.
    pub messages: &'a MessageTable,
}

impl RuleContext<'_> {
    /// The failure message for this check.
    ///
    /// Returns the override message when one was given and is non-empty,
    /// otherwise the registry default for [`name`][RuleContext::name] rendered
    /// against the parameter. Always `Some`, so rules can end with
    /// `return ctx.fail()`.
    pub fn fail(&self) -> Option<String> {
        self.fail_with(self.param)
    }

    /// Like [`fail`][RuleContext::fail], but renders the default message
    /// against `param` instead of the check's own parameter.
    pub fn fail_with(&self, param: &RuleParam) -> Option<String> {
        match self.message {
            Some(m) if !m.is_empty() => Some(m.to_owned()),
            Some(_) | None => Some(self.messages.render(self.name, param)),
        }
    }
}

/// A single validation rule.
///
/// A rule inspects the captured value and parameter in a [`RuleContext`] and
/// returns `Some(message)` on failure or `None` when the value passes. Rules
/// never panic on malformed input; a value of the wrong shape passes.
///
/// Any `Fn(&RuleContext<'_>) -> Option<String>` is a rule; [`rule_fn`] boxes
/// a closure for use with [`extend_rules`]:
///
/// ```
/// use fieldcheck_core::{MessageEntry, RuleMap, extend_rules, rule_fn};
/// use std::collections::BTreeMap;
///
/// let mut rules = RuleMap::new();
/// rules.insert(
///     "doc.even".to_owned(),
///     rule_fn(|ctx| {
///         let n = ctx.value.as_number()?;
///         if n % 2.0 != 0.0 { ctx.fail() } else { None }
///     }),
/// );
/// let mut messages = BTreeMap::new();
/// messages.insert("doc.even".to_owned(), MessageEntry::literal("must be even"));
/// assert!(extend_rules(rules, messages));
/// ```
pub trait Rule: Send + Sync {
    /// Run the check. `None` means the value passed.
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String>;
}

impl<F> Rule for F
where
    F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync,
{
    fn check(&self, ctx: &RuleContext<'_>) -> Option<String> {
        self(ctx)
    }
}

/// Boxes a closure as a [`Rule`].
pub fn rule_fn<F>(f: F) -> Box<dyn Rule>
where
    F: Fn(&RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
{
    Box::new(f)
}

/// Generator signature for parameterised default messages.
pub type MessageFn = dyn Fn(&RuleParam) -> String + Send + Sync;

/// The default message of a rule.
pub enum MessageEntry {
    /// A fixed string.
    Literal(String),
    /// A function of the rule parameter, e.g. "must be at least 18".
    Generator(Box<MessageFn>),
}

impl MessageEntry {
    /// Builds a [`MessageEntry::Literal`].
    pub fn literal(message: impl Into<String>) -> Self {
        Self::Literal(message.into())
    }

    /// Builds a [`MessageEntry::Generator`].
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn(&RuleParam) -> String + Send + Sync + 'static,
    {
        Self::Generator(Box::new(f))
    }

    /// Renders the message for `param`.
    pub fn render(&self, param: &RuleParam) -> String {
        match self {
            Self::Literal(s) => s.clone(),
            Self::Generator(f) => f(param),
        }
    }
}

impl fmt::Debug for MessageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Rules keyed by name, the input of [`extend_rules`].
pub type RuleMap = BTreeMap<String, Box<dyn Rule>>;

/// Messages keyed by rule name, the input of [`extend_rules`].
pub type MessageMap = BTreeMap<String, MessageEntry>;

/// The message half of the registry.
#[derive(Debug, Default)]
pub struct MessageTable {
    entries: MessageMap,
}

impl MessageTable {
    /// Message used for a failing rule that has no registered message.
    pub const FALLBACK: &'static str = "invalid value";

    /// Returns the entry registered under `name`.
    pub fn get(&self, name: &str) -> Option<&MessageEntry> {
        self.entries.get(name)
    }

    /// Returns `true` if a message is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Renders the default message of `name` for `param`.
    pub fn render(&self, name: &str, param: &RuleParam) -> String {
        self.entries
            .get(name)
            .map_or_else(|| Self::FALLBACK.to_owned(), |entry| entry.render(param))
    }

    /// Inserts `entry` if `name` is free. Returns whether it was inserted.
    fn insert_if_absent(&mut self, name: String, entry: MessageEntry) -> bool {
        if self.entries.contains_key(&name) {
            return false;
        }
        self.entries.insert(name, entry);
        true
    }
}

/// Result of looking a rule up by name.
pub enum Lookup<'a> {
    /// The rule is registered.
    Found(&'a dyn Rule),
    /// No rule has this name.
    NotFound,
}

/// Result of running one check through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The value satisfied the rule.
    Passed,
    /// The value failed; carries the message to report.
    Failed(String),
    /// No rule with the requested name is registered.
    UnknownRule,
}

/// The vocabulary of rules and messages shared by validators.
///
/// [`Registry::default`] is seeded with the built-in rules. The process-wide
/// instance behind [`extend_rules`] and [`with_registry`] is one such registry;
/// owned instances are useful for isolated checks.
pub struct Registry {
    rules: RuleMap,
    messages: MessageTable,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .field("messages", &self.messages)
            .finish()
    }
}

impl Registry {
    /// A registry with no rules or messages at all.
    pub fn empty() -> Self {
        Self {
            rules: RuleMap::new(),
            messages: MessageTable::default(),
        }
    }

    /// A registry seeded with the built-in rules and their messages.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.extend(rules::builtin_rules(), rules::builtin_messages());
        registry
    }

    /// Adds every rule and message whose name is not yet registered.
    ///
    /// Existing names are left untouched, built-ins included. Always returns
    /// `true`.
    pub fn extend(&mut self, rules: RuleMap, messages: MessageMap) -> bool {
        for (name, rule) in rules {
            if self.rules.contains_key(&name) {
                tracing::debug!(rule = %name, "rule already registered, keeping existing");
                continue;
            }
            self.rules.insert(name, rule);
        }
        for (name, entry) in messages {
            if !self.messages.insert_if_absent(name.clone(), entry) {
                tracing::debug!(rule = %name, "message already registered, keeping existing");
            }
        }
        true
    }

    /// Looks a rule up by name.
    pub fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.rules.get(name) {
            Some(rule) => Lookup::Found(rule.as_ref()),
            None => Lookup::NotFound,
        }
    }

    /// Returns `true` if a rule is registered under `name`.
    pub fn contains_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Returns `true` if a message is registered under `name`.
    pub fn contains_message(&self, name: &str) -> bool {
        self.messages.contains(name)
    }

    /// Registered rule names in sorted order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// The registered default messages.
    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    /// Runs the rule `name` against `value`.
    ///
    /// An empty message returned by a rule counts as a pass.
    pub fn check(
        &self,
        name: &str,
        value: &FieldValue,
        param: &RuleParam,
        message: Option<&str>,
    ) -> Outcome {
        let Lookup::Found(rule) = self.lookup(name) else {
            return Outcome::UnknownRule;
        };
        let ctx = RuleContext {
            name,
            value,
            param,
            message,
            messages: &self.messages,
        };
        match rule.check(&ctx) {
            Some(msg) if !msg.is_empty() => Outcome::Failed(msg),
            Some(_) | None => Outcome::Passed,
        }
    }
}

/// The process-wide registry, seeded with the built-ins on first use.
static GLOBAL: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::default()));

/// Extends the process-wide registry.
///
/// Every rule and message whose name is not yet registered is added; existing
/// names, built-ins included, are never replaced. Safe to call from any number
/// of independent initialisation paths. Always returns `true`.
///
/// Must not be called from inside a [`Rule`], which runs while the registry is
/// held for reading.
pub fn extend_rules(rules: RuleMap, messages: MessageMap) -> bool {
    let mut registry = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    registry.extend(rules, messages)
}

/// Runs `f` with shared access to the process-wide registry.
pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    let registry = GLOBAL.read().unwrap_or_else(PoisonError::into_inner);
    f(&registry)
}
