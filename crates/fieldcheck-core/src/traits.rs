//! The predicate seam between the dispatcher and rule implementations.
//!
//! Every symbol ultimately runs a `Predicate`. Built-in crates implement the
//! trait on small structs; a hosting application can hand in a closure.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use fieldcheck_contracts::{error::FieldcheckResult, result::FailTag};

/// One positional argument as the predicate receives it.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<'a> {
    /// Raw, un-coerced rule argument (or an injected position marker).
    Text(Cow<'a, str>),
    /// Every remaining raw argument of a variadic symbol.
    List(Vec<&'a str>),
    /// An injected value from the call context.
    Value(&'a Value),
    /// An optional slot the rule author left out.
    Absent,
}

impl<'a> Argument<'a> {
    /// Text content, if this slot carries text. Blank text counts as absent.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Argument::Text(t) if !t.trim().is_empty() => Some(t.as_ref()),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&'a Value> {
        match self {
            Argument::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[&'a str]> {
        match self {
            Argument::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

/// Fetch the argument at `index`, treating out-of-range as `Absent`.
pub fn arg<'s, 'a>(args: &'s [Argument<'a>], index: usize) -> &'s Argument<'a> {
    const ABSENT: &Argument<'static> = &Argument::Absent;
    args.get(index).unwrap_or(ABSENT)
}

/// What a predicate hands back before the dispatcher normalizes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// `true` passes, `false` fails with the default message.
    Bool(bool),
    /// A `TAG:<kind>[:<reason>][:<position>]` string, or a free-form message.
    Tag(String),
}

impl Verdict {
    pub fn tagged(tag: &FailTag) -> Self {
        Verdict::Tag(tag.to_string())
    }
}

impl From<bool> for Verdict {
    fn from(b: bool) -> Self {
        Verdict::Bool(b)
    }
}

/// A rule implementation.
///
/// Implementations must be pure and reentrant: the same predicate instance
/// is shared by every validation call for the life of the process.
/// Return `Err(FieldcheckError::Parameter { .. })` when the *rule* is
/// malformed; return a failing `Verdict` when the *value* is wrong.
pub trait Predicate: Send + Sync {
    fn evaluate(&self, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict>;
}

impl<F> Predicate for F
where
    F: Fn(&Value, &[Argument<'_>]) -> FieldcheckResult<Verdict> + Send + Sync,
{
    fn evaluate(&self, value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
        self(value, args)
    }
}

/// Predicate implementations keyed by predicate name.
#[derive(Clone, Default)]
pub struct PredicateSet {
    predicates: HashMap<String, Arc<dyn Predicate>>,
}

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `predicate` under `name`. Registering the same name twice
    /// replaces the previous implementation.
    pub fn insert(&mut self, name: impl Into<String>, predicate: impl Predicate + 'static) {
        self.predicates.insert(name.into(), Arc::new(predicate));
    }

    /// Register a closure under `name`. The explicit `Fn` bound lets the
    /// closure's argument and return types be inferred at the call site.
    pub fn insert_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&Value, &[Argument<'_>]) -> FieldcheckResult<Verdict> + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(f));
    }

    /// Merge every predicate of `other` into `self`, `other` winning on clashes.
    pub fn extend(&mut self, other: PredicateSet) {
        self.predicates.extend(other.predicates);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Predicate>> {
        self.predicates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl std::fmt::Debug for PredicateSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.predicates.keys().collect();
        names.sort();
        f.debug_struct("PredicateSet").field("predicates", &names).finish()
    }
}
