//! The predicate dispatcher.
//!
//! `Dispatcher` turns a resolved symbol, a field value and the rule's raw
//! arguments into a call on the backing `Predicate`, then folds whatever the
//! predicate returned into a `PredicateResult`.
//!
//! Invocation pipeline:
//!
//! 1. Lay out the positional argument list. Slots the registry marks as
//!    implicit are filled from the `CallContext`; every other slot takes the
//!    next raw argument. A variadic entry packs all remaining raw arguments
//!    into its first non-implicit slot. A non-implicit slot that precedes a
//!    later implicit one but has no raw argument left becomes `Absent`.
//! 2. Raw arguments are passed through as text. Coercion is the predicate's
//!    business.
//! 3. Run the predicate and normalize: `true` → `Pass`, `false` →
//!    `Fail(default)`, `TAG:…` → `Fail(tag)`. A `Parameter` error is
//!    propagated unchanged; the rule is broken, not the data.

use std::borrow::Cow;

use serde_json::Value;
use tracing::{debug, warn};

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    result::{FailTag, PredicateResult, TAG_PREFIX},
    symbol::{Placeholder, SymbolTableEntry},
    token::RuleToken,
};

use crate::registry::Registry;
use crate::traits::{Argument, PredicateSet, Verdict};

/// Position token used when the caller does not supply one.
pub const DEFAULT_ERROR_POSITION: &str = "@p1";

/// Per-call context supplied by the tree walker.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    /// The walker's current error-position token, e.g. `@p1` or `@parent`.
    pub error_position_token: &'a str,
    /// The container holding the field, when there is one.
    pub parent_container: Option<&'a Value>,
}

impl<'a> CallContext<'a> {
    pub fn new(parent_container: Option<&'a Value>) -> Self {
        Self {
            error_position_token: DEFAULT_ERROR_POSITION,
            parent_container,
        }
    }

    pub fn with_position(mut self, token: &'a str) -> Self {
        self.error_position_token = token;
        self
    }
}

impl Default for CallContext<'_> {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Resolves symbols and invokes their predicates.
///
/// Read-only after construction; share it freely between threads.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    predicates: PredicateSet,
}

impl Dispatcher {
    pub fn new(registry: Registry, predicates: PredicateSet) -> Self {
        Self { registry, predicates }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// Resolve `token.symbol` and invoke it against `value`.
    pub fn check(
        &self,
        token: &RuleToken,
        value: &Value,
        ctx: &CallContext<'_>,
    ) -> FieldcheckResult<PredicateResult> {
        let resolved = self
            .registry
            .resolve(&token.symbol)
            .ok_or_else(|| FieldcheckError::UnknownSymbol {
                symbol: token.symbol.clone(),
            })?;

        debug!(
            symbol = %token.symbol,
            predicate = %resolved.entry.predicate_name,
            deprecated = resolved.deprecated,
            "dispatching rule token"
        );

        self.invoke(&resolved.entry, value, &token.raw_args, ctx)
    }

    /// Invoke the predicate behind `entry`.
    pub fn invoke(
        &self,
        entry: &SymbolTableEntry,
        value: &Value,
        raw_args: &[String],
        ctx: &CallContext<'_>,
    ) -> FieldcheckResult<PredicateResult> {
        let predicate = self
            .predicates
            .get(&entry.predicate_name)
            .ok_or_else(|| FieldcheckError::UnknownPredicate {
                predicate: entry.predicate_name.clone(),
            })?;

        let args = layout_arguments(entry, value, raw_args, ctx);
        let verdict = predicate.evaluate(value, &args)?;
        Ok(normalize(&entry.predicate_name, verdict))
    }
}

/// Build the positional argument list for `entry`.
pub fn layout_arguments<'a>(
    entry: &SymbolTableEntry,
    value: &'a Value,
    raw_args: &'a [String],
    ctx: &CallContext<'a>,
) -> Vec<Argument<'a>> {
    let mut raw = raw_args.iter();
    let mut args = Vec::with_capacity(raw_args.len() + entry.implicit_args.len());
    let mut list_taken = false;
    let mut slot = 0;

    loop {
        if let Some(placeholder) = entry.implicit_args.get(&slot) {
            args.push(inject(placeholder, value, ctx));
        } else if entry.variadic && !list_taken {
            list_taken = true;
            args.push(Argument::List(raw.by_ref().map(|a| a.trim()).collect()));
        } else if let Some(next) = raw.next() {
            args.push(Argument::Text(Cow::Borrowed(next.trim())));
        } else if entry.implicit_args.range(slot..).next().is_some() {
            args.push(Argument::Absent);
        } else {
            break;
        }
        slot += 1;
    }

    args
}

fn inject<'a>(placeholder: &Placeholder, value: &'a Value, ctx: &CallContext<'a>) -> Argument<'a> {
    match placeholder {
        Placeholder::Parent => ctx
            .parent_container
            .map(Argument::Value)
            .unwrap_or(Argument::Absent),
        Placeholder::FieldValue => Argument::Value(value),
        Placeholder::ErrorPosition => Argument::Text(Cow::Borrowed(ctx.error_position_token)),
        Placeholder::ArgPosition(n) => Argument::Text(Cow::Owned(Placeholder::arg_marker(*n))),
    }
}

fn normalize(predicate: &str, verdict: Verdict) -> PredicateResult {
    match verdict {
        Verdict::Bool(true) => PredicateResult::Pass,
        Verdict::Bool(false) => PredicateResult::fail(),
        Verdict::Tag(text) if text.starts_with(TAG_PREFIX) => match text.parse::<FailTag>() {
            Ok(tag) => PredicateResult::tagged(tag),
            Err(e) => {
                warn!(predicate = %predicate, error = %e, "predicate returned a malformed tag");
                PredicateResult::Fail {
                    message_tag: None,
                    detail: Some(text),
                }
            }
        },
        Verdict::Tag(text) => PredicateResult::Fail {
            message_tag: None,
            detail: Some(text),
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
