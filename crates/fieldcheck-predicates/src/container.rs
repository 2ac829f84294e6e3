//! Container-shape predicates.
//!
//! `unique` is the one predicate in the workspace that looks past its own
//! field: the registry declares the enclosing container at slot 0 and the
//! field value at slot 1, and the dispatcher fills both from the call
//! context.

use serde_json::Value;

use fieldcheck_contracts::{
    error::{FieldcheckError, FieldcheckResult},
    result::FailTag,
    symbol::{Placeholder, SourceKind, SymbolTableEntry},
};
use fieldcheck_core::{arg, Argument, PredicateSet, SymbolSource, Verdict};

/// Symbols of the container-shape source.
pub fn container_source() -> SymbolSource {
    SymbolSource::new(SourceKind::Container)
        .with("require_array_keys", SymbolTableEntry::new("require_array_keys").variadic())
        .with(
            "unique",
            SymbolTableEntry::new("unique")
                .implicit(0, Placeholder::Parent)
                .implicit(1, Placeholder::FieldValue),
        )
        .with("list", SymbolTableEntry::new("list"))
        .with("object", SymbolTableEntry::new("object"))
}

pub fn container_predicates() -> PredicateSet {
    let mut set = PredicateSet::new();
    set.insert_fn("require_array_keys", require_array_keys);
    set.insert_fn("unique", unique);
    set.insert_fn("list", |value, _| Ok(value.is_array().into()));
    set.insert_fn("object", |value, _| Ok(value.is_object().into()));
    set
}

/// The value is an object holding every listed key.
fn require_array_keys(value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let keys = arg(args, 0).as_list().unwrap_or_default();
    if keys.is_empty() {
        return Err(FieldcheckError::parameter(
            "require_array_keys",
            "",
            "needs at least one key",
        ));
    }
    let Some(map) = value.as_object() else {
        return Ok(Verdict::Bool(false));
    };
    Ok(keys.iter().all(|k| map.contains_key(*k)).into())
}

/// No sibling in the enclosing container holds an equal value.
///
/// The field's own slot counts once, so a value is unique when it occurs
/// exactly once among the parent's members. A field with no parent has
/// nothing to collide with.
fn unique(_value: &Value, args: &[Argument<'_>]) -> FieldcheckResult<Verdict> {
    let (Some(parent), Some(field)) = (arg(args, 0).as_value(), arg(args, 1).as_value()) else {
        return Ok(Verdict::Bool(true));
    };

    let occurrences = match parent {
        Value::Array(items) => items.iter().filter(|item| *item == field).count(),
        Value::Object(map) => map.values().filter(|item| *item == field).count(),
        _ => return Ok(Verdict::Bool(true)),
    };

    if occurrences > 1 {
        Ok(Verdict::tagged(&FailTag::bare("unique").at("@parent")))
    } else {
        Ok(Verdict::Bool(true))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
