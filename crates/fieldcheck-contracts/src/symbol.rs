//! Symbol table entries and the sources that group them.
//!
//! A symbol is the short operator-like token a rule author writes (`>=`,
//! `date><=`, `require_array_keys`). Each symbol maps to a
//! `SymbolTableEntry` naming the backing predicate plus the argument slots
//! the dispatcher fills on its own.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A value the dispatcher injects into a predicate slot instead of reading
/// it from the rule's raw arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placeholder {
    /// The container that holds the field being validated.
    Parent,
    /// The field's own raw value.
    FieldValue,
    /// The caller's current error-position token (e.g. `@p1`, `@parent`).
    ErrorPosition,
    /// A fixed `@p<n>` marker naming the n-th rule argument (1-based).
    ArgPosition(usize),
}

impl Placeholder {
    /// Render a 1-based argument position as the `@p<n>` marker the message
    /// layer later substitutes.
    pub fn arg_marker(n: usize) -> String {
        format!("@p{n}")
    }
}

/// Registry-time description of how a symbol is invoked.
///
/// Entries are built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTableEntry {
    /// Name of the backing predicate in the dispatcher's predicate set.
    pub predicate_name: String,
    /// Slot index → value injected by the dispatcher.
    #[serde(default)]
    pub implicit_args: BTreeMap<usize, Placeholder>,
    /// When true the first non-implicit slot receives every remaining raw
    /// argument as a single list.
    #[serde(default)]
    pub variadic: bool,
}

impl SymbolTableEntry {
    pub fn new(predicate_name: impl Into<String>) -> Self {
        Self {
            predicate_name: predicate_name.into(),
            implicit_args: BTreeMap::new(),
            variadic: false,
        }
    }

    /// Declare that slot `index` is filled by the dispatcher.
    pub fn implicit(mut self, index: usize, placeholder: Placeholder) -> Self {
        self.implicit_args.insert(index, placeholder);
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

/// Where a symbol source comes from. Built-ins have a fixed relative order;
/// extensions are supplied by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    General,
    Container,
    Temporal,
    TemporalCompat,
    Extension(String),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::General => write!(f, "general"),
            SourceKind::Container => write!(f, "container"),
            SourceKind::Temporal => write!(f, "temporal"),
            SourceKind::TemporalCompat => write!(f, "temporal-compat"),
            SourceKind::Extension(name) => write!(f, "extension:{name}"),
        }
    }
}
