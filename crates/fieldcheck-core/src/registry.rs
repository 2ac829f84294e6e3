//! The symbol registry: ordered, first-match symbol resolution.
//!
//! A `Registry` is assembled once at startup by `RegistryBuilder` and is
//! read-only afterwards, so one instance can be shared across threads.
//!
//! Resolution algorithm:
//!
//! 1. Walk the sources in precedence order. Extensions come first, the most
//!    recently registered one leading; built-ins follow in the order they
//!    were added. The first source that defines the symbol wins. Two sources
//!    defining the same symbol is expected and never merged.
//! 2. If no source matched, consult the deprecated-alias table. An alias maps
//!    a legacy symbol straight to a *predicate name*. The implicit-argument
//!    and variadic declarations are copied from the first active entry bound
//!    to that predicate. There is exactly one level of indirection.
//! 3. Otherwise the symbol is unknown.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use fieldcheck_contracts::symbol::{SourceKind, SymbolTableEntry};

/// A named group of symbol entries.
#[derive(Debug, Clone)]
pub struct SymbolSource {
    kind: SourceKind,
    entries: HashMap<String, SymbolTableEntry>,
}

impl SymbolSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Add `symbol` to this source, replacing any earlier entry for it.
    pub fn insert(&mut self, symbol: impl Into<String>, entry: SymbolTableEntry) {
        self.entries.insert(symbol.into(), entry);
    }

    /// Builder-style `insert`.
    pub fn with(mut self, symbol: impl Into<String>, entry: SymbolTableEntry) -> Self {
        self.insert(symbol, entry);
        self
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn get(&self, symbol: &str) -> Option<&SymbolTableEntry> {
        self.entries.get(symbol)
    }

    /// All symbols of this source, sorted for stable output.
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &SymbolTableEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The outcome of resolving one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub symbol: String,
    pub entry: SymbolTableEntry,
    /// The active source the entry came from. `None` only for a deprecated
    /// alias whose canonical predicate no active source declares.
    pub source: Option<SourceKind>,
    /// True when the symbol was found through the deprecated-alias table.
    pub deprecated: bool,
}

/// Collects sources and aliases, then freezes them into a `Registry`.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    builtins: Vec<SymbolSource>,
    extensions: Vec<SymbolSource>,
    deprecated: HashMap<String, String>,
    warn_deprecated: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            warn_deprecated: true,
            ..Self::default()
        }
    }

    /// Append a built-in source. Built-ins added earlier take precedence.
    pub fn builtin(mut self, source: SymbolSource) -> Self {
        self.builtins.push(source);
        self
    }

    /// Append an extension source. Extensions always take precedence over
    /// built-ins, and a later extension shadows an earlier one.
    pub fn extension(mut self, source: SymbolSource) -> Self {
        self.extensions.push(source);
        self
    }

    /// Map a legacy symbol to the current predicate name.
    pub fn deprecated_alias(mut self, symbol: impl Into<String>, predicate: impl Into<String>) -> Self {
        self.deprecated.insert(symbol.into(), predicate.into());
        self
    }

    /// Whether resolving through an alias logs a warning.
    pub fn warn_deprecated(mut self, on: bool) -> Self {
        self.warn_deprecated = on;
        self
    }

    pub fn build(self) -> Registry {
        let mut order: Vec<SymbolSource> = Vec::with_capacity(self.builtins.len() + self.extensions.len());
        order.extend(self.extensions.into_iter().rev());
        order.extend(self.builtins);

        let mut seen: Vec<&SourceKind> = Vec::new();
        for source in &order {
            if seen.contains(&source.kind()) {
                warn!(source = %source.kind(), "symbol source registered twice; the later registration shadows the earlier one");
            }
            seen.push(source.kind());
        }

        debug!(
            sources = order.len(),
            deprecated_aliases = self.deprecated.len(),
            "symbol registry built"
        );

        Registry {
            order,
            deprecated: self.deprecated,
            warn_deprecated: self.warn_deprecated,
        }
    }
}

/// Immutable, precedence-ordered symbol table.
#[derive(Debug, Clone)]
pub struct Registry {
    order: Vec<SymbolSource>,
    deprecated: HashMap<String, String>,
    warn_deprecated: bool,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolve `symbol` to the entry that will be invoked.
    pub fn resolve(&self, symbol: &str) -> Option<Resolved> {
        if let Some((source, entry)) = self.find_active(symbol) {
            return Some(Resolved {
                symbol: symbol.to_string(),
                entry: entry.clone(),
                source: Some(source.kind().clone()),
                deprecated: false,
            });
        }

        let canonical = self.deprecated.get(symbol)?;
        if self.warn_deprecated {
            warn!(symbol = %symbol, predicate = %canonical, "rule symbol is deprecated");
        }

        let found = self.order.iter().find_map(|source| {
            source
                .symbols()
                .into_iter()
                .filter_map(|s| source.get(s))
                .find(|entry| &entry.predicate_name == canonical)
                .map(|entry| (source.kind().clone(), entry.clone()))
        });

        let (source, entry) = match found {
            Some((kind, entry)) => (Some(kind), entry),
            None => (None, SymbolTableEntry::new(canonical.clone())),
        };

        Some(Resolved {
            symbol: symbol.to_string(),
            entry,
            source,
            deprecated: true,
        })
    }

    /// Sources in the order they are consulted.
    pub fn sources(&self) -> &[SymbolSource] {
        &self.order
    }

    /// The deprecated-alias table, sorted by legacy symbol.
    pub fn deprecated_aliases(&self) -> Vec<(&str, &str)> {
        let mut aliases: Vec<(&str, &str)> = self
            .deprecated
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        aliases.sort_unstable();
        aliases
    }

    fn find_active(&self, symbol: &str) -> Option<(&SymbolSource, &SymbolTableEntry)> {
        self.order
            .iter()
            .find_map(|source| source.get(symbol).map(|entry| (source, entry)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
