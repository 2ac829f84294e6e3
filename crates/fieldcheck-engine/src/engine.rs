//! The assembled engine.
//!
//! `EngineBuilder` wires every built-in symbol source, the configured
//! temporal family, the deprecated-alias table and any extension sources
//! into one `Dispatcher`. Precedence, highest first:
//!
//! 1. Extension sources, latest registration first.
//! 2. General-purpose source.
//! 3. Container-shape source.
//! 4. The temporal source named by `temporal.family`.
//! 5. The other temporal source.
//! 6. Deprecated aliases, consulted only when nothing above matches.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use fieldcheck_contracts::{
    error::FieldcheckResult,
    result::PredicateResult,
    token::RuleToken,
};
use fieldcheck_core::{CallContext, Dispatcher, PredicateSet, Registry, Resolved, SymbolSource};
use fieldcheck_predicates::{
    container_predicates, container_source, general_predicates, general_source, DEPRECATED_ALIASES,
};
use fieldcheck_temporal::{
    datetime_compat_source, temporal_predicates, typed_source, Clock, SystemClock, TemporalParser,
};

use crate::config::{EngineConfig, TemporalFamily};
use crate::ruleset::{lookup, CheckReport, FieldError, FieldFailure, RuleSet};

/// Collects configuration, clock and extensions, then builds an `Engine`.
pub struct EngineBuilder {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    extensions: Vec<(SymbolSource, PredicateSet)>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            clock: Arc::new(SystemClock),
            extensions: Vec::new(),
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Clock relative notation resolves against.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Register an extension source with the predicates it names. A later
    /// extension shadows an earlier one and every built-in.
    pub fn extension(mut self, source: SymbolSource, predicates: PredicateSet) -> Self {
        self.extensions.push((source, predicates));
        self
    }

    /// Returns `FieldcheckError::Config` if the configured offset is unreadable.
    pub fn build(self) -> FieldcheckResult<Engine> {
        let settings = self.config.temporal_settings()?;
        let parser = Arc::new(TemporalParser::new(settings, self.clock));

        let (preferred, fallback) = match self.config.temporal.family {
            TemporalFamily::Typed => (typed_source(), datetime_compat_source()),
            TemporalFamily::Datetime => (datetime_compat_source(), typed_source()),
        };

        let mut registry = Registry::builder()
            .builtin(general_source())
            .builtin(container_source())
            .builtin(preferred)
            .builtin(fallback)
            .warn_deprecated(self.config.registry.warn_deprecated);
        for (symbol, predicate) in DEPRECATED_ALIASES {
            registry = registry.deprecated_alias(*symbol, *predicate);
        }
        for (symbol, predicate) in &self.config.deprecated {
            registry = registry.deprecated_alias(symbol.as_str(), predicate.as_str());
        }

        let mut predicates = general_predicates();
        predicates.extend(container_predicates());
        predicates.extend(temporal_predicates(parser));

        for (source, extra) in self.extensions {
            debug!(source = %source.kind(), symbols = source.len(), "registering extension source");
            registry = registry.extension(source);
            predicates.extend(extra);
        }

        let registry = registry.build();
        info!(
            sources = registry.sources().len(),
            predicates = predicates.len(),
            family = ?self.config.temporal.family,
            "fieldcheck engine ready"
        );

        Ok(Engine {
            dispatcher: Dispatcher::new(registry, predicates),
            config: self.config,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A ready-to-use validation engine. Read-only; share it between threads.
#[derive(Debug, Clone)]
pub struct Engine {
    dispatcher: Dispatcher,
    config: EngineConfig,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// An engine with `config`, the system clock and no extensions.
    pub fn new(config: EngineConfig) -> FieldcheckResult<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn resolve(&self, symbol: &str) -> Option<Resolved> {
        self.dispatcher.registry().resolve(symbol)
    }

    /// Evaluate a single token against `value`.
    pub fn check_token(
        &self,
        token: &RuleToken,
        value: &Value,
        ctx: &CallContext<'_>,
    ) -> FieldcheckResult<PredicateResult> {
        self.dispatcher.check(token, value, ctx)
    }

    /// Check `document` against every field of `rules`.
    ///
    /// Each field's chain stops at its first failure or error; the run as a
    /// whole never stops early.
    pub fn check(&self, rules: &RuleSet, document: &Value) -> CheckReport {
        let mut failures = Vec::new();
        let mut errors = Vec::new();

        for field in &rules.fields {
            let Some((parent, value)) = lookup(document, &field.path) else {
                if field.required {
                    debug!(path = %field.path, "required field missing");
                    failures.push(FieldFailure {
                        path: field.path.clone(),
                        symbol: "required".to_string(),
                        tag: Some("TAG:required".to_string()),
                        detail: None,
                    });
                }
                continue;
            };

            let ctx = CallContext::new(parent);
            for token in &field.rules {
                match self.dispatcher.check(token, value, &ctx) {
                    Ok(PredicateResult::Pass) => continue,
                    Ok(PredicateResult::Fail { message_tag, detail }) => {
                        let tag = message_tag.map(|t| t.to_string());
                        debug!(path = %field.path, symbol = %token.symbol, tag = ?tag, "rule failed");
                        failures.push(FieldFailure {
                            path: field.path.clone(),
                            symbol: token.symbol.clone(),
                            tag,
                            detail,
                        });
                    }
                    Err(e) => {
                        warn!(path = %field.path, symbol = %token.symbol, error = %e, "rule could not be evaluated");
                        errors.push(FieldError {
                            path: field.path.clone(),
                            symbol: token.symbol.clone(),
                            message: e.to_string(),
                        });
                    }
                }
                break;
            }
        }

        let passed = failures.is_empty() && errors.is_empty();
        debug!(
            fields = rules.fields.len(),
            passed,
            failure_count = failures.len(),
            error_count = errors.len(),
            "check complete"
        );
        CheckReport { passed, failures, errors }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
