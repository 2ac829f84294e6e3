//! # fieldcheck-core
//!
//! Symbol resolution and predicate dispatch for the fieldcheck rule engine.
//!
//! This crate provides:
//! - The `Predicate` trait every rule implementation satisfies
//! - The `Registry` that resolves a rule symbol across precedence-ordered
//!   symbol sources, with a deprecated-alias fallback
//! - The `Dispatcher` that lays out arguments, injects implicit ones from the
//!   call context, and normalizes predicate verdicts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fieldcheck_core::{CallContext, Dispatcher, Registry, SymbolSource};
//!
//! let dispatcher = Dispatcher::new(registry, predicates);
//! let result = dispatcher.check(&token, &value, &CallContext::new(Some(&parent)))?;
//! ```

pub mod dispatcher;
pub mod registry;
pub mod traits;

pub use dispatcher::{CallContext, Dispatcher, DEFAULT_ERROR_POSITION};
pub use registry::{Registry, RegistryBuilder, Resolved, SymbolSource};
pub use traits::{arg, Argument, Predicate, PredicateSet, Verdict};
