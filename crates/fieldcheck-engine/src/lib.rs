//! # fieldcheck-engine
//!
//! The configured fieldcheck validation engine.
//!
//! This crate provides:
//! - `EngineConfig`, loaded from TOML, covering the UTC offset, the temporal
//!   family, bound fallback and deprecated aliases
//! - `Engine`, which wires every built-in symbol source and any extension
//!   sources into one dispatcher in a fixed precedence order
//! - `RuleSet` and `CheckReport` for checking whole JSON documents
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fieldcheck_engine::{Engine, EngineConfig, RuleSet};
//!
//! let engine = Engine::new(EngineConfig::from_file(Path::new("fieldcheck.toml"))?)?;
//! let rules = RuleSet::from_file(Path::new("rules/booking.toml"))?;
//! let report = engine.check(&rules, &document);
//! ```

pub mod config;
pub mod engine;
pub mod ruleset;

pub use config::{EngineConfig, RegistryConfig, TemporalConfig, TemporalFamily};
pub use engine::{Engine, EngineBuilder};
pub use ruleset::{CheckReport, FieldError, FieldFailure, FieldRules, RuleSet};
