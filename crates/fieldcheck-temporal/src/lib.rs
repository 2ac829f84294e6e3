//! # fieldcheck-temporal
//!
//! Date, time and datetime rules for the fieldcheck engine.
//!
//! This crate provides:
//! - The pattern language and format alias table (`format`)
//! - The `TemporalParser`, which turns values into `TemporalValue`s or
//!   failure tags and rule bounds into values or `Parameter` errors
//! - Relative notation (`today`, `-3 days`, `next week`) resolved against a
//!   pluggable `Clock`
//! - Ordering and range comparison, including midnight wrap-around for
//!   bare times of day
//! - Two symbol sources (`typed_source`, `datetime_compat_source`) and the
//!   predicates behind them
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fieldcheck_temporal::{temporal_predicates, typed_source, TemporalParser};
//!
//! let parser = Arc::new(TemporalParser::default());
//! let registry = Registry::builder().builtin(typed_source()).build();
//! let dispatcher = Dispatcher::new(registry, temporal_predicates(parser));
//! ```

pub mod clock;
pub mod compare;
pub mod format;
pub mod parser;
pub mod predicates;
pub mod relative;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compare::{in_range, Comparison, RangeBounds};
pub use format::{alias_pattern, Pattern, FORMAT_ALIASES};
pub use parser::{TemporalParser, TemporalSettings};
pub use predicates::{datetime_compat_source, temporal_predicates, typed_source, Shape, TemporalPredicate};
