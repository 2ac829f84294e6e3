//! # fieldcheck-predicates
//!
//! Built-in, non-temporal rule implementations for the fieldcheck engine.
//!
//! This crate provides:
//! - `general_source` / `general_predicates`: numeric and length
//!   comparisons, membership, scalar types, string formats, character
//!   classes, `regex` and `file_base64`
//! - `container_source` / `container_predicates`: `require_array_keys`,
//!   `unique`, `list`, `object`
//! - `DEPRECATED_ALIASES`: legacy symbols and the predicates they now mean

pub mod container;
pub mod deprecated;
pub mod general;

pub use container::{container_predicates, container_source};
pub use deprecated::DEPRECATED_ALIASES;
pub use general::{general_predicates, general_source, ULID_MAX_LEADING_CHAR};
