//! Legacy symbols still accepted in old rule sets.
//!
//! Each alias maps straight to a canonical predicate name, never to another
//! symbol, so resolution takes exactly one step.

/// `(legacy symbol, canonical predicate name)`.
pub const DEPRECATED_ALIASES: &[(&str, &str)] = &[
    ("required_keys", "require_array_keys"),
    ("distinct", "unique"),
    ("len=", "length_equal"),
    ("len>=", "length_greater_equal"),
    ("len<=", "length_less_equal"),
    ("alpha_dash", "alpha_ext"),
    ("date==", "date_equal"),
];
