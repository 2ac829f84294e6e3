//! Rule tokens as produced by the rule-chain tokenizer.

use serde::{Deserialize, Serialize};

/// One predicate invocation inside a rule chain, e.g. `date>=[today, Y-m-d]`.
///
/// The tokenizer that splits a raw rule string lives outside this workspace;
/// arguments arrive as raw, un-coerced text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleToken {
    /// Matched verbatim against the symbol registry.
    pub symbol: String,
    /// Positional arguments in the order the rule author wrote them.
    #[serde(default, rename = "args")]
    pub raw_args: Vec<String>,
}

impl RuleToken {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            raw_args: Vec::new(),
        }
    }

    /// Builder-style helper for tests and rule-set literals.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.raw_args = args.into_iter().map(Into::into).collect();
        self
    }
}
