//! # fieldcheck-contracts
//!
//! Shared types, failure tags, and error contracts for the fieldcheck rule
//! engine.
//!
//! All crates in the workspace import from here. No predicate logic lives in
//! this crate, only data definitions, the `TAG:` syntax, and error types.

pub mod error;
pub mod result;
pub mod symbol;
pub mod temporal;
pub mod token;

#[cfg(test)]
mod tests {
    use super::*;
    use error::FieldcheckError;
    use result::{FailReason, FailTag, PredicateResult};
    use symbol::{Placeholder, SymbolTableEntry};
    use temporal::TemporalKind;
    use token::RuleToken;

    // ── FailTag rendering ────────────────────────────────────────────────────

    #[test]
    fn bare_tag_renders_kind_only() {
        assert_eq!(FailTag::bare("time").to_string(), "TAG:time");
    }

    #[test]
    fn qualified_tag_renders_reason_then_position() {
        let tag = FailTag::bare("date")
            .with_reason(FailReason::InvalidFormat)
            .at("@p2");
        assert_eq!(tag.to_string(), "TAG:date:invalid_format:@p2");
    }

    #[test]
    fn position_without_reason_renders() {
        let tag = FailTag::bare("alpha_ext").at("@p1");
        assert_eq!(tag.to_string(), "TAG:alpha_ext:@p1");
    }

    // ── FailTag parsing ──────────────────────────────────────────────────────

    #[test]
    fn parse_full_tag() {
        let tag: FailTag = "TAG:file_base64:size:@p2".parse().unwrap();
        assert_eq!(tag.kind, "file_base64");
        assert_eq!(tag.reason, Some(FailReason::Size));
        assert_eq!(tag.position.as_deref(), Some("@p2"));
    }

    #[test]
    fn parse_position_only_tag() {
        let tag: FailTag = "TAG:unique:@parent".parse().unwrap();
        assert_eq!(tag.reason, None);
        assert_eq!(tag.position.as_deref(), Some("@parent"));
    }

    #[test]
    fn parse_keeps_unknown_reason_words() {
        let tag: FailTag = "TAG:sku:checksum".parse().unwrap();
        assert_eq!(tag.reason, Some(FailReason::Other("checksum".to_string())));
    }

    #[test]
    fn parse_rejects_missing_prefix_and_trailing_segments() {
        assert!("date:format".parse::<FailTag>().is_err());
        assert!("TAG:".parse::<FailTag>().is_err());
        assert!("TAG:date:@p1:format".parse::<FailTag>().is_err());
        assert!("TAG:date:format:invalid_format".parse::<FailTag>().is_err());
    }

    // ── PredicateResult ──────────────────────────────────────────────────────

    #[test]
    fn predicate_result_accessors() {
        assert!(PredicateResult::Pass.is_pass());
        assert!(PredicateResult::fail().tag().is_none());
        let tagged = PredicateResult::tagged(FailTag::bare("time"));
        assert!(!tagged.is_pass());
        assert_eq!(tagged.tag().map(|t| t.kind.as_str()), Some("time"));
    }

    // ── Symbols and tokens ───────────────────────────────────────────────────

    #[test]
    fn entry_builder_records_implicit_slots() {
        let entry = SymbolTableEntry::new("unique")
            .implicit(0, Placeholder::Parent)
            .implicit(1, Placeholder::FieldValue);
        assert_eq!(entry.implicit_args.len(), 2);
        assert_eq!(entry.implicit_args.get(&0), Some(&Placeholder::Parent));
        assert!(!entry.variadic);
    }

    #[test]
    fn rule_token_deserializes_args_field() {
        let token: RuleToken =
            serde_json::from_str(r#"{"symbol":"date>=","args":["today"]}"#).unwrap();
        assert_eq!(token, RuleToken::new("date>=").with_args(["today"]));
    }

    #[test]
    fn temporal_kind_defaults() {
        assert_eq!(TemporalKind::Date.default_pattern(), Some("Y-m-d"));
        assert_eq!(TemporalKind::Time.default_pattern(), Some("H:i:s"));
        assert_eq!(TemporalKind::DateTime.default_pattern(), None);
        assert_eq!("datetime".parse::<TemporalKind>(), Ok(TemporalKind::DateTime));
    }

    // ── FieldcheckError display messages ─────────────────────────────────────

    #[test]
    fn error_parameter_display() {
        let err = FieldcheckError::parameter("date_equal", "2024-04-50", "expected format Y-m-d");
        let msg = err.to_string();
        assert!(msg.contains("date_equal"));
        assert!(msg.contains("2024-04-50"));
        assert!(msg.contains("Y-m-d"));
        assert!(err.is_parameter_error());
    }

    #[test]
    fn error_config_is_not_parameter_error() {
        let err = FieldcheckError::Config {
            reason: "bad offset".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
        assert!(!err.is_parameter_error());
    }
}
