//! Reference scenarios.
//!
//! Each scenario evaluates one rule token against one value and states the
//! outcome it must produce.

use serde_json::{json, Value};

use fieldcheck_contracts::{result::PredicateResult, token::RuleToken};
use fieldcheck_core::CallContext;
use fieldcheck_engine::Engine;

struct Scenario {
    id: &'static str,
    title: &'static str,
    rule: RuleToken,
    value: Value,
    expected: &'static str,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "A",
            title: "date below the lower bound of a closed range",
            rule: RuleToken::new("date>=<=").with_args(["2024-04-23", "2024-05-01"]),
            value: json!("2024-04-22"),
            expected: "fail",
        },
        Scenario {
            id: "B",
            title: "time inside a range that spans midnight",
            rule: RuleToken::new("time>=<=").with_args(["22:00:00", "02:00:00"]),
            value: json!("23:59:59"),
            expected: "pass",
        },
        Scenario {
            id: "C",
            title: "unparsable comparison bound",
            rule: RuleToken::new("date=").with_args(["2024-04-50"]),
            value: json!("2024-04-23"),
            expected: "parameter error",
        },
        Scenario {
            id: "D",
            title: "date value missing the time its explicit format asks for",
            rule: RuleToken::new("date").with_args(["Y-m-d H:i:s"]),
            value: json!("2024-04-23"),
            expected: "TAG:date:format:@p1",
        },
    ]
}

/// Short rendering of an outcome: `pass`, `fail`, a tag, a message, or
/// `parameter error`.
fn describe(outcome: &Result<PredicateResult, fieldcheck_contracts::error::FieldcheckError>) -> String {
    match outcome {
        Ok(PredicateResult::Pass) => "pass".to_string(),
        Ok(PredicateResult::Fail { message_tag: Some(tag), .. }) => tag.to_string(),
        Ok(PredicateResult::Fail { detail: Some(detail), .. }) => detail.clone(),
        Ok(PredicateResult::Fail { .. }) => "fail".to_string(),
        Err(e) if e.is_parameter_error() => "parameter error".to_string(),
        Err(e) => e.to_string(),
    }
}

/// Run every scenario, print a line per scenario, and report whether all of
/// them produced their expected outcome.
pub fn run_all(engine: &Engine) -> bool {
    let mut all_matched = true;

    for scenario in scenarios() {
        let outcome = engine.check_token(&scenario.rule, &scenario.value, &CallContext::default());
        let got = describe(&outcome);
        let matched = got == scenario.expected;
        all_matched &= matched;

        println!(
            "[{}] {} {}  {}[{}] on {}",
            if matched { "ok" } else { "MISMATCH" },
            scenario.id,
            scenario.title,
            scenario.rule.symbol,
            scenario.rule.raw_args.join(", "),
            scenario.value,
        );
        println!("     expected: {}", scenario.expected);
        println!("     got:      {got}");
        if let Err(e) = &outcome {
            println!("     detail:   {e}");
        }
    }

    all_matched
}
