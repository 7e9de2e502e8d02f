//! Condition engine tests: evaluation, typing rules, caching and traces.
mod common;
use common::*;
use nagare::error::ExpressionError;
use nagare::expression::{Expression, parse_expression};
use nagare::prelude::*;
use serde_json::json;

fn context(pairs: &[(&str, serde_json::Value)]) -> ExecutionContext {
    ExecutionContext::with_variables(vars(pairs))
}

#[cfg(test)]
mod evaluation_tests {
    use super::*;

    #[test]
    fn test_numeric_comparisons() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("amount", json!(1500))]);
        assert!(engine.evaluate("#amount > 1000", &ctx).unwrap());
        assert!(engine.evaluate("#amount >= 1500", &ctx).unwrap());
        assert!(!engine.evaluate("#amount <= 1000", &ctx).unwrap());
        assert!(engine.evaluate("#amount != 1000", &ctx).unwrap());
    }

    #[test]
    fn test_whitespace_free_conditions_from_flowcharts() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("amount", json!(500))]);
        assert!(engine.evaluate("#amount<=1000", &ctx).unwrap());
        assert!(!engine.evaluate("#amount>1000", &ctx).unwrap());
    }

    #[test]
    fn test_logic_words_and_symbols() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("vip", json!(true)), ("amount", json!(20))]);
        assert!(engine.evaluate("#vip and #amount > 10", &ctx).unwrap());
        assert!(engine.evaluate("#vip && #amount > 10", &ctx).unwrap());
        assert!(engine.evaluate("not #vip or #amount == 20", &ctx).unwrap());
        assert!(engine.evaluate("#vip xor #amount < 10", &ctx).unwrap());
        assert!(!engine.evaluate("!#vip", &ctx).unwrap());
    }

    #[test]
    fn test_bare_variable_names() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("count", json!(3))]);
        assert!(engine.evaluate("count * 2 == 6", &ctx).unwrap());
    }

    #[test]
    fn test_arithmetic_values() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("a", json!(7)), ("b", json!(2))]);
        assert_eq!(
            engine.calculate_value("#a + #b * 3", &ctx).unwrap(),
            Value::Number(13.0)
        );
        assert_eq!(
            engine.calculate_value("(#a + #b) / 2", &ctx).unwrap(),
            Value::Number(4.5)
        );
        assert_eq!(
            engine.calculate_value("abs(#b - #a)", &ctx).unwrap(),
            Value::Number(5.0)
        );
        assert_eq!(
            engine.calculate_value("-#a", &ctx).unwrap(),
            Value::Number(-7.0)
        );
    }

    #[test]
    fn test_text_values() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("tier", json!("gold"))]);
        assert!(engine.evaluate("#tier == 'gold'", &ctx).unwrap());
        assert!(engine.evaluate("#tier != \"silver\"", &ctx).unwrap());
        assert_eq!(
            engine.calculate_value("#tier + '-member'", &ctx).unwrap(),
            Value::Text("gold-member".to_string())
        );
    }

    #[test]
    fn test_missing_variable_reads_as_null() {
        let engine = ConditionEngine::new();
        let ctx = ExecutionContext::new();
        assert_eq!(engine.calculate_value("#ghost", &ctx).unwrap(), Value::Null);
        assert!(engine.evaluate("#ghost == null", &ctx).unwrap());
        // A null condition is simply not satisfied.
        assert!(!engine.evaluate("#ghost", &ctx).unwrap());
    }

    #[test]
    fn test_short_circuit_skips_right_side() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("flag", json!(false))]);
        // The right side would be a type error if it were evaluated.
        assert!(!engine.evaluate("#flag and #missing > 1", &ctx).unwrap());
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_non_boolean_condition() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("amount", json!(5))]);
        let err = engine.evaluate("#amount + 1", &ctx).unwrap_err();
        assert!(matches!(err, ExpressionError::NotBoolean { found: Value::Number(n), .. } if n == 6.0));
    }

    #[test]
    fn test_type_mismatch() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("name", json!("bob"))]);
        let err = engine.evaluate("#name > 3", &ctx).unwrap_err();
        assert!(matches!(err, ExpressionError::TypeMismatch { .. }));
    }

    #[test]
    fn test_division_by_zero() {
        let engine = ConditionEngine::new();
        let err = engine
            .calculate_value("1 / 0", &ExecutionContext::new())
            .unwrap_err();
        assert_eq!(err, ExpressionError::DivisionByZero);
    }

    #[test]
    fn test_structured_variables_are_unsupported() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("items", json!([1, 2, 3]))]);
        let err = engine.evaluate("#items == 1", &ctx).unwrap_err();
        assert_eq!(
            err,
            ExpressionError::UnsupportedValue {
                name: "items".to_string()
            }
        );
    }

    #[test]
    fn test_syntax_validation() {
        let engine = ConditionEngine::new();
        assert!(engine.validate_syntax("#a > 1 and (#b < 2 or #c)"));
        assert!(!engine.validate_syntax("#a >"));
        assert!(!engine.validate_syntax("#a = 1"));
        assert!(!engine.validate_syntax("'unterminated"));
        assert!(!engine.validate_syntax("(#a > 1"));
    }
}

#[cfg(test)]
mod cache_and_trace_tests {
    use super::*;

    #[test]
    fn test_parsed_expressions_are_cached() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("a", json!(1))]);
        engine.evaluate("#a == 1", &ctx).unwrap();
        engine.evaluate("#a == 1", &ctx).unwrap();
        engine.evaluate("#a == 2", &ctx).unwrap();
        assert_eq!(engine.cached_len(), 2);

        let uncached = ConditionEngine::uncached();
        uncached.evaluate("#a == 1", &ctx).unwrap();
        assert_eq!(uncached.cached_len(), 0);
    }

    #[test]
    fn test_explain_shows_variable_values() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("amount", json!(1500))]);
        assert_eq!(
            engine.explain("#amount > 1000", &ctx).unwrap(),
            "#amount (was 1500) > 1000"
        );
    }

    #[test]
    fn test_explain_marks_skipped_right_side() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("flag", json!(false))]);
        assert_eq!(
            engine.explain("#flag and #missing > 1", &ctx).unwrap(),
            "#flag (was false) and ..."
        );
    }

    #[test]
    fn test_explain_distinguishes_unset_from_null() {
        let engine = ConditionEngine::new();
        assert_eq!(
            engine
                .explain("#ghost == null", &ExecutionContext::new())
                .unwrap(),
            "#ghost (unset) == null"
        );
        let ctx = context(&[("ghost", serde_json::Value::Null)]);
        assert_eq!(
            engine.explain("#ghost == null", &ctx).unwrap(),
            "#ghost (was null) == null"
        );
    }

    #[test]
    fn test_explain_quotes_text() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("tier", json!("gold"))]);
        assert_eq!(
            engine.explain("#tier == 'gold'", &ctx).unwrap(),
            "#tier (was 'gold') == 'gold'"
        );
    }

    #[test]
    fn test_explain_keeps_needed_parentheses() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("a", json!(1))]);
        assert_eq!(
            engine.explain("(#a + 1) * 2", &ctx).unwrap(),
            "(#a (was 1) + 1) * 2"
        );
        assert_eq!(
            engine.explain("#a + 1 * 2", &ctx).unwrap(),
            "#a (was 1) + 1 * 2"
        );
        assert_eq!(
            engine.explain("#a - (1 - 2)", &ctx).unwrap(),
            "#a (was 1) - (1 - 2)"
        );
        assert_eq!(
            engine.explain("not (#a > 0)", &ctx).unwrap(),
            "not (#a (was 1) > 0)"
        );
    }

    #[test]
    fn test_trace_reports_values_read() {
        let engine = ConditionEngine::new();
        let ctx = context(&[("amount", json!(1500)), ("vip", json!(false))]);
        let trace = engine
            .trace("#amount > 1000 or #vip or #ghost", &ctx)
            .unwrap();
        assert_eq!(trace.outcome(), Value::Bool(true));
        assert_eq!(
            trace.variables(),
            vec![("amount", Some(&Value::Number(1500.0)))]
        );

        let ctx = context(&[("amount", json!(10)), ("vip", json!(false))]);
        let trace = engine.trace("#amount > 1000 or #vip", &ctx).unwrap();
        assert_eq!(
            trace.variables(),
            vec![
                ("amount", Some(&Value::Number(10.0))),
                ("vip", Some(&Value::Bool(false)))
            ]
        );
    }

    #[test]
    fn test_explain_of_invalid_expression_is_none() {
        let engine = ConditionEngine::new();
        assert!(engine.explain("#amount >", &ExecutionContext::new()).is_none());
    }

    #[test]
    fn test_expression_lists_its_variables() {
        let expr = parse_expression("#a > 1 and (b < #c or abs(#a) == 2)").unwrap();
        let names: Vec<_> = expr.variables().into_iter().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(matches!(expr, Expression::And(_, _)));
    }
}
