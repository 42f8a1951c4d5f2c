use flag_provider_bridge::{
    ErrorCode, EvaluationContext, FlagData, Provider, Reason, TestData,
};
use serde_json::{json, Value};

fn provider_with(value: Value) -> Provider<TestData> {
    let mut td = TestData::new();
    td.update("fallthrough-boolean", FlagData::boolean().variation_for_all(0));
    td.update(
        "check-method-flag",
        FlagData::boolean().variations([value]).variation_for_all(0),
    );
    Provider::new(td)
}

fn context() -> EvaluationContext {
    EvaluationContext::new().with("key", "user-key")
}

#[test]
fn test_targeting_key_fallthrough() {
    let provider = provider_with(json!(null));
    let ctx = EvaluationContext::with_targeting_key("u1");
    let details = provider.fetch_boolean_value("fallthrough-boolean", false, Some(&ctx));
    assert_eq!(details.value, true);
    assert_eq!(details.reason.as_str(), "FALLTHROUGH");
    assert_eq!(details.variant.as_deref(), Some("0"));
    assert_eq!(details.error_code, None);
}

#[test]
fn test_no_context_returns_error() {
    let details = provider_with(json!(null)).fetch_boolean_value("flag-key", true, None);
    assert_eq!(details.value, true);
    assert_eq!(details.reason, Reason::Error);
    assert_eq!(details.error_code, Some(ErrorCode::TargetingKeyMissing));
}

#[test]
fn test_unknown_flag() {
    let details = provider_with(json!(null)).fetch_string_value("missing", "dflt", Some(&context()));
    assert_eq!(details.value, "dflt");
    assert_eq!(details.reason, Reason::Error);
    assert_eq!(details.error_code, Some(ErrorCode::FlagNotFound));
    assert_eq!(details.variant, None);
}

#[test]
fn test_boolean_results() {
    let cases = [
        (true, json!(false), false),
        (false, json!(true), true),
        (false, json!(1), false),
        (false, json!("True"), false),
        (true, json!([]), true),
    ];
    for (default, returned, expected) in cases {
        let details =
            provider_with(returned.clone()).fetch_boolean_value("check-method-flag", default, Some(&context()));
        assert_eq!(details.value, expected, "flag value {returned}");
    }
}

#[test]
fn test_string_results() {
    let cases = [
        (json!("return-string"), "return-string"),
        (json!(1), "default-string"),
        (json!(true), "default-string"),
    ];
    for (returned, expected) in cases {
        let details = provider_with(returned.clone()).fetch_string_value(
            "check-method-flag",
            "default-string",
            Some(&context()),
        );
        assert_eq!(details.value, expected, "flag value {returned}");
    }
}

#[test]
fn test_integer_results() {
    let cases = [
        (json!(2), 2),
        (json!(2.0), 1),
        (json!(2.5), 1),
        (json!(true), 1),
        (json!(false), 1),
        (json!(""), 1),
    ];
    for (returned, expected) in cases {
        let details =
            provider_with(returned.clone()).fetch_integer_value("check-method-flag", 1, Some(&context()));
        assert_eq!(details.value, expected, "flag value {returned}");
    }
}

#[test]
fn test_float_results() {
    let cases = [
        (json!(2.0), 2.0),
        (json!(2.5), 2.5),
        (json!(2), 1.0),
        (json!(true), 1.0),
        (json!("return-string"), 1.0),
    ];
    for (returned, expected) in cases {
        let details =
            provider_with(returned.clone()).fetch_float_value("check-method-flag", 1.0, Some(&context()));
        assert_eq!(details.value, expected, "flag value {returned}");
    }
}

#[test]
fn test_integer_and_float_values_do_not_cross() {
    let details = provider_with(json!(2.0)).fetch_integer_value("check-method-flag", 1, Some(&context()));
    assert_eq!(details.value, 1);
    assert_eq!(details.reason, Reason::Error);
    assert_eq!(details.error_code, Some(ErrorCode::TypeMismatch));

    let details = provider_with(json!(2)).fetch_float_value("check-method-flag", 1.0, Some(&context()));
    assert_eq!(details.value, 1.0);
    assert_eq!(details.reason, Reason::Error);
    assert_eq!(details.error_code, Some(ErrorCode::TypeMismatch));
}

#[test]
fn test_number_results() {
    let details = provider_with(json!(7)).fetch_number_value("check-method-flag", 1, Some(&context()));
    assert_eq!(details.value.as_i64(), Some(7));
    assert_eq!(details.error_code, None);

    let details = provider_with(json!("7")).fetch_number_value("check-method-flag", 1, Some(&context()));
    assert_eq!(details.value.as_i64(), Some(1));
    assert_eq!(details.error_code, Some(ErrorCode::TypeMismatch));
}

#[test]
fn test_object_results() {
    let default = json!(["default-value"]);
    let cases = [
        (json!(["return-string"]), json!(["return-string"])),
        (json!({"a": 1}), json!({"a": 1})),
        (json!(true), default.clone()),
        (json!(1), default.clone()),
        (json!("return-string"), default.clone()),
    ];
    for (returned, expected) in cases {
        let details = provider_with(returned.clone()).fetch_object_value(
            "check-method-flag",
            default.clone(),
            Some(&context()),
        );
        assert_eq!(details.value, expected, "flag value {returned}");
    }
}

#[test]
fn test_type_mismatch_drops_engine_reason() {
    let details = provider_with(json!(true)).fetch_string_value(
        "fallthrough-boolean",
        "default-value",
        Some(&context()),
    );
    assert_eq!(details.value, "default-value");
    assert_eq!(details.reason, Reason::Error);
    assert_eq!(details.variant, None);
    assert_eq!(details.error_code, Some(ErrorCode::TypeMismatch));
}

#[test]
fn test_multi_context_evaluates() {
    let ctx: EvaluationContext = serde_json::from_value(json!({
        "kind": "multi",
        "user": {"key": "u"},
        "org": {"key": "o", "name": "Acme"},
    }))
    .unwrap();
    let details = provider_with(json!(null)).fetch_boolean_value("fallthrough-boolean", false, Some(&ctx));
    assert_eq!(details.value, true);
    assert_eq!(details.error_code, None);
}

#[test]
fn test_empty_multi_context_is_reported_by_engine() {
    let ctx: EvaluationContext = serde_json::from_value(json!({"kind": "multi", "org": false})).unwrap();
    let details = provider_with(json!(null)).fetch_boolean_value("fallthrough-boolean", false, Some(&ctx));
    assert_eq!(details.value, false);
    assert_eq!(details.error_code, Some(ErrorCode::TargetingKeyMissing));
}
