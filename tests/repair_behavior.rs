//! Coverage of individual repair actions and formatting options beyond the
//! end-to-end scenarios in `repair_scenarios.rs`.

use jsonrepair::{repair, repair_to_value, repair_with_options, ErrorKind, Options, Value};

#[test]
fn drops_trailing_comma() {
    assert_eq!(repair("[1,2,3,]").unwrap(), "[1,2,3]");
}

#[test]
fn inserts_missing_comma_between_members() {
    assert_eq!(repair("{a:1 b:2}").unwrap(), r#"{"a":1,"b":2}"#);
}

#[test]
fn inserts_missing_colon() {
    assert_eq!(repair("{a 1}").unwrap(), r#"{"a":1}"#);
}

#[test]
fn closes_unbalanced_brackets_of_the_wrong_kind() {
    assert_eq!(repair("{a:[1,2}").unwrap(), r#"{"a":[1,2]}"#);
}

#[test]
fn synthesises_closes_at_end_of_input_with_aggressive_fix() {
    let mut opts = Options::new();
    opts.set_aggressive_truncation_fix(true);
    assert_eq!(repair_with_options("{a:[1,2", Some(&opts)).unwrap(), r#"{"a":[1,2]}"#);
}

#[test]
fn unterminated_container_errors_without_aggressive_fix() {
    assert_eq!(repair("{a:[1,2"), None);
}

#[test]
fn hex_octal_and_binary_number_literals() {
    assert_eq!(repair("{a:0x1F,b:0o17,c:0b101}").unwrap(), r#"{"a":31,"b":15,"c":5}"#);
}

#[test]
fn underscores_in_numbers_are_stripped() {
    assert_eq!(repair("{a:1_000_000}").unwrap(), r#"{"a":1000000}"#);
}

#[test]
fn number_tolerance_leading_and_trailing_dot() {
    let mut opts = Options::new();
    opts.set_number_tolerance_leading_dot(true);
    opts.set_number_tolerance_trailing_dot(true);
    assert_eq!(
        repair_with_options("{a:.5,b:1.}", Some(&opts)).unwrap(),
        r#"{"a":0.5,"b":1.0}"#
    );
}

#[test]
fn smart_quotes_are_matched_pairwise() {
    assert_eq!(repair("{a:\u{201c}hello\u{201d}}").unwrap(), r#"{"a":"hello"}"#);
}

#[test]
fn python_style_separators_add_trailing_space() {
    let mut opts = Options::new();
    opts.set_python_style_separators(true);
    assert_eq!(repair_with_options("{a:1,b:2}", Some(&opts)).unwrap(), r#"{"a": 1, "b": 2}"#);
}

#[test]
fn line_and_block_comments_are_always_stripped() {
    assert_eq!(
        repair("{a:1, // trailing note\nb:/* inline */2}").unwrap(),
        r#"{"a":1,"b":2}"#
    );
}

#[test]
fn repair_to_value_exposes_the_value_tree_directly() {
    let value = repair_to_value("{a:1,b:[2,3]}", None).unwrap();
    match value {
        Value::Object(members) => {
            assert_eq!(members[0].0, "a");
            assert_eq!(members[0].1, Value::Number("1".to_string()));
            assert_eq!(members[1].0, "b");
            assert!(matches!(&members[1].1, Value::Array(items) if items.len() == 2));
        }
        other => panic!("expected an object, got {other:?}"),
    }
}

#[test]
fn unexpected_token_reports_the_right_error_kind() {
    let err = jsonrepair::repair_ex("@@@", None).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedToken);
}
