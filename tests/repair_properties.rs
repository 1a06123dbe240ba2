//! The invariants any repaired output must satisfy, checked against a
//! strict JSON parser ([`serde_json`]) rather than re-implementing one.

use jsonrepair::{repair, repair_ex, repair_with_options, Options, Stream};

fn assert_strict(s: &str) -> serde_json::Value {
    serde_json::from_str(s).unwrap_or_else(|e| panic!("not strict JSON: {s:?} ({e})"))
}

#[test]
fn strictness_of_output() {
    let cases = [
        "{a:1, b:'hello'}",
        "[1,2,3,]",
        "{a:1 b:2}",
        "not json at all @@@",
        "",
    ];
    for case in cases {
        if let Some(out) = repair(case) {
            assert_strict(&out);
        }
    }
}

#[test]
fn idempotence_on_already_strict_json() {
    let inputs = [
        r#"{"a":1,"b":[1,2,3],"c":null,"d":true,"e":"hi"}"#,
        r#"[]"#,
        r#"{}"#,
        r#""just a string""#,
        r#"42"#,
    ];
    for input in inputs {
        let repaired = repair(input).unwrap();
        let original_value = assert_strict(input);
        let repaired_value = assert_strict(&repaired);
        assert_eq!(original_value, repaired_value);
    }
}

#[test]
fn streaming_equals_batch_for_several_segmentations() {
    let whole = r#"{"a":1,"b":[2,3],"c":"hello world"}"#;
    let one_shot = assert_strict(&repair(whole).unwrap());

    let segmentations: Vec<Vec<&str>> = vec![
        vec![whole],
        whole.as_bytes().chunks(1).map(|c| std::str::from_utf8(c).unwrap()).collect(),
        whole.as_bytes().chunks(5).map(|c| std::str::from_utf8(c).unwrap()).collect(),
    ];

    for chunks in segmentations {
        let mut stream = Stream::new(None);
        let mut out = String::new();
        for chunk in chunks {
            if let Some(fragment) = stream.push(chunk.as_bytes()).unwrap() {
                out.push_str(&fragment);
            }
        }
        out.push_str(&stream.flush().unwrap());
        assert_eq!(assert_strict(&out), one_shot);
    }
}

#[test]
fn ascii_safety_when_ensure_ascii_is_set() {
    let mut opts = Options::new();
    opts.set_ensure_ascii(true);
    let out = repair_with_options("{greeting: 'héllo 中文 😀'}", Some(&opts)).unwrap();
    assert!(out.bytes().all(|b| b <= 0x7F));
    assert_strict(&out);
}

#[test]
fn error_position_never_exceeds_input_length() {
    let inputs = ["@@@", "{a:1,b:", "{a:", "[1,2", "\"unterminated"];
    for input in inputs {
        if let Err(err) = repair_ex(input, None) {
            assert!(err.position <= input.len(), "{input:?}: position {} > len {}", err.position, input.len());
        }
    }
}

#[test]
fn ndjson_aggregate_mode_always_produces_one_array() {
    let mut opts = Options::new();
    opts.set_stream_ndjson_aggregate(true);

    let mut single = Stream::new(Some(&opts));
    let mut out = String::new();
    if let Some(fragment) = single.push(b"{a:1}").unwrap() {
        out.push_str(&fragment);
    }
    out.push_str(&single.flush().unwrap());
    let value = assert_strict(&out);
    assert!(value.is_array());
    assert_eq!(value.as_array().unwrap().len(), 1);

    let mut empty = Stream::new(Some(&opts));
    let out = empty.flush().unwrap();
    assert_eq!(out, "[]");
}
