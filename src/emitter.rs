use crate::options::Options;
use crate::value::Value;

/// Render a repaired [`Value`] tree as strict JSON text.
///
/// Numbers are written from their already-canonical lexeme (the tokenizer
/// strips underscores and fills in implicit leading/trailing zeros), so the
/// emitter never re-derives numeric formatting — it only decides string
/// escaping and separator style.
pub(crate) fn emit(value: &Value, options: &Options) -> String {
    let mut out = String::new();
    write_value(&mut out, value, options);
    out
}

fn write_value(out: &mut String, value: &Value, options: &Options) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(lexeme) => out.push_str(lexeme),
        Value::String(s) => write_string(out, s, options),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write_separator(out, options);
                }
                write_value(out, item, options);
            }
            out.push(']');
        }
        Value::Object(members) => {
            out.push('{');
            for (i, (key, value)) in members.iter().enumerate() {
                if i > 0 {
                    write_separator(out, options);
                }
                write_string(out, key, options);
                out.push(':');
                if options.python_style_separators {
                    out.push(' ');
                }
                write_value(out, value, options);
            }
            out.push('}');
        }
    }
}

fn write_separator(out: &mut String, options: &Options) {
    out.push(',');
    if options.python_style_separators {
        out.push(' ');
    }
}

fn write_string(out: &mut String, s: &str, options: &Options) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if options.ensure_ascii && (c as u32) >= 0x80 => write_ascii_escape(out, c),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_ascii_escape(out: &mut String, ch: char) {
    let code = ch as u32;
    if code >= 0x10000 {
        let v = code - 0x10000;
        let high = 0xD800 + (v >> 10);
        let low = 0xDC00 + (v & 0x3FF);
        out.push_str(&format!("\\u{high:04x}\\u{low:04x}"));
    } else {
        out.push_str(&format!("\\u{code:04x}"));
    }
}
