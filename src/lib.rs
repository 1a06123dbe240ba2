//! jsonrepair is a library that repairs malformed JSON-like input into
//! strict, conformant JSON.
//!
//! It accepts text produced by humans, language models, ad-hoc serialisers,
//! or truncated network transfers — input a strict JSON parser would
//! reject — and emits a syntactically valid JSON document (or a sequence of
//! documents, in streaming mode) that preserves the author's apparent
//! intent.
//!
//! # Example
//!
//! ```
//! let repaired = jsonrepair::repair("{a:1, b:'hello',}").unwrap();
//! assert_eq!(repaired, r#"{"a":1,"b":"hello"}"#);
//! ```
//!
//! Malformations beyond unquoted keys and single-quoted strings are gated
//! behind [`Options`], since they would otherwise change the meaning of
//! input that was already valid JSON (a bare `NaN`, for instance, is only
//! ever repaired into `null` when [`Options::set_normalize_js_nonfinite`]
//! is on):
//!
//! ```
//! use jsonrepair::Options;
//!
//! let mut options = Options::new();
//! options.set_allow_python_keywords(true);
//! let repaired = jsonrepair::repair_with_options("{a: True, b: None}", Some(&options)).unwrap();
//! assert_eq!(repaired, r#"{"a":true,"b":null}"#);
//! ```
//!
//! For input that arrives incrementally, [`Stream`] drives the same engine
//! in a push-based mode.
//!
//! # License
//! jsonrepair is provided under the MIT license.

mod cursor;
mod emitter;
mod error;
mod ffi;
mod frame;
mod log;
mod options;
mod parser;
mod preprocess;
mod position;
mod stream;
mod token;
mod tokenizer;
mod value;

use cursor::{decode_input, Cursor};

pub use error::{ErrorKind, RepairError};
pub use options::Options;
pub use position::Position;
pub use value::Value;

/// The engine version, matching the crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Repair `input` with default options. Returns `None` on unrecoverable
/// failure with no diagnostic — use [`repair_ex`] when the reason matters.
pub fn repair(input: &str) -> Option<String> {
    repair_with_options(input, None)
}

/// Repair `input` with an explicit (or default, if `None`) option set.
pub fn repair_with_options(input: &str, options: Option<&Options>) -> Option<String> {
    repair_ex(input, options).ok()
}

/// Repair `input`, returning a structured [`RepairError`] on failure instead
/// of discarding the reason.
pub fn repair_ex(input: &str, options: Option<&Options>) -> Result<String, RepairError> {
    let default_options = Options::default();
    let options = options.unwrap_or(&default_options);

    let text = decode_input(input.as_bytes(), true)?;
    let preprocessed = preprocess::preprocess(&text, options);
    let mut cursor = Cursor::new(preprocessed.text);
    let value = parser::parse_document(&mut cursor, options).map_err(|mut e| {
        e.position += preprocessed.origin_offset;
        e
    })?;
    Ok(emitter::emit(&value, options))
}

/// Parse `input` into the intermediate [`Value`] tree without re-emitting it
/// as text. Exposed for callers that want to inspect the repaired structure
/// directly rather than round-trip through strict-JSON text.
pub fn repair_to_value(input: &str, options: Option<&Options>) -> Result<Value, RepairError> {
    let default_options = Options::default();
    let options = options.unwrap_or(&default_options);

    let text = decode_input(input.as_bytes(), true)?;
    let preprocessed = preprocess::preprocess(&text, options);
    let mut cursor = Cursor::new(preprocessed.text);
    parser::parse_document(&mut cursor, options).map_err(|mut e| {
        e.position += preprocessed.origin_offset;
        e
    })
}

/// A push-based repair stream: feed it chunks as they arrive, and read back
/// repaired values as soon as they are complete.
pub struct Stream {
    inner: stream::StreamState,
}

impl Stream {
    pub fn new(options: Option<&Options>) -> Self {
        Self {
            inner: stream::StreamState::new(options.copied().unwrap_or_default()),
        }
    }

    /// Feed `chunk` to the stream. Returns `Some(fragment)` for every value
    /// (or run of values) completed by this push, or `None` if nothing new
    /// is ready yet.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<String>, RepairError> {
        self.inner.push(chunk)
    }

    /// Parse whatever remains in the carry buffer as a final, whole
    /// document, closing any still-open strings or containers regardless of
    /// `aggressive_truncation_fix`.
    pub fn flush(&mut self) -> Result<String, RepairError> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_unquoted_keys_and_single_quotes() {
        assert_eq!(repair("{a:1, b:'hello'}").unwrap(), r#"{"a":1,"b":"hello"}"#);
    }

    #[test]
    fn repairs_python_keywords() {
        let mut opts = Options::new();
        opts.set_allow_python_keywords(true);
        assert_eq!(
            repair_with_options("{a: True, b: False, c: None}", Some(&opts)).unwrap(),
            r#"{"a":true,"b":false,"c":null}"#
        );
    }

    #[test]
    fn repairs_hash_comments() {
        let mut opts = Options::new();
        opts.set_tolerate_hash_comments(true);
        assert_eq!(
            repair_with_options("{a:1, # comment\nb:2}", Some(&opts)).unwrap(),
            r#"{"a":1,"b":2}"#
        );
    }

    #[test]
    fn repairs_fenced_code_block() {
        let mut opts = Options::new();
        opts.set_fenced_code_blocks(true);
        assert_eq!(repair_with_options("```json\n{a:1}\n```", Some(&opts)).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn repairs_undefined_to_null() {
        let mut opts = Options::new();
        opts.set_repair_undefined(true);
        assert_eq!(repair_with_options("{a: undefined}", Some(&opts)).unwrap(), r#"{"a":null}"#);
    }

    #[test]
    fn repairs_nonfinite_to_null() {
        let mut opts = Options::new();
        opts.set_normalize_js_nonfinite(true);
        assert_eq!(
            repair_with_options("{a: NaN, b: Infinity}", Some(&opts)).unwrap(),
            r#"{"a":null,"b":null}"#
        );
    }

    #[test]
    fn repairs_with_ensure_ascii() {
        let mut opts = Options::new();
        opts.set_ensure_ascii(true);
        let out = repair_with_options("{name: '中文'}", Some(&opts)).unwrap();
        assert!(out.is_ascii());
        assert!(out.contains("\\u"));
    }

    #[test]
    fn error_positions_account_for_preprocessor_offset() {
        let mut opts = Options::new();
        opts.set_fenced_code_blocks(true);
        let err = repair_ex("```json\n{\"a\":\n```", Some(&opts)).unwrap_err();
        assert!(err.position >= "```json\n".len());
    }

    #[test]
    fn repair_returns_none_on_unrecoverable_failure() {
        assert!(repair("@@@").is_none());
    }

    #[test]
    fn streaming_matches_one_shot_repair() {
        let mut stream = Stream::new(None);
        let mut out = String::new();
        for chunk in ["{a:", "1}"] {
            if let Some(fragment) = stream.push(chunk.as_bytes()).unwrap() {
                out.push_str(&fragment);
            }
        }
        out.push_str(&stream.flush().unwrap());
        assert_eq!(out, repair("{a:1}").unwrap());
    }
}
