use crate::cursor::{decode_input, Cursor};
use crate::emitter::emit;
use crate::error::RepairError;
use crate::log::{trace, Trace};
use crate::options::Options;
use crate::parser::{parse_document, parse_one, ParseOutcome};
use crate::value::Value;

/// Byte offsets a resynced carry buffer may plausibly resume a value at,
/// after an unrecoverable lexical error.
fn is_plausible_value_start(b: u8) -> bool {
    matches!(b, b'{' | b'[' | b'"' | b'\'' | b'-' | b'0'..=b'9')
        || b.is_ascii_alphabetic()
        || b == b'_'
        || b == b'$'
}

fn resync_offset(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| is_plausible_value_start(b)).unwrap_or(bytes.len())
}

/// The push-based stream driver. Owns the carry buffer of bytes not
/// yet consumed into a completed value, plus enough state to aggregate
/// emitted values into a single JSON array when `stream_ndjson_aggregate`
/// is set.
pub(crate) struct StreamState {
    options: Options,
    carry: Vec<u8>,
    aggregate_open: bool,
}

impl StreamState {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            carry: Vec::new(),
            aggregate_open: false,
        }
    }

    /// Append `chunk`, then parse as many complete top-level values as
    /// possible from the start of the carry buffer. Returns `None` when
    /// nothing new was emitted (the value is still incomplete).
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<String>, RepairError> {
        self.carry.extend_from_slice(chunk);

        let valid_len = match std::str::from_utf8(&self.carry) {
            Ok(s) => s.len(),
            Err(e) => e.valid_up_to(),
        };

        let mut values = Vec::new();
        let mut consumed = 0usize;

        loop {
            let text = std::str::from_utf8(&self.carry[consumed..valid_len])
                .expect("prefix bounded by valid_len is always valid UTF-8");
            if text.is_empty() {
                break;
            }
            let mut cursor = Cursor::new(text);
            match parse_one(&mut cursor, &self.options, true) {
                Ok(ParseOutcome::Complete(value)) => {
                    consumed += cursor.position();
                    values.push(value);
                }
                Ok(ParseOutcome::Partial) => break,
                Err(e) => {
                    let abs_pos = (consumed + e.position).min(self.carry.len());
                    self.carry.drain(..abs_pos);
                    let resync = resync_offset(&self.carry);
                    self.carry.drain(..resync);
                    trace!(Trace::Repair, "[stream] resynced {resync} bytes after error at {abs_pos}");
                    return Err(e);
                }
            }
        }

        self.carry.drain(..consumed);

        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.render_batch(values)))
    }

    /// Parse whatever remains in the carry buffer as a whole document,
    /// forcing `aggressive_truncation_fix` on regardless of the configured
    /// option (flush is terminal: there is no more input coming to complete
    /// a dangling string or container).
    pub fn flush(&mut self) -> Result<String, RepairError> {
        let remaining = std::mem::take(&mut self.carry);
        let mut out = String::new();

        if !remaining.is_empty() {
            let text = decode_input(&remaining, true)?;
            let mut forced = self.options;
            forced.aggressive_truncation_fix = true;
            let mut cursor = Cursor::new(&text);
            let value = parse_document(&mut cursor, &forced)?;
            if self.options.stream_ndjson_aggregate {
                self.append_aggregate_value(&value, &mut out);
            } else {
                out.push_str(&emit(&value, &self.options));
            }
        }

        if self.options.stream_ndjson_aggregate {
            out.push_str(&self.close_aggregate());
        }
        Ok(out)
    }

    fn render_batch(&mut self, values: Vec<Value>) -> String {
        let mut out = String::new();
        if self.options.stream_ndjson_aggregate {
            for value in &values {
                self.append_aggregate_value(value, &mut out);
            }
        } else {
            let rendered: Vec<String> = values.iter().map(|v| emit(v, &self.options)).collect();
            out.push_str(&rendered.join("\n"));
        }
        out
    }

    fn append_aggregate_value(&mut self, value: &Value, out: &mut String) {
        if !self.aggregate_open {
            out.push('[');
            self.aggregate_open = true;
        } else {
            out.push(',');
            if self.options.python_style_separators {
                out.push(' ');
            }
        }
        out.push_str(&emit(value, &self.options));
    }

    /// Close the aggregate array, opening an empty `[]` if nothing was ever
    /// emitted — the stream always produces exactly one array in aggregate
    /// mode, regardless of how many values crossed the boundary.
    fn close_aggregate(&mut self) -> String {
        if !self.aggregate_open {
            self.aggregate_open = true;
            "[]".to_string()
        } else {
            "]".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_values_split_across_chunks() {
        let mut stream = StreamState::new(Options::new());
        assert_eq!(stream.push(b"{a:").unwrap(), None);
        assert_eq!(stream.push(b"1}").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(stream.push(b"{b:").unwrap(), None);
        assert_eq!(stream.push(b"2}").unwrap().as_deref(), Some(r#"{"b":2}"#));
        assert_eq!(stream.flush().unwrap(), "");
    }

    #[test]
    fn aggregates_ndjson_into_one_array() {
        let mut opts = Options::new();
        opts.set_stream_ndjson_aggregate(true);
        let mut stream = StreamState::new(opts);
        assert_eq!(stream.push(b"{a:1}").unwrap().as_deref(), Some(r#"[{"a":1}"#));
        assert_eq!(stream.push(b"{b:2}").unwrap().as_deref(), Some(r#",{"b":2}"#));
        assert_eq!(stream.flush().unwrap(), "]");
    }

    #[test]
    fn aggregate_with_no_values_is_an_empty_array() {
        let mut opts = Options::new();
        opts.set_stream_ndjson_aggregate(true);
        let mut stream = StreamState::new(opts);
        assert_eq!(stream.flush().unwrap(), "[]");
    }

    #[test]
    fn flush_closes_unterminated_tail() {
        let mut stream = StreamState::new(Options::new());
        assert_eq!(stream.push(b"{a:1,b:[1,2").unwrap(), None);
        assert_eq!(stream.flush().unwrap(), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn error_resyncs_at_next_plausible_value_start() {
        let mut stream = StreamState::new(Options::new());
        let err = stream.push(b"@@@{a:1}").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::UnexpectedToken);
        assert_eq!(stream.push(b"").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(stream.flush().unwrap(), "");
    }
}
