use once_cell::unsync::OnceCell;

use crate::error::{ErrorKind, RepairError};
use crate::position::Position;

/// Converts raw input bytes into a validated `String`, substituting invalid
/// UTF-8 sequences with U+FFFD unless `substitute_invalid` is `false`, in
/// which case invalid UTF-8 is reported as an error instead.
///
/// This runs once, before tokenization, rather than being a per-codepoint
/// primitive the tokenizer calls: every downstream stage then works over a
/// plain `&str` and gets Rust's own UTF-8 invariant for free instead of
/// re-deriving it one byte at a time.
pub(crate) fn decode_input(bytes: &[u8], substitute_invalid: bool) -> Result<String, RepairError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        Err(e) if substitute_invalid => {
            let _ = e;
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
        Err(e) => Err(RepairError::new(
            ErrorKind::InvalidUtf8,
            e.valid_up_to(),
            "input contained malformed UTF-8",
        )),
    }
}

/// Wraps the (already UTF-8-validated) input for one repair pass: byte-offset
/// lookahead/advance, and a lazily-cached line-break index for `position_at`.
///
/// The line-break cache mirrors `lang_pt::Code::obtain_line_breaks`: computed
/// once on first use and binary-searched thereafter, since diagnostics are
/// rare relative to tokenization but may be requested at arbitrary offsets.
pub(crate) struct Cursor<'c> {
    pub text: &'c str,
    pos: usize,
    line_breaks: OnceCell<Vec<usize>>,
}

impl<'c> Cursor<'c> {
    pub fn new(text: &'c str) -> Self {
        Self {
            text,
            pos: 0,
            line_breaks: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    /// Byte at an absolute offset, or `None` past end of input.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(offset).copied()
    }

    /// Decode the scalar value starting at byte offset `offset`. The input is
    /// already known-valid UTF-8 (see [`decode_input`]), so this never fails;
    /// it exists so callers can step over multi-byte smart-quote delimiters
    /// without re-deriving `char::len_utf8` bookkeeping by hand.
    pub fn char_at(&self, offset: usize) -> Option<(char, usize)> {
        self.text
            .get(offset..)
            .and_then(|s| s.chars().next())
            .map(|c| (c, c.len_utf8()))
    }

    pub fn starts_with_at(&self, offset: usize, needle: &str) -> bool {
        self.text.get(offset..).is_some_and(|s| s.starts_with(needle))
    }

    /// Resolve an absolute byte offset to a 1-based line/column, for
    /// rendering a [`crate::error::RepairError`] as a human-facing
    /// diagnostic (see [`RepairError::position_in`]). `\r\n` counts as a
    /// single line terminator since only `\n` is tracked as a break.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let breaks = self.line_breaks();
        let idx = match breaks.binary_search(&offset) {
            Ok(i) | Err(i) => i,
        };
        let (line_start, line) = if idx == 0 {
            (0, 1)
        } else {
            (breaks[idx - 1] + 1, idx + 1)
        };
        let column = self.text[line_start..offset].chars().count() + 1;
        Position::new(line, column)
    }

    fn line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(i, b)| (b == b'\n').then_some(i))
                .collect()
        })
    }
}
