use once_cell::sync::OnceCell;
use regex::bytes::Regex;

use crate::options::Options;

/// The text the tokenizer should actually scan, plus the byte offset within
/// the *original* input that `text[0]` corresponds to.
///
/// Every position the parser reports is local to `text`; callers add
/// `origin_offset` back before surfacing an [`crate::error::RepairError`],
/// so that error positions always refer to the original input.
pub(crate) struct Preprocessed<'a> {
    pub text: &'a str,
    pub origin_offset: usize,
}

/// Run the optional surface strippers, in order: BOM stripping (always),
/// then fenced-code-block extraction (when enabled).
///
/// Hash-comment elision is *not* done here — the tokenizer performs it
/// inline while scanning, since rewriting the buffer up front would require
/// a second allocation and would shift every later offset.
pub(crate) fn preprocess<'a>(input: &'a str, options: &Options) -> Preprocessed<'a> {
    let mut text = input;
    let mut origin_offset = 0usize;

    if let Some(stripped) = text.strip_prefix('\u{feff}') {
        origin_offset += text.len() - stripped.len();
        text = stripped;
    }

    if options.fenced_code_blocks {
        if let Some((body, body_offset)) = extract_fence(text) {
            origin_offset += body_offset;
            text = body;
        }
    }

    Preprocessed { text, origin_offset }
}

/// Matches an opening fence plus its (optional) info string up to and
/// including the newline that ends it — the one place in the preprocessor
/// where a fixed-width literal search isn't enough, since the info string is
/// free-form text of unknown length.
fn opening_fence_pattern() -> &'static Regex {
    static PATTERN: OnceCell<Regex> = OnceCell::new();
    PATTERN.get_or_init(|| Regex::new(r"```[^\n]*\n?").unwrap())
}

/// Find the first triple-backtick fence, skip its (optional) info-string
/// line, and return the slice up to the matching closing fence — or to end
/// of input if the fence is never closed. Returns `None` when there is no
/// opening fence at all, leaving the input untouched.
///
/// When more than one fence is present in the input, only the first is ever
/// considered: the body slice returned here stops at the *first* closing
/// fence, so anything beyond it (including further fenced blocks) is simply
/// never visited.
fn extract_fence(text: &str) -> Option<(&str, usize)> {
    const FENCE: &str = "```";

    let m = opening_fence_pattern().find(text.as_bytes())?;
    let body_start = m.end();

    match text[body_start..].find(FENCE) {
        Some(rel) => Some((&text[body_start..body_start + rel], body_start)),
        None => Some((&text[body_start..], body_start)),
    }
}
