use crate::cursor::Cursor;
use crate::error::{ErrorKind, RepairError, RepairFlow};
use crate::log::{trace, Trace};
use crate::options::Options;
use crate::token::{NumberClass, Token, TokenKind};

/// Smart-quote delimiter pairs. The fullwidth forms are symmetric —
/// the same code point opens and closes — everything else is a distinct
/// open/close pair.
const SMART_QUOTE_PAIRS: &[(char, char)] = &[
    ('\u{201C}', '\u{201D}'), // “ ”
    ('\u{2018}', '\u{2019}'), // ‘ ’
    ('\u{00AB}', '\u{00BB}'), // « »
    ('\u{FF02}', '\u{FF02}'), // ＂
    ('\u{FF07}', '\u{FF07}'), // ＇
];

fn smart_quote_closer(opener: char) -> Option<char> {
    SMART_QUOTE_PAIRS
        .iter()
        .find(|(open, _)| *open == opener)
        .map(|(_, close)| *close)
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

/// The tolerant tokenizer. Stateless: every method takes the [`Cursor`] it
/// advances and the active [`Options`] explicitly, matching the lang_pt
/// `ITokenization` convention of a tokenizer that owns no per-call state of
/// its own.
pub(crate) struct Tokenizer;

impl Tokenizer {
    /// Produce the next token starting at the cursor's current position,
    /// skipping whitespace and comments inline, and advance the cursor past
    /// it. Returns an `EndOfInput` token (never an error) once trivia-skipping
    /// reaches the end of the buffer.
    ///
    /// `allow_partial` only affects strings that are still open when the
    /// buffer runs out: in streaming ("consume one value") mode the tokenizer
    /// cannot tell a genuinely unterminated string from one whose closing
    /// quote simply hasn't arrived yet, so it reports [`RepairFlow::Partial`]
    /// instead of committing to either the error or the aggressive-fix path.
    pub fn next(cursor: &mut Cursor, options: &Options, allow_partial: bool) -> Result<Token, RepairFlow> {
        skip_trivia(cursor, options);

        let start = cursor.position();
        if cursor.is_eof() {
            return Ok(Token::new(TokenKind::EndOfInput, start, start));
        }

        let b = cursor.byte_at(start).unwrap();
        trace!(Trace::Token, "[token] byte {:?} at {start}", b as char);
        match b {
            b'{' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::ObjectOpen, start, start + 1))
            }
            b'}' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::ObjectClose, start, start + 1))
            }
            b'[' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::ArrayOpen, start, start + 1))
            }
            b']' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::ArrayClose, start, start + 1))
            }
            b',' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::Comma, start, start + 1))
            }
            b':' => {
                cursor.advance(1);
                Ok(Token::new(TokenKind::Colon, start, start + 1))
            }
            b'"' | b'\'' => scan_quoted_string(cursor, b, options, allow_partial),
            b'-' => Ok(scan_minus_or_number(cursor, options)?),
            b'.' | b'0'..=b'9' => Ok(scan_number(cursor, options)?),
            _ if is_ident_start(b) => Ok(scan_identifier_or_keyword(cursor, options)),
            _ => {
                if let Some((ch, len)) = cursor.char_at(start) {
                    if let Some(closer) = smart_quote_closer(ch) {
                        return scan_smart_quoted_string(cursor, len, closer, options, allow_partial);
                    }
                    cursor.advance(len);
                } else {
                    cursor.advance(1);
                }
                Err(RepairError::new(
                    ErrorKind::UnexpectedToken,
                    start,
                    format!("unexpected character at byte {start}"),
                )
                .into())
            }
        }
    }
}

fn skip_trivia(cursor: &mut Cursor, options: &Options) {
    loop {
        match cursor.byte_at(cursor.position()) {
            Some(b) if b.is_ascii_whitespace() => {
                cursor.advance(1);
            }
            Some(b'/') if cursor.byte_at(cursor.position() + 1) == Some(b'/') => {
                cursor.advance(2);
                while let Some(b) = cursor.byte_at(cursor.position()) {
                    if b == b'\n' {
                        break;
                    }
                    cursor.advance(1);
                }
            }
            Some(b'/') if cursor.byte_at(cursor.position() + 1) == Some(b'*') => {
                cursor.advance(2);
                loop {
                    match cursor.byte_at(cursor.position()) {
                        None => break,
                        Some(b'*') if cursor.byte_at(cursor.position() + 1) == Some(b'/') => {
                            cursor.advance(2);
                            break;
                        }
                        Some(_) => cursor.advance(1),
                    }
                }
            }
            Some(b'#') if options.tolerate_hash_comments => {
                cursor.advance(1);
                while let Some(b) = cursor.byte_at(cursor.position()) {
                    if b == b'\n' {
                        break;
                    }
                    cursor.advance(1);
                }
            }
            _ => break,
        }
    }
}

fn unterminated_string(
    cursor: &mut Cursor,
    options: &Options,
    allow_partial: bool,
    start: usize,
    decoded: String,
) -> Result<Token, RepairFlow> {
    if allow_partial {
        Err(RepairFlow::Partial)
    } else if options.aggressive_truncation_fix {
        let end = cursor.position();
        Ok(Token::new(TokenKind::String(decoded), start, end))
    } else {
        Err(RepairError::new(
            ErrorKind::UnterminatedString,
            start,
            "unterminated string literal",
        )
        .into())
    }
}

fn decode_unicode_escape(bytes: &[u8], digits_start: usize) -> Option<u32> {
    let hex = std::str::from_utf8(bytes.get(digits_start..digits_start + 4)?).ok()?;
    u32::from_str_radix(hex, 16).ok()
}

/// Scan a `"`- or `'`-delimited string. Both share JSON's escape grammar;
/// the lone extra leniency is that an unescaped opposite quote character
/// never terminates the string — applied symmetrically to both quote kinds
/// since a double-quoted string tolerating a literal `'` is harmless.
fn scan_quoted_string(
    cursor: &mut Cursor,
    quote: u8,
    options: &Options,
    allow_partial: bool,
) -> Result<Token, RepairFlow> {
    let start = cursor.position();
    cursor.advance(1);
    let mut decoded = String::new();

    loop {
        match cursor.byte_at(cursor.position()) {
            None => return unterminated_string(cursor, options, allow_partial, start, decoded),
            Some(b) if b == quote => {
                cursor.advance(1);
                return Ok(Token::new(TokenKind::String(decoded), start, cursor.position()));
            }
            Some(b'\\') => {
                let esc_pos = cursor.position();
                match cursor.byte_at(esc_pos + 1) {
                    None => return unterminated_string(cursor, options, allow_partial, start, decoded),
                    Some(b'"') => {
                        decoded.push('"');
                        cursor.advance(2);
                    }
                    Some(b'\'') => {
                        decoded.push('\'');
                        cursor.advance(2);
                    }
                    Some(b'\\') => {
                        decoded.push('\\');
                        cursor.advance(2);
                    }
                    Some(b'/') => {
                        decoded.push('/');
                        cursor.advance(2);
                    }
                    Some(b'b') => {
                        decoded.push('\u{8}');
                        cursor.advance(2);
                    }
                    Some(b'f') => {
                        decoded.push('\u{c}');
                        cursor.advance(2);
                    }
                    Some(b'n') => {
                        decoded.push('\n');
                        cursor.advance(2);
                    }
                    Some(b'r') => {
                        decoded.push('\r');
                        cursor.advance(2);
                    }
                    Some(b't') => {
                        decoded.push('\t');
                        cursor.advance(2);
                    }
                    Some(b'u') => match decode_unicode_escape(cursor.text.as_bytes(), esc_pos + 2) {
                        None => {
                            decoded.push('u');
                            cursor.advance(2);
                        }
                        Some(high) => {
                            cursor.advance(6);
                            if (0xD800..=0xDBFF).contains(&high) {
                                let low_at = cursor.position();
                                let low = (cursor.byte_at(low_at) == Some(b'\\')
                                    && cursor.byte_at(low_at + 1) == Some(b'u'))
                                .then(|| decode_unicode_escape(cursor.text.as_bytes(), low_at + 2))
                                .flatten()
                                .filter(|low| (0xDC00..=0xDFFF).contains(low));
                                match low {
                                    Some(low) => {
                                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                                        decoded.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                                        cursor.advance(6);
                                    }
                                    None => decoded.push('\u{FFFD}'),
                                }
                            } else {
                                decoded.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
                            }
                        }
                    },
                    Some(other) => {
                        if let Some((ch, len)) = cursor.char_at(esc_pos + 1) {
                            let _ = other;
                            decoded.push(ch);
                            cursor.advance(1 + len);
                        } else {
                            cursor.advance(1);
                        }
                    }
                }
            }
            Some(b) if b < 0x20 => {
                decoded.push(b as char);
                cursor.advance(1);
            }
            Some(_) => {
                let (ch, len) = cursor.char_at(cursor.position()).unwrap();
                decoded.push(ch);
                cursor.advance(len);
            }
        }
    }
}

fn scan_smart_quoted_string(
    cursor: &mut Cursor,
    opener_len: usize,
    closer: char,
    options: &Options,
    allow_partial: bool,
) -> Result<Token, RepairFlow> {
    let start = cursor.position();
    cursor.advance(opener_len);
    let mut decoded = String::new();

    loop {
        match cursor.char_at(cursor.position()) {
            None => return unterminated_string(cursor, options, allow_partial, start, decoded),
            Some((ch, len)) if ch == closer => {
                cursor.advance(len);
                return Ok(Token::new(TokenKind::String(decoded), start, cursor.position()));
            }
            Some((ch, len)) => {
                decoded.push(ch);
                cursor.advance(len);
            }
        }
    }
}

fn scan_minus_or_number(cursor: &mut Cursor, options: &Options) -> Result<Token, RepairError> {
    let start = cursor.position();
    let next = cursor.byte_at(start + 1);
    let is_number_start =
        matches!(next, Some(b'0'..=b'9')) || (next == Some(b'.') && options.number_tolerance_leading_dot);

    if is_number_start {
        return scan_number(cursor, options);
    }

    if options.normalize_js_nonfinite && cursor.starts_with_at(start + 1, "Infinity") {
        let end = start + 1 + "Infinity".len();
        cursor.advance(end - start);
        return Ok(Token::new(TokenKind::NegInfinity, start, end));
    }

    cursor.advance(1);
    Ok(Token::new(TokenKind::Minus, start, start + 1))
}

fn scan_radix_number(
    cursor: &mut Cursor,
    start: usize,
    digits_start: usize,
    radix: u32,
    neg: bool,
) -> Result<Token, RepairError> {
    let bytes = cursor.text.as_bytes();
    let mut j = digits_start;
    while bytes
        .get(j)
        .is_some_and(|b| b.is_ascii() && ((*b as char).is_digit(radix) || *b == b'_'))
    {
        j += 1;
    }
    if j == digits_start {
        return Err(RepairError::new(
            ErrorKind::UnexpectedToken,
            start,
            "expected digits after radix prefix",
        ));
    }

    let raw: String = cursor.text[digits_start..j].chars().filter(|c| *c != '_').collect();
    let value = i64::from_str_radix(&raw, radix)
        .map_err(|_| RepairError::new(ErrorKind::NumericOverflow, start, "numeric literal overflow"))?;
    let value = if neg { -value } else { value };

    cursor.advance(j - start);
    Ok(Token::new(TokenKind::Number(value.to_string(), NumberClass::Integer), start, j))
}

/// Scan a JSON number, plus hex/octal/binary literals (always recognised,
/// independent of any option) and, when the matching option is set, leading
/// or trailing decimal points. Underscores inside the literal are always
/// stripped.
fn scan_number(cursor: &mut Cursor, options: &Options) -> Result<Token, RepairError> {
    let start = cursor.position();
    let bytes = cursor.text.as_bytes();
    let mut i = start;
    let neg = bytes.get(i) == Some(&b'-');
    if neg {
        i += 1;
    }

    if bytes.get(i) == Some(&b'0') {
        if let Some(radix) = bytes.get(i + 1).and_then(|c| match c {
            b'x' | b'X' => Some(16),
            b'o' | b'O' => Some(8),
            b'b' | b'B' => Some(2),
            _ => None,
        }) {
            return scan_radix_number(cursor, start, i + 2, radix, neg);
        }
    }

    let int_start = i;
    let mut j = i;
    while matches!(bytes.get(j), Some(b'0'..=b'9') | Some(b'_')) {
        j += 1;
    }
    let has_int_digits = bytes[int_start..j].iter().any(u8::is_ascii_digit);
    let mut is_decimal = false;

    if bytes.get(j) == Some(&b'.') {
        let dot = j;
        let mut k = dot + 1;
        while matches!(bytes.get(k), Some(b'0'..=b'9') | Some(b'_')) {
            k += 1;
        }
        let has_frac_digits = k > dot + 1;

        if has_int_digits {
            if has_frac_digits {
                j = k;
                is_decimal = true;
            } else if options.number_tolerance_trailing_dot {
                j = k;
                is_decimal = true;
            }
        } else if options.number_tolerance_leading_dot && has_frac_digits {
            j = k;
            is_decimal = true;
        }
    }

    if !has_int_digits && !is_decimal {
        return Err(RepairError::new(ErrorKind::UnexpectedToken, start, "expected a number"));
    }

    if matches!(bytes.get(j), Some(b'e') | Some(b'E')) {
        let mut k = j + 1;
        if matches!(bytes.get(k), Some(b'+') | Some(b'-')) {
            k += 1;
        }
        let exp_digits_start = k;
        while matches!(bytes.get(k), Some(b'0'..=b'9') | Some(b'_')) {
            k += 1;
        }
        if k > exp_digits_start {
            j = k;
            is_decimal = true;
        }
    }

    let raw = &cursor.text[start..j];
    let canonical = canonicalize_number(raw);
    cursor.advance(j - start);
    let class = if is_decimal { NumberClass::Decimal } else { NumberClass::Integer };
    Ok(Token::new(TokenKind::Number(canonical, class), start, j))
}

/// Strip underscores, fill in the implicit digit a leading/trailing dot
/// leaves out (so `.5` becomes `0.5` and `1.` becomes `1.0`), and collapse a
/// redundant leading zero in the integer part (`007` becomes `7`, `00`
/// becomes `0`) — a strict JSON parser rejects any of these as written.
fn canonicalize_number(raw: &str) -> String {
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(r) => ("-", r),
        None => ("", raw),
    };
    let mut body: String = rest.chars().filter(|c| *c != '_').collect();
    if body.starts_with('.') {
        body.insert(0, '0');
    }
    if body.ends_with('.') {
        body.push('0');
    }
    strip_leading_zeros(&mut body);
    format!("{sign}{body}")
}

/// Collapse a run of leading zeros in the integer part down to a single `0`,
/// leaving the fractional/exponent part (if any) untouched.
fn strip_leading_zeros(body: &mut String) {
    let digit_end = body.chars().take_while(char::is_ascii_digit).count();
    let zeros = body[..digit_end].chars().take_while(|&c| c == '0').count();
    if zeros == 0 {
        return;
    }
    let keep_from = if zeros == digit_end { zeros - 1 } else { zeros };
    body.replace_range(..keep_from, "");
}

fn scan_identifier_or_keyword(cursor: &mut Cursor, options: &Options) -> Token {
    let start = cursor.position();
    let bytes = cursor.text.as_bytes();
    let mut j = start;
    while bytes
        .get(j)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'$')
    {
        j += 1;
    }
    let word = &cursor.text[start..j];
    cursor.advance(j - start);

    let kind = match word {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "True" if options.allow_python_keywords => TokenKind::True,
        "False" if options.allow_python_keywords => TokenKind::False,
        "None" if options.allow_python_keywords => TokenKind::Null,
        "undefined" if options.repair_undefined => TokenKind::Undefined,
        "NaN" if options.normalize_js_nonfinite => TokenKind::NaN,
        "Infinity" if options.normalize_js_nonfinite => TokenKind::Infinity,
        _ => TokenKind::Identifier(word.to_string()),
    };
    Token::new(kind, start, j)
}
