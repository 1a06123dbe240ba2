use crate::cursor::Cursor;
use crate::error::{ErrorKind, RepairError, RepairFlow};
use crate::frame::{FrameKind, ParseFrame};
use crate::log::{trace, Trace};
use crate::options::Options;
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::value::Value;

/// Result of parsing exactly one top-level value.
///
/// `Partial` is only ever produced when the caller asked for it (streaming
/// push mode) and the buffer ran out before the value was structurally
/// complete; it carries no position because nothing has gone wrong, there is
/// simply not enough input yet.
pub(crate) enum ParseOutcome {
    Complete(Value),
    Partial,
}

/// Parse one value in whole-input mode: end-of-input mid-structure is either
/// repaired (when `aggressive_truncation_fix` is set) or a hard error, never
/// `Partial`.
pub(crate) fn parse_document(cursor: &mut Cursor, options: &Options) -> Result<Value, RepairError> {
    match parse_one(cursor, options, false)? {
        ParseOutcome::Complete(value) => Ok(value),
        ParseOutcome::Partial => unreachable!("whole-input parsing never yields Partial"),
    }
}

/// Parse one value, optionally in "consume one value" streaming mode where
/// running out of input before the value is complete yields
/// [`ParseOutcome::Partial`] instead of an error.
pub(crate) fn parse_one(
    cursor: &mut Cursor,
    options: &Options,
    allow_partial: bool,
) -> Result<ParseOutcome, RepairError> {
    let mut state = ParserState {
        cursor,
        options,
        peeked: None,
        allow_partial,
    };
    match parse_value(&mut state) {
        Ok(value) => Ok(ParseOutcome::Complete(value)),
        Err(RepairFlow::Partial) => Ok(ParseOutcome::Partial),
        Err(RepairFlow::Error(e)) => Err(e),
    }
}

struct ParserState<'c, 't> {
    cursor: &'c mut Cursor<'t>,
    options: &'c Options,
    peeked: Option<Token>,
    allow_partial: bool,
}

impl ParserState<'_, '_> {
    fn bump(&mut self) -> Result<Token, RepairFlow> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => Tokenizer::next(self.cursor, self.options, self.allow_partial),
        }
    }

    fn peek(&mut self) -> Result<&Token, RepairFlow> {
        if self.peeked.is_none() {
            self.peeked = Some(Tokenizer::next(self.cursor, self.options, self.allow_partial)?);
        }
        Ok(self.peeked.as_ref().unwrap())
    }
}

fn unexpected(tok: &Token) -> RepairFlow {
    RepairError::new(
        ErrorKind::UnexpectedToken,
        tok.start,
        format!("unexpected {}", tok.describe()),
    )
    .into()
}

/// Parse a single value starting at the current token. This is the entry
/// point used both at the document root and for every object/array member;
/// the call stack itself plays the role of the structural stack described
/// alongside [`ParseFrame`] — each nested `parse_object`/`parse_array`
/// invocation owns exactly one frame.
fn parse_value(state: &mut ParserState) -> Result<Value, RepairFlow> {
    let tok = state.bump()?;
    value_from_token(state, tok)
}

fn value_from_token(state: &mut ParserState, tok: Token) -> Result<Value, RepairFlow> {
    match tok.kind {
        TokenKind::ObjectOpen => parse_object(state, tok.start),
        TokenKind::ArrayOpen => parse_array(state, tok.start),
        TokenKind::String(s) => Ok(Value::String(s)),
        TokenKind::Number(lexeme, _) => Ok(Value::Number(lexeme)),
        TokenKind::True => Ok(Value::Bool(true)),
        TokenKind::False => Ok(Value::Bool(false)),
        TokenKind::Null
        | TokenKind::Undefined
        | TokenKind::NaN
        | TokenKind::Infinity
        | TokenKind::NegInfinity => Ok(Value::Null),
        // An identifier is a recognised literal only under its matching
        // option (already resolved by the tokenizer); by the time it reaches
        // here it is always accepted as a bare string value. The identifier
        // grammar never matches the empty string, so this path never raises
        // UnexpectedToken.
        TokenKind::Identifier(name) => Ok(Value::String(name)),
        TokenKind::EndOfInput => {
            if state.allow_partial {
                Err(RepairFlow::Partial)
            } else {
                Err(RepairError::new(ErrorKind::UnexpectedToken, tok.start, "expected a value, found end of input").into())
            }
        }
        TokenKind::Minus | TokenKind::ObjectClose | TokenKind::ArrayClose | TokenKind::Comma | TokenKind::Colon => {
            Err(unexpected(&tok))
        }
    }
}

/// Fully parse and discard a value that appeared where a key (or a
/// continuation) was expected, rather than erroring — a soft-aggregate mode
/// that would instead wrap it into a virtual array has no corresponding
/// option in this engine and is therefore never active.
fn discard_stray_value(state: &mut ParserState, tok: Token) -> Result<(), RepairFlow> {
    if matches!(tok.kind, TokenKind::ObjectOpen | TokenKind::ArrayOpen) {
        value_from_token(state, tok)?;
    }
    Ok(())
}

fn finish_object(frame: ParseFrame) -> Value {
    Value::Object(
        frame
            .members
            .into_iter()
            .map(|(key, value)| (key.unwrap_or_default(), value))
            .collect(),
    )
}

fn finish_array(frame: ParseFrame) -> Value {
    Value::Array(frame.members.into_iter().map(|(_, value)| value).collect())
}

fn close_at_eof(state: &ParserState, frame: &ParseFrame) -> Result<(), RepairFlow> {
    if state.allow_partial {
        Err(RepairFlow::Partial)
    } else if state.options.aggressive_truncation_fix {
        Ok(())
    } else {
        let what = match frame.kind {
            FrameKind::Object => "unterminated object",
            FrameKind::Array => "unterminated array",
        };
        Err(RepairError::new(ErrorKind::UnterminatedContainer, frame.opened_at, what).into())
    }
}

enum ObjectPhase {
    Key,
    Colon,
    Value,
    CommaOrClose,
}

/// Drives the object repair actions as a small state machine over what the
/// parser currently expects. Every branch either consumes at least one
/// token or changes phase, so the loop always makes progress.
fn parse_object(state: &mut ParserState, opened_at: usize) -> Result<Value, RepairFlow> {
    let mut frame = ParseFrame::new(FrameKind::Object, opened_at);
    let mut phase = ObjectPhase::Key;

    loop {
        match phase {
            ObjectPhase::Key => {
                let tok = state.bump()?;
                match tok.kind {
                    TokenKind::ObjectClose => return Ok(finish_object(frame)),
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        return Ok(finish_object(frame));
                    }
                    // A leading or repeated comma before the next key: drop it.
                    TokenKind::Comma => continue,
                    TokenKind::String(s) => {
                        frame.pending_key = Some(s);
                        phase = ObjectPhase::Colon;
                    }
                    TokenKind::Identifier(name) => {
                        frame.pending_key = Some(name);
                        phase = ObjectPhase::Colon;
                    }
                    _ => discard_stray_value(state, tok)?,
                }
            }
            ObjectPhase::Colon => {
                let tok = state.peek()?;
                match tok.kind {
                    TokenKind::Colon => {
                        state.bump()?;
                        phase = ObjectPhase::Value;
                    }
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        frame.pending_key = None;
                        return Ok(finish_object(frame));
                    }
                    // Missing colon: insert a virtual one and leave the token
                    // for the value phase to consume.
                    _ => phase = ObjectPhase::Value,
                }
            }
            ObjectPhase::Value => {
                let tok = state.bump()?;
                match tok.kind {
                    // Key with no value at all before the container closes:
                    // the dangling key is discarded.
                    TokenKind::ObjectClose => {
                        frame.pending_key = None;
                        return Ok(finish_object(frame));
                    }
                    TokenKind::Comma => {
                        frame.pending_key = None;
                        phase = ObjectPhase::Key;
                    }
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        frame.pending_key = None;
                        return Ok(finish_object(frame));
                    }
                    _ => {
                        let key = frame.pending_key.take();
                        let value = value_from_token(state, tok)?;
                        frame.members.push((key, value));
                        phase = ObjectPhase::CommaOrClose;
                    }
                }
            }
            ObjectPhase::CommaOrClose => {
                let tok = state.peek()?;
                match tok.kind {
                    TokenKind::Comma => {
                        state.bump()?;
                        phase = ObjectPhase::Key;
                    }
                    TokenKind::ObjectClose => {
                        state.bump()?;
                        return Ok(finish_object(frame));
                    }
                    // Wrong close kind: close this frame without consuming
                    // the token, so the caller re-examines it.
                    TokenKind::ArrayClose => return Ok(finish_object(frame)),
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        return Ok(finish_object(frame));
                    }
                    // Missing comma between members: reinterpret this token
                    // as the start of the next key.
                    _ => {
                        trace!(Trace::Repair, "[repair] inserted missing comma before {}", tok.describe());
                        phase = ObjectPhase::Key;
                    }
                }
            }
        }
    }
}

enum ArrayPhase {
    Value,
    CommaOrClose,
}

fn parse_array(state: &mut ParserState, opened_at: usize) -> Result<Value, RepairFlow> {
    let mut frame = ParseFrame::new(FrameKind::Array, opened_at);
    let mut phase = ArrayPhase::Value;

    loop {
        match phase {
            ArrayPhase::Value => {
                let tok = state.bump()?;
                match tok.kind {
                    TokenKind::ArrayClose => return Ok(finish_array(frame)),
                    // Leading or repeated comma: drop it.
                    TokenKind::Comma => continue,
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        return Ok(finish_array(frame));
                    }
                    _ => {
                        let value = value_from_token(state, tok)?;
                        frame.members.push((None, value));
                        phase = ArrayPhase::CommaOrClose;
                    }
                }
            }
            ArrayPhase::CommaOrClose => {
                let tok = state.peek()?;
                match tok.kind {
                    TokenKind::Comma => {
                        state.bump()?;
                        phase = ArrayPhase::Value;
                    }
                    TokenKind::ArrayClose => {
                        state.bump()?;
                        return Ok(finish_array(frame));
                    }
                    TokenKind::ObjectClose => return Ok(finish_array(frame)),
                    TokenKind::EndOfInput => {
                        close_at_eof(state, &frame)?;
                        return Ok(finish_array(frame));
                    }
                    _ => {
                        trace!(Trace::Repair, "[repair] inserted missing comma before {}", tok.describe());
                        phase = ArrayPhase::Value;
                    }
                }
            }
        }
    }
}
