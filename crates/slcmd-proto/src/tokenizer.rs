//! Argument tokenizer.
//!
//! Consumes argument text strictly left to right, one slot at a time:
//!
//! 1. Leading whitespace is skipped.
//! 2. A greedy slot takes the rest of the text verbatim as one string and
//!    ends parsing.
//! 3. A token opening with `'` or `"` runs until the same quote reappears
//!    unescaped. `\` before the closing quote character makes it literal and
//!    is itself dropped. Quoted tokens are always strings.
//! 4. Any other token runs up to the next whitespace and is interpreted as
//!    integer, float, boolean or string, in that order, trying only the
//!    types enabled on the slot and only accepting whole-token matches.

use crate::error::ParseError;
use crate::flags::ArgFlags;
use crate::scratch::ScratchBuffer;
use crate::spec::CommandSpec;
use crate::value::Value;

/// Longest token that can still be read as a boolean.
const MAX_BOOLEAN_LEN: usize = 5;

/// Result of tokenizing a complete argument text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tokens {
    /// Decoded arguments in slot order.
    pub args: Vec<Value>,
    /// Non-whitespace text was left over after the argument limit was reached.
    pub truncated: bool,
}

impl Tokens {
    /// Number of decoded arguments.
    #[inline]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if no argument was decoded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Cursor over argument text that extracts one slot value at a time.
pub struct Tokenizer<'a, 'b> {
    text: &'a str,
    pos: usize,
    scratch: &'b mut ScratchBuffer,
}

impl<'a, 'b> Tokenizer<'a, 'b> {
    /// Create a tokenizer over `text`, sizing `scratch` to fit all of it.
    pub fn new(text: &'a str, scratch: &'b mut ScratchBuffer) -> Self {
        scratch.adjust(text.len());
        Self {
            text,
            pos: 0,
            scratch,
        }
    }

    /// Text not consumed yet.
    #[inline]
    pub fn remainder(&self) -> &'a str {
        &self.text[self.pos..]
    }

    /// Skip whitespace and report whether any text is left.
    pub fn has_more(&mut self) -> bool {
        self.skip_whitespace();
        self.pos < self.text.len()
    }

    /// Extract the value for one slot.
    ///
    /// Returns `Ok(None)` once the text is exhausted.
    pub fn next_value(&mut self, flags: ArgFlags, slot: usize) -> Result<Option<Value>, ParseError> {
        if !self.has_more() {
            return Ok(None);
        }

        if flags.is_greedy() {
            let rest = self.remainder();
            self.pos = self.text.len();
            return Ok(Some(Value::String(rest.to_owned())));
        }

        let value = match self.text.as_bytes()[self.pos] {
            quote @ (b'\'' | b'"') => self.quoted(quote, flags, slot)?,
            _ => self.bare(flags, slot)?,
        };
        Ok(Some(value))
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn quoted(&mut self, quote: u8, flags: ArgFlags, slot: usize) -> Result<Value, ParseError> {
        let bytes = self.text.as_bytes();
        let overflow = |e: crate::error::BufferOverflow| ParseError::BufferOverflow {
            slot,
            limit: e.limit,
        };

        self.scratch.clear();
        let mut prev = quote;
        let mut pos = self.pos + 1;

        loop {
            let Some(&elem) = bytes.get(pos) else {
                self.scratch.clear();
                return Err(ParseError::UnterminatedString { slot });
            };
            pos += 1;

            if elem == quote {
                if prev != b'\\' {
                    break;
                }
                // escaped quote: replace the staged backslash
                self.scratch.pop();
            }
            self.scratch.push(elem).map_err(overflow)?;
            prev = elem;
        }

        self.pos = pos;
        fold_case(self.scratch, flags);
        Ok(Value::String(self.scratch.take_string()))
    }

    fn bare(&mut self, flags: ArgFlags, slot: usize) -> Result<Value, ParseError> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        let end = bytes[start..]
            .iter()
            .position(|b| b.is_ascii_whitespace())
            .map_or(bytes.len(), |n| start + n);
        self.pos = end;

        let token = &self.text[start..end];
        if let Some(value) = sniff(token, flags) {
            return Ok(value);
        }

        if flags.intersects(ArgFlags::LOWER | ArgFlags::UPPER) {
            self.scratch.clear();
            self.scratch
                .extend(token.as_bytes())
                .map_err(|e| ParseError::BufferOverflow { slot, limit: e.limit })?;
            fold_case(self.scratch, flags);
            return Ok(Value::String(self.scratch.take_string()));
        }
        Ok(Value::String(token.to_owned()))
    }
}

/// Try the non-string interpretations enabled on the slot, in priority order.
fn sniff(token: &str, flags: ArgFlags) -> Option<Value> {
    if flags.contains(ArgFlags::INTEGER) {
        if let Ok(n) = token.parse::<i64>() {
            return Some(Value::Integer(n));
        }
    }
    if flags.contains(ArgFlags::FLOAT) {
        if let Ok(x) = token.parse::<f64>() {
            return Some(Value::Float(x));
        }
    }
    if flags.contains(ArgFlags::BOOLEAN) && token.len() <= MAX_BOOLEAN_LEN {
        if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("on") {
            return Some(Value::Boolean(true));
        }
        if token.eq_ignore_ascii_case("false") || token.eq_ignore_ascii_case("off") {
            return Some(Value::Boolean(false));
        }
    }
    None
}

fn fold_case(scratch: &mut ScratchBuffer, flags: ArgFlags) {
    if flags.contains(ArgFlags::LOWER) {
        scratch.make_lowercase();
    } else if flags.contains(ArgFlags::UPPER) {
        scratch.make_uppercase();
    }
}

/// Tokenize `text` against `spec`, producing at most `max_args` values.
///
/// Parsing stops when the text is exhausted, after a greedy slot, or once
/// `max_args` values exist. In the last case [`Tokens::truncated`] reports
/// whether anything but whitespace was left behind.
pub fn tokenize(
    text: &str,
    spec: &CommandSpec,
    max_args: usize,
    scratch: &mut ScratchBuffer,
) -> Result<Tokens, ParseError> {
    let mut tokenizer = Tokenizer::new(text, scratch);
    let mut tokens = Tokens::default();

    while tokenizer.has_more() {
        if tokens.args.len() >= max_args {
            tokens.truncated = true;
            break;
        }
        let slot = tokens.args.len();
        let flags = spec.slot(slot);
        match tokenizer.next_value(flags, slot)? {
            Some(value) => tokens.args.push(value),
            None => break,
        }
        if flags.is_greedy() {
            break;
        }
    }

    tokenizer.scratch.clear();
    Ok(tokens)
}
