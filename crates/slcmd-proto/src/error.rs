//! Error types for spec compilation and argument tokenizing.

use thiserror::Error;

/// Errors produced while compiling a command spec string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SpecError {
    /// A letter that does not name any argument type.
    #[error("unknown type specifier ({specifier}) at argument: {slot}")]
    UnknownSpecifier {
        /// The offending character.
        specifier: char,
        /// Slot the character was found in.
        slot: usize,
    },

    /// More `|` separators than there are argument slots.
    #[error("extraneous type specifiers: {slot} >= {max}")]
    TooManySlots {
        /// Slot index the separator would have opened.
        slot: usize,
        /// Maximum number of slots.
        max: usize,
    },

    /// More than one slot was marked greedy.
    #[error("greedy argument at slot {second} follows greedy argument at slot {first}")]
    DuplicateGreedy {
        /// First greedy slot.
        first: usize,
        /// Second greedy slot.
        second: usize,
    },
}

/// The scratch buffer refused a byte because its limit was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scratch buffer limit of {limit} bytes exceeded")]
pub struct BufferOverflow {
    /// Limit the buffer was adjusted to.
    pub limit: usize,
}

/// Fatal tokenizer failures, attributed to the slot being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quoted argument reached the end of the text without its closing quote.
    #[error("string argument not closed properly at argument: {slot}")]
    UnterminatedString {
        /// Slot of the unterminated string.
        slot: usize,
    },

    /// The scratch buffer was exhausted while staging a string.
    #[error("command buffer was exceeded unexpectedly at argument: {slot}")]
    BufferOverflow {
        /// Slot being extracted.
        slot: usize,
        /// Limit of the buffer.
        limit: usize,
    },
}

impl ParseError {
    /// Slot index the failure is attributed to.
    pub fn slot(&self) -> usize {
        match self {
            Self::UnterminatedString { slot } | Self::BufferOverflow { slot, .. } => *slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_slot() {
        assert_eq!(ParseError::UnterminatedString { slot: 3 }.slot(), 3);
        assert_eq!(ParseError::BufferOverflow { slot: 1, limit: 8 }.slot(), 1);
    }

    #[test]
    fn test_spec_error_message_names_specifier() {
        let err = SpecError::UnknownSpecifier { specifier: 'x', slot: 2 };
        assert_eq!(err.to_string(), "unknown type specifier (x) at argument: 2");
    }
}
