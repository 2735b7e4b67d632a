//! Per-slot argument flags and argument type tags.

use std::fmt;

bitflags::bitflags! {
    /// Type and transformation flags of one argument slot.
    ///
    /// An empty set means "any": the slot accepts whatever the tokenizer sniffs.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArgFlags: u8 {
        /// Accepts a whole-token base-10 integer.
        const INTEGER       = 1 << 0;
        /// Accepts a whole-token floating point number.
        const FLOAT         = 1 << 1;
        /// Accepts `true`/`on`/`false`/`off`, case-insensitively.
        const BOOLEAN       = 1 << 2;
        /// Accepts a string.
        const STRING        = 1 << 3;
        /// Lowercase string values.
        const LOWER         = 1 << 4;
        /// Uppercase string values.
        const UPPER         = 1 << 5;
        /// Capture the rest of the text verbatim; ends parsing.
        const GREEDY        = 1 << 6;
    }
}

impl ArgFlags {
    /// No type restriction.
    pub const ANY: Self = Self::empty();

    /// The bits that select a value type.
    pub const TYPES: Self = Self::INTEGER
        .union(Self::FLOAT)
        .union(Self::BOOLEAN)
        .union(Self::STRING);

    /// Returns true if the slot has no flags at all.
    #[inline]
    pub fn is_any(self) -> bool {
        self.is_empty()
    }

    /// Returns true if the slot captures the remaining text.
    #[inline]
    pub fn is_greedy(self) -> bool {
        self.contains(Self::GREEDY)
    }

    /// Whether a parsed argument of type `ty` may occupy this slot.
    ///
    /// Any accepts everything, a matching type bit accepts its type, and a
    /// greedy slot accepts strings.
    pub fn accepts(self, ty: ArgType) -> bool {
        self.is_any()
            || self.intersects(ty.flag())
            || (self.is_greedy() && ty == ArgType::String)
    }
}

/// The declared type of a parsed argument value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgType {
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Boolean.
    Boolean,
    /// String.
    String,
}

impl ArgType {
    /// The slot flag corresponding to this type.
    pub fn flag(self) -> ArgFlags {
        match self {
            Self::Integer => ArgFlags::INTEGER,
            Self::Float => ArgFlags::FLOAT,
            Self::Boolean => ArgFlags::BOOLEAN,
            Self::String => ArgFlags::STRING,
        }
    }

    /// Lowercase type name as used in usage strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        for ty in [ArgType::Integer, ArgType::Float, ArgType::Boolean, ArgType::String] {
            assert!(ArgFlags::ANY.accepts(ty));
        }
    }

    #[test]
    fn test_exact_bit_match() {
        let flags = ArgFlags::INTEGER | ArgFlags::FLOAT;
        assert!(flags.accepts(ArgType::Integer));
        assert!(flags.accepts(ArgType::Float));
        assert!(!flags.accepts(ArgType::String));
        assert!(!flags.accepts(ArgType::Boolean));
    }

    #[test]
    fn test_greedy_accepts_string_only() {
        assert!(ArgFlags::GREEDY.accepts(ArgType::String));
        assert!(!ArgFlags::GREEDY.accepts(ArgType::Integer));
    }

    #[test]
    fn test_case_folding_slot_is_still_string() {
        let lower = ArgFlags::STRING | ArgFlags::LOWER;
        assert!(lower.accepts(ArgType::String));
        assert!(!lower.accepts(ArgType::Boolean));
    }
}
