//! Command spec compiler and usage rendering.
//!
//! A spec is a compact per-command grammar: `|` advances to the next argument
//! slot, `,` is an inert separator inside a slot, and single letters set type
//! bits on the current slot:
//!
//! | letter | meaning                    |
//! |--------|----------------------------|
//! | `g`    | greedy (rest of the text)  |
//! | `i`    | integer                    |
//! | `f`    | float                      |
//! | `b`    | boolean                    |
//! | `s`    | string                     |
//! | `l`    | string, forced lowercase   |
//! | `u`    | string, forced uppercase   |
//!
//! Any type letter clears a greedy bit set earlier in the same slot.
//!
//! # Example
//!
//! ```
//! use slcmd_proto::{ArgFlags, CommandSpec};
//!
//! let spec = CommandSpec::compile("i|s,u|g").unwrap();
//! assert_eq!(spec.slot(0), ArgFlags::INTEGER);
//! assert_eq!(spec.slot(1), ArgFlags::STRING | ArgFlags::UPPER);
//! assert_eq!(spec.slot(2), ArgFlags::GREEDY);
//! assert_eq!(spec.slot(3), ArgFlags::ANY);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;
use crate::flags::{ArgFlags, ArgType};
use crate::MAX_SLOTS;

/// Compiled per-slot argument flags together with their source text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandSpec {
    source: String,
    slots: [ArgFlags; MAX_SLOTS],
}

impl CommandSpec {
    /// Compile a spec string. An empty string yields all-`Any` slots.
    pub fn compile(source: &str) -> Result<Self, SpecError> {
        let mut slots = [ArgFlags::ANY; MAX_SLOTS];
        let mut idx = 0;

        for c in source.chars() {
            let typed = match c {
                '|' => {
                    idx += 1;
                    if idx >= MAX_SLOTS {
                        return Err(SpecError::TooManySlots {
                            slot: idx,
                            max: MAX_SLOTS,
                        });
                    }
                    continue;
                }
                'g' => {
                    slots[idx] = ArgFlags::GREEDY;
                    continue;
                }
                'i' => ArgFlags::INTEGER,
                'f' => ArgFlags::FLOAT,
                'b' => ArgFlags::BOOLEAN,
                's' => ArgFlags::STRING,
                'l' => ArgFlags::STRING | ArgFlags::LOWER,
                'u' => ArgFlags::STRING | ArgFlags::UPPER,
                c if c.is_alphabetic() => {
                    return Err(SpecError::UnknownSpecifier {
                        specifier: c,
                        slot: idx,
                    });
                }
                // ',' and anything else that is not a letter is inert
                _ => continue,
            };
            slots[idx].remove(ArgFlags::GREEDY);
            slots[idx].insert(typed);
        }

        let mut greedy = slots.iter().enumerate().filter(|(_, f)| f.is_greedy());
        if let (Some((first, _)), Some((second, _))) = (greedy.next(), greedy.next()) {
            return Err(SpecError::DuplicateGreedy { first, second });
        }

        Ok(Self {
            source: source.to_owned(),
            slots,
        })
    }

    /// The spec text this was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Flags of slot `idx`; slots past the end are `Any`.
    #[inline]
    pub fn slot(&self, idx: usize) -> ArgFlags {
        self.slots.get(idx).copied().unwrap_or(ArgFlags::ANY)
    }

    /// All slot flags.
    #[inline]
    pub fn slots(&self) -> &[ArgFlags; MAX_SLOTS] {
        &self.slots
    }

    /// Index of the greedy slot, if any.
    pub fn greedy_slot(&self) -> Option<usize> {
        self.slots.iter().position(|f| f.is_greedy())
    }

    /// Render a usage string such as `<id:integer> <*name:string> <*...>`.
    ///
    /// Slots at or past `min_args` are marked optional with `*`. With
    /// `full == false` rendering stops at the first slot after which every
    /// slot is untagged `Any`. A greedy slot always ends the rendering.
    pub fn usage<S: AsRef<str>>(
        &self,
        tags: &[S],
        min_args: usize,
        max_args: usize,
        full: bool,
    ) -> String {
        let tag = |idx: usize| tags.get(idx).map_or("", |t| t.as_ref());
        let max_args = max_args.min(MAX_SLOTS);
        let mut parts: Vec<String> = Vec::with_capacity(max_args);

        for arg in 0..max_args {
            if !full && (arg..max_args).all(|i| tag(i).is_empty() && self.slot(i).is_any()) {
                break;
            }

            let flags = self.slot(arg);
            let mut part = String::from("<");
            if arg >= min_args {
                part.push('*');
            }
            if !tag(arg).is_empty() {
                part.push_str(tag(arg));
                part.push(':');
            }

            if flags.is_greedy() {
                part.push_str("...");
            } else if flags.intersection(ArgFlags::TYPES).is_empty() {
                part.push_str("any");
            } else {
                let names: Vec<&str> =
                    [ArgType::Integer, ArgType::Float, ArgType::Boolean, ArgType::String]
                        .into_iter()
                        .filter(|ty| flags.contains(ty.flag()))
                        .map(ArgType::as_str)
                        .collect();
                part.push_str(&names.join(","));
            }
            part.push('>');
            parts.push(part);

            if flags.is_greedy() {
                break;
            }
        }

        parts.join(" ")
    }
}

impl FromStr for CommandSpec {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TAGS: &[&str] = &[];

    #[test]
    fn test_empty_spec_is_any() {
        let spec = CommandSpec::compile("").unwrap();
        assert!(spec.slots().iter().all(|f| f.is_any()));
        assert_eq!(spec.greedy_slot(), None);
    }

    #[test]
    fn test_comma_is_inert() {
        let spec = CommandSpec::compile("i,f|b").unwrap();
        assert_eq!(spec.slot(0), ArgFlags::INTEGER | ArgFlags::FLOAT);
        assert_eq!(spec.slot(1), ArgFlags::BOOLEAN);
    }

    #[test]
    fn test_type_letter_clears_greedy() {
        let spec = CommandSpec::compile("g,i").unwrap();
        assert_eq!(spec.slot(0), ArgFlags::INTEGER);
    }

    #[test]
    fn test_greedy_overrides_earlier_types() {
        let spec = CommandSpec::compile("s|i,g").unwrap();
        assert_eq!(spec.slot(1), ArgFlags::GREEDY);
        assert_eq!(spec.greedy_slot(), Some(1));
    }

    #[test]
    fn test_case_letters() {
        let spec = CommandSpec::compile("l|u").unwrap();
        assert_eq!(spec.slot(0), ArgFlags::STRING | ArgFlags::LOWER);
        assert_eq!(spec.slot(1), ArgFlags::STRING | ArgFlags::UPPER);
    }

    #[test]
    fn test_unknown_specifier() {
        let err = CommandSpec::compile("i|x").unwrap_err();
        assert_eq!(err, SpecError::UnknownSpecifier { specifier: 'x', slot: 1 });
    }

    #[test]
    fn test_too_many_slots() {
        let ok = "|".repeat(MAX_SLOTS - 1);
        assert!(CommandSpec::compile(&ok).is_ok());

        let too_many = "|".repeat(MAX_SLOTS);
        assert_eq!(
            CommandSpec::compile(&too_many).unwrap_err(),
            SpecError::TooManySlots { slot: MAX_SLOTS, max: MAX_SLOTS }
        );
    }

    #[test]
    fn test_duplicate_greedy_rejected() {
        assert_eq!(
            CommandSpec::compile("g|s|g").unwrap_err(),
            SpecError::DuplicateGreedy { first: 0, second: 2 }
        );
    }

    #[test]
    fn test_source_is_kept() {
        let spec: CommandSpec = "i|s,u|g".parse().unwrap();
        assert_eq!(spec.as_str(), "i|s,u|g");
        assert_eq!(spec.to_string(), "i|s,u|g");
    }

    #[test]
    fn test_usage_stops_at_trailing_any() {
        let spec = CommandSpec::compile("i|s").unwrap();
        assert_eq!(spec.usage(NO_TAGS, 1, MAX_SLOTS, false), "<integer> <*string>");
    }

    #[test]
    fn test_usage_with_tags_and_greedy() {
        let spec = CommandSpec::compile("i|u|g").unwrap();
        let tags = ["id", "", "reason"];
        assert_eq!(
            spec.usage(&tags, 2, MAX_SLOTS, false),
            "<id:integer> <string> <*reason:...>"
        );
    }

    #[test]
    fn test_usage_combined_types() {
        let spec = CommandSpec::compile("i,f,b").unwrap();
        assert_eq!(spec.usage(NO_TAGS, 0, 4, false), "<*integer,float,boolean>");
    }

    #[test]
    fn test_usage_full_renders_every_slot() {
        let spec = CommandSpec::compile("i").unwrap();
        assert_eq!(spec.usage(NO_TAGS, 1, 3, true), "<integer> <*any> <*any>");
    }

    #[test]
    fn test_usage_tagged_any_slot() {
        let spec = CommandSpec::compile("").unwrap();
        assert_eq!(spec.usage(&["", "who"], 0, 4, false), "<*any> <*who:any>");
    }

    #[test]
    fn test_usage_is_idempotent() {
        let spec = CommandSpec::compile("b|f|l").unwrap();
        let tags = ["flag", "scale"];
        let first = spec.usage(&tags, 1, 8, false);
        assert_eq!(first, spec.usage(&tags, 1, 8, false));
    }
}
