//! The tri-state signal value carried by nodes and relations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A signal value: driven true, driven false, or not driven at all.
///
/// `Disabled` dominates evaluation: a node missing a driven input reports
/// `Disabled` regardless of its other inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    False,
    True,
    #[default]
    Disabled,
}

impl State {
    /// Returns `Some(bool)` for a driven value, `None` for `Disabled`.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            State::True => Some(true),
            State::False => Some(false),
            State::Disabled => None,
        }
    }

    pub fn is_disabled(self) -> bool {
        self == State::Disabled
    }

    /// Bit value used when packing boundary outputs; `Disabled` reads as 0.
    pub fn bit(self) -> u64 {
        u64::from(self == State::True)
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            State::False => 0,
            State::True => 1,
            State::Disabled => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(State::False),
            1 => Some(State::True),
            2 => Some(State::Disabled),
            _ => None,
        }
    }
}

impl From<bool> for State {
    fn from(value: bool) -> Self {
        if value {
            State::True
        } else {
            State::False
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            State::False => "FALSE",
            State::True => "TRUE",
            State::Disabled => "DISABLED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_conversion() {
        assert_eq!(State::from(true), State::True);
        assert_eq!(State::from(false), State::False);
        assert_eq!(State::True.as_bool(), Some(true));
        assert_eq!(State::Disabled.as_bool(), None);
    }

    #[test]
    fn disabled_packs_as_zero() {
        assert_eq!(State::True.bit(), 1);
        assert_eq!(State::False.bit(), 0);
        assert_eq!(State::Disabled.bit(), 0);
    }
}
