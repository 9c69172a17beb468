//! Gate evaluation: variable-arity boolean reduction over tri-state inputs.
//!
//! [`evaluate`] is a pure function of a gate's type and the values of its
//! input relations. Any unconnected or `Disabled` input makes the whole gate
//! `Disabled`; otherwise the gate reduces its inputs with the textbook
//! operator for its type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::state::State;

/// Smallest input count of a multi-input gate.
pub const MIN_GATE_INPUTS: usize = 2;
/// Largest input count of a multi-input gate.
pub const MAX_GATE_INPUTS: usize = 32;

/// The boolean function a gate computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
    Not,
}

impl GateType {
    pub const ALL: [GateType; 7] = [
        GateType::And,
        GateType::Or,
        GateType::Nand,
        GateType::Nor,
        GateType::Xor,
        GateType::Xnor,
        GateType::Not,
    ];

    /// Clamps a requested input count to the arity this gate type allows.
    ///
    /// NOT always has exactly one input.
    pub fn clamp_inputs(self, requested: usize) -> usize {
        match self {
            GateType::Not => 1,
            _ => requested.clamp(MIN_GATE_INPUTS, MAX_GATE_INPUTS),
        }
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            GateType::And => 0,
            GateType::Or => 1,
            GateType::Nand => 2,
            GateType::Nor => 3,
            GateType::Xor => 4,
            GateType::Xnor => 5,
            GateType::Not => 6,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        GateType::ALL.get(tag as usize).copied()
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Nand => "NAND",
            GateType::Nor => "NOR",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
            GateType::Not => "NOT",
        };
        f.write_str(s)
    }
}

impl FromStr for GateType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GateType::ALL
            .iter()
            .copied()
            .find(|g| g.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::invalid_argument(format!("unknown gate type '{s}'")))
    }
}

/// Evaluates a gate of type `gate_type` over its input values.
///
/// `inputs` holds one entry per input socket; an unconnected socket must be
/// passed as `State::Disabled`.
pub fn evaluate<I>(gate_type: GateType, inputs: I) -> State
where
    I: IntoIterator<Item = State>,
{
    let mut count = 0usize;
    let mut ones = 0usize;
    for value in inputs {
        match value.as_bool() {
            Some(bit) => {
                count += 1;
                ones += usize::from(bit);
            }
            None => return State::Disabled,
        }
    }
    if count == 0 {
        return State::Disabled;
    }

    let result = match gate_type {
        GateType::Not => ones == 0,
        GateType::And => ones == count,
        GateType::Nand => ones != count,
        GateType::Or => ones > 0,
        GateType::Nor => ones == 0,
        GateType::Xor => ones % 2 == 1,
        GateType::Xnor => ones % 2 == 0,
    };
    State::from(result)
}
