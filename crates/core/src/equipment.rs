//! Equipment state vocabulary.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Live state of a piece of equipment, as reported by the factory backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EquipmentState {
    Running,
    Idle,
    Down,
    Fault,
}

impl EquipmentState {
    /// Whether entering (or leaving) this state is worth reporting.
    ///
    /// RUNNING→RUNNING transitions carry no signal; anything touching a
    /// concerning state does.
    pub fn is_concerning(&self) -> bool {
        matches!(self, EquipmentState::Idle | EquipmentState::Down | EquipmentState::Fault)
    }
}

impl core::fmt::Display for EquipmentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            EquipmentState::Running => "RUNNING",
            EquipmentState::Idle => "IDLE",
            EquipmentState::Down => "DOWN",
            EquipmentState::Fault => "FAULT",
        };
        f.write_str(s)
    }
}

impl FromStr for EquipmentState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(EquipmentState::Running),
            "IDLE" => Ok(EquipmentState::Idle),
            "DOWN" => Ok(EquipmentState::Down),
            "FAULT" => Ok(EquipmentState::Fault),
            _ => Err(DomainError::unknown_label(format!("equipment state: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_is_not_concerning() {
        assert!(!EquipmentState::Running.is_concerning());
        assert!(EquipmentState::Idle.is_concerning());
        assert!(EquipmentState::Down.is_concerning());
        assert!(EquipmentState::Fault.is_concerning());
    }
}
