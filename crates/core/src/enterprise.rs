//! Enterprise (business unit) vocabulary.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A manufacturing business unit.
///
/// Enterprise A and B are discrete manufacturing sites measured with OEE;
/// Enterprise C runs ISA-88 batch processing and is analyzed with batch
/// terminology instead of OEE.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Enterprise {
    #[serde(rename = "Enterprise A")]
    A,
    #[serde(rename = "Enterprise B")]
    B,
    #[serde(rename = "Enterprise C")]
    C,
}

impl Enterprise {
    pub const ALL: [Enterprise; 3] = [Enterprise::A, Enterprise::B, Enterprise::C];

    /// Enterprise C uses batch processing (ISA-88), not OEE.
    pub fn uses_batch_processing(&self) -> bool {
        matches!(self, Enterprise::C)
    }
}

impl core::fmt::Display for Enterprise {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Enterprise::A => write!(f, "Enterprise A"),
            Enterprise::B => write!(f, "Enterprise B"),
            Enterprise::C => write!(f, "Enterprise C"),
        }
    }
}

impl FromStr for Enterprise {
    type Err = DomainError;

    /// Lenient parse: accepts `"Enterprise A"`, `"enterprise_a"`, or `"A"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', " ");
        match normalized.as_str() {
            "enterprise a" | "a" => Ok(Enterprise::A),
            "enterprise b" | "b" => Ok(Enterprise::B),
            "enterprise c" | "c" => Ok(Enterprise::C),
            _ => Err(DomainError::unknown_label(format!("enterprise: {s}"))),
        }
    }
}

/// Focus slot for a comprehensive analysis cycle.
///
/// The rotation advances by exactly one slot per comprehensive cycle, so every
/// business unit (and the cross-enterprise comparison) receives deep-dive
/// attention over repeated cycles without per-cycle heuristics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnterpriseFocus {
    Single(Enterprise),
    CrossEnterprise,
}

impl EnterpriseFocus {
    pub const ROTATION: [EnterpriseFocus; 4] = [
        EnterpriseFocus::Single(Enterprise::A),
        EnterpriseFocus::Single(Enterprise::B),
        EnterpriseFocus::Single(Enterprise::C),
        EnterpriseFocus::CrossEnterprise,
    ];

    /// The slot following `self` in the fixed rotation.
    pub fn next(&self) -> EnterpriseFocus {
        let idx = Self::ROTATION
            .iter()
            .position(|f| f == self)
            .unwrap_or(Self::ROTATION.len() - 1);
        Self::ROTATION[(idx + 1) % Self::ROTATION.len()]
    }
}

impl core::fmt::Display for EnterpriseFocus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EnterpriseFocus::Single(e) => core::fmt::Display::fmt(e, f),
            EnterpriseFocus::CrossEnterprise => write!(f, "cross-enterprise comparison"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_visits_every_slot() {
        let mut focus = EnterpriseFocus::Single(Enterprise::A);
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(focus);
            focus = focus.next();
        }
        assert_eq!(seen, EnterpriseFocus::ROTATION.to_vec());
        // Wraps back to the first slot.
        assert_eq!(focus, EnterpriseFocus::Single(Enterprise::A));
    }

    #[test]
    fn lenient_enterprise_parse() {
        assert_eq!("Enterprise B".parse::<Enterprise>().unwrap(), Enterprise::B);
        assert_eq!("enterprise_c".parse::<Enterprise>().unwrap(), Enterprise::C);
        assert_eq!("a".parse::<Enterprise>().unwrap(), Enterprise::A);
        assert!("Enterprise D".parse::<Enterprise>().is_err());
    }
}
