use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of one of the five research phases run by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseId {
    Flights,
    Hotels,
    Transport,
    Rules,
    Itinerary,
}

impl PhaseId {
    /// All phase ids in catalog order.
    pub const ALL: [PhaseId; 5] = [
        PhaseId::Flights,
        PhaseId::Hotels,
        PhaseId::Transport,
        PhaseId::Rules,
        PhaseId::Itinerary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PhaseId::Flights => "flights",
            PhaseId::Hotels => "hotels",
            PhaseId::Transport => "transport",
            PhaseId::Rules => "rules",
            PhaseId::Itinerary => "itinerary",
        }
    }

    /// Position of the phase in the catalog.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase id {:?}", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for PhaseId {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// Static description of a research phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    pub id: PhaseId,
    pub title: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// The phase catalog, in display order. The first entry is the default-active phase.
pub static PHASES: [Phase; 5] = [
    Phase {
        id: PhaseId::Flights,
        title: "Flights & Travel Options",
        icon: "\u{2708}\u{fe0f}",
        color: "#22d3ee",
    },
    Phase {
        id: PhaseId::Hotels,
        title: "Hotels & Accommodation",
        icon: "\u{1f3e8}",
        color: "#facc15",
    },
    Phase {
        id: PhaseId::Transport,
        title: "Local Transport & Rentals",
        icon: "\u{1f697}",
        color: "#4ade80",
    },
    Phase {
        id: PhaseId::Rules,
        title: "Rules, Laws & Customs",
        icon: "\u{2696}\u{fe0f}",
        color: "#f87171",
    },
    Phase {
        id: PhaseId::Itinerary,
        title: "Day-by-Day Itinerary",
        icon: "\u{1f5d3}\u{fe0f}",
        color: "#c084fc",
    },
];

pub fn phase(id: PhaseId) -> &'static Phase {
    &PHASES[id.index()]
}

pub fn default_phase() -> PhaseId {
    PHASES[0].id
}
