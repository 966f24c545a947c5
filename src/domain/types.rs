// ==========================================
// AuditGov - Domain type definitions
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Surrogate key assigned by the store on first persistence
pub type EntityId = i64;

// ==========================================
// Entity kind (resolver dimension)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Agency,
    City,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Agency => write!(f, "AGENCY"),
            EntityKind::City => write!(f, "CITY"),
        }
    }
}

// ==========================================
// Import phase (run state machine)
// ==========================================
// Idle -> Reading -> (Parsing -> Resolving -> Persisting)* -> Committing -> Completed | Aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    Idle,
    Reading,
    Parsing,
    Resolving,
    Persisting,
    Committing,
    Completed,
    Aborted,
}

impl ImportPhase {
    /// Terminal phases accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportPhase::Completed | ImportPhase::Aborted)
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportPhase::Idle => "IDLE",
            ImportPhase::Reading => "READING",
            ImportPhase::Parsing => "PARSING",
            ImportPhase::Resolving => "RESOLVING",
            ImportPhase::Persisting => "PERSISTING",
            ImportPhase::Committing => "COMMITTING",
            ImportPhase::Completed => "COMPLETED",
            ImportPhase::Aborted => "ABORTED",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// Skip kind (reason bucket for the summary)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipKind {
    TooFewColumns,
    PersistenceFailed,
}

impl fmt::Display for SkipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipKind::TooFewColumns => write!(f, "too few columns"),
            SkipKind::PersistenceFailed => write!(f, "persistence failed"),
        }
    }
}
