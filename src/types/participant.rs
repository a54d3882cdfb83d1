//! Participant types for the expense settlement engine

use serde::{Deserialize, Serialize};

/// Participant identifier
///
/// Stable across recomputations. Also the canonical tie-break order
/// used by the settlement matcher.
pub type ParticipantId = u32;

/// Someone who pays for or shares in expenses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique, stable identifier
    pub id: ParticipantId,

    /// Display label, only used when rendering output
    pub name: String,
}

impl Participant {
    /// Create a participant with a display name
    pub fn new(id: ParticipantId, name: impl Into<String>) -> Self {
        Participant {
            id,
            name: name.into(),
        }
    }

    /// Create a participant whose display name is its id
    ///
    /// Used when the participant set is implied by the expense records
    /// instead of being supplied explicitly.
    pub fn unnamed(id: ParticipantId) -> Self {
        Participant {
            id,
            name: id.to_string(),
        }
    }
}
