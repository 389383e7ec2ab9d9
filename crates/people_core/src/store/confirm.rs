//! Delete confirmation sub-state.

use crate::model::person::PersonId;

/// At most one record can await delete confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeleteConfirmation {
    #[default]
    Idle,
    PendingConfirmation(PersonId),
}

impl DeleteConfirmation {
    pub fn pending_id(&self) -> Option<&PersonId> {
        match self {
            Self::Idle => None,
            Self::PendingConfirmation(id) => Some(id),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingConfirmation(_))
    }
}
