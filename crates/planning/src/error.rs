//! Planning error types.

use common::{DocumentId, ItemId, LookupError};
use thiserror::Error;

/// Errors that can occur during requirement planning.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// A planned or ordered quantity is zero, negative or not a number.
    #[error("Invalid quantity {quantity} for item {item_id} (must be greater than 0)")]
    InvalidQuantity { item_id: ItemId, quantity: f64 },

    /// A production plan has no planned items.
    #[error("Production plan {plan_id} must have at least one item")]
    EmptyPlan { plan_id: DocumentId },

    /// A BOM failed validation on registration, or a stored BOM carries a
    /// negative or non-finite per-unit quantity.
    #[error("Invalid BOM {bom_id}: {reason}")]
    InvalidBom { bom_id: DocumentId, reason: String },

    /// A BOM id was referenced that is not registered.
    #[error("BOM not found: {0}")]
    BomNotFound(DocumentId),

    /// A computed date fell outside the representable calendar.
    #[error("Date out of range for item {item_id}")]
    DateOutOfRange { item_id: ItemId },

    /// The BOM lookup failed.
    #[error("Collaborator error: {0}")]
    Collaborator(#[from] LookupError),
}

impl PlanningError {
    /// Returns true for errors caused by malformed caller input.
    ///
    /// These are never worth retrying. `InvalidBom` is left out because it
    /// can describe data read from the record store.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            PlanningError::InvalidQuantity { .. }
                | PlanningError::EmptyPlan { .. }
                | PlanningError::DateOutOfRange { .. }
        )
    }
}

/// Result type for planning operations.
pub type Result<T> = std::result::Result<T, PlanningError>;
