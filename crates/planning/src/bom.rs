//! Bills of materials and the default-BOM lookup.

use std::collections::HashMap;

use common::{DocumentId, ItemId, LookupError, Quantity};
use serde::{Deserialize, Serialize};

use crate::error::{PlanningError, Result};

/// One component line of a BOM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLine {
    /// The component consumed.
    pub component_item_id: ItemId,

    /// Component quantity needed to make one unit of the parent item.
    pub quantity_per_unit: Quantity,

    /// Unit of measure of `quantity_per_unit`.
    pub unit_of_measure: String,
}

impl BomLine {
    /// Creates a new BOM line.
    pub fn new(
        component_item_id: impl Into<ItemId>,
        quantity_per_unit: f64,
        unit_of_measure: impl Into<String>,
    ) -> Self {
        Self {
            component_item_id: component_item_id.into(),
            quantity_per_unit: Quantity::new(quantity_per_unit),
            unit_of_measure: unit_of_measure.into(),
        }
    }
}

/// A bill of materials: the single-level recipe for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bom {
    pub bom_id: DocumentId,
    pub item_id: ItemId,
    pub is_default: bool,
    pub lines: Vec<BomLine>,
}

impl Bom {
    /// Creates a non-default BOM with no lines.
    pub fn new(bom_id: impl Into<DocumentId>, item_id: impl Into<ItemId>) -> Self {
        Self {
            bom_id: bom_id.into(),
            item_id: item_id.into(),
            is_default: false,
            lines: Vec::new(),
        }
    }

    /// Marks this BOM as the item's default.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Appends a component line.
    pub fn with_line(mut self, line: BomLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Checks the BOM is usable for explosion.
    ///
    /// A BOM needs at least one line, every per-unit quantity must be
    /// positive and no line may consume the BOM's own item.
    pub fn validate(&self) -> Result<()> {
        if self.lines.is_empty() {
            return Err(self.invalid("BOM must have at least one item"));
        }

        for line in &self.lines {
            if !line.quantity_per_unit.is_positive() {
                return Err(self.invalid(format!(
                    "component {} has non-positive quantity {}",
                    line.component_item_id, line.quantity_per_unit
                )));
            }
            if line.component_item_id == self.item_id {
                return Err(self.invalid(format!(
                    "component {} is the BOM's own item",
                    line.component_item_id
                )));
            }
        }

        Ok(())
    }

    /// Checks a stored BOM can be exploded without producing negative or
    /// non-finite demand.
    ///
    /// Looser than [`Bom::validate`]: a BOM without lines contributes nothing
    /// and a zero per-unit line contributes zero.
    pub fn check_explodable(&self) -> Result<()> {
        match self.lines.iter().find(|line| {
            let qty = line.quantity_per_unit;
            !qty.is_finite() || qty.value() < 0.0
        }) {
            Some(line) => Err(self.invalid(format!(
                "component {} has unusable quantity {}",
                line.component_item_id, line.quantity_per_unit
            ))),
            None => Ok(()),
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> PlanningError {
        PlanningError::InvalidBom {
            bom_id: self.bom_id.clone(),
            reason: reason.into(),
        }
    }
}

/// Resolves the default BOM of an item.
///
/// `Ok(None)` means the item is not manufactured from components (it is
/// bought, or simply has no BOM yet). Errors are reserved for the record
/// store itself failing.
pub trait BomLookup {
    fn default_bom(&self, item_id: &ItemId) -> std::result::Result<Option<Bom>, LookupError>;
}

impl<F> BomLookup for F
where
    F: Fn(&ItemId) -> std::result::Result<Option<Bom>, LookupError>,
{
    fn default_bom(&self, item_id: &ItemId) -> std::result::Result<Option<Bom>, LookupError> {
        self(item_id)
    }
}

/// In-memory BOM register.
///
/// Keeps at most one default BOM per item: registering a default BOM clears
/// the flag on the item's previous default.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBomRegistry {
    boms: HashMap<DocumentId, Bom>,
    defaults: HashMap<ItemId, DocumentId>,
}

impl InMemoryBomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a BOM, replacing any BOM with the same id.
    pub fn register(&mut self, bom: Bom) -> Result<()> {
        bom.validate()?;

        if let Some(previous) = self.boms.remove(&bom.bom_id)
            && self.defaults.get(&previous.item_id) == Some(&previous.bom_id)
        {
            self.defaults.remove(&previous.item_id);
        }

        let bom_id = bom.bom_id.clone();
        let item_id = bom.item_id.clone();
        let is_default = bom.is_default;
        self.boms.insert(bom_id.clone(), bom);

        if is_default {
            self.promote(item_id, bom_id);
        }

        Ok(())
    }

    /// Makes a registered BOM the default for its item.
    pub fn set_default(&mut self, bom_id: &DocumentId) -> Result<()> {
        let item_id = self
            .boms
            .get(bom_id)
            .map(|bom| bom.item_id.clone())
            .ok_or_else(|| PlanningError::BomNotFound(bom_id.clone()))?;

        self.promote(item_id, bom_id.clone());
        Ok(())
    }

    /// Returns a registered BOM by id.
    pub fn get(&self, bom_id: &DocumentId) -> Option<&Bom> {
        self.boms.get(bom_id)
    }

    /// Returns the number of registered BOMs.
    pub fn len(&self) -> usize {
        self.boms.len()
    }

    /// Returns true if no BOM is registered.
    pub fn is_empty(&self) -> bool {
        self.boms.is_empty()
    }

    fn promote(&mut self, item_id: ItemId, bom_id: DocumentId) {
        if let Some(old_id) = self.defaults.insert(item_id, bom_id.clone())
            && old_id != bom_id
            && let Some(old) = self.boms.get_mut(&old_id)
        {
            old.is_default = false;
        }
        if let Some(bom) = self.boms.get_mut(&bom_id) {
            bom.is_default = true;
        }
    }
}

impl BomLookup for InMemoryBomRegistry {
    fn default_bom(&self, item_id: &ItemId) -> std::result::Result<Option<Bom>, LookupError> {
        Ok(self
            .defaults
            .get(item_id)
            .and_then(|bom_id| self.boms.get(bom_id))
            .cloned())
    }
}
