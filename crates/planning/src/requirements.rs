//! Material requirement aggregation.
//!
//! Explodes planned production through one BOM level and merges the
//! resulting component demand into one line per component.

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{EngineConfig, ItemId, Quantity, Warehouse};
use serde::{Deserialize, Serialize};

use crate::bom::BomLookup;
use crate::error::{PlanningError, Result};

/// A quantity of one item scheduled for production.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedItem {
    pub item_id: ItemId,
    pub planned_quantity: Quantity,
    pub planned_start_date: Option<NaiveDate>,
}

impl PlannedItem {
    /// Creates a planned item without a start date.
    pub fn new(item_id: impl Into<ItemId>, planned_quantity: f64) -> Self {
        Self {
            item_id: item_id.into(),
            planned_quantity: Quantity::new(planned_quantity),
            planned_start_date: None,
        }
    }

    /// Sets the planned start date.
    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.planned_start_date = Some(date);
        self
    }
}

/// Total demand for one component across an aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementLine {
    pub item_id: ItemId,
    pub total_quantity: Quantity,
    pub warehouse: Warehouse,
}

/// Aggregates component requirements with the default configuration.
///
/// See [`aggregate_with_config`].
pub fn aggregate<L>(planned_items: &[PlannedItem], bom_lookup: &L) -> Result<Vec<RequirementLine>>
where
    L: BomLookup + ?Sized,
{
    aggregate_with_config(planned_items, bom_lookup, &EngineConfig::default())
}

/// Explodes each planned item through its default BOM and merges the demand.
///
/// Every planned quantity is checked before the first lookup, so a bad input
/// fails without touching the record store. Items without a default BOM are
/// skipped. Lines come out in order of first occurrence of each component.
#[tracing::instrument(skip_all, fields(planned_items = planned_items.len()))]
pub fn aggregate_with_config<L>(
    planned_items: &[PlannedItem],
    bom_lookup: &L,
    config: &EngineConfig,
) -> Result<Vec<RequirementLine>>
where
    L: BomLookup + ?Sized,
{
    validate_quantities(planned_items)?;
    metrics::counter!("mrp_aggregations_total").increment(1);

    let mut lines: Vec<RequirementLine> = Vec::new();
    let mut index: HashMap<ItemId, usize> = HashMap::new();

    for planned in planned_items {
        let Some(bom) = bom_lookup.default_bom(&planned.item_id)? else {
            tracing::debug!(item_id = %planned.item_id, "no default BOM, skipping");
            continue;
        };
        bom.check_explodable()?;

        for line in &bom.lines {
            let required = line.quantity_per_unit * planned.planned_quantity;
            match index.get(&line.component_item_id) {
                Some(&pos) => lines[pos].total_quantity += required,
                None => {
                    index.insert(line.component_item_id.clone(), lines.len());
                    lines.push(RequirementLine {
                        item_id: line.component_item_id.clone(),
                        total_quantity: required,
                        warehouse: config.default_warehouse.clone(),
                    });
                }
            }
        }
    }

    metrics::histogram!("mrp_requirement_lines").record(lines.len() as f64);
    tracing::info!(requirement_lines = lines.len(), "aggregation complete");

    Ok(lines)
}

pub(crate) fn validate_quantities(planned_items: &[PlannedItem]) -> Result<()> {
    match planned_items
        .iter()
        .find(|p| !p.planned_quantity.is_positive())
    {
        Some(bad) => Err(PlanningError::InvalidQuantity {
            item_id: bad.item_id.clone(),
            quantity: bad.planned_quantity.value(),
        }),
        None => Ok(()),
    }
}
