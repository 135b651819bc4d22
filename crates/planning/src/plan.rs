//! Production plans and the work orders drafted from them.

use chrono::{NaiveDate, TimeDelta};
use common::{ActorId, DocumentId, EngineConfig, ItemId, Quantity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bom::BomLookup;
use crate::error::{PlanningError, Result};
use crate::requirements::{self, PlannedItem, RequirementLine};

/// A set of items to produce, optionally raised from a sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionPlan {
    pub plan_id: DocumentId,
    pub posting_date: NaiveDate,
    pub sales_order: Option<DocumentId>,
    pub items: Vec<PlannedItem>,
}

/// A line of a submitted sales order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrderLine {
    pub item_id: ItemId,
    pub quantity: Quantity,
}

/// The parts of a submitted sales order that planning reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub order_id: DocumentId,
    pub transaction_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub lines: Vec<SalesOrderLine>,
}

/// An unsaved work order produced from a plan line.
///
/// Drafts are returned to the caller; persisting them is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrderDraft {
    pub work_order_id: Uuid,
    pub production_item: ItemId,
    pub bom_id: DocumentId,
    pub quantity: Quantity,
    pub production_plan: DocumentId,
    pub planned_start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub created_by: ActorId,
}

impl ProductionPlan {
    /// Creates an empty plan.
    pub fn new(plan_id: impl Into<DocumentId>, posting_date: NaiveDate) -> Self {
        Self {
            plan_id: plan_id.into(),
            posting_date,
            sales_order: None,
            items: Vec::new(),
        }
    }

    /// Appends a planned item.
    pub fn with_item(mut self, item: PlannedItem) -> Self {
        self.items.push(item);
        self
    }

    /// Checks the plan has items and every planned quantity is positive.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(PlanningError::EmptyPlan {
                plan_id: self.plan_id.clone(),
            });
        }
        requirements::validate_quantities(&self.items)
    }

    /// Computes the raw material demand of the whole plan.
    pub fn material_requirements<L>(
        &self,
        bom_lookup: &L,
        config: &EngineConfig,
    ) -> Result<Vec<RequirementLine>>
    where
        L: BomLookup + ?Sized,
    {
        self.validate()?;
        requirements::aggregate_with_config(&self.items, bom_lookup, config)
    }

    /// Drafts one work order per planned item that has a default BOM.
    ///
    /// The planned start falls back to the plan's posting date; the planned
    /// end is the start plus the configured lead time.
    #[tracing::instrument(skip(self, bom_lookup, config), fields(plan_id = %self.plan_id))]
    pub fn draft_work_orders<L>(
        &self,
        bom_lookup: &L,
        actor_id: &ActorId,
        config: &EngineConfig,
    ) -> Result<Vec<WorkOrderDraft>>
    where
        L: BomLookup + ?Sized,
    {
        self.validate()?;

        let mut drafts = Vec::new();
        for item in &self.items {
            let Some(bom) = bom_lookup.default_bom(&item.item_id)? else {
                tracing::debug!(item_id = %item.item_id, "no default BOM, no work order");
                continue;
            };

            let start = item.planned_start_date.unwrap_or(self.posting_date);
            let end = TimeDelta::try_days(i64::from(config.work_order_lead_days))
                .and_then(|lead| start.checked_add_signed(lead))
                .ok_or_else(|| PlanningError::DateOutOfRange {
                    item_id: item.item_id.clone(),
                })?;

            drafts.push(WorkOrderDraft {
                work_order_id: Uuid::new_v4(),
                production_item: item.item_id.clone(),
                bom_id: bom.bom_id,
                quantity: item.planned_quantity,
                production_plan: self.plan_id.clone(),
                planned_start_date: start,
                planned_end_date: end,
                created_by: actor_id.clone(),
            });
        }

        tracing::info!(work_orders = drafts.len(), "work orders drafted");
        Ok(drafts)
    }

    /// Builds a plan from the sales order lines whose item has a default BOM.
    ///
    /// Returns `Ok(None)` when no line is manufactured in-house.
    pub fn from_sales_order<L>(
        plan_id: impl Into<DocumentId>,
        order: &SalesOrder,
        bom_lookup: &L,
    ) -> Result<Option<Self>>
    where
        L: BomLookup + ?Sized,
    {
        let mut plan = Self::new(plan_id, order.transaction_date);
        plan.sales_order = Some(order.order_id.clone());

        for line in &order.lines {
            if bom_lookup.default_bom(&line.item_id)?.is_some() {
                plan.items.push(PlannedItem {
                    item_id: line.item_id.clone(),
                    planned_quantity: line.quantity,
                    planned_start_date: Some(order.delivery_date),
                });
            }
        }

        if plan.items.is_empty() {
            return Ok(None);
        }
        plan.validate()?;
        Ok(Some(plan))
    }
}
