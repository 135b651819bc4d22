//! Material requirements planning over bills of materials.
//!
//! This crate provides the planning side of the core:
//! - [`Bom`] and the [`BomLookup`] collaborator trait
//! - [`aggregate`], which turns planned production into merged component demand
//! - [`ProductionPlan`], which validates plans and drafts work orders
//!
//! Nothing here writes to a store; every operation returns values for the
//! caller to persist.

pub mod bom;
pub mod error;
pub mod plan;
pub mod requirements;

pub use bom::{Bom, BomLine, BomLookup, InMemoryBomRegistry};
pub use error::{PlanningError, Result};
pub use plan::{ProductionPlan, SalesOrder, SalesOrderLine, WorkOrderDraft};
pub use requirements::{PlannedItem, RequirementLine, aggregate, aggregate_with_config};
