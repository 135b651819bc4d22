//! Shared building blocks for the MRP and traceability core.
//!
//! - String identifiers ([`ItemId`], [`DocumentId`], [`ActorId`], [`Warehouse`])
//! - [`Quantity`] for stock quantities
//! - [`LookupError`], the failure type of every record-store collaborator
//! - [`EngineConfig`], environment-driven tunables

pub mod config;
pub mod error;
pub mod types;

pub use config::EngineConfig;
pub use error::LookupError;
pub use types::{ActorId, DocumentId, ItemId, Quantity, Warehouse};
