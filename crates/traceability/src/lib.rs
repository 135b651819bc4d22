//! Batch and serial number traceability.
//!
//! Given a batch or serial number, [`TraceWalker`] reads purchase receipts,
//! manufacture stock entries, quality inspections and deliveries through
//! the lookup traits in [`lookup`] and returns a [`TraceRecord`]. All reads
//! of one trace run concurrently under a single deadline; a trace either
//! completes or fails, it never returns a partial record.
//!
//! [`traceability_report`] groups stock ledger movements per item and
//! batch or serial number.

pub mod error;
pub mod event;
pub mod lookup;
pub mod report;
pub mod subject;
pub mod walker;

pub use error::{Result, TraceError};
pub use event::{
    Counterpart, DeliveryEvent, InspectionEvent, InspectionStatus, MovementEvent, MovementType,
    ReceiptEvent, TraceEvent, TraceableEvent,
};
pub use lookup::{
    DeliveryLookup, InMemoryTraceSource, InspectionLookup, MovementLookup, ReceiptLookup,
    StockLedgerLookup, SubjectMetadataLookup,
};
pub use report::{
    ReportFilter, StockLedgerEntry, TraceabilityGroup, build_report, traceability_report,
};
pub use subject::{SerialNumbers, SubjectId, SubjectKind, SubjectMetadata};
pub use walker::{TraceRecord, TraceWalker};
