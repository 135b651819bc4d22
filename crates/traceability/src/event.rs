//! Trace events read from receipts, stock movements, inspections and deliveries.

use chrono::NaiveDate;
use common::{ActorId, DocumentId, Quantity, Warehouse};
use serde::{Deserialize, Serialize};

use crate::subject::{SerialNumbers, SubjectId, SubjectKind};

/// Stock entry purpose of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    Manufacture,
    Transfer,
    Receipt,
    Issue,
    Other(String),
}

impl MovementType {
    /// Parses a stock entry type tag, ignoring case and surrounding space.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "manufacture" => MovementType::Manufacture,
            "transfer" | "material transfer" => MovementType::Transfer,
            "receipt" | "material receipt" => MovementType::Receipt,
            "issue" | "material issue" => MovementType::Issue,
            _ => MovementType::Other(tag.trim().to_string()),
        }
    }

    pub fn is_manufacture(&self) -> bool {
        matches!(self, MovementType::Manufacture)
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementType::Manufacture => write!(f, "Manufacture"),
            MovementType::Transfer => write!(f, "Material Transfer"),
            MovementType::Receipt => write!(f, "Material Receipt"),
            MovementType::Issue => write!(f, "Material Issue"),
            MovementType::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// Outcome of a quality inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InspectionStatus {
    Accepted,
    Rejected,
    Pending,
}

impl InspectionStatus {
    /// Derives the overall status from per-reading outcomes.
    ///
    /// Any rejected reading rejects the inspection.
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = InspectionStatus>,
    {
        let mut seen = false;
        for reading in readings {
            if reading == InspectionStatus::Rejected {
                return InspectionStatus::Rejected;
            }
            seen = true;
        }
        if seen {
            InspectionStatus::Accepted
        } else {
            InspectionStatus::Pending
        }
    }
}

impl std::fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionStatus::Accepted => write!(f, "Accepted"),
            InspectionStatus::Rejected => write!(f, "Rejected"),
            InspectionStatus::Pending => write!(f, "Pending"),
        }
    }
}

/// The party on the other side of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Counterpart {
    Supplier(String),
    Customer(String),
    WorkOrder(DocumentId),
}

/// Fields shared by every trace event.
pub trait TraceableEvent {
    fn document_id(&self) -> &DocumentId;

    fn event_date(&self) -> NaiveDate;

    fn counterpart(&self) -> Option<Counterpart>;

    fn quantity(&self) -> Option<Quantity>;

    fn batch_no(&self) -> Option<&str>;

    fn serial_numbers(&self) -> &SerialNumbers;

    /// Exact match of this event against a subject.
    fn references(&self, subject: &SubjectId, kind: SubjectKind) -> bool {
        match kind {
            SubjectKind::Batch => self.batch_no() == Some(subject.as_str()),
            SubjectKind::Serial => self.serial_numbers().contains(subject.as_str()),
        }
    }
}

/// A purchase receipt line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptEvent {
    pub document_id: DocumentId,
    pub event_date: NaiveDate,
    pub supplier: Option<String>,
    pub received_qty: Quantity,
    pub batch_no: Option<String>,
    pub serial_numbers: SerialNumbers,
}

impl ReceiptEvent {
    pub fn new(
        document_id: impl Into<DocumentId>,
        event_date: NaiveDate,
        received_qty: f64,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            event_date,
            supplier: None,
            received_qty: Quantity::new(received_qty),
            batch_no: None,
            serial_numbers: SerialNumbers::default(),
        }
    }

    pub fn from_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_batch(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = Some(batch_no.into());
        self
    }

    pub fn with_serials(mut self, raw: &str) -> Self {
        self.serial_numbers = SerialNumbers::parse(raw);
        self
    }
}

/// A stock entry line moving the subject between warehouses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementEvent {
    pub document_id: DocumentId,
    pub event_date: NaiveDate,
    pub movement_type: MovementType,
    pub work_order: Option<DocumentId>,
    pub qty: Quantity,
    pub from_warehouse: Option<Warehouse>,
    pub to_warehouse: Option<Warehouse>,
    pub batch_no: Option<String>,
    pub serial_numbers: SerialNumbers,
}

impl MovementEvent {
    pub fn new(
        document_id: impl Into<DocumentId>,
        event_date: NaiveDate,
        movement_type: MovementType,
        qty: f64,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            event_date,
            movement_type,
            work_order: None,
            qty: Quantity::new(qty),
            from_warehouse: None,
            to_warehouse: None,
            batch_no: None,
            serial_numbers: SerialNumbers::default(),
        }
    }

    pub fn for_work_order(mut self, work_order: impl Into<DocumentId>) -> Self {
        self.work_order = Some(work_order.into());
        self
    }

    pub fn between(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from_warehouse = from.map(Warehouse::from);
        self.to_warehouse = to.map(Warehouse::from);
        self
    }

    pub fn with_batch(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = Some(batch_no.into());
        self
    }

    pub fn with_serials(mut self, raw: &str) -> Self {
        self.serial_numbers = SerialNumbers::parse(raw);
        self
    }
}

/// A quality inspection of the subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionEvent {
    pub document_id: DocumentId,
    pub event_date: NaiveDate,
    pub status: InspectionStatus,
    pub inspected_by: Option<ActorId>,
    pub reference: Option<DocumentId>,
    pub sample_size: Option<Quantity>,
    pub batch_no: Option<String>,
    pub serial_numbers: SerialNumbers,
}

impl InspectionEvent {
    pub fn new(
        document_id: impl Into<DocumentId>,
        event_date: NaiveDate,
        status: InspectionStatus,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            event_date,
            status,
            inspected_by: None,
            reference: None,
            sample_size: None,
            batch_no: None,
            serial_numbers: SerialNumbers::default(),
        }
    }

    pub fn inspected_by(mut self, actor: impl Into<ActorId>) -> Self {
        self.inspected_by = Some(actor.into());
        self
    }

    pub fn referencing(mut self, document_id: impl Into<DocumentId>) -> Self {
        self.reference = Some(document_id.into());
        self
    }

    pub fn with_batch(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = Some(batch_no.into());
        self
    }

    pub fn with_serials(mut self, raw: &str) -> Self {
        self.serial_numbers = SerialNumbers::parse(raw);
        self
    }
}

/// A delivery note line shipping the subject to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEvent {
    pub document_id: DocumentId,
    pub event_date: NaiveDate,
    pub customer: Option<String>,
    pub qty: Quantity,
    pub batch_no: Option<String>,
    pub serial_numbers: SerialNumbers,
}

impl DeliveryEvent {
    pub fn new(document_id: impl Into<DocumentId>, event_date: NaiveDate, qty: f64) -> Self {
        Self {
            document_id: document_id.into(),
            event_date,
            customer: None,
            qty: Quantity::new(qty),
            batch_no: None,
            serial_numbers: SerialNumbers::default(),
        }
    }

    pub fn to_customer(mut self, customer: impl Into<String>) -> Self {
        self.customer = Some(customer.into());
        self
    }

    pub fn with_batch(mut self, batch_no: impl Into<String>) -> Self {
        self.batch_no = Some(batch_no.into());
        self
    }

    pub fn with_serials(mut self, raw: &str) -> Self {
        self.serial_numbers = SerialNumbers::parse(raw);
        self
    }
}

impl TraceableEvent for ReceiptEvent {
    fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    fn counterpart(&self) -> Option<Counterpart> {
        self.supplier.clone().map(Counterpart::Supplier)
    }

    fn quantity(&self) -> Option<Quantity> {
        Some(self.received_qty)
    }

    fn batch_no(&self) -> Option<&str> {
        self.batch_no.as_deref()
    }

    fn serial_numbers(&self) -> &SerialNumbers {
        &self.serial_numbers
    }
}

impl TraceableEvent for MovementEvent {
    fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    fn counterpart(&self) -> Option<Counterpart> {
        self.work_order.clone().map(Counterpart::WorkOrder)
    }

    fn quantity(&self) -> Option<Quantity> {
        Some(self.qty)
    }

    fn batch_no(&self) -> Option<&str> {
        self.batch_no.as_deref()
    }

    fn serial_numbers(&self) -> &SerialNumbers {
        &self.serial_numbers
    }
}

impl TraceableEvent for InspectionEvent {
    fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    fn counterpart(&self) -> Option<Counterpart> {
        None
    }

    fn quantity(&self) -> Option<Quantity> {
        self.sample_size
    }

    fn batch_no(&self) -> Option<&str> {
        self.batch_no.as_deref()
    }

    fn serial_numbers(&self) -> &SerialNumbers {
        &self.serial_numbers
    }
}

impl TraceableEvent for DeliveryEvent {
    fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    fn counterpart(&self) -> Option<Counterpart> {
        self.customer.clone().map(Counterpart::Customer)
    }

    fn quantity(&self) -> Option<Quantity> {
        Some(self.qty)
    }

    fn batch_no(&self) -> Option<&str> {
        self.batch_no.as_deref()
    }

    fn serial_numbers(&self) -> &SerialNumbers {
        &self.serial_numbers
    }
}

/// Any trace event, tagged with its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "event")]
pub enum TraceEvent {
    Receipt(ReceiptEvent),
    ProductionMovement(MovementEvent),
    Inspection(InspectionEvent),
    Delivery(DeliveryEvent),
}

impl TraceEvent {
    fn inner(&self) -> &dyn TraceableEvent {
        match self {
            TraceEvent::Receipt(e) => e,
            TraceEvent::ProductionMovement(e) => e,
            TraceEvent::Inspection(e) => e,
            TraceEvent::Delivery(e) => e,
        }
    }
}

impl TraceableEvent for TraceEvent {
    fn document_id(&self) -> &DocumentId {
        self.inner().document_id()
    }

    fn event_date(&self) -> NaiveDate {
        self.inner().event_date()
    }

    fn counterpart(&self) -> Option<Counterpart> {
        self.inner().counterpart()
    }

    fn quantity(&self) -> Option<Quantity> {
        self.inner().quantity()
    }

    fn batch_no(&self) -> Option<&str> {
        self.inner().batch_no()
    }

    fn serial_numbers(&self) -> &SerialNumbers {
        self.inner().serial_numbers()
    }
}
