//! Record-store collaborators and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::LookupError;
use tokio::sync::RwLock;

use crate::event::{DeliveryEvent, InspectionEvent, MovementEvent, ReceiptEvent, TraceableEvent};
use crate::report::{ReportFilter, StockLedgerEntry};
use crate::subject::{SubjectId, SubjectKind, SubjectMetadata};

type LookupResult<T> = std::result::Result<T, LookupError>;

/// Purchase receipt lines mentioning a subject.
#[async_trait]
pub trait ReceiptLookup: Send + Sync {
    async fn receipts(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<ReceiptEvent>>;
}

/// Stock entry lines mentioning a subject, of any movement type.
#[async_trait]
pub trait MovementLookup: Send + Sync {
    async fn movements(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<MovementEvent>>;
}

/// Quality inspections of a subject.
#[async_trait]
pub trait InspectionLookup: Send + Sync {
    async fn inspections(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<InspectionEvent>>;
}

/// Delivery note lines mentioning a subject.
#[async_trait]
pub trait DeliveryLookup: Send + Sync {
    async fn deliveries(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<DeliveryEvent>>;
}

/// Master data of a batch or serial number; `None` if it does not exist.
#[async_trait]
pub trait SubjectMetadataLookup: Send + Sync {
    async fn subject_metadata(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Option<SubjectMetadata>>;
}

/// Stock ledger entries for the traceability report.
#[async_trait]
pub trait StockLedgerLookup: Send + Sync {
    async fn ledger_entries(&self, filter: &ReportFilter) -> LookupResult<Vec<StockLedgerEntry>>;
}

#[derive(Debug, Default)]
struct InMemoryTraceState {
    subjects: HashMap<(SubjectKind, String), SubjectMetadata>,
    receipts: Vec<ReceiptEvent>,
    movements: Vec<MovementEvent>,
    inspections: Vec<InspectionEvent>,
    deliveries: Vec<DeliveryEvent>,
    ledger: Vec<StockLedgerEntry>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

/// In-memory record store implementing every lookup.
///
/// Serial candidates are selected by substring over the serial field, the
/// way a `LIKE '%id%'` query against the real store does. The walker's exact
/// match is what removes the false positives.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTraceSource {
    state: Arc<RwLock<InMemoryTraceState>>,
}

impl InMemoryTraceSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_subject(&self, subject: &str, kind: SubjectKind, metadata: SubjectMetadata) {
        self.state
            .write()
            .await
            .subjects
            .insert((kind, subject.to_string()), metadata);
    }

    pub async fn add_receipt(&self, event: ReceiptEvent) {
        self.state.write().await.receipts.push(event);
    }

    pub async fn add_movement(&self, event: MovementEvent) {
        self.state.write().await.movements.push(event);
    }

    pub async fn add_inspection(&self, event: InspectionEvent) {
        self.state.write().await.inspections.push(event);
    }

    pub async fn add_delivery(&self, event: DeliveryEvent) {
        self.state.write().await.deliveries.push(event);
    }

    pub async fn add_ledger_entry(&self, entry: StockLedgerEntry) {
        self.state.write().await.ledger.push(entry);
    }

    /// Makes every subsequent lookup fail with `LookupError::Unavailable`.
    pub async fn set_unavailable(&self, reason: Option<&str>) {
        self.state.write().await.fail_with = reason.map(str::to_string);
    }

    /// Delays every subsequent lookup, simulating a slow store.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        self.state.write().await.delay = delay;
    }

    async fn select<E, F>(
        &self,
        pick: F,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<E>>
    where
        E: TraceableEvent + Clone,
        F: FnOnce(&InMemoryTraceState) -> &Vec<E>,
    {
        self.simulate().await?;
        let state = self.state.read().await;
        Ok(pick(&*state)
            .iter()
            .filter(|e| like_match(*e, subject, kind))
            .cloned()
            .collect())
    }

    async fn simulate(&self) -> LookupResult<()> {
        let (delay, fail_with) = {
            let state = self.state.read().await;
            (state.delay, state.fail_with.clone())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match fail_with {
            Some(reason) => Err(LookupError::Unavailable(reason)),
            None => Ok(()),
        }
    }
}

fn like_match<E: TraceableEvent>(event: &E, subject: &SubjectId, kind: SubjectKind) -> bool {
    match kind {
        SubjectKind::Batch => event.batch_no() == Some(subject.as_str()),
        SubjectKind::Serial => event
            .serial_numbers()
            .iter()
            .collect::<Vec<_>>()
            .join("\n")
            .contains(subject.as_str()),
    }
}

#[async_trait]
impl ReceiptLookup for InMemoryTraceSource {
    async fn receipts(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<ReceiptEvent>> {
        self.select(|s| &s.receipts, subject, kind).await
    }
}

#[async_trait]
impl MovementLookup for InMemoryTraceSource {
    async fn movements(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<MovementEvent>> {
        self.select(|s| &s.movements, subject, kind).await
    }
}

#[async_trait]
impl InspectionLookup for InMemoryTraceSource {
    async fn inspections(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<InspectionEvent>> {
        self.select(|s| &s.inspections, subject, kind).await
    }
}

#[async_trait]
impl DeliveryLookup for InMemoryTraceSource {
    async fn deliveries(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Vec<DeliveryEvent>> {
        self.select(|s| &s.deliveries, subject, kind).await
    }
}

#[async_trait]
impl SubjectMetadataLookup for InMemoryTraceSource {
    async fn subject_metadata(
        &self,
        subject: &SubjectId,
        kind: SubjectKind,
    ) -> LookupResult<Option<SubjectMetadata>> {
        self.simulate().await?;
        Ok(self
            .state
            .read()
            .await
            .subjects
            .get(&(kind, subject.as_str().to_string()))
            .cloned())
    }
}

#[async_trait]
impl StockLedgerLookup for InMemoryTraceSource {
    async fn ledger_entries(&self, filter: &ReportFilter) -> LookupResult<Vec<StockLedgerEntry>> {
        self.simulate().await?;
        Ok(self
            .state
            .read()
            .await
            .ledger
            .iter()
            .filter(|entry| filter.accepts(entry))
            .cloned()
            .collect())
    }
}
