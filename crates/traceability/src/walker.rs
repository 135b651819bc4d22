//! Trace reconstruction for a batch or serial number.

use std::future::Future;
use std::time::{Duration, Instant};

use common::{EngineConfig, ItemId};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};
use crate::event::{
    DeliveryEvent, InspectionEvent, MovementEvent, ReceiptEvent, TraceEvent, TraceableEvent,
};
use crate::lookup::{
    DeliveryLookup, InspectionLookup, MovementLookup, ReceiptLookup, SubjectMetadataLookup,
};
use crate::subject::{SubjectId, SubjectKind, SubjectMetadata};

/// The history of one batch or serial number at the time of the query.
///
/// Each category is its own sequence ordered by event date, then document
/// id; categories are not merged into a single timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    subject_id: SubjectId,
    subject_kind: SubjectKind,
    metadata: SubjectMetadata,
    purchase_history: Vec<ReceiptEvent>,
    production_history: Vec<MovementEvent>,
    quality_inspections: Vec<InspectionEvent>,
    delivery_history: Vec<DeliveryEvent>,
}

impl TraceRecord {
    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn subject_kind(&self) -> SubjectKind {
        self.subject_kind
    }

    pub fn item_id(&self) -> &ItemId {
        &self.metadata.item_id
    }

    /// Status, warehouse and shelf-life data of the subject.
    pub fn metadata(&self) -> &SubjectMetadata {
        &self.metadata
    }

    pub fn purchase_history(&self) -> &[ReceiptEvent] {
        &self.purchase_history
    }

    /// Manufacture stock entries only; transfers and issues are left out.
    pub fn production_history(&self) -> &[MovementEvent] {
        &self.production_history
    }

    pub fn quality_inspections(&self) -> &[InspectionEvent] {
        &self.quality_inspections
    }

    pub fn delivery_history(&self) -> &[DeliveryEvent] {
        &self.delivery_history
    }

    /// Total number of events over all categories.
    pub fn event_count(&self) -> usize {
        self.purchase_history.len()
            + self.production_history.len()
            + self.quality_inspections.len()
            + self.delivery_history.len()
    }

    /// Every event tagged with its category, one category after another.
    pub fn events(&self) -> impl Iterator<Item = TraceEvent> + '_ {
        let receipts = self.purchase_history.iter().cloned().map(TraceEvent::Receipt);
        let production = self
            .production_history
            .iter()
            .cloned()
            .map(TraceEvent::ProductionMovement);
        let inspections = self
            .quality_inspections
            .iter()
            .cloned()
            .map(TraceEvent::Inspection);
        let deliveries = self.delivery_history.iter().cloned().map(TraceEvent::Delivery);
        receipts.chain(production).chain(inspections).chain(deliveries)
    }
}

/// Reconstructs trace records from five independent lookups.
///
/// The walker holds no state between calls. Every call reads all lookups
/// concurrently and either returns a complete record or an error.
pub struct TraceWalker<R, M, I, D, S>
where
    R: ReceiptLookup,
    M: MovementLookup,
    I: InspectionLookup,
    D: DeliveryLookup,
    S: SubjectMetadataLookup,
{
    receipts: R,
    movements: M,
    inspections: I,
    deliveries: D,
    subjects: S,
    config: EngineConfig,
}

impl<T> TraceWalker<T, T, T, T, T>
where
    T: ReceiptLookup
        + MovementLookup
        + InspectionLookup
        + DeliveryLookup
        + SubjectMetadataLookup
        + Clone,
{
    /// Creates a walker reading every category from one store.
    pub fn from_source(source: T) -> Self {
        Self::new(
            source.clone(),
            source.clone(),
            source.clone(),
            source.clone(),
            source,
        )
    }
}

impl<R, M, I, D, S> TraceWalker<R, M, I, D, S>
where
    R: ReceiptLookup,
    M: MovementLookup,
    I: InspectionLookup,
    D: DeliveryLookup,
    S: SubjectMetadataLookup,
{
    /// Creates a walker with the default configuration.
    pub fn new(receipts: R, movements: M, inspections: I, deliveries: D, subjects: S) -> Self {
        Self {
            receipts,
            movements,
            inspections,
            deliveries,
            subjects,
            config: EngineConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Traces a subject within the configured deadline.
    pub async fn trace(&self, subject_id: &str, kind: SubjectKind) -> Result<TraceRecord> {
        self.trace_with_timeout(subject_id, kind, self.config.trace_timeout)
            .await
    }

    /// Traces a subject within an explicit deadline.
    pub async fn trace_with_timeout(
        &self,
        subject_id: &str,
        kind: SubjectKind,
        timeout: Duration,
    ) -> Result<TraceRecord> {
        self.run(subject_id, kind, timeout, std::future::pending())
            .await
    }

    /// Traces a subject, aborting when `cancel` completes or the configured
    /// deadline passes, whichever is first.
    pub async fn trace_until<F>(
        &self,
        subject_id: &str,
        kind: SubjectKind,
        cancel: F,
    ) -> Result<TraceRecord>
    where
        F: Future<Output = ()>,
    {
        self.run(subject_id, kind, self.config.trace_timeout, cancel)
            .await
    }

    #[tracing::instrument(skip(self, cancel))]
    async fn run<F>(
        &self,
        subject_id: &str,
        kind: SubjectKind,
        timeout: Duration,
        cancel: F,
    ) -> Result<TraceRecord>
    where
        F: Future<Output = ()>,
    {
        let subject = SubjectId::for_kind(subject_id, kind)?;
        metrics::counter!("trace_requests_total").increment(1);
        let started = Instant::now();

        let outcome = tokio::select! {
            result = tokio::time::timeout(timeout, self.collect(&subject, kind)) => result.ok(),
            () = cancel => None,
        };

        match outcome {
            Some(result) => {
                metrics::histogram!("trace_duration_seconds")
                    .record(started.elapsed().as_secs_f64());
                if let Ok(record) = &result {
                    tracing::info!(
                        subject_id = %subject,
                        events = record.event_count(),
                        "trace complete"
                    );
                }
                result
            }
            None => {
                let after = started.elapsed();
                metrics::counter!("trace_timeouts_total").increment(1);
                tracing::warn!(
                    subject_id = %subject,
                    ?after,
                    "trace aborted before lookups finished"
                );
                Err(TraceError::Timeout {
                    subject_id: subject.to_string(),
                    after,
                })
            }
        }
    }

    async fn collect(&self, subject: &SubjectId, kind: SubjectKind) -> Result<TraceRecord> {
        let (metadata, receipts, movements, inspections, deliveries) = tokio::try_join!(
            self.subjects.subject_metadata(subject, kind),
            self.receipts.receipts(subject, kind),
            self.movements.movements(subject, kind),
            self.inspections.inspections(subject, kind),
            self.deliveries.deliveries(subject, kind),
        )?;

        let metadata = metadata.ok_or_else(|| TraceError::NotFound {
            subject_id: subject.to_string(),
            kind,
        })?;

        let manufacture_only: Vec<MovementEvent> = movements
            .into_iter()
            .filter(|m| {
                let keep = m.movement_type.is_manufacture();
                if !keep {
                    tracing::debug!(
                        document_id = %m.document_id,
                        movement_type = %m.movement_type,
                        "movement left out of production history"
                    );
                }
                keep
            })
            .collect();

        Ok(TraceRecord {
            subject_id: subject.clone(),
            subject_kind: kind,
            metadata,
            purchase_history: arrange(receipts, subject, kind),
            production_history: arrange(manufacture_only, subject, kind),
            quality_inspections: arrange(inspections, subject, kind),
            delivery_history: arrange(deliveries, subject, kind),
        })
    }
}

/// Drops candidates that do not reference the subject exactly and sorts the
/// rest by date, then document id.
fn arrange<E: TraceableEvent>(events: Vec<E>, subject: &SubjectId, kind: SubjectKind) -> Vec<E> {
    let mut kept: Vec<E> = events
        .into_iter()
        .filter(|e| e.references(subject, kind))
        .collect();
    kept.sort_by(|a, b| {
        a.event_date()
            .cmp(&b.event_date())
            .then_with(|| a.document_id().cmp(b.document_id()))
    });
    kept
}
