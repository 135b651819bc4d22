//! Traceability report: stock ledger movements grouped per batch or serial.

use std::collections::HashMap;

use chrono::NaiveDate;
use common::{DocumentId, ItemId, Quantity, Warehouse};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};
use crate::lookup::StockLedgerLookup;

/// One stock ledger posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLedgerEntry {
    pub item_id: ItemId,
    pub batch_no: Option<String>,
    pub serial_no: Option<String>,
    pub voucher_type: String,
    pub voucher_no: DocumentId,
    pub posting_date: NaiveDate,
    pub actual_qty: Quantity,
    pub warehouse: Warehouse,
}

/// Optional restrictions on the report; both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub item_id: Option<ItemId>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn for_item(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: Some(item_id.into()),
            ..Self::default()
        }
    }

    pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
        self.from_date = Some(from);
        self.to_date = Some(to);
        self
    }

    /// Rejects inverted date ranges.
    pub fn validate(&self) -> Result<()> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date)
            && from > to
        {
            return Err(TraceError::InvalidInput(format!(
                "report range starts {from} after it ends {to}"
            )));
        }
        Ok(())
    }

    /// Returns true if the entry passes every set restriction.
    pub fn accepts(&self, entry: &StockLedgerEntry) -> bool {
        if let Some(ref item_id) = self.item_id
            && &entry.item_id != item_id
        {
            return false;
        }
        if let Some(from) = self.from_date
            && entry.posting_date < from
        {
            return false;
        }
        if let Some(to) = self.to_date
            && entry.posting_date > to
        {
            return false;
        }
        true
    }
}

/// All movements of one item/batch or item/serial combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityGroup {
    pub item_id: ItemId,
    pub batch_no: Option<String>,
    pub serial_no: Option<String>,
    pub movements: Vec<StockLedgerEntry>,
}

/// Groups ledger entries by item and batch (or serial when there is no batch).
///
/// Groups appear in order of first occurrence; movements inside a group are
/// sorted by posting date, then voucher number.
pub fn build_report(
    entries: &[StockLedgerEntry],
    filter: &ReportFilter,
) -> Vec<TraceabilityGroup> {
    let mut groups: Vec<TraceabilityGroup> = Vec::new();
    let mut index: HashMap<(ItemId, Option<String>), usize> = HashMap::new();

    for entry in entries.iter().filter(|e| filter.accepts(e)) {
        let tracking = entry.batch_no.clone().or_else(|| entry.serial_no.clone());
        let key = (entry.item_id.clone(), tracking);

        let pos = *index.entry(key).or_insert_with(|| {
            groups.push(TraceabilityGroup {
                item_id: entry.item_id.clone(),
                batch_no: entry.batch_no.clone(),
                serial_no: entry.serial_no.clone(),
                movements: Vec::new(),
            });
            groups.len() - 1
        });
        groups[pos].movements.push(entry.clone());
    }

    for group in &mut groups {
        group.movements.sort_by(|a, b| {
            a.posting_date
                .cmp(&b.posting_date)
                .then_with(|| a.voucher_no.cmp(&b.voucher_no))
        });
    }

    groups
}

/// Reads the ledger through `lookup` and builds the report.
#[tracing::instrument(skip(lookup))]
pub async fn traceability_report<L>(
    lookup: &L,
    filter: &ReportFilter,
) -> Result<Vec<TraceabilityGroup>>
where
    L: StockLedgerLookup + ?Sized,
{
    filter.validate()?;
    let entries = lookup.ledger_entries(filter).await?;
    let groups = build_report(&entries, filter);
    tracing::info!(
        groups = groups.len(),
        entries = entries.len(),
        "traceability report built"
    );
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn entry(
        item: &str,
        batch: Option<&str>,
        serial: Option<&str>,
        voucher: &str,
        day: u32,
    ) -> StockLedgerEntry {
        StockLedgerEntry {
            item_id: ItemId::new(item),
            batch_no: batch.map(str::to_string),
            serial_no: serial.map(str::to_string),
            voucher_type: "Stock Entry".to_string(),
            voucher_no: DocumentId::new(voucher),
            posting_date: date(3, day),
            actual_qty: Quantity::new(1.0),
            warehouse: Warehouse::new("Stores - HC"),
        }
    }

    #[test]
    fn groups_by_item_and_tracking_number() {
        let entries = vec![
            entry("GEL", Some("B-1"), None, "STE-3", 3),
            entry("PUMP", None, Some("SER-9"), "DN-1", 5),
            entry("GEL", Some("B-1"), None, "STE-1", 1),
            entry("GEL", Some("B-2"), None, "STE-2", 2),
        ];
        let groups = build_report(&entries, &ReportFilter::default());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].batch_no.as_deref(), Some("B-1"));
        assert_eq!(groups[1].serial_no.as_deref(), Some("SER-9"));
        assert_eq!(groups[2].batch_no.as_deref(), Some("B-2"));

        let vouchers: Vec<&str> = groups[0]
            .movements
            .iter()
            .map(|m| m.voucher_no.as_str())
            .collect();
        assert_eq!(vouchers, vec!["STE-1", "STE-3"]);
    }

    #[test]
    fn same_tracking_number_on_different_items_stays_apart() {
        let entries = vec![
            entry("GEL", Some("B-1"), None, "STE-1", 1),
            entry("SALINE", Some("B-1"), None, "STE-2", 1),
        ];
        assert_eq!(build_report(&entries, &ReportFilter::default()).len(), 2);
    }

    #[test]
    fn filter_by_item_and_range() {
        let entries = vec![
            entry("GEL", Some("B-1"), None, "STE-1", 1),
            entry("GEL", Some("B-1"), None, "STE-2", 10),
            entry("GEL", Some("B-1"), None, "STE-3", 20),
            entry("PUMP", None, Some("SER-1"), "DN-1", 10),
        ];
        let filter = ReportFilter::for_item("GEL").between(date(3, 5), date(3, 20));
        let groups = build_report(&entries, &filter);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].movements.len(), 2);
    }

    #[test]
    fn inverted_range_is_invalid() {
        let filter = ReportFilter::default().between(date(3, 20), date(3, 5));
        assert!(matches!(filter.validate(), Err(TraceError::InvalidInput(_))));
    }
}
