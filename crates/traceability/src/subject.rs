//! Trace subjects: batch numbers, serial numbers and their metadata.

use chrono::NaiveDate;
use common::{ItemId, Warehouse};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Whether a subject identifier names a batch or a single serialised unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    Batch,
    Serial,
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKind::Batch => write!(f, "Batch"),
            SubjectKind::Serial => write!(f, "Serial No"),
        }
    }
}

/// A validated, trimmed batch or serial identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Parses a caller-supplied identifier.
    ///
    /// Surrounding whitespace is dropped; an empty result is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TraceError::InvalidInput(
                "subject id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Parses an identifier for a trace of the given kind.
    ///
    /// Serial numbers may not contain the separators of a multi-value
    /// serial field; such an id could never match a parsed token.
    pub fn for_kind(raw: &str, kind: SubjectKind) -> Result<Self> {
        let id = Self::parse(raw)?;
        if kind == SubjectKind::Serial && id.0.contains(is_serial_separator) {
            return Err(TraceError::InvalidInput(format!(
                "serial number {id} contains a separator"
            )));
        }
        Ok(id)
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_serial_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// The serial numbers carried by one document line.
///
/// Source documents keep several serials in a single text field, separated
/// by newlines, commas or spaces. Membership is tested token by token, so
/// `SER1` is never matched by a field holding only `SER10`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerialNumbers(Vec<String>);

impl SerialNumbers {
    /// Splits a raw multi-value serial field into tokens.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(is_serial_separator)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Returns true if `serial` is one of the tokens.
    pub fn contains(&self, serial: &str) -> bool {
        self.0.iter().any(|token| token == serial)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for SerialNumbers {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Master data of a subject, read in the same trace call as its events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    pub item_id: ItemId,
    pub status: Option<String>,
    pub warehouse: Option<Warehouse>,
    pub manufacturing_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub supplier_batch: Option<String>,
}

impl SubjectMetadata {
    /// Creates metadata holding only the item.
    pub fn for_item(item_id: impl Into<ItemId>) -> Self {
        Self {
            item_id: item_id.into(),
            status: None,
            warehouse: None,
            manufacturing_date: None,
            expiry_date: None,
            supplier_batch: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<Warehouse>) -> Self {
        self.warehouse = Some(warehouse.into());
        self
    }

    pub fn with_shelf_life(mut self, manufactured: NaiveDate, expires: NaiveDate) -> Self {
        self.manufacturing_date = Some(manufactured);
        self.expiry_date = Some(expires);
        self
    }
}
