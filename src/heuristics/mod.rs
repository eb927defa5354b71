// src/heuristics/mod.rs

pub mod classify;
mod demands;
pub mod lines;
mod summary;
pub mod tokens;

pub use demands::extract_demands;
pub use summary::{locate_summary, parse_summary};

use indexmap::IndexMap;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// The twelve fiscal columns printed for every line item, in print order.
pub const FISCAL_COLUMNS: [&str; 12] = [
    "actual_2024_25",
    "capital_2024_25",
    "total_2024_25",
    "budget_2025_26",
    "capital_2025_26",
    "total_2025_26",
    "revised_2024_25",
    "capital_revised_2024_25",
    "total_revised_2024_25",
    "budget_2026_27",
    "capital_2026_27",
    "total_2026_27",
];

/// One amount per fiscal column. `None` means the cell was not printed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiscalValues([Option<f64>; 12]);

impl FiscalValues {
    /// Fill columns left to right; extra amounts are dropped, missing ones stay `None`.
    pub fn from_amounts(amounts: &[Option<f64>]) -> Self {
        let mut slots = [None; 12];
        for (slot, amount) in slots.iter_mut().zip(amounts) {
            *slot = *amount;
        }
        Self(slots)
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

#[cfg(test)]
impl FiscalValues {
    pub fn get(&self, column: &str) -> Option<f64> {
        FISCAL_COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|i| self.0[i])
    }

    pub fn slots(&self) -> &[Option<f64>; 12] {
        &self.0
    }
}

impl Serialize for FiscalValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FISCAL_COLUMNS.len()))?;
        for (key, value) in FISCAL_COLUMNS.iter().zip(self.0.iter()) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Total,
    GrandTotal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiscalLineItem {
    pub code: Option<String>,
    pub name: String,
    pub values: FiscalValues,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
}

impl FiscalLineItem {
    fn same_row(&self, other: &FiscalLineItem) -> bool {
        self.code == other.code && self.name == other.name && self.values == other.values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub items: Vec<FiscalLineItem>,
}

impl Section {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            items: Vec::new(),
        }
    }

    /// Append unless an item with the same code, name and values is already
    /// present. Returns whether the item was stored.
    pub fn push_unique(&mut self, item: FiscalLineItem) -> bool {
        if self.items.iter().any(|it| it.same_row(&item)) {
            return false;
        }
        self.items.push(item);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demand {
    pub demand_no: u32,
    pub ministry: Option<String>,
    pub department: Option<String>,
    pub sections: Vec<Section>,
}

impl Demand {
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// A department (demand) row of the front-matter summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentRow {
    pub demand_no: u32,
    pub department: String,
    pub revenue: Option<f64>,
    pub capital: Option<f64>,
    pub total: Option<f64>,
    pub page_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinistryRow {
    #[serde(rename = "ministry")]
    pub name: String,
    pub revenue: Option<f64>,
    pub capital: Option<f64>,
    pub total: Option<f64>,
    pub departments: Vec<DepartmentRow>,
}

/// Ministries of the summary table, keyed by name in order of first
/// appearance. Serializes as a JSON object keyed by ministry name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SummaryTable {
    pub ministries: IndexMap<String, MinistryRow>,
}

impl SummaryTable {
    pub fn department_count(&self) -> usize {
        self.ministries.values().map(|m| m.departments.len()).sum()
    }
}

impl FromIterator<MinistryRow> for SummaryTable {
    fn from_iter<I: IntoIterator<Item = MinistryRow>>(rows: I) -> Self {
        Self {
            ministries: rows.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }
}
