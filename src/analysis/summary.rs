use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::SalesError;
use crate::models::{Column, SalesTable};

/// Group name used for rows that lack the grouping value.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Overall figures for the `Amount` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    /// Rows that carry an amount
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// Summarize amounts. `Ok(None)` means the column exists but holds no data.
pub fn sales_summary(table: &SalesTable) -> Result<Option<SalesSummary>, SalesError> {
    if !table.has_column(Column::Amount) {
        return Err(SalesError::MissingColumn(Column::Amount));
    }
    let amounts = table.numeric_values(Column::Amount);
    if amounts.is_empty() {
        return Ok(None);
    }
    let total: f64 = amounts.iter().sum();
    Ok(Some(SalesSummary {
        count: amounts.len(),
        total,
        mean: total / amounts.len() as f64,
        max: amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: amounts.iter().copied().fold(f64::INFINITY, f64::min),
    }))
}

/// Categorical column to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Product,
    Region,
    Salesperson,
}

impl GroupKey {
    pub fn column(&self) -> Column {
        match self {
            GroupKey::Product => Column::Product,
            GroupKey::Region => Column::Region,
            GroupKey::Salesperson => Column::Salesperson,
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column().name())
    }
}

/// Aggregates for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    /// Rows in the group that carry an amount
    pub count: usize,
    pub total: f64,
    /// `None` when no row in the group carries an amount
    pub mean: Option<f64>,
    pub quantity: u64,
}

/// Per-group aggregates, sorted by descending total then ascending key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub key: GroupKey,
    pub groups: Vec<GroupStats>,
}

impl GroupSummary {
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.total).sum()
    }

    pub fn get(&self, key: &str) -> Option<&GroupStats> {
        self.groups.iter().find(|g| g.key == key)
    }
}

#[derive(Default)]
struct Accumulator {
    count: usize,
    total: f64,
    quantity: u64,
}

/// Group rows by `key`, sending rows without a key value to [`UNKNOWN_GROUP`]
/// so group totals always add up to the ungrouped total. A key literally
/// named `unknown` lands in the same bucket.
pub fn group_by(table: &SalesTable, key: GroupKey) -> Result<GroupSummary, SalesError> {
    if !table.has_column(key.column()) {
        return Err(SalesError::MissingColumn(key.column()));
    }
    if !table.has_column(Column::Amount) {
        return Err(SalesError::MissingColumn(Column::Amount));
    }

    let mut acc: HashMap<&str, Accumulator> = HashMap::new();
    for record in table.records() {
        let name = record.text(key.column()).unwrap_or(UNKNOWN_GROUP);
        let entry = acc.entry(name).or_default();
        if let Some(amount) = record.amount {
            entry.count += 1;
            entry.total += amount;
        }
        entry.quantity += u64::from(record.quantity.unwrap_or(0));
    }

    let mut groups: Vec<GroupStats> = acc
        .into_iter()
        .map(|(name, a)| GroupStats {
            key: name.to_string(),
            count: a.count,
            total: a.total,
            mean: (a.count > 0).then(|| a.total / a.count as f64),
            quantity: a.quantity,
        })
        .collect();
    groups.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));

    Ok(GroupSummary { key, groups })
}

/// Total amount per (row group, column group) pair, for two-way breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossTab {
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    /// `values[row][col]`
    pub values: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn max(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Sum amounts over two categorical keys; keys are sorted alphabetically.
pub fn cross_tab(table: &SalesTable, rows: GroupKey, cols: GroupKey) -> Result<CrossTab, SalesError> {
    for column in [rows.column(), cols.column(), Column::Amount] {
        if !table.has_column(column) {
            return Err(SalesError::MissingColumn(column));
        }
    }

    let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
    for record in table.records() {
        let r = record.text(rows.column()).unwrap_or(UNKNOWN_GROUP);
        let c = record.text(cols.column()).unwrap_or(UNKNOWN_GROUP);
        *cells.entry((r, c)).or_insert(0.0) += record.amount.unwrap_or(0.0);
    }

    let mut row_keys: Vec<String> = cells.keys().map(|(r, _)| r.to_string()).collect();
    row_keys.dedup();
    let mut col_keys: Vec<String> = cells.keys().map(|(_, c)| c.to_string()).collect();
    col_keys.sort();
    col_keys.dedup();

    let values = row_keys
        .iter()
        .map(|r| {
            col_keys
                .iter()
                .map(|c| cells.get(&(r.as_str(), c.as_str())).copied().unwrap_or(0.0))
                .collect()
        })
        .collect();

    Ok(CrossTab {
        row_keys,
        col_keys,
        values,
    })
}
