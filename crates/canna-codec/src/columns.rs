//! Fixed column projections for the human-readable report formats.

use canna_core::{
  log::{LogEntry, LogType},
  value::DataValue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
  Id,
  Type,
  /// A key of the entry's `data` map.
  Data(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
  pub label:  &'static str,
  pub source: Source,
}

const fn id() -> Column { Column { label: "ID", source: Source::Id } }

const fn data(label: &'static str, key: &'static str) -> Column {
  Column { label, source: Source::Data(key) }
}

const SALE: &[Column] = &[
  id(),
  data("Customer Age", "customerAge"),
  data("Product SKU", "productSKU"),
  data("Category", "productCategory"),
  data("Quantity", "quantity"),
  data("Price", "price"),
  data("Tax", "taxAmount"),
  data("Total", "total"),
  data("Payment Method", "paymentMethod"),
  data("Employee ID", "employeeID"),
];

const INVENTORY: &[Column] = &[
  id(),
  data("Action", "action"),
  data("Product SKU", "productSKU"),
  data("Product Name", "productName"),
  data("Quantity", "quantity"),
  data("Reason", "reason"),
  data("Employee ID", "employeeID"),
];

const CASH_FLOAT: &[Column] = &[
  id(),
  data("Action", "action"),
  data("Amount", "amount"),
  data("Reason", "reason"),
  data("Employee ID", "employeeID"),
];

const DAILY_SUMMARY: &[Column] = &[
  id(),
  data("Date", "date"),
  data("Sales Count", "salesCount"),
  data("Total Sales", "totalSales"),
  data("Total Tax", "totalTax"),
  data("Total Items", "totalItems"),
  data("Inventory Events", "inventoryCount"),
  data("Cash Float Events", "cashFloatEvents"),
];

const WASTE: &[Column] = &[
  id(),
  data("Product SKU", "productSKU"),
  data("Product Name", "productName"),
  data("Quantity", "quantity"),
  data("Reason", "reason"),
  data("Disposal Method", "disposalMethod"),
  data("Employee ID", "employeeID"),
];

const EMPLOYEE: &[Column] = &[
  id(),
  data("Employee ID", "employeeID"),
  data("Action", "action"),
  data("Details", "details"),
];

const DEFAULT: &[Column] = &[id(), Column { label: "Type", source: Source::Type }];

static COLUMNS: &[(LogType, &[Column])] = &[
  (LogType::Sale, SALE),
  (LogType::Inventory, INVENTORY),
  (LogType::CashFloat, CASH_FLOAT),
  (LogType::DailySummary, DAILY_SUMMARY),
  (LogType::Waste, WASTE),
  (LogType::Employee, EMPLOYEE),
];

/// The report columns for `log_type`; types without their own projection get
/// `ID, Type`.
pub fn columns_for(log_type: LogType) -> &'static [Column] {
  COLUMNS
    .iter()
    .find(|(t, _)| *t == log_type)
    .map_or(DEFAULT, |(_, columns)| *columns)
}

/// A rendered report cell. Numbers are kept apart so spreadsheet output can
/// type them.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Text(String),
  Number(String),
}

impl Cell {
  pub fn text(&self) -> &str {
    match self {
      Self::Text(s) | Self::Number(s) => s,
    }
  }
}

impl Column {
  pub fn cell(&self, entry: &LogEntry) -> Cell {
    match self.source {
      Source::Id => Cell::Text(entry.id.clone()),
      Source::Type => Cell::Text(entry.log_type.to_string()),
      Source::Data(key) => match entry.data.get(key) {
        Some(DataValue::Number(n)) => Cell::Number(n.to_string()),
        Some(value) => Cell::Text(value.to_text()),
        None => Cell::Text(String::new()),
      },
    }
  }
}
