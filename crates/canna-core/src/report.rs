//! Statistical rollups over a set of log entries.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
  log::{LogEntry, LogType},
  value::{DataValue, LogData, numeric_field},
};

/// Group key used when a sale has no category or payment method.
pub const UNKNOWN: &str = "unknown";

/// Per-category sales: `count` is the summed quantity, which may be
/// fractional for weighed product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
  pub count: f64,
  pub total: f64,
}

/// Per-payment-method sales: `count` is the number of sales.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodTotals {
  pub count: u64,
  pub total: f64,
}

/// Dashboard statistics over a filtered log set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  /// Entry count for every log type, including those with none.
  pub log_counts:              BTreeMap<LogType, usize>,
  pub total_sales:             f64,
  pub total_tax:               f64,
  pub total_items:             f64,
  pub sales_by_category:       BTreeMap<String, CategoryTotals>,
  pub sales_by_payment_method: BTreeMap<String, MethodTotals>,
  pub total_logs:              usize,
}

/// Running sums over `sale` entries, shared by [`Stats`] and
/// [`DailySummary`].
#[derive(Default)]
struct SalesTally {
  count:       usize,
  total_sales: f64,
  total_tax:   f64,
  total_items: f64,
  by_category: BTreeMap<String, CategoryTotals>,
  by_method:   BTreeMap<String, MethodTotals>,
}

impl SalesTally {
  fn add(&mut self, data: &LogData) {
    let total = numeric_field(data, "total");
    let quantity = numeric_field(data, "quantity");

    self.count += 1;
    self.total_sales += total;
    self.total_tax += numeric_field(data, "taxAmount");
    self.total_items += quantity;

    let category = self.by_category.entry(group_key(data, "productCategory")).or_default();
    category.count += quantity;
    category.total += total;

    let method = self.by_method.entry(group_key(data, "paymentMethod")).or_default();
    method.count += 1;
    method.total += total;
  }

  fn over<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Self {
    let mut tally = Self::default();
    for entry in entries {
      if entry.log_type == LogType::Sale {
        tally.add(&entry.data);
      }
    }
    tally
  }
}

fn group_key(data: &LogData, key: &str) -> String {
  match data.get(key) {
    Some(v) if !v.is_missing() => v.to_text(),
    _ => UNKNOWN.to_owned(),
  }
}

/// Compute [`Stats`] over `entries`.
pub fn aggregate_stats(entries: &[LogEntry]) -> Stats {
  let mut log_counts: BTreeMap<LogType, usize> =
    LogType::iter().map(|t| (t, 0)).collect();
  for entry in entries {
    *log_counts.entry(entry.log_type).or_default() += 1;
  }

  let tally = SalesTally::over(entries);
  Stats {
    log_counts,
    total_sales: tally.total_sales,
    total_tax: tally.total_tax,
    total_items: tally.total_items,
    sales_by_category: tally.by_category,
    sales_by_payment_method: tally.by_method,
    total_logs: entries.len(),
  }
}

// ─── Daily summary ───────────────────────────────────────────────────────────

/// `[date 00:00:00.000, date 23:59:59.999]` in UTC.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
  let start = date.and_time(NaiveTime::MIN).and_utc();
  let end = start + Duration::days(1) - Duration::milliseconds(1);
  (start, end)
}

/// End-of-day rollup, stored as the `data` of a `daily_summary` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
  pub date:              NaiveDate,
  pub sales_count:       usize,
  pub total_sales:       f64,
  pub total_tax:         f64,
  pub total_items:       f64,
  pub sales_by_category: BTreeMap<String, CategoryTotals>,
  pub inventory_count:   usize,
  pub cash_float_events: usize,
  pub waste_events:      usize,
  pub employee_events:   usize,
}

impl DailySummary {
  /// Summarise the entries logged on `date`. Entries outside the day are
  /// the caller's to exclude (see [`day_bounds`]).
  pub fn compute(date: NaiveDate, day_entries: &[LogEntry]) -> Self {
    let count_of = |log_type: LogType| {
      day_entries.iter().filter(|e| e.log_type == log_type).count()
    };
    let tally = SalesTally::over(day_entries);

    Self {
      date,
      sales_count: tally.count,
      total_sales: tally.total_sales,
      total_tax: tally.total_tax,
      total_items: tally.total_items,
      sales_by_category: tally.by_category,
      inventory_count: count_of(LogType::Inventory),
      cash_float_events: count_of(LogType::CashFloat),
      waste_events: count_of(LogType::Waste),
      employee_events: count_of(LogType::Employee),
    }
  }

  /// The summary as an entry payload.
  pub fn to_data(&self) -> serde_json::Result<LogData> {
    match DataValue::from(serde_json::to_value(self)?) {
      DataValue::Nested(map) => Ok(map),
      _ => Ok(LogData::new()),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::settings::ComplianceSettings;

  fn sale(category: Option<&str>, method: &str, quantity: f64, total: f64) -> LogEntry {
    let mut data = LogData::new();
    if let Some(c) = category {
      data.insert("productCategory".into(), c.into());
    }
    data.insert("paymentMethod".into(), method.into());
    data.insert("quantity".into(), quantity.into());
    data.insert("total".into(), total.into());
    data.insert("taxAmount".into(), (total * 0.12).into());
    entry(LogType::Sale, data)
  }

  fn entry(log_type: LogType, data: LogData) -> LogEntry {
    let at = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
    LogEntry::record(log_type, data, &ComplianceSettings::default(), at)
  }

  #[test]
  fn groups_sales_by_category_and_method() {
    let entries = vec![
      sale(Some("Flower"), "cash", 1.0, 10.0),
      sale(Some("Flower"), "card", 2.0, 25.0),
      sale(Some("Edible"), "cash", 1.0, 8.0),
      entry(LogType::Waste, LogData::new()),
    ];
    let stats = aggregate_stats(&entries);

    assert_eq!(stats.sales_by_category["Flower"].count, 3.0);
    assert_eq!(stats.sales_by_category["Flower"].total, 35.0);
    assert_eq!(stats.sales_by_category["Edible"].total, 8.0);
    assert_eq!(stats.sales_by_payment_method["cash"].count, 2);
    assert_eq!(stats.sales_by_payment_method["cash"].total, 18.0);
    assert_eq!(stats.total_sales, 43.0);
    assert_eq!(stats.total_items, 4.0);
    assert_eq!(stats.total_logs, 4);
    assert_eq!(stats.log_counts[&LogType::Sale], 3);
    assert_eq!(stats.log_counts[&LogType::Waste], 1);
    assert_eq!(stats.log_counts[&LogType::Recall], 0);
    assert_eq!(stats.log_counts.len(), 9);
  }

  #[test]
  fn missing_and_non_numeric_values_count_as_zero() {
    let mut data = LogData::new();
    data.insert("total".into(), "a lot".into());
    let entries = vec![entry(LogType::Sale, data), sale(None, "", 2.0, 5.0)];
    let stats = aggregate_stats(&entries);

    assert_eq!(stats.total_sales, 5.0);
    assert!((stats.total_tax - 0.6).abs() < 1e-9);
    assert_eq!(stats.sales_by_category[UNKNOWN].count, 2.0);
    assert_eq!(stats.sales_by_payment_method[UNKNOWN].count, 2);
  }

  #[test]
  fn empty_set_is_all_zero() {
    let stats = aggregate_stats(&[]);
    assert_eq!(stats.total_sales, 0.0);
    assert!(stats.sales_by_category.is_empty());
    assert!(stats.log_counts.values().all(|n| *n == 0));
  }

  #[test]
  fn day_bounds_cover_whole_day() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let (start, end) = day_bounds(date);
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
    assert_eq!(
      end,
      Utc.with_ymd_and_hms(2025, 1, 15, 23, 59, 59).unwrap()
        + Duration::milliseconds(999)
    );
  }

  #[test]
  fn daily_summary_counts_event_types() {
    let entries = vec![
      sale(Some("Flower"), "cash", 2.0, 20.0),
      entry(LogType::Inventory, LogData::new()),
      entry(LogType::CashFloat, LogData::new()),
      entry(LogType::CashFloat, LogData::new()),
      entry(LogType::Employee, LogData::new()),
    ];
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    let summary = DailySummary::compute(date, &entries);

    assert_eq!(summary.sales_count, 1);
    assert_eq!(summary.total_items, 2.0);
    assert_eq!(summary.cash_float_events, 2);
    assert_eq!(summary.inventory_count, 1);
    assert_eq!(summary.waste_events, 0);

    let data = summary.to_data().unwrap();
    assert_eq!(data["date"], DataValue::from("2025-01-15"));
    assert_eq!(data["cashFloatEvents"].as_f64(), Some(2.0));
    assert!(matches!(data["salesByCategory"], DataValue::Nested(_)));
  }
}
