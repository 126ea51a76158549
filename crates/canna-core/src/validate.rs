//! Sale validation, reporting periods, deadlines and compliance status.
//!
//! Everything here is a pure function of its inputs; "today" and "now" are
//! always passed in so results are reproducible. All calendar arithmetic is
//! UTC.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  Result,
  jurisdiction::{
    ComplianceDeadline,
    Jurisdiction,
    JurisdictionRules,
    calendar,
    rules,
  },
  log::{LogEntry, LogType},
  settings::{Cadence, ComplianceSettings},
  value::LogData,
};

// ─── Sale fields ─────────────────────────────────────────────────────────────

/// Names of the required fields `data` is missing, in `requiredFields` order.
pub fn validate_sale_fields(data: &LogData, rules: &JurisdictionRules) -> Vec<String> {
  rules
    .required_fields
    .iter()
    .filter(|field| data.get(**field).is_none_or(|v| v.is_missing()))
    .map(|field| (*field).to_owned())
    .collect()
}

/// Like [`validate_sale_fields`], but as a gate: any missing field is an
/// [`Error::MissingFields`].
pub fn ensure_sale_complete(data: &LogData, rules: &JurisdictionRules) -> Result<()> {
  let fields = validate_sale_fields(data, rules);
  if fields.is_empty() {
    Ok(())
  } else {
    Err(Error::MissingFields {
      jurisdiction: rules.jurisdiction.to_string(),
      fields,
    })
  }
}

// ─── Reporting periods ───────────────────────────────────────────────────────

/// Start of the reporting period containing `now`: today 00:00 (daily), the
/// most recent Sunday 00:00 (weekly), or the first of the month 00:00
/// (monthly).
pub fn period_start(cadence: Cadence, now: DateTime<Utc>) -> DateTime<Utc> {
  let today = now.date_naive();
  let day = match cadence {
    Cadence::Daily => today,
    Cadence::Weekly => {
      today - Duration::days(i64::from(today.weekday().num_days_from_sunday()))
    }
    Cadence::Monthly => today.with_day(1).unwrap_or(today),
  };
  day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// The next reporting date after `today`: tomorrow (daily), the next Sunday,
/// a full week ahead when today is Sunday (weekly), or the first of next
/// month (monthly).
pub fn next_reporting_date(cadence: Cadence, today: NaiveDate) -> NaiveDate {
  match cadence {
    Cadence::Daily => today + Duration::days(1),
    Cadence::Weekly => {
      let until_sunday = 7 - i64::from(today.weekday().num_days_from_sunday());
      today + Duration::days(until_sunday)
    }
    Cadence::Monthly => {
      let first = today.with_day(1).unwrap_or(today);
      first + Months::new(1)
    }
  }
}

// ─── Deadlines ───────────────────────────────────────────────────────────────

/// Calendar deadlines within `[today, today + days_ahead]`, in calendar order.
/// Unknown codes use the default jurisdiction's calendar.
pub fn upcoming_deadlines(
  code: &str,
  days_ahead: u32,
  today: NaiveDate,
) -> Vec<ComplianceDeadline> {
  deadlines_within(Jurisdiction::from_code_or_default(code), days_ahead, today)
}

pub fn deadlines_within(
  jurisdiction: Jurisdiction,
  days_ahead: u32,
  today: NaiveDate,
) -> Vec<ComplianceDeadline> {
  let horizon = today + Duration::days(i64::from(days_ahead));
  calendar(jurisdiction)
    .into_iter()
    .filter(|d| d.date >= today && d.date <= horizon)
    .collect()
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// One required field missing from one logged sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingField {
  pub log_id: String,
  pub field:  String,
}

/// Compliance dashboard for the current reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceStatusReport {
  pub jurisdiction:             String,
  pub jurisdiction_name:        String,
  pub reporting_frequency:      Cadence,
  pub upcoming_deadlines:       Vec<ComplianceDeadline>,
  pub current_period_log_count: usize,
  pub sales_log_count:          usize,
  pub missing_fields:           Vec<MissingField>,
  pub compliant:                bool,
  pub next_reporting_date:      NaiveDate,
}

/// Build the status report from the entries logged since the start of the
/// current period (see [`period_start`]).
pub fn compute_status(
  settings: &ComplianceSettings,
  period_entries: &[LogEntry],
  now: DateTime<Utc>,
) -> ComplianceStatusReport {
  let rules = rules(settings.jurisdiction);
  let today = now.date_naive();

  let sales: Vec<&LogEntry> = period_entries
    .iter()
    .filter(|e| e.log_type == LogType::Sale)
    .collect();

  let missing_fields: Vec<MissingField> = sales
    .iter()
    .flat_map(|entry| {
      validate_sale_fields(&entry.data, rules)
        .into_iter()
        .map(|field| MissingField { log_id: entry.id.clone(), field })
    })
    .collect();

  ComplianceStatusReport {
    jurisdiction: settings.jurisdiction.to_string(),
    jurisdiction_name: settings.jurisdiction.name().to_owned(),
    reporting_frequency: rules.sales_reporting_frequency,
    upcoming_deadlines: deadlines_within(
      settings.jurisdiction,
      settings.notify_days,
      today,
    ),
    current_period_log_count: period_entries.len(),
    sales_log_count: sales.len(),
    compliant: missing_fields.is_empty(),
    missing_fields,
    next_reporting_date: next_reporting_date(
      rules.sales_reporting_frequency,
      today,
    ),
  }
}
