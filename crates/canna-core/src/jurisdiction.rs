//! The jurisdiction rule table and deadline calendar.
//!
//! Every Canadian province and territory gets exactly one
//! [`JurisdictionRules::new`] call below; variations from the common shape
//! are layered on with the `with_*` builders so the table can be read
//! column by column.
//!
//! Lookups never fail: an unrecognised code resolves to the default
//! jurisdiction (British Columbia).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use strum::{Display, EnumIter, EnumString};

use crate::settings::Cadence;

// ─── Jurisdiction ────────────────────────────────────────────────────────────

/// A Canadian province or territory, identified by its two-letter code.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(from = "String")]
#[strum(ascii_case_insensitive)]
pub enum Jurisdiction {
  #[default]
  #[serde(rename = "BC")]
  #[strum(serialize = "BC")]
  BritishColumbia,
  #[serde(rename = "ON")]
  #[strum(serialize = "ON")]
  Ontario,
  #[serde(rename = "AB")]
  #[strum(serialize = "AB")]
  Alberta,
  #[serde(rename = "QC")]
  #[strum(serialize = "QC")]
  Quebec,
  #[serde(rename = "MB")]
  #[strum(serialize = "MB")]
  Manitoba,
  #[serde(rename = "SK")]
  #[strum(serialize = "SK")]
  Saskatchewan,
  #[serde(rename = "NS")]
  #[strum(serialize = "NS")]
  NovaScotia,
  #[serde(rename = "NB")]
  #[strum(serialize = "NB")]
  NewBrunswick,
  #[serde(rename = "NL")]
  #[strum(serialize = "NL")]
  NewfoundlandAndLabrador,
  #[serde(rename = "PE")]
  #[strum(serialize = "PE")]
  PrinceEdwardIsland,
  #[serde(rename = "YT")]
  #[strum(serialize = "YT")]
  Yukon,
  #[serde(rename = "NT")]
  #[strum(serialize = "NT")]
  NorthwestTerritories,
  #[serde(rename = "NU")]
  #[strum(serialize = "NU")]
  Nunavut,
}

/// Stored and submitted codes resolve like [`Jurisdiction::from_code_or_default`].
impl From<String> for Jurisdiction {
  fn from(code: String) -> Self { Self::from_code_or_default(&code) }
}

impl Jurisdiction {
  /// Resolve a code, falling back to the default jurisdiction.
  pub fn from_code_or_default(code: &str) -> Self {
    code.trim().parse().unwrap_or_default()
  }

  /// The full English name, e.g. `"Ontario"`.
  pub fn name(self) -> &'static str {
    match self {
      Self::BritishColumbia => "British Columbia",
      Self::Ontario => "Ontario",
      Self::Alberta => "Alberta",
      Self::Quebec => "Quebec",
      Self::Manitoba => "Manitoba",
      Self::Saskatchewan => "Saskatchewan",
      Self::NovaScotia => "Nova Scotia",
      Self::NewBrunswick => "New Brunswick",
      Self::NewfoundlandAndLabrador => "Newfoundland and Labrador",
      Self::PrinceEdwardIsland => "Prince Edward Island",
      Self::Yukon => "Yukon",
      Self::NorthwestTerritories => "Northwest Territories",
      Self::Nunavut => "Nunavut",
    }
  }
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// `(category, limit)` pairs; serialised as a JSON object.
pub type Limits = &'static [(&'static str, f64)];

/// Regulatory parameters for one jurisdiction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionRules {
  pub jurisdiction:                  Jurisdiction,
  pub sales_reporting_frequency:     Cadence,
  pub inventory_reporting_frequency: Cadence,
  /// Combined sales tax as a decimal fraction.
  pub sales_tax_rate:                f64,
  /// Per-customer purchase limits: `dried` (g), `oil` (mg THC), `seeds`,
  /// `plants`.
  #[serde(serialize_with = "limits_as_map")]
  pub purchase_limits:               Limits,
  /// Keys every `sale` entry's data must carry with a non-empty value.
  pub required_fields:               &'static [&'static str],
  /// Years logs must be retained.
  pub retention_period:              u32,
  pub waste_reporting:               bool,
  pub delivery_allowed:              bool,
  /// Per-package THC ceilings in mg: `edibles`, `extracts`.
  #[serde(serialize_with = "limits_as_map")]
  pub thc_limits:                    Limits,
}

const STANDARD_FIELDS: &[&str] = &[
  "customerAge",
  "productSKU",
  "productCategory",
  "quantity",
  "price",
  "taxAmount",
  "paymentMethod",
  "employeeID",
  "timestamp",
];

const ONTARIO_FIELDS: &[&str] = &[
  "customerAge",
  "productSKU",
  "productCategory",
  "quantity",
  "price",
  "taxAmount",
  "paymentMethod",
  "employeeID",
  "timestamp",
  "storeID",
];

const QUEBEC_FIELDS: &[&str] = &[
  "customerAge",
  "productSKU",
  "productCategory",
  "quantity",
  "price",
  "taxAmount",
  "paymentMethod",
  "employeeID",
  "timestamp",
  "customerPostalCode",
];

const STANDARD_PURCHASE_LIMITS: Limits =
  &[("dried", 30.0), ("oil", 2100.0), ("seeds", 30.0), ("plants", 4.0)];

// Home cultivation is prohibited in Quebec.
const QUEBEC_PURCHASE_LIMITS: Limits =
  &[("dried", 30.0), ("oil", 2100.0), ("seeds", 30.0), ("plants", 0.0)];

const STANDARD_THC_LIMITS: Limits = &[("edibles", 10.0), ("extracts", 1000.0)];

impl JurisdictionRules {
  /// The common shape: standard purchase and potency limits, seven-year
  /// retention, waste reporting and delivery enabled.
  const fn new(
    jurisdiction: Jurisdiction,
    sales_reporting_frequency: Cadence,
    inventory_reporting_frequency: Cadence,
    sales_tax_rate: f64,
  ) -> Self {
    Self {
      jurisdiction,
      sales_reporting_frequency,
      inventory_reporting_frequency,
      sales_tax_rate,
      purchase_limits: STANDARD_PURCHASE_LIMITS,
      required_fields: STANDARD_FIELDS,
      retention_period: 7,
      waste_reporting: true,
      delivery_allowed: true,
      thc_limits: STANDARD_THC_LIMITS,
    }
  }

  const fn with_required_fields(mut self, fields: &'static [&'static str]) -> Self {
    self.required_fields = fields;
    self
  }

  const fn with_purchase_limits(mut self, limits: Limits) -> Self {
    self.purchase_limits = limits;
    self
  }

  const fn without_delivery(mut self) -> Self {
    self.delivery_allowed = false;
    self
  }

  /// The per-customer limit for a purchase category, if one applies.
  pub fn purchase_limit(&self, category: &str) -> Option<f64> {
    lookup(self.purchase_limits, category)
  }

  /// The per-package THC ceiling for a product class, if one applies.
  pub fn thc_limit(&self, class: &str) -> Option<f64> {
    lookup(self.thc_limits, class)
  }

  /// Sales tax owed on `subtotal`, rounded to the cent.
  pub fn tax_for(&self, subtotal: f64) -> f64 {
    (subtotal * self.sales_tax_rate * 100.0).round() / 100.0
  }
}

fn lookup(limits: Limits, key: &str) -> Option<f64> {
  limits
    .iter()
    .find(|(k, _)| k.eq_ignore_ascii_case(key))
    .map(|(_, v)| *v)
}

fn limits_as_map<S: Serializer>(
  limits: &Limits,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  let mut map = serializer.serialize_map(Some(limits.len()))?;
  for (k, v) in limits.iter() {
    map.serialize_entry(k, v)?;
  }
  map.end()
}

use Cadence::{Daily, Monthly, Weekly};
use Jurisdiction::*;

/// The rule table. The first row is the fallback for unknown codes.
static RULES: [JurisdictionRules; 13] = [
  JurisdictionRules::new(BritishColumbia, Monthly, Monthly, 0.12),
  JurisdictionRules::new(Ontario, Weekly, Weekly, 0.13)
    .with_required_fields(ONTARIO_FIELDS),
  JurisdictionRules::new(Alberta, Monthly, Monthly, 0.05).without_delivery(),
  JurisdictionRules::new(Quebec, Daily, Weekly, 0.14975)
    .with_required_fields(QUEBEC_FIELDS)
    .with_purchase_limits(QUEBEC_PURCHASE_LIMITS),
  JurisdictionRules::new(Manitoba, Monthly, Monthly, 0.12),
  JurisdictionRules::new(Saskatchewan, Monthly, Monthly, 0.11),
  JurisdictionRules::new(NovaScotia, Weekly, Weekly, 0.15),
  JurisdictionRules::new(NewBrunswick, Weekly, Weekly, 0.15),
  JurisdictionRules::new(NewfoundlandAndLabrador, Monthly, Monthly, 0.15),
  JurisdictionRules::new(PrinceEdwardIsland, Monthly, Monthly, 0.15),
  JurisdictionRules::new(Yukon, Monthly, Monthly, 0.05),
  JurisdictionRules::new(NorthwestTerritories, Monthly, Monthly, 0.05),
  JurisdictionRules::new(Nunavut, Monthly, Monthly, 0.05),
];

/// Rules for `jurisdiction`.
pub fn rules(jurisdiction: Jurisdiction) -> &'static JurisdictionRules {
  RULES
    .iter()
    .find(|r| r.jurisdiction == jurisdiction)
    .unwrap_or(&RULES[0])
}

/// Rules for a raw code; unknown codes resolve to the default jurisdiction.
pub fn rules_for(code: &str) -> &'static JurisdictionRules {
  rules(Jurisdiction::from_code_or_default(code))
}

// ─── Deadline calendar ───────────────────────────────────────────────────────

/// A dated regulatory obligation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceDeadline {
  pub date:        NaiveDate,
  pub description: String,
}

type CalendarRow = (i32, u32, u32, &'static str);

const MONTHLY_REPORT: &str = "Monthly sales report due";
const QUARTERLY_AUDIT: &str = "Quarterly inventory audit due";
const LICENSE_RENEWAL: &str = "Annual license renewal due";

const BC_CALENDAR: &[CalendarRow] = &[
  (2025, 1, 31, MONTHLY_REPORT),
  (2025, 2, 28, MONTHLY_REPORT),
  (2025, 3, 31, MONTHLY_REPORT),
  (2025, 4, 30, MONTHLY_REPORT),
  (2025, 5, 31, MONTHLY_REPORT),
  (2025, 6, 30, MONTHLY_REPORT),
  (2025, 7, 31, MONTHLY_REPORT),
  (2025, 8, 31, MONTHLY_REPORT),
  (2025, 9, 30, MONTHLY_REPORT),
  (2025, 10, 31, MONTHLY_REPORT),
  (2025, 11, 30, MONTHLY_REPORT),
  (2025, 12, 31, MONTHLY_REPORT),
  (2025, 4, 30, LICENSE_RENEWAL),
];

const ON_CALENDAR: &[CalendarRow] = &[
  (2025, 1, 7, "Weekly sales report due"),
  (2025, 3, 31, QUARTERLY_AUDIT),
  (2025, 6, 30, QUARTERLY_AUDIT),
  (2025, 9, 30, QUARTERLY_AUDIT),
  (2025, 12, 31, QUARTERLY_AUDIT),
  (2025, 5, 15, LICENSE_RENEWAL),
];

/// Jurisdictions with their own calendar; everyone else uses the first row.
static CALENDARS: &[(Jurisdiction, &[CalendarRow])] =
  &[(BritishColumbia, BC_CALENDAR), (Ontario, ON_CALENDAR)];

/// The deadline calendar for `jurisdiction`, in calendar order.
pub fn calendar(jurisdiction: Jurisdiction) -> Vec<ComplianceDeadline> {
  let rows = CALENDARS
    .iter()
    .find(|(j, _)| *j == jurisdiction)
    .unwrap_or(&CALENDARS[0])
    .1;

  rows
    .iter()
    .filter_map(|&(y, m, d, description)| {
      Some(ComplianceDeadline {
        date:        NaiveDate::from_ymd_opt(y, m, d)?,
        description: description.to_owned(),
      })
    })
    .collect()
}

/// The deadline calendar for a raw code, with the usual fallback.
pub fn deadline_calendar(code: &str) -> Vec<ComplianceDeadline> {
  calendar(Jurisdiction::from_code_or_default(code))
}
