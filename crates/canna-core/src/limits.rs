//! Advisory purchase-limit and potency checks for a prospective basket.
//!
//! Nothing here blocks a sale; the result is for the till to display. A
//! staff override of a breach is a decision for the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::jurisdiction::JurisdictionRules;

/// One line of a prospective purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasketLine {
  /// Purchase-limit category: `dried`, `oil`, `seeds` or `plants`.
  pub category:  String,
  /// Amount in the category's unit (grams, mg THC, or count).
  pub amount:    f64,
  /// Potency class for the per-package ceiling: `edibles` or `extracts`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub thc_class: Option<String>,
  /// THC per package, in mg.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub thc_mg:    Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachKind {
  /// The basket total for a category exceeds the per-customer limit.
  PurchaseLimit,
  /// A single package exceeds the potency ceiling.
  ThcLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitBreach {
  pub kind:     BreachKind,
  pub category: String,
  pub amount:   f64,
  pub limit:    f64,
}

/// Every limit the basket exceeds under `rules`. Categories the
/// jurisdiction does not limit are ignored. Purchase breaches come first,
/// ordered by category; potency breaches follow in basket order.
pub fn check_purchase(basket: &[BasketLine], rules: &JurisdictionRules) -> Vec<LimitBreach> {
  let mut per_category: BTreeMap<String, f64> = BTreeMap::new();
  for line in basket {
    *per_category.entry(line.category.to_ascii_lowercase()).or_default() +=
      line.amount;
  }

  let purchase = per_category.into_iter().filter_map(|(category, amount)| {
    let limit = rules.purchase_limit(&category)?;
    (amount > limit).then_some(LimitBreach {
      kind: BreachKind::PurchaseLimit,
      category,
      amount,
      limit,
    })
  });

  let potency = basket.iter().filter_map(|line| {
    let class = line.thc_class.as_deref()?;
    let mg = line.thc_mg?;
    let limit = rules.thc_limit(class)?;
    (mg > limit).then(|| LimitBreach {
      kind: BreachKind::ThcLimit,
      category: class.to_ascii_lowercase(),
      amount: mg,
      limit,
    })
  });

  purchase.chain(potency).collect()
}
