//! Till-side helpers: purchase-limit check and tax quote.

use axum::{
  Json,
  extract::{Query, State},
};
use canna_core::{
  jurisdiction::rules,
  limits::{BasketLine, LimitBreach},
  store::LogStore,
};
use serde::{Deserialize, Serialize};

use crate::Shared;

#[derive(Debug, Deserialize)]
pub struct PurchaseBody {
  pub basket: Vec<BasketLine>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseCheck {
  pub within_limits: bool,
  pub breaches:      Vec<LimitBreach>,
}

/// `POST /purchase-check` — advisory; nothing is recorded.
pub async fn purchase_check<S: LogStore>(
  State(engine): State<Shared<S>>,
  Json(body): Json<PurchaseBody>,
) -> Json<PurchaseCheck> {
  let breaches = engine.check_purchase(&body.basket).await;
  Json(PurchaseCheck { within_limits: breaches.is_empty(), breaches })
}

#[derive(Debug, Deserialize)]
pub struct TaxParams {
  pub subtotal: f64,
}

#[derive(Debug, Serialize)]
pub struct TaxQuote {
  pub subtotal: f64,
  pub rate:     f64,
  pub tax:      f64,
  pub total:    f64,
}

/// `GET /tax?subtotal=...`
pub async fn tax<S: LogStore>(
  State(engine): State<Shared<S>>,
  Query(params): Query<TaxParams>,
) -> Json<TaxQuote> {
  let rate = rules(engine.settings().await.jurisdiction).sales_tax_rate;
  let tax = engine.tax_for(params.subtotal).await;
  Json(TaxQuote {
    subtotal: params.subtotal,
    rate,
    tax,
    total: params.subtotal + tax,
  })
}
