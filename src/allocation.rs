//! # Currency Allocation
//!
//! Maps fractional weights onto a concrete investment amount. Rounding is
//! done in integer minor units (cents) and the remainder lands on the
//! largest-weighted asset, so the table always sums exactly to the
//! investment.

use std::collections::BTreeMap;

use ndarray::Array1;

use crate::error::EngineError;
use crate::error::Result;

/// Currency amounts per asset; sums exactly to the requested investment.
pub type AllocationTable = BTreeMap<String, f64>;

/// Split `total_investment` across `assets` according to `weights`.
pub fn allocate(
  assets: &[String],
  weights: &Array1<f64>,
  total_investment: f64,
) -> Result<AllocationTable> {
  if !total_investment.is_finite() || total_investment <= 0.0 {
    return Err(EngineError::InvalidInput(format!(
      "investment amount must be positive, got {total_investment}"
    )));
  }
  if assets.len() != weights.len() {
    return Err(EngineError::InvalidInput(format!(
      "{} assets but {} weights",
      assets.len(),
      weights.len()
    )));
  }
  if assets.is_empty() {
    return Err(EngineError::InvalidInput("empty weight vector".into()));
  }

  let total_cents = (total_investment * 100.0).round() as i64;
  let mut cents: Vec<i64> = weights
    .iter()
    .map(|w| (w * total_investment * 100.0).round() as i64)
    .collect();

  // Floating-point weights rarely hit the total exactly once rounded;
  // the residual goes to the largest holding to avoid systematic bias.
  let assigned: i64 = cents.iter().sum();
  let remainder = total_cents - assigned;
  if remainder != 0 {
    let largest = weights
      .iter()
      .enumerate()
      .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
      .map(|(i, _)| i)
      .unwrap_or(0);
    cents[largest] += remainder;
  }

  Ok(
    assets
      .iter()
      .cloned()
      .zip(cents.into_iter().map(|c| c as f64 / 100.0))
      .collect(),
  )
}
