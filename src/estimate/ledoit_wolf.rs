//! # Ledoit-Wolf Shrinkage
//!
//! $$
//! \Sigma_{LW} = \delta\, m I + (1-\delta)\, S,\qquad
//! \delta = b^2/d^2
//! $$
//!
//! Shrinks the sample covariance toward the scaled identity so the risk
//! matrix stays invertible when the sample length approaches the asset
//! count. The intensity is the Ledoit-Wolf closed form, estimated from the
//! data on every call.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use crate::error::EngineError;
use crate::error::Result;
use crate::market::PriceMatrix;

/// Floor applied to the covariance diagonal after annualization.
const VARIANCE_FLOOR: f64 = 1e-10;

/// Annualized shrunk covariance matrix of daily returns.
///
/// Symmetric by construction; the diagonal is floored at a small epsilon so
/// exact-zero-variance inputs cannot produce a zero diagonal entry.
pub fn ledoit_wolf(prices: &PriceMatrix, trading_days: usize) -> Result<Array2<f64>> {
  let (sample, target_scale, delta) = shrinkage_parts(prices)?;
  let n = sample.nrows();

  tracing::debug!(delta, avg_variance = target_scale, "ledoit-wolf shrinkage");

  let mut sigma = sample * (1.0 - delta);
  for i in 0..n {
    sigma[[i, i]] += delta * target_scale;
  }

  sigma *= trading_days as f64;
  for i in 0..n {
    if sigma[[i, i]] < VARIANCE_FLOOR {
      sigma[[i, i]] = VARIANCE_FLOOR;
    }
  }

  Ok(sigma)
}

/// Shrinkage intensity alone, for diagnostics.
pub fn shrinkage_intensity(prices: &PriceMatrix) -> Result<f64> {
  let (_, _, delta) = shrinkage_parts(prices)?;
  Ok(delta)
}

fn shrinkage_parts(prices: &PriceMatrix) -> Result<(Array2<f64>, f64, f64)> {
  let n = prices.n_assets();
  if n < 2 {
    return Err(EngineError::InvalidInput(format!(
      "covariance requires at least 2 assets, got {n}"
    )));
  }

  let returns = prices.daily_returns();
  let t = returns.nrows();
  if t < 2 {
    return Err(EngineError::InsufficientHistory {
      required: 2,
      actual: t,
    });
  }

  let means = returns.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(n));
  let centered = &returns - &means.insert_axis(Axis(0));

  // S = X'X / T, the maximum-likelihood sample covariance.
  let sample = centered.t().dot(&centered) / t as f64;

  // m = <S, I>: average variance, the scale of the identity target.
  let m = sample.diag().sum() / n as f64;

  // d^2 = ||S - mI||^2 under the trace norm normalized by n.
  let mut d2 = 0.0;
  for i in 0..n {
    for j in 0..n {
      let target_ij = if i == j { m } else { 0.0 };
      let diff = sample[[i, j]] - target_ij;
      d2 += diff * diff;
    }
  }
  d2 /= n as f64;

  // b̄^2 averages ||x_t x_t' - S||^2 over observations; it measures how
  // noisy the sample covariance is around its own expectation.
  let mut b2_bar = 0.0;
  for row in centered.axis_iter(Axis(0)) {
    let mut dist = 0.0;
    for i in 0..n {
      for j in 0..n {
        let diff = row[i] * row[j] - sample[[i, j]];
        dist += diff * diff;
      }
    }
    b2_bar += dist / n as f64;
  }
  b2_bar /= (t * t) as f64;

  let b2 = b2_bar.min(d2);
  let delta = if d2 > 0.0 { (b2 / d2).clamp(0.0, 1.0) } else { 0.0 };

  Ok((sample, m, delta))
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use chrono::Days;
  use chrono::NaiveDate;
  use ndarray::array;

  use super::*;

  fn matrix(columns: &[(&str, Vec<f64>)]) -> PriceMatrix {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    PriceMatrix::from_series(columns.iter().map(|(asset, closes)| {
      (
        asset.to_string(),
        closes
          .iter()
          .enumerate()
          .map(|(i, &p)| (start.checked_add_days(Days::new(i as u64)).unwrap(), p))
          .collect(),
      )
    }))
    .unwrap()
  }

  fn wavy(base: f64, amplitude: f64, phase: f64, len: usize) -> Vec<f64> {
    (0..len)
      .map(|i| base * (1.0 + amplitude * (i as f64 * 0.7 + phase).sin()))
      .collect()
  }

  #[test]
  fn single_asset_is_rejected() {
    let prices = matrix(&[("ONLY", wavy(100.0, 0.02, 0.0, 30))]);
    let err = ledoit_wolf(&prices, 252).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
  }

  #[test]
  fn output_is_symmetric_with_positive_diagonal() {
    let prices = matrix(&[
      ("AAA", wavy(100.0, 0.02, 0.0, 60)),
      ("BBB", wavy(50.0, 0.03, 1.3, 60)),
      ("CCC", wavy(20.0, 0.01, 2.6, 60)),
    ]);

    let sigma = ledoit_wolf(&prices, 252).unwrap();
    for i in 0..3 {
      assert!(sigma[[i, i]] > 0.0);
      for j in 0..3 {
        assert_relative_eq!(sigma[[i, j]], sigma[[j, i]], epsilon = 1e-12);
      }
    }
  }

  #[test]
  fn intensity_stays_in_unit_interval() {
    let prices = matrix(&[
      ("AAA", wavy(100.0, 0.02, 0.0, 25)),
      ("BBB", wavy(50.0, 0.03, 1.3, 25)),
    ]);

    let delta = shrinkage_intensity(&prices).unwrap();
    assert!((0.0..=1.0).contains(&delta));
  }

  #[test]
  fn duplicate_assets_stay_invertible_after_shrinkage() {
    // Identical columns make the raw sample covariance exactly singular;
    // the direction w = (1, -1, 0) has zero sample variance.
    let closes = wavy(100.0, 0.02, 0.0, 40);
    let prices = matrix(&[
      ("AAA", closes.clone()),
      ("CLONE", closes),
      ("BBB", wavy(50.0, 0.03, 1.3, 40)),
    ]);

    let delta = shrinkage_intensity(&prices).unwrap();
    assert!(delta > 0.0);

    let sigma = ledoit_wolf(&prices, 252).unwrap();
    let w = array![1.0, -1.0, 0.0];
    let quad = w.dot(&sigma.dot(&w));
    assert!(quad > 0.0, "shrunk matrix left a null direction: {quad}");
  }

  #[test]
  fn annualization_scales_the_daily_estimate() {
    let prices = matrix(&[
      ("AAA", wavy(100.0, 0.02, 0.0, 60)),
      ("BBB", wavy(50.0, 0.03, 1.3, 60)),
    ]);

    let daily = ledoit_wolf(&prices, 1).unwrap();
    let annual = ledoit_wolf(&prices, 252).unwrap();
    assert_relative_eq!(annual[[0, 1]], daily[[0, 1]] * 252.0, epsilon = 1e-12);
  }
}
