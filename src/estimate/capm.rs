//! # CAPM Expected Returns
//!
//! $$
//! \beta_i = \frac{\mathrm{Cov}(r_i, r_m)}{\mathrm{Var}(r_m)},\qquad
//! \mu_i = r_f + \beta_i(\bar r_m \cdot 252 - r_f)
//! $$
//!
//! Expected-return estimation from market-wide risk exposure rather than
//! raw historical means, which extrapolate poorly.

use linreg::linear_regression;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use crate::error::EngineError;
use crate::error::Result;
use crate::market::PriceMatrix;

/// Minimum overlapping return observations required for a beta estimate.
pub const MIN_OVERLAP_DAYS: usize = 20;

/// Annualized CAPM expected returns, ordered like `prices.assets()`.
///
/// When `benchmark` is given, betas are regressed against its return series
/// on the date intersection of the two matrices; otherwise the
/// equal-weighted cross-sectional mean of the asset returns stands in for
/// the market. An asset whose regression is degenerate (constant series,
/// zero market variance) gets beta 0 by convention.
pub fn capm_returns(
  prices: &PriceMatrix,
  benchmark: Option<&PriceMatrix>,
  risk_free: f64,
  trading_days: usize,
) -> Result<Array1<f64>> {
  let (asset_returns, market) = match benchmark {
    Some(bench) => {
      let common = prices.common_dates(bench);
      let asset_returns = prices.returns_on(&common);
      let market = row_mean(&bench.returns_on(&common));
      (asset_returns, market)
    }
    None => {
      let asset_returns = prices.daily_returns();
      let market = row_mean(&asset_returns);
      (asset_returns, market)
    }
  };

  let observations = asset_returns.nrows();
  if observations < MIN_OVERLAP_DAYS {
    return Err(EngineError::InsufficientHistory {
      required: MIN_OVERLAP_DAYS,
      actual: observations,
    });
  }

  let market_vec = market.to_vec();
  let market_annual = mean(&market_vec) * trading_days as f64;

  let mut mu = Array1::zeros(prices.n_assets());
  for (i, column) in asset_returns.axis_iter(Axis(1)).enumerate() {
    let asset_vec = column.to_vec();
    let beta = match linear_regression::<f64, f64, f64>(&market_vec, &asset_vec) {
      Ok((slope, _intercept)) => slope,
      Err(_) => {
        tracing::debug!(asset = %prices.assets()[i], "degenerate beta regression, using beta = 0");
        0.0
      }
    };
    mu[i] = risk_free + beta * (market_annual - risk_free);
  }

  Ok(mu)
}

fn row_mean(returns: &Array2<f64>) -> Array1<f64> {
  let n = returns.ncols().max(1) as f64;
  returns.sum_axis(Axis(1)) / n
}

fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}
