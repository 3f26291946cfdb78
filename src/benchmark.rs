//! # Benchmark Comparison
//!
//! Window performance of a benchmark price series (an index tracker,
//! typically) and the portfolio's outperformance against it.

use ndarray::Axis;
use serde::Deserialize;
use serde::Serialize;

use crate::error::EngineError;
use crate::error::Result;
use crate::market::PriceMatrix;

/// Realized benchmark statistics over the price window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPerformance {
  /// Simple return over the whole window, `last/first - 1`.
  pub total_return: f64,
  /// Total return compounded to an annual rate.
  pub annualized_return: f64,
  /// Annualized standard deviation of daily returns.
  pub volatility: f64,
  /// Portfolio expected return minus the annualized benchmark return.
  pub outperformance: f64,
}

/// Benchmark statistics plus outperformance of the given portfolio return.
///
/// A multi-column benchmark matrix is treated as an equal-weighted basket.
pub fn benchmark_performance(
  benchmark: &PriceMatrix,
  portfolio_expected_return: f64,
  trading_days: usize,
) -> Result<BenchmarkPerformance> {
  if benchmark.n_dates() < 2 {
    return Err(EngineError::InsufficientHistory {
      required: 2,
      actual: benchmark.n_dates(),
    });
  }

  let prices = benchmark.prices();
  let n = prices.ncols() as f64;
  let first: f64 = prices.row(0).sum() / n;
  let last: f64 = prices.row(prices.nrows() - 1).sum() / n;
  let total_return = last / first - 1.0;

  let days = benchmark.n_dates() - 1;
  let years = days as f64 / trading_days as f64;
  let annualized_return = (1.0 + total_return).powf(1.0 / years) - 1.0;

  let returns = benchmark.daily_returns();
  let basket = returns.sum_axis(Axis(1)) / n;
  let mean = basket.sum() / basket.len() as f64;
  let var = basket.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>()
    / (basket.len() as f64 - 1.0).max(1.0);
  let volatility = var.sqrt() * (trading_days as f64).sqrt();

  Ok(BenchmarkPerformance {
    total_return,
    annualized_return,
    volatility,
    outperformance: portfolio_expected_return - annualized_return,
  })
}
