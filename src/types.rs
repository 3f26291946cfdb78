//! # Shared Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Objective selectors and result containers shared across the engine.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::EngineError;
use crate::error::Result;

/// Convex objective solved by the mean-variance optimizer.
///
/// Each variant is an independent program; none is a post-processing of
/// another.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "objective", rename_all = "snake_case")]
pub enum Objective {
  /// Maximize `(w·mu - rf) / sqrt(w' Sigma w)`.
  MaxSharpe,
  /// Minimize `w' Sigma w`; the conservative baseline, always feasible.
  MinVolatility,
  /// Maximize `w·mu` subject to `sqrt(w' Sigma w) <= target_volatility`.
  EfficientRisk { target_volatility: f64 },
}

/// Weight-vector constraints enforced inside every solve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
  /// Per-asset concentration cap in `(0, 1]`; 1.0 means uncapped.
  pub max_weight: f64,
}

impl Default for Constraints {
  fn default() -> Self {
    Self { max_weight: 1.0 }
  }
}

impl Constraints {
  /// Check the cap is in domain and admits a weight vector summing to one.
  pub fn validate(&self, n_assets: usize) -> Result<()> {
    if !self.max_weight.is_finite() || self.max_weight <= 0.0 || self.max_weight > 1.0 {
      return Err(EngineError::InvalidInput(format!(
        "max_weight must lie in (0, 1], got {}",
        self.max_weight
      )));
    }

    // n assets capped at max_weight reach at most n * max_weight total.
    if (n_assets as f64) * self.max_weight < 1.0 - 1e-9 {
      return Err(EngineError::NoFeasibleSolution {
        n_assets,
        max_weight: self.max_weight,
      });
    }

    Ok(())
  }
}

/// Risk/return profile of a weight vector against `(mu, Sigma)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
  /// Annualized expected portfolio return `w·mu`.
  pub expected_return: f64,
  /// Annualized portfolio volatility `sqrt(w' Sigma w)`.
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`.
  pub sharpe_ratio: f64,
}

/// One solved objective: cleaned weights keyed by asset plus performance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizedPortfolio {
  /// Objective this portfolio solves.
  #[serde(flatten)]
  pub objective: Objective,
  /// Cleaned weights, summing to 1 within numerical tolerance.
  pub weights: BTreeMap<String, f64>,
  /// Performance of the cleaned weights.
  pub performance: PortfolioPerformance,
}

/// One random portfolio drawn by the frontier sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatedPortfolio {
  pub expected_return: f64,
  pub volatility: f64,
  pub sharpe_ratio: f64,
}

/// Column-oriented collection of simulated portfolios.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulatedCloud {
  pub returns: Vec<f64>,
  pub volatilities: Vec<f64>,
  pub sharpe_ratios: Vec<f64>,
}

impl SimulatedCloud {
  /// Number of portfolios in the cloud.
  pub fn len(&self) -> usize {
    self.returns.len()
  }

  /// True when the cloud holds no portfolios.
  pub fn is_empty(&self) -> bool {
    self.returns.is_empty()
  }
}

impl FromIterator<SimulatedPortfolio> for SimulatedCloud {
  fn from_iter<I: IntoIterator<Item = SimulatedPortfolio>>(iter: I) -> Self {
    let mut cloud = SimulatedCloud::default();
    for p in iter {
      cloud.returns.push(p.expected_return);
      cloud.volatilities.push(p.volatility);
      cloud.sharpe_ratios.push(p.sharpe_ratio);
    }
    cloud
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cap_domain_is_checked() {
    assert!(Constraints { max_weight: 0.0 }.validate(3).is_err());
    assert!(Constraints { max_weight: 1.2 }.validate(3).is_err());
    assert!(Constraints { max_weight: 1.0 }.validate(3).is_ok());
  }

  #[test]
  fn cap_feasibility_boundary() {
    // Two assets at 50% each can just reach a full allocation.
    assert!(Constraints { max_weight: 0.5 }.validate(2).is_ok());
    assert!(matches!(
      Constraints { max_weight: 0.4 }.validate(2),
      Err(EngineError::NoFeasibleSolution { .. })
    ));
  }

  #[test]
  fn objective_serializes_with_snake_case_tag() {
    let json = serde_json::to_value(Objective::MaxSharpe).unwrap();
    assert_eq!(json["objective"], "max_sharpe");

    let json = serde_json::to_value(Objective::EfficientRisk {
      target_volatility: 0.2,
    })
    .unwrap();
    assert_eq!(json["objective"], "efficient_risk");
    assert_eq!(json["target_volatility"], 0.2);
  }

  #[test]
  fn cloud_collects_column_wise() {
    let cloud: SimulatedCloud = [
      SimulatedPortfolio {
        expected_return: 0.1,
        volatility: 0.2,
        sharpe_ratio: 0.5,
      },
      SimulatedPortfolio {
        expected_return: 0.08,
        volatility: 0.1,
        sharpe_ratio: 0.8,
      },
    ]
    .into_iter()
    .collect();

    assert_eq!(cloud.len(), 2);
    assert_eq!(cloud.returns, vec![0.1, 0.08]);
    assert_eq!(cloud.sharpe_ratios, vec![0.5, 0.8]);
  }
}
