//! # Mean-Variance Objectives
//!
//! $$
//! \max_{\mathbf{w}}\ \frac{\mu^\top\mathbf{w}-r_f}{\sqrt{\mathbf{w}^\top\Sigma\mathbf{w}}},\qquad
//! \min_{\mathbf{w}}\ \mathbf{w}^\top\Sigma\mathbf{w},\qquad
//! \max_{\mathbf{w}}\ \mu^\top\mathbf{w}\ \text{s.t.}\ \sigma_p \le \sigma^\*
//! $$
//!
//! Each objective is solved as its own deterministic convex program over
//! the capped simplex; none is derived from another by post-processing.
//! The workhorse is a projected-gradient solve of the risk-aversion form
//! `min lambda w'Sigma w - mu'w`, swept over lambda where the objective
//! calls for a frontier search.

use ndarray::Array1;
use ndarray::Array2;

use super::simplex::max_return_corner;
use super::simplex::project_capped_simplex;
use crate::error::EngineError;
use crate::error::Result;
use crate::types::Constraints;
use crate::types::Objective;
use crate::types::PortfolioPerformance;

/// Weights below this are solver dust, not allocations.
const DUST_THRESHOLD: f64 = 1e-4;
/// Volatility floor guarding the Sharpe division.
const VOL_FLOOR: f64 = 1e-12;

const PG_MAX_ITERS: usize = 4000;
const PG_STEP_TOL: f64 = 1e-12;
const SWEEP_ITERS: usize = 64;
const LAMBDA_LO: f64 = 1e-6;
const LAMBDA_HI: f64 = 1e8;

/// Solve one objective and report the cleaned weights' performance.
///
/// Deterministic: identical inputs produce identical weights.
pub fn optimize(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  objective: Objective,
  constraints: &Constraints,
  risk_free: f64,
) -> Result<(Array1<f64>, PortfolioPerformance)> {
  validate_inputs(mu, sigma)?;
  constraints.validate(mu.len())?;

  if !is_positive_definite(sigma) {
    return Err(EngineError::SingularCovariance);
  }

  let cap = constraints.max_weight;
  let raw = match objective {
    Objective::MinVolatility => solve_risk_aversion(sigma, None, 1.0, cap),
    Objective::MaxSharpe => solve_max_sharpe(mu, sigma, risk_free, cap),
    Objective::EfficientRisk { target_volatility } => {
      solve_efficient_risk(mu, sigma, target_volatility, cap)?
    }
  };

  let weights = clean_weights(raw, cap)?;
  let performance = portfolio_performance(&weights, mu, sigma, risk_free);
  Ok((weights, performance))
}

/// Risk/return triple of an arbitrary weight vector against `(mu, Sigma)`.
pub fn portfolio_performance(
  weights: &Array1<f64>,
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
) -> PortfolioPerformance {
  let expected_return = weights.dot(mu);
  let volatility = volatility(weights, sigma);
  let sharpe_ratio = if volatility > VOL_FLOOR {
    (expected_return - risk_free) / volatility
  } else {
    0.0
  };

  PortfolioPerformance {
    expected_return,
    volatility,
    sharpe_ratio,
  }
}

fn validate_inputs(mu: &Array1<f64>, sigma: &Array2<f64>) -> Result<()> {
  let n = mu.len();
  if n == 0 {
    return Err(EngineError::InvalidInput("empty return vector".into()));
  }
  if sigma.nrows() != n || sigma.ncols() != n {
    return Err(EngineError::InvalidInput(format!(
      "covariance is {}x{} but {n} assets were given",
      sigma.nrows(),
      sigma.ncols()
    )));
  }

  for i in 0..n {
    for j in (i + 1)..n {
      let diff = (sigma[[i, j]] - sigma[[j, i]]).abs();
      let scale = sigma[[i, j]].abs().max(1.0);
      if diff > 1e-8 * scale {
        return Err(EngineError::InvalidInput(format!(
          "covariance not symmetric at ({i}, {j})"
        )));
      }
    }
  }

  if mu.iter().any(|x| !x.is_finite()) || sigma.iter().any(|x| !x.is_finite()) {
    return Err(EngineError::InvalidInput(
      "non-finite entries in estimation inputs".into(),
    ));
  }

  Ok(())
}

/// Cholesky feasibility probe; the factor itself is discarded.
fn is_positive_definite(sigma: &Array2<f64>) -> bool {
  let n = sigma.nrows();
  let mut l = Array2::<f64>::zeros((n, n));

  for i in 0..n {
    for j in 0..=i {
      let mut sum = sigma[[i, j]];
      for k in 0..j {
        sum -= l[[i, k]] * l[[j, k]];
      }
      if i == j {
        if sum <= 0.0 {
          return false;
        }
        l[[i, j]] = sum.sqrt();
      } else {
        l[[i, j]] = sum / l[[j, j]];
      }
    }
  }
  true
}

fn volatility(weights: &Array1<f64>, sigma: &Array2<f64>) -> f64 {
  weights.dot(&sigma.dot(weights)).max(0.0).sqrt()
}

/// Projected gradient on `lambda w'Sigma w - mu'w` over the capped simplex.
///
/// The step is `1/L` for the exact gradient Lipschitz constant
/// `L = 2 lambda ||Sigma||`, so iterates descend monotonically.
fn solve_risk_aversion(
  sigma: &Array2<f64>,
  mu: Option<&Array1<f64>>,
  lambda: f64,
  cap: f64,
) -> Array1<f64> {
  let n = sigma.nrows();
  let equal = Array1::from_elem(n, 1.0 / n as f64);
  let mut w = project_capped_simplex(&equal, cap);

  let row_norm = sigma
    .rows()
    .into_iter()
    .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
    .fold(0.0, f64::max);
  let step = 1.0 / (2.0 * lambda * row_norm).max(VOL_FLOOR);

  for _ in 0..PG_MAX_ITERS {
    let mut grad = sigma.dot(&w) * (2.0 * lambda);
    if let Some(mu) = mu {
      grad -= mu;
    }

    let next = project_capped_simplex(&(&w - &(grad * step)), cap);
    let moved = (&next - &w).iter().map(|x| x.abs()).sum::<f64>();
    w = next;
    if moved < PG_STEP_TOL {
      break;
    }
  }

  w
}

/// Golden-section search over `ln lambda` along the parametric frontier.
///
/// The Sharpe ratio is quasiconcave along the efficient frontier, so a
/// unimodal line search over the risk-aversion parameter finds the
/// tangency portfolio.
fn solve_max_sharpe(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  risk_free: f64,
  cap: f64,
) -> Array1<f64> {
  let sharpe_at = |lambda: f64| -> (f64, Array1<f64>) {
    let w = solve_risk_aversion(sigma, Some(mu), lambda, cap);
    let perf = portfolio_performance(&w, mu, sigma, risk_free);
    (perf.sharpe_ratio, w)
  };

  let mut best = sharpe_at(LAMBDA_HI);
  for candidate in [sharpe_at(LAMBDA_LO), sharpe_at(1.0)] {
    if candidate.0 > best.0 {
      best = candidate;
    }
  }

  let phi = (5.0_f64.sqrt() - 1.0) / 2.0;
  let mut a = LAMBDA_LO.ln();
  let mut b = LAMBDA_HI.ln();
  let mut c = b - phi * (b - a);
  let mut d = a + phi * (b - a);
  let mut fc = sharpe_at(c.exp());
  let mut fd = sharpe_at(d.exp());

  for _ in 0..SWEEP_ITERS {
    if fc.0 > best.0 {
      best = fc.clone();
    }
    if fd.0 > best.0 {
      best = fd.clone();
    }

    if fc.0 > fd.0 {
      b = d;
      d = c;
      fd = fc;
      c = b - phi * (b - a);
      fc = sharpe_at(c.exp());
    } else {
      a = c;
      c = d;
      fc = fd;
      d = a + phi * (b - a);
      fd = sharpe_at(d.exp());
    }
  }

  best.1
}

/// Bisection over risk aversion until the volatility budget is spent.
///
/// Tracks the best feasible iterate by return; the min-volatility
/// portfolio seeds it, so the result is always within the target.
fn solve_efficient_risk(
  mu: &Array1<f64>,
  sigma: &Array2<f64>,
  target_volatility: f64,
  cap: f64,
) -> Result<Array1<f64>> {
  if !target_volatility.is_finite() {
    return Err(EngineError::InvalidInput(
      "target volatility must be finite".into(),
    ));
  }

  let w_min = solve_risk_aversion(sigma, None, 1.0, cap);
  let vol_min = volatility(&w_min, sigma);
  if target_volatility < vol_min - 1e-12 {
    return Err(EngineError::InfeasibleTarget {
      target: target_volatility,
      minimum: vol_min,
    });
  }

  // The volatility constraint may be slack: the unconstrained maximum of a
  // linear objective over the simplex is a corner.
  let corner = max_return_corner(mu, cap);
  if volatility(&corner, sigma) <= target_volatility {
    return Ok(corner);
  }

  let mut best_w = w_min;
  let mut best_ret = best_w.dot(mu);

  let mut lo = LAMBDA_LO.ln();
  let mut hi = LAMBDA_HI.ln();
  for _ in 0..SWEEP_ITERS {
    let lambda = (0.5 * (lo + hi)).exp();
    let w = solve_risk_aversion(sigma, Some(mu), lambda, cap);

    if volatility(&w, sigma) > target_volatility {
      lo = lambda.ln();
    } else {
      hi = lambda.ln();
      let ret = w.dot(mu);
      if ret > best_ret {
        best_ret = ret;
        best_w = w;
      }
    }
  }

  Ok(best_w)
}

/// Zero out solver dust and renormalize to an exact unit sum.
///
/// If renormalization nudges a capped weight past the cap, the excess is
/// redistributed across the remaining headroom rather than clipped, so the
/// unit-sum invariant survives.
fn clean_weights(mut w: Array1<f64>, cap: f64) -> Result<Array1<f64>> {
  w.mapv_inplace(|x| if x < DUST_THRESHOLD { 0.0 } else { x });

  let sum = w.sum();
  if sum <= 0.0 {
    return Err(EngineError::InvalidInput(
      "all solved weights fell below the dust threshold".into(),
    ));
  }
  w.mapv_inplace(|x| x / sum);

  loop {
    let excess: f64 = w.iter().map(|&x| (x - cap).max(0.0)).sum();
    if excess <= 1e-15 {
      break;
    }

    let headroom: f64 = w
      .iter()
      .map(|&x| if x > 0.0 && x < cap { cap - x } else { 0.0 })
      .sum();
    if headroom <= 0.0 {
      break;
    }

    let scale = (excess / headroom).min(1.0);
    w.mapv_inplace(|x| {
      if x > cap {
        cap
      } else if x > 0.0 {
        x + scale * (cap - x)
      } else {
        x
      }
    });

    let sum = w.sum();
    if (sum - 1.0).abs() <= 1e-12 {
      break;
    }
    // Spread any residual over uncapped holdings only.
    let free: f64 = w.iter().filter(|&&x| x > 0.0 && x < cap).sum();
    if free <= 0.0 {
      break;
    }
    let residual = 1.0 - sum;
    w.mapv_inplace(|x| {
      if x > 0.0 && x < cap {
        x + residual * x / free
      } else {
        x
      }
    });
  }

  Ok(w)
}
