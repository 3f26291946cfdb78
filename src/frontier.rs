//! # Frontier Sampling
//!
//! $$
//! \mathbf{w} = \frac{\mathbf{u}}{\sum_i u_i},\quad u_i \sim \mathcal{U}(0,1)
//! $$
//!
//! Monte Carlo cloud of random fully-invested portfolios used to visualize
//! the feasible set around the efficient frontier. The cloud deliberately
//! ignores the optimizer's per-asset cap so it shows the whole
//! unconstrained region the constrained optimum sits inside.

use ndarray::Array1;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::Uniform;

use crate::error::EngineError;
use crate::error::Result;
use crate::types::SimulatedPortfolio;

/// Volatility floor guarding the Sharpe division.
const VOL_FLOOR: f64 = 1e-12;

/// Default number of portfolios drawn per request.
pub const DEFAULT_SAMPLE_COUNT: usize = 5000;

/// Lazy, finite sequence of random portfolios over `(mu, Sigma)`.
///
/// Each draw is fresh; the sequence is not restartable. Constructed via
/// [`FrontierSampler::new`] the RNG is entropy-seeded per sampler, so
/// concurrent requests never share correlated draws; [`FrontierSampler::with_seed`]
/// pins the stream for reproducible tests.
pub struct FrontierSampler {
  mu: Array1<f64>,
  sigma: Array2<f64>,
  risk_free: f64,
  rng: StdRng,
  remaining: usize,
}

impl FrontierSampler {
  /// Sampler with a fresh entropy seed.
  pub fn new(mu: &Array1<f64>, sigma: &Array2<f64>, risk_free: f64, count: usize) -> Result<Self> {
    Self::with_rng(mu, sigma, risk_free, count, StdRng::from_entropy())
  }

  /// Sampler with a pinned seed producing a reproducible sequence.
  pub fn with_seed(
    mu: &Array1<f64>,
    sigma: &Array2<f64>,
    risk_free: f64,
    count: usize,
    seed: u64,
  ) -> Result<Self> {
    Self::with_rng(mu, sigma, risk_free, count, StdRng::seed_from_u64(seed))
  }

  fn with_rng(
    mu: &Array1<f64>,
    sigma: &Array2<f64>,
    risk_free: f64,
    count: usize,
    rng: StdRng,
  ) -> Result<Self> {
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

    Ok(Self {
      mu: mu.clone(),
      sigma: sigma.clone(),
      risk_free,
      rng,
      remaining: count,
    })
  }
}

impl Iterator for FrontierSampler {
  type Item = SimulatedPortfolio;

  fn next(&mut self) -> Option<SimulatedPortfolio> {
    if self.remaining == 0 {
      return None;
    }
    self.remaining -= 1;

    let n = self.mu.len();
    let mut w = Array1::random_using(n, Uniform::new(0.0, 1.0), &mut self.rng);
    let total = w.sum();
    if total > 0.0 {
      w /= total;
    } else {
      w.fill(1.0 / n as f64);
    }

    let expected_return = w.dot(&self.mu);
    let volatility = w.dot(&self.sigma.dot(&w)).max(0.0).sqrt();
    let sharpe_ratio = (expected_return - self.risk_free) / volatility.max(VOL_FLOOR);

    Some(SimulatedPortfolio {
      expected_return,
      volatility,
      sharpe_ratio,
    })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl ExactSizeIterator for FrontierSampler {}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;
  use crate::types::SimulatedCloud;

  fn inputs() -> (Array1<f64>, Array2<f64>) {
    (
      array![0.10, 0.05, 0.15],
      array![
        [0.04, 0.005, 0.006],
        [0.005, 0.01, 0.004],
        [0.006, 0.004, 0.09],
      ],
    )
  }

  #[test]
  fn fixed_seed_reproduces_the_sequence() {
    let (mu, sigma) = inputs();
    let a: Vec<_> = FrontierSampler::with_seed(&mu, &sigma, 0.02, 50, 7).unwrap().collect();
    let b: Vec<_> = FrontierSampler::with_seed(&mu, &sigma, 0.02, 50, 7).unwrap().collect();

    assert_eq!(a.len(), 50);
    assert_eq!(a, b);
  }

  #[test]
  fn different_seeds_diverge() {
    let (mu, sigma) = inputs();
    let a: Vec<_> = FrontierSampler::with_seed(&mu, &sigma, 0.02, 10, 1).unwrap().collect();
    let b: Vec<_> = FrontierSampler::with_seed(&mu, &sigma, 0.02, 10, 2).unwrap().collect();

    assert_ne!(a, b);
  }

  #[test]
  fn zero_count_is_an_empty_sequence() {
    let (mu, sigma) = inputs();
    let cloud: SimulatedCloud = FrontierSampler::with_seed(&mu, &sigma, 0.02, 0, 7)
      .unwrap()
      .collect();
    assert!(cloud.is_empty());
  }

  #[test]
  fn every_sample_is_finite_with_positive_volatility() {
    let (mu, sigma) = inputs();
    for p in FrontierSampler::with_seed(&mu, &sigma, 0.02, 500, 42).unwrap() {
      assert!(p.expected_return.is_finite());
      assert!(p.volatility > 0.0);
      assert!(p.sharpe_ratio.is_finite());
    }
  }

  #[test]
  fn samples_stay_between_asset_extremes() {
    let (mu, sigma) = inputs();
    for p in FrontierSampler::with_seed(&mu, &sigma, 0.02, 200, 3).unwrap() {
      // A convex combination of returns cannot escape the asset range.
      assert!(p.expected_return >= 0.05 - 1e-12);
      assert!(p.expected_return <= 0.15 + 1e-12);
    }
  }

  #[test]
  fn dimension_mismatch_is_rejected() {
    let mu = array![0.1, 0.05];
    let sigma = array![[0.04]];
    assert!(FrontierSampler::with_seed(&mu, &sigma, 0.02, 10, 1).is_err());
  }
}
