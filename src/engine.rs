//! # Portfolio Engine
//!
//! $$
//! P \longrightarrow (\mu, \Sigma) \longrightarrow \mathbf{w}^\* \longrightarrow \text{allocations}
//! $$
//!
//! Single entry point tying estimation, optimization, sampling, and
//! allocation together for one request. Estimation runs once; the
//! per-objective solves and the Monte Carlo sampling then fan out in
//! parallel, sharing only `(mu, Sigma)` by reference.

use serde::Deserialize;
use serde::Serialize;

use crate::allocation::allocate;
use crate::allocation::AllocationTable;
use crate::benchmark::benchmark_performance;
use crate::benchmark::BenchmarkPerformance;
use crate::error::EngineError;
use crate::error::Result;
use crate::estimate::capm_returns;
use crate::estimate::ledoit_wolf;
use crate::estimate::TRADING_DAYS;
use crate::frontier::FrontierSampler;
use crate::frontier::DEFAULT_SAMPLE_COUNT;
use crate::market::PriceMatrix;
use crate::optimize::optimize;
use crate::types::Constraints;
use crate::types::Objective;
use crate::types::OptimizedPortfolio;
use crate::types::SimulatedCloud;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PortfolioEngineConfig {
  /// Annualized risk-free rate used in CAPM and Sharpe computations.
  pub risk_free: f64,
  /// Trading days per year used to annualize daily statistics.
  pub trading_days: usize,
  /// Number of random portfolios drawn per request.
  pub sample_count: usize,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free: 0.02,
      trading_days: TRADING_DAYS,
      sample_count: DEFAULT_SAMPLE_COUNT,
    }
  }
}

/// One optimization request, complete with its market data.
#[derive(Clone, Debug)]
pub struct EngineRequest {
  /// Cleaned asset price history.
  pub prices: PriceMatrix,
  /// Optional market benchmark for CAPM betas and comparison.
  pub benchmark: Option<PriceMatrix>,
  /// Objectives to solve; the first is primary and owns the allocation.
  pub objectives: Vec<Objective>,
  /// Per-asset concentration cap in `(0, 1]`.
  pub max_weight: f64,
  /// Total amount of capital to allocate.
  pub total_investment: f64,
  /// Pin the sampler's random stream; `None` draws fresh entropy.
  pub seed: Option<u64>,
}

/// Everything the calling layer needs to render one request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineReport {
  /// Assets the engine actually optimized over, in matrix order.
  pub assets: Vec<String>,
  /// Assets dropped upstream for incomplete history.
  pub dropped_assets: Vec<String>,
  /// One solved portfolio per requested objective, request order.
  pub results: Vec<OptimizedPortfolio>,
  /// Random portfolio cloud for frontier visualization.
  pub simulated_portfolios: SimulatedCloud,
  /// Currency allocation of the primary objective's weights.
  pub allocations: AllocationTable,
  /// Benchmark comparison, when a benchmark was supplied.
  pub benchmark: Option<BenchmarkPerformance>,
}

/// Stateless orchestrator; every call is a pure function of its request.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  /// Run estimation, optimization, sampling, and allocation for a request.
  pub fn run(&self, request: &EngineRequest) -> Result<EngineReport> {
    if request.objectives.is_empty() {
      return Err(EngineError::InvalidInput(
        "at least one objective is required".into(),
      ));
    }

    let cfg = self.config;
    let prices = &request.prices;

    let mu = capm_returns(
      prices,
      request.benchmark.as_ref(),
      cfg.risk_free,
      cfg.trading_days,
    )?;
    let sigma = ledoit_wolf(prices, cfg.trading_days)?;

    let constraints = Constraints {
      max_weight: request.max_weight,
    };

    let (solved, cloud) = rayon::join(
      || {
        request
          .objectives
          .iter()
          .map(|&objective| {
            let (weights, performance) =
              optimize(&mu, &sigma, objective, &constraints, cfg.risk_free)?;
            tracing::debug!(?objective, ?performance, "objective solved");
            Ok((objective, weights, performance))
          })
          .collect::<Result<Vec<_>>>()
      },
      || -> Result<SimulatedCloud> {
        let sampler = match request.seed {
          Some(seed) => {
            FrontierSampler::with_seed(&mu, &sigma, cfg.risk_free, cfg.sample_count, seed)?
          }
          None => FrontierSampler::new(&mu, &sigma, cfg.risk_free, cfg.sample_count)?,
        };
        Ok(sampler.collect())
      },
    );
    let solved = solved?;
    let cloud = cloud?;

    let (_, primary_weights, primary_perf) = &solved[0];
    let allocations = allocate(prices.assets(), primary_weights, request.total_investment)?;

    let benchmark = match request.benchmark.as_ref() {
      Some(bench) => Some(benchmark_performance(
        bench,
        primary_perf.expected_return,
        cfg.trading_days,
      )?),
      None => None,
    };

    let results = solved
      .into_iter()
      .map(|(objective, weights, performance)| OptimizedPortfolio {
        objective,
        weights: prices
          .assets()
          .iter()
          .cloned()
          .zip(weights.iter().copied())
          .collect(),
        performance,
      })
      .collect();

    Ok(EngineReport {
      assets: prices.assets().to_vec(),
      dropped_assets: prices.dropped().to_vec(),
      results,
      simulated_portfolios: cloud,
      allocations,
      benchmark,
    })
  }
}
