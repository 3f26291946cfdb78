//! # frontier-rs
//!
//! `frontier_rs` turns a cleaned historical price matrix into optimal
//! portfolio allocations using Modern Portfolio Theory: CAPM expected
//! returns, a Ledoit-Wolf shrunk covariance matrix, deterministic convex
//! optimization over the capped simplex, and a Monte Carlo cloud of random
//! portfolios for efficient-frontier visualization.
//!
//! ## Modules
//!
//! | Module         | Description                                                        |
//! |----------------|--------------------------------------------------------------------|
//! | [`market`]     | `PriceMatrix` construction, validation, and daily returns.         |
//! | [`estimate`]   | CAPM expected returns and Ledoit-Wolf covariance shrinkage.        |
//! | [`optimize`]   | Max-Sharpe, min-volatility, and risk-targeted convex programs.     |
//! | [`frontier`]   | Seeded Monte Carlo sampling of random fully-invested portfolios.   |
//! | [`allocation`] | Weight vector × investment → exact currency amounts.               |
//! | [`benchmark`]  | Benchmark window performance and outperformance.                   |
//! | [`engine`]     | Request/report orchestration with parallel fan-out.                |
//!
//! ## Example Usage
//!
//! ```rust
//! use frontier_rs::engine::{EngineRequest, PortfolioEngine, PortfolioEngineConfig};
//! use frontier_rs::types::Objective;
//!
//! let engine = PortfolioEngine::new(PortfolioEngineConfig::default());
//! let report = engine.run(&EngineRequest {
//!   prices,
//!   benchmark: None,
//!   objectives: vec![Objective::MaxSharpe, Objective::MinVolatility],
//!   max_weight: 1.0,
//!   total_investment: 10_000.0,
//!   seed: None,
//! })?;
//! ```
//!
//! ## Parallelism
//!
//! [`engine::PortfolioEngine::run`] fans the per-objective solves and the
//! Monte Carlo sampling out over `rayon` once `(mu, Sigma)` are estimated.
//! Every component is a pure function of its inputs; there is no shared
//! mutable state anywhere in the crate.

pub mod allocation;
pub mod benchmark;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod frontier;
pub mod market;
pub mod optimize;
pub mod types;

pub use allocation::allocate;
pub use allocation::AllocationTable;
pub use benchmark::benchmark_performance;
pub use benchmark::BenchmarkPerformance;
pub use engine::EngineReport;
pub use engine::EngineRequest;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use error::EngineError;
pub use error::Result;
pub use estimate::capm_returns;
pub use estimate::ledoit_wolf;
pub use frontier::FrontierSampler;
pub use market::PriceMatrix;
pub use optimize::optimize;
pub use types::Constraints;
pub use types::Objective;
pub use types::OptimizedPortfolio;
pub use types::PortfolioPerformance;
pub use types::SimulatedCloud;
pub use types::SimulatedPortfolio;
