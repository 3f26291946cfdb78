//! # Errors
//!
//! Typed failure taxonomy shared by all engine components.

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures the engine can surface to the calling layer.
///
/// Every variant is a local, deterministic failure of the component that
/// detects it; none are retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
  /// Too few overlapping trading days to estimate anything meaningful.
  #[error("insufficient history: {actual} overlapping observations, {required} required")]
  InsufficientHistory { required: usize, actual: usize },

  /// Malformed or out-of-domain input (asset count, prices, amounts).
  #[error("invalid input: {0}")]
  InvalidInput(String),

  /// Covariance matrix is not positive definite even after shrinkage.
  #[error("covariance matrix is singular or not positive definite")]
  SingularCovariance,

  /// The weight constraints admit no vector summing to one.
  #[error("no feasible allocation: {n_assets} assets capped at {max_weight} cannot sum to 1")]
  NoFeasibleSolution { n_assets: usize, max_weight: f64 },

  /// Requested target volatility lies below the feasible frontier.
  #[error("target volatility {target} is unreachable; the minimum-volatility portfolio has volatility {minimum}")]
  InfeasibleTarget { target: f64, minimum: f64 },
}
