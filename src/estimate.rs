//! # Estimation
//!
//! $$
//! \mu_i = r_f + \beta_i(\mathbb E[R_m]-r_f),\qquad
//! \Sigma = \delta F + (1-\delta) S
//! $$
//!
//! Forward-looking expected returns and the shrunk risk matrix, both
//! derived from the same [`crate::market::PriceMatrix`].

pub mod capm;
pub mod ledoit_wolf;

pub use capm::capm_returns;
pub use capm::MIN_OVERLAP_DAYS;
pub use ledoit_wolf::ledoit_wolf;

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS: usize = 252;
