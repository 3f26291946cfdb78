//! # Optimization
//!
//! $$
//! \min_{\mathbf{w}\in\Delta_c} \ \lambda\,\mathbf{w}^\top\Sigma\mathbf{w} - \mu^\top\mathbf{w},
//! \qquad \Delta_c = \{\mathbf{w} : \textstyle\sum_i w_i = 1,\ 0 \le w_i \le c\}
//! $$
//!
//! Deterministic convex programs over the capped simplex.

pub mod mean_variance;
pub mod simplex;

pub use mean_variance::optimize;
pub use mean_variance::portfolio_performance;
pub use simplex::max_return_corner;
pub use simplex::project_capped_simplex;
