//! # Capped Simplex
//!
//! $$
//! \Pi_{\Delta_c}(\mathbf{v}) = \operatorname{clamp}(\mathbf{v} - \tau, 0, c),
//! \quad \textstyle\sum_i \Pi_{\Delta_c}(\mathbf{v})_i = 1
//! $$
//!
//! Geometry of the feasible set: Euclidean projection onto
//! `{w : sum w = 1, 0 <= w <= cap}` and the maximum-return corner of the
//! same set. The cap is enforced here, inside the solver, never by
//! clipping a finished solution.

use ndarray::Array1;

const BISECT_ITERS: usize = 100;

/// Euclidean projection of `v` onto the capped simplex.
///
/// Requires `n * cap >= 1` (checked by the caller's constraint
/// validation). The projection has the form `clamp(v_i - tau, 0, cap)`;
/// the shift `tau` is found by bisection on the monotone sum.
pub fn project_capped_simplex(v: &Array1<f64>, cap: f64) -> Array1<f64> {
  let sum_at = |tau: f64| -> f64 { v.iter().map(|&x| (x - tau).clamp(0.0, cap)).sum() };

  let max_v = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let min_v = v.iter().cloned().fold(f64::INFINITY, f64::min);

  // sum_at is continuous and nonincreasing in tau; these bounds bracket
  // sum = 1 whenever the simplex is nonempty.
  let mut lo = min_v - cap;
  let mut hi = max_v;

  for _ in 0..BISECT_ITERS {
    let mid = 0.5 * (lo + hi);
    if sum_at(mid) > 1.0 {
      lo = mid;
    } else {
      hi = mid;
    }
  }

  let tau = 0.5 * (lo + hi);
  v.mapv(|x| (x - tau).clamp(0.0, cap))
}

/// Vertex of the capped simplex maximizing the linear objective `mu · w`.
///
/// Greedy fill in descending-return order, ties broken by index, so the
/// result is deterministic.
pub fn max_return_corner(mu: &Array1<f64>, cap: f64) -> Array1<f64> {
  let n = mu.len();
  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by(|&a, &b| {
    mu[b]
      .partial_cmp(&mu[a])
      .unwrap_or(std::cmp::Ordering::Equal)
      .then(a.cmp(&b))
  });

  let mut w = Array1::zeros(n);
  let mut remaining: f64 = 1.0;
  for &i in &order {
    let take = remaining.min(cap);
    w[i] = take;
    remaining -= take;
    if remaining <= 0.0 {
      break;
    }
  }
  w
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn projection_sums_to_one_within_cap() {
    let w = project_capped_simplex(&array![2.0, 0.3, -1.0], 1.0);
    assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
    assert!(w.iter().all(|&x| (0.0..=1.0).contains(&x)));
    assert_relative_eq!(w[0], 1.0, epsilon = 1e-9);
  }

  #[test]
  fn tight_cap_forces_the_unique_point() {
    // Two assets capped at one half: the simplex is a single point.
    let w = project_capped_simplex(&array![10.0, -3.0], 0.5);
    assert_relative_eq!(w[0], 0.5, epsilon = 1e-9);
    assert_relative_eq!(w[1], 0.5, epsilon = 1e-9);
  }

  #[test]
  fn interior_points_are_fixed_by_projection() {
    let w = project_capped_simplex(&array![0.25, 0.25, 0.5], 1.0);
    assert_relative_eq!(w[0], 0.25, epsilon = 1e-9);
    assert_relative_eq!(w[2], 0.5, epsilon = 1e-9);
  }

  #[test]
  fn corner_fills_greedily_under_the_cap() {
    let w = max_return_corner(&array![0.10, 0.05, 0.15], 0.4);
    assert_relative_eq!(w[2], 0.4, epsilon = 1e-12);
    assert_relative_eq!(w[0], 0.4, epsilon = 1e-12);
    assert_relative_eq!(w[1], 0.2, epsilon = 1e-12);
  }

  #[test]
  fn uncapped_corner_is_a_single_asset() {
    let w = max_return_corner(&array![0.10, 0.05, 0.15], 1.0);
    assert_eq!(w.to_vec(), vec![0.0, 0.0, 1.0]);
  }
}
