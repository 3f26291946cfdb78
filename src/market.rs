//! # Market Data
//!
//! $$
//! P \in \mathbb{R}^{T \times N},\quad r_{t,i} = P_{t,i}/P_{t-1,i} - 1
//! $$
//!
//! Cleaned historical close prices and the derived daily return matrix.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use ndarray::Array2;
use ndarray::ArrayView2;

use crate::error::EngineError;
use crate::error::Result;

/// Dense date-by-asset matrix of adjusted close prices.
///
/// The date axis is ascending and unique; every kept asset has a strictly
/// positive price for every date. Assets with any gap in their history are
/// dropped at construction time and recorded in [`PriceMatrix::dropped`].
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct PriceMatrix {
  dates: Vec<NaiveDate>,
  assets: Vec<String>,
  prices: Array2<f64>,
  dropped: Vec<String>,
}

impl PriceMatrix {
  /// Build a price matrix from per-asset `(date, close)` series.
  ///
  /// The date axis is the sorted union of all input dates. An asset missing
  /// a price for any axis date is dropped, not padded. Duplicate dates
  /// within one series keep the last value.
  pub fn from_series<I>(series: I) -> Result<Self>
  where
    I: IntoIterator<Item = (String, Vec<(NaiveDate, f64)>)>,
  {
    let mut by_asset: Vec<(String, BTreeMap<NaiveDate, f64>)> = Vec::new();
    let mut axis: BTreeSet<NaiveDate> = BTreeSet::new();

    for (asset, closes) in series {
      let mut column = BTreeMap::new();
      for (date, close) in closes {
        if !close.is_finite() || close <= 0.0 {
          return Err(EngineError::InvalidInput(format!(
            "non-positive close {close} for asset {asset} on {date}"
          )));
        }
        column.insert(date, close);
      }
      axis.extend(column.keys().copied());
      by_asset.push((asset, column));
    }

    let dates: Vec<NaiveDate> = axis.into_iter().collect();
    if dates.is_empty() {
      return Err(EngineError::InvalidInput("empty price matrix".into()));
    }

    let mut assets = Vec::new();
    let mut dropped = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();

    for (asset, column) in by_asset {
      if dates.iter().all(|d| column.contains_key(d)) {
        columns.push(dates.iter().map(|d| column[d]).collect());
        assets.push(asset);
      } else {
        dropped.push(asset);
      }
    }

    if assets.is_empty() {
      return Err(EngineError::InvalidInput(
        "no asset has a complete price history".into(),
      ));
    }

    if !dropped.is_empty() {
      tracing::warn!(?dropped, "dropped assets with incomplete price history");
    }

    let mut prices = Array2::zeros((dates.len(), assets.len()));
    for (j, column) in columns.iter().enumerate() {
      for (i, &close) in column.iter().enumerate() {
        prices[[i, j]] = close;
      }
    }

    Ok(Self {
      dates,
      assets,
      prices,
      dropped,
    })
  }

  /// Number of assets kept in the matrix.
  pub fn n_assets(&self) -> usize {
    self.assets.len()
  }

  /// Number of dates on the axis.
  pub fn n_dates(&self) -> usize {
    self.dates.len()
  }

  /// Ordered asset identifiers; all derived vectors share this ordering.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Ascending, unique date axis.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Assets dropped at construction for incomplete history.
  pub fn dropped(&self) -> &[String] {
    &self.dropped
  }

  /// Raw close prices, rows are dates and columns are assets.
  pub fn prices(&self) -> ArrayView2<'_, f64> {
    self.prices.view()
  }

  /// Row position of `date` on the axis, if present.
  pub fn row_index(&self, date: NaiveDate) -> Option<usize> {
    self.dates.binary_search(&date).ok()
  }

  /// Daily simple returns, one row per consecutive date pair.
  pub fn daily_returns(&self) -> Array2<f64> {
    returns_from_prices(&self.prices.view())
  }

  /// Returns computed on the given sub-axis of dates.
  ///
  /// Dates absent from the matrix are skipped; consecutive kept dates form
  /// the return pairs.
  pub fn returns_on(&self, dates: &[NaiveDate]) -> Array2<f64> {
    let rows: Vec<usize> = dates.iter().filter_map(|&d| self.row_index(d)).collect();
    let sub = self.prices.select(ndarray::Axis(0), &rows);
    returns_from_prices(&sub.view())
  }

  /// Sorted intersection of two date axes.
  pub fn common_dates(&self, other: &PriceMatrix) -> Vec<NaiveDate> {
    self
      .dates
      .iter()
      .copied()
      .filter(|d| other.row_index(*d).is_some())
      .collect()
  }
}

fn returns_from_prices(prices: &ArrayView2<'_, f64>) -> Array2<f64> {
  let (t, n) = prices.dim();
  if t < 2 {
    return Array2::zeros((0, n));
  }

  let mut returns = Array2::zeros((t - 1, n));
  for i in 1..t {
    for j in 0..n {
      returns[[i - 1, j]] = prices[[i, j]] / prices[[i - 1, j]] - 1.0;
    }
  }
  returns
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
  }

  fn series(asset: &str, closes: &[(&str, f64)]) -> (String, Vec<(NaiveDate, f64)>) {
    (
      asset.to_string(),
      closes.iter().map(|&(s, p)| (d(s), p)).collect(),
    )
  }

  #[test]
  fn builds_dense_matrix_with_sorted_axis() {
    let pm = PriceMatrix::from_series([
      series("AAA", &[("2024-01-03", 102.0), ("2024-01-02", 101.0)]),
      series("BBB", &[("2024-01-02", 50.0), ("2024-01-03", 49.0)]),
    ])
    .unwrap();

    assert_eq!(pm.n_dates(), 2);
    assert_eq!(pm.n_assets(), 2);
    assert_eq!(pm.dates()[0], d("2024-01-02"));
    assert_eq!(pm.prices()[[0, 0]], 101.0);
    assert_eq!(pm.prices()[[1, 1]], 49.0);
  }

  #[test]
  fn drops_assets_with_gaps_and_records_them() {
    let pm = PriceMatrix::from_series([
      series("FULL", &[("2024-01-02", 10.0), ("2024-01-03", 11.0)]),
      series("GAPPY", &[("2024-01-02", 20.0)]),
    ])
    .unwrap();

    assert_eq!(pm.assets(), &["FULL".to_string()]);
    assert_eq!(pm.dropped(), &["GAPPY".to_string()]);
  }

  #[test]
  fn rejects_non_positive_prices() {
    let err = PriceMatrix::from_series([series("BAD", &[("2024-01-02", 0.0)])]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
  }

  #[test]
  fn rejects_empty_input() {
    let err = PriceMatrix::from_series(Vec::<(String, Vec<(NaiveDate, f64)>)>::new()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidInput(_)));
  }

  #[test]
  fn daily_returns_are_simple_returns() {
    let pm = PriceMatrix::from_series([series(
      "AAA",
      &[("2024-01-02", 100.0), ("2024-01-03", 110.0), ("2024-01-04", 99.0)],
    )])
    .unwrap();

    let r = pm.daily_returns();
    assert_eq!(r.dim(), (2, 1));
    assert!((r[[0, 0]] - 0.10).abs() < 1e-12);
    assert!((r[[1, 0]] - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
  }

  #[test]
  fn common_dates_intersects_axes() {
    let a = PriceMatrix::from_series([series(
      "AAA",
      &[("2024-01-02", 1.0), ("2024-01-03", 1.0), ("2024-01-04", 1.0)],
    )])
    .unwrap();
    let b = PriceMatrix::from_series([series(
      "MKT",
      &[("2024-01-03", 1.0), ("2024-01-04", 1.0), ("2024-01-05", 1.0)],
    )])
    .unwrap();

    assert_eq!(a.common_dates(&b), vec![d("2024-01-03"), d("2024-01-04")]);
  }
}
