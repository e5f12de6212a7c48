//! Search domain types with enforced invariants.
//!
//! - Priors: probability distribution over a vertex's children, summing to 1.0
//! - Reward: raw terminal reward plus the scaled training target derived from it

use crate::{Info, Result, SearchError};
use serde::{Deserialize, Serialize};

/// Tolerance for prior sum validation.
pub const PRIOR_SUM_TOLERANCE: f64 = 1e-6;

/// A probability distribution over the children of a vertex.
///
/// Invariant: All values are finite, non-negative and sum to 1.0 (±1e-6).
///
/// # Example
/// ```
/// use rlsearch_core::Priors;
///
/// let priors = Priors::new(vec![0.3, 0.5, 0.2]).unwrap();
/// assert!((priors.sum() - 1.0).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Priors(Vec<f64>);

impl Priors {
    /// Create priors from a probability distribution.
    ///
    /// # Errors
    /// Returns `SearchError::InvalidPriors` if the vector is empty, holds a
    /// negative or non-finite value, or doesn't sum to 1.0 (±1e-6).
    pub fn new(probs: Vec<f64>) -> Result<Self> {
        validate_entries(&probs)?;

        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > PRIOR_SUM_TOLERANCE {
            return Err(SearchError::InvalidPriors(format!(
                "prior sum {} is not 1.0 (tolerance {})",
                sum, PRIOR_SUM_TOLERANCE
            )));
        }

        Ok(Self(probs))
    }

    /// Create priors from raw weights, normalizing them to sum to 1.0.
    ///
    /// Falls back to a uniform distribution when every weight is zero.
    pub fn from_unnormalized(values: Vec<f64>) -> Result<Self> {
        validate_entries(&values)?;

        let sum: f64 = values.iter().sum();
        if sum <= 0.0 {
            return Self::uniform(values.len());
        }

        Ok(Self(values.iter().map(|&v| v / sum).collect()))
    }

    /// Create a uniform distribution over `num_children` children.
    pub fn uniform(num_children: usize) -> Result<Self> {
        if num_children == 0 {
            return Err(SearchError::InvalidPriors(
                "cannot create priors over 0 children".to_string(),
            ));
        }

        Ok(Self(vec![1.0 / num_children as f64; num_children]))
    }

    /// Align estimator output with the legal children of a vertex.
    ///
    /// - `raw.len() == num_children`: renormalized as-is.
    /// - `raw.len() == padded_width` and `num_children <= padded_width`: the
    ///   estimator scored a padded action space; the first `num_children`
    ///   entries are kept and renormalized.
    /// - anything else is a misconfigured estimator and is rejected.
    pub fn align(raw: Vec<f64>, num_children: usize, padded_width: Option<usize>) -> Result<Self> {
        if raw.len() == num_children {
            return Self::from_unnormalized(raw);
        }

        match padded_width {
            Some(width) if raw.len() == width && num_children <= width => {
                let mut legal = raw;
                legal.truncate(num_children);
                Self::from_unnormalized(legal)
            }
            _ => Err(SearchError::PriorShapeMismatch {
                expected: num_children,
                got: raw.len(),
            }),
        }
    }

    /// Get the probability at the given index.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Get the number of children covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the distribution is empty (never true for valid priors).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the sum of all probabilities (should be ~1.0).
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Index of the largest prior; the first one wins ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &p) in self.0.iter().enumerate() {
            if p > self.0[best] {
                best = i;
            }
        }
        best
    }

    /// Get a reference to the underlying slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Get the underlying vector (consumes self).
    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl std::ops::Index<usize> for Priors {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

fn validate_entries(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(SearchError::InvalidPriors(
            "priors cannot be empty".to_string(),
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(SearchError::InvalidPriors(format!(
            "prior {} is negative or not finite",
            bad
        )));
    }
    Ok(())
}

/// Terminal reward of a game.
///
/// The raw reward is never modified; `scaled` is the training target a
/// reward factory derived from it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub raw: f64,
    pub scaled: f64,
    #[serde(default)]
    pub info: Info,
}

impl Reward {
    pub fn new(raw: f64, scaled: f64, info: Info) -> Self {
        Self { raw, scaled, info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priors_new_valid() {
        let priors = Priors::new(vec![0.3, 0.5, 0.2]).unwrap();
        assert_eq!(priors.len(), 3);
        assert!((priors.sum() - 1.0).abs() < PRIOR_SUM_TOLERANCE);
    }

    #[test]
    fn test_priors_new_invalid_sum() {
        assert!(Priors::new(vec![0.3, 0.3, 0.3]).is_err());
    }

    #[test]
    fn test_priors_new_negative() {
        assert!(Priors::new(vec![0.5, -0.2, 0.7]).is_err());
    }

    #[test]
    fn test_priors_new_empty() {
        assert!(Priors::new(vec![]).is_err());
    }

    #[test]
    fn test_priors_rejects_nan() {
        let result = Priors::from_unnormalized(vec![0.5, f64::NAN]);
        assert!(matches!(result, Err(SearchError::InvalidPriors(_))));
    }

    #[test]
    fn test_priors_from_unnormalized() {
        let priors = Priors::from_unnormalized(vec![1.0, 2.0, 1.0]).unwrap();
        assert!((priors[0] - 0.25).abs() < 1e-12);
        assert!((priors[1] - 0.50).abs() < 1e-12);
        assert!((priors[2] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_priors_all_zero_falls_back_to_uniform() {
        let priors = Priors::from_unnormalized(vec![0.0, 0.0]).unwrap();
        assert_eq!(priors.as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn test_align_padded_action_space() {
        // Estimator scores 4 slots, only the first 2 are legal.
        let priors = Priors::align(vec![0.2, 0.2, 0.5, 0.1], 2, Some(4)).unwrap();
        assert_eq!(priors.len(), 2);
        assert!((priors[0] - 0.5).abs() < 1e-12);
        assert!((priors.sum() - 1.0).abs() < PRIOR_SUM_TOLERANCE);
    }

    #[test]
    fn test_align_rejects_mismatch() {
        let result = Priors::align(vec![0.5, 0.25, 0.25], 2, None);
        assert!(matches!(
            result,
            Err(SearchError::PriorShapeMismatch { expected: 2, got: 3 })
        ));

        // Padded width given but the estimator returned something else.
        let result = Priors::align(vec![0.5, 0.25, 0.25], 2, Some(4));
        assert!(matches!(result, Err(SearchError::PriorShapeMismatch { .. })));
    }

    #[test]
    fn test_argmax_first_wins_ties() {
        let priors = Priors::new(vec![0.4, 0.4, 0.2]).unwrap();
        assert_eq!(priors.argmax(), 0);
    }
}
