//! One-dimensional first Wasserstein distance between empirical samples.

use crate::error::{AnalysisError, AnalysisResult};

/// A validated sample in ascending order.
///
/// Sorting once per pool lets a distance matrix compare every pair with a
/// single merge.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedSample {
    values: Vec<f64>,
}

impl SortedSample {
    /// Sort a copy of `sample`. Fails on empty or non-finite input.
    pub fn new(sample: &[f64]) -> AnalysisResult<Self> {
        if sample.is_empty() {
            return Err(AnalysisError::EmptySample);
        }
        if let Some(&bad) = sample.iter().find(|x| !x.is_finite()) {
            return Err(AnalysisError::NonFiniteSample(bad));
        }
        let mut values = sample.to_vec();
        values.sort_by(f64::total_cmp);
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

/// Earth mover's distance between two equally weighted 1-D samples.
///
/// Computed as the integral of the absolute difference between the two
/// empirical CDFs. Symmetric, zero for identical multisets, and invariant
/// to the order of the inputs. Both samples must be non-empty and finite.
pub fn wasserstein_distance(u: &[f64], v: &[f64]) -> AnalysisResult<f64> {
    Ok(wasserstein_sorted(&SortedSample::new(u)?, &SortedSample::new(v)?))
}

/// [`wasserstein_distance`] over samples that are already sorted.
pub fn wasserstein_sorted(u: &SortedSample, v: &SortedSample) -> f64 {
    let (u, v) = (u.as_slice(), v.as_slice());
    let n_u = u.len() as f64;
    let n_v = v.len() as f64;

    // Walk the merged order; iu/iv count the samples <= the current point
    let (mut iu, mut iv) = (0usize, 0usize);
    let mut prev: Option<f64> = None;
    let mut total = 0.0;

    while iu < u.len() || iv < v.len() {
        let take_u = match (u.get(iu), v.get(iv)) {
            (Some(a), Some(b)) => a.total_cmp(b).is_le(),
            (Some(_), None) => true,
            _ => false,
        };
        let x = if take_u { u[iu] } else { v[iv] };

        if let Some(p) = prev {
            let cdf_gap = (iu as f64 / n_u - iv as f64 / n_v).abs();
            total += cdf_gap * (x - p);
        }

        if take_u {
            iu += 1;
        } else {
            iv += 1;
        }
        prev = Some(x);
    }

    total
}
