//! Pairwise motif distance matrix.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::{MotifId, MotifSet};

/// Current format version of a persisted distance matrix.
///
/// Bump this when the distance computation changes so cached matrices are
/// treated as misses.
pub const DISTANCE_MATRIX_VERSION: u32 = 1;

/// Square distance matrix indexed by position in a [`MotifSet`].
///
/// Values are stored row-major. A matrix produced by the distance engine
/// is symmetric, has an exactly-zero diagonal and only finite,
/// non-negative entries; [`DistanceMatrix::validate`] checks all of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DistanceMatrix {
    /// Format version (see [`DISTANCE_MATRIX_VERSION`])
    #[serde(default)]
    pub version: u32,
    /// Row/column labels, in matrix order
    motifs: MotifSet,
    /// Row-major values, `motifs.len()²` entries
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Build a matrix from row-major values.
    pub fn new(motifs: MotifSet, values: Vec<f64>) -> ModelResult<Self> {
        let n = motifs.len();
        if values.len() != n * n {
            return Err(ModelError::shape_mismatch(format!(
                "{} motifs require {} values, got {}",
                n,
                n * n,
                values.len()
            )));
        }
        Ok(Self {
            version: DISTANCE_MATRIX_VERSION,
            motifs,
            values,
        })
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.motifs.len()
    }

    pub fn motifs(&self) -> &MotifSet {
        &self.motifs
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size() + col]
    }

    /// Distance between two motifs looked up by id.
    pub fn between(&self, a: MotifId, b: MotifId) -> Option<f64> {
        let i = self.motifs.index_of(a)?;
        let j = self.motifs.index_of(b)?;
        Some(self.get(i, j))
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Rows as nested vectors.
    pub fn as_rows(&self) -> Vec<Vec<f64>> {
        let n = self.size();
        if n == 0 {
            return Vec::new();
        }
        self.values.chunks(n).map(|row| row.to_vec()).collect()
    }

    /// Check every numeric invariant of a finished matrix.
    pub fn validate(&self) -> ModelResult<()> {
        let n = self.size();
        if self.values.len() != n * n {
            return Err(ModelError::shape_mismatch(format!(
                "{} motifs but {} values",
                n,
                self.values.len()
            )));
        }
        for i in 0..n {
            let diag = self.get(i, i);
            if diag != 0.0 {
                return Err(ModelError::NonZeroDiagonal {
                    index: i,
                    value: diag,
                });
            }
            for j in (i + 1)..n {
                let upper = self.get(i, j);
                let lower = self.get(j, i);
                if !upper.is_finite() {
                    return Err(ModelError::NonFinite {
                        row: i,
                        col: j,
                        value: upper,
                    });
                }
                if upper < 0.0 {
                    return Err(ModelError::Negative {
                        row: i,
                        col: j,
                        value: upper,
                    });
                }
                if upper.to_bits() != lower.to_bits() {
                    return Err(ModelError::Asymmetric {
                        row: i,
                        col: j,
                        upper,
                        lower,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(values: Vec<f64>) -> ModelResult<DistanceMatrix> {
        DistanceMatrix::new(MotifSet::from_ids([10, 20, 30]).unwrap(), values)
    }

    #[test]
    fn test_shape_checked() {
        assert!(matrix(vec![0.0; 8]).is_err());
        assert!(matrix(vec![0.0; 9]).is_ok());
    }

    #[test]
    fn test_lookup_by_id() {
        let m = matrix(vec![0.0, 1.0, 2.0, 1.0, 0.0, 3.0, 2.0, 3.0, 0.0]).unwrap();
        assert_eq!(m.between(MotifId(10), MotifId(30)), Some(2.0));
        assert_eq!(m.between(MotifId(30), MotifId(20)), Some(3.0));
        assert_eq!(m.between(MotifId(30), MotifId(99)), None);
        assert_eq!(m.as_rows()[1], vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        let m = matrix(vec![0.0, 1.0, 2.0, 1.0, 0.0, 3.0, 2.0, 3.0, 0.0]).unwrap();
        assert!(m.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_sentinel() {
        let m = matrix(vec![
            0.0,
            f64::INFINITY,
            2.0,
            f64::INFINITY,
            0.0,
            3.0,
            2.0,
            3.0,
            0.0,
        ])
        .unwrap();
        assert!(matches!(
            m.validate(),
            Err(ModelError::NonFinite { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_asymmetry_and_diagonal() {
        let m = matrix(vec![0.0, 1.0, 2.0, 1.5, 0.0, 3.0, 2.0, 3.0, 0.0]).unwrap();
        assert!(matches!(m.validate(), Err(ModelError::Asymmetric { .. })));

        let m = matrix(vec![0.1, 1.0, 2.0, 1.0, 0.0, 3.0, 2.0, 3.0, 0.0]).unwrap();
        assert!(matches!(
            m.validate(),
            Err(ModelError::NonZeroDiagonal { index: 0, .. })
        ));
    }
}
