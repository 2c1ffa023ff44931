//! Per-video motif usage.

use std::collections::BTreeMap;

use motif_models::MotifId;

/// How often each motif occurs in one video's label sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotifUsage {
    counts: BTreeMap<MotifId, usize>,
    total_frames: usize,
}

impl MotifUsage {
    /// Count labels. Only motifs that occur get an entry.
    pub fn from_labels(labels: &[MotifId]) -> Self {
        let mut counts = BTreeMap::new();
        for label in labels {
            *counts.entry(*label).or_insert(0) += 1;
        }
        Self {
            counts,
            total_frames: labels.len(),
        }
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn count(&self, motif: MotifId) -> usize {
        self.counts.get(&motif).copied().unwrap_or(0)
    }

    /// Share of frames labelled `motif`, in percent.
    pub fn percentage(&self, motif: MotifId) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.count(motif) as f64 / self.total_frames as f64 * 100.0
    }

    /// `(motif, percent)` pairs, most used first; equal usage by motif id.
    pub fn sorted_desc(&self) -> Vec<(MotifId, f64)> {
        let mut entries: Vec<(MotifId, usize)> =
            self.counts.iter().map(|(m, c)| (*m, *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        entries
            .into_iter()
            .map(|(motif, _)| (motif, self.percentage(motif)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.total_frames == 0
    }
}

/// Motif usage of one video's labels.
pub fn motif_usage(labels: &[MotifId]) -> MotifUsage {
    MotifUsage::from_labels(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[u32]) -> Vec<MotifId> {
        raw.iter().copied().map(MotifId).collect()
    }

    #[test]
    fn test_percentages() {
        let usage = motif_usage(&labels(&[2, 2, 2, 0, 1, 1, 2, 0]));
        assert_eq!(usage.total_frames(), 8);
        assert_eq!(usage.count(MotifId(2)), 4);
        assert_eq!(usage.percentage(MotifId(2)), 50.0);
        assert_eq!(usage.percentage(MotifId(0)), 25.0);
        assert_eq!(usage.percentage(MotifId(9)), 0.0);
    }

    #[test]
    fn test_sorted_desc_breaks_ties_by_id() {
        let usage = motif_usage(&labels(&[5, 3, 3, 5, 1]));
        let sorted = usage.sorted_desc();
        assert_eq!(
            sorted.iter().map(|(m, _)| *m).collect::<Vec<_>>(),
            labels(&[3, 5, 1])
        );
        assert_eq!(sorted[2].1, 20.0);
        let total: f64 = sorted.iter().map(|(_, p)| p).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_labels() {
        let usage = motif_usage(&[]);
        assert!(usage.is_empty());
        assert!(usage.sorted_desc().is_empty());
    }
}
