//! Average-linkage (UPGMA) clustering, flat cuts and leaf ordering.

use tracing::{debug, info};

use motif_models::{DistanceMatrix, Linkage, LinkageStep};

use crate::error::{AnalysisError, AnalysisResult};

/// Agglomerative clustering of a precomputed distance matrix.
///
/// Repeatedly merges the two closest active clusters, where the distance
/// between clusters is the mean of all leaf-to-leaf distances (updated with
/// the Lance-Williams rule). Ties go to the pair with the smallest cluster
/// ids. In every step `left < right`, and the new cluster gets id
/// `n + step`.
pub fn average_linkage(matrix: &DistanceMatrix) -> AnalysisResult<Linkage> {
    matrix.validate()?;
    let n = matrix.size();
    if n == 0 {
        return Err(AnalysisError::NoMotifs);
    }

    // Slot-indexed working state; a merged cluster reuses its lower slot
    let mut dist: Vec<Vec<f64>> = matrix.as_rows();
    let mut ids: Vec<usize> = (0..n).collect();
    let mut sizes: Vec<usize> = vec![1; n];
    let mut active: Vec<bool> = vec![true; n];
    let mut steps = Vec::with_capacity(n.saturating_sub(1));

    for k in 0..n.saturating_sub(1) {
        let (a, b) = closest_pair(&dist, &ids, &active);
        let height = dist[a][b];
        let (size_a, size_b) = (sizes[a], sizes[b]);
        let merged = size_a + size_b;

        steps.push(LinkageStep {
            left: ids[a].min(ids[b]),
            right: ids[a].max(ids[b]),
            height,
            size: merged,
        });

        for other in 0..n {
            if !active[other] || other == a || other == b {
                continue;
            }
            let d = (size_a as f64 * dist[a][other] + size_b as f64 * dist[b][other])
                / merged as f64;
            dist[a][other] = d;
            dist[other][a] = d;
        }

        active[b] = false;
        ids[a] = n + k;
        sizes[a] = merged;

        debug!(step = k, height, size = merged, "Merged clusters");
    }

    let linkage = Linkage::new(n, steps)?;
    info!(leaves = n, "Built average linkage tree");
    Ok(linkage)
}

/// Active slot pair with the smallest distance, ties broken by cluster ids.
fn closest_pair(dist: &[Vec<f64>], ids: &[usize], active: &[bool]) -> (usize, usize) {
    let mut best: Option<(f64, (usize, usize), (usize, usize))> = None;

    for i in 0..dist.len() {
        if !active[i] {
            continue;
        }
        for j in (i + 1)..dist.len() {
            if !active[j] {
                continue;
            }
            let d = dist[i][j];
            let key = (ids[i].min(ids[j]), ids[i].max(ids[j]));
            let better = match best {
                None => true,
                Some((best_d, best_key, _)) => d < best_d || (d == best_d && key < best_key),
            };
            if better {
                best = Some((d, key, (i, j)));
            }
        }
    }

    // Callers only ask while at least two clusters are active
    best.map(|(_, _, pair)| pair).unwrap_or((0, 0))
}

/// Flat cluster label of every leaf after cutting the tree at `height`.
///
/// Applies every merge whose height is strictly below `height`. Labels are
/// numbered `0..k` in order of first appearance by leaf index.
pub fn cut_tree(linkage: &Linkage, height: f64) -> Vec<usize> {
    let n = linkage.n_leaves;
    let mut parent: Vec<usize> = (0..n + linkage.steps.len()).collect();

    for (k, step) in linkage.steps.iter().enumerate() {
        if step.height < height {
            parent[step.left] = n + k;
            parent[step.right] = n + k;
        }
    }

    let mut labels = Vec::with_capacity(n);
    let mut roots: Vec<usize> = Vec::new();
    for leaf in 0..n {
        let mut node = leaf;
        while parent[node] != node {
            node = parent[node];
        }
        let label = match roots.iter().position(|&r| r == node) {
            Some(label) => label,
            None => {
                roots.push(node);
                roots.len() - 1
            }
        };
        labels.push(label);
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_models::MotifSet;

    fn matrix(ids: &[u32], rows: &[&[f64]]) -> DistanceMatrix {
        let values = rows.iter().flat_map(|r| r.iter().copied()).collect();
        DistanceMatrix::new(MotifSet::from_ids(ids.iter().copied()).unwrap(), values).unwrap()
    }

    /// Leaves {0,1} and {2,3} form two well separated groups.
    fn two_groups() -> DistanceMatrix {
        matrix(
            &[10, 11, 12, 13],
            &[
                &[0.0, 1.0, 10.0, 11.0],
                &[1.0, 0.0, 9.0, 10.0],
                &[10.0, 9.0, 0.0, 2.0],
                &[11.0, 10.0, 2.0, 0.0],
            ],
        )
    }

    #[test]
    fn test_average_linkage_steps() {
        let linkage = average_linkage(&two_groups()).unwrap();

        assert_eq!(linkage.n_leaves, 4);
        assert_eq!(
            linkage.steps,
            vec![
                LinkageStep { left: 0, right: 1, height: 1.0, size: 2 },
                LinkageStep { left: 2, right: 3, height: 2.0, size: 2 },
                // mean of 10, 11, 9, 10
                LinkageStep { left: 4, right: 5, height: 10.0, size: 4 },
            ]
        );
    }

    #[test]
    fn test_heights_monotone_and_sizes_consistent() {
        let m = matrix(
            &[1, 2, 3, 4, 5],
            &[
                &[0.0, 0.3, 0.7, 1.2, 0.9],
                &[0.3, 0.0, 0.5, 1.1, 0.8],
                &[0.7, 0.5, 0.0, 0.6, 0.4],
                &[1.2, 1.1, 0.6, 0.0, 0.2],
                &[0.9, 0.8, 0.4, 0.2, 0.0],
            ],
        );
        let linkage = average_linkage(&m).unwrap();

        assert_eq!(linkage.steps.len(), 4);
        for pair in linkage.steps.windows(2) {
            assert!(pair[0].height <= pair[1].height);
        }
        for step in &linkage.steps {
            assert!(step.left < step.right);
        }
        assert_eq!(linkage.steps.last().unwrap().size, 5);
    }

    #[test]
    fn test_ties_are_deterministic() {
        let m = matrix(
            &[1, 2, 3],
            &[&[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0], &[1.0, 1.0, 0.0]],
        );
        let first = average_linkage(&m).unwrap();
        let second = average_linkage(&m).unwrap();

        assert_eq!(first, second);
        assert_eq!((first.steps[0].left, first.steps[0].right), (0, 1));
        assert_eq!((first.steps[1].left, first.steps[1].right), (2, 3));
    }

    #[test]
    fn test_single_and_empty() {
        let single = average_linkage(&matrix(&[5], &[&[0.0]])).unwrap();
        assert_eq!(single.n_leaves, 1);
        assert!(single.steps.is_empty());
        assert_eq!(single.leaf_order(), vec![0]);
        assert_eq!(cut_tree(&single, 1.0), vec![0]);

        let empty = DistanceMatrix::new(MotifSet::new(Vec::new()).unwrap(), Vec::new()).unwrap();
        assert!(matches!(average_linkage(&empty), Err(AnalysisError::NoMotifs)));
    }

    #[test]
    fn test_rejects_invalid_matrix() {
        let m = matrix(&[1, 2], &[&[0.0, 1.0], &[2.0, 0.0]]);
        assert!(matches!(average_linkage(&m), Err(AnalysisError::Model(_))));
    }

    #[test]
    fn test_cut_tree_heights() {
        let linkage = average_linkage(&two_groups()).unwrap();

        assert_eq!(cut_tree(&linkage, 0.5), vec![0, 1, 2, 3]);
        // A merge exactly at the cut is not applied
        assert_eq!(cut_tree(&linkage, 1.0), vec![0, 1, 2, 3]);
        assert_eq!(cut_tree(&linkage, 1.5), vec![0, 0, 1, 2]);
        assert_eq!(cut_tree(&linkage, 5.0), vec![0, 0, 1, 1]);
        assert_eq!(cut_tree(&linkage, 100.0), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_cut_tree_labels_follow_leaf_order() {
        let m = matrix(
            &[1, 2, 3, 4],
            &[
                &[0.0, 10.0, 10.0, 1.0],
                &[10.0, 0.0, 2.0, 10.0],
                &[10.0, 2.0, 0.0, 10.0],
                &[1.0, 10.0, 10.0, 0.0],
            ],
        );
        let linkage = average_linkage(&m).unwrap();

        assert_eq!(cut_tree(&linkage, 5.0), vec![0, 1, 1, 0]);
        assert_eq!(linkage.leaf_order(), vec![0, 3, 1, 2]);
    }

    #[test]
    fn test_leaf_order_visits_every_leaf() {
        let linkage = average_linkage(&two_groups()).unwrap();
        assert_eq!(linkage.leaf_order(), vec![0, 1, 2, 3]);
    }
}
