//! Agglomerative merge tree.
//!
//! Uses the usual linkage-matrix convention: clusters `0..n_leaves` are the
//! leaves (matrix indices), and the cluster created by step `k` gets id
//! `n_leaves + k`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// One merge of two clusters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LinkageStep {
    /// Cluster id of the left child (the smaller id)
    pub left: usize,
    /// Cluster id of the right child
    pub right: usize,
    /// Inter-cluster distance at which the merge happened
    pub height: f64,
    /// Number of leaves under the new cluster
    pub size: usize,
}

/// Complete merge tree over `n_leaves` leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Linkage {
    pub n_leaves: usize,
    pub steps: Vec<LinkageStep>,
}

impl Linkage {
    /// Wrap merge steps, checking the tree is well formed.
    pub fn new(n_leaves: usize, steps: Vec<LinkageStep>) -> ModelResult<Self> {
        if steps.len() != n_leaves.saturating_sub(1) {
            return Err(ModelError::invalid_linkage(format!(
                "{} leaves need {} merges, got {}",
                n_leaves,
                n_leaves.saturating_sub(1),
                steps.len()
            )));
        }

        let mut used = vec![false; n_leaves + steps.len()];
        for (k, step) in steps.iter().enumerate() {
            let new_id = n_leaves + k;
            for child in [step.left, step.right] {
                if child >= new_id {
                    return Err(ModelError::invalid_linkage(format!(
                        "step {} references cluster {} before it exists",
                        k, child
                    )));
                }
                if used[child] {
                    return Err(ModelError::invalid_linkage(format!(
                        "cluster {} merged twice",
                        child
                    )));
                }
                used[child] = true;
            }
            if !step.height.is_finite() {
                return Err(ModelError::invalid_linkage(format!(
                    "step {} has non-finite height {}",
                    k, step.height
                )));
            }
        }

        Ok(Self { n_leaves, steps })
    }

    /// Id of the root cluster, if there is at least one leaf.
    pub fn root(&self) -> Option<usize> {
        match self.n_leaves {
            0 => None,
            1 => Some(0),
            n => Some(n + self.steps.len() - 1),
        }
    }

    pub fn is_leaf(&self, cluster: usize) -> bool {
        cluster < self.n_leaves
    }

    /// Merge step that created a non-leaf cluster.
    pub fn step_for(&self, cluster: usize) -> Option<&LinkageStep> {
        cluster
            .checked_sub(self.n_leaves)
            .and_then(|k| self.steps.get(k))
    }

    /// Height of a cluster: 0 for leaves, the merge height otherwise.
    pub fn height_of(&self, cluster: usize) -> f64 {
        self.step_for(cluster).map(|s| s.height).unwrap_or(0.0)
    }

    /// Leaves depth first from the root, left child before right.
    pub fn leaf_order(&self) -> Vec<usize> {
        let Some(root) = self.root() else {
            return Vec::new();
        };

        let mut order = Vec::with_capacity(self.n_leaves);
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match self.step_for(node) {
                Some(step) => {
                    stack.push(step.right);
                    stack.push(step.left);
                }
                None => order.push(node),
            }
        }
        order
    }
}
