// Gini CART 決策樹：節點存於平面陣列，x[feature] <= threshold 往左

use crate::core::ForestParams;
use crate::utils::error::{PestError, Result};
use rand::rngs::StdRng;
use rand::seq::index::sample;

#[derive(Debug, Clone)]
pub struct TreeNode {
    /// `None` for leaves.
    pub feature: Option<usize>,
    pub threshold: f64,
    pub left_child: usize,
    pub right_child: usize,
    /// Class probabilities of the samples that reached this node.
    pub proba: Vec<f64>,
    pub n_samples: usize,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.feature.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    n_classes: usize,
    importances: Vec<f64>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    params: &'a ForestParams,
    n_classes: usize,
    max_features: usize,
    nodes: Vec<TreeNode>,
    importances: Vec<f64>,
}

pub fn gini(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

impl<'a> Builder<'a> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn leaf(&mut self, counts: &[usize]) -> usize {
        let total = counts.iter().sum::<usize>().max(1) as f64;
        self.nodes.push(TreeNode {
            feature: None,
            threshold: 0.0,
            left_child: 0,
            right_child: 0,
            proba: counts.iter().map(|&c| c as f64 / total).collect(),
            n_samples: counts.iter().sum(),
        });
        self.nodes.len() - 1
    }

    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let n_features = self.x[0].len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let total = indices.len();
        let mut best: Option<SplitCandidate> = None;

        // 抽到的特徵都無法切分時，繼續看剩下的特徵
        for (visited, feature) in sample(rng, n_features, n_features).into_iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = self.class_counts(&sorted);

            for pos in 0..total - 1 {
                let label = self.y[sorted[pos]];
                left_counts[label] += 1;
                right_counts[label] -= 1;

                let current = self.x[sorted[pos]][feature];
                let next = self.x[sorted[pos + 1]][feature];
                if current == next {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = total - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let impurity = (n_left as f64 * gini(&left_counts)
                    + n_right as f64 * gini(&right_counts))
                    / total as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: current + (next - current) / 2.0,
                        impurity,
                        left: sorted[..n_left].to_vec(),
                        right: sorted[n_left..].to_vec(),
                    });
                }
            }
        }

        best
    }

    fn build(&mut self, indices: &[usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let impurity = gini(&counts);
        let n = indices.len();

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if impurity == 0.0
            || depth_reached
            || n < self.params.min_samples_split.max(2)
            || n < 2 * self.params.min_samples_leaf.max(1)
        {
            return self.leaf(&counts);
        }

        let Some(split) = self.best_split(indices, rng) else {
            return self.leaf(&counts);
        };

        self.importances[split.feature] += n as f64 * (impurity - split.impurity);

        let node_idx = self.leaf(&counts);
        let left = self.build(&split.left, depth + 1, rng);
        let right = self.build(&split.right, depth + 1, rng);

        let node = &mut self.nodes[node_idx];
        node.feature = Some(split.feature);
        node.threshold = split.threshold;
        node.left_child = left;
        node.right_child = right;
        node_idx
    }
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `sample_indices` (duplicates allowed,
    /// which is how bootstrap samples are passed in).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        sample_indices: &[usize],
        n_classes: usize,
        params: &ForestParams,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if x.is_empty() || sample_indices.is_empty() {
            return Err(PestError::TrainingError {
                message: "cannot grow a tree without samples".to_string(),
            });
        }
        if x.len() != y.len() {
            return Err(PestError::TrainingError {
                message: format!("{} feature rows but {} targets", x.len(), y.len()),
            });
        }
        if let Some(&bad) = y.iter().find(|&&label| label >= n_classes) {
            return Err(PestError::TrainingError {
                message: format!("label {} out of range for {} classes", bad, n_classes),
            });
        }

        let n_features = x[0].len();
        let mut builder = Builder {
            x,
            y,
            params,
            n_classes,
            max_features: params.max_features.resolve(n_features),
            nodes: Vec::new(),
            importances: vec![0.0; n_features],
        };
        builder.build(sample_indices, 0, rng);

        let total: f64 = builder.importances.iter().sum();
        if total > 0.0 {
            builder.importances.iter_mut().for_each(|v| *v /= total);
        }

        Ok(Self {
            nodes: builder.nodes,
            n_features,
            n_classes,
            importances: builder.importances,
        })
    }

    fn leaf_for(&self, features: &[f64]) -> &TreeNode {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            match node.feature {
                None => return node,
                Some(feature) => {
                    let value = features.get(feature).copied().unwrap_or(0.0);
                    idx = if value <= node.threshold {
                        node.left_child
                    } else {
                        node.right_child
                    };
                }
            }
        }
    }

    pub fn predict_proba(&self, features: &[f64]) -> &[f64] {
        &self.leaf_for(features).proba
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn depth(&self) -> usize {
        self.node_depth(0)
    }

    fn node_depth(&self, idx: usize) -> usize {
        let node = &self.nodes[idx];
        if node.is_leaf() {
            return 0;
        }
        1 + self
            .node_depth(node.left_child)
            .max(self.node_depth(node.right_child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MaxFeatures;
    use rand::SeedableRng;

    fn all_features() -> ForestParams {
        ForestParams {
            max_features: MaxFeatures::All,
            ..ForestParams::default()
        }
    }

    fn fit(x: &[Vec<f64>], y: &[usize], params: &ForestParams) -> DecisionTree {
        let mut rng = StdRng::seed_from_u64(0);
        let indices: Vec<usize> = (0..x.len()).collect();
        DecisionTree::fit(x, y, &indices, 2, params, &mut rng).unwrap()
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[5, 0]), 0.0);
        assert!((gini(&[5, 5]) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0]), 0.0);
    }

    #[test]
    fn test_single_threshold_split() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0]];
        let y = vec![0, 0, 0, 1, 1];
        let tree = fit(&x, &y, &all_features());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict_proba(&[0.0]), &[1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[6.5]), &[1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[6.6]), &[0.0, 1.0]);
        assert_eq!(tree.feature_importances(), &[1.0]);
    }

    #[test]
    fn test_picks_informative_feature() {
        let x = vec![
            vec![5.0, 0.0],
            vec![1.0, 0.0],
            vec![4.0, 1.0],
            vec![2.0, 1.0],
        ];
        let y = vec![0, 0, 1, 1];
        let tree = fit(&x, &y, &all_features());

        assert_eq!(tree.predict_proba(&[3.0, 1.0]), &[0.0, 1.0]);
        assert_eq!(tree.predict_proba(&[3.0, 0.0]), &[1.0, 0.0]);
        assert_eq!(tree.feature_importances(), &[0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_keeps_mixed_leaf_probabilities() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let y = vec![0, 1, 0, 1];
        let params = ForestParams {
            max_depth: Some(0),
            ..all_features()
        };
        let tree = fit(&x, &y, &params);

        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba(&[2.5]), &[0.5, 0.5]);
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_leaves() {
        let x = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        let y = vec![1, 0, 0, 0];
        let params = ForestParams {
            min_samples_leaf: 2,
            ..all_features()
        };
        let tree = fit(&x, &y, &params);

        let proba = tree.predict_proba(&[1.0]);
        assert!((proba[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_out_of_range_labels() {
        let mut rng = StdRng::seed_from_u64(0);
        let x = vec![vec![1.0]];
        let result = DecisionTree::fit(&x, &[3], &[0], 2, &all_features(), &mut rng);
        assert!(result.is_err());
    }
}
