// Bootstrap 隨機森林：機率為各樹葉節點分佈的平均

use crate::core::tree::DecisionTree;
use crate::core::{Classifier, ForestParams};
use crate::utils::error::{PestError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_classes: 0,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: usize = self.trees.iter().map(DecisionTree::depth).sum();
        total as f64 / self.trees.len() as f64
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(DecisionTree::n_nodes).sum()
    }

    /// 各樹 impurity 下降量的平均，總和為 1
    pub fn feature_importances(&self) -> Vec<f64> {
        let Some(first) = self.trees.first() else {
            return Vec::new();
        };
        let mut importances = vec![0.0; first.n_features()];
        for tree in &self.trees {
            for (acc, v) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        importances
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], targets: &[usize]) -> Result<()> {
        if features.is_empty() {
            return Err(PestError::TrainingError {
                message: "training set is empty".to_string(),
            });
        }
        if self.params.n_estimators == 0 {
            return Err(PestError::TrainingError {
                message: "n_estimators must be at least 1".to_string(),
            });
        }

        // 至少兩類，讓 predict_proba 永遠有正類欄位
        self.n_classes = targets.iter().copied().max().map_or(2, |m| (m + 1).max(2));

        let n = features.len();
        let mut rng = StdRng::seed_from_u64(self.params.random_state);
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            let indices: Vec<usize> = if self.params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let tree_seed: u64 = rng.gen();
            let mut tree_rng = StdRng::seed_from_u64(tree_seed);
            trees.push(DecisionTree::fit(
                features,
                targets,
                &indices,
                self.n_classes,
                &self.params,
                &mut tree_rng,
            )?);
        }

        self.trees = trees;
        tracing::debug!(
            "Forest grown: {} trees, avg depth {:.1}, {} nodes",
            self.trees.len(),
            self.avg_depth(),
            self.total_nodes()
        );
        Ok(())
    }

    fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        if self.trees.is_empty() {
            return proba;
        }
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(features)) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        proba
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }
}
