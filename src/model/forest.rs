//! Random forest classifier loaded from a JSON artifact
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "classes": ["chickpea", "maize", "paddy"],
//!   "features": ["temperature", "humidity", "rainfall"],
//!   "trees": [
//!     { "nodes": [
//!         { "feature": 2, "threshold": 1200.0, "left": 1, "right": 2 },
//!         { "leaf": [6.0, 3.0, 1.0] },
//!         { "leaf": [0.0, 1.0, 9.0] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A split sends a sample left when its feature value is `<= threshold`.
//! Leaves hold per-class weights which are normalized into probabilities;
//! the forest probability of a class is the mean over all trees.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::{FeatureVector, SuitabilityModel, rank_scores};
use crate::models::SuitabilityScore;
use crate::{AgriProfitError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        leaf: Vec<f64>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    /// Class probabilities for one sample. `values` is indexed like the forest's features.
    fn predict_proba(&self, values: &[f64]) -> Vec<f64> {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if values[*feature] <= *threshold { *left } else { *right };
                }
                Node::Leaf { leaf } => {
                    let total: f64 = leaf.iter().sum();
                    return leaf.iter().map(|w| w / total).collect();
                }
            }
        }
    }

    /// Checked at load so `predict_proba` can index freely and always terminates
    fn validate(&self, tree_index: usize, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AgriProfitError::model(format!("Tree {tree_index} has no nodes")));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(AgriProfitError::model(format!(
                            "Tree {tree_index} node {i} splits on unknown feature index {feature}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(AgriProfitError::model(format!(
                            "Tree {tree_index} node {i} has a non-finite threshold"
                        )));
                    }
                    // Children after the parent rules out cycles
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(AgriProfitError::model(format!(
                                "Tree {tree_index} node {i} has invalid child index {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { leaf } => {
                    if leaf.len() != n_classes {
                        return Err(AgriProfitError::model(format!(
                            "Tree {tree_index} node {i} has {} class weights, expected {n_classes}",
                            leaf.len()
                        )));
                    }
                    if leaf.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(AgriProfitError::model(format!(
                            "Tree {tree_index} node {i} has a negative or non-finite weight"
                        )));
                    }
                    if leaf.iter().sum::<f64>() <= 0.0 {
                        return Err(AgriProfitError::model(format!(
                            "Tree {tree_index} node {i} has all-zero class weights"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Random forest crop classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestModel {
    /// Crop names, in the order of the leaf weights
    pub classes: Vec<String>,
    /// Feature names, in the order referenced by split nodes
    pub features: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForestModel {
    /// Load and validate a model artifact from disk
    #[instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AgriProfitError::model(format!("Failed to read model {}: {e}", path.display()))
        })?;
        let model = Self::from_json(&content)?;

        info!(
            "Loaded suitability model with {} trees, {} crops, features [{}]",
            model.trees.len(),
            model.classes.len(),
            model.features.join(", ")
        );
        Ok(model)
    }

    /// Parse and validate a model artifact
    pub fn from_json(content: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(content)
            .map_err(|e| AgriProfitError::model(format!("Invalid model artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(AgriProfitError::model("Model has no classes"));
        }
        if self.features.is_empty() {
            return Err(AgriProfitError::model("Model has no features"));
        }
        if self.trees.is_empty() {
            return Err(AgriProfitError::model("Model has no trees"));
        }

        if let Some(unknown) = self
            .features
            .iter()
            .find(|f| !FeatureVector::NAMES.contains(&f.as_str()))
        {
            return Err(AgriProfitError::model(format!(
                "Model uses unsupported feature '{unknown}'"
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.features.len(), self.classes.len())?;
        }
        Ok(())
    }
}

impl SuitabilityModel for RandomForestModel {
    fn predict(&self, features: &FeatureVector) -> Result<Vec<SuitabilityScore>> {
        let values = self
            .features
            .iter()
            .map(|name| features.get(name))
            .collect::<Result<Vec<f64>>>()?;

        if values.iter().any(|v| !v.is_finite()) {
            return Err(AgriProfitError::model("Feature vector contains non-finite values"));
        }

        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (total, p) in totals.iter_mut().zip(tree.predict_proba(&values)) {
                *total += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        let mut scores: Vec<SuitabilityScore> = self
            .classes
            .iter()
            .zip(totals)
            .map(|(crop, total)| SuitabilityScore::new(crop.clone(), total / n_trees))
            .collect();
        rank_scores(&mut scores);

        debug!(
            "Model ranking: {:?}",
            scores
                .iter()
                .map(|s| format!("{} {:.3}", s.crop_name, s.score))
                .collect::<Vec<_>>()
        );
        Ok(scores)
    }
}
