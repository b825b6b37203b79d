//! XGBoost JSON model evaluation
//!
//! Loads a `gbtree` booster saved with `save_model("*.json")` and scores it
//! with XGBoost's prediction rules:
//!
//! 1. At a split node go left when `x < split_condition`, or follow
//!    `default_left` when `x` is missing (NaN)
//! 2. A leaf's value is stored in `split_conditions` at the leaf index
//! 3. Margin = logit(`base_score`) + sum of one leaf value per tree
//! 4. Probability = sigmoid(margin)

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::ScoringOracle;
use crate::features::FeatureVector;
use crate::schema::FeatureSchema;
use crate::{Error, Result};

/// Objectives whose output transform is the logistic sigmoid
const LOGISTIC_OBJECTIVES: &[&str] = &["binary:logistic", "reg:logistic"];

// ============================================================================
// On-disk format
// ============================================================================

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: LearnerJson,
}

#[derive(Debug, Deserialize)]
struct LearnerJson {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterJson,
    learner_model_param: LearnerParamJson,
    objective: ObjectiveJson,
}

#[derive(Debug, Deserialize)]
struct BoosterJson {
    name: String,
    model: Option<GbTreeJson>,
}

#[derive(Debug, Deserialize)]
struct GbTreeJson {
    trees: Vec<TreeJson>,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Flags,
    /// 0 = numerical, 1 = categorical; absent before 1.6
    #[serde(default)]
    split_type: Vec<u8>,
}

/// `default_left` is written as 0/1 integers by older releases, booleans by newer ones
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flags {
    Ints(Vec<u8>),
    Bools(Vec<bool>),
}

impl Flags {
    fn into_bools(self) -> Vec<bool> {
        match self {
            Flags::Ints(v) => v.into_iter().map(|x| x != 0).collect(),
            Flags::Bools(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LearnerParamJson {
    base_score: String,
    num_feature: String,
}

#[derive(Debug, Deserialize)]
struct ObjectiveJson {
    name: String,
}

// ============================================================================
// In-memory model
// ============================================================================

/// A single regression tree stored as parallel arrays
#[derive(Debug, Clone)]
struct RegTree {
    left: Vec<i64>,
    right: Vec<i64>,
    feature: Vec<usize>,
    threshold: Vec<f32>,
    default_left: Vec<bool>,
}

impl RegTree {
    fn from_json(index: usize, tree: TreeJson, num_feature: usize) -> Result<Self> {
        let n = tree.left_children.len();
        let default_left = tree.default_left.into_bools();

        if n == 0 {
            return Err(Error::Model(format!("tree {} has no nodes", index)));
        }
        if tree.right_children.len() != n
            || tree.split_indices.len() != n
            || tree.split_conditions.len() != n
            || default_left.len() != n
        {
            return Err(Error::Model(format!(
                "tree {} has node arrays of different lengths",
                index
            )));
        }

        let mut feature = Vec::with_capacity(n);
        for node in 0..n {
            let is_leaf = tree.left_children[node] == -1;
            if !is_leaf {
                for child in [tree.left_children[node], tree.right_children[node]] {
                    if child < 0 || child >= n as i64 || child == node as i64 {
                        return Err(Error::Model(format!(
                            "tree {} node {} has invalid child {}",
                            index, node, child
                        )));
                    }
                }
                if tree.split_type.get(node).is_some_and(|&t| t != 0) {
                    return Err(Error::Model(format!(
                        "tree {} node {} is a categorical split (only numerical splits are supported)",
                        index, node
                    )));
                }
                let split = tree.split_indices[node];
                if split < 0 || split as usize >= num_feature {
                    return Err(Error::Model(format!(
                        "tree {} node {} splits on feature {} (model has {})",
                        index, node, split, num_feature
                    )));
                }
            }
            feature.push(tree.split_indices[node].max(0) as usize);
        }

        check_acyclic(index, &tree.left_children, &tree.right_children)?;

        Ok(Self {
            left: tree.left_children,
            right: tree.right_children,
            feature,
            threshold: tree.split_conditions,
            default_left,
        })
    }

    /// Leaf value reached by `x`
    ///
    /// Every node is reachable from the root at most once (checked at load),
    /// so the walk terminates.
    fn leaf_value(&self, x: &[f64]) -> f32 {
        let mut node = 0usize;
        while self.left[node] != -1 {
            let value = x[self.feature[node]];
            let go_left = if value.is_nan() {
                self.default_left[node]
            } else {
                (value as f32) < self.threshold[node]
            };
            node = if go_left {
                self.left[node] as usize
            } else {
                self.right[node] as usize
            };
        }
        self.threshold[node]
    }
}

/// Reject trees where a node is reachable twice (shared child or cycle)
fn check_acyclic(index: usize, left: &[i64], right: &[i64]) -> Result<()> {
    let mut visited = vec![false; left.len()];
    let mut stack = vec![0usize];
    while let Some(node) = stack.pop() {
        if visited[node] {
            return Err(Error::Model(format!(
                "tree {} node {} is reachable more than once",
                index, node
            )));
        }
        visited[node] = true;
        if left[node] != -1 {
            stack.push(left[node] as usize);
            stack.push(right[node] as usize);
        }
    }
    Ok(())
}

/// Binary classifier backed by an XGBoost tree ensemble
#[derive(Debug, Clone)]
pub struct XgbClassifier {
    schema: FeatureSchema,
    base_margin: f64,
    trees: Vec<RegTree>,
}

impl XgbClassifier {
    /// Load a model file and bind it to the feature schema it was trained with
    ///
    /// Fails when the file is missing, malformed, uses an unsupported
    /// booster/objective, or disagrees with `schema` on the feature count or
    /// (when the model records them) the feature names.
    pub fn load(path: &Path, schema: &FeatureSchema) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Model(format!("cannot read model {}: {}", path.display(), e))
        })?;
        let model = Self::from_json(&content, schema).map_err(|e| match e {
            Error::Model(msg) => Error::Model(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        info!("Loaded XGBoost model: {}", model.describe());
        Ok(model)
    }

    /// Parse a model from JSON text
    pub fn from_json(content: &str, schema: &FeatureSchema) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(content)
            .map_err(|e| Error::Model(format!("not an XGBoost JSON model: {}", e)))?;
        let learner = file.learner;

        if !LOGISTIC_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            return Err(Error::Model(format!(
                "unsupported objective '{}' (expected binary:logistic)",
                learner.objective.name
            )));
        }

        if learner.gradient_booster.name != "gbtree" {
            return Err(Error::Model(format!(
                "unsupported booster '{}' (expected gbtree)",
                learner.gradient_booster.name
            )));
        }

        let num_feature: usize = learner
            .learner_model_param
            .num_feature
            .trim()
            .parse()
            .map_err(|_| {
                Error::Model(format!(
                    "invalid num_feature '{}'",
                    learner.learner_model_param.num_feature
                ))
            })?;

        if num_feature != schema.len() {
            return Err(Error::Model(format!(
                "model expects {} features but schema lists {}",
                num_feature,
                schema.len()
            )));
        }

        if !learner.feature_names.is_empty() && learner.feature_names != schema.columns() {
            return Err(Error::Model(
                "model feature names differ from the schema columns".to_string(),
            ));
        }

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;
        let base_margin = logit(base_score)?;

        let gbtree = learner
            .gradient_booster
            .model
            .ok_or_else(|| Error::Model("gbtree booster has no model section".to_string()))?;

        let trees = gbtree
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| RegTree::from_json(i, tree, num_feature))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "XGBoost model: {} trees, base_score {}, {} features",
            trees.len(),
            base_score,
            num_feature
        );

        Ok(Self {
            schema: schema.clone(),
            base_margin,
            trees,
        })
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_features(&self) -> usize {
        self.schema.len()
    }

    /// Raw margin (log-odds) before the sigmoid
    ///
    /// `x` must hold one value per schema column.
    fn margin(&self, x: &[f64]) -> f64 {
        self.base_margin
            + self
                .trees
                .iter()
                .map(|tree| f64::from(tree.leaf_value(x)))
                .sum::<f64>()
    }
}

impl ScoringOracle for XgbClassifier {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
        if !features.matches_schema(&self.schema) {
            return Err(Error::ContractViolation(format!(
                "feature vector has {} columns that do not match the {}-column model schema",
                features.len(),
                self.schema.len()
            )));
        }

        Ok(sigmoid(self.margin(features.values())))
    }

    fn describe(&self) -> String {
        format!(
            "xgboost gbtree, {} trees, {} features",
            self.trees.len(),
            self.schema.len()
        )
    }
}

/// `base_score` is "5E-1" in most releases and "[5E-1]" from 2.1 on
fn parse_base_score(raw: &str) -> Result<f64> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| Error::Model(format!("invalid base_score '{}'", raw)))
}

fn logit(p: f64) -> Result<f64> {
    if p > 0.0 && p < 1.0 {
        Ok((p / (1.0 - p)).ln())
    } else {
        Err(Error::Model(format!("base_score {} outside (0, 1)", p)))
    }
}

/// Sigmoid function: σ(x) = 1 / (1 + e^(-x))
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(n: usize) -> FeatureSchema {
        FeatureSchema::new((0..n).map(|i| format!("f{}", i)).collect()).unwrap()
    }

    /// One stump on f0 < 0.5 with leaves -1.0 / +1.0
    fn stump_json(default_left: &str, base_score: &str) -> String {
        format!(
            r#"{{
                "learner": {{
                    "feature_names": [],
                    "gradient_booster": {{
                        "name": "gbtree",
                        "model": {{
                            "trees": [{{
                                "left_children": [1, -1, -1],
                                "right_children": [2, -1, -1],
                                "split_indices": [0, 0, 0],
                                "split_conditions": [0.5, -1.0, 1.0],
                                "default_left": {}
                            }}]
                        }}
                    }},
                    "learner_model_param": {{ "base_score": "{}", "num_feature": "2" }},
                    "objective": {{ "name": "binary:logistic" }}
                }},
                "version": [2, 0, 3]
            }}"#,
            default_left, base_score
        )
    }

    #[test]
    fn test_stump_margin() {
        let model = XgbClassifier::from_json(&stump_json("[1, 0, 0]", "5E-1"), &schema(2)).unwrap();
        assert_eq!(model.num_trees(), 1);
        assert!((model.margin(&[0.0, 0.0]) - -1.0).abs() < 1e-9);
        assert!((model.margin(&[0.5, 0.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_value_follows_default_direction() {
        let left = XgbClassifier::from_json(&stump_json("[true, false, false]", "5E-1"), &schema(2))
            .unwrap();
        assert!((left.margin(&[f64::NAN, 0.0]) - -1.0).abs() < 1e-9);

        let right = XgbClassifier::from_json(&stump_json("[0, 0, 0]", "5E-1"), &schema(2)).unwrap();
        assert!((right.margin(&[f64::NAN, 0.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bracketed_base_score() {
        let model = XgbClassifier::from_json(&stump_json("[0, 0, 0]", "[2E-1]"), &schema(2)).unwrap();
        let expected = (0.2f64 / 0.8).ln() + 1.0;
        assert!((model.margin(&[1.0, 0.0]) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_feature_count_mismatch_rejected() {
        let err = XgbClassifier::from_json(&stump_json("[0, 0, 0]", "5E-1"), &schema(3)).unwrap_err();
        assert!(err.to_string().contains("expects 2 features"));
    }

    #[test]
    fn test_unsupported_objective_rejected() {
        let json = stump_json("[0, 0, 0]", "5E-1").replace("binary:logistic", "reg:squarederror");
        assert!(XgbClassifier::from_json(&json, &schema(2)).is_err());
    }

    #[test]
    fn test_out_of_range_split_index_rejected() {
        let json = stump_json("[0, 0, 0]", "5E-1")
            .replace(r#""split_indices": [0, 0, 0]"#, r#""split_indices": [7, 0, 0]"#);
        assert!(XgbClassifier::from_json(&json, &schema(2)).is_err());
    }

    #[test]
    fn test_cyclic_tree_rejected() {
        let json = stump_json("[0, 0, 0]", "5E-1").replace(
            r#""left_children": [1, -1, -1]"#,
            r#""left_children": [1, 0, -1]"#,
        );
        let err = XgbClassifier::from_json(&json, &schema(2)).unwrap_err();
        assert!(err.to_string().contains("invalid child") || err.to_string().contains("more than once"));
    }

    #[test]
    fn test_categorical_split_rejected() {
        let json = stump_json("[0, 0, 0]", "5E-1").replace(
            r#""default_left": [0, 0, 0]"#,
            r#""default_left": [0, 0, 0], "split_type": [1, 0, 0]"#,
        );
        let err = XgbClassifier::from_json(&json, &schema(2)).unwrap_err();
        assert!(err.to_string().contains("categorical"));

        let numerical = stump_json("[0, 0, 0]", "5E-1").replace(
            r#""default_left": [0, 0, 0]"#,
            r#""default_left": [0, 0, 0], "split_type": [0, 0, 0]"#,
        );
        assert!(XgbClassifier::from_json(&numerical, &schema(2)).is_ok());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(XgbClassifier::from_json("not json", &schema(2)).is_err());
        assert!(XgbClassifier::from_json("{}", &schema(2)).is_err());
    }

    #[test]
    fn test_sigmoid_and_logit_inverse() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        let p = 0.37;
        assert!((sigmoid(logit(p).unwrap()) - p).abs() < 1e-12);
        assert!(logit(1.0).is_err());
    }
}
