//! # Decision Tree
//!
//! A trained tree stored as a flat node table and evaluated by an index walk
//! from node 0. Each split tests `features[feature] <= threshold`; equality
//! takes the left branch.
//!
//! The table is validated once in [`DecisionTree::new`]: every node must be
//! reachable from the root exactly once, so every walk ends at a leaf.

use enose_core::{
    ClassId, Classifier, Component, EnoseError, EnoseResult, FeatureVector, ModelKind,
    NUM_FEATURES,
};
use serde::{Deserialize, Serialize};

/// One entry of the node table.
///
/// Serialized as `{"feature", "threshold", "left", "right"}` for splits and
/// `{"leaf"}` for leaves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
    Leaf {
        #[serde(rename = "leaf")]
        class: ClassId,
    },
}

impl TreeNode {
    pub fn split(feature: usize, threshold: f32, left: usize, right: usize) -> Self {
        TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    pub fn leaf(class: usize) -> Self {
        TreeNode::Leaf {
            class: ClassId(class),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }
}

/// Pre-order encoding of a tree, as emitted by the training exporter:
/// a split is followed by its whole left subtree, then its right subtree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preorder {
    /// `(feature, threshold)`
    Split(usize, f32),
    /// class id
    Leaf(usize),
}

/// Immutable decision tree over the 9 ratio features
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_classes: usize,
    depth: usize,
}

impl DecisionTree {
    /// Builds a tree from a node table rooted at index 0.
    ///
    /// Fails with `MalformedModel` if any index is out of range, a threshold
    /// is not finite, a leaf class is `>= n_classes`, or the table is not a
    /// proper tree (cycles, shared children, unreachable nodes).
    pub fn new(nodes: Vec<TreeNode>, n_classes: usize) -> EnoseResult<Self> {
        let depth = validate(&nodes, n_classes)?;
        Ok(Self {
            nodes,
            n_classes,
            depth,
        })
    }

    /// Builds a tree from its pre-order encoding
    pub fn from_preorder(ops: &[Preorder], n_classes: usize) -> EnoseResult<Self> {
        let mut nodes = Vec::with_capacity(ops.len());
        let mut pos = 0;
        build_preorder(ops, &mut pos, &mut nodes)?;

        if pos != ops.len() {
            return Err(EnoseError::malformed(format!(
                "pre-order tree has {} trailing entries after the root subtree",
                ops.len() - pos
            )));
        }

        Self::new(nodes, n_classes)
    }

    /// Class stored at the leaf reached by `features`
    pub fn predict(&self, features: &FeatureVector) -> ClassId {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { class } => return class,
            }
        }
    }

    /// Node indices visited from the root to the reached leaf
    pub fn decision_path(&self, features: &FeatureVector) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.depth + 1);
        let mut idx = 0;
        loop {
            path.push(idx);
            match self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[feature] <= threshold { left } else { right };
                }
                TreeNode::Leaf { .. } => return path,
            }
        }
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of splits on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn build_preorder(
    ops: &[Preorder],
    pos: &mut usize,
    nodes: &mut Vec<TreeNode>,
) -> EnoseResult<usize> {
    let op = *ops
        .get(*pos)
        .ok_or_else(|| EnoseError::malformed("pre-order tree ends inside a split"))?;
    *pos += 1;

    let idx = nodes.len();
    match op {
        Preorder::Leaf(class) => nodes.push(TreeNode::leaf(class)),
        Preorder::Split(feature, threshold) => {
            nodes.push(TreeNode::split(feature, threshold, 0, 0));
            let left = build_preorder(ops, pos, nodes)?;
            let right = build_preorder(ops, pos, nodes)?;
            nodes[idx] = TreeNode::split(feature, threshold, left, right);
        }
    }

    Ok(idx)
}

/// Checks the table and returns the tree depth
fn validate(nodes: &[TreeNode], n_classes: usize) -> EnoseResult<usize> {
    if nodes.is_empty() {
        return Err(EnoseError::malformed("decision tree has no nodes"));
    }
    if n_classes == 0 {
        return Err(EnoseError::malformed("decision tree needs at least one class"));
    }

    for (i, node) in nodes.iter().enumerate() {
        match *node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if feature >= NUM_FEATURES {
                    return Err(EnoseError::malformed(format!(
                        "node {i}: feature index {feature} out of range (0..{NUM_FEATURES})"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(EnoseError::malformed(format!(
                        "node {i}: threshold {threshold} is not finite"
                    )));
                }
                if left >= nodes.len() || right >= nodes.len() {
                    return Err(EnoseError::malformed(format!(
                        "node {i}: child ({left}, {right}) out of range (0..{})",
                        nodes.len()
                    )));
                }
            }
            TreeNode::Leaf { class } => {
                if class.index() >= n_classes {
                    return Err(EnoseError::malformed(format!(
                        "node {i}: leaf class {class} out of range (0..{n_classes})"
                    )));
                }
            }
        }
    }

    // Each node must be entered exactly once from the root
    let mut visited = vec![false; nodes.len()];
    let mut stack = vec![(0usize, 0usize)];
    let mut depth = 0;

    while let Some((idx, level)) = stack.pop() {
        if std::mem::replace(&mut visited[idx], true) {
            return Err(EnoseError::malformed(format!(
                "node {idx} is reached more than once (cycle or shared child)"
            )));
        }
        match nodes[idx] {
            TreeNode::Split { left, right, .. } => {
                stack.push((right, level + 1));
                stack.push((left, level + 1));
            }
            TreeNode::Leaf { .. } => depth = depth.max(level),
        }
    }

    if let Some(orphan) = visited.iter().position(|v| !v) {
        return Err(EnoseError::malformed(format!(
            "node {orphan} is unreachable from the root"
        )));
    }

    Ok(depth)
}

impl Component for DecisionTree {
    fn name(&self) -> &str {
        "DecisionTree"
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &FeatureVector) -> ClassId {
        DecisionTree::predict(self, features)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::DecisionTree
    }
}
