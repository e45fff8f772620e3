//! # Random Forest
//!
//! Five independent decision trees, one unweighted vote each. The class with
//! the most votes wins; among tied classes the lowest id wins.
//!
//! With an odd number of trees and exactly two classes a tie is impossible:
//! the two counts sum to an odd number, so they can never be equal.

use enose_core::{ClassId, Classifier, Component, EnoseError, EnoseResult, FeatureVector, ModelKind};

use crate::tree::DecisionTree;

/// Number of trees in a forest artifact
pub const FOREST_SIZE: usize = 5;

/// Majority-vote ensemble of decision trees
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Requires exactly [`FOREST_SIZE`] trees, all built for `n_classes`
    pub fn new(trees: Vec<DecisionTree>, n_classes: usize) -> EnoseResult<Self> {
        if trees.len() != FOREST_SIZE {
            return Err(EnoseError::malformed(format!(
                "random forest needs {FOREST_SIZE} trees, got {}",
                trees.len()
            )));
        }

        if let Some((i, tree)) = trees
            .iter()
            .enumerate()
            .find(|(_, t)| t.n_classes() != n_classes)
        {
            return Err(EnoseError::malformed(format!(
                "tree {i} has {} classes, forest has {n_classes}",
                tree.n_classes()
            )));
        }

        Ok(Self { trees, n_classes })
    }

    /// Vote count per class id (length `n_classes`)
    pub fn votes(&self, features: &FeatureVector) -> Vec<u32> {
        let mut votes = vec![0u32; self.n_classes];
        for tree in &self.trees {
            votes[tree.predict(features).index()] += 1;
        }
        votes
    }

    pub fn predict(&self, features: &FeatureVector) -> ClassId {
        majority_vote(&self.votes(features))
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// Class with the most votes; lowest id among ties.
///
/// Scans every class id from 0 upward and keeps the first one strictly
/// exceeding the running maximum. An all-zero tally yields class 0.
pub fn majority_vote(votes: &[u32]) -> ClassId {
    let (winner, _) = votes
        .iter()
        .enumerate()
        .fold((0, 0), |(winner, best), (class, &count)| {
            if count > best {
                (class, count)
            } else {
                (winner, best)
            }
        });
    ClassId(winner)
}

impl Component for RandomForest {
    fn name(&self) -> &str {
        "RandomForest"
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &FeatureVector) -> ClassId {
        RandomForest::predict(self, features)
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNode;
    use proptest::prelude::*;

    fn constant(class: usize, n_classes: usize) -> DecisionTree {
        DecisionTree::new(vec![TreeNode::leaf(class)], n_classes).unwrap()
    }

    fn stump(threshold: f32) -> DecisionTree {
        DecisionTree::new(
            vec![
                TreeNode::split(0, threshold, 1, 2),
                TreeNode::leaf(0),
                TreeNode::leaf(1),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_three_to_two_vote() {
        // thresholds >= 0.3 vote 0 (tie at 0.3 goes left), the others vote 1
        let forest = RandomForest::new(
            vec![stump(0.1), stump(0.2), stump(0.3), stump(0.4), stump(0.5)],
            2,
        )
        .unwrap();

        let x = FeatureVector::new([0.0; 9]).with_feature(0, 0.3);
        assert_eq!(forest.votes(&x), vec![3, 2]);
        assert_eq!(forest.predict(&x), ClassId(0));

        let y = x.with_feature(0, 0.45);
        assert_eq!(forest.votes(&y), vec![1, 4]);
        assert_eq!(forest.predict(&y), ClassId(1));
    }

    #[test]
    fn test_three_class_tie_goes_to_lowest_id() {
        let forest = RandomForest::new(
            vec![
                constant(2, 3),
                constant(0, 3),
                constant(1, 3),
                constant(2, 3),
                constant(0, 3),
            ],
            3,
        )
        .unwrap();

        let x = FeatureVector::new([0.0; 9]);
        assert_eq!(forest.votes(&x), vec![2, 1, 2]);
        assert_eq!(forest.predict(&x), ClassId(0));
    }

    #[test]
    fn test_majority_vote_tally() {
        assert_eq!(majority_vote(&[3, 2]), ClassId(0));
        assert_eq!(majority_vote(&[2, 3]), ClassId(1));
        assert_eq!(majority_vote(&[1, 2, 2]), ClassId(1));
        assert_eq!(majority_vote(&[0, 0, 5]), ClassId(2));
        assert_eq!(majority_vote(&[0, 0]), ClassId(0));
        assert_eq!(majority_vote(&[]), ClassId(0));
    }

    #[test]
    fn test_no_tie_with_odd_trees_and_two_classes() {
        for pattern in 0u32..(1 << FOREST_SIZE) {
            let ones = pattern.count_ones();
            let votes = [FOREST_SIZE as u32 - ones, ones];
            assert_ne!(votes[0], votes[1]);

            let expected = if ones > FOREST_SIZE as u32 / 2 { 1 } else { 0 };
            assert_eq!(majority_vote(&votes), ClassId(expected));
        }
    }

    #[test]
    fn test_rejects_wrong_tree_count() {
        let four = vec![constant(0, 2); 4];
        assert!(RandomForest::new(four, 2).is_err());

        let six = vec![constant(0, 2); 6];
        assert!(RandomForest::new(six, 2).is_err());
    }

    #[test]
    fn test_rejects_class_count_mismatch() {
        let mut trees = vec![constant(0, 2); 4];
        trees.push(constant(0, 3));
        let err = RandomForest::new(trees, 2).unwrap_err();
        assert!(err.to_string().contains("tree 4"));
    }

    proptest! {
        #[test]
        fn prop_majority_is_max_and_lowest(votes in prop::collection::vec(0u32..6, 1..6)) {
            let winner = majority_vote(&votes).index();
            let max = *votes.iter().max().unwrap();

            prop_assert_eq!(votes[winner], max);
            prop_assert!(votes[..winner].iter().all(|&v| v < max));
        }
    }
}
