// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};

use super::MatchOrder;

/// Configurations of [`HepPlanner`](super::HepPlanner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HepConfig {
    /// Never share a vertex between two parents, so the graph stays a tree.
    pub no_dag: bool,
    /// Check the graph for cycles and stale digests after every transformation.
    pub check_consistency: bool,
    /// The match order a program starts with.
    pub default_match_order: MatchOrder,
    /// The match limit a program starts with.
    pub default_match_limit: usize,
}

impl Default for HepConfig {
    fn default() -> Self {
        Self {
            no_dag: false,
            check_consistency: false,
            default_match_order: MatchOrder::Arbitrary,
            default_match_limit: super::MATCH_UNTIL_FIXPOINT,
        }
    }
}
