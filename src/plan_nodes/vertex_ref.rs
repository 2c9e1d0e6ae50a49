// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;
use crate::heuristic::VertexId;

/// A reference to a vertex of the plan graph.
///
/// Once a plan is registered in the [`HepPlanner`](crate::heuristic::HepPlanner), every input of
/// a node in the graph is a `VertexRef`. Its digest is the vertex identity, so the digest of a
/// parent stays valid when the vertex it points to is given a new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct VertexRef {
    id: VertexId,
}

impl VertexRef {
    pub fn new(id: VertexId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> VertexId {
        self.id
    }
}

impl PlanTreeNodeLeaf for VertexRef {}
impl_plan_tree_node_for_leaf!(VertexRef);

impl PlanNode for VertexRef {
    fn traits(&self) -> TraitSet {
        TraitSet::default()
    }

    fn digest(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VertexRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Vertex#{}", self.id)
    }
}
