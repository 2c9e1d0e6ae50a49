// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::VertexId;
use crate::plan_nodes::PlanRef;

/// Observes what the planner does. Events never change the outcome of planning.
///
/// All methods do nothing by default.
pub trait PlannerListener: Send + Sync {
    /// A node was copied because its inputs were replaced by vertex references.
    fn on_copy(&self, _old: &PlanRef, _new: &PlanRef) {}

    /// A node left the graph, either replaced or collected as garbage.
    fn on_discard(&self, _node: &PlanRef) {}

    /// A node is part of the final plan.
    fn on_chosen(&self, _node: &PlanRef) {}

    /// `node` became the current node of `vertex`.
    fn on_equivalence(&self, _node: &PlanRef, _vertex: VertexId) {}

    /// `rule` replaces the matched node by `node`. Called once before and once after the
    /// graph is changed.
    fn on_transformation(&self, _rule: &str, _node: &PlanRef, _before: bool) {}
}
