// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Cost and cardinality estimation.
//!
//! The planner never computes a cost by itself. It asks a [`CostModel`] through a
//! [`MetadataQuery`], and only when a rule proposes more than one replacement.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::heuristic::PlanGraph;
use crate::plan_nodes::PlanRef;

/// The estimated cost of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Cost {
    rows: f64,
    cpu: f64,
    io: f64,
}

impl Cost {
    pub fn new(rows: f64, cpu: f64, io: f64) -> Self {
        Self { rows, cpu, io }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> f64 {
        self.rows
    }

    pub fn cpu(&self) -> f64 {
        self.cpu
    }

    pub fn io(&self) -> f64 {
        self.io
    }

    /// The scalar used for comparison.
    pub fn total(&self) -> f64 {
        self.cpu + self.io
    }

    /// Whether `self` is strictly cheaper than `other`.
    pub fn is_lt(&self, other: &Cost) -> bool {
        self.total() < other.total()
    }

    #[must_use]
    pub fn plus(&self, other: &Cost) -> Cost {
        Cost::new(
            self.rows + other.rows,
            self.cpu + other.cpu,
            self.io + other.io,
        )
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{} rows, {} cpu, {} io}}",
            self.rows, self.cpu, self.io
        )
    }
}

/// Estimates the cost of a single plan node.
pub trait CostModel: Send + Sync {
    /// Cost of `plan` alone, excluding its inputs.
    fn non_cumulative_cost(&self, plan: &PlanRef, mq: &MetadataQuery<'_>) -> Cost;

    /// Estimated number of output rows of `plan`.
    fn rows(&self, plan: &PlanRef, mq: &MetadataQuery<'_>) -> f64;
}

/// Uses the estimates every plan node provides about itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCostModel;

impl CostModel for DefaultCostModel {
    fn non_cumulative_cost(&self, plan: &PlanRef, mq: &MetadataQuery<'_>) -> Cost {
        let input_rows = plan
            .children()
            .iter()
            .map(|child| mq.rows(child))
            .collect::<Vec<_>>();
        let rows = plan.estimated_cardinality(&input_rows);
        plan.self_cost(rows, &input_rows)
    }

    fn rows(&self, plan: &PlanRef, mq: &MetadataQuery<'_>) -> f64 {
        let input_rows = plan
            .children()
            .iter()
            .map(|child| mq.rows(child))
            .collect::<Vec<_>>();
        plan.estimated_cardinality(&input_rows)
    }
}

pub type CostModelRef = Arc<dyn CostModel>;

/// Answers metadata questions about plans whose inputs may be vertices of a plan graph.
///
/// A [`VertexRef`](crate::plan_nodes::VertexRef) input is answered by the node its vertex
/// currently holds.
pub struct MetadataQuery<'a> {
    graph: &'a PlanGraph,
    cost_model: &'a dyn CostModel,
}

impl<'a> MetadataQuery<'a> {
    pub fn new(graph: &'a PlanGraph, cost_model: &'a dyn CostModel) -> Self {
        Self { graph, cost_model }
    }

    /// Replaces a vertex reference by the node the vertex currently holds.
    pub fn resolve(&self, plan: &PlanRef) -> PlanRef {
        self.graph.resolve(plan)
    }

    pub fn rows(&self, plan: &PlanRef) -> f64 {
        self.cost_model.rows(&self.resolve(plan), self)
    }

    pub fn non_cumulative_cost(&self, plan: &PlanRef) -> Cost {
        self.cost_model.non_cumulative_cost(&self.resolve(plan), self)
    }

    /// Cost of `plan` and all of its inputs.
    pub fn cumulative_cost(&self, plan: &PlanRef) -> Cost {
        let plan = self.resolve(plan);
        plan.children()
            .iter()
            .fold(self.non_cumulative_cost(&plan), |cost, child| {
                cost.plus(&self.cumulative_cost(child))
            })
    }

    /// Number of output columns of `plan`.
    pub fn column_count(&self, plan: &PlanRef) -> usize {
        let plan = self.resolve(plan);
        let input_columns = plan
            .children()
            .iter()
            .map(|child| self.column_count(child))
            .collect::<Vec<_>>();
        plan.out_columns(&input_columns)
    }
}
