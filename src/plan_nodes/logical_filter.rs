// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;
use crate::expr::ScalarExpr;

/// Selectivity assumed for a predicate we know nothing about.
const DEFAULT_SELECTIVITY: f64 = 0.5;

/// The logical plan of filter operation.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalFilter {
    expr: ScalarExpr,
    child: PlanRef,
}

impl LogicalFilter {
    pub fn new(expr: ScalarExpr, child: PlanRef) -> Self {
        Self { expr, child }
    }

    /// Get a reference to the logical filter's expr.
    pub fn expr(&self) -> &ScalarExpr {
        &self.expr
    }
}

impl PlanTreeNodeUnary for LogicalFilter {
    fn child(&self) -> PlanRef {
        self.child.clone()
    }
    #[must_use]
    fn clone_with_child(&self, child: PlanRef) -> Self {
        Self::new(self.expr().clone(), child)
    }
}

impl_plan_tree_node_for_unary!(LogicalFilter);
impl PlanNode for LogicalFilter {
    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        let input = input_rows.first().copied().unwrap_or(1.0);
        if self.expr.is_true() {
            input
        } else {
            input * DEFAULT_SELECTIVITY
        }
    }
}

impl fmt::Display for LogicalFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LogicalFilter: expr {}", self.expr)
    }
}
