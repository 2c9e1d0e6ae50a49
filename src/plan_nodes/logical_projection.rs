// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::*;
use crate::expr::ScalarExpr;

/// The logical plan of project operation.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalProjection {
    project_expressions: Vec<ScalarExpr>,
    child: PlanRef,
}

impl LogicalProjection {
    pub fn new(project_expressions: Vec<ScalarExpr>, child: PlanRef) -> Self {
        Self {
            project_expressions,
            child,
        }
    }

    /// Get a reference to the logical projection's project expressions.
    pub fn project_expressions(&self) -> &[ScalarExpr] {
        self.project_expressions.as_ref()
    }

    /// Whether the projection outputs exactly its first `input_columns` input columns in order.
    pub fn is_identity(&self, input_columns: usize) -> bool {
        self.project_expressions.len() == input_columns
            && self
                .project_expressions
                .iter()
                .enumerate()
                .all(|(i, expr)| *expr == ScalarExpr::InputRef(i))
    }
}

impl PlanTreeNodeUnary for LogicalProjection {
    fn child(&self) -> PlanRef {
        self.child.clone()
    }
    #[must_use]
    fn clone_with_child(&self, child: PlanRef) -> Self {
        Self::new(self.project_expressions.clone(), child)
    }
}
impl_plan_tree_node_for_unary!(LogicalProjection);

impl PlanNode for LogicalProjection {
    fn out_columns(&self, _input_columns: &[usize]) -> usize {
        self.project_expressions.len()
    }
}

impl fmt::Display for LogicalProjection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "LogicalProjection: exprs [{}]",
            self.project_expressions.iter().join(", ")
        )
    }
}
