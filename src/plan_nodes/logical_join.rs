// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;
use crate::expr::{conjunctions, BinaryOperator, ScalarExpr};

/// Selectivity assumed for a join condition we know nothing about.
const DEFAULT_JOIN_SELECTIVITY: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum JoinOperator {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

impl JoinOperator {
    /// The operator after exchanging the inputs.
    pub fn swap(self) -> Self {
        match self {
            JoinOperator::LeftOuter => JoinOperator::RightOuter,
            JoinOperator::RightOuter => JoinOperator::LeftOuter,
            op => op,
        }
    }
}

/// The logical plan of join, it only records join tables and operators.
///
/// The output columns are the columns of the left input followed by the columns of the right
/// input.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalJoin {
    left_plan: PlanRef,
    right_plan: PlanRef,
    join_op: JoinOperator,
    condition: ScalarExpr,
}

impl LogicalJoin {
    pub fn new(
        left_plan: PlanRef,
        right_plan: PlanRef,
        join_op: JoinOperator,
        condition: ScalarExpr,
    ) -> Self {
        Self {
            left_plan,
            right_plan,
            join_op,
            condition,
        }
    }

    /// Get a reference to the logical join's join op.
    pub fn join_op(&self) -> JoinOperator {
        self.join_op
    }

    /// Get a reference to the logical join's condition.
    pub fn condition(&self) -> &ScalarExpr {
        &self.condition
    }

    /// Whether the condition contains a `left.x = right.y` conjunct, given the number of
    /// output columns of the left input.
    pub fn has_equi_condition(&self, left_columns: usize) -> bool {
        conjunctions(self.condition.clone()).iter().any(|conj| match conj {
            ScalarExpr::BinaryOp {
                op: BinaryOperator::Eq,
                left,
                right,
            } => matches!(
                (left.as_ref(), right.as_ref()),
                (ScalarExpr::InputRef(l), ScalarExpr::InputRef(r))
                    if (*l < left_columns) != (*r < left_columns)
            ),
            _ => false,
        })
    }
}

impl PlanTreeNodeBinary for LogicalJoin {
    fn left(&self) -> PlanRef {
        self.left_plan.clone()
    }
    fn right(&self) -> PlanRef {
        self.right_plan.clone()
    }

    #[must_use]
    fn clone_with_left_right(&self, left: PlanRef, right: PlanRef) -> Self {
        Self::new(left, right, self.join_op(), self.condition.clone())
    }
}
impl_plan_tree_node_for_binary!(LogicalJoin);

impl PlanNode for LogicalJoin {
    fn out_columns(&self, input_columns: &[usize]) -> usize {
        input_columns.iter().sum()
    }

    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        let (left, right) = match input_rows {
            [left, right, ..] => (*left, *right),
            _ => return 1.0,
        };
        let inner = if self.condition.is_true() {
            left * right
        } else {
            left * right * DEFAULT_JOIN_SELECTIVITY
        };
        match self.join_op {
            JoinOperator::Inner => inner,
            JoinOperator::LeftOuter => inner.max(left),
            JoinOperator::RightOuter => inner.max(right),
            JoinOperator::FullOuter => inner.max(left + right),
        }
    }
}

impl fmt::Display for LogicalJoin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "LogicalJoin: op {:?}, predicate {}",
            self.join_op, self.condition
        )
    }
}
