// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;

/// The physical plan of nested loop join.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalNestedLoopJoin {
    logical: LogicalJoin,
}

impl PhysicalNestedLoopJoin {
    pub fn new(logical: LogicalJoin) -> Self {
        Self { logical }
    }

    /// Get a reference to the physical nested loop join's logical.
    pub fn logical(&self) -> &LogicalJoin {
        &self.logical
    }
}

impl PlanTreeNodeBinary for PhysicalNestedLoopJoin {
    fn left(&self) -> PlanRef {
        self.logical.left()
    }
    fn right(&self) -> PlanRef {
        self.logical.right()
    }

    #[must_use]
    fn clone_with_left_right(&self, left: PlanRef, right: PlanRef) -> Self {
        Self::new(self.logical.clone_with_left_right(left, right))
    }
}
impl_plan_tree_node_for_binary!(PhysicalNestedLoopJoin);

impl PlanNode for PhysicalNestedLoopJoin {
    fn traits(&self) -> TraitSet {
        TraitSet::physical()
    }

    fn out_columns(&self, input_columns: &[usize]) -> usize {
        self.logical.out_columns(input_columns)
    }

    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        self.logical.estimated_cardinality(input_rows)
    }

    fn self_cost(&self, rows: f64, input_rows: &[f64]) -> Cost {
        let cpu = input_rows.iter().product::<f64>();
        Cost::new(rows, cpu, 0.0)
    }
}

impl fmt::Display for PhysicalNestedLoopJoin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PhysicalNestedLoopJoin: op {:?}, predicate {}",
            self.logical().join_op(),
            self.logical().condition()
        )
    }
}
