// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;

/// The physical plan of hash join. The right input is the build side.
///
/// Only valid for joins with at least one equality between the two inputs.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalHashJoin {
    logical: LogicalJoin,
}

impl PhysicalHashJoin {
    pub fn new(logical: LogicalJoin) -> Self {
        Self { logical }
    }

    /// Get a reference to the physical hash join's logical.
    pub fn logical(&self) -> &LogicalJoin {
        &self.logical
    }
}

impl PlanTreeNodeBinary for PhysicalHashJoin {
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
impl_plan_tree_node_for_binary!(PhysicalHashJoin);

impl PlanNode for PhysicalHashJoin {
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
        let probe = input_rows.first().copied().unwrap_or(0.0);
        let build = input_rows.get(1).copied().unwrap_or(0.0);
        // building the hash table costs twice as much as probing it
        Cost::new(rows, probe + 2.0 * build, 0.0)
    }
}

impl fmt::Display for PhysicalHashJoin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PhysicalHashJoin: op {:?}, predicate {}",
            self.logical().join_op(),
            self.logical().condition()
        )
    }
}
