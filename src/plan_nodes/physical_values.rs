// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::*;

/// The physical plan of `VALUES`.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalValues {
    logical: LogicalValues,
}

impl PhysicalValues {
    pub fn new(logical: LogicalValues) -> Self {
        Self { logical }
    }

    /// Get a reference to the physical values's logical.
    pub fn logical(&self) -> &LogicalValues {
        &self.logical
    }
}

impl PlanTreeNodeLeaf for PhysicalValues {}
impl_plan_tree_node_for_leaf!(PhysicalValues);

impl PlanNode for PhysicalValues {
    fn traits(&self) -> TraitSet {
        TraitSet::physical()
    }

    fn out_columns(&self, input_columns: &[usize]) -> usize {
        self.logical.out_columns(input_columns)
    }

    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        self.logical.estimated_cardinality(input_rows)
    }
}

impl fmt::Display for PhysicalValues {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PhysicalValues: {} columns, rows [{}]",
            self.logical.column_count(),
            self.logical
                .values()
                .iter()
                .map(|row| format!("({})", row.iter().join(", ")))
                .join(", ")
        )
    }
}
