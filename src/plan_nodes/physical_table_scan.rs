// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::*;

/// The physical plan of sequential scan operation.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalTableScan {
    logical: LogicalTableScan,
}

impl PhysicalTableScan {
    pub fn new(logical: LogicalTableScan) -> Self {
        Self { logical }
    }

    /// Get a reference to the physical table scan's logical.
    pub fn logical(&self) -> &LogicalTableScan {
        &self.logical
    }
}

impl PlanTreeNodeLeaf for PhysicalTableScan {}
impl_plan_tree_node_for_leaf!(PhysicalTableScan);

impl PlanNode for PhysicalTableScan {
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
        self.logical.self_cost(rows, input_rows)
    }
}

impl fmt::Display for PhysicalTableScan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "PhysicalTableScan: table {}, columns [{}]",
            self.logical.table_name(),
            self.logical.column_names().iter().join(", "),
        )
    }
}
