// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::*;

/// The logical plan of sequential scan operation.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalTableScan {
    table_name: String,
    column_names: Vec<String>,
    row_count: usize,
}

impl LogicalTableScan {
    pub fn new(table_name: impl Into<String>, column_names: Vec<String>, row_count: usize) -> Self {
        Self {
            table_name: table_name.into(),
            column_names,
            row_count,
        }
    }

    /// Get a reference to the logical table scan's table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Get a reference to the logical table scan's column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of rows in the table, as known by the catalog.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

impl PlanTreeNodeLeaf for LogicalTableScan {}
impl_plan_tree_node_for_leaf!(LogicalTableScan);

impl PlanNode for LogicalTableScan {
    fn out_columns(&self, _input_columns: &[usize]) -> usize {
        self.column_names.len()
    }

    fn estimated_cardinality(&self, _input_rows: &[f64]) -> f64 {
        self.row_count as f64
    }

    fn self_cost(&self, rows: f64, _input_rows: &[f64]) -> Cost {
        Cost::new(rows, rows, rows)
    }
}

impl fmt::Display for LogicalTableScan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "LogicalTableScan: table {}, columns [{}]",
            self.table_name,
            self.column_names.iter().join(", "),
        )
    }
}
