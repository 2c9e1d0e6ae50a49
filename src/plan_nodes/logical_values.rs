// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::*;
use crate::expr::ScalarExpr;

/// The logical plan of `VALUES`.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalValues {
    column_count: usize,
    values: Vec<Vec<ScalarExpr>>,
}

impl LogicalValues {
    pub fn new(column_count: usize, values: Vec<Vec<ScalarExpr>>) -> Self {
        debug_assert!(values.iter().all(|row| row.len() == column_count));
        Self {
            column_count,
            values,
        }
    }

    /// A relation with `column_count` columns and no rows.
    pub fn empty(column_count: usize) -> Self {
        Self::new(column_count, vec![])
    }

    /// Get a reference to the logical values's values.
    pub fn values(&self) -> &[Vec<ScalarExpr>] {
        self.values.as_ref()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PlanTreeNodeLeaf for LogicalValues {}
impl_plan_tree_node_for_leaf!(LogicalValues);

impl PlanNode for LogicalValues {
    fn out_columns(&self, _input_columns: &[usize]) -> usize {
        self.column_count
    }

    fn estimated_cardinality(&self, _input_rows: &[f64]) -> f64 {
        self.values.len() as f64
    }
}

impl fmt::Display for LogicalValues {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "LogicalValues: {} columns, rows [{}]",
            self.column_count,
            self.values
                .iter()
                .map(|row| format!("({})", row.iter().join(", ")))
                .join(", ")
        )
    }
}
