// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use super::*;

/// The logical plan of `UNION [ALL]` over any number of inputs.
#[derive(Debug, Clone, Serialize)]
pub struct LogicalUnion {
    inputs: Vec<PlanRef>,
    all: bool,
}

impl LogicalUnion {
    pub fn new(inputs: Vec<PlanRef>, all: bool) -> Self {
        Self { inputs, all }
    }

    pub fn inputs(&self) -> &[PlanRef] {
        &self.inputs
    }

    /// Whether duplicates are kept.
    pub fn all(&self) -> bool {
        self.all
    }
}

impl PlanTreeNode for LogicalUnion {
    fn children(&self) -> SmallVec<[PlanRef; 2]> {
        self.inputs.iter().cloned().collect()
    }

    fn clone_with_children(&self, children: &[PlanRef]) -> PlanRef {
        assert_eq!(children.len(), self.inputs.len());
        Self::new(children.to_vec(), self.all).into_plan_ref()
    }
}

impl PlanNode for LogicalUnion {
    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        input_rows.iter().sum()
    }
}

impl fmt::Display for LogicalUnion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LogicalUnion: all {}", self.all)
    }
}
