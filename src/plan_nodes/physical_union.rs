// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;
use smallvec::SmallVec;

use super::*;

/// The physical plan of `UNION [ALL]`.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalUnion {
    logical: LogicalUnion,
}

impl PhysicalUnion {
    pub fn new(logical: LogicalUnion) -> Self {
        Self { logical }
    }

    /// Get a reference to the physical union's logical.
    pub fn logical(&self) -> &LogicalUnion {
        &self.logical
    }
}

impl PlanTreeNode for PhysicalUnion {
    fn children(&self) -> SmallVec<[PlanRef; 2]> {
        self.logical.children()
    }

    fn clone_with_children(&self, children: &[PlanRef]) -> PlanRef {
        assert_eq!(children.len(), self.logical.inputs().len());
        Self::new(LogicalUnion::new(children.to_vec(), self.logical.all())).into_plan_ref()
    }
}

impl PlanNode for PhysicalUnion {
    fn traits(&self) -> TraitSet {
        TraitSet::physical()
    }

    fn estimated_cardinality(&self, input_rows: &[f64]) -> f64 {
        self.logical.estimated_cardinality(input_rows)
    }
}

impl fmt::Display for PhysicalUnion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PhysicalUnion: all {}", self.logical.all())
    }
}
