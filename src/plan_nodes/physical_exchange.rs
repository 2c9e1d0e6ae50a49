// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;

use serde::Serialize;

use super::*;
use crate::traits::Distribution;

/// Redistributes the rows of a physical input.
///
/// This is a converter: it changes the distribution of its input and nothing else.
#[derive(Debug, Clone, Serialize)]
pub struct PhysicalExchange {
    distribution: Distribution,
    child: PlanRef,
}

impl PhysicalExchange {
    pub fn new(distribution: Distribution, child: PlanRef) -> Self {
        Self {
            distribution,
            child,
        }
    }

    /// Get a reference to the physical exchange's target distribution.
    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

impl PlanTreeNodeUnary for PhysicalExchange {
    fn child(&self) -> PlanRef {
        self.child.clone()
    }
    #[must_use]
    fn clone_with_child(&self, child: PlanRef) -> Self {
        Self::new(self.distribution.clone(), child)
    }
}
impl_plan_tree_node_for_unary!(PhysicalExchange);

impl PlanNode for PhysicalExchange {
    fn traits(&self) -> TraitSet {
        TraitSet::physical().replace(self.distribution.clone())
    }

    fn converted_trait(&self) -> Option<TraitKind> {
        Some(TraitKind::Distribution)
    }

    fn self_cost(&self, rows: f64, _input_rows: &[f64]) -> Cost {
        // every row crosses the network once
        Cost::new(rows, rows, rows)
    }
}

impl fmt::Display for PhysicalExchange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PhysicalExchange: distribution {}", self.distribution)
    }
}
