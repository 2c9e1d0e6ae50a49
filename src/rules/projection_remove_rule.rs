// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::plan_nodes::{PlanNodeType, PlanTreeNodeUnary};

/// Removes a projection that outputs its input unchanged.
pub struct ProjectionRemoveRule {
    operand: Operand,
}

impl ProjectionRemoveRule {
    pub fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalProjection),
        }
    }
}

impl Default for ProjectionRemoveRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ProjectionRemoveRule {
    fn description(&self) -> &str {
        "ProjectionRemoveRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn matches(&self, call: &RuleCall<'_>) -> bool {
        call.node(0)
            .as_logical_projection()
            .map_or(false, |proj| {
                proj.is_identity(call.mq().column_count(&proj.child()))
            })
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        if let Some(proj) = call.node(0).as_logical_projection() {
            let child = proj.child();
            call.transform_to(child);
        }
    }
}
