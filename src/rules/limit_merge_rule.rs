// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::plan_nodes::{IntoPlanRef, LogicalLimit, PlanNodeType, PlanTreeNodeUnary};

/// Merges two adjacent limits.
///
/// The outer limit skips `o2` rows of the inner limit's output and keeps at most `l2`, so
/// the result skips `o1 + o2` rows and keeps `min(l2, l1 - o2)`.
pub struct LimitMergeRule {
    operand: Operand,
}

impl LimitMergeRule {
    pub fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalLimit)
                .children(vec![Operand::of(PlanNodeType::LogicalLimit)]),
        }
    }
}

impl Default for LimitMergeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for LimitMergeRule {
    fn description(&self) -> &str {
        "LimitMergeRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let (outer, inner) = match (
            call.node(0).as_logical_limit(),
            call.node(1).as_logical_limit(),
        ) {
            (Some(outer), Some(inner)) => (outer, inner),
            _ => return,
        };
        let offset = inner.offset() + outer.offset();
        let limit = outer.limit().min(inner.limit().saturating_sub(outer.offset()));
        let merged = LogicalLimit::new(offset, limit, inner.child());
        call.transform_to(merged.into_plan_ref());
    }
}
