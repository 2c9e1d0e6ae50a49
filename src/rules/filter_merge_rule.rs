// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::expr::merge_conjunctions;
use crate::plan_nodes::{IntoPlanRef, LogicalFilter, PlanNodeType, PlanTreeNodeUnary};

/// Merges two adjacent filters into one.
///
/// ```text
/// Filter(a)            Filter(b and a)
///   Filter(b)    =>      X
///     X
/// ```
pub struct FilterMergeRule {
    operand: Operand,
}

impl FilterMergeRule {
    pub fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalFilter)
                .children(vec![Operand::of(PlanNodeType::LogicalFilter)]),
        }
    }
}

impl Default for FilterMergeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FilterMergeRule {
    fn description(&self) -> &str {
        "FilterMergeRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let (top, bottom) = match (
            call.node(0).as_logical_filter(),
            call.node(1).as_logical_filter(),
        ) {
            (Some(top), Some(bottom)) => (top, bottom),
            _ => return,
        };
        let expr = merge_conjunctions([bottom.expr().clone(), top.expr().clone()]);
        let merged = LogicalFilter::new(expr, bottom.child());
        call.transform_to(merged.into_plan_ref());
    }
}
