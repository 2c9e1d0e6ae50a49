// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::expr::{map_input_refs, ScalarExpr};
use crate::plan_nodes::{
    IntoPlanRef, LogicalJoin, LogicalProjection, PlanNodeType, PlanTreeNodeBinary,
};

/// Swaps the inputs of a join, and restores the column order with a projection on top.
///
/// ```text
/// Join(A, B)    =>    Projection(B.*, A.* reordered as A.*, B.*)
///                       Join(B, A)
/// ```
pub struct JoinCommuteRule {
    operand: Operand,
}

impl JoinCommuteRule {
    pub fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalJoin),
        }
    }
}

impl Default for JoinCommuteRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for JoinCommuteRule {
    fn description(&self) -> &str {
        "JoinCommuteRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let join = match call.node(0).as_logical_join() {
            Some(join) => join,
            None => return,
        };
        let left_columns = call.mq().column_count(&join.left());
        let right_columns = call.mq().column_count(&join.right());

        let mut condition = join.condition().clone();
        map_input_refs(&mut condition, &|i| {
            if i < left_columns {
                i + right_columns
            } else {
                i - left_columns
            }
        });
        let swapped = LogicalJoin::new(
            join.right(),
            join.left(),
            join.join_op().swap(),
            condition,
        );

        let exprs = (0..left_columns)
            .map(|i| ScalarExpr::input_ref(right_columns + i))
            .chain((0..right_columns).map(ScalarExpr::input_ref))
            .collect();
        let proj = LogicalProjection::new(exprs, swapped.into_plan_ref());
        call.transform_to(proj.into_plan_ref());
    }
}
