// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::plan_nodes::{IntoPlanRef, LogicalUnion, LogicalValues, PlanNodeType};

/// Removes empty `VALUES` inputs from a union.
///
/// The empty input may be at any position, so the operand is unordered.
pub struct UnionPruneEmptyRule {
    operand: Operand,
}

impl UnionPruneEmptyRule {
    pub fn new() -> Self {
        let empty = Operand::of(PlanNodeType::LogicalValues)
            .with_predicate(|node| node.as_logical_values().map_or(false, |v| v.is_empty()));
        Self {
            operand: Operand::of(PlanNodeType::LogicalUnion).unordered(vec![empty]),
        }
    }
}

impl Default for UnionPruneEmptyRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for UnionPruneEmptyRule {
    fn description(&self) -> &str {
        "UnionPruneEmptyRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let union = match call.node(0).as_logical_union() {
            Some(union) => union,
            None => return,
        };
        let current = match call.children(0) {
            Some(children) => children,
            None => return,
        };
        let kept = union
            .inputs()
            .iter()
            .zip(current)
            .filter(|(_, node)| !node.as_logical_values().map_or(false, |v| v.is_empty()))
            .map(|(input, _)| input.clone())
            .collect::<Vec<_>>();

        let plan = match kept.len() {
            0 => LogicalValues::empty(call.mq().column_count(call.node(0))).into_plan_ref(),
            1 if union.all() => kept[0].clone(),
            _ => LogicalUnion::new(kept, union.all()).into_plan_ref(),
        };
        call.transform_to(plan);
    }
}
