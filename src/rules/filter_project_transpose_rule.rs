// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;
use crate::expr::substitute_input_refs;
use crate::plan_nodes::{
    IntoPlanRef, LogicalFilter, LogicalProjection, PlanNodeType, PlanTreeNodeUnary,
};

/// Pushes a filter below a projection, rewriting the predicate in terms of the projection's
/// input.
pub struct FilterProjectTransposeRule {
    operand: Operand,
}

impl FilterProjectTransposeRule {
    pub fn new() -> Self {
        Self {
            operand: Operand::of(PlanNodeType::LogicalFilter)
                .children(vec![Operand::of(PlanNodeType::LogicalProjection)]),
        }
    }
}

impl Default for FilterProjectTransposeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FilterProjectTransposeRule {
    fn description(&self) -> &str {
        "FilterProjectTransposeRule"
    }

    fn operand(&self) -> &Operand {
        &self.operand
    }

    fn on_match(&self, call: &mut RuleCall<'_>) {
        let (filter, proj) = match (
            call.node(0).as_logical_filter(),
            call.node(1).as_logical_projection(),
        ) {
            (Some(filter), Some(proj)) => (filter, proj),
            _ => return,
        };
        let pushed = match substitute_input_refs(filter.expr(), proj.project_expressions()) {
            Some(pushed) => pushed,
            None => return,
        };
        let new_filter = LogicalFilter::new(pushed, proj.child()).into_plan_ref();
        let new_proj = LogicalProjection::new(proj.project_expressions().to_vec(), new_filter);
        call.transform_to(new_proj.into_plan_ref());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::cost::DefaultCostModel;
    use crate::expr::{BinaryOperator, ScalarExpr};
    use crate::heuristic::PlanGraph;
    use crate::plan_nodes::*;

    fn fire(filter_expr: ScalarExpr) -> Vec<PlanRef> {
        let graph = PlanGraph::default();
        let scan = LogicalTableScan::new("t", vec!["a".into(), "b".into()], 10).into_plan_ref();
        let proj = LogicalProjection::new(vec![ScalarExpr::input_ref(1)], scan).into_plan_ref();
        let filter = LogicalFilter::new(filter_expr, proj.clone()).into_plan_ref();

        let mq = MetadataQuery::new(&graph, &DefaultCostModel);
        let mut call = RuleCall::new(vec![filter, proj], HashMap::new(), None, mq);
        FilterProjectTransposeRule::new().on_match(&mut call);
        call.into_results()
    }

    #[test]
    fn push_filter_below_projection() {
        let results = fire(ScalarExpr::binary(
            BinaryOperator::Gt,
            ScalarExpr::input_ref(0),
            ScalarExpr::int(1),
        ));
        assert_eq!(results.len(), 1);
        let proj = results[0].as_logical_projection().unwrap();
        assert_eq!(proj.project_expressions(), &[ScalarExpr::input_ref(1)]);
        let filter = proj.child();
        let filter = filter.as_logical_filter().unwrap();
        assert_eq!(filter.expr().to_string(), "($1 > 1)");
        assert_eq!(filter.child().node_type(), PlanNodeType::LogicalTableScan);
    }

    #[test]
    fn column_beyond_projection_is_left_alone() {
        let results = fire(ScalarExpr::binary(
            BinaryOperator::Gt,
            ScalarExpr::input_ref(3),
            ScalarExpr::int(1),
        ));
        assert!(results.is_empty());
    }
}
