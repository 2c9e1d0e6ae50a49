// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::plan_nodes::{PlanNodeType, PlanRef};
use crate::traits::PlanTrait;

pub type OperandPredicate = Arc<dyn Fn(&PlanRef) -> bool + Send + Sync>;

/// How the inputs of a matched node are matched.
#[derive(Clone)]
pub enum ChildPolicy {
    /// Inputs are not inspected.
    Any,
    /// No child operands. The inputs are not required to be absent.
    Leaf,
    /// The first inputs are paired with the child operands by position.
    Ordered(Vec<Operand>),
    /// Each child operand must match some input. All inputs are recorded in the rule call.
    Unordered(Vec<Operand>),
}

/// A node of the pattern a rule is looking for.
#[derive(Clone)]
pub struct Operand {
    /// `None` matches every node type.
    node_types: Option<SmallVec<[PlanNodeType; 2]>>,
    required_trait: Option<PlanTrait>,
    predicate: Option<OperandPredicate>,
    children: ChildPolicy,
}

impl Operand {
    /// Matches nodes of `node_type`, whatever their inputs.
    pub fn of(node_type: PlanNodeType) -> Self {
        Self::of_types([node_type])
    }

    /// Matches nodes of any of `node_types`.
    pub fn of_types(node_types: impl IntoIterator<Item = PlanNodeType>) -> Self {
        Self {
            node_types: Some(node_types.into_iter().collect()),
            required_trait: None,
            predicate: None,
            children: ChildPolicy::Any,
        }
    }

    /// Matches every node.
    pub fn any() -> Self {
        Self {
            node_types: None,
            required_trait: None,
            predicate: None,
            children: ChildPolicy::Any,
        }
    }

    #[must_use]
    pub fn with_trait(mut self, required_trait: impl Into<PlanTrait>) -> Self {
        self.required_trait = Some(required_trait.into());
        self
    }

    #[must_use]
    pub fn with_predicate(
        mut self,
        predicate: impl Fn(&PlanRef) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn leaf(mut self) -> Self {
        self.children = ChildPolicy::Leaf;
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<Operand>) -> Self {
        self.children = ChildPolicy::Ordered(children);
        self
    }

    #[must_use]
    pub fn unordered(mut self, children: Vec<Operand>) -> Self {
        self.children = ChildPolicy::Unordered(children);
        self
    }

    pub fn child_policy(&self) -> &ChildPolicy {
        &self.children
    }

    pub fn node_types(&self) -> Option<&[PlanNodeType]> {
        self.node_types.as_deref()
    }

    pub fn required_trait(&self) -> Option<&PlanTrait> {
        self.required_trait.as_ref()
    }

    /// Whether `node` itself satisfies this operand. Inputs are not looked at.
    pub fn matches_node(&self, node: &PlanRef) -> bool {
        if let Some(types) = &self.node_types {
            if !types.contains(&node.node_type()) {
                return false;
            }
        }
        if let Some(required) = &self.required_trait {
            if !node.traits().contains(required) {
                return false;
            }
        }
        self.predicate.as_ref().map_or(true, |pred| pred(node))
    }
}

impl fmt::Debug for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Operand");
        match &self.node_types {
            Some(types) => s.field("node_types", types),
            None => s.field("node_types", &"any"),
        };
        if let Some(required) = &self.required_trait {
            s.field("trait", required);
        }
        if self.predicate.is_some() {
            s.field("predicate", &"..");
        }
        match &self.children {
            ChildPolicy::Any => s.field("children", &"any"),
            ChildPolicy::Leaf => s.field("children", &"leaf"),
            ChildPolicy::Ordered(children) => s.field("ordered", children),
            ChildPolicy::Unordered(children) => s.field("unordered", children),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ScalarExpr;
    use crate::plan_nodes::*;
    use crate::traits::Convention;

    #[test]
    fn match_single_node() {
        let scan = LogicalTableScan::new("t", vec!["a".into()], 10).into_plan_ref();
        let filter = LogicalFilter::new(ScalarExpr::bool(true), scan.clone()).into_plan_ref();

        let op = Operand::of(PlanNodeType::LogicalFilter);
        assert!(op.matches_node(&filter));
        assert!(!op.matches_node(&scan));
        assert!(Operand::any().matches_node(&scan));

        let physical = Operand::any().with_trait(Convention::Physical);
        assert!(!physical.matches_node(&filter));

        let true_filter = Operand::of(PlanNodeType::LogicalFilter)
            .with_predicate(|node| node.as_logical_filter().map_or(false, |f| f.expr().is_true()));
        assert!(true_filter.matches_node(&filter));
    }
}
