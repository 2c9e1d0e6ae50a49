// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Rewrite rules.
//!
//! A rule describes the plan shape it is interested in with an [`Operand`] tree. When the
//! planner finds a match it builds a [`RuleCall`] holding the matched nodes and hands it to
//! [`Rule::on_match`], which proposes equivalent plans through [`RuleCall::transform_to`].
//!
//! The nodes a rule sees come from the plan graph: their inputs are
//! [`VertexRef`](crate::plan_nodes::VertexRef)s. A rule reuses an input by cloning that
//! reference into the plan it proposes.

use std::collections::HashMap;
use std::sync::Arc;

use downcast_rs::{impl_downcast, Downcast};

use crate::cost::MetadataQuery;
use crate::plan_nodes::PlanRef;
use crate::traits::PlanTrait;

mod converter;
mod filter_merge_rule;
mod filter_project_transpose_rule;
mod join_commute_rule;
mod limit_merge_rule;
mod operand;
mod projection_remove_rule;
mod union_prune_empty_rule;

pub use converter::*;
pub use filter_merge_rule::*;
pub use filter_project_transpose_rule::*;
pub use join_commute_rule::*;
pub use limit_merge_rule::*;
pub use operand::*;
pub use projection_remove_rule::*;
pub use union_prune_empty_rule::*;

/// How the planner treats a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Normal,
    /// Changes one trait of a node and nothing else.
    ///
    /// A guaranteed converter always succeeds, so it is only fired where some consumer
    /// asks for `out_trait`.
    Converter {
        out_trait: PlanTrait,
        guaranteed: bool,
    },
    /// Only fired on nodes shared by two or more consumers.
    CommonSubExpr,
}

impl RuleKind {
    pub fn is_converter(&self) -> bool {
        matches!(self, RuleKind::Converter { .. })
    }

    pub fn out_trait(&self) -> Option<&PlanTrait> {
        match self {
            RuleKind::Converter { out_trait, .. } => Some(out_trait),
            _ => None,
        }
    }
}

pub trait Rule: Downcast + Send + Sync {
    /// A name unique among the rules registered in one planner.
    fn description(&self) -> &str;

    fn operand(&self) -> &Operand;

    /// Additional condition checked after the operands matched.
    fn matches(&self, _call: &RuleCall<'_>) -> bool {
        true
    }

    fn on_match(&self, call: &mut RuleCall<'_>);

    fn kind(&self) -> RuleKind {
        RuleKind::Normal
    }
}
impl_downcast!(Rule);

pub type RuleRef = Arc<dyn Rule>;

/// One successful match of a rule.
pub struct RuleCall<'a> {
    /// Matched nodes, in pre-order of the operand tree.
    nodes: Vec<PlanRef>,
    /// All inputs of nodes matched by an unordered operand, keyed by position in `nodes`.
    children: HashMap<usize, Vec<PlanRef>>,
    parents: Option<Vec<PlanRef>>,
    results: Vec<PlanRef>,
    mq: MetadataQuery<'a>,
}

impl<'a> RuleCall<'a> {
    pub fn new(
        nodes: Vec<PlanRef>,
        children: HashMap<usize, Vec<PlanRef>>,
        parents: Option<Vec<PlanRef>>,
        mq: MetadataQuery<'a>,
    ) -> Self {
        Self {
            nodes,
            children,
            parents,
            results: vec![],
            mq,
        }
    }

    /// The `i`-th matched node. Node 0 is the root of the match.
    pub fn node(&self, i: usize) -> &PlanRef {
        &self.nodes[i]
    }

    pub fn nodes(&self) -> &[PlanRef] {
        &self.nodes
    }

    /// The current nodes of all inputs of the `i`-th matched node, if it was matched by an
    /// unordered operand.
    pub fn children(&self, i: usize) -> Option<&[PlanRef]> {
        self.children.get(&i).map(|c| c.as_slice())
    }

    /// Consumers of the matched node, for common sub-expression rules.
    pub fn parents(&self) -> Option<&[PlanRef]> {
        self.parents.as_deref()
    }

    pub fn mq(&self) -> &MetadataQuery<'a> {
        &self.mq
    }

    /// Proposes a plan equivalent to node 0.
    pub fn transform_to(&mut self, plan: PlanRef) {
        self.results.push(plan);
    }

    pub fn results(&self) -> &[PlanRef] {
        &self.results
    }

    pub fn into_results(self) -> Vec<PlanRef> {
        self.results
    }
}
