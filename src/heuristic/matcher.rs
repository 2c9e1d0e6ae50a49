// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;

use super::PlanGraph;
use crate::plan_nodes::PlanRef;
use crate::rules::{ChildPolicy, Operand};

/// Nodes bound by a successful match.
#[derive(Default)]
pub(super) struct Bindings {
    /// Matched nodes, in pre-order of the operand tree.
    pub nodes: Vec<PlanRef>,
    /// Current nodes of all inputs of each node matched by an unordered operand, keyed by its
    /// position in `nodes`.
    pub children: HashMap<usize, Vec<PlanRef>>,
}

impl Bindings {
    /// Drops everything bound at or after position `len`.
    fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        self.children.retain(|ordinal, _| *ordinal < len);
    }
}

/// Matches `operand` against `node`, whose inputs are vertex references into `graph`.
///
/// On failure `bindings` is left as it was.
pub(super) fn match_operands(
    graph: &PlanGraph,
    operand: &Operand,
    node: &PlanRef,
    bindings: &mut Bindings,
) -> bool {
    let mark = bindings.nodes.len();
    let matched = match_inner(graph, operand, node, bindings);
    if !matched {
        bindings.truncate(mark);
    }
    matched
}

fn match_inner(
    graph: &PlanGraph,
    operand: &Operand,
    node: &PlanRef,
    bindings: &mut Bindings,
) -> bool {
    if !operand.matches_node(node) {
        return false;
    }
    let ordinal = bindings.nodes.len();
    bindings.nodes.push(node.clone());

    let inputs = node
        .children()
        .iter()
        .map(|input| graph.resolve(input))
        .collect::<Vec<_>>();
    match operand.child_policy() {
        ChildPolicy::Any => true,
        ChildPolicy::Leaf => true,
        ChildPolicy::Unordered(child_operands) => {
            for child_operand in child_operands {
                let found = inputs
                    .iter()
                    .any(|input| match_operands(graph, child_operand, input, bindings));
                if !found {
                    return false;
                }
            }
            bindings.children.insert(ordinal, inputs);
            true
        }
        ChildPolicy::Ordered(child_operands) => {
            if inputs.len() < child_operands.len() {
                return false;
            }
            inputs
                .iter()
                .zip(child_operands)
                .all(|(input, child_operand)| match_inner(graph, child_operand, input, bindings))
        }
    }
}
