// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! The heuristic planner.
//!
//! [`HepPlanner`] applies rules in the order given by a [`HepProgram`], over a [`PlanGraph`]
//! in which structurally equal sub-plans share a vertex. Unlike a cost-based planner it keeps
//! a single plan: when a rule fires, the matched vertex is replaced by the rule's result.
//!
//! The planner works in three steps:
//!
//! 1. [`HepPlanner::set_root`] registers a plan tree. Every node becomes a vertex whose inputs
//!    are [`VertexRef`]s, and nodes with the same digest are merged.
//! 2. [`HepPlanner::find_best_exp`] runs the program. Each rule firing adds the new plan to
//!    the graph and rewires the parents of the matched vertex to it. Vertices no longer
//!    reachable from the root are collected from time to time.
//! 3. The final plan is rebuilt from the root by replacing each vertex reference with the
//!    plan of its vertex.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use thiserror::Error;
use tracing::{debug, trace};

use crate::cost::{CostModelRef, DefaultCostModel, MetadataQuery};
use crate::plan_nodes::{IntoPlanRef, PlanRef, VertexRef};
use crate::rules::RuleRef;
use crate::traits::TraitSet;

mod config;
mod driver;
mod graph;
mod listener;
mod matcher;
mod program;

pub use config::*;
pub use graph::*;
pub use listener::*;
pub use program::*;

/// The error type of the heuristic planner.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HepError {
    #[error("root is not set")]
    RootNotSet,
    #[error("rule not found: {0}")]
    RuleNotFound(String),
    #[error("group end without a group begin, or group not closed")]
    UnbalancedGroup,
    #[error("nested group")]
    NestedGroup,
    #[error("sub-program instruction inside a group")]
    GroupSubprogram,
    #[error("this match order must start from the root")]
    NotRoot,
    #[error("vertex {0} is not in the graph")]
    DanglingVertex(VertexId),
    #[error("cycle detected in plan graph: {0:?}")]
    CycleDetected(Vec<VertexId>),
    #[error("vertex {vertex} is not indexed under its digest {digest}")]
    InconsistentDigest { digest: String, vertex: VertexId },
}

/// A rule-based planner driven by a [`HepProgram`].
pub struct HepPlanner {
    program: Arc<HepProgram>,
    config: HepConfig,
    graph: PlanGraph,
    /// Registered rules, in registration order.
    rules: Vec<RuleRef>,
    cost_model: CostModelRef,
    listener: Option<Box<dyn PlannerListener>>,
    /// The traits the caller wants the final plan to have.
    requested_root_traits: Option<TraitSet>,
    /// Number of rule firings and vertex creations so far.
    n_transformations: usize,
    n_transformations_last_gc: usize,
    graph_size_last_gc: usize,
}

impl HepPlanner {
    pub fn new(program: HepProgram) -> Self {
        Self::with_config(program, HepConfig::default())
    }

    pub fn with_config(program: HepProgram, config: HepConfig) -> Self {
        Self {
            program: Arc::new(program),
            config,
            graph: PlanGraph::default(),
            rules: vec![],
            cost_model: Arc::new(DefaultCostModel),
            listener: None,
            requested_root_traits: None,
            n_transformations: 0,
            n_transformations_last_gc: 0,
            graph_size_last_gc: 0,
        }
    }

    #[must_use]
    pub fn with_cost_model(mut self, cost_model: CostModelRef) -> Self {
        self.cost_model = cost_model;
        self
    }

    #[must_use]
    pub fn with_listener(mut self, listener: Box<dyn PlannerListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn config(&self) -> &HepConfig {
        &self.config
    }

    pub fn graph(&self) -> &PlanGraph {
        &self.graph
    }

    /// Number of rule firings and vertex creations so far.
    pub fn n_transformations(&self) -> usize {
        self.n_transformations
    }

    /// Registers `plan` as the plan to optimize.
    pub fn set_root(&mut self, plan: PlanRef) -> Result<(), HepError> {
        let root = self.add_to_graph(&plan)?;
        self.graph.set_root(root);
        self.dump_graph()
    }

    /// A reference to the root vertex.
    pub fn root(&self) -> Option<PlanRef> {
        self.graph.root().map(PlanGraph::vertex_ref)
    }

    /// The current node of the root vertex.
    pub fn root_node(&self) -> Option<&PlanRef> {
        self.graph.root().and_then(|root| self.graph.node(root))
    }

    /// Registers a rule. Returns false if a rule with the same description is registered.
    pub fn add_rule(&mut self, rule: RuleRef) -> bool {
        if self
            .rules
            .iter()
            .any(|r| r.description() == rule.description())
        {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Unregisters the rule with this description.
    pub fn remove_rule(&mut self, description: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.description() != description);
        self.rules.len() != before
    }

    pub fn rules(&self) -> &[RuleRef] {
        &self.rules
    }

    /// Unregisters all rules.
    pub fn clear(&mut self) {
        self.rules.clear();
    }

    fn rule_by_description(&self, description: &str) -> Option<RuleRef> {
        self.rules
            .iter()
            .find(|r| r.description() == description)
            .cloned()
    }

    /// Asks for the final plan to have `traits`.
    ///
    /// Only requests on the root are remembered: `plan` must be a reference to the root vertex
    /// or its current node. Returns `plan`.
    pub fn change_traits(&mut self, plan: &PlanRef, traits: TraitSet) -> PlanRef {
        if let Some(root) = self.graph.root() {
            let is_root = plan.as_vertex_ref().map_or(false, |v| v.id() == root)
                || self
                    .graph
                    .node(root)
                    .map_or(false, |node| Arc::ptr_eq(node, plan));
            if is_root {
                self.requested_root_traits = Some(traits);
            }
        }
        plan.clone()
    }

    /// Runs the program and returns the optimized plan.
    pub fn find_best_exp(&mut self) -> Result<PlanRef, HepError> {
        self.graph.root().ok_or(HepError::RootNotSet)?;
        let program = self.program.clone();
        debug!(
            instructions = program.instructions().len(),
            rules = self.rules.len(),
            "start heuristic planning"
        );
        self.execute_program(&program)?;
        self.collect_garbage();

        let root = self.graph.root().ok_or(HepError::RootNotSet)?;
        let plan = self.build_final_plan(root, &mut HashMap::new())?;
        debug!(
            transformations = self.n_transformations,
            vertices = self.graph.len(),
            "finish heuristic planning"
        );
        Ok(plan)
    }

    /// Adds `plan` to the graph and returns its vertex.
    ///
    /// Inputs are added first. A vertex reference is returned as is. Unless the planner is in
    /// tree mode, a node whose digest is already indexed reuses the indexed vertex.
    fn add_to_graph(&mut self, plan: &PlanRef) -> Result<VertexId, HepError> {
        if let Some(vertex) = plan.as_vertex_ref() {
            let id = vertex.id();
            if !self.graph.contains(id) {
                return Err(HepError::DanglingVertex(id));
            }
            return Ok(id);
        }

        let inputs = plan.children();
        let mut child_ids = Vec::with_capacity(inputs.len());
        for input in &inputs {
            child_ids.push(self.add_to_graph(input)?);
        }
        let unchanged = inputs
            .iter()
            .zip_eq(&child_ids)
            .all(|(input, id)| input.as_vertex_ref().map(|v| v.id()) == Some(*id));
        let node = if unchanged {
            plan.clone()
        } else {
            let children = child_ids
                .iter()
                .map(|id| VertexRef::new(*id).into_plan_ref())
                .collect_vec();
            let copy = plan.clone_with_children(&children);
            if let Some(listener) = &self.listener {
                listener.on_copy(plan, &copy);
            }
            copy
        };

        let digest = node.digest();
        if !self.config.no_dag {
            if let Some(existing) = self.graph.lookup(&digest) {
                trace!(vertex = %existing, %digest, "reuse vertex");
                return Ok(existing);
            }
        }

        let id = self.graph.add_vertex(node.clone());
        self.graph.index(digest, id);
        if let Some(listener) = &self.listener {
            listener.on_equivalence(&node, id);
        }
        self.n_transformations += 1;
        Ok(id)
    }

    /// Gives vertex `id` the node `node` and re-indexes it.
    ///
    /// In DAG mode, if another vertex is already indexed under the new digest, the index is
    /// left alone and that vertex is returned: the caller must merge `id` into it.
    fn update_vertex(
        &mut self,
        id: VertexId,
        node: PlanRef,
    ) -> Result<Option<VertexId>, HepError> {
        let current = self
            .graph
            .node(id)
            .ok_or(HepError::DanglingVertex(id))?
            .clone();
        let replaced = !Arc::ptr_eq(&current, &node);
        if replaced {
            self.notify_discard(&current);
        }
        self.graph.unindex(&current.digest(), id);

        let digest = node.digest();
        let duplicate = match self.graph.lookup(&digest) {
            Some(other) if other != id && !self.config.no_dag => Some(other),
            _ => {
                self.graph.index(digest, id);
                None
            }
        };
        if replaced {
            self.graph.replace_node(id, node.clone())?;
        }
        if let Some(listener) = &self.listener {
            listener.on_equivalence(&node, id);
        }
        Ok(duplicate)
    }

    /// Rewires `parents` of `discarded` to `preserved`.
    ///
    /// `discarded` is left in the graph. It is collected once it is no longer reachable.
    fn contract_vertices(
        &mut self,
        preserved: VertexId,
        discarded: VertexId,
        parents: &[VertexId],
    ) -> Result<(), HepError> {
        if preserved == discarded {
            return Ok(());
        }
        let node = self
            .graph
            .node(preserved)
            .ok_or(HepError::DanglingVertex(preserved))?
            .clone();
        self.update_vertex(preserved, node)?;

        for &parent in parents {
            let parent_node = self
                .graph
                .node(parent)
                .ok_or(HepError::DanglingVertex(parent))?
                .clone();
            let children = parent_node
                .children()
                .iter()
                .map(|child| match child.as_vertex_ref() {
                    Some(v) if v.id() == discarded => VertexRef::new(preserved).into_plan_ref(),
                    _ => child.clone(),
                })
                .collect_vec();
            let new_node = parent_node.clone_with_children(&children);
            if let Some(duplicate) = self.update_vertex(parent, new_node)? {
                // the rewired parent is now equal to another vertex
                trace!(vertex = %parent, into = %duplicate, "merge duplicate parent");
                let grandparents = self.graph.parents(parent).to_vec();
                self.contract_vertices(duplicate, parent, &grandparents)?;
            }
        }

        if self.graph.root() == Some(discarded) {
            self.graph.set_root(preserved);
        }
        Ok(())
    }

    /// Rebuilds a plan without vertex references from vertex `id`.
    ///
    /// `built` holds the plans already rebuilt in this call, so that a shared vertex is
    /// rebuilt and reported once.
    fn build_final_plan(
        &self,
        id: VertexId,
        built: &mut HashMap<VertexId, PlanRef>,
    ) -> Result<PlanRef, HepError> {
        if let Some(plan) = built.get(&id) {
            return Ok(plan.clone());
        }
        let node = self
            .graph
            .node(id)
            .ok_or(HepError::DanglingVertex(id))?
            .clone();
        if let Some(listener) = &self.listener {
            listener.on_chosen(&node);
        }

        let inputs = node.children();
        let plan = if inputs.is_empty() {
            node
        } else {
            let children = inputs
                .iter()
                .map(|input| match input.as_vertex_ref() {
                    Some(v) => self.build_final_plan(v.id(), built),
                    None => Ok(input.clone()),
                })
                .collect::<Result<Vec<_>, _>>()?;
            node.clone_with_children(&children)
        };
        built.insert(id, plan.clone());
        Ok(plan)
    }

    /// Removes the vertices not reachable from the root.
    ///
    /// Does nothing if the graph has not changed since the last collection.
    fn collect_garbage(&mut self) {
        if self.n_transformations == self.n_transformations_last_gc {
            return;
        }
        self.n_transformations_last_gc = self.n_transformations;

        let swept = self.graph.sweep();
        if swept.is_empty() {
            return;
        }
        trace!(
            swept = swept.len(),
            remaining = self.graph.len(),
            "collect garbage"
        );
        for vertex in &swept {
            self.notify_discard(vertex.node());
        }
        self.graph_size_last_gc = self.graph.len();
    }

    fn notify_discard(&self, node: &PlanRef) {
        if let Some(listener) = &self.listener {
            listener.on_discard(node);
        }
    }

    fn notify_transformation(&self, rule: &str, node: &PlanRef, before: bool) {
        if let Some(listener) = &self.listener {
            listener.on_transformation(rule, node, before);
        }
    }

    /// Checks the graph and logs it, if consistency checks or trace logging are enabled.
    fn dump_graph(&self) -> Result<(), HepError> {
        let trace_enabled = tracing::enabled!(tracing::Level::TRACE);
        if !trace_enabled && !self.config.check_consistency {
            return Ok(());
        }
        self.graph.check_consistency(!self.config.no_dag)?;
        if !trace_enabled {
            return Ok(());
        }

        let mq = MetadataQuery::new(&self.graph, self.cost_model.as_ref());
        let mut dump = String::from("breadth-first from root: {\n");
        for id in self.graph.breadth_first() {
            if let Some(vertex) = self.graph.vertex(id) {
                let node = vertex.node();
                dump += &format!(
                    "    #{} = {}, rows={}, cumulative cost={}\n",
                    id,
                    node.digest(),
                    mq.rows(node),
                    mq.cumulative_cost(node)
                );
            }
        }
        dump += "}";
        trace!("{}", dump);
        Ok(())
    }
}
