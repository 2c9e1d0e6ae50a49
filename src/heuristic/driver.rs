// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::vec;

use tracing::{debug, trace};

use super::matcher::{match_operands, Bindings};
use super::program::ProgramState;
use super::*;
use crate::rules::{RuleCall, RuleKind, TraitMatchingRule};
use crate::traits::PlanTrait;

/// Where the scan of the graph goes after a step.
enum Traversal {
    /// Keep visiting the vertices of this iterator.
    Continue(vec::IntoIter<VertexId>),
    /// Start a new pass from the root.
    RestartFromRoot,
    /// No more rules to fire.
    Done,
}

impl HepPlanner {
    pub(super) fn execute_program(&mut self, program: &HepProgram) -> Result<(), HepError> {
        let mut state = ProgramState::new(&self.config);
        for instruction in program.instructions() {
            self.execute_instruction(instruction, &mut state)?;

            // amortize collection over the growth of the graph
            let delta = self.n_transformations - self.n_transformations_last_gc;
            if delta > self.graph_size_last_gc {
                self.collect_garbage();
            }
        }
        Ok(())
    }

    fn execute_instruction(
        &mut self,
        instruction: &Instruction,
        state: &mut ProgramState,
    ) -> Result<(), HepError> {
        trace!(?instruction, "execute instruction");
        match instruction {
            Instruction::RuleInstance(rule) => self.apply_rules(&[rule.clone()], true, state),
            Instruction::RuleDescription(description) => {
                let rule = self
                    .rule_by_description(description)
                    .ok_or_else(|| HepError::RuleNotFound(description.clone()))?;
                self.apply_rules(&[rule], true, state)
            }
            Instruction::RuleClass { filter, .. } => {
                let rules = self
                    .rules
                    .iter()
                    .filter(|rule| filter(rule.as_ref()))
                    .cloned()
                    .collect_vec();
                self.apply_rules(&rules, true, state)
            }
            Instruction::RuleCollection(rules) => self.apply_rules(rules, true, state),
            Instruction::ConverterRules { guaranteed } => {
                let mut rules = vec![];
                for rule in &self.rules {
                    match rule.kind() {
                        RuleKind::Converter { guaranteed: g, .. } if g == *guaranteed => {}
                        _ => continue,
                    }
                    rules.push(rule.clone());
                    if !guaranteed {
                        // lets the conversion also spread from the leaves up
                        rules.extend(
                            TraitMatchingRule::new(rule.clone())
                                .map(|r| Arc::new(r) as RuleRef),
                        );
                    }
                }
                self.apply_rules(&rules, *guaranteed, state)
            }
            Instruction::CommonRelSubExprRules => {
                let rules = self
                    .rules
                    .iter()
                    .filter(|rule| rule.kind() == RuleKind::CommonSubExpr)
                    .cloned()
                    .collect_vec();
                self.apply_rules(&rules, true, state)
            }
            Instruction::Subprogram(program) => {
                if state.group.is_some() {
                    return Err(HepError::GroupSubprogram);
                }
                trace!("enter sub-program");
                loop {
                    let before = self.n_transformations;
                    self.execute_program(program)?;
                    if self.n_transformations == before {
                        break;
                    }
                }
                trace!("leave sub-program");
                Ok(())
            }
            Instruction::BeginGroup => {
                if state.group.is_some() {
                    return Err(HepError::NestedGroup);
                }
                state.group = Some(vec![]);
                Ok(())
            }
            Instruction::EndGroup => {
                let rules = state.group.take().ok_or(HepError::UnbalancedGroup)?;
                self.apply_rules(&rules, true, state)
            }
            Instruction::MatchOrder(order) => {
                state.match_order = *order;
                Ok(())
            }
            Instruction::MatchLimit(limit) => {
                state.match_limit = *limit;
                Ok(())
            }
        }
    }

    /// Fires `rules` over the graph until none of them fires or the match limit is reached.
    fn apply_rules(
        &mut self,
        rules: &[RuleRef],
        force_conversions: bool,
        state: &mut ProgramState,
    ) -> Result<(), HepError> {
        if let Some(group) = &mut state.group {
            for rule in rules {
                if !group.iter().any(|r| Arc::ptr_eq(r, rule)) {
                    group.push(rule.clone());
                }
            }
            return Ok(());
        }
        if rules.is_empty() || state.limit_reached() {
            return Ok(());
        }
        debug!(
            rules = %rules.iter().map(|r| r.description()).join(", "),
            order = ?state.match_order,
            "apply rules"
        );

        // set once a pass resumed from a new vertex instead of the root, so the vertices
        // skipped must be visited by another pass
        let mut skipped = false;
        let mut traversal = Traversal::RestartFromRoot;
        loop {
            traversal = match traversal {
                Traversal::Done => return Ok(()),
                Traversal::RestartFromRoot => {
                    skipped = false;
                    let root = self.graph.root().ok_or(HepError::RootNotSet)?;
                    Traversal::Continue(self.graph_iter(root, state.match_order)?)
                }
                Traversal::Continue(iter) => {
                    self.advance(iter, rules, force_conversions, state, &mut skipped)?
                }
            };
        }
    }

    /// Visits vertices from `iter` until a rule fires, and tells where to go next.
    fn advance(
        &mut self,
        iter: vec::IntoIter<VertexId>,
        rules: &[RuleRef],
        force_conversions: bool,
        state: &mut ProgramState,
        skipped: &mut bool,
    ) -> Result<Traversal, HepError> {
        for vertex in iter {
            let new_vertex = match self.fire_first(vertex, rules, force_conversions)? {
                Some(new_vertex) => new_vertex,
                None => continue,
            };
            state.matches_fired += 1;
            if state.limit_reached() {
                return Ok(Traversal::Done);
            }
            return match state.match_order {
                MatchOrder::TopDown | MatchOrder::BottomUp => Ok(Traversal::RestartFromRoot),
                MatchOrder::Arbitrary => {
                    *skipped = true;
                    Ok(Traversal::Continue(
                        self.graph_iter(new_vertex, state.match_order)?,
                    ))
                }
                MatchOrder::DepthFirst => {
                    *skipped = true;
                    let iter = self.graph_iter(new_vertex, state.match_order)?;
                    if self.depth_first_apply(iter, rules, force_conversions, state)? {
                        return Ok(Traversal::Done);
                    }
                    Ok(Traversal::RestartFromRoot)
                }
            };
        }
        if *skipped {
            Ok(Traversal::RestartFromRoot)
        } else {
            Ok(Traversal::Done)
        }
    }

    /// Rewrites the vertices of `iter`, descending into each new vertex right after it is
    /// created. Returns whether the match limit was reached.
    fn depth_first_apply(
        &mut self,
        iter: vec::IntoIter<VertexId>,
        rules: &[RuleRef],
        force_conversions: bool,
        state: &mut ProgramState,
    ) -> Result<bool, HepError> {
        for vertex in iter {
            if let Some(new_vertex) = self.fire_first(vertex, rules, force_conversions)? {
                state.matches_fired += 1;
                if state.limit_reached() {
                    return Ok(true);
                }
                let depth_iter = self.graph_iter(new_vertex, state.match_order)?;
                if self.depth_first_apply(depth_iter, rules, force_conversions, state)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Tries `rules` in order on `vertex` and returns the new vertex of the first one that
    /// changes the graph.
    fn fire_first(
        &mut self,
        vertex: VertexId,
        rules: &[RuleRef],
        force_conversions: bool,
    ) -> Result<Option<VertexId>, HepError> {
        for rule in rules {
            match self.apply_rule(rule, vertex, force_conversions)? {
                Some(new_vertex) if new_vertex != vertex => return Ok(Some(new_vertex)),
                _ => {}
            }
        }
        Ok(None)
    }

    /// Returns the vertices to visit from `start`, after collecting garbage so that rules
    /// never see it.
    fn graph_iter(
        &mut self,
        start: VertexId,
        order: MatchOrder,
    ) -> Result<vec::IntoIter<VertexId>, HepError> {
        self.collect_garbage();
        let vertices = match order {
            MatchOrder::Arbitrary | MatchOrder::DepthFirst => self.graph.depth_first(start),
            MatchOrder::TopDown | MatchOrder::BottomUp => {
                if self.graph.root() != Some(start) {
                    return Err(HepError::NotRoot);
                }
                let mut vertices = self.graph.topological_order()?;
                if order == MatchOrder::BottomUp {
                    vertices.reverse();
                }
                vertices
            }
        };
        Ok(vertices.into_iter())
    }

    /// Whether `vertex` is in the graph and still the indexed vertex of its digest.
    fn is_live(&self, vertex: VertexId) -> bool {
        match self.graph.node(vertex) {
            None => false,
            Some(_) if self.config.no_dag => true,
            Some(node) => self.graph.lookup(&node.digest()) == Some(vertex),
        }
    }

    /// Parents of `vertex`, once per input referring to it.
    fn vertex_parents(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut parents = vec![];
        for &parent in self.graph.parents(vertex) {
            if let Some(node) = self.graph.node(parent) {
                let refs = node
                    .children()
                    .iter()
                    .filter(|c| c.as_vertex_ref().map(|v| v.id()) == Some(vertex))
                    .count();
                parents.extend(std::iter::repeat(parent).take(refs));
            }
        }
        parents
    }

    /// Whether some consumer of `vertex` asks for `out_trait`.
    fn converter_applies(&self, vertex: VertexId, out_trait: &PlanTrait) -> bool {
        let parent_wants = self.graph.parents(vertex).iter().any(|&parent| {
            self.graph.node(parent).map_or(false, |node| {
                // converters are never chained
                !node.is_converter() && node.traits().contains(out_trait)
            })
        });
        parent_wants
            || (self.graph.root() == Some(vertex)
                && self
                    .requested_root_traits
                    .as_ref()
                    .map_or(false, |traits| traits.contains(out_trait)))
    }

    /// Tries to fire `rule` on `vertex`. Returns the vertex that replaces it, if any.
    fn apply_rule(
        &mut self,
        rule: &RuleRef,
        vertex: VertexId,
        force_conversions: bool,
    ) -> Result<Option<VertexId>, HepError> {
        if !self.is_live(vertex) {
            return Ok(None);
        }
        let node = self
            .graph
            .node(vertex)
            .ok_or(HepError::DanglingVertex(vertex))?
            .clone();

        let mut parent_trait = None;
        let mut parents = None;
        match rule.kind() {
            RuleKind::Converter {
                out_trait,
                guaranteed,
            } => {
                if node.converted_trait() == Some(out_trait.kind()) {
                    return Ok(None);
                }
                if guaranteed || !force_conversions {
                    if !self.converter_applies(vertex, &out_trait) {
                        return Ok(None);
                    }
                    parent_trait = Some(out_trait);
                }
            }
            RuleKind::CommonSubExpr => {
                let parent_vertices = self.vertex_parents(vertex);
                if parent_vertices.len() < 2 {
                    return Ok(None);
                }
                parents = Some(
                    parent_vertices
                        .iter()
                        .filter_map(|p| self.graph.node(*p).cloned())
                        .collect_vec(),
                );
            }
            RuleKind::Normal => {}
        }

        let mut bindings = Bindings::default();
        if !match_operands(&self.graph, rule.operand(), &node, &mut bindings) {
            return Ok(None);
        }

        let results = {
            let mq = MetadataQuery::new(&self.graph, self.cost_model.as_ref());
            let mut call = RuleCall::new(bindings.nodes, bindings.children, parents, mq);
            if !rule.matches(&call) {
                return Ok(None);
            }
            trace!(rule = rule.description(), %vertex, "fire rule");
            rule.on_match(&mut call);
            call.into_results()
        };
        let best = match self.choose_best(results) {
            Some(best) => best,
            None => return Ok(None),
        };
        let new_vertex =
            self.apply_transformation_results(rule.description(), vertex, best, parent_trait)?;
        Ok(Some(new_vertex))
    }

    /// Puts `best` in place of `vertex`.
    fn apply_transformation_results(
        &mut self,
        rule: &str,
        vertex: VertexId,
        best: PlanRef,
        parent_trait: Option<PlanTrait>,
    ) -> Result<VertexId, HepError> {
        self.n_transformations += 1;
        self.notify_transformation(rule, &best, true);

        // only the parents linked before the new plan is added are rewired
        let parents = self
            .graph
            .parents(vertex)
            .iter()
            .copied()
            .filter(|&parent| match &parent_trait {
                None => true,
                Some(out_trait) => self.graph.node(parent).map_or(false, |node| {
                    !node.is_converter() && node.traits().contains(out_trait)
                }),
            })
            .collect_vec();

        let mut new_vertex = self.add_to_graph(&best)?;
        if let Some(&parent) = parents.iter().find(|&&p| p == new_vertex) {
            // the result is one of the parents: a no-op, and rewiring would make a cycle
            trace!(%vertex, %parent, "result equals a parent");
            new_vertex = parent;
        } else {
            self.contract_vertices(new_vertex, vertex, &parents)?;
        }

        if self.listener.is_some() {
            self.collect_garbage();
        }
        self.notify_transformation(rule, &best, false);
        self.dump_graph()?;
        Ok(new_vertex)
    }

    /// Returns the only result without costing it, or the cheapest one. Ties go to the
    /// earliest.
    fn choose_best(&self, results: Vec<PlanRef>) -> Option<PlanRef> {
        let mut results = results.into_iter();
        let first = results.next()?;
        if results.len() == 0 {
            return Some(first);
        }

        let mq = MetadataQuery::new(&self.graph, self.cost_model.as_ref());
        let mut best_cost = mq.cumulative_cost(&first);
        trace!(plan = %first.digest(), cost = %best_cost, rows = mq.rows(&first), "consider");
        let mut best = first;
        for plan in results {
            let cost = mq.cumulative_cost(&plan);
            trace!(plan = %plan.digest(), %cost, rows = mq.rows(&plan), "consider");
            if cost.is_lt(&best_cost) {
                best = plan;
                best_cost = cost;
            }
        }
        Some(best)
    }
}
