// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use bit_set::BitSet;
use itertools::Itertools;
use serde::Serialize;

use super::HepError;
use crate::plan_nodes::{IntoPlanRef, PlanRef, VertexRef};

/// Identity of a vertex. Ids are never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VertexId(usize);

impl VertexId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A slot of the plan graph holding the current node of an equivalence class.
///
/// The node can be replaced without changing the vertex id, so the edges of its parents stay
/// valid. All inputs of the node are [`VertexRef`]s.
#[derive(Debug, Clone)]
pub struct Vertex {
    id: VertexId,
    node: PlanRef,
    /// Distinct child vertices, in input order.
    children: Vec<VertexId>,
    /// Distinct parent vertices, in the order they were linked.
    parents: Vec<VertexId>,
}

impl Vertex {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn node(&self) -> &PlanRef {
        &self.node
    }

    pub fn children(&self) -> &[VertexId] {
        &self.children
    }

    pub fn parents(&self) -> &[VertexId] {
        &self.parents
    }

    /// Digest of the vertex itself, never equal to the digest of a plain node.
    pub fn digest(&self) -> String {
        format!("Vertex({})", self.node.digest())
    }
}

/// Returns the distinct vertices referenced by the inputs of `node`.
fn child_vertices(node: &PlanRef) -> Vec<VertexId> {
    node.children()
        .iter()
        .filter_map(|child| child.as_vertex_ref().map(|v| v.id()))
        .unique()
        .collect()
}

/// An arena of vertices with parent to child edges and a digest index.
#[derive(Debug, Default)]
pub struct PlanGraph {
    /// Indexed by [`VertexId`]. Swept vertices leave a `None`.
    vertices: Vec<Option<Vertex>>,
    live: usize,
    digest_index: HashMap<String, VertexId>,
    root: Option<VertexId>,
}

impl PlanGraph {
    pub fn root(&self) -> Option<VertexId> {
        self.root
    }

    pub(super) fn set_root(&mut self, root: VertexId) {
        self.root = Some(root);
    }

    /// Number of vertices in the graph, garbage included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.vertex(id).is_some()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index()).and_then(|v| v.as_ref())
    }

    fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(id.index()).and_then(|v| v.as_mut())
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter().flatten()
    }

    pub fn node(&self, id: VertexId) -> Option<&PlanRef> {
        self.vertex(id).map(|v| v.node())
    }

    pub fn children(&self, id: VertexId) -> &[VertexId] {
        self.vertex(id).map_or(&[], |v| v.children())
    }

    pub fn parents(&self, id: VertexId) -> &[VertexId] {
        self.vertex(id).map_or(&[], |v| v.parents())
    }

    /// Replaces a reference to a vertex by the vertex's current node.
    ///
    /// Any other plan, and a reference to a vertex not in the graph, is returned as is.
    pub fn resolve(&self, plan: &PlanRef) -> PlanRef {
        plan.as_vertex_ref()
            .and_then(|v| self.node(v.id()))
            .unwrap_or(plan)
            .clone()
    }

    /// The vertex indexed under `digest`.
    pub fn lookup(&self, digest: &str) -> Option<VertexId> {
        self.digest_index.get(digest).copied()
    }

    /// Indexes `id` under `digest`, replacing any previous entry.
    pub(super) fn index(&mut self, digest: String, id: VertexId) {
        self.digest_index.insert(digest, id);
    }

    /// Removes the entry for `digest` if it points to `id`.
    pub(super) fn unindex(&mut self, digest: &str, id: VertexId) {
        if self.lookup(digest) == Some(id) {
            self.digest_index.remove(digest);
        }
    }

    pub fn digest_index_len(&self) -> usize {
        self.digest_index.len()
    }

    /// Adds a vertex holding `node` and links it to the vertices its inputs refer to.
    ///
    /// The vertex is not indexed.
    pub(super) fn add_vertex(&mut self, node: PlanRef) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        let children = child_vertices(&node);
        for &child in &children {
            self.link(id, child);
        }
        self.vertices.push(Some(Vertex {
            id,
            node,
            children,
            parents: vec![],
        }));
        self.live += 1;
        id
    }

    /// Gives vertex `id` a new node, moving its child edges to the inputs of `node`.
    ///
    /// Returns the previous node. The digest index is left untouched.
    pub(super) fn replace_node(
        &mut self,
        id: VertexId,
        node: PlanRef,
    ) -> Result<PlanRef, HepError> {
        let new_children = child_vertices(&node);
        let vertex = self.vertex_mut(id).ok_or(HepError::DanglingVertex(id))?;
        let old_node = std::mem::replace(&mut vertex.node, node);
        let old_children = std::mem::replace(&mut vertex.children, new_children.clone());

        for child in old_children.iter().filter(|c| !new_children.contains(c)) {
            if let Some(child) = self.vertex_mut(*child) {
                child.parents.retain(|p| *p != id);
            }
        }
        for &child in new_children.iter().filter(|c| !old_children.contains(c)) {
            self.link(id, child);
        }
        Ok(old_node)
    }

    fn link(&mut self, parent: VertexId, child: VertexId) {
        if let Some(child) = self.vertex_mut(child) {
            if !child.parents.contains(&parent) {
                child.parents.push(parent);
            }
        }
    }

    /// Vertices reachable from the root, in breadth-first order.
    pub fn breadth_first(&self) -> Vec<VertexId> {
        let mut order = vec![];
        let mut visited = BitSet::new();
        let mut queue = VecDeque::new();
        if let Some(root) = self.root.filter(|r| self.contains(*r)) {
            visited.insert(root.index());
            queue.push_back(root);
        }
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for &child in self.children(id) {
                if visited.insert(child.index()) {
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Vertices reachable from `start`, parents before children, in input order.
    pub fn depth_first(&self, start: VertexId) -> Vec<VertexId> {
        let mut order = vec![];
        let mut visited = BitSet::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if !self.contains(id) || !visited.insert(id.index()) {
                continue;
            }
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// All vertices with every parent before its children.
    ///
    /// Fails if the graph has a cycle.
    pub fn topological_order(&self) -> Result<Vec<VertexId>, HepError> {
        let mut in_degree: HashMap<VertexId, usize> = self
            .vertices()
            .map(|v| (v.id(), v.parents().len()))
            .collect();
        let mut queue: VecDeque<VertexId> = self
            .vertices()
            .filter(|v| v.parents().is_empty())
            .map(|v| v.id())
            .collect();
        let mut order = Vec::with_capacity(self.live);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for child in self.children(id) {
                if let Some(degree) = in_degree.get_mut(child) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*child);
                    }
                }
            }
        }
        if order.len() < self.live {
            let cyclic = in_degree
                .into_iter()
                .filter(|(_, degree)| *degree > 0)
                .map(|(id, _)| id)
                .sorted()
                .collect();
            return Err(HepError::CycleDetected(cyclic));
        }
        Ok(order)
    }

    /// Removes every vertex not reachable from the root, and returns them.
    pub(super) fn sweep(&mut self) -> Vec<Vertex> {
        let mut marked = BitSet::with_capacity(self.vertices.len());
        for id in self.breadth_first() {
            marked.insert(id.index());
        }
        if marked.len() == self.live {
            return vec![];
        }

        let mut swept = vec![];
        for slot in &mut self.vertices {
            if slot.as_ref().map_or(false, |v| !marked.contains(v.id.index())) {
                swept.extend(slot.take());
            }
        }
        self.live -= swept.len();
        for vertex in self.vertices.iter_mut().flatten() {
            vertex.parents.retain(|p| marked.contains(p.index()));
        }
        self.digest_index.retain(|_, id| marked.contains(id.index()));
        swept
    }

    /// Checks that the graph has no cycle, that every edge points to a vertex in the graph,
    /// and, if `dag` is set, that every vertex reachable from the root is indexed under its
    /// current digest.
    pub fn check_consistency(&self, dag: bool) -> Result<(), HepError> {
        self.topological_order()?;
        for vertex in self.vertices() {
            for &child in vertex.children() {
                if !self.contains(child) {
                    return Err(HepError::DanglingVertex(child));
                }
            }
            if vertex.children() != child_vertices(vertex.node()).as_slice() {
                return Err(HepError::InconsistentDigest {
                    digest: vertex.digest(),
                    vertex: vertex.id(),
                });
            }
        }
        if dag {
            for id in self.breadth_first() {
                let digest = self.node(id).ok_or(HepError::DanglingVertex(id))?.digest();
                if self.lookup(&digest) != Some(id) {
                    return Err(HepError::InconsistentDigest { digest, vertex: id });
                }
            }
        }
        Ok(())
    }

    /// A vertex reference to `id`.
    pub fn vertex_ref(id: VertexId) -> PlanRef {
        VertexRef::new(id).into_plan_ref()
    }
}
