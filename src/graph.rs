// Licensed under the Apache License, Version 2.0 (the "License"); you may
// not use this file except in compliance with the License. You may obtain
// a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied. See the
// License for the specific language governing permissions and limitations
// under the License.

//! The editable undirected graph the clique engine runs on.
//!
//! Vertices carry a stable [`VertexId`] and a 2-D [`Position`]; positions only
//! matter for spacing new vertices and for hit testing. The topology is kept in
//! a petgraph `StableUnGraph`, and a side map from ids to node indices keeps ids
//! stable even when petgraph recycles vacant slots.

pub mod generate;

use std::fmt;

use foldhash::{HashMap, HashMapExt};
use indexmap::{IndexMap, IndexSet};
use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliqueError, CliqueResult};

/// Minimum distance between two vertices accepted by [`GraphModel::add_vertex`].
pub const DEFAULT_MIN_VERTEX_DISTANCE: f64 = 50.0;

/// Insertion-ordered set of vertex ids.
///
/// Iteration order is the order in which ids were inserted, which is what
/// gives the step engine a stable candidate order within a run.
pub type VertexSet = IndexSet<VertexId, foldhash::fast::RandomState>;

/// Identifier of a vertex. Ids are positive and never reused by the model that
/// issued them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for VertexId {
    fn from(id: u32) -> Self {
        VertexId(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy)]
struct Vertex {
    id: VertexId,
    position: Position,
}

/// Outcome of [`GraphModel::toggle_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeToggle {
    Added,
    Removed,
}

/// Undirected simple graph with positioned vertices.
///
/// Every successful mutation bumps [`GraphModel::revision`], which holders of
/// derived results (best cliques, highlights) compare against to detect that
/// their data went stale.
#[derive(Debug, Clone)]
pub struct GraphModel {
    graph: StableUnGraph<Vertex, ()>,
    index: IndexMap<VertexId, NodeIndex, foldhash::fast::RandomState>,
    next_id: u32,
    min_distance: f64,
    revision: u64,
}

impl Default for GraphModel {
    fn default() -> Self {
        GraphModel::new()
    }
}

impl GraphModel {
    pub fn new() -> Self {
        GraphModel::with_min_distance(DEFAULT_MIN_VERTEX_DISTANCE)
    }

    /// Creates an empty model that rejects vertices placed closer than
    /// `min_distance` to an existing one.
    pub fn with_min_distance(min_distance: f64) -> Self {
        GraphModel {
            graph: StableUnGraph::default(),
            index: IndexMap::default(),
            next_id: 1,
            min_distance,
            revision: 0,
        }
    }

    /// Builds a graph with vertices `1..=vertex_count` laid out on a row and
    /// the given edges.
    ///
    /// Handy for tests and for callers that do not care about geometry.
    pub fn from_edges(vertex_count: u32, edges: &[(u32, u32)]) -> CliqueResult<Self> {
        let mut model = GraphModel::new();
        let spacing = model.min_distance * 2.0;
        for i in 0..vertex_count {
            // Row spacing is twice the minimum distance, so placement never fails.
            let _ = model.add_vertex(Position::new(f64::from(i) * spacing, 0.0));
        }
        for &(u, v) in edges {
            if !model.has_edge(VertexId(u), VertexId(v)) {
                model.toggle_edge(VertexId(u), VertexId(v))?;
            }
        }
        Ok(model)
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    /// Changes the spacing threshold for later insertions. Vertices already
    /// placed are kept as they are.
    pub fn set_min_distance(&mut self, min_distance: f64) {
        self.min_distance = min_distance;
    }

    /// Topology revision; increases on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Adds a vertex at `position`.
    ///
    /// Returns `None` without modifying the graph when an existing vertex is
    /// closer than the minimum distance.
    pub fn add_vertex(&mut self, position: Position) -> Option<VertexId> {
        let crowded = self
            .index
            .values()
            .any(|&node| self.graph[node].position.distance(&position) < self.min_distance);
        if crowded {
            debug!(x = position.x, y = position.y, "vertex rejected: too close to an existing one");
            return None;
        }
        let id = VertexId(self.next_id);
        self.next_id += 1;
        let node = self.graph.add_node(Vertex { id, position });
        self.index.insert(id, node);
        self.touch();
        debug!(vertex = %id, "vertex added");
        Some(id)
    }

    /// Removes a vertex and every edge touching it. Unknown ids are ignored.
    ///
    /// Returns whether a vertex was removed.
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        let Some(node) = self.index.shift_remove(&id) else {
            return false;
        };
        self.graph.remove_node(node);
        self.touch();
        debug!(vertex = %id, "vertex removed");
        true
    }

    /// Adds the edge `u`–`v` if absent, removes it if present.
    pub fn toggle_edge(&mut self, u: VertexId, v: VertexId) -> CliqueResult<EdgeToggle> {
        if u == v {
            return Err(CliqueError::SelfLoop { vertex: u });
        }
        let a = self.node(u)?;
        let b = self.node(v)?;
        let toggle = match self.graph.find_edge(a, b) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                EdgeToggle::Removed
            }
            None => {
                self.graph.add_edge(a, b, ());
                EdgeToggle::Added
            }
        };
        self.touch();
        let (lo, hi) = normalize(u, v);
        debug!(u = %lo, v = %hi, ?toggle, "edge toggled");
        Ok(toggle)
    }

    fn node(&self, id: VertexId) -> CliqueResult<NodeIndex> {
        self.index
            .get(&id)
            .copied()
            .ok_or(CliqueError::UnknownVertex { vertex: id })
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        match (self.index.get(&u), self.index.get(&v)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Neighbours of `id` in ascending id order. Unknown ids have none.
    pub fn neighbors(&self, id: VertexId) -> VertexSet {
        let Some(&node) = self.index.get(&id) else {
            return VertexSet::default();
        };
        let mut ids: Vec<VertexId> = self
            .graph
            .neighbors(node)
            .map(|neighbor| self.graph[neighbor].id)
            .collect();
        ids.sort_unstable();
        ids.into_iter().collect()
    }

    /// Snapshot of all vertex ids in ascending order.
    pub fn vertex_ids(&self) -> VertexSet {
        let mut ids: Vec<VertexId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().collect()
    }

    /// All edges as `(min, max)` pairs, sorted.
    pub fn edges(&self) -> Vec<(VertexId, VertexId)> {
        let mut edges: Vec<(VertexId, VertexId)> = self
            .graph
            .edge_references()
            .map(|edge| normalize(self.graph[edge.source()].id, self.graph[edge.target()].id))
            .collect();
        edges.sort_unstable();
        edges
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn position(&self, id: VertexId) -> Option<Position> {
        self.index.get(&id).map(|&node| self.graph[node].position)
    }

    /// First vertex (in insertion order) whose position is within `radius`
    /// of `position`, boundary included.
    pub fn vertex_at(&self, position: Position, radius: f64) -> Option<VertexId> {
        self.index
            .iter()
            .find(|&(_, &node)| self.graph[node].position.distance(&position) <= radius)
            .map(|(&id, _)| id)
    }

    /// Copies the current topology into a read-only [`Adjacency`].
    pub fn adjacency(&self) -> Adjacency {
        let vertices = self.vertex_ids();
        let mut neighbors = HashMap::with_capacity(vertices.len());
        for &id in &vertices {
            neighbors.insert(id, self.neighbors(id));
        }
        Adjacency {
            vertices,
            neighbors,
            empty: VertexSet::default(),
        }
    }
}

fn normalize(u: VertexId, v: VertexId) -> (VertexId, VertexId) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// A by-value snapshot of a graph's topology.
///
/// Runs own one of these, so later edits to the [`GraphModel`] can never leak
/// into a search that is already in flight.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    vertices: VertexSet,
    neighbors: HashMap<VertexId, VertexSet>,
    empty: VertexSet,
}

impl Adjacency {
    pub fn vertices(&self) -> &VertexSet {
        &self.vertices
    }

    pub fn neighbors(&self, id: VertexId) -> &VertexSet {
        self.neighbors.get(&id).unwrap_or(&self.empty)
    }

    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        self.neighbors(u).contains(&v)
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u32]) -> Vec<VertexId> {
        values.iter().copied().map(VertexId).collect()
    }

    #[test]
    fn add_vertex_assigns_increasing_ids() {
        let mut graph = GraphModel::new();
        let a = graph.add_vertex(Position::new(0.0, 0.0));
        let b = graph.add_vertex(Position::new(100.0, 0.0));
        assert_eq!(a, Some(VertexId(1)));
        assert_eq!(b, Some(VertexId(2)));
        assert_eq!(graph.revision(), 2);
    }

    #[test]
    fn add_vertex_rejects_crowded_position() {
        let mut graph = GraphModel::new();
        graph.add_vertex(Position::new(0.0, 0.0));
        assert_eq!(graph.add_vertex(Position::new(0.0, 49.0)), None);
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.revision(), 1);
        // Exactly the minimum distance away is accepted.
        assert_eq!(graph.add_vertex(Position::new(0.0, 50.0)), Some(VertexId(2)));
    }

    #[test]
    fn ids_are_not_reused_after_removal() {
        let mut graph = GraphModel::from_edges(2, &[]).unwrap();
        assert!(graph.remove_vertex(VertexId(2)));
        let id = graph.add_vertex(Position::new(500.0, 500.0));
        assert_eq!(id, Some(VertexId(3)));
    }

    #[test]
    fn toggle_edge_flips_presence() {
        let mut graph = GraphModel::from_edges(3, &[]).unwrap();
        let before = graph.revision();
        assert_eq!(
            graph.toggle_edge(VertexId(2), VertexId(1)).unwrap(),
            EdgeToggle::Added
        );
        assert!(graph.has_edge(VertexId(1), VertexId(2)));
        assert_eq!(graph.edges(), vec![(VertexId(1), VertexId(2))]);
        assert_eq!(
            graph.toggle_edge(VertexId(1), VertexId(2)).unwrap(),
            EdgeToggle::Removed
        );
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.revision(), before + 2);
    }

    #[test]
    fn toggle_edge_rejects_self_loop_and_unknown_vertices() {
        let mut graph = GraphModel::from_edges(2, &[]).unwrap();
        let revision = graph.revision();
        assert!(matches!(
            graph.toggle_edge(VertexId(1), VertexId(1)),
            Err(CliqueError::SelfLoop { vertex: VertexId(1) })
        ));
        assert!(matches!(
            graph.toggle_edge(VertexId(1), VertexId(9)),
            Err(CliqueError::UnknownVertex { vertex: VertexId(9) })
        ));
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn remove_vertex_drops_incident_edges() {
        let mut graph = GraphModel::from_edges(3, &[(1, 2), (2, 3), (1, 3)]).unwrap();
        assert!(graph.remove_vertex(VertexId(2)));
        assert_eq!(graph.edges(), vec![(VertexId(1), VertexId(3))]);
        assert!(graph.neighbors(VertexId(2)).is_empty());
        assert_eq!(
            graph.neighbors(VertexId(1)).into_iter().collect::<Vec<_>>(),
            ids(&[3])
        );
    }

    #[test]
    fn remove_unknown_vertex_is_a_noop() {
        let mut graph = GraphModel::from_edges(1, &[]).unwrap();
        let revision = graph.revision();
        assert!(!graph.remove_vertex(VertexId(42)));
        assert_eq!(graph.revision(), revision);
    }

    #[test]
    fn neighbors_are_sorted_and_unknown_ids_are_isolated() {
        let graph = GraphModel::from_edges(4, &[(4, 1), (1, 3), (2, 1)]).unwrap();
        assert_eq!(
            graph.neighbors(VertexId(1)).into_iter().collect::<Vec<_>>(),
            ids(&[2, 3, 4])
        );
        assert!(graph.neighbors(VertexId(99)).is_empty());
    }

    #[test]
    fn vertex_at_uses_inclusive_radius() {
        let graph = GraphModel::from_edges(2, &[]).unwrap();
        assert_eq!(graph.vertex_at(Position::new(22.0, 0.0), 22.0), Some(VertexId(1)));
        assert_eq!(graph.vertex_at(Position::new(22.5, 0.0), 22.0), None);
        assert_eq!(graph.vertex_at(Position::new(100.0, 5.0), 22.0), Some(VertexId(2)));
    }

    #[test]
    fn adjacency_is_a_detached_snapshot() {
        let mut graph = GraphModel::from_edges(3, &[(1, 2)]).unwrap();
        let snapshot = graph.adjacency();
        graph.toggle_edge(VertexId(2), VertexId(3)).unwrap();
        graph.remove_vertex(VertexId(1));
        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.has_edge(VertexId(1), VertexId(2)));
        assert!(!snapshot.has_edge(VertexId(2), VertexId(3)));
        assert!(snapshot.neighbors(VertexId(7)).is_empty());
    }
}
