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
// Bron, C.; Kerbosch, J. (1973). "Algorithm 457: finding all cliques of an undirected graph". Communications of the ACM. 16 (9): 575–577. doi:10.1145/362342.362367.

//! Bron-Kerbosch maximal clique search, instant and stepwise.
//!
//! Both modes run the textbook recursion without pivoting:
//!
//! ```text
//! BronKerbosch(R, P, X):
//!     if P and X are both empty: report R
//!     for v in snapshot(P):
//!         BronKerbosch(R ∪ {v}, P ∩ N(v), X ∩ N(v))
//!         P := P \ {v}
//!         X := X ∪ {v}
//! ```
//!
//! [`run_to_completion`] recurses natively and only keeps the best clique.
//! [`StepwiseRun`] drives the same recursion from an explicit frame stack and
//! suspends at every observable event, yielding a [`Step`].
//!
//! Among several maximum cliques the one reported first in enumeration order
//! wins. Enumeration order follows vertex id order within a run, but callers
//! should not rely on which of the tied cliques is returned.

pub mod narrative;
pub mod step;
pub mod stepper;

pub use narrative::Narrative;
pub use step::{Step, StepKind, PSEUDOCODE};
pub use stepper::StepwiseRun;

use serde::Serialize;
use smallvec::SmallVec;
use tracing::info;

use crate::graph::{Adjacency, GraphModel, VertexId, VertexSet};

/// Best clique found by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineResult {
    pub clique: VertexSet,
}

impl EngineResult {
    pub fn size(&self) -> usize {
        self.clique.len()
    }

    pub fn contains(&self, id: VertexId) -> bool {
        self.clique.contains(&id)
    }

    /// Clique members in ascending id order.
    pub fn sorted(&self) -> Vec<VertexId> {
        let mut ids: Vec<VertexId> = self.clique.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

/// Runs the whole search without emitting steps and returns the maximum
/// clique by vertex count.
///
/// The empty graph yields the empty clique. Among several maximum cliques the
/// first one enumerated is returned. Call depth grows with the largest clique
/// size.
pub fn run_to_completion(graph: &GraphModel) -> EngineResult {
    let adjacency = graph.adjacency();
    let mut best: Option<Vec<VertexId>> = None;
    let mut reported = 0usize;
    enumerate_maximal_cliques(&adjacency, |clique| {
        reported += 1;
        if best.as_ref().map_or(true, |b| clique.len() > b.len()) {
            best = Some(clique.to_vec());
        }
    });
    let result = EngineResult {
        clique: best.unwrap_or_default().into_iter().collect(),
    };
    info!(
        vertices = adjacency.len(),
        maximal_cliques = reported,
        best_size = result.size(),
        "instant run finished"
    );
    result
}

/// Every maximal clique of `graph`, in enumeration order.
///
/// The empty graph has exactly one maximal clique, the empty set.
pub fn maximal_cliques(graph: &GraphModel) -> Vec<VertexSet> {
    let adjacency = graph.adjacency();
    let mut cliques = Vec::new();
    enumerate_maximal_cliques(&adjacency, |clique| {
        cliques.push(clique.iter().copied().collect());
    });
    cliques
}

/// Calls `on_clique` once for every maximal clique of `adjacency`.
pub(crate) fn enumerate_maximal_cliques<F>(adjacency: &Adjacency, mut on_clique: F)
where
    F: FnMut(&[VertexId]),
{
    let mut potential_clique: Vec<VertexId> = Vec::new();
    bron_kerbosch_recursive(
        adjacency,
        &mut on_clique,
        &mut potential_clique,
        adjacency.vertices().clone(),
        VertexSet::default(),
    );
}

fn bron_kerbosch_recursive<F>(
    adjacency: &Adjacency,
    on_clique: &mut F,
    potential_clique: &mut Vec<VertexId>,
    mut candidates: VertexSet,
    mut excluded: VertexSet,
) where
    F: FnMut(&[VertexId]),
{
    if candidates.is_empty() && excluded.is_empty() {
        on_clique(potential_clique.as_slice());
        return;
    }

    let snapshot: SmallVec<[VertexId; 16]> = candidates.iter().copied().collect();
    for v in snapshot {
        let neighbors_v = adjacency.neighbors(v);

        potential_clique.push(v);
        let new_candidates = intersect(&candidates, neighbors_v);
        let new_excluded = intersect(&excluded, neighbors_v);

        bron_kerbosch_recursive(
            adjacency,
            on_clique,
            potential_clique,
            new_candidates,
            new_excluded,
        );

        potential_clique.pop();
        candidates.shift_remove(&v);
        excluded.insert(v);
    }
}

/// Members of `set` that are also in `neighbors`, keeping the order of `set`.
pub(crate) fn intersect(set: &VertexSet, neighbors: &VertexSet) -> VertexSet {
    set.iter()
        .copied()
        .filter(|v| neighbors.contains(v))
        .collect()
}
