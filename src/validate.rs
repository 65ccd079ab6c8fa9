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

//! Independent checks for clique results.
//!
//! Nothing here shares code with the Bron-Kerbosch engine; the brute-force
//! enumerator walks every vertex subset, so results from the engine can be
//! compared against it on small graphs.

use fixedbitset::FixedBitSet;

use crate::graph::{GraphModel, VertexId};

/// Largest graph [`brute_force_maximal_cliques`] accepts.
pub const MAX_BRUTE_FORCE_VERTICES: usize = 20;

/// Whether every pair of `vertices` is adjacent in `graph` and every vertex
/// exists.
pub fn is_clique<'a, I>(graph: &GraphModel, vertices: I) -> bool
where
    I: IntoIterator<Item = &'a VertexId>,
{
    let members: Vec<VertexId> = vertices.into_iter().copied().collect();
    members.iter().all(|&v| graph.contains(v))
        && members.iter().enumerate().all(|(i, &u)| {
            members[i + 1..]
                .iter()
                .all(|&v| u != v && graph.has_edge(u, v))
        })
}

/// Whether `vertices` is a clique that no other vertex of `graph` extends.
pub fn is_maximal_clique<'a, I>(graph: &GraphModel, vertices: I) -> bool
where
    I: IntoIterator<Item = &'a VertexId>,
{
    let members: Vec<VertexId> = vertices.into_iter().copied().collect();
    if !is_clique(graph, &members) {
        return false;
    }
    !graph
        .vertex_ids()
        .into_iter()
        .filter(|candidate| !members.contains(candidate))
        .any(|candidate| members.iter().all(|&m| graph.has_edge(candidate, m)))
}

/// Every maximal clique of `graph`, each sorted ascending, the list sorted.
///
/// Returns `None` for graphs with more than [`MAX_BRUTE_FORCE_VERTICES`]
/// vertices. The empty graph has one maximal clique, the empty set.
pub fn brute_force_maximal_cliques(graph: &GraphModel) -> Option<Vec<Vec<VertexId>>> {
    let ids: Vec<VertexId> = graph.vertex_ids().into_iter().collect();
    let n = ids.len();
    if n > MAX_BRUTE_FORCE_VERTICES {
        return None;
    }

    // rows[i] holds i itself plus its neighbours, so a clique is exactly a
    // subset contained in the row of each of its members.
    let rows: Vec<FixedBitSet> = ids
        .iter()
        .enumerate()
        .map(|(i, &u)| {
            let mut row = FixedBitSet::with_capacity(n);
            row.insert(i);
            for (j, &v) in ids.iter().enumerate() {
                if graph.has_edge(u, v) {
                    row.insert(j);
                }
            }
            row
        })
        .collect();

    let mut cliques = Vec::new();
    for mask in 0u32..(1u32 << n) {
        let mut subset = FixedBitSet::with_capacity(n);
        for i in 0..n {
            if mask & (1 << i) != 0 {
                subset.insert(i);
            }
        }
        let is_clique = subset.ones().all(|i| subset.is_subset(&rows[i]));
        if !is_clique {
            continue;
        }
        let extendable =
            (0..n).any(|k| !subset.contains(k) && subset.is_subset(&rows[k]));
        if !extendable {
            cliques.push(subset.ones().map(|i| ids[i]).collect::<Vec<_>>());
        }
    }
    cliques.sort();
    Some(cliques)
}
