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

//! Random graph generation for demo sessions.

use rand::prelude::*;
use rand_pcg::Pcg64;
use tracing::debug;

use super::{GraphModel, Position, VertexId};
use crate::config::RandomGraphConfig;

/// RNG used for graph generation.
pub type GraphRng = Pcg64;

/// Build RNG from optional seed.
///
/// If seed is provided, creates a deterministic RNG seeded with that value.
/// Otherwise, creates an RNG seeded from the operating system's entropy source.
#[inline]
pub fn build_rng(seed: Option<u64>) -> GraphRng {
    match seed {
        Some(s) => Pcg64::seed_from_u64(s),
        None => Pcg64::from_os_rng(),
    }
}

/// Generates a fresh graph with randomly placed vertices and random edges.
///
/// A vertex count is drawn from `[min_vertices, max_vertices]`. Each vertex
/// gets up to `placement_attempts` tries to land strictly farther than
/// `min_spacing` from every vertex placed so far and to be accepted by the
/// model's own `min_distance`. It is skipped if no attempt succeeds, so the result may hold fewer vertices than drawn. Every pair of
/// placed vertices is then joined with probability `edge_probability`.
///
/// The configuration is expected to have passed
/// [`RandomGraphConfig::validate`].
pub fn random_graph<R: Rng + ?Sized>(
    config: &RandomGraphConfig,
    min_distance: f64,
    rng: &mut R,
) -> GraphModel {
    let mut graph = GraphModel::with_min_distance(min_distance);
    let target = rng.random_range(config.min_vertices..=config.max_vertices);
    let area = &config.area;

    let mut placed: Vec<(VertexId, Position)> = Vec::with_capacity(target as usize);
    for _ in 0..target {
        for _ in 0..config.placement_attempts {
            let candidate = Position::new(
                rng.random_range(area.min_x..=area.max_x),
                rng.random_range(area.min_y..=area.max_y),
            );
            let spaced = placed
                .iter()
                .all(|(_, position)| position.distance(&candidate) > config.min_spacing);
            if !spaced {
                continue;
            }
            if let Some(id) = graph.add_vertex(candidate) {
                placed.push((id, candidate));
                break;
            }
        }
    }

    for i in 0..placed.len() {
        for j in (i + 1)..placed.len() {
            if rng.random_bool(config.edge_probability) {
                // Both endpoints exist and differ, so toggling cannot fail.
                let _ = graph.toggle_edge(placed[i].0, placed[j].0);
            }
        }
    }

    debug!(
        requested = target,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "random graph generated"
    );
    graph
}
