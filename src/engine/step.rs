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

use serde::Serialize;

use crate::graph::{VertexId, VertexSet};

/// Pseudocode shown next to a stepwise run. [`Step::line`] points into it,
/// 1-based.
pub const PSEUDOCODE: [&str; 7] = [
    "BronKerbosch(R, P, X):",
    "    if P and X are both empty:",
    "        report R as a maximal clique",
    "    for each vertex v in P:",
    "        BronKerbosch(R ∪ {v}, P ∩ N(v), X ∩ N(v))",
    "        P := P \\ {v}",
    "        X := X ∪ {v}",
];

/// The event a [`Step`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// A recursive call was entered.
    EnterFrame,
    /// P and X are about to be tested for emptiness.
    CheckEmpty,
    /// P and X were empty: R is a maximal clique.
    ReportClique,
    /// The clique just reported is strictly larger than any before it.
    NewBest,
    /// The loop over a snapshot of P starts.
    IterateStart,
    /// The next vertex of the snapshot was picked.
    SelectCandidate,
    /// The recursive call for the picked vertex is about to happen.
    Descend,
    /// The recursive call returned and the vertex moved from P to X.
    Backtrack,
    /// The whole search is over.
    Finished,
}

impl StepKind {
    /// 1-based line in [`PSEUDOCODE`] this kind of event belongs to.
    pub fn line(self) -> Option<usize> {
        match self {
            StepKind::EnterFrame => Some(1),
            StepKind::CheckEmpty => Some(2),
            StepKind::ReportClique | StepKind::NewBest => Some(3),
            StepKind::IterateStart | StepKind::SelectCandidate => Some(4),
            StepKind::Descend => Some(5),
            StepKind::Backtrack => Some(6),
            StepKind::Finished => None,
        }
    }

    /// Whether steps of this kind carry a current candidate.
    pub fn has_candidate(self) -> bool {
        matches!(
            self,
            StepKind::SelectCandidate | StepKind::Descend | StepKind::Backtrack
        )
    }
}

/// One observable event of a stepwise run.
///
/// `r`, `p` and `x` are owned copies taken when the event happened; nothing
/// the engine does afterwards changes a step that was already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub kind: StepKind,
    pub depth: usize,
    pub r: VertexSet,
    pub p: VertexSet,
    pub x: VertexSet,
    /// Vertex being processed; only set for `SelectCandidate`, `Descend` and
    /// `Backtrack`.
    pub current: Option<VertexId>,
    /// Neighbours of `current`; only set for `Descend`.
    pub neighbors: Option<VertexSet>,
    /// Set on a `ReportClique` step whose clique beats every earlier one.
    pub is_new_best: bool,
}

impl Step {
    pub(crate) fn frame(
        kind: StepKind,
        depth: usize,
        r: &VertexSet,
        p: &VertexSet,
        x: &VertexSet,
    ) -> Self {
        Step {
            kind,
            depth,
            r: r.clone(),
            p: p.clone(),
            x: x.clone(),
            current: None,
            neighbors: None,
            is_new_best: false,
        }
    }

    pub(crate) fn finished() -> Self {
        let empty = VertexSet::default();
        Step::frame(StepKind::Finished, 0, &empty, &empty, &empty)
    }

    /// 1-based line in [`PSEUDOCODE`] to highlight, if any.
    pub fn line(&self) -> Option<usize> {
        self.kind.line()
    }

    pub fn is_finished(&self) -> bool {
        self.kind == StepKind::Finished
    }
}
