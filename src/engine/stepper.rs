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

//! Suspendable Bron-Kerbosch.
//!
//! Each recursive call of the textbook algorithm becomes a heap-allocated
//! [`Frame`] on an explicit stack. A frame records which emission point it
//! stopped at ([`Phase`]); pulling the next step resumes the top frame from
//! there, does the work up to the following emission point, and suspends
//! again. Recursion depth is therefore bounded by heap, not by the native
//! call stack.

use std::iter::FusedIterator;

use smallvec::SmallVec;
use tracing::{info, trace};

use super::step::{Step, StepKind};
use super::{intersect, EngineResult};
use crate::error::{CliqueError, CliqueResult};
use crate::graph::{Adjacency, GraphModel, VertexId, VertexSet};

/// Where a suspended frame resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Enter,
    CheckEmpty,
    Report,
    NewBest,
    IterateStart,
    Select,
    Descend(VertexId),
    Backtrack(VertexId),
    Done,
}

#[derive(Debug, Clone)]
struct Frame {
    r: VertexSet,
    p: VertexSet,
    x: VertexSet,
    depth: usize,
    /// P as it was when the loop started; fixed for the frame's lifetime.
    candidates: SmallVec<[VertexId; 16]>,
    cursor: usize,
    phase: Phase,
}

impl Frame {
    fn new(r: VertexSet, p: VertexSet, x: VertexSet, depth: usize) -> Self {
        Frame {
            r,
            p,
            x,
            depth,
            candidates: SmallVec::new(),
            cursor: 0,
            phase: Phase::Enter,
        }
    }

    fn step(&self, kind: StepKind) -> Step {
        Step::frame(kind, self.depth, &self.r, &self.p, &self.x)
    }

    fn candidate_step(&self, kind: StepKind, v: VertexId) -> Step {
        let mut step = self.step(kind);
        step.current = Some(v);
        step
    }
}

/// A lazy, finite, non-restartable stepwise Bron-Kerbosch run.
///
/// The run owns a snapshot of the graph's adjacency taken at construction, so
/// the [`GraphModel`] it came from may be dropped or edited afterwards without
/// affecting it. Work happens only inside [`Iterator::next`] /
/// [`StepwiseRun::advance`]; a run that is not polled does nothing, and
/// dropping it is all the cancellation there is.
///
/// ```
/// use clique_stepper::engine::{StepKind, StepwiseRun};
/// use clique_stepper::graph::GraphModel;
///
/// let graph = GraphModel::from_edges(3, &[(1, 2), (1, 3), (2, 3)]).unwrap();
/// let steps: Vec<_> = StepwiseRun::new(&graph).collect();
/// assert_eq!(steps.last().unwrap().kind, StepKind::Finished);
/// let reports = steps.iter().filter(|s| s.kind == StepKind::ReportClique).count();
/// assert_eq!(reports, 1);
/// ```
#[derive(Debug, Clone)]
pub struct StepwiseRun {
    adjacency: Adjacency,
    stack: Vec<Frame>,
    best: Option<VertexSet>,
    finished: bool,
    emitted: usize,
}

impl StepwiseRun {
    pub fn new(graph: &GraphModel) -> Self {
        StepwiseRun::from_adjacency(graph.adjacency())
    }

    pub fn from_adjacency(adjacency: Adjacency) -> Self {
        info!(vertices = adjacency.len(), "stepwise run started");
        let root = Frame::new(
            VertexSet::default(),
            adjacency.vertices().clone(),
            VertexSet::default(),
            0,
        );
        StepwiseRun {
            adjacency,
            stack: vec![root],
            best: None,
            finished: false,
            emitted: 0,
        }
    }

    /// Pulls the next step.
    ///
    /// Unlike [`Iterator::next`], pulling after `Finished` is reported as
    /// [`CliqueError::RunExhausted`] so driver bugs surface.
    pub fn advance(&mut self) -> CliqueResult<Step> {
        self.next().ok_or(CliqueError::RunExhausted)
    }

    /// Whether the `Finished` step has been emitted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn steps_emitted(&self) -> usize {
        self.emitted
    }

    /// Number of suspended frames; 0 once the search is over.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn best_so_far(&self) -> Option<&VertexSet> {
        self.best.as_ref()
    }

    /// Final result, available once `Finished` has been emitted.
    pub fn result(&self) -> Option<EngineResult> {
        if !self.finished {
            return None;
        }
        Some(EngineResult {
            clique: self.best.clone().unwrap_or_default(),
        })
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    fn resume(&mut self) -> Option<Step> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                if self.finished {
                    return None;
                }
                self.finished = true;
                return Some(Step::finished());
            };

            match frame.phase {
                Phase::Enter => {
                    frame.phase = Phase::CheckEmpty;
                    return Some(frame.step(StepKind::EnterFrame));
                }
                Phase::CheckEmpty => {
                    frame.phase = if frame.p.is_empty() && frame.x.is_empty() {
                        Phase::Report
                    } else {
                        Phase::IterateStart
                    };
                    return Some(frame.step(StepKind::CheckEmpty));
                }
                Phase::Report => {
                    // The first clique of a run always becomes the best.
                    let improves = self
                        .best
                        .as_ref()
                        .map_or(true, |best| frame.r.len() > best.len());
                    let mut step = frame.step(StepKind::ReportClique);
                    step.is_new_best = improves;
                    if improves {
                        self.best = Some(frame.r.clone());
                        frame.phase = Phase::NewBest;
                    } else {
                        frame.phase = Phase::Done;
                    }
                    return Some(step);
                }
                Phase::NewBest => {
                    frame.phase = Phase::Done;
                    return Some(frame.step(StepKind::NewBest));
                }
                Phase::IterateStart => {
                    frame.candidates = frame.p.iter().copied().collect();
                    frame.cursor = 0;
                    frame.phase = Phase::Select;
                    return Some(frame.step(StepKind::IterateStart));
                }
                Phase::Select => {
                    let Some(&v) = frame.candidates.get(frame.cursor) else {
                        frame.phase = Phase::Done;
                        continue;
                    };
                    frame.phase = Phase::Descend(v);
                    return Some(frame.candidate_step(StepKind::SelectCandidate, v));
                }
                Phase::Descend(v) => {
                    let neighbors = self.adjacency.neighbors(v);
                    let mut r = frame.r.clone();
                    r.insert(v);
                    let child = Frame::new(
                        r,
                        intersect(&frame.p, neighbors),
                        intersect(&frame.x, neighbors),
                        frame.depth + 1,
                    );
                    let mut step = frame.candidate_step(StepKind::Descend, v);
                    step.neighbors = Some(neighbors.clone());
                    frame.phase = Phase::Backtrack(v);
                    self.stack.push(child);
                    return Some(step);
                }
                Phase::Backtrack(v) => {
                    frame.p.shift_remove(&v);
                    frame.x.insert(v);
                    frame.cursor += 1;
                    frame.phase = Phase::Select;
                    return Some(frame.candidate_step(StepKind::Backtrack, v));
                }
                Phase::Done => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl Iterator for StepwiseRun {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let step = self.resume()?;
        self.emitted += 1;
        trace!(kind = ?step.kind, depth = step.depth, current = ?step.current, "step");
        if step.is_finished() {
            info!(
                steps = self.emitted,
                best_size = self.best.as_ref().map_or(0, |best| best.len()),
                "stepwise run finished"
            );
        }
        Some(step)
    }
}

impl FusedIterator for StepwiseRun {}
