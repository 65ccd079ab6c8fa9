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

//! The driver side of a visualizer.
//!
//! A [`Session`] owns the graph being edited, the current stepwise run (if
//! any) and the run mode, and turns UI commands into engine calls:
//!
//! ```text
//! Idle --start_stepwise--> Running <--pause/resume--> Paused
//!                              \                        /
//!                               `----> Finished <------'
//! ```
//!
//! `Finished` is terminal for a run; starting again always builds a fresh
//! [`StepwiseRun`]. Graph edits are refused while a run is `Running` or
//! `Paused`.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use smallvec::{smallvec, SmallVec};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::engine::narrative::SetDisplay;
use crate::engine::{run_to_completion, EngineResult, Step, StepKind, StepwiseRun};
use crate::error::{CliqueError, CliqueResult};
use crate::graph::generate::{build_rng, random_graph, GraphRng};
use crate::graph::{EdgeToggle, GraphModel, Position, VertexId, VertexSet};

/// Number of trace lines a sidebar typically shows.
pub const DEFAULT_TRACE_LINES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Idle,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::Idle => "idle",
            RunMode::Running => "running",
            RunMode::Paused => "paused",
            RunMode::Finished => "finished",
        })
    }
}

/// Feedback signal for the presentation layer (a sound, a flash, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Any step was taken.
    Step,
    /// A new best clique was found.
    Found,
    /// The search finished.
    Finish,
}

impl Cue {
    /// Cues to play for `step`, in order.
    pub fn for_step(step: &Step) -> SmallVec<[Cue; 2]> {
        let mut cues: SmallVec<[Cue; 2]> = smallvec![Cue::Step];
        match step.kind {
            StepKind::NewBest => cues.push(Cue::Found),
            StepKind::Finished => cues.push(Cue::Finish),
            _ => {}
        }
        cues
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexRole {
    Idle,
    /// The candidate of the current step.
    Current,
    InClique,
    Candidate,
    Excluded,
    /// Member of the best clique of a finished run.
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    Idle,
    InClique,
    Result,
}

/// One line of the recursion trace: a frame as it looked when entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    pub depth: usize,
    pub r: VertexSet,
    pub p: VertexSet,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Depth {}: R={}, P={}",
            self.depth,
            SetDisplay(&self.r),
            SetDisplay(&self.p)
        )
    }
}

/// A step handed to the presentation layer together with its cues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub step: Step,
    pub cues: SmallVec<[Cue; 2]>,
}

/// Graph, engine and run mode of one visualizer session.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    graph: GraphModel,
    run: Option<StepwiseRun>,
    mode: RunMode,
    last_step: Option<Step>,
    trace: Vec<TraceEntry>,
    /// Best clique and the graph revision it was computed for.
    result: Option<(u64, EngineResult)>,
    since_last_step: Duration,
    rng: GraphRng,
}

impl Default for Session {
    fn default() -> Self {
        let config = SessionConfig::default();
        let graph = GraphModel::with_min_distance(config.min_vertex_distance);
        Session::from_parts(config, graph)
    }
}

impl Session {
    /// Creates a session with an empty graph.
    pub fn new(config: SessionConfig) -> CliqueResult<Self> {
        config.validate()?;
        let graph = GraphModel::with_min_distance(config.min_vertex_distance);
        Ok(Session::from_parts(config, graph))
    }

    /// Creates a session around an existing graph.
    ///
    /// The graph adopts the configured `min_vertex_distance` for later
    /// insertions.
    pub fn with_graph(config: SessionConfig, mut graph: GraphModel) -> CliqueResult<Self> {
        config.validate()?;
        graph.set_min_distance(config.min_vertex_distance);
        Ok(Session::from_parts(config, graph))
    }

    fn from_parts(config: SessionConfig, graph: GraphModel) -> Self {
        let rng = build_rng(config.random.seed);
        Session {
            config,
            graph,
            run: None,
            mode: RunMode::Idle,
            last_step: None,
            trace: Vec::new(),
            result: None,
            since_last_step: Duration::ZERO,
            rng,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn run(&self) -> Option<&StepwiseRun> {
        self.run.as_ref()
    }

    /// The most recently pulled step of the current run.
    pub fn last_step(&self) -> Option<&Step> {
        self.last_step.as_ref()
    }

    /// Pseudocode line to highlight, if any.
    pub fn current_line(&self) -> Option<usize> {
        self.last_step.as_ref().and_then(Step::line)
    }

    /// Best clique of the last instant run or finished stepwise run, unless
    /// the graph changed since.
    pub fn best_clique(&self) -> Option<&EngineResult> {
        match &self.result {
            Some((revision, result)) if *revision == self.graph.revision() => Some(result),
            _ => None,
        }
    }

    /// Full recursion trace, outermost frame first.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// The innermost `limit` trace entries.
    pub fn recent_trace(&self, limit: usize) -> &[TraceEntry] {
        let start = self.trace.len().saturating_sub(limit);
        &self.trace[start..]
    }

    /// Replaces the graph with a random one. Any run is discarded first.
    pub fn random_graph(&mut self) -> &GraphModel {
        self.reset();
        self.graph = random_graph(
            &self.config.random,
            self.config.min_vertex_distance,
            &mut self.rng,
        );
        info!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            "random graph loaded"
        );
        &self.graph
    }

    /// Discards any run and computes the maximum clique in one go.
    pub fn run_instant(&mut self) -> EngineResult {
        self.reset();
        let result = run_to_completion(&self.graph);
        self.result = Some((self.graph.revision(), result.clone()));
        result
    }

    /// Discards any run and starts a fresh, auto-advancing stepwise run.
    pub fn start_stepwise(&mut self) {
        self.reset();
        self.run = Some(StepwiseRun::new(&self.graph));
        self.mode = RunMode::Running;
        info!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            "stepwise session started"
        );
    }

    pub fn pause(&mut self) -> CliqueResult<()> {
        if self.mode != RunMode::Running {
            return Err(self.refuse(CliqueError::NotRunning { mode: self.mode }));
        }
        self.mode = RunMode::Paused;
        debug!("run paused");
        Ok(())
    }

    pub fn resume(&mut self) -> CliqueResult<()> {
        if self.mode != RunMode::Paused {
            return Err(self.refuse(CliqueError::NotPaused { mode: self.mode }));
        }
        self.mode = RunMode::Running;
        self.since_last_step = Duration::ZERO;
        debug!("run resumed");
        Ok(())
    }

    /// Flips between `Running` and `Paused`; does nothing in other modes.
    pub fn toggle_pause(&mut self) -> RunMode {
        match self.mode {
            RunMode::Running => self.mode = RunMode::Paused,
            RunMode::Paused => {
                self.mode = RunMode::Running;
                self.since_last_step = Duration::ZERO;
            }
            RunMode::Idle | RunMode::Finished => {}
        }
        self.mode
    }

    /// Pulls exactly one step of a paused run.
    pub fn advance_one(&mut self) -> CliqueResult<Advance> {
        match self.mode {
            RunMode::Paused => self.pull(),
            RunMode::Finished => Err(self.refuse(CliqueError::RunExhausted)),
            mode => Err(self.refuse(CliqueError::NotPaused { mode })),
        }
    }

    /// Feeds elapsed wall time to the auto-advance timer.
    ///
    /// While `Running`, a step is pulled once the time accumulated since the
    /// previous step strictly exceeds the configured delay. At most one step is
    /// pulled per tick.
    pub fn tick(&mut self, elapsed: Duration) -> CliqueResult<Option<Advance>> {
        if self.mode != RunMode::Running {
            return Ok(None);
        }
        self.since_last_step += elapsed;
        if self.since_last_step <= self.config.step_delay() {
            return Ok(None);
        }
        self.since_last_step = Duration::ZERO;
        self.pull().map(Some)
    }

    /// Discards the run and all derived state; the graph is untouched.
    pub fn reset(&mut self) {
        self.run = None;
        self.mode = RunMode::Idle;
        self.last_step = None;
        self.trace.clear();
        self.result = None;
        self.since_last_step = Duration::ZERO;
    }

    pub fn add_vertex(&mut self, position: Position) -> CliqueResult<Option<VertexId>> {
        self.ensure_editable()?;
        let id = self.graph.add_vertex(position);
        if id.is_some() {
            self.reset();
        }
        Ok(id)
    }

    pub fn remove_vertex(&mut self, id: VertexId) -> CliqueResult<bool> {
        self.ensure_editable()?;
        let removed = self.graph.remove_vertex(id);
        if removed {
            self.reset();
        }
        Ok(removed)
    }

    pub fn toggle_edge(&mut self, u: VertexId, v: VertexId) -> CliqueResult<EdgeToggle> {
        self.ensure_editable()?;
        let toggle = self.graph.toggle_edge(u, v).map_err(|err| self.refuse(err))?;
        self.reset();
        Ok(toggle)
    }

    /// Vertex under `position`, using the configured hit radius.
    pub fn vertex_at(&self, position: Position) -> Option<VertexId> {
        self.graph.vertex_at(position, self.config.hit_radius)
    }

    /// How `id` should be highlighted right now.
    pub fn vertex_role(&self, id: VertexId) -> VertexRole {
        if let Some(step) = self.active_step() {
            return if step.current == Some(id) {
                VertexRole::Current
            } else if step.r.contains(&id) {
                VertexRole::InClique
            } else if step.p.contains(&id) {
                VertexRole::Candidate
            } else if step.x.contains(&id) {
                VertexRole::Excluded
            } else {
                VertexRole::Idle
            };
        }
        match self.best_clique() {
            Some(result) if result.contains(id) => VertexRole::Result,
            _ => VertexRole::Idle,
        }
    }

    /// How the edge `u`–`v` should be highlighted right now.
    pub fn edge_role(&self, u: VertexId, v: VertexId) -> EdgeRole {
        if !self.graph.has_edge(u, v) {
            return EdgeRole::Idle;
        }
        if let Some(step) = self.active_step() {
            return if step.r.contains(&u) && step.r.contains(&v) {
                EdgeRole::InClique
            } else {
                EdgeRole::Idle
            };
        }
        match self.best_clique() {
            Some(result) if result.contains(u) && result.contains(v) => EdgeRole::Result,
            _ => EdgeRole::Idle,
        }
    }

    /// Last step of a run that has not finished yet.
    fn active_step(&self) -> Option<&Step> {
        self.last_step.as_ref().filter(|step| !step.is_finished())
    }

    fn pull(&mut self) -> CliqueResult<Advance> {
        let run = self.run.as_mut().ok_or(CliqueError::RunExhausted)?;
        let step = run.advance()?;
        match step.kind {
            StepKind::EnterFrame => {
                self.trace.truncate(step.depth);
                self.trace.push(TraceEntry {
                    depth: step.depth,
                    r: step.r.clone(),
                    p: step.p.clone(),
                });
            }
            StepKind::Finished => {
                self.mode = RunMode::Finished;
                if let Some(result) = run.result() {
                    self.result = Some((self.graph.revision(), result));
                }
            }
            _ => {}
        }
        self.last_step = Some(step.clone());
        let cues = Cue::for_step(&step);
        Ok(Advance { step, cues })
    }

    fn ensure_editable(&self) -> CliqueResult<()> {
        match self.mode {
            RunMode::Running | RunMode::Paused => {
                Err(self.refuse(CliqueError::RunInProgress { mode: self.mode }))
            }
            RunMode::Idle | RunMode::Finished => Ok(()),
        }
    }

    fn refuse(&self, err: CliqueError) -> CliqueError {
        warn!(mode = %self.mode, error = %err, "command refused");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomGraphConfig;

    fn triangle_session() -> Session {
        let graph = GraphModel::from_edges(3, &[(1, 2), (1, 3), (2, 3)]).unwrap();
        Session::with_graph(SessionConfig::default(), graph).unwrap()
    }

    fn set(values: &[u32]) -> VertexSet {
        values.iter().copied().map(VertexId).collect()
    }

    const SLOW: Duration = Duration::from_millis(1001);

    #[test]
    fn stepwise_lifecycle() {
        let mut session = triangle_session();
        assert_eq!(session.mode(), RunMode::Idle);
        session.start_stepwise();
        assert_eq!(session.mode(), RunMode::Running);

        let mut kinds = Vec::new();
        while session.mode() == RunMode::Running {
            if let Some(advance) = session.tick(SLOW).unwrap() {
                kinds.push(advance.step.kind);
            }
        }
        assert_eq!(session.mode(), RunMode::Finished);
        assert_eq!(kinds.last(), Some(&StepKind::Finished));
        assert_eq!(session.best_clique().unwrap().clique, set(&[1, 2, 3]));
        assert!(matches!(
            session.advance_one(),
            Err(CliqueError::RunExhausted)
        ));
        assert_eq!(session.tick(SLOW).unwrap(), None);
    }

    #[test]
    fn tick_waits_for_the_delay() {
        let mut session = triangle_session();
        session.start_stepwise();
        assert_eq!(session.tick(Duration::from_millis(600)).unwrap(), None);
        assert_eq!(session.tick(Duration::from_millis(400)).unwrap(), None);
        let advance = session.tick(Duration::from_millis(1)).unwrap().unwrap();
        assert_eq!(advance.step.kind, StepKind::EnterFrame);
        assert_eq!(advance.cues.as_slice(), &[Cue::Step]);
        assert_eq!(session.tick(Duration::from_millis(1)).unwrap(), None);
    }

    #[test]
    fn manual_stepping_requires_pause() {
        let mut session = triangle_session();
        assert!(matches!(
            session.advance_one(),
            Err(CliqueError::NotPaused { mode: RunMode::Idle })
        ));
        session.start_stepwise();
        assert!(matches!(
            session.advance_one(),
            Err(CliqueError::NotPaused {
                mode: RunMode::Running
            })
        ));
        session.pause().unwrap();
        let first = session.advance_one().unwrap();
        assert_eq!(first.step.kind, StepKind::EnterFrame);
        assert_eq!(session.mode(), RunMode::Paused);
        // Paused runs ignore the timer.
        assert_eq!(session.tick(SLOW).unwrap(), None);
        assert_eq!(session.last_step().unwrap().kind, StepKind::EnterFrame);
        session.resume().unwrap();
        assert_eq!(session.mode(), RunMode::Running);
    }

    #[test]
    fn pause_and_resume_check_the_mode() {
        let mut session = triangle_session();
        assert!(matches!(
            session.pause(),
            Err(CliqueError::NotRunning { mode: RunMode::Idle })
        ));
        assert!(session.resume().is_err());
        assert_eq!(session.toggle_pause(), RunMode::Idle);
        session.start_stepwise();
        assert_eq!(session.toggle_pause(), RunMode::Paused);
        assert_eq!(session.toggle_pause(), RunMode::Running);
    }

    #[test]
    fn manual_steps_can_finish_a_run() {
        let mut session = triangle_session();
        session.start_stepwise();
        session.pause().unwrap();
        let mut cues = Vec::new();
        while session.mode() == RunMode::Paused {
            cues.extend(session.advance_one().unwrap().cues);
        }
        assert_eq!(session.mode(), RunMode::Finished);
        assert_eq!(cues.iter().filter(|&&c| c == Cue::Found).count(), 1);
        assert_eq!(cues.last(), Some(&Cue::Finish));
        assert_eq!(session.current_line(), None);
    }

    #[test]
    fn edits_are_refused_during_a_run() {
        let mut session = triangle_session();
        session.start_stepwise();
        let revision = session.graph().revision();
        assert!(matches!(
            session.toggle_edge(VertexId(1), VertexId(2)),
            Err(CliqueError::RunInProgress { .. })
        ));
        session.pause().unwrap();
        assert!(session.add_vertex(Position::new(900.0, 900.0)).is_err());
        assert!(session.remove_vertex(VertexId(1)).is_err());
        assert_eq!(session.graph().revision(), revision);
        assert_eq!(session.mode(), RunMode::Paused);
    }

    #[test]
    fn edits_after_a_run_invalidate_the_result() {
        let mut session = triangle_session();
        let result = session.run_instant();
        assert_eq!(result.size(), 3);
        assert_eq!(session.vertex_role(VertexId(2)), VertexRole::Result);
        assert_eq!(session.edge_role(VertexId(1), VertexId(2)), EdgeRole::Result);

        session.toggle_edge(VertexId(1), VertexId(2)).unwrap();
        assert!(session.best_clique().is_none());
        assert_eq!(session.vertex_role(VertexId(2)), VertexRole::Idle);
        assert_eq!(session.mode(), RunMode::Idle);
    }

    #[test]
    fn self_loop_toggle_leaves_state_unchanged() {
        let mut session = triangle_session();
        session.run_instant();
        assert!(matches!(
            session.toggle_edge(VertexId(3), VertexId(3)),
            Err(CliqueError::SelfLoop { .. })
        ));
        assert_eq!(session.best_clique().unwrap().size(), 3);
    }

    #[test]
    fn rejected_vertex_keeps_results() {
        let mut session = triangle_session();
        session.run_instant();
        let crowded = session.graph().position(VertexId(1)).unwrap();
        assert_eq!(session.add_vertex(crowded).unwrap(), None);
        assert!(session.best_clique().is_some());
    }

    #[test]
    fn roles_follow_the_last_step() {
        let graph = GraphModel::from_edges(3, &[(1, 2)]).unwrap();
        let mut session = Session::with_graph(SessionConfig::default(), graph).unwrap();
        session.start_stepwise();
        session.pause().unwrap();
        // EnterFrame, CheckEmpty, IterateStart, SelectCandidate(1)
        for _ in 0..4 {
            session.advance_one().unwrap();
        }
        assert_eq!(session.current_line(), Some(4));
        assert_eq!(session.vertex_role(VertexId(1)), VertexRole::Current);
        assert_eq!(session.vertex_role(VertexId(2)), VertexRole::Candidate);
        // Descend(1), EnterFrame at depth 1 with R = {1}
        session.advance_one().unwrap();
        session.advance_one().unwrap();
        assert_eq!(session.vertex_role(VertexId(1)), VertexRole::InClique);
        assert_eq!(session.vertex_role(VertexId(3)), VertexRole::Idle);
        assert_eq!(session.edge_role(VertexId(1), VertexId(2)), EdgeRole::Idle);
        assert_eq!(session.edge_role(VertexId(2), VertexId(3)), EdgeRole::Idle);
    }

    #[test]
    fn trace_tracks_entered_frames() {
        let mut session = triangle_session();
        session.start_stepwise();
        session.pause().unwrap();
        while session.trace().len() < 4 {
            session.advance_one().unwrap();
        }
        let lines: Vec<String> = session.trace().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "Depth 0: R=[], P=[1, 2, 3]",
                "Depth 1: R=[1], P=[2, 3]",
                "Depth 2: R=[1, 2], P=[3]",
                "Depth 3: R=[1, 2, 3], P=[]",
            ]
        );
        assert_eq!(session.recent_trace(2).len(), 2);
        assert_eq!(session.recent_trace(2)[0].depth, 2);

        // The next frame entered is R = {1, 3} at depth 2, replacing the old tail.
        while session.last_step().map(|s| s.kind) != Some(StepKind::EnterFrame)
            || session.trace().len() == 4
        {
            session.advance_one().unwrap();
        }
        let tail = session.trace().last().unwrap();
        assert_eq!(tail.depth, 2);
        assert_eq!(tail.r, set(&[1, 3]));
        assert_eq!(session.trace().len(), 3);
    }

    #[test]
    fn reset_keeps_topology() {
        let mut session = triangle_session();
        session.start_stepwise();
        session.tick(SLOW).unwrap();
        session.reset();
        assert_eq!(session.mode(), RunMode::Idle);
        assert!(session.last_step().is_none());
        assert!(session.trace().is_empty());
        assert!(session.run().is_none());
        assert_eq!(session.graph().edge_count(), 3);
    }

    #[test]
    fn random_graph_discards_the_run() {
        let config = SessionConfig {
            random: RandomGraphConfig {
                seed: Some(11),
                ..RandomGraphConfig::default()
            },
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        session.start_stepwise();
        let vertices = session.random_graph().vertex_count();
        assert!(vertices >= 1);
        assert_eq!(session.mode(), RunMode::Idle);
        assert!(session.run().is_none());
        assert_eq!(session.graph().vertex_ids().first(), Some(&VertexId(1)));
    }

    #[test]
    fn restarting_builds_a_fresh_run() {
        let mut session = triangle_session();
        session.start_stepwise();
        while session.mode() == RunMode::Running {
            session.tick(SLOW).unwrap();
        }
        session.start_stepwise();
        assert_eq!(session.mode(), RunMode::Running);
        assert_eq!(session.run().unwrap().steps_emitted(), 0);
        assert!(session.best_clique().is_none());
    }

    #[test]
    fn hit_testing_uses_configured_radius() {
        let session = triangle_session();
        assert_eq!(session.vertex_at(Position::new(3.0, 4.0)), Some(VertexId(1)));
        assert_eq!(session.vertex_at(Position::new(50.0, 0.0)), None);
    }

    #[test]
    fn existing_graph_adopts_configured_spacing() {
        let config = SessionConfig {
            min_vertex_distance: 30.0,
            ..SessionConfig::default()
        };
        let mut session = Session::with_graph(config, GraphModel::new()).unwrap();
        assert_eq!(session.graph().min_distance(), 30.0);
        assert_eq!(
            session.add_vertex(Position::new(0.0, 0.0)).unwrap(),
            Some(VertexId(1))
        );
        assert_eq!(
            session.add_vertex(Position::new(0.0, 40.0)).unwrap(),
            Some(VertexId(2))
        );
        assert_eq!(session.add_vertex(Position::new(0.0, 60.0)).unwrap(), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            hit_radius: -1.0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(CliqueError::InvalidConfig { .. })
        ));
    }
}
