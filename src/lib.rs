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

//! A step-by-step Bron-Kerbosch maximal clique engine for interactive
//! visualizers.
//!
//! * [`graph`]: the editable graph ([`GraphModel`]) and random generation.
//! * [`engine`]: instant search ([`run_to_completion`]) and the suspendable,
//!   pull-based [`StepwiseRun`] that yields one [`Step`] per observable event.
//! * [`session`]: a driver tying a graph, a run and a run mode together, as a
//!   UI would use it.
//! * [`validate`]: brute-force checks used to verify results.
//!
//! ```
//! use clique_stepper::{GraphModel, StepKind, StepwiseRun};
//!
//! let graph = GraphModel::from_edges(4, &[(1, 2), (3, 4)]).unwrap();
//! let mut run = StepwiseRun::new(&graph);
//! let new_best = run.by_ref().filter(|step| step.kind == StepKind::NewBest).count();
//! assert_eq!(new_best, 1);
//! assert_eq!(run.result().unwrap().size(), 2);
//! ```

pub mod config;
pub mod engine;
mod error;
pub mod graph;
pub mod session;
pub mod validate;

pub use config::SessionConfig;
pub use engine::{
    maximal_cliques, run_to_completion, EngineResult, Step, StepKind, StepwiseRun, PSEUDOCODE,
};
pub use error::{CliqueError, CliqueResult};
pub use graph::{EdgeToggle, GraphModel, Position, VertexId, VertexSet};
pub use session::{Cue, RunMode, Session};
