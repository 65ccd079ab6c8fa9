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

//! Error type shared by the graph model, the step engine and the session.

use thiserror::Error;

use crate::graph::VertexId;
use crate::session::RunMode;

/// Errors produced by this crate.
///
/// Everything except the configuration variants is an "invalid operation":
/// a caller asked for something the current state does not allow. None of
/// them are fatal; the object that returned the error is left unchanged.
#[derive(Debug, Error)]
pub enum CliqueError {
    /// An edge from a vertex to itself was requested.
    #[error("self-loop edges are not allowed (vertex {vertex})")]
    SelfLoop { vertex: VertexId },

    /// An edge endpoint does not exist in the graph.
    #[error("vertex {vertex} does not exist")]
    UnknownVertex { vertex: VertexId },

    /// A step was pulled from a run that already emitted `Finished`.
    #[error("the stepwise run is exhausted; start a new run")]
    RunExhausted,

    /// The graph cannot be edited while a stepwise run is active.
    #[error("graph edits are not allowed while a run is {mode}")]
    RunInProgress { mode: RunMode },

    /// A manual single step requires the run to be paused.
    #[error("manual stepping requires a paused run (current mode: {mode})")]
    NotPaused { mode: RunMode },

    /// Pausing requires an auto-advancing run.
    #[error("no running stepwise run to pause (current mode: {mode})")]
    NotRunning { mode: RunMode },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl CliqueError {
    /// Returns `true` for errors caused by a disallowed operation, as opposed
    /// to a bad configuration.
    pub fn is_invalid_operation(&self) -> bool {
        !matches!(
            self,
            CliqueError::InvalidConfig { .. } | CliqueError::Config(_)
        )
    }
}

pub type CliqueResult<T> = Result<T, CliqueError>;
