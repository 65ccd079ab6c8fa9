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

//! Human-readable descriptions of steps.
//!
//! Steps stay structured; text is produced only when a presentation layer asks
//! for it, through the [`fmt::Display`] impl of [`Narrative`].

use std::fmt;

use super::step::{Step, StepKind};
use crate::graph::VertexSet;

/// Display adapter rendering a step as one English sentence.
#[derive(Debug, Clone, Copy)]
pub struct Narrative<'a>(&'a Step);

impl Step {
    pub fn narrative(&self) -> Narrative<'_> {
        Narrative(self)
    }
}

/// Formats a set as `[1, 2, 3]`, in set order.
pub struct SetDisplay<'a>(pub &'a VertexSet);

impl fmt::Display for SetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Display for Narrative<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = self.0;
        let (r, p, x) = (SetDisplay(&step.r), SetDisplay(&step.p), SetDisplay(&step.x));
        let v = step
            .current
            .map_or_else(|| "?".to_string(), |v| v.to_string());
        match step.kind {
            StepKind::EnterFrame => write!(
                f,
                "Calling BronKerbosch at depth {}. R={r}, P={p}, X={x}",
                step.depth
            ),
            StepKind::CheckEmpty => write!(
                f,
                "Checking whether P (candidates) and X (excluded) are both empty: P={p}, X={x}"
            ),
            StepKind::ReportClique => {
                write!(f, "P and X are empty! Found maximal clique {r}")?;
                if step.is_new_best {
                    f.write_str(", the best so far")?;
                }
                f.write_str(".")
            }
            StepKind::NewBest => write!(
                f,
                "Clique {r} (size {}) is the LARGEST found so far!",
                step.r.len()
            ),
            StepKind::IterateStart => write!(f, "Iterating over every vertex v in P: {p}"),
            StepKind::SelectCandidate => write!(f, "Choosing vertex {v} from P to process."),
            StepKind::Descend => {
                write!(f, "Recursing: add {v} to R and keep only neighbours of {v}")?;
                if let Some(neighbors) = &step.neighbors {
                    write!(f, " ({})", SetDisplay(neighbors))?;
                }
                f.write_str(" in P and X.")
            }
            StepKind::Backtrack => write!(
                f,
                "Back from recursion. Moving {v} from P to X (already processed)."
            ),
            StepKind::Finished => {
                f.write_str("Algorithm finished. The maximum clique is highlighted.")
            }
        }
    }
}
