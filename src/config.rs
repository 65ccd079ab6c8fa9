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

//! Session configuration.
//!
//! Every field has a default, so a JSON document only needs to name the values
//! it overrides:
//!
//! ```
//! use clique_stepper::config::SessionConfig;
//!
//! let config = SessionConfig::from_json(r#"{"step_delay_ms": 250, "random": {"seed": 9}}"#).unwrap();
//! assert_eq!(config.step_delay_ms, 250);
//! assert_eq!(config.random.seed, Some(9));
//! assert_eq!(config.random.max_vertices, 10);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CliqueError, CliqueResult};
use crate::graph::DEFAULT_MIN_VERTEX_DISTANCE;

/// Default auto-advance delay between two steps.
pub const DEFAULT_STEP_DELAY_MS: u64 = 1000;
/// Default radius used when hit testing vertices.
pub const DEFAULT_HIT_RADIUS: f64 = 22.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Auto-advance fires once strictly more than this many milliseconds
    /// elapsed since the previous step.
    pub step_delay_ms: u64,
    pub min_vertex_distance: f64,
    pub hit_radius: f64,
    pub random: RandomGraphConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            min_vertex_distance: DEFAULT_MIN_VERTEX_DISTANCE,
            hit_radius: DEFAULT_HIT_RADIUS,
            random: RandomGraphConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> CliqueResult<Self> {
        let config: SessionConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn validate(&self) -> CliqueResult<()> {
        if !(self.min_vertex_distance.is_finite() && self.min_vertex_distance >= 0.0) {
            return Err(invalid("min_vertex_distance must be a non-negative number"));
        }
        if !(self.hit_radius.is_finite() && self.hit_radius >= 0.0) {
            return Err(invalid("hit_radius must be a non-negative number"));
        }
        self.random.validate()
    }
}

/// Rectangle random vertices are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Area {
    fn default() -> Self {
        Area {
            min_x: 50.0,
            max_x: 950.0,
            min_y: 80.0,
            max_y: 700.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomGraphConfig {
    pub min_vertices: u32,
    pub max_vertices: u32,
    pub area: Area,
    pub min_spacing: f64,
    pub placement_attempts: u32,
    pub edge_probability: f64,
    /// Fixed seed for reproducible graphs; `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        RandomGraphConfig {
            min_vertices: 6,
            max_vertices: 10,
            area: Area::default(),
            min_spacing: 60.0,
            placement_attempts: 50,
            edge_probability: 0.35,
            seed: None,
        }
    }
}

impl RandomGraphConfig {
    pub fn validate(&self) -> CliqueResult<()> {
        if self.min_vertices > self.max_vertices {
            return Err(invalid("min_vertices must not exceed max_vertices"));
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            return Err(invalid("edge_probability must lie in [0, 1]"));
        }
        let area = &self.area;
        let finite = [area.min_x, area.max_x, area.min_y, area.max_y]
            .iter()
            .all(|value| value.is_finite());
        if !finite || area.min_x > area.max_x || area.min_y > area.max_y {
            return Err(invalid("area bounds must be finite and ordered"));
        }
        if !(self.min_spacing.is_finite() && self.min_spacing >= 0.0) {
            return Err(invalid("min_spacing must be a non-negative number"));
        }
        if self.placement_attempts == 0 {
            return Err(invalid("placement_attempts must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> CliqueError {
    CliqueError::InvalidConfig {
        reason: reason.to_string(),
    }
}
