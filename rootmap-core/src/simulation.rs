//! End-to-end Rootmap run.
//!
//! 1. Validate the [`Config`]; nothing is grown if it is rejected.
//! 2. Grow the primary trajectory from `origin` / `initial_direction`.
//! 3. Spawn and grow one secondary per interior anchor of the primary.
//!
//! The resulting [`RootSystem`] is handed to a renderer as-is.

use log::{info, warn};

use crate::{
    branch::{SecondaryRoot, SpawnAborted, spawn_secondaries},
    config::Config,
    error::SimulationError,
    random::UniformSource,
    trajectory::{RootTrajectory, grow},
    types::{AnchorIndex, RootState},
};

/// A primary root and the secondaries branching off it.
#[derive(Clone, Debug, PartialEq)]
pub struct RootSystem {
    pub primary: RootTrajectory,
    /// Ordered by ascending anchor index.
    pub secondaries: Vec<SecondaryRoot>,
}

impl RootSystem {
    /// Secondary anchored at `anchor`, if any.
    pub fn secondary_at(&self, anchor: AnchorIndex) -> Option<&SecondaryRoot> {
        self.secondaries
            .binary_search_by_key(&anchor, |s| s.anchor)
            .ok()
            .map(|i| &self.secondaries[i])
    }

    /// Number of trajectories, primary included.
    pub fn trajectory_count(&self) -> usize {
        1 + self.secondaries.len()
    }

    /// Total number of states over all trajectories.
    pub fn state_count(&self) -> usize {
        self.primary.len()
            + self
                .secondaries
                .iter()
                .map(|s| s.trajectory.len())
                .sum::<usize>()
    }
}

/// Runs one simulation, drawing every random number from `source`.
///
/// ### Parameters
/// - `config` - Step count, growth parameters of both root kinds, start
///   state, retry budget and branch seeding.
/// - `source` - Uniform draws, consumed in a fixed order: the primary's
///   steps first, then per anchor three damping draws followed by that
///   secondary's steps.
///
/// ### Returns
/// The complete [`RootSystem`]: a primary of `config.step_count` states and
/// one secondary per interior anchor.
///
/// ### Errors
/// - [`SimulationError::Config`] before anything is grown.
/// - [`SimulationError::PrimaryAborted`] if a primary step fails.
/// - [`SimulationError::SecondaryAborted`] if a secondary step fails; the
///   error carries the primary and all secondaries completed so far.
pub fn run<S: UniformSource + ?Sized>(
    config: &Config,
    source: &mut S,
) -> Result<RootSystem, SimulationError> {
    config.validate()?;
    info!(
        "growing primary root: {} steps, branch seeding {:?}",
        config.step_count, config.branch_seeding
    );

    let initial = RootState::new(config.origin, config.initial_direction);
    let primary = grow(
        initial,
        config.step_count,
        &config.primary,
        source,
        config.max_draw_retries,
    )
    .map_err(|e| {
        warn!("primary root aborted: {}", e);
        SimulationError::PrimaryAborted(e)
    })?;

    match spawn_secondaries(
        &primary,
        &config.secondary,
        config.branch_seeding,
        source,
        config.max_draw_retries,
    ) {
        Ok(secondaries) => {
            let system = RootSystem {
                primary,
                secondaries,
            };
            info!(
                "root system grown: {} trajectories, {} states",
                system.trajectory_count(),
                system.state_count()
            );
            Ok(system)
        }
        Err(SpawnAborted {
            anchor,
            completed,
            error,
        }) => {
            warn!("secondary root at anchor {} aborted: {}", anchor, error);
            Err(SimulationError::SecondaryAborted {
                anchor,
                partial: Box::new(RootSystem {
                    primary,
                    secondaries: completed,
                }),
                error,
            })
        }
    }
}
