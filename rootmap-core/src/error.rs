//! Error types for configuration, single growth steps, trajectories and
//! whole simulation runs.
//!
//! Per-step failures ([`StepError`]) abort the trajectory being built; the
//! states grown so far travel with the error in [`GrowthError`]. Completed
//! trajectories are never touched by a later failure, so a
//! [`SimulationError`] can always hand back whatever finished.

use std::fmt;

use crate::{
    simulation::RootSystem,
    trajectory::RootTrajectory,
    types::{AnchorIndex, RootRole},
};

/// Failure of a single direction sample / integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepError {
    /// The z-component fed to the colatitude inverse cosine left `[-1, 1]`
    /// after conversion to radians (or was not a number).
    InvalidColatitude {
        /// Raw z-component of the heading.
        z: f64,
    },
    /// Every draw within the retry budget was exactly zero.
    DegenerateRandomDraw {
        /// Number of draws taken before giving up.
        attempts: usize,
    },
    /// A finite random source ran out of draws.
    SourceExhausted,
    /// The deviation angles or the new heading overflowed to infinity or
    /// NaN, e.g. for a subnormal flexure index.
    NonFiniteHeading,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColatitude { z } => {
                write!(f, "colatitude undefined for direction z-component {}", z)
            }
            Self::DegenerateRandomDraw { attempts } => {
                write!(f, "uniform draw was zero {} times in a row", attempts)
            }
            Self::SourceExhausted => write!(f, "random source exhausted"),
            Self::NonFiniteHeading => write!(f, "sampled heading is not finite"),
        }
    }
}

impl std::error::Error for StepError {}

/// A trajectory whose growth was aborted part-way.
#[derive(Clone, Debug, PartialEq)]
pub struct GrowthError {
    /// Index of the state that could not be produced; 0 when the
    /// initial state itself could not be derived.
    pub step: usize,
    pub kind: StepError,
    /// States built before the failure.
    pub grown: RootTrajectory,
}

impl fmt::Display for GrowthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "growth aborted at step {}: {}", self.step, self.kind)
    }
}

impl std::error::Error for GrowthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Rejected configuration; raised before any position is computed.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    InvalidGrowthParameters {
        role: RootRole,
        reason: &'static str,
    },
    ZeroStepCount,
    ZeroRetryBudget,
    NonFiniteVector {
        field: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGrowthParameters { role, reason } => {
                write!(f, "invalid {} growth parameters: {}", role, reason)
            }
            Self::ZeroStepCount => write!(f, "step count must be at least 1"),
            Self::ZeroRetryBudget => write!(f, "random draw retry budget must be at least 1"),
            Self::NonFiniteVector { field } => write!(f, "{} must be finite", field),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Failure of a whole simulation run.
#[derive(Clone, Debug, PartialEq)]
pub enum SimulationError {
    /// Configuration was rejected; nothing was grown.
    Config(ConfigError),
    /// The primary axis could not be completed; no secondaries were spawned.
    PrimaryAborted(GrowthError),
    /// A secondary axis failed. `partial` holds the complete primary and
    /// every secondary finished before `anchor`.
    SecondaryAborted {
        anchor: AnchorIndex,
        partial: Box<RootSystem>,
        error: GrowthError,
    },
}

impl SimulationError {
    /// Completed trajectories, if the run got far enough to have any
    /// complete primary.
    pub fn partial(&self) -> Option<&RootSystem> {
        match self {
            Self::SecondaryAborted { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// The trajectory that was being grown when the run aborted.
    pub fn aborted_trajectory(&self) -> Option<&RootTrajectory> {
        match self {
            Self::Config(_) => None,
            Self::PrimaryAborted(error) | Self::SecondaryAborted { error, .. } => {
                Some(&error.grown)
            }
        }
    }
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "configuration rejected: {}", e),
            Self::PrimaryAborted(e) => write!(f, "primary root: {}", e),
            Self::SecondaryAborted { anchor, error, .. } => {
                write!(f, "secondary root at anchor {}: {}", anchor, error)
            }
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::PrimaryAborted(e) | Self::SecondaryAborted { error: e, .. } => Some(e),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
