//! Secondary roots derived from a grown primary trajectory.
//!
//! Every interior state `j` of the primary (`1 <= j < len - 1`) anchors one
//! secondary axis. The secondary starts at the anchor position with the
//! anchor heading damped component-wise by independent uniform factors,
//! and grows `len - j` states with the secondary parameters, so axes
//! anchored further along the primary are shorter.

use glam::DVec3;
use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    config::{BranchSeeding, GrowthParameters},
    error::{GrowthError, StepError},
    random::UniformSource,
    trajectory::{RootTrajectory, grow},
    types::{AnchorIndex, RootState},
};

/// A secondary root together with the primary index it branches from.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryRoot {
    pub anchor: AnchorIndex,
    pub trajectory: RootTrajectory,
}

/// Branch spawning stopped at `anchor`; `completed` holds every secondary
/// grown before it.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnAborted {
    pub anchor: AnchorIndex,
    pub completed: Vec<SecondaryRoot>,
    pub error: GrowthError,
}

/// Anchor indices of a primary of the given length, ascending.
pub fn anchor_indices(primary_len: usize) -> std::ops::Range<AnchorIndex> {
    1..primary_len.saturating_sub(1).max(1)
}

/// Scales each heading component by its own uniform draw, in x, y, z order.
pub fn damp_direction<S: UniformSource + ?Sized>(
    direction: DVec3,
    source: &mut S,
) -> Result<DVec3, StepError> {
    let mut factor = || source.next_uniform().ok_or(StepError::SourceExhausted);
    let fx = factor()?;
    let fy = factor()?;
    let fz = factor()?;
    Ok(direction * DVec3::new(fx, fy, fz))
}

/// Grows the single secondary anchored at `anchor`.
///
/// Consumes three draws for the damped heading, then one per growth step.
///
/// ### Parameters
/// - `primary` - Fully grown primary trajectory.
/// - `anchor` - Index into `primary`; any in-bounds index works, including
///   the last one.
/// - `params` - Secondary growth parameters.
/// - `source` - Uniform draws for damping and growth.
/// - `max_draw_retries` - Extra draws allowed when a draw is exactly zero.
///
/// ### Returns
/// A [`SecondaryRoot`] of `primary.len() - anchor` states starting at the
/// anchor position, or the [`GrowthError`] of the first failing draw or step.
///
/// ### Panics
/// Panics if `anchor` is out of bounds for `primary`.
pub fn spawn_secondary<S: UniformSource + ?Sized>(
    primary: &RootTrajectory,
    anchor: AnchorIndex,
    params: &GrowthParameters,
    source: &mut S,
    max_draw_retries: usize,
) -> Result<SecondaryRoot, GrowthError> {
    let base = primary[anchor];
    let direction = damp_direction(base.direction, source).map_err(|kind| GrowthError {
        step: 0,
        kind,
        grown: RootTrajectory::default(),
    })?;

    let length = primary.len() - anchor;
    let trajectory = grow(
        RootState::new(base.position, direction),
        length,
        params,
        source,
        max_draw_retries,
    )?;
    debug!("secondary at anchor {} grown to {} states", anchor, trajectory.len());

    Ok(SecondaryRoot { anchor, trajectory })
}

/// Seed of the independent stream for the branch at `anchor`.
pub fn branch_seed(base_seed: u64, anchor: AnchorIndex) -> u64 {
    base_seed ^ (anchor as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Spawns one secondary per interior anchor of `primary`, in ascending
/// anchor order.
///
/// With [`BranchSeeding::Shared`] every draw comes from `source`, so the
/// draw order is: three damping draws for anchor 1, its growth draws, then
/// anchor 2, and so on. With [`BranchSeeding::Independent`] `source` is not
/// touched.
///
/// ### Returns
/// All secondaries, or a [`SpawnAborted`] holding the secondaries completed
/// before the failing anchor.
pub fn spawn_secondaries<S: UniformSource + ?Sized>(
    primary: &RootTrajectory,
    params: &GrowthParameters,
    seeding: BranchSeeding,
    source: &mut S,
    max_draw_retries: usize,
) -> Result<Vec<SecondaryRoot>, SpawnAborted> {
    let anchors = anchor_indices(primary.len());
    let mut completed = Vec::with_capacity(anchors.len());

    for anchor in anchors {
        let spawned = match seeding {
            BranchSeeding::Shared => {
                spawn_secondary(primary, anchor, params, source, max_draw_retries)
            }
            BranchSeeding::Independent { base_seed } => {
                let mut rng = StdRng::seed_from_u64(branch_seed(base_seed, anchor));
                spawn_secondary(primary, anchor, params, &mut rng, max_draw_retries)
            }
        };

        match spawned {
            Ok(root) => completed.push(root),
            Err(error) => {
                return Err(SpawnAborted {
                    anchor,
                    completed,
                    error,
                });
            }
        }
    }

    Ok(completed)
}
