use glam::DVec3;

use crate::{
    config::GrowthParameters,
    error::{GrowthError, StepError},
    random::UniformSource,
    sampler::sample_direction,
    types::RootState,
};

/// Ordered states of one root axis, built once by [`grow`] and read-only
/// afterwards.
///
/// For every consecutive pair, `next.position = prev.position +
/// W·T·next.direction`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RootTrajectory {
    states: Vec<RootState>,
}

impl RootTrajectory {
    /// Number of states, initial state included.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// States in growth order.
    pub fn states(&self) -> &[RootState] {
        &self.states
    }

    pub fn get(&self, index: usize) -> Option<&RootState> {
        self.states.get(index)
    }

    pub fn first(&self) -> Option<&RootState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&RootState> {
        self.states.last()
    }

    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.states.iter().map(|s| s.position)
    }

    pub fn directions(&self) -> impl Iterator<Item = DVec3> + '_ {
        self.states.iter().map(|s| s.direction)
    }
}

impl std::ops::Index<usize> for RootTrajectory {
    type Output = RootState;

    fn index(&self, index: usize) -> &RootState {
        &self.states[index]
    }
}

/// Advances `state` by one growth step.
///
/// Samples a new heading from `state.direction` and moves the position by
/// `W·T` times that heading.
///
/// ### Parameters
/// - `state` - State to advance from.
/// - `params` - Elongation, time step, flexure and gravitropism of the axis.
/// - `source` - Uniform draws for the heading.
/// - `max_draw_retries` - Extra draws allowed when a draw is exactly zero.
///
/// ### Returns
/// The next state, or the [`StepError`] raised while sampling its heading.
pub fn step<S: UniformSource + ?Sized>(
    state: &RootState,
    params: &GrowthParameters,
    source: &mut S,
    max_draw_retries: usize,
) -> Result<RootState, StepError> {
    let direction = sample_direction(
        state.direction,
        params.flexure,
        params.gravitropism,
        source,
        max_draw_retries,
    )?;
    let position = state.position + params.displacement_scale() * direction;
    Ok(RootState::new(position, direction))
}

/// Grows a trajectory of exactly `length` states starting at `initial`.
///
/// Entry 0 is `initial` unchanged; every later entry is [`step`] applied to
/// its predecessor. A `length` of 0 is treated as 1.
///
/// ### Parameters
/// - `initial` - First state, stored unchanged.
/// - `length` - Number of states to produce, `initial` included.
/// - `params` - Growth parameters applied at every step.
/// - `source` - Uniform draws, one per step plus zero-draw retries.
/// - `max_draw_retries` - Extra draws allowed per step when a draw is
///   exactly zero.
///
/// ### Returns
/// The grown [`RootTrajectory`] of `length` states.
///
/// ### Errors
/// The first failing step aborts growth; the [`GrowthError`] carries the
/// states built up to that point.
pub fn grow<S: UniformSource + ?Sized>(
    initial: RootState,
    length: usize,
    params: &GrowthParameters,
    source: &mut S,
    max_draw_retries: usize,
) -> Result<RootTrajectory, GrowthError> {
    let mut states = Vec::with_capacity(length.max(1));
    states.push(initial);

    let mut current = initial;
    for i in 1..length {
        match step(&current, params, source, max_draw_retries) {
            Ok(next) => {
                states.push(next);
                current = next;
            }
            Err(kind) => {
                return Err(GrowthError {
                    step: i,
                    kind,
                    grown: RootTrajectory { states },
                });
            }
        }
    }

    Ok(RootTrajectory { states })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ReplaySource;
    use rand::{SeedableRng, rngs::StdRng};

    fn origin_state() -> RootState {
        RootState::new(DVec3::ZERO, DVec3::ZERO)
    }

    #[test]
    fn step_moves_by_scaled_direction() {
        let params = GrowthParameters::new(0.5, 2.0, 30.0, 65.0);
        let start = RootState::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.3, 0.1, 0.2));
        let mut src = ReplaySource::new(vec![0.4]);

        let next = step(&start, &params, &mut src, 4).unwrap();

        let expected = start.position + 1.0 * next.direction;
        assert!((next.position - expected).length() < 1e-12);
    }

    #[test]
    fn grow_keeps_initial_state_and_requested_length() {
        let mut rng = StdRng::seed_from_u64(11);
        let initial = RootState::new(DVec3::new(5.0, -1.0, 0.0), DVec3::new(0.2, 0.0, 0.1));

        let traj = grow(initial, 40, &GrowthParameters::PRIMARY, &mut rng, 64).unwrap();

        assert_eq!(traj.len(), 40);
        assert_eq!(traj[0], initial);
    }

    #[test]
    fn grow_obeys_displacement_law() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = GrowthParameters::new(0.3, 1.5, 30.0, 0.0);

        let traj = grow(origin_state(), 60, &params, &mut rng, 64).unwrap();

        for pair in traj.states().windows(2) {
            let delta = pair[1].position - pair[0].position;
            let expected = params.displacement_scale() * pair[1].direction;
            assert!(
                (delta - expected).length() < 1e-9,
                "displacement mismatch: {:?} vs {:?}",
                delta,
                expected
            );
        }
    }

    #[test]
    fn single_state_trajectory_consumes_no_draws() {
        let mut src = ReplaySource::new(Vec::new());
        let traj = grow(origin_state(), 1, &GrowthParameters::SECONDARY, &mut src, 4).unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn grow_consumes_one_draw_per_step() {
        let mut src = ReplaySource::new(vec![0.5; 9]);
        let traj = grow(origin_state(), 10, &GrowthParameters::PRIMARY, &mut src, 4).unwrap();
        assert_eq!(traj.len(), 10);
        assert_eq!(src.consumed(), 9);
    }

    #[test]
    fn failed_step_returns_truncated_trajectory() {
        let mut src = ReplaySource::new(vec![0.5, 0.5]);
        let err = grow(origin_state(), 10, &GrowthParameters::PRIMARY, &mut src, 4).unwrap_err();

        assert_eq!(err.step, 3);
        assert_eq!(err.kind, StepError::SourceExhausted);
        assert_eq!(err.grown.len(), 3);
        assert_eq!(err.grown[0], origin_state());
    }

    #[test]
    fn positions_and_directions_follow_states() {
        let mut src = ReplaySource::new(vec![0.2, 0.7]);
        let traj = grow(origin_state(), 3, &GrowthParameters::PRIMARY, &mut src, 4).unwrap();

        let positions: Vec<DVec3> = traj.positions().collect();
        let directions: Vec<DVec3> = traj.directions().collect();
        assert_eq!(positions.len(), 3);
        assert_eq!(directions[2], traj[2].direction);
        assert_eq!(positions[1], traj[1].position);
    }
}
