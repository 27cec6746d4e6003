use glam::DVec3;

use crate::{error::ConfigError, types::RootRole};

/// Growth parameters of one root axis.
///
/// `flexure` and `gravitropism` both end up as divisors in the angle model,
/// so `flexure` must be non-zero and `gravitropism` must differ from 100.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthParameters {
    /// Elongation rate `W`.
    pub elongation_rate: f64,
    /// Time-step size `T`.
    pub time_step: f64,
    /// Flexure index `D`; smaller values spread the new headings wider.
    pub flexure: f64,
    /// Gravitropism index `G`; biases the azimuthal turn.
    pub gravitropism: f64,
}

impl GrowthParameters {
    /// `{W: 1, T: 1, D: 30, G: 65}`
    pub const PRIMARY: Self = Self::new(1.0, 1.0, 30.0, 65.0);
    /// `{W: 0.3, T: 1, D: 30, G: 0}`
    pub const SECONDARY: Self = Self::new(0.3, 1.0, 30.0, 0.0);

    /// Parameters in `W, T, D, G` order; not validated.
    pub const fn new(
        elongation_rate: f64,
        time_step: f64,
        flexure: f64,
        gravitropism: f64,
    ) -> Self {
        Self {
            elongation_rate,
            time_step,
            flexure,
            gravitropism,
        }
    }

    /// Distance covered per unit of heading in one step, `W·T`.
    #[inline]
    pub fn displacement_scale(&self) -> f64 {
        self.elongation_rate * self.time_step
    }

    pub fn validate(&self, role: RootRole) -> Result<(), ConfigError> {
        let invalid = |reason| ConfigError::InvalidGrowthParameters { role, reason };

        if !(self.elongation_rate.is_finite()
            && self.time_step.is_finite()
            && self.flexure.is_finite()
            && self.gravitropism.is_finite())
        {
            return Err(invalid("all parameters must be finite"));
        }
        if self.flexure == 0.0 {
            return Err(invalid("flexure index D must be non-zero"));
        }
        if self.gravitropism == 100.0 {
            return Err(invalid("gravitropism index G must not equal 100"));
        }
        Ok(())
    }
}

/// How secondary roots draw their random numbers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchSeeding {
    /// All branches continue the caller's stream, in anchor order.
    #[default]
    Shared,
    /// Each branch gets its own `StdRng` seeded from `base_seed` and its
    /// anchor index. Branches then no longer depend on each other's draws.
    Independent { base_seed: u64 },
}

/// Configuration of one simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Length of the primary trajectory, initial state included.
    pub step_count: usize,
    pub primary: GrowthParameters,
    pub secondary: GrowthParameters,
    pub origin: DVec3,
    pub initial_direction: DVec3,
    /// Extra draws allowed when the uniform draw comes out exactly zero.
    pub max_draw_retries: usize,
    pub branch_seeding: BranchSeeding,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step_count: 300,
            primary: GrowthParameters::PRIMARY,
            secondary: GrowthParameters::SECONDARY,
            origin: DVec3::ZERO,
            initial_direction: DVec3::ZERO,
            max_draw_retries: 64,
            branch_seeding: BranchSeeding::Shared,
        }
    }
}

impl Config {
    /// Rejects configurations that would fail deep inside a growth step.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.primary.validate(RootRole::Primary)?;
        self.secondary.validate(RootRole::Secondary)?;

        if self.step_count == 0 {
            return Err(ConfigError::ZeroStepCount);
        }
        if self.max_draw_retries == 0 {
            return Err(ConfigError::ZeroRetryBudget);
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::NonFiniteVector { field: "origin" });
        }
        if !self.initial_direction.is_finite() {
            return Err(ConfigError::NonFiniteVector {
                field: "initial_direction",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_setup() {
        let cfg = Config::default();
        assert_eq!(cfg.step_count, 300);
        assert_eq!(cfg.primary, GrowthParameters::new(1.0, 1.0, 30.0, 65.0));
        assert_eq!(cfg.secondary, GrowthParameters::new(0.3, 1.0, 30.0, 0.0));
        assert_eq!(cfg.origin, DVec3::ZERO);
        assert_eq!(cfg.initial_direction, DVec3::ZERO);
        assert_eq!(cfg.branch_seeding, BranchSeeding::Shared);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_flexure_is_rejected() {
        let mut cfg = Config::default();
        cfg.primary.flexure = 0.0;

        match cfg.validate() {
            Err(ConfigError::InvalidGrowthParameters { role, .. }) => {
                assert_eq!(role, RootRole::Primary)
            }
            other => panic!("expected invalid parameters, got {:?}", other),
        }
    }

    #[test]
    fn gravitropism_of_one_hundred_is_rejected() {
        let mut cfg = Config::default();
        cfg.secondary.gravitropism = 100.0;

        match cfg.validate() {
            Err(ConfigError::InvalidGrowthParameters { role, .. }) => {
                assert_eq!(role, RootRole::Secondary)
            }
            other => panic!("expected invalid parameters, got {:?}", other),
        }
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        let params = GrowthParameters::new(f64::NAN, 1.0, 30.0, 65.0);
        assert!(params.validate(RootRole::Primary).is_err());
    }

    #[test]
    fn zero_step_count_and_retry_budget_are_rejected() {
        let mut cfg = Config::default();
        cfg.step_count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroStepCount));

        let mut cfg = Config::default();
        cfg.max_draw_retries = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRetryBudget));
    }

    #[test]
    fn non_finite_origin_is_rejected() {
        let mut cfg = Config::default();
        cfg.origin = DVec3::new(0.0, f64::INFINITY, 0.0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonFiniteVector { field: "origin" })
        );
    }

    #[test]
    fn displacement_scale_is_rate_times_step() {
        let params = GrowthParameters::new(0.3, 2.0, 30.0, 0.0);
        assert!((params.displacement_scale() - 0.6).abs() < 1e-12);
    }
}
