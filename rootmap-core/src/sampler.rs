//! Stochastic direction update of Diggle's Rootmap model.
//!
//! One update:
//! 1. Build a [`GrowthFrame`] around the current heading from its
//!    colatitude `alpha` (from `z`) and azimuth `beta` (from `y / x`).
//! 2. Draw a non-zero uniform `R` and turn it into a polar deviation `phi`
//!    (scaled by the flexure index) and an azimuthal deviation `theta`
//!    (scaled by the gravitropism index), see [`DeviationAngles`].
//! 3. Map the unit deviation `(sin phi cos theta, sin phi sin theta, cos phi)`
//!    through the frame back into absolute coordinates.
//!
//! Both frame angles go through a second degrees-to-radians conversion
//! after the inverse trig call, and so do `phi` and `theta`. The frame is
//! not orthonormal in general, so the returned heading is not unit length
//! and must not be renormalized.

use std::f64::consts::PI;

use glam::{DMat3, DVec3};
use log::trace;

use crate::{
    error::StepError,
    random::{UniformSource, draw_nonzero},
};

/// Stand-in for an `x` heading component that is exactly zero.
///
/// The azimuth divides by `x`; substituting this value keeps the update
/// finite at the cost of slightly perturbing the result.
pub const DEGENERATE_X_EPSILON: f64 = 1e-5;

/// Local reference frame aligned with the current heading.
///
/// Rows mix sines and cosines of the frame angles with the raw heading
/// components; multiplying a local vector by it yields absolute coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthFrame {
    matrix: DMat3,
}

impl GrowthFrame {
    pub fn from_rows(r0: DVec3, r1: DVec3, r2: DVec3) -> Self {
        Self {
            matrix: DMat3::from_cols(r0, r1, r2).transpose(),
        }
    }

    /// Frame around `direction`, after the zero-`x` substitution.
    ///
    /// ### Errors
    /// [`StepError::InvalidColatitude`] when `z` in radians lies outside
    /// `[-1, 1]`.
    pub fn around(direction: DVec3) -> Result<Self, StepError> {
        let DVec3 { x, y, z } = guard_degenerate_x(direction);

        let alpha = colatitude(z)?;
        let beta = azimuth(x, y);
        let (sin_a, cos_a) = alpha.sin_cos();
        let (sin_b, cos_b) = beta.sin_cos();

        Ok(Self::from_rows(
            DVec3::new(cos_a * cos_b, -y * sin_a - z * cos_a * sin_b, x),
            DVec3::new(cos_a * sin_b, x * sin_a + z * cos_a * cos_b, y),
            DVec3::new(-sin_a, x * cos_a * sin_b - y * cos_a * cos_b, z),
        ))
    }

    #[inline]
    pub fn row(&self, index: usize) -> DVec3 {
        self.matrix.row(index)
    }

    /// Rotates a local-frame vector into absolute coordinates.
    #[inline]
    pub fn apply(&self, local: DVec3) -> DVec3 {
        self.matrix.mul_vec3(local)
    }
}

/// Polar (`phi`) and azimuthal (`theta`) deviation from the current heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviationAngles {
    pub phi: f64,
    pub theta: f64,
}

impl DeviationAngles {
    /// Angles for the non-zero uniform draw `r`.
    ///
    /// `phi = rad(200π·exp(ln(r/2)) / D)` and
    /// `theta = rad(100π·exp(ln r) / (G − 100))`.
    pub fn from_draw(r: f64, flexure: f64, gravitropism: f64) -> Self {
        let phi = (200.0 * PI * (r / 2.0).ln().exp() / flexure).to_radians();
        let theta = (100.0 * PI * r.ln().exp() / (gravitropism - 100.0)).to_radians();
        Self { phi, theta }
    }

    /// The deviation as a point on the unit sphere of the local frame.
    pub fn local_heading(&self) -> DVec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        DVec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi)
    }
}

/// Samples the next heading from `direction`.
///
/// Consumes one uniform draw, plus one per exactly-zero draw that had to be
/// resampled. A heading with an undefined colatitude fails before drawing.
///
/// ### Parameters
/// - `direction` - Current heading; not required to be unit length.
/// - `flexure` - Flexure index `D` scaling the polar deviation.
/// - `gravitropism` - Gravitropism index `G` scaling the azimuthal deviation.
/// - `source` - Uniform draws in `[0, 1)`.
/// - `max_draw_retries` - Extra draws allowed when a draw is exactly zero.
///
/// ### Returns
/// The new heading in absolute coordinates, or a [`StepError`] when the
/// colatitude is undefined, the draws give out, or the result is not finite.
pub fn sample_direction<S: UniformSource + ?Sized>(
    direction: DVec3,
    flexure: f64,
    gravitropism: f64,
    source: &mut S,
    max_draw_retries: usize,
) -> Result<DVec3, StepError> {
    let frame = GrowthFrame::around(direction)?;
    let r = draw_nonzero(source, max_draw_retries)?;
    let deviation = DeviationAngles::from_draw(r, flexure, gravitropism);
    if !(deviation.phi.is_finite() && deviation.theta.is_finite()) {
        return Err(StepError::NonFiniteHeading);
    }

    let heading = frame.apply(deviation.local_heading());
    if !heading.is_finite() {
        return Err(StepError::NonFiniteHeading);
    }
    Ok(heading)
}

fn guard_degenerate_x(direction: DVec3) -> DVec3 {
    if direction.x == 0.0 {
        trace!("heading x is zero, substituting {}", DEGENERATE_X_EPSILON);
        DVec3::new(DEGENERATE_X_EPSILON, direction.y, direction.z)
    } else {
        direction
    }
}

fn colatitude(z: f64) -> Result<f64, StepError> {
    let cos_alpha = z.to_radians();
    // NaN fails the range check as well.
    if !(-1.0..=1.0).contains(&cos_alpha) {
        return Err(StepError::InvalidColatitude { z });
    }
    Ok(cos_alpha.acos().to_radians())
}

fn azimuth(x: f64, y: f64) -> f64 {
    (y / x).to_radians().atan().to_radians()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ReplaySource;

    const EPS: f64 = 1e-12;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!(
            (a - b).abs().max_element() < EPS,
            "vectors differ: {:?} vs {:?}",
            a,
            b
        );
    }

    #[test]
    fn zero_x_heading_gives_finite_direction() {
        let mut src = ReplaySource::new(vec![0.3]);
        let dir = sample_direction(DVec3::new(0.0, 1.0, 0.0), 30.0, 65.0, &mut src, 8).unwrap();
        assert!(dir.is_finite());
        assert_eq!(src.consumed(), 1);
    }

    #[test]
    fn zero_heading_matches_closed_form() {
        // x = eps, y = z = 0: beta = 0 and alpha = rad(pi / 2).
        let r = 0.5;
        let mut src = ReplaySource::new(vec![r]);
        let dir = sample_direction(DVec3::ZERO, 30.0, 65.0, &mut src, 8).unwrap();

        let alpha = (PI / 2.0).to_radians();
        let phi = (200.0 * PI * (r / 2.0) / 30.0).to_radians();
        let theta = (100.0 * PI * r / -35.0).to_radians();
        let e = DEGENERATE_X_EPSILON;
        let expected = DVec3::new(
            alpha.cos() * phi.sin() * theta.cos() + e * phi.cos(),
            e * alpha.sin() * phi.sin() * theta.sin(),
            -alpha.sin() * phi.sin() * theta.cos(),
        );
        assert_close(dir, expected);
    }

    #[test]
    fn frame_rows_follow_heading_components() {
        let dir = DVec3::new(0.4, -0.2, 0.1);
        let frame = GrowthFrame::around(dir).unwrap();

        let alpha = (0.1f64).to_radians().acos().to_radians();
        let beta = (-0.2f64 / 0.4).to_radians().atan().to_radians();
        let (sa, ca) = alpha.sin_cos();
        let (sb, cb) = beta.sin_cos();

        assert_close(frame.row(0), DVec3::new(ca * cb, 0.2 * sa - 0.1 * ca * sb, 0.4));
        assert_close(frame.row(1), DVec3::new(ca * sb, 0.4 * sa + 0.1 * ca * cb, -0.2));
        assert_close(frame.row(2), DVec3::new(-sa, 0.4 * ca * sb + 0.2 * ca * cb, 0.1));
    }

    #[test]
    fn apply_is_row_dot_products() {
        let frame = GrowthFrame::from_rows(
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 2.0),
        );
        let v = DVec3::new(1.0, -1.0, 0.5);
        assert_close(frame.apply(v), DVec3::new(0.5, -1.0, 0.0));
    }

    #[test]
    fn deviation_angles_scale_with_flexure_and_gravitropism() {
        let stiff = DeviationAngles::from_draw(0.8, 60.0, 0.0);
        let loose = DeviationAngles::from_draw(0.8, 30.0, 0.0);
        assert!((loose.phi - 2.0 * stiff.phi).abs() < EPS);

        let expected_theta = (100.0 * PI * 0.8 / -100.0).to_radians();
        assert!((stiff.theta - expected_theta).abs() < EPS);

        let heading = loose.local_heading();
        assert!((heading.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn out_of_range_colatitude_is_reported_without_drawing() {
        let mut src = ReplaySource::new(vec![0.5]);
        let err = sample_direction(DVec3::new(1.0, 0.0, 60.0), 30.0, 65.0, &mut src, 8);
        assert_eq!(err, Err(StepError::InvalidColatitude { z: 60.0 }));
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn nan_heading_is_reported_as_invalid_colatitude() {
        let mut src = ReplaySource::new(vec![0.5]);
        let err = sample_direction(DVec3::new(1.0, 0.0, f64::NAN), 30.0, 65.0, &mut src, 8);
        assert!(matches!(err, Err(StepError::InvalidColatitude { .. })));
    }

    #[test]
    fn subnormal_flexure_is_reported_as_non_finite() {
        let mut src = ReplaySource::new(vec![0.5]);
        let err = sample_direction(DVec3::ZERO, 1e-310, 65.0, &mut src, 8);
        assert_eq!(err, Err(StepError::NonFiniteHeading));
        assert_eq!(src.consumed(), 1);
    }

    #[test]
    fn gravitropism_next_to_one_hundred_stays_finite() {
        for g in [100.0 + 1e-12, 100.0 - 1e-12] {
            let mut src = ReplaySource::new(vec![0.5]);
            let dir = sample_direction(DVec3::new(0.4, -0.2, 0.1), 30.0, g, &mut src, 8).unwrap();
            assert!(dir.is_finite(), "non-finite heading for G = {}", g);
        }
    }

    #[test]
    fn infinite_heading_component_is_reported_as_non_finite() {
        let mut src = ReplaySource::new(vec![0.5]);
        let err = sample_direction(DVec3::new(f64::INFINITY, 0.0, 0.0), 30.0, 65.0, &mut src, 8);
        assert_eq!(err, Err(StepError::NonFiniteHeading));
    }

    #[test]
    fn zero_draws_are_resampled() {
        let mut src = ReplaySource::new(vec![0.0, 0.5]);
        let dir = sample_direction(DVec3::ZERO, 30.0, 65.0, &mut src, 8).unwrap();
        assert!(dir.is_finite());
        assert_eq!(src.consumed(), 2);
    }
}
