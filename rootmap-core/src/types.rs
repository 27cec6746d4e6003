use std::fmt;

use glam::DVec3;

/// Index into a primary trajectory at which a secondary root branches off.
///
/// Only meaningful for the [`crate::trajectory::RootTrajectory`] it was
/// taken from.
pub type AnchorIndex = usize;

/// One point of a growing root axis.
///
/// `direction` is the heading that produced this state from its
/// predecessor (or the seed heading for the first state of an axis).
/// It is not normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RootState {
    pub position: DVec3,
    pub direction: DVec3,
}

impl RootState {
    /// State at `position` heading along `direction`.
    pub fn new(position: DVec3, direction: DVec3) -> Self {
        Self {
            position,
            direction,
        }
    }
}

/// Which root axis a set of growth parameters belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootRole {
    Primary,
    Secondary,
}

impl fmt::Display for RootRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}
