//! Flattening a [`RootSystem`] into 2-D polylines for plotting.

use glam::{DVec2, DVec3};

use crate::{simulation::RootSystem, trajectory::RootTrajectory, types::RootRole};

/// Which pair of axes ends up on the plot.
///
/// Names read `<horizontal><vertical>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Projection {
    /// Horizontal `y`, vertical `-x`: the primary grows mostly along `+x`,
    /// which then points down the plot.
    #[default]
    YX,
    XY,
    XZ,
    YZ,
}

impl Projection {
    pub const ALL: [Projection; 4] = [Self::YX, Self::XY, Self::XZ, Self::YZ];

    pub fn label(self) -> &'static str {
        match self {
            Self::YX => "y / x (down)",
            Self::XY => "x / y",
            Self::XZ => "x / z",
            Self::YZ => "y / z",
        }
    }

    #[inline]
    pub fn project(self, p: DVec3) -> DVec2 {
        match self {
            Self::YX => DVec2::new(p.y, -p.x),
            Self::XY => DVec2::new(p.x, p.y),
            Self::XZ => DVec2::new(p.x, p.z),
            Self::YZ => DVec2::new(p.y, p.z),
        }
    }

    pub fn project_trajectory(self, trajectory: &RootTrajectory) -> Vec<DVec2> {
        trajectory.positions().map(|p| self.project(p)).collect()
    }
}

/// Axis-aligned bounds of projected points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds2 {
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }
}

impl RootSystem {
    /// Every trajectory as a projected polyline: the primary first, then the
    /// secondaries in anchor order.
    pub fn polylines(&self, projection: Projection) -> Vec<(RootRole, Vec<DVec2>)> {
        let mut lines = Vec::with_capacity(self.trajectory_count());
        lines.push((RootRole::Primary, projection.project_trajectory(&self.primary)));
        lines.extend(
            self.secondaries
                .iter()
                .map(|s| (RootRole::Secondary, projection.project_trajectory(&s.trajectory))),
        );
        lines
    }

    /// Bounds of all projected positions, `None` if there are none.
    pub fn bounds(&self, projection: Projection) -> Option<Bounds2> {
        let mut points = self
            .primary
            .positions()
            .chain(self.secondaries.iter().flat_map(|s| s.trajectory.positions()))
            .map(|p| projection.project(p));

        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Bounds2 { min, max })
    }
}
