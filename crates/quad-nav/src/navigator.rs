use crate::{NavAreaId, Portal, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default clearance kept between a path and the sides of the portals it crosses.
pub const DEFAULT_MARGIN: f32 = 10.0;

/// How the waypoints of a path were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PathKind {
    /// No route; `points` is empty.
    #[default]
    None,
    /// Start and end share an area: `[start, end]`.
    Direct,
    /// String-pulled through the corridor portals.
    Funneled,
    /// Area centers with the true endpoints substituted, used when funneling degenerates.
    AreaCenters,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavPath {
    pub points: Vec<Vec3>,
    pub kind: PathKind,
}

impl NavPath {
    pub fn new(points: Vec<Vec3>, kind: PathKind) -> Self {
        Self { points, kind }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.kind = PathKind::None;
    }

    pub fn length(&self) -> f32 {
        crate::math::path_length(&self.points)
    }
}

/// Debug-friendly search result: the traversed areas, the portals between them and the
/// final waypoints.
///
/// `portals.len()` is `areas.len() - 1` (one per consecutive pair), or `0` when there is no
/// route or the route stays inside one area.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavCorridor {
    pub areas: Vec<NavAreaId>,
    pub portals: Vec<Portal>,
    pub points: Vec<Vec3>,
    pub kind: PathKind,
}

impl NavCorridor {
    pub fn clear(&mut self) {
        self.areas.clear();
        self.portals.clear();
        self.points.clear();
        self.kind = PathKind::None;
    }
}

/// Query capability a motion controller consumes.
pub trait Navigator {
    /// Waypoints from `start` to `goal`; an empty path means no route.
    fn find_route(&self, start: Vec3, goal: Vec3, margin: f32) -> NavPath;

    /// Area a point resolves to, if the backend has any.
    fn locate(&self, _point: Vec3) -> Option<NavAreaId> {
        None
    }
}
