use core::fmt;

use crate::debug::point_in_polygon;
use crate::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Corners per area.
pub const AREA_CORNERS: usize = 4;

/// Externally assigned area identifier, stable for a given mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NavAreaId(pub u32);

impl fmt::Display for NavAreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an area inside its mesh.
///
/// Only meaningful for the `NavMesh` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaIndex(pub(crate) u32);

impl AreaIndex {
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Cardinal side of an area.
///
/// Edge `d` runs from corner `d` to corner `d + 1` and faces direction `d`.
/// North is -Y, East is +X, so corners wind counter-clockwise in XY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavDirection {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl NavDirection {
    pub const ALL: [NavDirection; 4] = [
        NavDirection::North,
        NavDirection::East,
        NavDirection::South,
        NavDirection::West,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn opposite(self) -> Self {
        Self::ALL[(self.index() + 2) % 4]
    }
}

/// Vertical slab used by the containment test.
///
/// A corner counts when its Z lies in `[point.z - below, point.z + above]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ZTolerance {
    pub below: f32,
    pub above: f32,
}

impl Default for ZTolerance {
    fn default() -> Self {
        Self {
            below: 30.0,
            above: 100.0,
        }
    }
}

impl ZTolerance {
    pub fn range_for(&self, z: f32) -> (f32, f32) {
        (z - self.below, z + self.above)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavConnection {
    pub area: AreaIndex,
    pub area_id: NavAreaId,
    /// Edge of the target area this connection arrives at (0..=3).
    pub edge_index: u8,
}

/// A crossing between two areas, oriented as seen by the agent walking through it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Portal {
    pub left: Vec3,
    pub right: Vec3,
}

impl Portal {
    pub fn point(p: Vec3) -> Self {
        Self { left: p, right: p }
    }

    pub fn width(&self) -> f32 {
        self.left.distance_xy(self.right)
    }

    pub fn reversed(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NavArea {
    pub(crate) id: NavAreaId,
    pub(crate) index: AreaIndex,
    pub(crate) attributes: u32,
    pub(crate) corners: [Vec3; AREA_CORNERS],
    pub(crate) connections: [Vec<NavConnection>; 4],
    pub(crate) center: Vec3,
}

impl NavArea {
    pub fn id(&self) -> NavAreaId {
        self.id
    }

    pub fn index(&self) -> AreaIndex {
        self.index
    }

    pub fn attributes(&self) -> u32 {
        self.attributes
    }

    pub fn corners(&self) -> &[Vec3; AREA_CORNERS] {
        &self.corners
    }

    pub fn corner(&self, corner: usize) -> Vec3 {
        self.corners[corner % AREA_CORNERS]
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn edge(&self, direction: NavDirection) -> (Vec3, Vec3) {
        let d = direction.index();
        (self.corner(d), self.corner(d + 1))
    }

    pub fn connections(&self, direction: NavDirection) -> &[NavConnection] {
        &self.connections[direction.index()]
    }

    /// All connections, tagged with the side they leave from, in N/E/S/W order.
    pub fn all_connections(&self) -> impl Iterator<Item = (NavDirection, &NavConnection)> + '_ {
        NavDirection::ALL
            .into_iter()
            .flat_map(move |dir| self.connections(dir).iter().map(move |c| (dir, c)))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(Vec::len).sum()
    }

    pub fn connection_direction_by_id(&self, target: NavAreaId) -> Option<NavDirection> {
        self.all_connections()
            .find(|(_, c)| c.area_id == target)
            .map(|(dir, _)| dir)
    }

    pub fn connection_direction_to(&self, target: AreaIndex) -> Option<NavDirection> {
        self.all_connections()
            .find(|(_, c)| c.area == target)
            .map(|(dir, _)| dir)
    }

    /// Containment using the default Z slab.
    pub fn is_point_in_area(&self, point: Vec3, check_z: bool) -> bool {
        let tolerance = check_z.then(ZTolerance::default);
        self.is_point_in_area_with(point, tolerance)
    }

    pub fn is_point_in_area_with(&self, point: Vec3, tolerance: Option<ZTolerance>) -> bool {
        let z_range = tolerance.map(|t| t.range_for(point.z));
        point_in_polygon(point, &self.corners, z_range)
    }

    /// Portal boundary when leaving through `direction`, pulled in by `margin` from both ends.
    pub fn portal_edge(&self, direction: NavDirection, margin: f32) -> Portal {
        let d = direction.index();
        let left = self.corner(d + 1);
        let right = self.corner(d);
        inset(Portal { left, right }, margin)
    }
}

fn inset(portal: Portal, margin: f32) -> Portal {
    let width = portal.width();
    if margin <= 0.0 {
        return portal;
    }
    if width <= 2.0 * margin {
        return Portal::point(portal.left.lerp(portal.right, 0.5));
    }
    let t = margin / width;
    Portal {
        left: portal.left.lerp(portal.right, t),
        right: portal.right.lerp(portal.left, t),
    }
}
