//! Inspection helpers: polygon containment and engine-agnostic debug draw lists.

use std::borrow::Cow;

use crate::{NavArea, NavCorridor, NavMesh, Vec3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Crossing-parity test on the XY projection of `polygon`.
///
/// With `z_range = Some((min, max))` an edge only takes part when both of its
/// endpoints have a Z inside `[min, max]`, turning the test into a slab test.
pub fn point_in_polygon(point: Vec3, polygon: &[Vec3], z_range: Option<(f32, f32)>) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let in_slab = |z: f32| match z_range {
        Some((min, max)) => z >= min && z <= max,
        None => true,
    };

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[j];
        j = i;

        if !(in_slab(a.z) && in_slab(b.z)) {
            continue;
        }

        if (a.y > point.y) != (b.y > point.y) {
            let x_at = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_at {
                inside = !inside;
            }
        }
    }
    inside
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl DebugColor {
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: DebugColor,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugLabel {
    pub position: Vec3,
    pub text: Cow<'static, str>,
}

/// Primitives a host renderer can draw as-is.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DebugDraw {
    pub lines: Vec<DebugLine>,
    pub labels: Vec<DebugLabel>,
}

impl DebugDraw {
    pub fn line(&mut self, start: Vec3, end: Vec3, color: DebugColor) {
        self.lines.push(DebugLine { start, end, color });
    }

    pub fn label(&mut self, position: Vec3, text: impl Into<Cow<'static, str>>) {
        self.labels.push(DebugLabel {
            position,
            text: text.into(),
        });
    }

    pub fn extend(&mut self, other: DebugDraw) {
        self.lines.extend(other.lines);
        self.labels.extend(other.labels);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.labels.is_empty()
    }

    fn outline(&mut self, area: &NavArea, color: DebugColor) {
        let corners = area.corners();
        for i in 0..corners.len() {
            self.line(corners[i], corners[(i + 1) % corners.len()], color);
        }
    }
}

fn up(dz: f32) -> Vec3 {
    Vec3::new(0.0, 0.0, dz)
}

/// Draw an area's edges and its connections to neighbouring areas.
pub fn area_debug_draw(mesh: &NavMesh, area: &NavArea) -> DebugDraw {
    let mut draw = DebugDraw::default();
    let corners = area.corners();

    for i in 0..corners.len() {
        let start = corners[i];
        let end = corners[(i + 1) % corners.len()];
        draw.label(start.lerp(end, 0.5) + up(10.0), format!("dir: {i}"));
        draw.line(start, end, DebugColor::GREEN);
    }

    for (dir, corner) in corners.iter().enumerate() {
        draw.label(*corner + up(15.0), dir.to_string());
    }

    for (_, connection) in area.all_connections() {
        let neighbor = mesh.area(connection.area);
        draw.outline(neighbor, DebugColor::RED);

        let entry = neighbor.corner(connection.edge_index as usize);
        draw.line(entry, entry + up(5.0), DebugColor::RED);
        draw.label(entry + up(5.0), connection.edge_index.to_string());
    }

    draw
}

/// Draw a corridor's portals (left end blue, right end yellow) and its waypoints.
pub fn corridor_debug_draw(corridor: &NavCorridor) -> DebugDraw {
    let mut draw = DebugDraw::default();

    for portal in corridor.portals.iter() {
        draw.line(portal.left, portal.right, DebugColor::GREEN);
        draw.line(portal.left, portal.left + up(5.0), DebugColor::BLUE);
        draw.line(portal.right, portal.right + up(5.0), DebugColor::YELLOW);
    }

    for w in corridor.points.windows(2) {
        draw.line(w[0], w[1], DebugColor::RED);
    }

    draw
}
