//! Portal extraction and string pulling ("simple stupid funnel").
//!
//! <http://digestingduck.blogspot.com/2010/03/simple-stupid-funnel-algorithm.html>

use crate::area::AreaIndex;
use crate::math::{cross_xy, dot_xy, tri_area2};
use crate::{NavArea, NavMesh, NavPath, PathKind, Portal, Vec3};

const SAME_POINT_EPS2: f32 = 1e-6;
const CROSS_EPS: f32 = 1e-3;

/// Portal crossed when walking from `current` into `next`, in `current`'s left/right orientation.
///
/// Both sides contribute an inset edge. When they are parallel and overlap the overlap wins,
/// otherwise the narrower of the two. Returns `None` if `current` has no connection to `next`.
pub fn portal_between(current: &NavArea, next: &NavArea, margin: f32) -> Option<Portal> {
    let dir = current.connection_direction_to(next.index())?;
    let mine = current.portal_edge(dir, margin);

    let Some(back) = next.connection_direction_to(current.index()) else {
        return Some(mine);
    };
    let theirs = next.portal_edge(back, margin).reversed();

    if let Some(overlap) = edge_overlap(mine, theirs) {
        return Some(overlap);
    }

    if theirs.width() < mine.width() {
        Some(theirs)
    } else {
        Some(mine)
    }
}

/// Overlap of `b` projected onto `a`, expressed along `a`.
fn edge_overlap(a: Portal, b: Portal) -> Option<Portal> {
    let da = a.right - a.left;
    let db = b.right - b.left;
    let len2 = dot_xy(da, da);
    if len2 <= f32::EPSILON {
        return None;
    }

    let tolerance = 1e-4 * len2.sqrt() * dot_xy(db, db).sqrt();
    if cross_xy(da, db).abs() > tolerance {
        return None;
    }

    let t1 = dot_xy(da, b.left - a.left) / len2;
    let t2 = dot_xy(da, b.right - a.left) / len2;
    let t_min = t1.min(t2).max(0.0);
    let t_max = t1.max(t2).min(1.0);
    if t_min > t_max {
        return None;
    }

    Some(Portal {
        left: a.left.lerp(a.right, t_min),
        right: a.left.lerp(a.right, t_max),
    })
}

/// Fill `portals` with `[start, p1 .. pn-1, end]` for the area sequence `path`.
pub(crate) fn collect_portals(
    mesh: &NavMesh,
    path: &[AreaIndex],
    start: Vec3,
    end: Vec3,
    margin: f32,
    portals: &mut Vec<Portal>,
) {
    portals.clear();
    portals.reserve(path.len() + 1);
    portals.push(Portal::point(start));

    for w in path.windows(2) {
        let current = mesh.area(w[0]);
        let next = mesh.area(w[1]);
        match portal_between(current, next, margin) {
            Some(portal) => portals.push(portal),
            None => {
                debug_assert!(false, "consecutive path areas must be connected");
                tracing::warn!(from = %current.id(), to = %next.id(), "path step without connection");
            }
        }
    }

    portals.push(Portal::point(end));
}

/// Smooth an area sequence into waypoints.
///
/// `portals` is scratch space and is left holding `[start, p1 .. pn-1, end]`.
pub(crate) fn funnel_into(
    mesh: &NavMesh,
    path: &[AreaIndex],
    start: Vec3,
    end: Vec3,
    margin: f32,
    portals: &mut Vec<Portal>,
    out: &mut NavPath,
) {
    collect_portals(mesh, path, start, end, margin, portals);
    string_pull_into(portals, &mut out.points);
    out.kind = PathKind::Funneled;

    if is_degenerate(&out.points, path.len(), portals) {
        tracing::debug!(areas = path.len(), "funnel degenerated, using area centers");
        area_centers_into(mesh, path, start, end, &mut out.points);
        out.kind = PathKind::AreaCenters;
    }
}

/// A bare `[start, end]` result over three or more areas only counts as degenerate
/// when that segment misses one of the inner portals.
fn is_degenerate(points: &[Vec3], area_count: usize, portals: &[Portal]) -> bool {
    if points.len() != 2 || area_count <= 2 || portals.len() < 2 {
        return false;
    }
    let inner = &portals[1..portals.len() - 1];
    !inner
        .iter()
        .all(|portal| segment_crosses(points[0], points[1], *portal))
}

/// XY test: does the segment `a -> b` touch the portal segment, within `CROSS_EPS`?
fn segment_crosses(a: Vec3, b: Vec3, portal: Portal) -> bool {
    let d = b - a;
    let d_len = dot_xy(d, d).sqrt();
    if d_len <= f32::EPSILON {
        return portal.left.distance_xy(a) <= CROSS_EPS
            || portal.right.distance_xy(a) <= CROSS_EPS;
    }

    // Portal ends must be on opposite sides of (or on) the line through a and b.
    let s1 = cross_xy(d, portal.left - a) / d_len;
    let s2 = cross_xy(d, portal.right - a) / d_len;
    if s1.min(s2) > CROSS_EPS || s1.max(s2) < -CROSS_EPS {
        return false;
    }

    let e = portal.right - portal.left;
    let e_len = dot_xy(e, e).sqrt();
    if e_len <= CROSS_EPS {
        let t = dot_xy(d, portal.left - a) / (d_len * d_len);
        let slack = CROSS_EPS / d_len;
        return t >= -slack && t <= 1.0 + slack;
    }

    // And a, b on opposite sides of (or on) the portal line.
    let s3 = cross_xy(e, a - portal.left) / e_len;
    let s4 = cross_xy(e, b - portal.left) / e_len;
    s3.min(s4) <= CROSS_EPS && s3.max(s4) >= -CROSS_EPS
}

/// Area centers with the first and last replaced by the true endpoints.
pub fn area_centers_into(
    mesh: &NavMesh,
    path: &[AreaIndex],
    start: Vec3,
    end: Vec3,
    out: &mut Vec<Vec3>,
) {
    out.clear();
    out.extend(path.iter().map(|&i| mesh.area(i).center()));
    if out.len() >= 2 {
        out[0] = start;
        let last = out.len() - 1;
        out[last] = end;
    }
}

/// String-pull through `portals`, whose first and last entries are the start and end points.
pub fn string_pull_into(portals: &[Portal], out: &mut Vec<Vec3>) {
    out.clear();
    let Some(first) = portals.first() else {
        return;
    };

    let mut apex = first.left;
    let mut left = first.left;
    let mut right = first.right;
    let mut left_index: usize = 0;
    let mut right_index: usize = 0;
    out.push(apex);

    let mut i: usize = 1;
    while i < portals.len() {
        let p_left = portals[i].left;
        let p_right = portals[i].right;

        // Update right vertex.
        if tri_area2(apex, right, p_right) <= 0.0 {
            if same_point(apex, right) || tri_area2(apex, left, p_right) > 0.0 {
                right = p_right;
                right_index = i;
            } else {
                // Right crossed left: commit left as the new apex and rescan from it.
                push_unique(out, left);
                apex = left;
                let new_index = left_index;
                right = apex;
                left_index = new_index;
                right_index = new_index;
                i = new_index + 1;
                continue;
            }
        }

        // Update left vertex.
        if tri_area2(apex, left, p_left) >= 0.0 {
            if same_point(apex, left) || tri_area2(apex, right, p_left) < 0.0 {
                left = p_left;
                left_index = i;
            } else {
                push_unique(out, right);
                apex = right;
                let new_index = right_index;
                left = apex;
                left_index = new_index;
                right_index = new_index;
                i = new_index + 1;
                continue;
            }
        }

        i += 1;
    }

    if let Some(last) = portals.last() {
        push_unique(out, last.left);
    }
}

fn same_point(a: Vec3, b: Vec3) -> bool {
    (a - b).length_squared() < SAME_POINT_EPS2
}

fn push_unique(out: &mut Vec<Vec3>, p: Vec3) {
    if out.last().is_some_and(|last| same_point(*last, p)) {
        return;
    }
    out.push(p);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    fn portal(left: Vec3, right: Vec3) -> Portal {
        Portal { left, right }
    }

    #[test]
    fn straight_result_through_every_portal_is_kept() {
        let start = p(50.0, 50.0);
        let end = p(250.0, 50.0);
        let portals = [
            Portal::point(start),
            portal(p(100.0, 90.0), p(100.0, 10.0)),
            portal(p(200.0, 90.0), p(200.0, 10.0)),
            Portal::point(end),
        ];
        assert!(!is_degenerate(&[start, end], 3, &portals));
    }

    #[test]
    fn straight_result_missing_a_portal_is_degenerate() {
        let start = p(50.0, 50.0);
        let end = p(250.0, 50.0);
        let portals = [
            Portal::point(start),
            portal(p(100.0, 290.0), p(100.0, 210.0)),
            portal(p(200.0, 90.0), p(200.0, 10.0)),
            Portal::point(end),
        ];
        assert!(is_degenerate(&[start, end], 3, &portals));
        // Two areas never fall back.
        assert!(!is_degenerate(&[start, end], 2, &portals));
        // Neither does a result that already bends.
        assert!(!is_degenerate(&[start, p(100.0, 210.0), end], 3, &portals));
    }

    #[test]
    fn collapsed_portals_must_lie_on_the_segment() {
        let start = p(0.0, 0.0);
        let end = p(100.0, 0.0);
        assert!(segment_crosses(start, end, Portal::point(p(50.0, 0.0))));
        assert!(!segment_crosses(start, end, Portal::point(p(50.0, 5.0))));
        assert!(!segment_crosses(start, end, Portal::point(p(150.0, 0.0))));
        assert!(segment_crosses(start, end, portal(p(100.0, 10.0), p(100.0, -10.0))));
        assert!(!segment_crosses(start, end, portal(p(120.0, 10.0), p(120.0, -10.0))));
    }
}
