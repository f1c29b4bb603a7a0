use core::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::area::AreaIndex;
use crate::funnel::funnel_into;
use crate::{NavAreaId, NavCorridor, NavMesh, NavPath, Navigator, PathKind, Portal, Vec3};

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f32,
    g: f32,
    id: NavAreaId,
    area: usize,
    tie: u64,
}

impl OpenNode {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then(self.id.cmp(&other.id))
            .then(self.tie.cmp(&other.tie))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.cmp_key(self)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reusable scratch buffers for `NavMesh` path queries.
///
/// Each thread querying a shared mesh keeps its own `NavMeshQuery`.
#[derive(Debug, Default)]
pub struct NavMeshQuery {
    open: BinaryHeap<OpenNode>,
    g_score: Vec<f32>,
    came_from: Vec<Option<AreaIndex>>,
    closed: Vec<bool>,
    area_path: Vec<AreaIndex>,
    portals: Vec<Portal>,
}

impl NavMeshQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Areas traversed by the last successful search.
    pub fn area_path(&self) -> &[AreaIndex] {
        &self.area_path
    }

    fn reset(&mut self, n: usize) {
        self.open.clear();
        self.g_score.clear();
        self.g_score.resize(n, f32::INFINITY);
        self.came_from.clear();
        self.came_from.resize(n, None);
        self.closed.clear();
        self.closed.resize(n, false);
        self.area_path.clear();
        self.portals.clear();
    }
}

impl NavMesh {
    /// Waypoints from `start` to `end`, keeping `margin` clear of portal sides.
    ///
    /// An empty result means no route exists (or the mesh is empty).
    pub fn find_path(&self, start: Vec3, end: Vec3, margin: f32) -> Vec<Vec3> {
        let mut query = NavMeshQuery::default();
        let mut out = NavPath::default();
        self.find_path_into(start, end, margin, &mut query, &mut out);
        out.points
    }

    pub fn find_nav_path(&self, start: Vec3, end: Vec3, margin: f32) -> NavPath {
        let mut query = NavMeshQuery::default();
        let mut out = NavPath::default();
        self.find_path_into(start, end, margin, &mut query, &mut out);
        out
    }

    /// Area sequence from the area containing `start` to the one containing `end`.
    pub fn find_area_path(&self, start: Vec3, end: Vec3) -> Vec<NavAreaId> {
        let mut query = NavMeshQuery::default();
        if self.search(start, end, &mut query).is_none() {
            return Vec::new();
        }
        query.area_path.iter().map(|&i| self.area(i).id()).collect()
    }

    pub fn find_corridor(&self, start: Vec3, end: Vec3, margin: f32) -> NavCorridor {
        let mut query = NavMeshQuery::default();
        let mut out = NavCorridor::default();
        self.find_corridor_into(start, end, margin, &mut query, &mut out);
        out
    }

    pub fn find_path_into(
        &self,
        start: Vec3,
        end: Vec3,
        margin: f32,
        query: &mut NavMeshQuery,
        out: &mut NavPath,
    ) {
        out.clear();

        match self.search(start, end, query) {
            None => {}
            Some(Search::SameArea) => {
                out.points.push(start);
                out.points.push(end);
                out.kind = PathKind::Direct;
            }
            Some(Search::Found) => {
                let NavMeshQuery {
                    area_path, portals, ..
                } = query;
                funnel_into(self, area_path, start, end, margin, portals, out);
            }
        }
    }

    pub fn find_corridor_into(
        &self,
        start: Vec3,
        end: Vec3,
        margin: f32,
        query: &mut NavMeshQuery,
        out: &mut NavCorridor,
    ) {
        out.clear();
        let mut path = NavPath::default();
        self.find_path_into(start, end, margin, query, &mut path);
        if path.is_empty() {
            return;
        }

        out.areas
            .extend(query.area_path.iter().map(|&i| self.area(i).id()));
        if query.portals.len() > 2 {
            out.portals
                .extend_from_slice(&query.portals[1..query.portals.len() - 1]);
        }
        out.points = path.points;
        out.kind = path.kind;
    }

    /// A* over area centers. Leaves the area sequence in `query.area_path`.
    fn search(&self, start: Vec3, end: Vec3, query: &mut NavMeshQuery) -> Option<Search> {
        query.reset(self.len());

        let Some(start_area) = self.locate_area(start) else {
            tracing::trace!("no nav areas to path over");
            return None;
        };
        let end_area = self.locate_area(end)?;

        if start_area.index() == end_area.index() {
            query.area_path.push(start_area.index());
            return Some(Search::SameArea);
        }

        let goal = end_area.index().get();
        let goal_center = end_area.center();
        let heuristic = |area: usize| self.areas()[area].center().distance(goal_center);

        let start_idx = start_area.index().get();
        query.g_score[start_idx] = 0.0;
        query.open.push(OpenNode {
            f: heuristic(start_idx),
            g: 0.0,
            id: start_area.id(),
            area: start_idx,
            tie: 0,
        });
        let mut tie: u64 = 1;

        while let Some(node) = query.open.pop() {
            if query.closed[node.area] || node.g > query.g_score[node.area] {
                continue;
            }

            if node.area == goal {
                let mut current = AreaIndex(goal as u32);
                query.area_path.push(current);
                while let Some(prev) = query.came_from[current.get()] {
                    current = prev;
                    query.area_path.push(current);
                }
                query.area_path.reverse();
                return Some(Search::Found);
            }

            query.closed[node.area] = true;
            let area = &self.areas()[node.area];

            for (_, connection) in area.all_connections() {
                let next = connection.area.get();
                if query.closed[next] {
                    continue;
                }

                let step = area.center().distance(self.area(connection.area).center());
                let tentative_g = node.g + step;
                if tentative_g >= query.g_score[next] {
                    continue;
                }

                query.came_from[next] = Some(area.index());
                query.g_score[next] = tentative_g;
                query.open.push(OpenNode {
                    f: tentative_g + heuristic(next),
                    g: tentative_g,
                    id: connection.area_id,
                    area: next,
                    tie,
                });
                tie += 1;
            }
        }

        tracing::trace!(from = %start_area.id(), to = %end_area.id(), "no route between areas");
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    SameArea,
    Found,
}

impl Navigator for NavMesh {
    fn find_route(&self, start: Vec3, goal: Vec3, margin: f32) -> NavPath {
        self.find_nav_path(start, goal, margin)
    }

    fn locate(&self, point: Vec3) -> Option<NavAreaId> {
        self.locate_area(point).map(|area| area.id())
    }
}
