use crate::{NavPath, Navigator, Vec3, DEFAULT_MARGIN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStatus {
    /// Moved along the path; carries the new position.
    Moving(Vec3),
    /// Within `arrival_distance` of the goal.
    Arrived(Vec3),
    /// The navigator returned no route.
    NoPath,
}

/// Walks a position along a planned path at a fixed speed.
///
/// The route is planned lazily on the first `advance` and kept until `reset`.
#[derive(Debug, Clone)]
pub struct PathFollower {
    goal: Vec3,
    speed: f32,
    arrival_distance: f32,
    margin: f32,
    path: Option<NavPath>,
    next_index: usize,
}

impl PathFollower {
    pub fn new(goal: Vec3, speed: f32, arrival_distance: f32) -> Self {
        Self {
            goal,
            speed,
            arrival_distance,
            margin: DEFAULT_MARGIN,
            path: None,
            next_index: 1,
        }
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    /// Drop the planned path; the next `advance` replans from the current position.
    pub fn reset(&mut self) {
        self.path = None;
        self.next_index = 1;
    }

    pub fn set_goal(&mut self, goal: Vec3) {
        self.goal = goal;
        self.reset();
    }

    pub fn advance(&mut self, navigator: &dyn Navigator, position: Vec3, dt: f32) -> FollowStatus {
        if position.distance(self.goal) <= self.arrival_distance {
            return FollowStatus::Arrived(position);
        }

        if self.path.is_none() {
            let path = navigator.find_route(position, self.goal, self.margin);
            if path.points.len() < 2 {
                return FollowStatus::NoPath;
            }
            self.path = Some(path);
            self.next_index = 1;
        }

        let Some(path) = &self.path else {
            return FollowStatus::NoPath;
        };

        let mut remaining = self.speed.max(0.0) * dt.max(0.0);
        let mut current = position;
        while self.next_index < path.points.len() && remaining > 0.0 {
            let target = path.points[self.next_index];
            let to_target = target - current;
            let dist = to_target.length();

            if dist <= f32::EPSILON {
                self.next_index += 1;
                continue;
            }

            if remaining >= dist {
                current = target;
                self.next_index += 1;
                remaining -= dist;
                continue;
            }

            current = current + to_target * (remaining / dist);
            break;
        }

        if current.distance(self.goal) <= self.arrival_distance
            || self.next_index >= path.points.len()
        {
            return FollowStatus::Arrived(current);
        }
        FollowStatus::Moving(current)
    }
}
