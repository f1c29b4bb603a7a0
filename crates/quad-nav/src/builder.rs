use std::collections::BTreeMap;

use thiserror::Error;

use crate::area::{AreaIndex, NavArea, NavConnection, AREA_CORNERS};
use crate::{NavAreaId, NavDirection, NavMesh, Vec3, ZTolerance};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How `build` treats connections that are not mirrored by their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ConnectionSymmetry {
    /// Every connection must have a connection back; dangling or self links are errors.
    #[default]
    Require,
    /// Keep one-way links, drop dangling and self links.
    Permit,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavMeshConfig {
    pub z_tolerance: ZTolerance,
    pub symmetry: ConnectionSymmetry,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    #[error("area id 0 is reserved")]
    ZeroAreaId,

    #[error("area {area} has a non-finite corner")]
    NonFiniteCorner { area: NavAreaId },

    #[error("area {from} connects to area {to} on edge {edge_index}, expected 0..=3")]
    InvalidEdgeIndex {
        from: NavAreaId,
        to: NavAreaId,
        edge_index: u32,
    },

    #[error("area {from} connects to unknown area {to}")]
    UnknownArea { from: NavAreaId, to: NavAreaId },

    #[error("area {area} connects to itself")]
    SelfConnection { area: NavAreaId },

    #[error("area {from} connects to area {to}, but {to} has no connection back")]
    AsymmetricConnection { from: NavAreaId, to: NavAreaId },
}

/// Connection as loaded, naming its target by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawConnection {
    pub area_id: NavAreaId,
    pub edge_index: u32,
}

/// Unresolved area description fed to `NavMeshBuilder`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavAreaDesc {
    pub id: NavAreaId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: u32,
    pub corners: [Vec3; AREA_CORNERS],
    #[cfg_attr(feature = "serde", serde(default))]
    pub connections: [Vec<RawConnection>; 4],
}

impl NavAreaDesc {
    pub fn new(id: u32, corners: [Vec3; AREA_CORNERS]) -> Self {
        Self {
            id: NavAreaId(id),
            attributes: 0,
            corners,
            connections: Default::default(),
        }
    }

    /// Flat rectangle spanning `min..max` on the ground plane at height `z`.
    pub fn axis_aligned(id: u32, min: (f32, f32), max: (f32, f32), z: f32) -> Self {
        let (x0, y0) = min;
        let (x1, y1) = max;
        Self::new(
            id,
            [
                Vec3::new(x0, y0, z),
                Vec3::new(x1, y0, z),
                Vec3::new(x1, y1, z),
                Vec3::new(x0, y1, z),
            ],
        )
    }

    pub fn with_attributes(mut self, attributes: u32) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn connect(mut self, direction: NavDirection, target: u32, edge_index: u32) -> Self {
        self.connections[direction.index()].push(RawConnection {
            area_id: NavAreaId(target),
            edge_index,
        });
        self
    }

    fn has_connection_to(&self, target: NavAreaId) -> bool {
        self.connections
            .iter()
            .flatten()
            .any(|c| c.area_id == target)
    }
}

impl From<&NavArea> for NavAreaDesc {
    fn from(area: &NavArea) -> Self {
        let mut connections: [Vec<RawConnection>; 4] = Default::default();
        for (dir, c) in area.all_connections() {
            connections[dir.index()].push(RawConnection {
                area_id: c.area_id,
                edge_index: u32::from(c.edge_index),
            });
        }
        Self {
            id: area.id,
            attributes: area.attributes,
            corners: area.corners,
            connections,
        }
    }
}

/// Collects area descriptions and resolves them into an immutable `NavMesh`.
#[derive(Debug, Clone, Default)]
pub struct NavMeshBuilder {
    areas: Vec<NavAreaDesc>,
    slots: BTreeMap<NavAreaId, usize>,
    config: NavMeshConfig,
}

impl NavMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: NavMeshConfig) -> Self {
        self.config = config;
        self
    }

    pub fn symmetry(mut self, symmetry: ConnectionSymmetry) -> Self {
        self.config.symmetry = symmetry;
        self
    }

    pub fn z_tolerance(mut self, z_tolerance: ZTolerance) -> Self {
        self.config.z_tolerance = z_tolerance;
        self
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Insert an area. A repeated ID replaces the earlier description in its original slot.
    pub fn add_area(&mut self, area: NavAreaDesc) -> &mut Self {
        match self.slots.get(&area.id) {
            Some(&slot) => {
                tracing::debug!(area = %area.id, "replacing duplicate nav area");
                self.areas[slot] = area;
            }
            None => {
                self.slots.insert(area.id, self.areas.len());
                self.areas.push(area);
            }
        }
        self
    }

    pub fn extend<I>(&mut self, areas: I) -> &mut Self
    where
        I: IntoIterator<Item = NavAreaDesc>,
    {
        for area in areas {
            self.add_area(area);
        }
        self
    }

    pub fn build(self) -> Result<NavMesh, BuildError> {
        let permissive = self.config.symmetry == ConnectionSymmetry::Permit;
        let mut areas = Vec::with_capacity(self.areas.len());
        let mut by_id = BTreeMap::new();
        let mut dropped = 0usize;
        let mut one_way = 0usize;
        let mut total = 0usize;

        for (idx, desc) in self.areas.iter().enumerate() {
            if desc.id.0 == 0 {
                return Err(BuildError::ZeroAreaId);
            }
            if !desc.corners.iter().all(|c| c.is_finite()) {
                return Err(BuildError::NonFiniteCorner { area: desc.id });
            }
            by_id.insert(desc.id, AreaIndex(idx as u32));
        }

        for (idx, desc) in self.areas.iter().enumerate() {
            let mut connections: [Vec<NavConnection>; 4] = Default::default();

            for (dir, raw_list) in desc.connections.iter().enumerate() {
                for raw in raw_list {
                    let edge_index = u8::try_from(raw.edge_index)
                        .ok()
                        .filter(|e| usize::from(*e) < AREA_CORNERS)
                        .ok_or(BuildError::InvalidEdgeIndex {
                            from: desc.id,
                            to: raw.area_id,
                            edge_index: raw.edge_index,
                        })?;

                    if raw.area_id == desc.id {
                        if permissive {
                            tracing::warn!(area = %desc.id, "dropping self connection");
                            dropped += 1;
                            continue;
                        }
                        return Err(BuildError::SelfConnection { area: desc.id });
                    }

                    let Some(&target) = by_id.get(&raw.area_id) else {
                        if permissive {
                            tracing::warn!(from = %desc.id, to = %raw.area_id, "dropping connection to unknown area");
                            dropped += 1;
                            continue;
                        }
                        return Err(BuildError::UnknownArea {
                            from: desc.id,
                            to: raw.area_id,
                        });
                    };

                    if !self.areas[target.get()].has_connection_to(desc.id) {
                        if !permissive {
                            return Err(BuildError::AsymmetricConnection {
                                from: desc.id,
                                to: raw.area_id,
                            });
                        }
                        one_way += 1;
                    }

                    connections[dir].push(NavConnection {
                        area: target,
                        area_id: raw.area_id,
                        edge_index,
                    });
                    total += 1;
                }
            }

            let center = desc
                .corners
                .iter()
                .fold(Vec3::ZERO, |acc, c| acc + *c)
                / AREA_CORNERS as f32;

            areas.push(NavArea {
                id: desc.id,
                index: AreaIndex(idx as u32),
                attributes: desc.attributes,
                corners: desc.corners,
                connections,
                center,
            });
        }

        tracing::debug!(
            areas = areas.len(),
            connections = total,
            one_way,
            dropped,
            "built nav mesh"
        );

        Ok(NavMesh::from_parts(areas, by_id, self.config))
    }
}
