use std::collections::BTreeMap;

use crate::area::AreaIndex;
use crate::{NavArea, NavAreaId, NavMeshBuilder, NavMeshConfig, Vec3};

#[cfg(feature = "serde")]
use crate::NavAreaDesc;
#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Immutable graph of quad areas.
///
/// Produced by `NavMeshBuilder::build`, which resolves every connection to an arena index,
/// so a `NavMesh` never holds an unresolved reference. Safe to share between threads.
#[derive(Debug, Clone)]
pub struct NavMesh {
    areas: Vec<NavArea>,
    by_id: BTreeMap<NavAreaId, AreaIndex>,
    config: NavMeshConfig,
}

impl NavMesh {
    pub fn builder() -> NavMeshBuilder {
        NavMeshBuilder::new()
    }

    pub(crate) fn from_parts(
        areas: Vec<NavArea>,
        by_id: BTreeMap<NavAreaId, AreaIndex>,
        config: NavMeshConfig,
    ) -> Self {
        Self {
            areas,
            by_id,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    /// Areas in insertion order.
    pub fn areas(&self) -> &[NavArea] {
        &self.areas
    }

    /// Panics if `index` came from a different mesh and is out of range.
    pub fn area(&self, index: AreaIndex) -> &NavArea {
        &self.areas[index.get()]
    }

    pub fn area_by_id(&self, id: NavAreaId) -> Option<&NavArea> {
        self.by_id.get(&id).map(|&index| self.area(index))
    }

    /// First area (in insertion order) whose slab contains `point`.
    pub fn area_by_position(&self, point: Vec3) -> Option<&NavArea> {
        let tolerance = Some(self.config.z_tolerance);
        self.areas
            .iter()
            .find(|area| area.is_point_in_area_with(point, tolerance))
    }

    /// Area whose center is nearest to `point`. `None` only for an empty mesh.
    pub fn closest_area(&self, point: Vec3) -> Option<&NavArea> {
        let mut best: Option<(f32, &NavArea)> = None;
        for area in self.areas.iter() {
            let d2 = (area.center() - point).length_squared();
            match best {
                None => best = Some((d2, area)),
                Some((best_d2, _)) if d2 < best_d2 => best = Some((d2, area)),
                _ => {}
            }
        }
        best.map(|(_, area)| area)
    }

    /// Containing area, falling back to the nearest center for off-mesh points.
    pub fn locate_area(&self, point: Vec3) -> Option<&NavArea> {
        self.area_by_position(point)
            .or_else(|| self.closest_area(point))
    }

    pub fn neighbors<'a>(&'a self, area: &'a NavArea) -> impl Iterator<Item = &'a NavArea> + 'a {
        area.all_connections().map(move |(_, c)| self.area(c.area))
    }

    /// Connections whose target has no connection back.
    pub fn one_way_connections(&self) -> Vec<(NavAreaId, NavAreaId)> {
        let mut out = Vec::new();
        for area in self.areas.iter() {
            for (_, c) in area.all_connections() {
                if self.area(c.area).connection_direction_to(area.index()).is_none() {
                    out.push((area.id(), c.area_id));
                }
            }
        }
        out
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct NavMeshSerde {
    #[serde(default)]
    config: NavMeshConfig,
    areas: Vec<NavAreaDesc>,
}

#[cfg(feature = "serde")]
impl Serialize for NavMesh {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NavMeshSerde {
            config: self.config,
            areas: self.areas.iter().map(NavAreaDesc::from).collect(),
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for NavMesh {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let data = NavMeshSerde::deserialize(deserializer)?;
        let mut builder = NavMeshBuilder::new().with_config(data.config);
        builder.extend(data.areas);
        builder.build().map_err(de::Error::custom)
    }
}
