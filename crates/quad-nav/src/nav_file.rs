//! Reader for binary Source-engine `.nav` files (SteamVR Home flavour, version 30).
//!
//! Only the parts needed for pathfinding are decoded: area polygons and their
//! per-direction connections. Ladder data and trailing place tables are skipped,
//! so files containing ladders are not supported.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use thiserror::Error;

use crate::area::AREA_CORNERS;
use crate::builder::RawConnection;
use crate::{NavAreaDesc, NavAreaId, NavMeshBuilder, Vec3};

pub const MAGIC: u32 = 0xFEED_FACE;
pub const VERSION: u32 = 30;
pub const SUB_VERSION: u32 = 0;

// Unknown per-area blocks, usually zeroed.
const AREA_HEADER_PADDING: u64 = 5;
const AREA_POLYGON_PADDING: u64 = 4;
const AREA_TRAILER_PADDING: u64 = 13;

#[derive(Debug, Error)]
pub enum NavFileError {
    #[error("failed to read nav file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid nav magic 0x{found:08X}, expected 0x{:08X}", MAGIC)]
    BadMagic { found: u32 },

    #[error("unsupported nav version {found}, expected {}", VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("unsupported nav sub-version {found}, expected {}", SUB_VERSION)]
    UnsupportedSubVersion { found: u32 },

    #[error("area {area} has {corners} corners, only quads are supported")]
    NonQuadArea { area: NavAreaId, corners: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavFileArea {
    pub id: NavAreaId,
    pub attributes: u32,
    pub polygon: Vec<Vec3>,
    /// North, East, South, West.
    pub connections: [Vec<RawConnection>; 4],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavFile {
    pub version: u32,
    pub sub_version: u32,
    pub is_analyzed: bool,
    pub place_count: u16,
    pub has_unnamed_areas: bool,
    pub areas: Vec<NavFileArea>,
}

impl NavFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, NavFileError> {
        let file = File::open(path.as_ref())?;
        Self::read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, NavFileError> {
        let r = &mut reader;

        let magic = r.read_u32::<LittleEndian>()?;
        if magic != MAGIC {
            return Err(NavFileError::BadMagic { found: magic });
        }
        let version = r.read_u32::<LittleEndian>()?;
        if version != VERSION {
            return Err(NavFileError::UnsupportedVersion { found: version });
        }
        let sub_version = r.read_u32::<LittleEndian>()?;
        if sub_version != SUB_VERSION {
            return Err(NavFileError::UnsupportedSubVersion { found: sub_version });
        }

        let is_analyzed = r.read_u8()? == 1;
        let place_count = r.read_u16::<LittleEndian>()?;
        let has_unnamed_areas = r.read_u8()? == 1;

        let area_count = r.read_u32::<LittleEndian>()? as usize;
        let mut areas = Vec::with_capacity(area_count.min(1 << 16));
        for _ in 0..area_count {
            areas.push(read_area(r)?);
        }

        tracing::debug!(areas = areas.len(), version, "read nav file");

        Ok(Self {
            version,
            sub_version,
            is_analyzed,
            place_count,
            has_unnamed_areas,
            areas,
        })
    }

    /// Renumber areas `1..=n` in file order and rewrite connection targets to match.
    ///
    /// Connections to IDs not present in the file are removed.
    pub fn compress_area_ids(&mut self) {
        let mut new_ids = BTreeMap::new();
        for (i, area) in self.areas.iter_mut().enumerate() {
            let new_id = NavAreaId(i as u32 + 1);
            new_ids.insert(area.id, new_id);
            area.id = new_id;
        }

        for area in self.areas.iter_mut() {
            for list in area.connections.iter_mut() {
                list.retain_mut(|c| match new_ids.get(&c.area_id) {
                    Some(&new_id) => {
                        c.area_id = new_id;
                        true
                    }
                    None => {
                        tracing::warn!(to = %c.area_id, "dropping connection to missing area");
                        false
                    }
                });
            }
        }
    }

    pub fn to_builder(&self) -> Result<NavMeshBuilder, NavFileError> {
        let mut builder = NavMeshBuilder::new();
        for area in self.areas.iter() {
            let corners: [Vec3; AREA_CORNERS] =
                area.polygon.as_slice().try_into().map_err(|_| NavFileError::NonQuadArea {
                    area: area.id,
                    corners: area.polygon.len(),
                })?;
            builder.add_area(NavAreaDesc {
                id: area.id,
                attributes: area.attributes,
                corners,
                connections: area.connections.clone(),
            });
        }
        Ok(builder)
    }
}

fn read_area<R: Read>(r: &mut R) -> Result<NavFileArea, NavFileError> {
    let id = NavAreaId(r.read_u32::<LittleEndian>()?);
    let attributes = r.read_u32::<LittleEndian>()?;
    skip(r, AREA_HEADER_PADDING)?;

    let corner_count = r.read_u32::<LittleEndian>()? as usize;
    let mut polygon = Vec::with_capacity(corner_count.min(16));
    for _ in 0..corner_count {
        let x = r.read_f32::<LittleEndian>()?;
        let y = r.read_f32::<LittleEndian>()?;
        let z = r.read_f32::<LittleEndian>()?;
        polygon.push(Vec3::new(x, y, z));
    }
    skip(r, AREA_POLYGON_PADDING)?;

    let mut connections: [Vec<RawConnection>; 4] = Default::default();
    for list in connections.iter_mut() {
        let count = r.read_u32::<LittleEndian>()? as usize;
        list.reserve(count.min(64));
        for _ in 0..count {
            let area_id = NavAreaId(r.read_u32::<LittleEndian>()?);
            let edge_index = r.read_u32::<LittleEndian>()?;
            list.push(RawConnection {
                area_id,
                edge_index,
            });
        }
    }
    skip(r, AREA_TRAILER_PADDING)?;

    Ok(NavFileArea {
        id,
        attributes,
        polygon,
        connections,
    })
}

/// Discard `len` bytes, failing with `UnexpectedEof` if the input ends first.
fn skip<R: Read>(r: &mut R, len: u64) -> io::Result<()> {
    let skipped = io::copy(&mut r.by_ref().take(len), &mut io::sink())?;
    if skipped < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "nav file ended inside area padding",
        ));
    }
    Ok(())
}
