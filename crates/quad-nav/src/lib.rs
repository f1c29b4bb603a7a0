//! Quad-area navigation meshes: point location, A* search, and funnel path smoothing.
//!
//! A mesh is assembled from `NavAreaDesc`s with a `NavMeshBuilder`, which resolves every
//! connection once and hands back an immutable `NavMesh`. Queries borrow the mesh and keep
//! their mutable state in a caller-owned `NavMeshQuery`, so one mesh can serve many threads.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod area;
pub mod builder;
pub mod debug;
pub mod follow;
pub mod funnel;
pub mod math;
pub mod mesh;
pub mod nav_file;
pub mod navigator;
pub mod query;

pub use area::{
    AreaIndex, NavArea, NavAreaId, NavConnection, NavDirection, Portal, ZTolerance, AREA_CORNERS,
};
pub use builder::{
    BuildError, ConnectionSymmetry, NavAreaDesc, NavMeshBuilder, NavMeshConfig, RawConnection,
};
pub use follow::{FollowStatus, PathFollower};
pub use math::{path_length, Vec3};
pub use mesh::NavMesh;
pub use nav_file::{NavFile, NavFileArea, NavFileError};
pub use navigator::{NavCorridor, NavPath, Navigator, PathKind, DEFAULT_MARGIN};
pub use query::NavMeshQuery;
