use std::io::{Cursor, ErrorKind};

use quad_nav::nav_file::{MAGIC, SUB_VERSION, VERSION};
use quad_nav::{NavAreaId, NavFile, NavFileError, Vec3, DEFAULT_MARGIN};

struct FileArea {
    id: u32,
    polygon: Vec<[f32; 3]>,
    connections: [Vec<(u32, u32)>; 4],
}

fn square(id: u32, col: u32, connections: [Vec<(u32, u32)>; 4]) -> FileArea {
    let x0 = col as f32 * 100.0;
    let x1 = x0 + 100.0;
    FileArea {
        id,
        polygon: vec![
            [x0, 0.0, 0.0],
            [x1, 0.0, 0.0],
            [x1, 100.0, 0.0],
            [x0, 100.0, 0.0],
        ],
        connections,
    }
}

fn nav_bytes(magic: u32, areas: &[FileArea]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&magic.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&SUB_VERSION.to_le_bytes());
    out.push(1); // analyzed
    out.extend_from_slice(&0u16.to_le_bytes()); // places
    out.push(0); // unnamed areas
    out.extend_from_slice(&(areas.len() as u32).to_le_bytes());

    for area in areas {
        out.extend_from_slice(&area.id.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // attributes
        out.extend_from_slice(&[0; 5]);
        out.extend_from_slice(&(area.polygon.len() as u32).to_le_bytes());
        for corner in area.polygon.iter() {
            for v in corner {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
        out.extend_from_slice(&[0; 4]);
        for list in area.connections.iter() {
            out.extend_from_slice(&(list.len() as u32).to_le_bytes());
            for (target, edge) in list {
                out.extend_from_slice(&target.to_le_bytes());
                out.extend_from_slice(&edge.to_le_bytes());
            }
        }
        out.extend_from_slice(&[0; 13]);
    }
    out
}

fn two_room_bytes() -> Vec<u8> {
    nav_bytes(
        MAGIC,
        &[
            square(100, 0, [vec![], vec![(200, 3)], vec![], vec![]]),
            square(200, 1, [vec![], vec![], vec![], vec![(100, 1)]]),
        ],
    )
}

#[test]
fn nav_file_reads_header_and_areas() {
    let file = NavFile::read_from(Cursor::new(two_room_bytes())).expect("nav file");
    assert_eq!(file.version, VERSION);
    assert!(file.is_analyzed);
    assert!(!file.has_unnamed_areas);
    assert_eq!(file.place_count, 0);
    assert_eq!(file.areas.len(), 2);

    let first = &file.areas[0];
    assert_eq!(first.id, NavAreaId(100));
    assert_eq!(first.polygon.len(), 4);
    assert_eq!(first.polygon[2], Vec3::new(100.0, 100.0, 0.0));
    assert_eq!(first.connections[1].len(), 1);
    assert_eq!(first.connections[1][0].area_id, NavAreaId(200));
    assert_eq!(first.connections[1][0].edge_index, 3);
}

#[test]
fn nav_file_rejects_bad_magic() {
    let bytes = nav_bytes(0xDEAD_BEEF, &[]);
    match NavFile::read_from(Cursor::new(bytes)) {
        Err(NavFileError::BadMagic { found }) => assert_eq!(found, 0xDEAD_BEEF),
        other => panic!("expected bad magic, got {other:?}"),
    }
}

#[test]
fn nav_file_rejects_other_versions() {
    let mut bytes = two_room_bytes();
    bytes[4..8].copy_from_slice(&16u32.to_le_bytes());
    match NavFile::read_from(Cursor::new(bytes)) {
        Err(NavFileError::UnsupportedVersion { found }) => assert_eq!(found, 16),
        other => panic!("expected version error, got {other:?}"),
    }
}

#[test]
fn nav_file_reports_truncation_as_io() {
    let mut bytes = two_room_bytes();
    bytes.truncate(bytes.len() - 7);
    match NavFile::read_from(Cursor::new(bytes)) {
        Err(NavFileError::Io(err)) => assert_eq!(err.kind(), ErrorKind::UnexpectedEof),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn nav_file_compress_renumbers_and_drops_missing_targets() {
    let bytes = nav_bytes(
        MAGIC,
        &[
            square(100, 0, [vec![], vec![(200, 3), (999, 3)], vec![], vec![]]),
            square(200, 1, [vec![], vec![], vec![], vec![(100, 1)]]),
        ],
    );
    let mut file = NavFile::read_from(Cursor::new(bytes)).expect("nav file");
    file.compress_area_ids();

    assert_eq!(file.areas[0].id, NavAreaId(1));
    assert_eq!(file.areas[1].id, NavAreaId(2));
    assert_eq!(file.areas[0].connections[1].len(), 1);
    assert_eq!(file.areas[0].connections[1][0].area_id, NavAreaId(2));
    assert_eq!(file.areas[1].connections[3][0].area_id, NavAreaId(1));
}

#[test]
fn nav_file_builds_a_pathable_mesh() {
    let file = NavFile::read_from(Cursor::new(two_room_bytes())).expect("nav file");
    let mesh = file.to_builder().expect("builder").build().expect("mesh");

    assert_eq!(mesh.len(), 2);
    let path = mesh.find_path(
        Vec3::new(50.0, 50.0, 0.0),
        Vec3::new(150.0, 50.0, 0.0),
        DEFAULT_MARGIN,
    );
    assert_eq!(path.len(), 2);
}

#[test]
fn nav_file_rejects_non_quad_areas() {
    let triangle = FileArea {
        id: 5,
        polygon: vec![[0.0, 0.0, 0.0], [100.0, 0.0, 0.0], [0.0, 100.0, 0.0]],
        connections: Default::default(),
    };
    let file =
        NavFile::read_from(Cursor::new(nav_bytes(MAGIC, &[triangle]))).expect("nav file");
    assert_eq!(file.areas[0].polygon.len(), 3);

    match file.to_builder() {
        Err(NavFileError::NonQuadArea { area, corners }) => {
            assert_eq!(area, NavAreaId(5));
            assert_eq!(corners, 3);
        }
        other => panic!("expected non-quad error, got {other:?}"),
    }
}

#[test]
fn nav_file_opens_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rooms.nav");
    std::fs::write(&path, two_room_bytes()).expect("write nav");

    let file = NavFile::open(&path).expect("open nav");
    assert_eq!(file.areas.len(), 2);

    let missing = NavFile::open(dir.path().join("missing.nav"));
    assert!(matches!(missing, Err(NavFileError::Io(_))));
}
