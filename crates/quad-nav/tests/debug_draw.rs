use quad_nav::debug::{area_debug_draw, corridor_debug_draw, point_in_polygon, DebugColor};
use quad_nav::{NavAreaDesc, NavAreaId, NavDirection, NavMesh, NavMeshBuilder, Vec3, DEFAULT_MARGIN};

fn corridor_mesh() -> NavMesh {
    let mut builder = NavMeshBuilder::new();
    builder
        .add_area(
            NavAreaDesc::axis_aligned(1, (0.0, 0.0), (100.0, 100.0), 0.0)
                .connect(NavDirection::East, 2, 3),
        )
        .add_area(
            NavAreaDesc::axis_aligned(2, (100.0, 0.0), (200.0, 100.0), 0.0)
                .connect(NavDirection::West, 1, 1)
                .connect(NavDirection::South, 3, 0),
        )
        .add_area(
            NavAreaDesc::axis_aligned(3, (100.0, 100.0), (200.0, 200.0), 0.0)
                .connect(NavDirection::North, 2, 2),
        );
    builder.build().expect("mesh")
}

#[test]
fn point_in_polygon_handles_triangles_and_slabs() {
    let triangle = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(0.0, 10.0, 0.0),
    ];
    assert!(point_in_polygon(Vec3::new(2.0, 2.0, 0.0), &triangle, None));
    assert!(!point_in_polygon(Vec3::new(8.0, 8.0, 0.0), &triangle, None));
    assert!(point_in_polygon(Vec3::new(2.0, 2.0, 0.0), &triangle, Some((-1.0, 1.0))));
    assert!(!point_in_polygon(Vec3::new(2.0, 2.0, 0.0), &triangle, Some((5.0, 6.0))));
    assert!(!point_in_polygon(Vec3::ZERO, &triangle[..2], None));
}

#[test]
fn area_debug_draw_outlines_area_and_neighbours() {
    let mesh = corridor_mesh();
    let middle = mesh.area_by_id(NavAreaId(2)).expect("area 2");
    let draw = area_debug_draw(&mesh, middle);

    // 4 edges, then per neighbour a 4 line outline and an entry marker.
    assert_eq!(draw.lines.len(), 4 + 2 * 5);
    // Edge labels, corner labels, one entry label per neighbour.
    assert_eq!(draw.labels.len(), 4 + 4 + 2);

    let green = draw
        .lines
        .iter()
        .filter(|line| line.color == DebugColor::GREEN)
        .count();
    assert_eq!(green, 4);

    assert_eq!(draw.labels[0].text, "dir: 0");
    assert_eq!(draw.labels[0].position, Vec3::new(150.0, 0.0, 10.0));
    assert_eq!(draw.labels[4].text, "0");
    assert_eq!(draw.labels[4].position, Vec3::new(100.0, 0.0, 15.0));

    // Connections are listed N/E/S/W: area 3 (south) first, then area 1 (west).
    assert_eq!(draw.labels[8].text, "0");
    assert_eq!(draw.labels[8].position, Vec3::new(100.0, 100.0, 5.0));

    // Area 1 is entered through its east edge, which starts at corner 1.
    let entry = &draw.labels[9];
    assert_eq!(entry.text, "1");
    assert_eq!(entry.position, Vec3::new(100.0, 0.0, 5.0));
}

#[test]
fn corridor_debug_draw_marks_portals_and_waypoints() {
    let mesh = corridor_mesh();
    let corridor = mesh.find_corridor(
        Vec3::new(50.0, 50.0, 0.0),
        Vec3::new(150.0, 150.0, 0.0),
        DEFAULT_MARGIN,
    );
    let draw = corridor_debug_draw(&corridor);

    assert_eq!(
        draw.lines.len(),
        corridor.portals.len() * 3 + corridor.points.len() - 1
    );
    assert!(draw.labels.is_empty());
    assert!(draw
        .lines
        .iter()
        .any(|line| line.color == DebugColor::BLUE));
}
