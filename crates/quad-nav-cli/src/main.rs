//! quadnav - quad-area navigation mesh tool.
//!
//! - `quadnav bake` - convert a binary `.nav` file into a validated JSON mesh
//! - `quadnav inspect` - summarize a mesh or dump one area's debug draw list
//! - `quadnav path` - run a path query and print the waypoints

mod config;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use quad_nav::debug::area_debug_draw;
use quad_nav::{NavAreaId, NavFile, NavMesh, Vec3};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "quadnav")]
#[command(about = "Bake, inspect, and query quad-area navigation meshes", version)]
struct Cli {
    /// Config file (defaults to ./quadnav.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a binary .nav file into a JSON mesh
    Bake {
        /// Input .nav file
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Keep the area IDs from the file
        #[arg(long)]
        no_compress: bool,
    },

    /// Show mesh statistics
    Inspect {
        /// Mesh file (.nav or .json)
        mesh: PathBuf,

        /// Dump the debug draw list of one area
        #[arg(long)]
        area: Option<u32>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Find a path between two points
    Path {
        /// Mesh file (.nav or .json)
        mesh: PathBuf,

        /// Start point as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Vec3,

        /// End point as x,y,z
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Vec3,

        /// Portal clearance, overrides the config
        #[arg(long)]
        margin: Option<f32>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            CliConfig::load_from_dir(&cwd)?
        }
    };

    match cli.command {
        Commands::Bake {
            input,
            output,
            no_compress,
        } => bake(&config, &input, &output, !no_compress),
        Commands::Inspect { mesh, area, json } => inspect(&config, &mesh, area, json),
        Commands::Path {
            mesh,
            from,
            to,
            margin,
            json,
        } => find_path(&config, &mesh, from, to, margin, json),
    }
}

fn parse_point(s: &str) -> std::result::Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z, got '{s}'"));
    };
    let parse = |v: &str| {
        v.parse::<f32>()
            .map_err(|e| format!("invalid coordinate '{v}': {e}"))
    };
    Ok(Vec3::new(parse(*x)?, parse(*y)?, parse(*z)?))
}

fn read_nav_mesh(config: &CliConfig, path: &Path, compress: bool) -> Result<NavMesh> {
    let mut file =
        NavFile::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if compress {
        file.compress_area_ids();
    }
    let mesh = file
        .to_builder()
        .with_context(|| format!("Unsupported areas in {}", path.display()))?
        .with_config(config.mesh_config())
        .build()
        .with_context(|| format!("Invalid nav mesh in {}", path.display()))?;
    Ok(mesh)
}

fn load_mesh(config: &CliConfig, path: &Path) -> Result<NavMesh> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("nav") => read_nav_mesh(config, path, config.compress_ids),
        Some("json") => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse mesh from {}", path.display()))
        }
        _ => bail!(
            "Unknown mesh format for {} (expected .nav or .json)",
            path.display()
        ),
    }
}

fn bake(config: &CliConfig, input: &Path, output: &Path, compress: bool) -> Result<()> {
    let mesh = read_nav_mesh(config, input, compress && config.compress_ids)?;
    let json = serde_json::to_string_pretty(&mesh).context("Failed to serialize mesh")?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        areas = mesh.len(),
        "Baked nav mesh"
    );
    Ok(())
}

#[derive(Serialize)]
struct MeshSummary {
    areas: usize,
    connections: usize,
    one_way: Vec<(NavAreaId, NavAreaId)>,
    isolated: Vec<NavAreaId>,
}

fn inspect(config: &CliConfig, path: &Path, area: Option<u32>, json: bool) -> Result<()> {
    let mesh = load_mesh(config, path)?;

    if let Some(id) = area {
        let Some(area) = mesh.area_by_id(NavAreaId(id)) else {
            bail!("No area {} in {}", id, path.display());
        };
        let draw = area_debug_draw(&mesh, area);
        if json {
            println!("{}", serde_json::to_string_pretty(&draw)?);
            return Ok(());
        }

        println!("Area {}", area.id());
        println!("  center: {:?}", area.center());
        for (i, corner) in area.corners().iter().enumerate() {
            println!("  corner {}: {:?}", i, corner);
        }
        for (dir, connection) in area.all_connections() {
            println!(
                "  {:?} -> {} (edge {})",
                dir, connection.area_id, connection.edge_index
            );
        }
        println!("  {} lines, {} labels", draw.lines.len(), draw.labels.len());
        return Ok(());
    }

    let summary = MeshSummary {
        areas: mesh.len(),
        connections: mesh.areas().iter().map(|a| a.connection_count()).sum(),
        one_way: mesh.one_way_connections(),
        isolated: mesh
            .areas()
            .iter()
            .filter(|a| a.connection_count() == 0)
            .map(|a| a.id())
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Nav mesh {}", path.display());
    println!("  Areas:        {}", summary.areas);
    println!("  Connections:  {}", summary.connections);
    println!("  One-way:      {}", summary.one_way.len());
    println!("  Isolated:     {}", summary.isolated.len());
    for (from, to) in summary.one_way.iter() {
        println!("    {} -> {}", from, to);
    }
    Ok(())
}

fn find_path(
    config: &CliConfig,
    path: &Path,
    from: Vec3,
    to: Vec3,
    margin: Option<f32>,
    json: bool,
) -> Result<()> {
    let mesh = load_mesh(config, path)?;
    let margin = margin.unwrap_or(config.margin);
    let route = mesh.find_nav_path(from, to, margin);

    tracing::debug!(points = route.points.len(), kind = ?route.kind, "Path query");

    if json {
        println!("{}", serde_json::to_string_pretty(&route)?);
        return Ok(());
    }

    if route.is_empty() {
        println!("no path");
        return Ok(());
    }

    for point in route.points.iter() {
        println!("{} {} {}", point.x, point.y, point.z);
    }
    println!("# {:?}, length {:.2}", route.kind, route.length());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(
            parse_point("1, -2.5,3").unwrap(),
            Vec3::new(1.0, -2.5, 3.0)
        );
        assert!(parse_point("1,2").is_err());
        assert!(parse_point("a,b,c").is_err());
    }

    #[test]
    fn test_load_mesh_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.txt");
        std::fs::write(&path, "").unwrap();
        assert!(load_mesh(&CliConfig::default(), &path).is_err());
    }

    #[test]
    fn test_load_mesh_from_json() {
        let json = r#"{"areas": [{"id": 1, "corners": [
            {"x": 0.0, "y": 0.0, "z": 0.0},
            {"x": 100.0, "y": 0.0, "z": 0.0},
            {"x": 100.0, "y": 100.0, "z": 0.0},
            {"x": 0.0, "y": 100.0, "z": 0.0}
        ]}]}"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.json");
        std::fs::write(&path, json).unwrap();

        let mesh = load_mesh(&CliConfig::default(), &path).unwrap();
        assert_eq!(mesh.len(), 1);
        let points = mesh.find_path(
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::new(90.0, 90.0, 0.0),
            quad_nav::DEFAULT_MARGIN,
        );
        assert_eq!(points.len(), 2);
    }
}
