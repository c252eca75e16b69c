use anyhow::Result;
use clap::Parser;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Default shadow-ray origin offset along the face normal, in geometry
/// units. Without an offset every query would re-intersect its own face.
pub const DEFAULT_RAY_OFFSET: f32 = 0.1;
/// Minimum shadow-ray parameter. Intersections closer than this are ignored.
pub const SHADOW_T_MIN: f32 = 1e-4;
/// Determinant threshold below which a ray is treated as parallel to a
/// triangle in the intersection test.
pub const INTERSECT_EPSILON: f32 = 1e-8;
/// Maximum number of triangles in a BVH leaf node.
pub const BVH_LEAF_SIZE: usize = 4;

/// Runtime configuration for the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Path to the subject (building) geometry, Wavefront .obj.
    pub geom_name: String,
    /// Path to the context (occluder) geometry, Wavefront .obj.
    pub context_name: Option<String>,
    /// Path to the sun direction data, one `x y z` vector per line.
    pub sun_name: String,
    #[serde(default = "default_ray_offset")]
    pub ray_offset: f32,
    /// Sun sampling rate in samples per hour, used for the sun-hours summary.
    #[serde(default = "default_timestep")]
    pub timestep: f32,
    #[serde(default = "default_directory")]
    pub directory: String,
}

fn default_ray_offset() -> f32 {
    DEFAULT_RAY_OFFSET
}

fn default_timestep() -> f32 {
    1.0
}

fn default_directory() -> String {
    "out".to_string()
}

pub fn load_default_config() -> Result<Settings> {
    let root_dir = retrieve_project_root();
    let default_config_file = root_dir.join("config/default.toml");

    let settings: Config = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .unwrap_or_else(|err| {
            eprintln!("Error loading configuration: {}", err);
            std::process::exit(1);
        });

    let config: Settings = settings.try_deserialize().unwrap_or_else(|err| {
        eprintln!("Error deserializing configuration: {}", err);
        std::process::exit(1);
    });

    validate_config(&config);

    Ok(config)
}

pub fn load_config() -> Result<Settings> {
    let root_dir = retrieve_project_root();

    let default_config_file = root_dir.join("config/default.toml");
    let local_config = root_dir.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        println!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        println!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings: Config = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("sunlit"))
        .build()
        .unwrap_or_else(|err| {
            eprintln!("Error loading configuration: {}", err);
            std::process::exit(1);
        });

    let mut config: Settings = settings.try_deserialize().unwrap_or_else(|err| {
        eprintln!("Error deserializing configuration: {}", err);
        std::process::exit(1);
    });

    // Parse command-line arguments and override values
    let args = CliArgs::parse();

    if let Some(geo) = args.geo {
        config.geom_name = geo;
    }
    if let Some(context) = args.context {
        config.context_name = Some(context);
    }
    if let Some(sun) = args.sun {
        config.sun_name = sun;
    }
    if let Some(offset) = args.offset {
        config.ray_offset = offset;
    }
    if let Some(timestep) = args.timestep {
        config.timestep = timestep;
    }
    if let Some(dir) = args.dir {
        config.directory = dir;
    }

    validate_config(&config);

    println!("{}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the SUNLIT_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
/// If none of these methods work, the function will panic.
fn retrieve_project_root() -> std::path::PathBuf {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        std::path::PathBuf::from(manifest_dir)
    } else if let Ok(path) = env::var("SUNLIT_ROOT_DIR") {
        // Allow explicit configuration via environment variable
        std::path::PathBuf::from(path)
    } else {
        // Fallback: walk upward from the executable directory until a
        // "config" subdirectory is found.
        let exe_path = env::current_exe().expect("Failed to get current executable path");
        let mut current_dir = exe_path
            .parent()
            .expect("Failed to get executable directory")
            .to_path_buf();
        let mut found = false;

        while !found && current_dir.parent().is_some() {
            if current_dir.join("config").is_dir() {
                found = true;
            } else {
                current_dir = current_dir.parent().unwrap().to_path_buf();
            }
        }

        if found {
            current_dir
        } else {
            panic!("Could not find project root directory");
        }
    }
}

fn validate_config(config: &Settings) {
    assert!(
        config.ray_offset.is_finite() && config.ray_offset >= 0.0,
        "Ray offset must be finite and non-negative"
    );
    assert!(config.timestep > 0.0, "Timestep must be greater than 0");
}

#[derive(Parser, Debug)]
#[command(version, about = "SUNLIT - Solar-exposure analysis for architectural scenes")]
pub struct CliArgs {
    /// File path to the subject (building) geometry.
    /// Currently, only the Wavefront .obj format is supported.
    #[arg(short, long)]
    geo: Option<String>,

    /// File path to the context (occluder) geometry.
    #[arg(short, long)]
    context: Option<String>,

    /// File path to the sun direction data, one `x y z` vector per line.
    #[arg(short, long)]
    sun: Option<String>,

    /// Shadow-ray origin offset along each face normal, in geometry units.
    #[arg(long)]
    offset: Option<f32>,

    /// Sun sampling rate in samples per hour (for the sun-hours summary).
    #[arg(long)]
    timestep: Option<f32>,

    /// Output directory for result files.
    #[arg(short, long)]
    dir: Option<String>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Subject geometry: {}
  - Context geometry: {}
  - Sun data: {}
  - Ray offset: {:.4}
  - Timestep: {:.2} samples/hour
  - Output directory: {}
  ",
            self.geom_name,
            self.context_name.as_deref().unwrap_or("(none)"),
            self.sun_name,
            self.ray_offset,
            self.timestep,
            self.directory,
        )
    }
}
