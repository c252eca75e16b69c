use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use crate::result::Results;
use crate::settings::Settings;


fn output_path(directory: &str, filename: &str) -> Result<PathBuf> {
    let dir = Path::new(directory);
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    Ok(dir.join(filename))
}

/// Writes the per-face exposure fractions to `exposure.txt` in the output
/// directory, one value per line in face order.
pub fn write_exposure(results: &Results, directory: &str) -> Result<()> {
    let path = output_path(directory, "exposure.txt")?;
    let file = File::create(&path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for value in &results.exposure {
        writeln!(writer, "{}", value)?;
    }

    Ok(())
}

#[derive(Serialize)]
struct Summary<'a> {
    generated: String,
    num_faces: usize,
    num_directions: usize,
    total_exposure: f32,
    mean_exposure: f32,
    max_exposure: f32,
    sunlit_faces: usize,
    settings: &'a Settings,
}

/// Writes a run summary to `summary.json`: aggregate statistics plus an
/// echo of the settings the run used.
pub fn write_summary(results: &Results, settings: &Settings) -> Result<()> {
    let summary = Summary {
        generated: Local::now().to_rfc3339(),
        num_faces: results.num_faces,
        num_directions: results.num_directions,
        total_exposure: results.total(),
        mean_exposure: results.mean(),
        max_exposure: results.max(),
        sunlit_faces: results.sunlit_faces(),
        settings,
    };

    let path = output_path(&settings.directory, "summary.json")?;
    let file = File::create(&path)
        .with_context(|| format!("failed to create output file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &summary)?;

    Ok(())
}

/// Writes the settings used for the run to `settings.toml` so a run can be
/// reproduced from its output directory.
pub fn write_settings(settings: &Settings) -> Result<()> {
    let path = output_path(&settings.directory, "settings.toml")?;
    let contents = toml::to_string_pretty(settings)?;
    fs::write(&path, contents)
        .with_context(|| format!("failed to write settings file: {}", path.display()))?;

    Ok(())
}
