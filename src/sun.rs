use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use nalgebra::Vector3;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn altaz_zenith_points_up() {
        let v = from_altaz(90.0, 0.0);
        assert!((v.z - 1.0).abs() < 1e-6);
        assert!(v.x.abs() < 1e-6 && v.y.abs() < 1e-6);
    }

    #[test]
    fn altaz_horizon_east() {
        // Azimuth 90 deg = east; at the horizon the vector is horizontal.
        let v = from_altaz(0.0, 90.0);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!(v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
    }

    #[test]
    fn altaz_is_unit_length() {
        let v = from_altaz(37.5, 213.0);
        assert!((v.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sun_file_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join("sunlit_sun_file_test.txt");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "# one sun vector per line").unwrap();
            writeln!(file).unwrap();
            writeln!(file, "0.0 0.0 1.0").unwrap();
            writeln!(file, "0.5 0.5 0.707").unwrap();
        }
        let suns = read_sun_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(suns.len(), 2);
        assert_eq!(suns[0], Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn sun_file_rejects_short_lines() {
        let dir = std::env::temp_dir();
        let path = dir.join("sunlit_sun_file_bad.txt");
        std::fs::write(&path, "1.0 2.0\n").unwrap();
        let result = read_sun_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }
}

/// Reads sun direction vectors from a text file: one `x y z` triple per
/// line, whitespace-separated. Empty lines and lines starting with `#` are
/// skipped. Vectors point from a face toward the sun.
pub fn read_sun_file(path: &Path) -> Result<Vec<Vector3<f32>>> {
    let file =
        File::open(path).with_context(|| format!("failed to open sun file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut suns = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let components: Vec<f32> = trimmed
            .split_whitespace()
            .map(|s| {
                s.parse::<f32>()
                    .with_context(|| format!("line {}: failed to parse '{}'", lineno + 1, s))
            })
            .collect::<Result<_>>()?;

        if components.len() != 3 {
            bail!(
                "line {}: expected 3 components, got {}",
                lineno + 1,
                components.len()
            );
        }

        suns.push(Vector3::new(components[0], components[1], components[2]));
    }

    Ok(suns)
}

/// Converts a solar position to a unit direction vector pointing from a
/// face toward the sun.
///
/// Altitude is in degrees above the horizon; azimuth is in degrees from
/// north, clockwise (0 = N, 90 = E, 180 = S, 270 = W). The scene frame is
/// x = east, y = north, z = up.
pub fn from_altaz(altitude_deg: f32, azimuth_deg: f32) -> Vector3<f32> {
    let alt = altitude_deg.to_radians();
    let az = azimuth_deg.to_radians();
    Vector3::new(alt.cos() * az.sin(), alt.cos() * az.cos(), alt.sin())
}
