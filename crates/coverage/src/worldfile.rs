//! Worldfile sidecars: six decimal lines holding the affine placement of a
//! raster file, used when the GeoTIFF tags are absent. The last two lines
//! carry the top left corner of the extent.

use crate::{Error, Georeference, Result};
use std::path::{Path, PathBuf};

/// Probe order next to the raster file; the first existing sidecar wins.
const SIDECAR_EXTENSIONS: [&str; 3] = ["tfw", "tifw", "wld"];

/// Parses worldfile content. Rotation terms are not supported and the vertical
/// resolution line must be negative, as written by every mainstream producer.
pub fn parse(content: &str, width: u32, height: u32) -> Result<Georeference> {
    let values = content
        .split_whitespace()
        .take(6)
        .map(str::parse::<f64>)
        .collect::<std::result::Result<Vec<f64>, _>>()?;

    if values.len() != 6 {
        return Err(Error::TruncatedData(format!(
            "A worldfile holds 6 values, found {}",
            values.len()
        )));
    }

    let x_res = values[0];
    let min_x = values[4];
    let max_y = values[5];

    if values[1] != 0.0 || values[2] != 0.0 {
        return Err(Error::UnsupportedFormat("Rotated worldfiles are not supported".to_string()));
    }

    let y_res = -values[3];
    if x_res <= 0.0 || y_res <= 0.0 {
        return Err(Error::InvalidNumber(format!(
            "Invalid worldfile resolutions: {} {}",
            x_res, values[3]
        )));
    }

    Ok(Georeference::with_origin(min_x, max_y, x_res, y_res, width, height))
}

/// Looks for a sidecar next to `raster_path` and parses the first one found.
pub fn read_for(raster_path: &Path, width: u32, height: u32) -> Result<Option<Georeference>> {
    for ext in SIDECAR_EXTENSIONS {
        let candidate = raster_path.with_extension(ext);
        if candidate.is_file() {
            log::debug!("Using worldfile {}", candidate.to_string_lossy());
            return parse(&std::fs::read_to_string(candidate)?, width, height).map(Some);
        }
    }

    Ok(None)
}

pub fn to_string(geo: &Georeference) -> String {
    format!("{}\n0.0\n0.0\n{}\n{}\n{}\n", geo.x_res, -geo.y_res, geo.min_x, geo.max_y)
}

/// Writes the `.tfw` sidecar for `raster_path` and returns its path.
pub fn write_for(raster_path: &Path, geo: &Georeference) -> Result<PathBuf> {
    let path = raster_path.with_extension("tfw");
    std::fs::write(&path, to_string(geo))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn parse_roundtrip() -> Result {
        let geo = Georeference::with_origin(1000.0, 2000.0, 2.5, 2.0, 100, 50);
        let parsed = parse(&to_string(&geo), 100, 50)?;

        assert_abs_diff_eq!(parsed.min_x, 1000.0);
        assert_abs_diff_eq!(parsed.max_y, 2000.0);
        assert_abs_diff_eq!(parsed.min_y, 1900.0);
        assert_abs_diff_eq!(parsed.max_x, 1250.0);
        assert_abs_diff_eq!(parsed.x_res, 2.5);
        assert_abs_diff_eq!(parsed.y_res, 2.0);
        Ok(())
    }

    #[test]
    fn rotation_terms_are_rejected() {
        assert!(parse("1.0\n0.1\n0.0\n-1.0\n0.0\n10.0\n", 10, 10).is_err());
    }

    #[test]
    fn truncated_content_is_rejected() {
        assert!(parse("1.0\n0.0\n0.0\n-1.0\n", 10, 10).is_err());
        assert!(parse("", 10, 10).is_err());
    }

    #[test]
    fn sidecar_probe_prefers_tfw() -> Result {
        let dir = tempfile::tempdir()?;
        let raster = dir.path().join("area.tif");

        let geo = Georeference::with_origin(5.0, 10.0, 1.0, 1.0, 4, 4);
        std::fs::write(dir.path().join("area.wld"), to_string(&geo))?;

        let preferred = Georeference::with_origin(50.0, 100.0, 1.0, 1.0, 4, 4);
        write_for(&raster, &preferred)?;

        let read = read_for(&raster, 4, 4)?.expect("sidecar present");
        assert_abs_diff_eq!(read.min_x, 50.0);
        Ok(())
    }

    #[test]
    fn missing_sidecar_reads_none() -> Result {
        let dir = tempfile::tempdir()?;
        let raster = dir.path().join("area.tif");
        assert!(read_for(&raster, 4, 4)?.is_none());
        Ok(())
    }
}
