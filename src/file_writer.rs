//! File output for rendered results.
//!
//! Writes go to `output_dir/<timestamp>/msg-intel.<ext>` so repeated runs never
//! overwrite each other.

use crate::error::Result;
use crate::models::RenderFormat;
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Base name of every output file
pub const OUTPUT_STEM: &str = "msg-intel";

/// Directory-name timestamp format (e.g. `2025-01-15_14-30-00`)
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Write rendered output under a timestamp-named directory.
///
/// # Arguments
///
/// * `rendered` - Output of [`crate::render::render`]
/// * `format` - Format it was rendered in; picks the file extension
/// * `output_dir` - Base output directory, created if missing
/// * `timestamp` - Directory name for this run
///
/// # Returns
///
/// Path of the created file
pub fn write_rendered_to_timestamped_dir(
    rendered: &str,
    format: RenderFormat,
    output_dir: &Path,
    timestamp: &str,
) -> Result<PathBuf> {
    let run_dir = output_dir.join(timestamp);
    create_dir_all(&run_dir)?;

    let file_path = run_dir.join(format!("{OUTPUT_STEM}.{}", format.extension()));
    write_rendered_to_file(rendered, &file_path)?;
    Ok(file_path)
}

/// Write rendered output to a file, ending with a newline.
pub fn write_rendered_to_file(rendered: &str, file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;
    let mut writer = BufWriter::new(file);

    writer.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_under_timestamp_dir() {
        let dir = tempdir().unwrap();
        let path =
            write_rendered_to_timestamped_dir("a,b", RenderFormat::Csv, dir.path(), "2025-01-15_14-30-00").unwrap();

        assert_eq!(path, dir.path().join("2025-01-15_14-30-00").join("msg-intel.csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\n");
    }

    #[test]
    fn test_extension_follows_format() {
        let dir = tempdir().unwrap();
        let path = write_rendered_to_timestamped_dir("{}", RenderFormat::Json, dir.path(), "run").unwrap();
        assert!(path.to_string_lossy().ends_with("msg-intel.json"));
    }
}
