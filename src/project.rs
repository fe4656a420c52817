//! Directory-level builds: images + `config.json` -> container file.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::animation::EncodeStats;
use crate::error::{Error, Result};
use crate::schema::{ProjectConfig, SequenceConfig};
use crate::sequence::Sequence;
use crate::source;

/// Name of the per-directory configuration file.
pub const CONFIG_FILE: &str = "config.json";

/// Outcome of building one directory.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub directory: PathBuf,
    pub output: PathBuf,
    pub image_count: usize,
    pub config: SequenceConfig,
    pub stats: EncodeStats,
}

impl std::fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({} images, {})",
            self.directory.display(),
            self.output.display(),
            self.image_count,
            self.stats
        )
    }
}

/// Read and validate `<dir>/config.json`.
pub fn load_config<P: AsRef<Path>>(dir: P) -> Result<SequenceConfig> {
    let path = dir.as_ref().join(CONFIG_FILE);
    if !path.is_file() {
        return Err(Error::MissingConfig(dir.as_ref().to_path_buf()));
    }
    let text = fs::read_to_string(&path)?;
    let config: ProjectConfig = serde_json::from_str(&text)?;
    Ok(config.into_sequence_config()?)
}

/// Default output path: `<dir>/<dirname>_sequence.bin`.
pub fn default_output_path<P: AsRef<Path>>(dir: P) -> PathBuf {
    let dir = dir.as_ref();
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    dir.join(format!("{}_sequence.bin", name))
}

/// Build the container for one image directory.
///
/// `output` defaults to [`default_output_path`]. A directory without
/// usable images is an error; no file is written.
pub fn build_directory<P: AsRef<Path>>(dir: P, output: Option<&Path>) -> Result<BuildSummary> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )
        .into());
    }
    let config = load_config(dir)?;

    let files = source::image_files(dir)?;
    if files.is_empty() {
        return Err(Error::NoImages(dir.to_path_buf()));
    }
    log::info!("Found {} image file(s) in {}", files.len(), dir.display());

    let stills = source::load_frames(&files)?;
    let sequence = Sequence::assemble(stills, &config)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(dir));
    let stats = sequence.write_to(&output)?;

    Ok(BuildSummary {
        directory: dir.to_path_buf(),
        output,
        image_count: files.len(),
        config,
        stats,
    })
}

/// Subdirectories of `root` that carry a `config.json`, sorted.
pub fn project_directories<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root.as_ref())? {
        let path = entry?.path();
        if path.is_dir() && path.join(CONFIG_FILE).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Build every project directory under `root` in parallel.
///
/// Each directory is independent; one failing does not stop the others.
pub fn build_all<P: AsRef<Path>>(root: P) -> Result<Vec<(PathBuf, Result<BuildSummary>)>> {
    let dirs = project_directories(root)?;
    log::info!("Building {} project(s)", dirs.len());

    Ok(dirs
        .into_par_iter()
        .map(|dir| {
            let result = build_directory(&dir, None);
            if let Err(e) = &result {
                log::warn!("{}: {}", dir.display(), e);
            }
            (dir, result)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{ContainerReader, validate};
    use crate::frame::{FrameBuffer, Rgb};
    use crate::source::save_png;
    use tempfile::tempdir;

    fn make_project(dir: &Path, images: usize, config: &str) {
        fs::create_dir_all(dir).unwrap();
        for i in 0..images {
            let frame = FrameBuffer::solid(4, 3, Rgb::new(0, 20 * i as u8 + 10, 0));
            save_png(&frame, dir.join(format!("frame_{}.png", i + 1))).unwrap();
        }
        fs::write(dir.join(CONFIG_FILE), config).unwrap();
    }

    #[test]
    fn test_build_directory_finite() {
        let root = tempdir().unwrap();
        let dir = root.path().join("melon");
        make_project(&dir, 3, r#"{"loop": 2, "loopDelay": 200, "countDown": false}"#);

        let summary = build_directory(&dir, None).unwrap();
        assert_eq!(summary.output, dir.join("melon_sequence.bin"));
        assert_eq!(summary.image_count, 3);
        // 2 x 3 stills + one 1-frame gap
        assert_eq!(summary.stats.frame_count, 7);

        let bytes = fs::read(&summary.output).unwrap();
        assert!(validate(&bytes).unwrap().is_valid());
        let reader = ContainerReader::new(&bytes).unwrap();
        assert_eq!(reader.dimensions(), (4, 3));
        assert!(reader.frame(3).unwrap().is_black());
        assert_eq!(
            reader.frame(4).unwrap().solid_color(),
            Some(Rgb::new(0, 10, 0))
        );
    }

    #[test]
    fn test_build_directory_infinite_default() {
        let root = tempdir().unwrap();
        let dir = root.path().join("hour");
        make_project(&dir, 2, "{}");

        let summary = build_directory(&dir, Some(&root.path().join("out.bin"))).unwrap();
        assert_eq!(summary.stats.frame_count, 18_000);
        assert_eq!(summary.stats.fps, 5);
    }

    #[test]
    fn test_missing_config_and_images() {
        let root = tempdir().unwrap();
        assert!(matches!(
            build_directory(root.path(), None),
            Err(Error::MissingConfig(_))
        ));

        fs::write(root.path().join(CONFIG_FILE), "{}").unwrap();
        assert!(matches!(
            build_directory(root.path(), None),
            Err(Error::NoImages(_))
        ));
        assert!(!default_output_path(root.path()).exists());
    }

    #[test]
    fn test_invalid_config_surfaces() {
        let root = tempdir().unwrap();
        make_project(root.path(), 1, r#"{"loopDelay": -1}"#);
        assert!(matches!(
            build_directory(root.path(), None),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_config_is_an_error() {
        let root = tempdir().unwrap();
        let big = root.path().join("big");
        make_project(&big, 1, r#"{"loop": 2, "loopDelay": 9000000000000000000}"#);
        make_project(&root.path().join("small"), 1, r#"{"loop": 1}"#);

        assert!(matches!(
            build_directory(&big, None),
            Err(Error::TooManyFrames)
        ));
        assert!(!default_output_path(&big).exists());

        let results = build_all(root.path()).unwrap();
        assert!(matches!(results[0].1, Err(Error::TooManyFrames)));
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_build_all_is_independent() {
        let root = tempdir().unwrap();
        make_project(&root.path().join("a"), 2, r#"{"loop": 1, "countDown": false}"#);
        make_project(&root.path().join("b"), 0, r#"{"loop": 1}"#);
        fs::create_dir_all(root.path().join("not_a_project")).unwrap();

        let results = build_all(root.path()).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(Error::NoImages(_))));
    }
}
