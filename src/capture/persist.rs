//! Writing the dated image and its "latest" copy.

use crate::config::{OutputConfig, Params};
use crate::config::params::substitute;
use crate::{BestEffort, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where this run's images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub dated: PathBuf,
    pub latest: PathBuf,
}

impl ArtifactPaths {
    /// Expand `${date}` in the configured names and join them to the output dir.
    pub fn resolve(output: &OutputConfig, date: &str) -> Self {
        let params = Params::new().set("date", date);
        Self {
            dated: output.dir.join(substitute(&output.dated_name, &params)),
            latest: output.dir.join(substitute(&output.latest_name, &params)),
        }
    }
}

/// Images written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub dated: PathBuf,
    pub latest: BestEffort<PathBuf>,
}

/// Write the dated image atomically, then refresh the latest copy.
///
/// A failed dated write is an error and leaves no file behind. A failed
/// latest copy is logged and reported as ignored.
pub fn persist(png: &[u8], paths: &ArtifactPaths) -> Result<Artifacts> {
    write_atomic(&paths.dated, png)?;
    info!("Saved: {}", paths.dated.display());

    let latest = BestEffort::from_result("latest_copy", copy_latest(&paths.dated, &paths.latest));
    if let BestEffort::Ignored(ref i) = latest {
        warn!("{}", i);
    }

    Ok(Artifacts {
        dated: paths.dated.clone(),
        latest,
    })
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn copy_latest(dated: &Path, latest: &Path) -> Result<PathBuf> {
    fs::create_dir_all(parent_dir(latest))?;
    fs::copy(dated, latest)?;
    Ok(latest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths_in(dir: &Path) -> ArtifactPaths {
        let output = OutputConfig {
            dir: dir.join("site"),
            ..Default::default()
        };
        ArtifactPaths::resolve(&output, "2024-06-01")
    }

    #[test]
    fn test_resolve_expands_date() {
        let paths = ArtifactPaths::resolve(&OutputConfig::default(), "2024-06-01");
        assert_eq!(paths.dated, PathBuf::from("site/sp500_heatmap_2024-06-01.png"));
        assert_eq!(paths.latest, PathBuf::from("site/sp500_heatmap_latest.png"));
    }

    #[test]
    fn test_persist_writes_both() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let artifacts = persist(b"png-bytes", &paths).unwrap();

        assert_eq!(fs::read(&paths.dated).unwrap(), b"png-bytes");
        assert_eq!(fs::read(&paths.latest).unwrap(), b"png-bytes");
        assert_eq!(artifacts.latest, BestEffort::Done(paths.latest.clone()));
    }

    #[test]
    fn test_latest_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::create_dir_all(paths.latest.parent().unwrap()).unwrap();
        fs::write(&paths.latest, b"yesterday").unwrap();

        persist(b"today", &paths).unwrap();

        assert_eq!(fs::read(&paths.latest).unwrap(), b"today");
    }

    #[test]
    fn test_latest_failure_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        // A directory squatting on the latest path makes the copy fail.
        fs::create_dir_all(&paths.latest).unwrap();

        let artifacts = persist(b"png", &paths).unwrap();

        assert_eq!(fs::read(&artifacts.dated).unwrap(), b"png");
        match artifacts.latest {
            BestEffort::Ignored(i) => assert_eq!(i.step, "latest_copy"),
            BestEffort::Done(_) => panic!("Expected Ignored"),
        }
    }

    #[test]
    fn test_dated_failure_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        fs::create_dir_all(&paths.dated).unwrap();

        assert!(persist(b"png", &paths).is_err());

        let leftovers: Vec<_> = fs::read_dir(dir.path().join("site"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path() != paths.dated)
            .collect();
        assert!(leftovers.is_empty(), "stray files: {:?}", leftovers);
    }
}
