//! Persisted artifacts: the calibration homography and the locked target point.
//!
//! Both are small JSON documents. A missing file loads as `None`; a corrupt file also
//! loads as `None` (with a warning) so startup proceeds uncalibrated or unlocked.

use crate::{homography::Homography, mapper::PixelPoint, Error, Result};
use log::{debug, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CalibrationArtifact {
    /// Row-major 3x3 matrix
    homography: [[f64; 3]; 3],
    /// Source points in click order, kept for inspection
    #[serde(default)]
    source_points: Vec<PixelPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TargetLockArtifact {
    x: f64,
    y: f64,
}

/// JSON file holding one artifact
#[derive(Debug, Clone)]
pub struct ArtifactFile {
    path: PathBuf,
}

impl ArtifactFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::MalformedArtifact {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn write<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&self.path, content)?;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Read, treating decode errors as absent
    fn load_or_absent<T: DeserializeOwned>(&self) -> Option<T> {
        match self.read() {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring persisted artifact: {e}");
                None
            }
        }
    }
}

/// Where the calibration homography lives on disk
#[derive(Debug, Clone)]
pub struct CalibrationStore {
    file: ArtifactFile,
}

impl CalibrationStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file: ArtifactFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load a previously saved homography, if present and well-formed
    pub fn load(&self) -> Option<Homography> {
        let artifact: CalibrationArtifact = self.file.load_or_absent()?;
        let homography = Homography::from_array(artifact.homography);
        if !homography.is_valid() {
            warn!("Ignoring singular calibration in {}", self.path().display());
            return None;
        }
        info!("Calibration loaded from {}", self.path().display());
        Some(homography)
    }

    /// Overwrite the persisted calibration
    pub fn save(&self, homography: &Homography, source_points: &[PixelPoint]) -> Result<()> {
        self.file.write(&CalibrationArtifact {
            homography: homography.to_array(),
            source_points: source_points.to_vec(),
        })?;
        info!("Calibration saved to {}", self.path().display());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.file.remove()
    }
}

/// Where the manually locked target point lives on disk
#[derive(Debug, Clone)]
pub struct TargetLockStore {
    file: ArtifactFile,
}

impl TargetLockStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file: ArtifactFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn load(&self) -> Option<PixelPoint> {
        let artifact: TargetLockArtifact = self.file.load_or_absent()?;
        if !artifact.x.is_finite() || !artifact.y.is_finite() {
            warn!("Ignoring non-finite target lock in {}", self.path().display());
            return None;
        }
        Some(PixelPoint::new(artifact.x, artifact.y))
    }

    pub fn save(&self, point: PixelPoint) -> Result<()> {
        self.file.write(&TargetLockArtifact { x: point.x, y: point.y })
    }

    pub fn clear(&self) -> Result<()> {
        self.file.remove()
    }
}
