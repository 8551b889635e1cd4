// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Screen frames and the golden snapshot store
//!
//! Frames are compared by a SHA-256 digest over their dimensions and
//! RGBA pixel data. Snapshots are stored as PNG (lossless), so a
//! recorded frame always reloads to the same digest.
//!
//! ```text
//! <golden>/<flow>/<index:05>.png    baselines (read-only when verifying)
//! <scratch>/<flow>/<index:05>.png   frames captured by the last run
//! ```

use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use image::RgbaImage;
use log::{debug, info, warn};
use sha2::{Digest, Sha256};

use crate::HarnessError;

/// Captured screen frame
#[derive(Clone, Debug)]
pub struct Frame {
    image: RgbaImage,
    digest: [u8; 32],
}

impl Frame {
    /// Create a frame from a captured image
    pub fn new(image: RgbaImage) -> Self {
        let (w, h) = image.dimensions();

        let mut d = Sha256::new();
        d.update(w.to_be_bytes());
        d.update(h.to_be_bytes());
        d.update(image.as_raw());

        Self {
            image,
            digest: d.finalize().into(),
        }
    }

    /// Load a frame from an image file
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let i = image::open(path)?;
        Ok(Self::new(i.to_rgba8()))
    }

    /// Save the frame as PNG
    pub fn save(&self, path: &Path) -> Result<(), HarnessError> {
        self.image.save(path)?;
        Ok(())
    }

    /// Content digest
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl Eq for Frame {}

impl Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.digest[..8]))
    }
}

/// Snapshot store behaviour
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SnapshotMode {
    /// Compare captures against the golden set
    Verify,
    /// Write captures into the golden set
    Record,
}

/// Golden / scratch snapshot store
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    golden: PathBuf,
    scratch: PathBuf,
    mode: SnapshotMode,
}

impl SnapshotStore {
    pub fn new(golden: impl Into<PathBuf>, scratch: impl Into<PathBuf>, mode: SnapshotMode) -> Self {
        Self {
            golden: golden.into(),
            scratch: scratch.into(),
            mode,
        }
    }

    pub fn mode(&self) -> SnapshotMode {
        self.mode
    }

    /// Path for a golden snapshot
    pub fn golden_path(&self, flow: &str, index: usize) -> PathBuf {
        self.golden.join(flow).join(snapshot_name(index))
    }

    /// Path for a captured snapshot
    pub fn scratch_path(&self, flow: &str, index: usize) -> PathBuf {
        self.scratch.join(flow).join(snapshot_name(index))
    }

    /// Reset the scratch set for a flow (and the golden set when recording)
    pub fn prepare(&self, flow: &str) -> Result<(), HarnessError> {
        let mut dirs = vec![self.scratch.join(flow)];
        if self.mode == SnapshotMode::Record {
            dirs.push(self.golden.join(flow));
        }

        for d in dirs {
            if d.exists() {
                std::fs::remove_dir_all(&d)?;
            }
            std::fs::create_dir_all(&d)?;
        }

        Ok(())
    }

    /// Store a captured frame and check it against the golden set
    pub fn check(&self, flow: &str, index: usize, frame: &Frame) -> Result<(), HarnessError> {
        frame.save(&self.scratch_path(flow, index))?;

        let golden = self.golden_path(flow, index);

        if self.mode == SnapshotMode::Record {
            info!("Recording {flow}[{index}] ({frame})");
            return frame.save(&golden);
        }

        if !golden.is_file() {
            warn!("Missing golden snapshot: {}", golden.display());
            return Err(mismatch(flow, index));
        }

        let expected = Frame::load(&golden)?;
        if expected != *frame {
            warn!("Snapshot {flow}[{index}] mismatch (expected {expected}, found {frame})");
            return Err(mismatch(flow, index));
        }

        debug!("Snapshot {flow}[{index}] matched ({frame})");

        Ok(())
    }

    /// Count golden snapshots recorded for a flow
    pub fn golden_count(&self, flow: &str) -> usize {
        let mut n = 0;
        while self.golden_path(flow, n).is_file() {
            n += 1;
        }
        n
    }
}

fn snapshot_name(index: usize) -> String {
    format!("{index:05}.png")
}

fn mismatch(flow: &str, index: usize) -> HarnessError {
    HarnessError::SnapshotMismatch {
        flow: flow.to_string(),
        index,
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    fn frame(v: u8) -> Frame {
        Frame::new(RgbaImage::from_pixel(8, 4, Rgba([v, v, v, 255])))
    }

    #[test]
    fn frame_digest() {
        assert_eq!(frame(1), frame(1));
        assert_ne!(frame(1), frame(2));

        // Same pixels, different dimensions
        let a = Frame::new(RgbaImage::from_pixel(8, 4, Rgba([0, 0, 0, 255])));
        let b = Frame::new(RgbaImage::from_pixel(4, 8, Rgba([0, 0, 0, 255])));
        assert_ne!(a, b);
    }

    #[test]
    fn record_and_verify() {
        let d = tempfile::tempdir().unwrap();
        let (golden, scratch) = (d.path().join("golden"), d.path().join("tmp"));

        let s = SnapshotStore::new(&golden, &scratch, SnapshotMode::Record);
        s.prepare("flow").unwrap();
        s.check("flow", 0, &frame(1)).unwrap();
        s.check("flow", 1, &frame(2)).unwrap();

        assert_eq!(s.golden_count("flow"), 2);
        assert!(golden.join("flow/00001.png").is_file());

        let s = SnapshotStore::new(&golden, &scratch, SnapshotMode::Verify);
        s.prepare("flow").unwrap();
        s.check("flow", 0, &frame(1)).unwrap();

        assert!(matches!(
            s.check("flow", 1, &frame(3)),
            Err(HarnessError::SnapshotMismatch { index: 1, .. })
        ));
        assert!(matches!(
            s.check("flow", 2, &frame(3)),
            Err(HarnessError::SnapshotMismatch { index: 2, .. })
        ));

        // Verification never writes the golden set
        assert_eq!(s.golden_count("flow"), 2);
        assert!(scratch.join("flow/00002.png").is_file());
    }
}
