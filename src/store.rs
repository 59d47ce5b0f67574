use std::cell::RefCell;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::domain::Manifest;
use crate::error::{ReleaserError, Result};

/// Destination (and optional source) of generated manifests
pub trait ManifestWriter {
    fn write_manifest(&self, manifest: &Manifest) -> Result<()>;

    /// Read back a previously written manifest, `None` if nothing was written
    fn read_manifest(&self) -> Result<Option<Manifest>>;
}

/// Writes the manifest as compact JSON to a file that must not exist yet
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileWriter { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ManifestWriter for JsonFileWriter {
    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        let json = manifest.to_json()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => ReleaserError::OutputExists(self.path.clone()),
                _ => e.into(),
            })?;
        file.write_all(json.as_bytes())?;
        info!("manifest written to {}", self.path.display());
        Ok(())
    }

    fn read_manifest(&self) -> Result<Option<Manifest>> {
        if !self.path.exists() {
            debug!("no manifest at {}", self.path.display());
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(Manifest::from_json(&content)?))
    }
}

/// Prints the manifest as compact JSON on standard output
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl ManifestWriter for StdoutWriter {
    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        println!("{}", manifest.to_json()?);
        Ok(())
    }

    fn read_manifest(&self) -> Result<Option<Manifest>> {
        Err(ReleaserError::ReadBackUnsupported("stdout".to_string()))
    }
}

/// Keeps the last written manifest in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    manifest: RefCell<Option<Manifest>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the stored manifest out of the writer
    pub fn take(&self) -> Option<Manifest> {
        self.manifest.borrow_mut().take()
    }
}

impl ManifestWriter for MemoryWriter {
    fn write_manifest(&self, manifest: &Manifest) -> Result<()> {
        *self.manifest.borrow_mut() = Some(manifest.clone());
        Ok(())
    }

    fn read_manifest(&self) -> Result<Option<Manifest>> {
        Ok(self.manifest.borrow().clone())
    }
}
