use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::info;

use crate::bake::spec::BakeSpec;
use crate::bake::ImageBaker;
use crate::error::{ReleaserError, Result};

/// Default path of the generated bake file
pub const DEFAULT_BAKE_FILE: &str = "bake.spec.json";

/// Default path where buildx writes build metadata
pub const DEFAULT_METADATA_FILE: &str = "bake.output.json";

/// Builds images with `docker buildx bake`
#[derive(Debug, Clone)]
pub struct BuildxBaker {
    pub bake_file: PathBuf,
    pub metadata_file: PathBuf,
    pub push: bool,
    /// Only build this target (or group) when set
    pub target: Option<String>,
    program: String,
}

impl BuildxBaker {
    pub fn new(bake_file: impl Into<PathBuf>, metadata_file: impl Into<PathBuf>) -> Self {
        BuildxBaker {
            bake_file: bake_file.into(),
            metadata_file: metadata_file.into(),
            push: false,
            target: None,
            program: "docker".to_string(),
        }
    }

    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    pub fn with_target(mut self, target: Option<String>) -> Self {
        self.target = target;
        self
    }

    /// Run another executable instead of `docker`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments passed to the docker executable
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![
            "buildx".to_string(),
            "bake".to_string(),
            "--file".to_string(),
            self.bake_file.display().to_string(),
            "--metadata-file".to_string(),
            self.metadata_file.display().to_string(),
        ];
        if self.push {
            args.push("--push".to_string());
        }
        if let Some(target) = &self.target {
            args.push(target.clone());
        }
        args
    }
}

impl ImageBaker for BuildxBaker {
    fn bake(&self, spec: &BakeSpec) -> Result<()> {
        fs::write(&self.bake_file, spec.to_bake_file()?)?;
        info!(
            "bake file with {} target(s) written to {}",
            spec.target.len(),
            self.bake_file.display()
        );

        let args = self.command_args();
        info!("running {} {}", self.program, args.join(" "));
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| ReleaserError::bake(format!("failed to run {}: {}", self.program, e)))?;

        if !status.success() {
            return Err(ReleaserError::bake(format!(
                "{} buildx bake exited with code {}",
                self.program,
                status.code().unwrap_or(-1)
            )));
        }
        Ok(())
    }
}
