use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::tools::Phase;
use crate::utils::{
    error::{RatResult, SinkError},
    types::Target,
};

/// Writes tool output to `<output-root>/<phase-dir>/<tool-id>/<target>.txt`
#[derive(Debug, Clone)]
pub struct ResultSink {
    output_root: PathBuf,
}

impl ResultSink {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn phase_root(&self, phase: Phase) -> PathBuf {
        self.output_root.join(phase.directory())
    }

    /// Where the artifact for (tool, target) lives
    pub fn artifact_path(&self, phase: Phase, tool_id: &str, target: &Target) -> PathBuf {
        self.phase_root(phase)
            .join(tool_id)
            .join(format!("{}.txt", target.as_str()))
    }

    /// Create the phase root and one directory per tool of the phase
    pub fn prepare(&self, phase: Phase) -> Result<(), SinkError> {
        for tool in phase.tools() {
            self.ensure_tool_dir(phase, tool.id())?;
        }
        Ok(())
    }

    /// Create `<phase-root>/<tool-id>/` if it does not exist yet
    pub fn ensure_tool_dir(&self, phase: Phase, tool_id: &str) -> Result<PathBuf, SinkError> {
        let dir = self.phase_root(phase).join(tool_id);
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        Ok(dir)
    }

    /// Persist `payload`, replacing any previous artifact for the same pair
    pub fn write(&self, phase: Phase, tool_id: &str, target: &Target, payload: &str) -> Result<PathBuf, SinkError> {
        if Target::parse(target.as_str()).is_err() {
            return Err(SinkError::UnsafeTarget(target.to_string()));
        }

        self.ensure_tool_dir(phase, tool_id)?;

        let path = self.artifact_path(phase, tool_id, target);
        fs::write(&path, payload).map_err(|e| io_error(&path, e))?;

        debug!("Wrote {} bytes to {}", payload.len(), path.display());
        Ok(path)
    }

    /// Delete and recreate one phase tree
    pub fn clear_phase(&self, phase: Phase) -> Result<(), SinkError> {
        let root = self.phase_root(phase);
        if root.exists() {
            fs::remove_dir_all(&root).map_err(|e| io_error(&root, e))?;
        }
        fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;
        info!("Cleared results under {}", root.display());
        Ok(())
    }

    pub fn clear_all(&self) -> RatResult<()> {
        for phase in Phase::ALL {
            self.clear_phase(phase)?;
        }
        Ok(())
    }

    /// Number of artifact files across all phases
    pub fn count_artifacts(&self) -> usize {
        Phase::ALL
            .iter()
            .map(|phase| {
                WalkDir::new(self.phase_root(*phase))
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file())
                    .count()
            })
            .sum()
    }
}

fn io_error(path: &Path, error: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
