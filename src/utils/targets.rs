use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

use crate::utils::error::{RatResult, TargetError};
use crate::utils::types::Target;

/// Targets read from a list file, plus the lines that were refused
#[derive(Debug, Clone, Default)]
pub struct TargetList {
    pub targets: Vec<Target>,
    /// (1-based line number, reason)
    pub rejected: Vec<(usize, String)>,
}

impl TargetList {
    /// Parse line-oriented text: one target per line, blank lines ignored
    pub fn parse(content: &str) -> Self {
        let mut list = TargetList::default();

        for (index, line) in content.lines().enumerate() {
            match Target::parse(line) {
                Ok(target) => list.targets.push(target),
                Err(TargetError::Empty) => {}
                Err(e) => list.rejected.push((index + 1, e.to_string())),
            }
        }

        list
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Read a target list file
pub fn load_targets(path: &Path) -> RatResult<TargetList> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TargetError::FileNotFound(path.to_path_buf()),
        _ => TargetError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    let list = TargetList::parse(&content);
    for (line, reason) in &list.rejected {
        warn!("Skipping line {} of {}: {}", line, path.display(), reason);
    }
    info!("Loaded {} target(s) from {}", list.len(), path.display());

    Ok(list)
}

/// Validate a target list and write it, one per line, to `destination`
pub fn import_targets(source: &Path, destination: &Path) -> RatResult<usize> {
    let list = load_targets(source)?;
    if list.is_empty() {
        return Err(TargetError::NoTargets(source.to_path_buf()).into());
    }

    let mut content = String::new();
    for target in &list.targets {
        content.push_str(target.as_str());
        content.push('\n');
    }

    std::fs::write(destination, content).map_err(|e| TargetError::Io {
        path: destination.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!("Imported {} target(s) into {}", list.len(), destination.display());
    Ok(list.len())
}
