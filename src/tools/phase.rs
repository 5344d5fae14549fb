use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::tools::tool_spec::ToolSpec;
use crate::utils::error::RegistryError;

/// A group of related tools sharing one output directory root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Phase {
    /// Passive information gathering
    #[value(name = "recon", alias = "phase1")]
    Reconnaissance,
    /// Port and service scanning
    #[value(name = "scanning", alias = "phase2")]
    Scanning,
    /// Web content, injection and credential enumeration
    #[value(name = "enumeration", alias = "phase3")]
    Enumeration,
}

impl Phase {
    /// All phases in menu order
    pub const ALL: [Phase; 3] = [Phase::Reconnaissance, Phase::Scanning, Phase::Enumeration];

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Reconnaissance => "recon",
            Phase::Scanning => "scanning",
            Phase::Enumeration => "enumeration",
        }
    }

    /// Directory under the output root that holds this phase's artifacts
    pub fn directory(&self) -> &'static str {
        match self {
            Phase::Reconnaissance => "phase1",
            Phase::Scanning => "phase2",
            Phase::Enumeration => "phase3",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Phase::Reconnaissance => "PHASE 1: RECONNAISSANCE",
            Phase::Scanning => "PHASE 2: SCANNING",
            Phase::Enumeration => "PHASE 3: ENUMERATION",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Phase::Reconnaissance => "Reconnaissance",
            Phase::Scanning => "Scanning",
            Phase::Enumeration => "Enumeration",
        }
    }

    /// Tools of this phase in display order
    pub fn tools(&self) -> Vec<ToolSpec> {
        ToolSpec::ALL.iter().copied().filter(|tool| tool.phase() == *self).collect()
    }

    /// Whether any tool of the phase reads a configurable wordlist
    pub fn uses_wordlists(&self) -> bool {
        self.tools().iter().any(|tool| tool.wordlist().is_some())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Phase::ALL
            .iter()
            .copied()
            .find(|phase| phase.name() == lowered || phase.directory() == lowered)
            .ok_or_else(|| RegistryError::UnknownPhase(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_tool_counts() {
        assert_eq!(Phase::Reconnaissance.tools().len(), 7);
        assert_eq!(Phase::Scanning.tools().len(), 12);
        assert_eq!(Phase::Enumeration.tools().len(), 14);
    }

    #[test]
    fn test_phase_display_order_starts_with_first_registered_tool() {
        assert_eq!(Phase::Reconnaissance.tools()[0], ToolSpec::Whois);
        assert_eq!(Phase::Scanning.tools()[0], ToolSpec::NmapSkipPing);
        assert_eq!(Phase::Enumeration.tools()[0], ToolSpec::DirbusterDirs);
    }

    #[test]
    fn test_only_enumeration_uses_wordlists() {
        assert!(!Phase::Reconnaissance.uses_wordlists());
        assert!(!Phase::Scanning.uses_wordlists());
        assert!(Phase::Enumeration.uses_wordlists());
    }

    #[test]
    fn test_phase_from_str() {
        assert_eq!("recon".parse::<Phase>().unwrap(), Phase::Reconnaissance);
        assert_eq!("phase2".parse::<Phase>().unwrap(), Phase::Scanning);
        assert_eq!("Enumeration".parse::<Phase>().unwrap(), Phase::Enumeration);
        assert!(matches!("phase4".parse::<Phase>(), Err(RegistryError::UnknownPhase(_))));
    }
}
