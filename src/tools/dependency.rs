use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::tools::executor::CommandExecutor;
use crate::utils::error::{RatError, RatResult};

/// An external binary the toolkit drives, with its distribution package names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub name: &'static str,
    pub command: &'static str,
    pub apt_package: &'static str,
    pub pacman_package: &'static str,
}

const fn dep(name: &'static str, command: &'static str, apt: &'static str, pacman: &'static str) -> Dependency {
    Dependency {
        name,
        command,
        apt_package: apt,
        pacman_package: pacman,
    }
}

pub const DEPENDENCIES: [Dependency; 13] = [
    dep("whois", "whois", "whois", "whois"),
    dep("nslookup", "nslookup", "dnsutils", "bind-tools"),
    dep("whatweb", "whatweb", "whatweb", "whatweb"),
    dep("theHarvester", "theHarvester", "theharvester", "theharvester"),
    dep("amass", "amass", "amass", "amass"),
    dep("sublist3r", "sublist3r", "sublist3r", "sublist3r"),
    dep("nuclei", "nuclei", "nuclei", "nuclei"),
    dep("nmap", "nmap", "nmap", "nmap"),
    dep("dirb", "dirb", "dirb", "dirb"),
    dep("gobuster", "gobuster", "gobuster", "gobuster"),
    dep("hydra", "hydra", "hydra", "hydra"),
    dep("sqlmap", "sqlmap", "sqlmap", "sqlmap"),
    dep("nikto", "nikto", "nikto", "nikto"),
];

impl Dependency {
    /// Arguments that make the tool print a version or usage banner
    pub fn version_probe(&self) -> Vec<String> {
        let flag = match self.name {
            "amass" | "nuclei" | "sublist3r" | "theHarvester" => "-h",
            _ => "--version",
        };
        vec![self.command.to_string(), flag.to_string()]
    }

    pub fn package(&self, manager: PackageManager) -> &'static str {
        match manager {
            PackageManager::Apt => self.apt_package,
            PackageManager::Pacman => self.pacman_package,
        }
    }
}

/// Supported system package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Pacman,
}

impl PackageManager {
    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Pacman => "pacman",
        }
    }

    pub fn update_command(&self) -> Vec<String> {
        match self {
            PackageManager::Apt => vec!["apt".to_string(), "update".to_string()],
            PackageManager::Pacman => vec!["pacman".to_string(), "-Sy".to_string()],
        }
    }

    pub fn install_command(&self, package: &str) -> Vec<String> {
        let mut command: Vec<String> = match self {
            PackageManager::Apt => vec!["apt".into(), "install".into(), "-y".into()],
            PackageManager::Pacman => vec!["pacman".into(), "-S".into(), "--noconfirm".into()],
        };
        command.push(package.to_string());
        command
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of probing one dependency
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    pub dependency: Dependency,
    pub path: Option<PathBuf>,
    /// First line of the version banner, when the probe answered in time
    pub version: Option<String>,
}

impl DependencyStatus {
    pub fn installed(&self) -> bool {
        self.path.is_some()
    }
}

/// Outcome of a full dependency check
#[derive(Debug, Clone)]
pub struct DependencyReport {
    pub statuses: Vec<DependencyStatus>,
    pub package_manager: Option<PackageManager>,
}

impl DependencyReport {
    pub fn installed(&self) -> Vec<&DependencyStatus> {
        self.statuses.iter().filter(|s| s.installed()).collect()
    }

    pub fn missing(&self) -> Vec<&DependencyStatus> {
        self.statuses.iter().filter(|s| !s.installed()).collect()
    }

    /// Commands a user can paste to install what is missing
    pub fn manual_install_commands(&self) -> Vec<String> {
        let Some(manager) = self.package_manager else {
            return Vec::new();
        };
        let missing = self.missing();
        if missing.is_empty() {
            return Vec::new();
        }

        let mut commands = vec![format!("sudo {}", manager.update_command().join(" "))];
        for status in missing {
            let install = manager.install_command(status.dependency.package(manager));
            commands.push(format!("sudo {}", install.join(" ")));
        }
        commands
    }
}

type Locator = Box<dyn Fn(&str) -> Option<PathBuf> + Send + Sync>;

/// Probes the search path for required tools and installs missing packages
pub struct DependencyChecker {
    executor: Arc<dyn CommandExecutor>,
    probe_timeout: Duration,
    locator: Locator,
}

impl DependencyChecker {
    /// Create a checker that resolves binaries on `PATH`
    pub fn new(executor: Arc<dyn CommandExecutor>, probe_timeout: Duration) -> Self {
        Self {
            executor,
            probe_timeout,
            locator: Box::new(|command| which::which(command).ok()),
        }
    }

    /// Replace the binary lookup
    pub fn with_locator<F>(mut self, locator: F) -> Self
    where
        F: Fn(&str) -> Option<PathBuf> + Send + Sync + 'static,
    {
        self.locator = Box::new(locator);
        self
    }

    pub fn detect_package_manager(&self) -> Option<PackageManager> {
        [PackageManager::Apt, PackageManager::Pacman]
            .into_iter()
            .find(|manager| (self.locator)(manager.name()).is_some())
    }

    /// Check every catalogued dependency, probing versions of the installed ones
    pub async fn check(&self) -> DependencyReport {
        let mut statuses = Vec::with_capacity(DEPENDENCIES.len());

        for dependency in DEPENDENCIES {
            let path = (self.locator)(dependency.command);
            let version = if path.is_some() {
                self.probe_version(&dependency).await
            } else {
                None
            };
            statuses.push(DependencyStatus { dependency, path, version });
        }

        let report = DependencyReport {
            statuses,
            package_manager: self.detect_package_manager(),
        };
        info!(
            "Dependency check completed. Installed: {}, Missing: {}",
            report.installed().len(),
            report.missing().len()
        );
        report
    }

    /// First non-empty banner line, from stdout or else stderr
    pub async fn probe_version(&self, dependency: &Dependency) -> Option<String> {
        let output = self
            .executor
            .execute(&dependency.version_probe(), Some(self.probe_timeout))
            .await
            .ok()?;

        let text = if output.stdout.trim().is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
    }

    /// Refresh the package index, then install each missing package.
    ///
    /// Returns one entry per missing dependency: its name and the install result.
    pub async fn install_missing(&self, report: &DependencyReport) -> RatResult<Vec<(String, Result<(), String>)>> {
        let manager = report.package_manager.ok_or_else(|| {
            RatError::Dependency(
                "Unsupported package manager. Only apt and pacman are supported.".to_string(),
            )
        })?;

        let missing = report.missing();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        self.run_checked(&manager.update_command())
            .await
            .map_err(|reason| RatError::Dependency(format!("Failed to update repository: {}", reason)))?;

        let mut results = Vec::with_capacity(missing.len());
        for status in missing {
            let package = status.dependency.package(manager);
            let result = self.run_checked(&manager.install_command(package)).await;
            match &result {
                Ok(()) => info!("Installed {} ({})", status.dependency.name, package),
                Err(reason) => warn!("Failed to install {}: {}", status.dependency.name, reason),
            }
            results.push((status.dependency.name.to_string(), result));
        }

        Ok(results)
    }

    async fn run_checked(&self, command: &[String]) -> Result<(), String> {
        let output = self
            .executor
            .execute(command, None)
            .await
            .map_err(|e| e.to_string())?;

        if output.success() {
            Ok(())
        } else {
            let reason = output.stderr.trim();
            Err(match output.exit_code {
                Some(code) if reason.is_empty() => format!("exit code {}", code),
                Some(code) => format!("exit code {}: {}", code, reason),
                None => "terminated by signal".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::mock_executor::MockExecutor;

    fn locate_only(names: &'static [&'static str]) -> impl Fn(&str) -> Option<PathBuf> + Send + Sync + 'static {
        move |command| {
            names
                .contains(&command)
                .then(|| PathBuf::from(format!("/usr/bin/{}", command)))
        }
    }

    #[test]
    fn test_version_probe_flags() {
        let amass = DEPENDENCIES.iter().find(|d| d.name == "amass").unwrap();
        let nmap = DEPENDENCIES.iter().find(|d| d.name == "nmap").unwrap();

        assert_eq!(amass.version_probe(), vec!["amass", "-h"]);
        assert_eq!(nmap.version_probe(), vec!["nmap", "--version"]);
    }

    #[test]
    fn test_install_commands() {
        assert_eq!(
            PackageManager::Apt.install_command("dnsutils"),
            vec!["apt", "install", "-y", "dnsutils"]
        );
        assert_eq!(
            PackageManager::Pacman.install_command("bind-tools"),
            vec!["pacman", "-S", "--noconfirm", "bind-tools"]
        );
    }

    #[tokio::test]
    async fn test_check_reports_missing_and_versions() {
        let executor = Arc::new(MockExecutor::new().with_output("nmap", 0, "\nNmap version 7.94\nmore", ""));
        let checker = DependencyChecker::new(executor, Duration::from_secs(3))
            .with_locator(locate_only(&["nmap", "whois", "apt"]));

        let report = checker.check().await;

        assert_eq!(report.package_manager, Some(PackageManager::Apt));
        assert_eq!(report.installed().len(), 2);
        assert_eq!(report.missing().len(), DEPENDENCIES.len() - 2);

        let nmap = report.statuses.iter().find(|s| s.dependency.name == "nmap").unwrap();
        assert_eq!(nmap.version.as_deref(), Some("Nmap version 7.94"));
    }

    #[tokio::test]
    async fn test_version_falls_back_to_stderr() {
        let executor = Arc::new(MockExecutor::new().with_output("whois", 1, "", "Version 5.5.17\n"));
        let checker = DependencyChecker::new(executor, Duration::from_secs(3));
        let whois = DEPENDENCIES[0];

        assert_eq!(checker.probe_version(&whois).await.as_deref(), Some("Version 5.5.17"));
    }

    #[tokio::test]
    async fn test_manual_install_commands_use_distribution_packages() {
        let executor = Arc::new(MockExecutor::new());
        let checker = DependencyChecker::new(executor, Duration::from_secs(3))
            .with_locator(locate_only(&["pacman"]));

        let report = checker.check().await;
        let commands = report.manual_install_commands();

        assert_eq!(commands[0], "sudo pacman -Sy");
        assert!(commands.contains(&"sudo pacman -S --noconfirm bind-tools".to_string()));
        assert_eq!(commands.len(), DEPENDENCIES.len() + 1);
    }

    #[tokio::test]
    async fn test_install_missing_runs_update_then_installs() {
        let executor = Arc::new(MockExecutor::new());
        let checker = DependencyChecker::new(executor.clone(), Duration::from_secs(3))
            .with_locator(locate_only(&["apt", "whois", "nslookup", "whatweb", "theHarvester", "amass", "sublist3r",
                "nuclei", "nmap", "dirb", "gobuster", "hydra", "sqlmap"]));

        let report = checker.check().await;
        let results = checker.install_missing(&report).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "nikto");
        assert!(results[0].1.is_ok());

        let calls = executor.invocations();
        let tail = &calls[calls.len() - 2..];
        assert_eq!(tail[0], vec!["apt", "update"]);
        assert_eq!(tail[1], vec!["apt", "install", "-y", "nikto"]);
    }

    #[tokio::test]
    async fn test_install_without_package_manager_fails() {
        let executor = Arc::new(MockExecutor::new());
        let checker = DependencyChecker::new(executor, Duration::from_secs(3)).with_locator(|_| None);

        let report = checker.check().await;
        let result = checker.install_missing(&report).await;

        assert!(matches!(result, Err(RatError::Dependency(_))));
    }
}
