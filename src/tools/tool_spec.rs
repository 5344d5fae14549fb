use std::fmt;
use std::path::{Path, PathBuf};

use crate::tools::phase::Phase;
use crate::utils::config::{WordlistConfig, WordlistSlot};
use crate::utils::types::Target;

/// Inputs a builder may read besides the target, supplied at call time
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub wordlists: &'a WordlistConfig,
    pub output_root: &'a Path,
}

impl<'a> BuildContext<'a> {
    pub fn new(wordlists: &'a WordlistConfig, output_root: &'a Path) -> Self {
        Self { wordlists, output_root }
    }

    fn phase_root(&self, phase: Phase) -> PathBuf {
        self.output_root.join(phase.directory())
    }
}

/// Every external command template the toolkit knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolSpec {
    // Reconnaissance
    Whois,
    Nslookup,
    WhatWeb,
    TheHarvester,
    Amass,
    Sublist3r,
    Nuclei,

    // Scanning
    NmapSkipPing,
    NmapCommonPorts,
    NmapVulnScripts,
    NmapPingScan,
    NmapPorts80443,
    NmapVersion,
    NmapAllPorts,
    NmapOsDetection,
    NmapAggressive,
    NmapFtpAnon,
    NmapHttpEnum,
    NmapDecoyScan,

    // Enumeration
    DirbusterDirs,
    DirbusterExtensions,
    GobusterDirs,
    GobusterDns,
    GobusterVhost,
    SqlmapScanBase,
    SqlmapScanForms,
    SqlmapScanPost,
    SqlmapDumpDb,
    NiktoScanBase,
    NiktoScanSsl,
    NiktoScanTuning,
    HydraHttpForm,
    HydraBasicAuth,
}

impl ToolSpec {
    /// Registration order, which is also display order
    pub const ALL: [ToolSpec; 33] = [
        ToolSpec::Whois,
        ToolSpec::Nslookup,
        ToolSpec::WhatWeb,
        ToolSpec::TheHarvester,
        ToolSpec::Amass,
        ToolSpec::Sublist3r,
        ToolSpec::Nuclei,
        ToolSpec::NmapSkipPing,
        ToolSpec::NmapCommonPorts,
        ToolSpec::NmapVulnScripts,
        ToolSpec::NmapPingScan,
        ToolSpec::NmapPorts80443,
        ToolSpec::NmapVersion,
        ToolSpec::NmapAllPorts,
        ToolSpec::NmapOsDetection,
        ToolSpec::NmapAggressive,
        ToolSpec::NmapFtpAnon,
        ToolSpec::NmapHttpEnum,
        ToolSpec::NmapDecoyScan,
        ToolSpec::DirbusterDirs,
        ToolSpec::DirbusterExtensions,
        ToolSpec::GobusterDirs,
        ToolSpec::GobusterDns,
        ToolSpec::GobusterVhost,
        ToolSpec::SqlmapScanBase,
        ToolSpec::SqlmapScanForms,
        ToolSpec::SqlmapScanPost,
        ToolSpec::SqlmapDumpDb,
        ToolSpec::NiktoScanBase,
        ToolSpec::NiktoScanSsl,
        ToolSpec::NiktoScanTuning,
        ToolSpec::HydraHttpForm,
        ToolSpec::HydraBasicAuth,
    ];

    /// Stable identifier, also the artifact directory name
    pub fn id(&self) -> &'static str {
        match self {
            ToolSpec::Whois => "whois",
            ToolSpec::Nslookup => "nslookup",
            ToolSpec::WhatWeb => "whatweb",
            ToolSpec::TheHarvester => "theHarvester",
            ToolSpec::Amass => "amass",
            ToolSpec::Sublist3r => "sublist3r",
            ToolSpec::Nuclei => "nuclei",
            ToolSpec::NmapSkipPing => "nmap_skip_ping",
            ToolSpec::NmapCommonPorts => "nmap_common_ports",
            ToolSpec::NmapVulnScripts => "nmap_vuln_scripts",
            ToolSpec::NmapPingScan => "nmap_ping_scan",
            ToolSpec::NmapPorts80443 => "nmap_ports_80_443",
            ToolSpec::NmapVersion => "nmap_version",
            ToolSpec::NmapAllPorts => "nmap_all_ports",
            ToolSpec::NmapOsDetection => "nmap_os_detection",
            ToolSpec::NmapAggressive => "nmap_aggressive",
            ToolSpec::NmapFtpAnon => "nmap_ftp_anon",
            ToolSpec::NmapHttpEnum => "nmap_http_enum",
            ToolSpec::NmapDecoyScan => "nmap_decoy_scan",
            ToolSpec::DirbusterDirs => "dirbuster_dirs",
            ToolSpec::DirbusterExtensions => "dirbuster_extensions",
            ToolSpec::GobusterDirs => "gobuster_dirs",
            ToolSpec::GobusterDns => "gobuster_dns",
            ToolSpec::GobusterVhost => "gobuster_vhost",
            ToolSpec::SqlmapScanBase => "sqlmap_scan_base",
            ToolSpec::SqlmapScanForms => "sqlmap_scan_forms",
            ToolSpec::SqlmapScanPost => "sqlmap_scan_post",
            ToolSpec::SqlmapDumpDb => "sqlmap_dump_db",
            ToolSpec::NiktoScanBase => "nikto_scan_base",
            ToolSpec::NiktoScanSsl => "nikto_scan_ssl",
            ToolSpec::NiktoScanTuning => "nikto_scan_tuning",
            ToolSpec::HydraHttpForm => "hydra_http_form",
            ToolSpec::HydraBasicAuth => "hydra_basic_auth",
        }
    }

    /// Earlier name of the tool, still accepted on lookup
    pub fn legacy_id(&self) -> Option<&'static str> {
        match self {
            ToolSpec::NmapSkipPing => Some("nmap_ignora_ping"),
            ToolSpec::NmapCommonPorts => Some("nmap_scansione_porte_comuni"),
            ToolSpec::NmapVulnScripts => Some("nmap_identificare_script_e_vulnerabilità"),
            ToolSpec::NmapPorts80443 => Some("nmap_porte_80_443"),
            ToolSpec::NmapAllPorts => Some("nmap_tutte_le_porte"),
            ToolSpec::NmapOsDetection => Some("nmap_sistema_operativo"),
            ToolSpec::NmapAggressive => Some("nmap_scansione_aggressiva"),
            ToolSpec::NmapFtpAnon => Some("nmap_servizi_ftp_http"),
            ToolSpec::NmapHttpEnum => Some("nmap_rete_interna"),
            ToolSpec::NmapDecoyScan => Some("nmap_scansione_spoofing"),
            _ => None,
        }
    }

    /// Look a tool up by its id or its legacy id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.id() == id || tool.legacy_id() == Some(id))
    }

    pub fn phase(&self) -> Phase {
        use ToolSpec::*;
        match self {
            Whois | Nslookup | WhatWeb | TheHarvester | Amass | Sublist3r | Nuclei => Phase::Reconnaissance,
            NmapSkipPing | NmapCommonPorts | NmapVulnScripts | NmapPingScan | NmapPorts80443 | NmapVersion
            | NmapAllPorts | NmapOsDetection | NmapAggressive | NmapFtpAnon | NmapHttpEnum | NmapDecoyScan => {
                Phase::Scanning
            }
            DirbusterDirs | DirbusterExtensions | GobusterDirs | GobusterDns | GobusterVhost | SqlmapScanBase
            | SqlmapScanForms | SqlmapScanPost | SqlmapDumpDb | NiktoScanBase | NiktoScanSsl | NiktoScanTuning
            | HydraHttpForm | HydraBasicAuth => Phase::Enumeration,
        }
    }

    /// Executable the built command starts with
    pub fn program(&self) -> &'static str {
        use ToolSpec::*;
        match self {
            Whois => "whois",
            Nslookup => "nslookup",
            WhatWeb => "whatweb",
            TheHarvester => "theHarvester",
            Amass => "amass",
            Sublist3r => "sublist3r",
            Nuclei => "nuclei",
            NmapSkipPing | NmapCommonPorts | NmapVulnScripts | NmapPingScan | NmapPorts80443 | NmapVersion
            | NmapAllPorts | NmapOsDetection | NmapAggressive | NmapFtpAnon | NmapHttpEnum | NmapDecoyScan => "nmap",
            DirbusterDirs | DirbusterExtensions => "dirb",
            GobusterDirs | GobusterDns | GobusterVhost => "gobuster",
            SqlmapScanBase | SqlmapScanForms | SqlmapScanPost | SqlmapDumpDb => "sqlmap",
            NiktoScanBase | NiktoScanSsl | NiktoScanTuning => "nikto",
            HydraHttpForm | HydraBasicAuth => "hydra",
        }
    }

    /// Wordlist read at build time, if any
    pub fn wordlist(&self) -> Option<WordlistSlot> {
        use ToolSpec::*;
        match self {
            DirbusterDirs | DirbusterExtensions => Some(WordlistSlot::Dirb),
            GobusterDirs | GobusterDns | GobusterVhost => Some(WordlistSlot::Gobuster),
            HydraHttpForm | HydraBasicAuth => Some(WordlistSlot::Hydra),
            _ => None,
        }
    }

    /// Build the argument vector (program first) for one target
    pub fn build_command(&self, target: &Target, ctx: &BuildContext<'_>) -> Vec<String> {
        use ToolSpec::*;

        let t = target.as_str();
        let url_owned = format!("http://{}", t);
        let url = url_owned.as_str();
        let wordlist_owned = self
            .wordlist()
            .map(|slot| ctx.wordlists.get(slot).display().to_string())
            .unwrap_or_default();
        let wordlist = wordlist_owned.as_str();

        let args: Vec<String> = match self {
            Whois | Nslookup | WhatWeb => vec![t.to_string()],
            TheHarvester => strings(&["-d", t, "-b", "all"]),
            Amass => {
                let graph = ctx
                    .phase_root(Phase::Reconnaissance)
                    .join(self.id())
                    .join(format!("{}_graph.html", t));
                vec![
                    "viz".to_string(),
                    "-d3".to_string(),
                    "-o".to_string(),
                    graph.display().to_string(),
                    "-d".to_string(),
                    t.to_string(),
                ]
            }
            Sublist3r => strings(&["-d", t]),
            Nuclei => strings(&["-u", t]),

            NmapSkipPing => strings(&["-Pn", "-T4", t]),
            NmapCommonPorts => strings(&["-F", t]),
            NmapVulnScripts => strings(&["--script", "vuln", t]),
            NmapPingScan => strings(&["-sn", t]),
            NmapPorts80443 => strings(&["-p", "80,443", t]),
            NmapVersion => strings(&["-sV", t]),
            NmapAllPorts => strings(&["-p-", t]),
            NmapOsDetection => strings(&["-O", "-T4", t]),
            NmapAggressive => strings(&["-A", t]),
            NmapFtpAnon => strings(&["-p", "21", "--script", "ftp-anon", "-T4", t]),
            NmapHttpEnum => strings(&["-p", "80", "--script", "http-enum", t]),
            NmapDecoyScan => strings(&["-D", "RND:10", t]),

            DirbusterDirs => strings(&[url, wordlist]),
            DirbusterExtensions => strings(&[url, wordlist, "-x", ".php,.txt,.html"]),
            GobusterDirs => strings(&["dir", "-u", url, "-w", wordlist]),
            GobusterDns => strings(&["dns", "-d", t, "-w", wordlist]),
            GobusterVhost => strings(&["vhost", "-u", url, "-w", wordlist]),
            SqlmapScanBase => strings(&["-u", url, "--batch"]),
            SqlmapScanForms => strings(&["-u", url, "--forms", "--batch"]),
            SqlmapScanPost => strings(&["-u", url, "--data", "param1=value1&param2=value2", "--batch"]),
            SqlmapDumpDb => strings(&["-u", url, "--dump", "--batch"]),
            NiktoScanBase => {
                let report = ctx
                    .phase_root(Phase::Enumeration)
                    .join(self.id())
                    .join(format!("{}.html", t));
                vec![
                    "-h".to_string(),
                    t.to_string(),
                    "-o".to_string(),
                    report.display().to_string(),
                    "-Format".to_string(),
                    "html".to_string(),
                ]
            }
            NiktoScanSsl => strings(&["-h", t, "-ssl"]),
            NiktoScanTuning => strings(&["-h", t, "-Tuning", "x6789"]),
            HydraHttpForm => strings(&[
                "-l",
                "admin",
                "-P",
                wordlist,
                t,
                "http-post-form",
                "/login.php:username=^USER^&password=^PASS^:Login failed",
            ]),
            HydraBasicAuth => strings(&["-l", "admin", "-P", wordlist, t, "http-get", "/admin"]),
        };

        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program().to_string());
        command.extend(args);
        command
    }
}

impl fmt::Display for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
