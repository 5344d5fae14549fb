use rat_toolkit::{BuildContext, CommandBuilder, Phase, RatError, RegistryError, Target, ToolSpec, WordlistConfig, WordlistSlot};
use std::path::Path;

fn target(raw: &str) -> Target {
    Target::parse(raw).unwrap()
}

#[test]
fn test_every_tool_starts_with_its_program() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("/results"));

    for tool in ToolSpec::ALL {
        let command = builder.build(tool.id(), &target("example.com"), &ctx).unwrap();

        assert_eq!(command[0], tool.program(), "wrong program for {}", tool.id());
        assert!(
            command.iter().any(|arg| arg.contains("example.com")),
            "{} does not reference the target",
            tool.id()
        );
    }
}

#[test]
fn test_unknown_tool_is_rejected() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("."));

    let result = builder.build("nmap_stealth", &target("example.com"), &ctx);

    match result {
        Err(RatError::Registry(RegistryError::UnknownTool(id))) => assert_eq!(id, "nmap_stealth"),
        other => panic!("Expected UnknownTool, got {:?}", other),
    }
}

#[test]
fn test_nmap_version_command() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("."));

    let command = builder.build("nmap_version", &target("example.com"), &ctx).unwrap();
    assert_eq!(command, vec!["nmap", "-sV", "example.com"]);
}

#[test]
fn test_web_tools_use_http_url() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("."));

    let command = builder.build("sqlmap_dump_db", &target("shop.test"), &ctx).unwrap();
    assert_eq!(command, vec!["sqlmap", "-u", "http://shop.test", "--dump", "--batch"]);

    let command = builder.build("dirbuster_extensions", &target("shop.test"), &ctx).unwrap();
    assert_eq!(
        command,
        vec!["dirb", "http://shop.test", "/usr/share/dirb/wordlists/common.txt", "-x", ".php,.txt,.html"]
    );
}

#[test]
fn test_wordlist_change_applies_to_next_build() {
    let builder = CommandBuilder::new();
    let mut wordlists = WordlistConfig::default();

    let first = builder
        .build("gobuster_dns", &target("example.com"), &BuildContext::new(&wordlists, Path::new(".")))
        .unwrap();
    assert_eq!(first.last().map(String::as_str), Some("/usr/share/wordlists/dirb/common.txt"));

    wordlists.set_unchecked(WordlistSlot::Gobuster, "/tmp/subdomains.txt");
    let second = builder
        .build("gobuster_dns", &target("example.com"), &BuildContext::new(&wordlists, Path::new(".")))
        .unwrap();
    assert_eq!(second, vec!["gobuster", "dns", "-d", "example.com", "-w", "/tmp/subdomains.txt"]);
}

#[test]
fn test_side_files_land_under_phase_root() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("/results"));

    let command = builder.build("nikto_scan_base", &target("example.com"), &ctx).unwrap();
    let report = command.iter().position(|arg| arg == "-o").map(|i| command[i + 1].clone());

    assert_eq!(report.as_deref(), Some("/results/phase3/nikto_scan_base/example.com.html"));
}

#[test]
fn test_builder_is_deterministic() {
    let builder = CommandBuilder::for_phase(Phase::Enumeration);
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("."));

    for id in builder.tool_ids() {
        let first = builder.build(id, &target("example.com"), &ctx).unwrap();
        let second = builder.build(id, &target("example.com"), &ctx).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_legacy_ids_resolve_to_current_tools() {
    let builder = CommandBuilder::new();
    let wordlists = WordlistConfig::default();
    let ctx = BuildContext::new(&wordlists, Path::new("."));

    let legacy = builder.build("nmap_ignora_ping", &target("example.com"), &ctx).unwrap();
    let current = builder.build("nmap_skip_ping", &target("example.com"), &ctx).unwrap();

    assert_eq!(legacy, current);
    assert_eq!(ToolSpec::from_id("nmap_scansione_spoofing"), Some(ToolSpec::NmapDecoyScan));
    assert!(builder.is_registered("nmap_tutte_le_porte"));
    assert!(!CommandBuilder::for_phase(Phase::Reconnaissance).is_registered("nmap_tutte_le_porte"));
}
