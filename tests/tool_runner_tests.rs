use rat_toolkit::{
    ExecutionStatus, MockExecutor, RatError, RegistryError, ResultSink, Target, ToolRunner, WordlistConfig,
};
use std::sync::Arc;
use tempfile::TempDir;

fn target(raw: &str) -> Target {
    Target::parse(raw).unwrap()
}

#[tokio::test]
async fn test_successful_run_saves_raw_stdout() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_output("whois", 0, "WHOIS DATA", "ignored"));
    let runner = ToolRunner::new(mock.clone(), ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("whois", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();

    assert!(outcome.success());
    assert_eq!(outcome.status, ExecutionStatus::Success);
    assert_eq!(outcome.exit_code, Some(0));
    assert_eq!(outcome.command, vec!["whois", "example.com"]);

    let path = dir.path().join("phase1/whois/example.com.txt");
    assert_eq!(outcome.artifact.as_deref(), Some(path.as_path()));
    assert_eq!(std::fs::read_to_string(path).unwrap(), "WHOIS DATA");
}

#[tokio::test]
async fn test_failed_run_saves_labeled_streams() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_output("nmap", 1, "partial", "boom"));
    let runner = ToolRunner::new(mock, ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("nmap_version", &target("10.0.0.1"), &WordlistConfig::default())
        .await
        .unwrap();

    assert!(!outcome.success());
    assert_eq!(outcome.status, ExecutionStatus::NonZeroExit(Some(1)));

    let saved = std::fs::read_to_string(dir.path().join("phase2/nmap_version/10.0.0.1.txt")).unwrap();
    assert_eq!(saved, "STDOUT:\npartial\n\nSTDERR:\nboom");
}

#[tokio::test]
async fn test_missing_program_writes_no_artifact() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_not_found("sqlmap"));
    let runner = ToolRunner::new(mock, ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("sqlmap_scan_base", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.status, ExecutionStatus::CommandNotFound);
    assert!(outcome.artifact.is_none());
    assert!(!dir.path().join("phase3/sqlmap_scan_base/example.com.txt").exists());
}

#[tokio::test]
async fn test_spawn_failure_is_an_outcome() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_failure("nikto", "permission denied"));
    let runner = ToolRunner::new(mock, ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("nikto_scan_ssl", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();

    match outcome.status {
        ExecutionStatus::ExecutionError(reason) => assert!(reason.contains("permission denied")),
        other => panic!("Expected ExecutionError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rerun_overwrites_previous_artifact() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_output("nslookup", 0, "first", ""));
    let runner = ToolRunner::new(mock.clone(), ResultSink::new(dir.path()));
    let wordlists = WordlistConfig::default();

    runner.run_one("nslookup", &target("example.com"), &wordlists).await.unwrap();
    mock.respond(
        "nslookup",
        rat_toolkit::MockResponse::Output(rat_toolkit::CapturedOutput::new(0, "second", "")),
    );
    runner.run_one("nslookup", &target("example.com"), &wordlists).await.unwrap();

    let saved = std::fs::read_to_string(dir.path().join("phase1/nslookup/example.com.txt")).unwrap();
    assert_eq!(saved, "second");
}

#[tokio::test]
async fn test_unknown_tool_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new());
    let runner = ToolRunner::new(mock.clone(), ResultSink::new(dir.path()));

    let result = runner.run_one("masscan", &target("example.com"), &WordlistConfig::default()).await;

    assert!(matches!(result, Err(RatError::Registry(RegistryError::UnknownTool(_)))));
    assert_eq!(mock.invocation_count(), 0);
}

#[tokio::test]
async fn test_phase_restricted_builder() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new());
    let runner = ToolRunner::new(mock.clone(), ResultSink::new(dir.path()))
        .with_builder(rat_toolkit::CommandBuilder::for_phase(rat_toolkit::Phase::Scanning));

    assert_eq!(runner.builder().tools().len(), 12);

    let result = runner.run_one("whois", &target("example.com"), &WordlistConfig::default()).await;
    assert!(matches!(result, Err(RatError::Registry(RegistryError::UnknownTool(_)))));

    let outcome = runner
        .run_one("nmap_ping_scan", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();
    assert!(outcome.success());
    assert_eq!(mock.invocation_count(), 1);
}

#[tokio::test]
async fn test_output_read_failure_is_an_outcome() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new());
    mock.respond("gobuster", rat_toolkit::MockResponse::IoFailure("broken pipe".to_string()));
    let runner = ToolRunner::new(mock, ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("gobuster_dns", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        ExecutionStatus::ExecutionError("I/O error while running 'gobuster': broken pipe".to_string())
    );
    assert!(outcome.artifact.is_none());
}

#[tokio::test]
async fn test_legacy_id_writes_under_current_id() {
    let dir = TempDir::new().unwrap();
    let mock = Arc::new(MockExecutor::new().with_output("nmap", 0, "Host is up", ""));
    let runner = ToolRunner::new(mock, ResultSink::new(dir.path()));

    let outcome = runner
        .run_one("nmap_ignora_ping", &target("example.com"), &WordlistConfig::default())
        .await
        .unwrap();

    assert_eq!(outcome.tool_id, "nmap_skip_ping");
    let saved = std::fs::read_to_string(dir.path().join("phase2/nmap_skip_ping/example.com.txt")).unwrap();
    assert_eq!(saved, "Host is up");
}
