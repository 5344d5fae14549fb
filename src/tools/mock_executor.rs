use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::tools::executor::CommandExecutor;
use crate::utils::{error::ExecutionError, types::CapturedOutput};

/// Scripted reply for one program
#[derive(Debug, Clone)]
pub enum MockResponse {
    Output(CapturedOutput),
    NotFound,
    Failure(String),
    /// The process started but reading its output failed
    IoFailure(String),
    Timeout,
}

/// Executor that never spawns a process; replies are scripted per program name
#[derive(Debug)]
pub struct MockExecutor {
    responses: Mutex<HashMap<String, MockResponse>>,
    default_response: MockResponse,
    invocations: Mutex<Vec<Vec<String>>>,
}

impl MockExecutor {
    /// Create a mock that answers every program with exit 0 and empty output
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            default_response: MockResponse::Output(CapturedOutput::new(0, "", "")),
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Reply to `program` with the given exit code and streams
    pub fn with_output(self, program: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.respond(program, MockResponse::Output(CapturedOutput::new(exit_code, stdout, stderr)));
        self
    }

    /// Pretend `program` is not installed
    pub fn with_not_found(self, program: &str) -> Self {
        self.respond(program, MockResponse::NotFound);
        self
    }

    /// Fail to spawn `program` with the given reason
    pub fn with_failure(self, program: &str, reason: &str) -> Self {
        self.respond(program, MockResponse::Failure(reason.to_string()));
        self
    }

    /// Change the scripted reply for `program`
    pub fn respond(&self, program: &str, response: MockResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(program.to_string(), response);
        }
    }

    /// Every command line received, in order
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn execute(&self, command: &[String], timeout: Option<Duration>) -> Result<CapturedOutput, ExecutionError> {
        let program = command.first().ok_or(ExecutionError::EmptyCommand)?.clone();

        if let Ok(mut calls) = self.invocations.lock() {
            calls.push(command.to_vec());
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(&program).cloned())
            .unwrap_or_else(|| self.default_response.clone());

        match response {
            MockResponse::Output(output) => Ok(output),
            MockResponse::NotFound => Err(ExecutionError::CommandNotFound(program)),
            MockResponse::Failure(reason) => Err(ExecutionError::Spawn { program, reason }),
            MockResponse::IoFailure(reason) => Err(ExecutionError::Io { program, reason }),
            MockResponse::Timeout => Err(ExecutionError::Timeout {
                program,
                seconds: timeout.map(|t| t.as_secs()).unwrap_or(0),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_default_response_is_success() {
        let mock = MockExecutor::new();
        let output = mock.execute(&argv(&["whois", "example.com"]), None).await.unwrap();

        assert!(output.success());
        assert_eq!(mock.invocation_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_responses() {
        let mock = MockExecutor::new()
            .with_output("whois", 0, "WHOIS DATA", "")
            .with_not_found("nuclei")
            .with_failure("nmap", "permission denied");

        let output = mock.execute(&argv(&["whois", "a.com"]), None).await.unwrap();
        assert_eq!(output.stdout, "WHOIS DATA");

        let result = mock.execute(&argv(&["nuclei", "-u", "a.com"]), None).await;
        assert!(matches!(result, Err(ExecutionError::CommandNotFound(_))));

        let result = mock.execute(&argv(&["nmap", "a.com"]), None).await;
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));

        assert_eq!(mock.invocations()[1], argv(&["nuclei", "-u", "a.com"]));
    }

    #[tokio::test]
    async fn test_respond_replaces_script() {
        let mock = MockExecutor::new().with_output("whois", 0, "first", "");
        mock.respond("whois", MockResponse::Output(CapturedOutput::new(0, "second", "")));

        let output = mock.execute(&argv(&["whois", "a.com"]), None).await.unwrap();
        assert_eq!(output.stdout, "second");
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let mock = MockExecutor::new();
        let result = tokio_test::block_on(mock.execute(&[], None));

        assert!(matches!(result, Err(ExecutionError::EmptyCommand)));
        assert_eq!(mock.invocation_count(), 0);
    }

    #[test]
    fn test_timeout_reports_configured_limit() {
        let mock = MockExecutor::new();
        mock.respond("nmap", MockResponse::Timeout);

        let result = tokio_test::block_on(mock.execute(&argv(&["nmap", "-p-", "a.com"]), Some(Duration::from_secs(30))));
        assert!(matches!(result, Err(ExecutionError::Timeout { seconds: 30, .. })));
    }
}
