use crate::tools::{BuildContext, Phase, ToolSpec};
use crate::utils::{
    error::{RatResult, RegistryError},
    types::Target,
};

/// Maps tool identifiers to argument vectors
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// Registered tools in display order
    tools: Vec<ToolSpec>,
}

impl CommandBuilder {
    /// Create a builder over every known tool
    pub fn new() -> Self {
        Self {
            tools: ToolSpec::ALL.to_vec(),
        }
    }

    /// Create a builder restricted to one phase
    pub fn for_phase(phase: Phase) -> Self {
        Self { tools: phase.tools() }
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    pub fn tool_ids(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.id()).collect()
    }

    pub fn is_registered(&self, tool_id: &str) -> bool {
        ToolSpec::from_id(tool_id).is_some_and(|tool| self.tools.contains(&tool))
    }

    /// Look up a registered tool by id or legacy id
    pub fn resolve(&self, tool_id: &str) -> RatResult<ToolSpec> {
        ToolSpec::from_id(tool_id)
            .filter(|tool| self.tools.contains(tool))
            .ok_or_else(|| RegistryError::UnknownTool(tool_id.to_string()).into())
    }

    /// Build the command line for `tool_id` against `target`
    pub fn build(&self, tool_id: &str, target: &Target, ctx: &BuildContext<'_>) -> RatResult<Vec<String>> {
        let tool = self.resolve(tool_id)?;
        Ok(tool.build_command(target, ctx))
    }
}

impl Default for CommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}
