//! Command handlers module
//!
//! One handler per CLI command. CommandContext carries the resolved
//! settings and the output writer shared across handlers.

use anyhow::{Context, Result};

use crate::client::WorkflowClient;
use crate::config::{ApiConfig, FoundryFileConfig};
use crate::output::{default_output, OutputWriter};

pub mod approve;
pub mod generate;
pub mod health;
pub mod records;

pub use approve::run_approve;
pub use generate::run_generate;
pub use health::run_health;
pub use records::{run_list, run_show};

// =============================================================================
// CommandContext - resolved settings shared by handlers
// =============================================================================

/// Shared context for command handlers
pub struct CommandContext {
    pub api: ApiConfig,
    pub output: Box<dyn OutputWriter>,
}

impl CommandContext {
    /// Create a new CommandContext from CLI args and file config
    pub fn new(
        api_url: Option<String>,
        plain: bool,
        file_config: FoundryFileConfig,
    ) -> Self {
        // Resolve with priority: CLI/env > config file > defaults
        let mut api = file_config.api;
        if let Some(url) = api_url {
            api.url = url;
        }
        let colors = file_config.ui.colors && !plain;

        Self {
            api,
            output: default_output(colors),
        }
    }

    /// Replace the output writer
    pub fn with_output(mut self, output: Box<dyn OutputWriter>) -> Self {
        self.output = output;
        self
    }

    /// Create a WorkflowClient configured with the context's settings
    pub fn client(&self) -> Result<WorkflowClient> {
        tracing::debug!(url = %self.api.url, ordering = ?self.api.ordering, "Connecting to workflow server");
        WorkflowClient::connect(&self.api)
            .with_context(|| format!("invalid workflow server URL: {}", self.api.url))
    }

    pub fn output(&self) -> &dyn OutputWriter {
        self.output.as_ref()
    }
}

/// Read replacement draft text from a file
pub fn read_edits_file(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read edits from {}", path.display()))
}
