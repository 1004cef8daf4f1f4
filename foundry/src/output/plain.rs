//! Plain text output for pipes and CI environments
//!
//! No colors or special formatting - just clean text output.

use std::io::{self, Write};

use super::{OutputEvent, OutputWriter};

/// Plain text output writer (no colors)
#[derive(Default)]
pub struct PlainOutput;

impl PlainOutput {
    /// Create a new plain output writer
    pub fn new() -> Self {
        Self
    }

    fn timeline_line(step: usize, agent: &str, notes: &[String]) -> String {
        if notes.is_empty() {
            format!("  {}. {} (pending)", step, agent)
        } else {
            format!("  {}. {}: {}", step, agent, notes.join("; "))
        }
    }
}

impl OutputWriter for PlainOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Text(text) | OutputEvent::Markdown(text) => {
                println!("{}", text);
            }

            OutputEvent::Heading(title) => {
                println!("## {}", title);
            }

            OutputEvent::TimelineStep { step, agent, notes } => {
                println!("{}", Self::timeline_line(step, &agent, &notes));
            }

            OutputEvent::Flag {
                line,
                severity,
                issue,
                suggestion,
            } => {
                println!("  [{}] line {}: {}", severity.as_str(), line, issue);
                println!("      suggestion: {}", suggestion);
            }

            OutputEvent::Score { label, value, .. } => {
                println!("  {}: {}/100", label, value);
            }

            OutputEvent::Progress { message, done } => {
                let status = if done { "DONE" } else { "..." };
                eprintln!("  {} {}", status, message);
            }

            OutputEvent::Status(msg) => {
                eprintln!("  {}", msg);
            }

            OutputEvent::Error(msg) => {
                eprintln!("Error: {}", msg);
            }

            OutputEvent::Warning(msg) => {
                eprintln!("Warning: {}", msg);
            }

            OutputEvent::System(msg) => {
                eprintln!("{}", msg);
            }

            OutputEvent::NewLine => {
                println!();
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

    fn supports_colors(&self) -> bool {
        false
    }
}
