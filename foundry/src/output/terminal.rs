//! Terminal output with colors and formatting
//!
//! Uses ANSI escape codes for colors and styling.

use std::io::{self, Write};

use foundry_common::Severity;

use super::{OutputEvent, OutputWriter};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const ITALIC: &str = "\x1b[3m";

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const CYAN: &str = "\x1b[36m";
const GRAY: &str = "\x1b[90m";

const BAR_WIDTH: usize = 20;

/// Terminal output writer with colors and formatting
pub struct TerminalOutput {
    /// Whether to use colors (can be disabled)
    use_colors: bool,
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalOutput {
    /// Create a new terminal output writer
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create without colors
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    /// Format with color if colors are enabled
    fn color(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Format with multiple styles
    fn styled(&self, codes: &[&str], text: &str) -> String {
        if self.use_colors {
            let prefix: String = codes.iter().copied().collect();
            format!("{}{}{}", prefix, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Print to stderr (for status/progress messages)
    fn eprint(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    /// Print to stdout (for content)
    fn print(&self, msg: &str) {
        println!("{}", msg);
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => RED,
            Severity::Moderate => YELLOW,
            Severity::Low => BLUE,
        }
    }

    fn band_color(band: u8) -> &'static str {
        match band {
            0 | 1 => RED,
            2 => YELLOW,
            _ => GREEN,
        }
    }

    fn score_line(&self, label: &str, value: u8, band: u8) -> String {
        let filled = (usize::from(value.min(100)) * BAR_WIDTH + 50) / 100;
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));
        format!(
            "  {:<8} {} {}",
            label,
            self.color(Self::band_color(band), &bar),
            self.styled(&[BOLD], &format!("{}/100", value))
        )
    }

    fn flag_lines(
        &self,
        line: i64,
        severity: Severity,
        issue: &str,
        suggestion: &str,
    ) -> [String; 2] {
        let tag = format!("[{}]", severity.as_str().to_uppercase());
        [
            format!(
                "  {} {} {}",
                self.styled(&[BOLD, Self::severity_color(severity)], &tag),
                self.color(GRAY, &format!("line {}:", line)),
                issue
            ),
            format!("      {}", self.styled(&[DIM, ITALIC], suggestion)),
        ]
    }
}

impl OutputWriter for TerminalOutput {
    fn write(&self, event: OutputEvent) {
        match event {
            OutputEvent::Text(text) => {
                self.print(&text);
            }

            OutputEvent::Heading(title) => {
                self.print(&self.styled(&[BOLD, CYAN], &format!("## {}", title)));
            }

            OutputEvent::Markdown(body) => {
                self.print(&body);
            }

            OutputEvent::TimelineStep { step, agent, notes } => {
                let marker = if notes.is_empty() {
                    self.color(GRAY, "○")
                } else {
                    self.color(GREEN, "●")
                };
                self.print(&format!(
                    "  {} {} {}",
                    marker,
                    self.color(GRAY, &format!("{}.", step)),
                    self.styled(&[BOLD], &agent)
                ));
                if notes.is_empty() {
                    self.print(&self.color(GRAY, "      pending"));
                }
                for note in notes {
                    self.print(&format!("      {}", self.color(GRAY, &note)));
                }
            }

            OutputEvent::Flag {
                line,
                severity,
                issue,
                suggestion,
            } => {
                for text in self.flag_lines(line, severity, &issue, &suggestion) {
                    self.print(&text);
                }
            }

            OutputEvent::Score { label, value, band } => {
                self.print(&self.score_line(&label, value, band));
            }

            OutputEvent::Progress { message, done } => {
                if done {
                    self.eprint(&format!(
                        "  {} {}",
                        self.color(GREEN, "✓"),
                        self.color(GRAY, &message)
                    ));
                } else {
                    self.eprint(&format!(
                        "  {} {}",
                        self.color(BLUE, "⋯"),
                        self.color(GRAY, &message)
                    ));
                }
            }

            OutputEvent::Status(msg) => {
                self.eprint(&self.color(GRAY, &format!("  {}", msg)));
            }

            OutputEvent::Error(msg) => {
                self.eprint(&format!(
                    "{} {}",
                    self.styled(&[BOLD, RED], "Error:"),
                    self.color(RED, &msg)
                ));
            }

            OutputEvent::Warning(msg) => {
                self.eprint(&format!(
                    "{} {}",
                    self.styled(&[BOLD, YELLOW], "Warning:"),
                    self.color(YELLOW, &msg)
                ));
            }

            OutputEvent::System(msg) => {
                self.eprint(&self.color(GRAY, &msg));
            }

            OutputEvent::NewLine => {
                self.print("");
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }

    fn supports_colors(&self) -> bool {
        self.use_colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_output_creation() {
        let output = TerminalOutput::new();
        assert!(output.supports_colors());

        let output = TerminalOutput::without_colors();
        assert!(!output.supports_colors());
    }

    #[test]
    fn test_color_formatting() {
        let output = TerminalOutput::new();
        let colored = output.color(RED, "test");
        assert!(colored.contains("\x1b[31m"));
        assert!(colored.contains("\x1b[0m"));
        assert!(colored.contains("test"));

        let output = TerminalOutput::without_colors();
        let plain = output.color(RED, "test");
        assert_eq!(plain, "test");
    }

    #[test]
    fn test_score_bar_fill() {
        let output = TerminalOutput::without_colors();
        let line = output.score_line("Safety", 90, 4);
        assert_eq!(line.matches('█').count(), 18);
        assert_eq!(line.matches('░').count(), 2);
        assert!(line.ends_with("90/100"));

        let empty = output.score_line("Empathy", 0, 0);
        assert_eq!(empty.matches('█').count(), 0);
    }

    #[test]
    fn test_score_bar_out_of_range_value() {
        let output = TerminalOutput::without_colors();
        let line = output.score_line("Safety", 250, 4);
        assert_eq!(line.matches('█').count(), BAR_WIDTH);
        assert_eq!(line.matches('░').count(), 0);
    }

    #[test]
    fn test_band_colors() {
        assert_eq!(TerminalOutput::band_color(0), RED);
        assert_eq!(TerminalOutput::band_color(2), YELLOW);
        assert_eq!(TerminalOutput::band_color(4), GREEN);
    }

    #[test]
    fn test_flag_lines() {
        let output = TerminalOutput::without_colors();
        let [head, hint] =
            output.flag_lines(3, Severity::Critical, "Mentions fasting", "Remove it");
        assert_eq!(head, "  [CRITICAL] line 3: Mentions fasting");
        assert_eq!(hint, "      Remove it");

        let colored = TerminalOutput::new();
        let [head, _] = colored.flag_lines(3, Severity::Moderate, "x", "y");
        assert!(head.contains(YELLOW));
    }
}
