//! Human sign-off for halted protocols
//!
//! When a workflow halts, the reviewer sees the draft and either approves
//! it as-is, approves an edited copy, or walks away. Rejection leaves the
//! thread halted on the server; nothing is sent.

use std::io::{self, BufRead, Write};

use crate::view::ApprovalDraft;

/// Line that ends multi-line edit input
const EDIT_TERMINATOR: &str = ".";

/// Outcome of a checkpoint interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Submit the draft (possibly edited)
    Approve(ApprovalDraft),
    /// Leave the thread halted
    Reject,
}

/// Strategy for answering an approval checkpoint
pub trait ApprovalHandler: Send + Sync {
    fn decide(&self, draft: ApprovalDraft) -> Decision;
}

/// Prompts on stdin/stdout
pub struct InteractiveApproval;

impl ApprovalHandler for InteractiveApproval {
    fn decide(&self, draft: ApprovalDraft) -> Decision {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        match prompt(draft, &mut stdin.lock(), &mut stdout) {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!("Approval prompt failed: {}", e);
                Decision::Reject
            }
        }
    }
}

/// Approves the draft untouched (for scripts and CI)
pub struct AutoApproval;

impl ApprovalHandler for AutoApproval {
    fn decide(&self, draft: ApprovalDraft) -> Decision {
        tracing::info!(thread_id = draft.thread_id(), "Auto-approving halted protocol");
        Decision::Approve(draft)
    }
}

/// Approves with replacement text loaded ahead of time
pub struct PresetEdits(pub String);

impl ApprovalHandler for PresetEdits {
    fn decide(&self, mut draft: ApprovalDraft) -> Decision {
        draft.set_text(self.0.clone());
        Decision::Approve(draft)
    }
}

/// Run the approval prompt over arbitrary streams
pub fn prompt<R: BufRead, W: Write>(
    mut draft: ApprovalDraft,
    input: &mut R,
    out: &mut W,
) -> io::Result<Decision> {
    writeln!(out, "\n{}", "═".repeat(60))?;
    writeln!(out, "  APPROVAL REQUIRED · thread {}", draft.thread_id())?;
    writeln!(out, "{}\n", "═".repeat(60))?;
    writeln!(out, "Options:")?;
    writeln!(out, "  [y/yes]  - Approve the draft as shown")?;
    writeln!(out, "  [e/edit] - Replace the draft text, then approve")?;
    writeln!(out, "  [n/no]   - Leave the protocol halted")?;
    writeln!(out)?;
    write!(out, "Your choice: ")?;
    out.flush()?;

    let mut choice = String::new();
    input.read_line(&mut choice)?;

    let decision = match choice.trim().to_lowercase().as_str() {
        "y" | "yes" => Decision::Approve(draft),
        "n" | "no" | "" => Decision::Reject,
        "e" | "edit" => {
            writeln!(
                out,
                "\nEnter the revised draft. Finish with a line containing only '{}':",
                EDIT_TERMINATOR
            )?;
            out.flush()?;
            let text = read_block(input)?;
            if text.trim().is_empty() {
                writeln!(out, "Empty edit, keeping the original draft.")?;
            } else {
                draft.set_text(text);
            }
            Decision::Approve(draft)
        }
        other => {
            writeln!(out, "Unrecognised choice '{}', leaving protocol halted.", other)?;
            Decision::Reject
        }
    };

    writeln!(out, "{}", "═".repeat(60))?;
    Ok(decision)
}

/// Read lines up to the terminator (or EOF), keeping blank lines
fn read_block<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == EDIT_TERMINATOR {
            break;
        }
        lines.push(trimmed.to_string());
    }
    Ok(lines.join("\n"))
}
