//! Foundry Common - wire contract shared by the client and its front ends
//!
//! This crate provides:
//!
//! - **Types**: the JSON shapes exchanged with the protocol workflow server
//!   ([`ProtocolState`], [`ApprovalResponse`], request bodies, records)
//! - **Errors**: extraction of the server's `detail` field from failure bodies
//! - **Initialization**: [`init_tracing`] for consistent logging setup
//!
//! # Example
//!
//! ```rust,ignore
//! use foundry_common::{ProtocolState, WorkflowStatus};
//!
//! let state: ProtocolState = serde_json::from_str(body)?;
//! if state.status == WorkflowStatus::Halted {
//!     // awaiting human sign-off
//! }
//! ```

pub mod error;
pub mod init;
pub mod types;

pub use error::detail_message;
pub use init::init_tracing;
pub use types::{
    AgentName, ApprovalRequest, ApprovalResponse, GenerateRequest, HealthStatus, ProtocolList,
    ProtocolRecord, ProtocolState, ProtocolSummary, SafetyFlag, Severity, WorkflowStatus,
};
