//! Foundry - client for the multi-agent CBT protocol workflow
//!
//! A remote service drafts a CBT exercise with a pipeline of agents
//! (supervisor, drafter, safety guardian, clinical critic, synthesizer)
//! and halts for human sign-off. This crate holds the local copy of that
//! workflow's state and keeps it consistent across `generate` and
//! `approve` calls.
//!
//! # Feature Flags
//!
//! - `http` (default): reqwest transport, [`WorkflowClient::connect`] and
//!   the command handlers used by the `foundry` binary
//!
//! Without `http`, bring your own [`transport::WorkflowTransport`].

pub mod checkpoint;
pub mod cli;
pub mod client;
pub mod config;
pub mod output;
pub mod transport;
pub mod view;

#[cfg(feature = "http")]
pub mod handlers;

pub use client::{
    ClientError, ClientSnapshot, Operation, Outcome, ResponseOrdering, WorkflowClient,
};
pub use config::{ApiConfig, FoundryFileConfig};
pub use transport::{TransportError, WorkflowTransport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;
