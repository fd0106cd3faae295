//! # leadrelay Core
//!
//! The submission delivery engine.
//!
//! ## Components
//!
//! - [`MetadataCollector`] - contextual signals (page, campaign, agent, time)
//! - [`PayloadBuilder`] - merges form fields, metadata and enrichment
//! - [`SubmissionOrchestrator`] - validation, per-form lock, timed delivery and the
//!   redirect / recover decision
//! - [`FormStates`] - per-form [`SubmissionState`] records, locked through a
//!   releasing-on-drop [`SubmissionLock`]

pub mod builder;
pub mod metadata;
pub mod orchestrator;
pub mod state;

pub use builder::PayloadBuilder;
pub use metadata::{Metadata, MetadataCollector};
pub use orchestrator::{
    IgnoreReason, OrchestratorSettings, SubmissionOrchestrator, SubmissionOutcome,
};
pub use state::{FormStates, LockAttempt, SubmissionLock, SubmissionPhase, SubmissionState};
