//! # leadrelay Protocols
//!
//! Shared types and traits for the leadrelay submission engine.
//! Contains only interface definitions - no network or UI implementations.
//!
//! ## Core Traits
//!
//! - [`DeliveryChannel`] - Transport sending a [`LeadPayload`] to a collection endpoint
//! - [`EnrichmentProvider`] - Best-effort lookup of contextual data (IP, country)
//! - [`FormUi`] - UI side effects driven by the submission orchestrator

pub mod channel;
pub mod enrichment;
pub mod error;
pub mod form;
pub mod payload;
pub mod ui;

pub use channel::{DeliveryChannel, DeliveryOutcome, DeliveryReceipt};
pub use enrichment::{EnrichmentProvider, EnrichmentResult};
pub use error::{DeliveryError, EnrichmentError, SubmissionError};
pub use form::{FormFields, FormId, NavigationContext, SubmitEvent};
pub use payload::{FieldValue, LeadPayload};
pub use ui::FormUi;
