//! UI callbacks driven by the submission orchestrator.
//!
//! Rendering (button text, banners, native validation styling) and navigation belong
//! to the implementor; the orchestrator only decides when each callback fires.

use crate::form::FormId;

pub trait FormUi: Send + Sync {
    /// The form failed validation; show field-level feedback.
    fn mark_attempted(&self, form: &FormId);

    /// Enter or leave the "sending" state.
    fn set_loading(&self, form: &FormId, loading: bool);

    /// Remove any recoverable-error message from a previous attempt.
    fn clear_error(&self, form: &FormId);

    /// Show a recoverable-error message. The form stays editable.
    fn show_error(&self, form: &FormId, message: &str);

    /// Navigate away to the success destination.
    fn redirect(&self, form: &FormId, url: &str);
}
