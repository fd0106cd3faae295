//! Terminal rendering of form UI callbacks.

use leadrelay_protocols::{FormId, FormUi};

/// Prints what a page would show for each orchestrator callback.
#[derive(Debug, Default)]
pub(crate) struct ConsoleUi;

impl FormUi for ConsoleUi {
    fn mark_attempted(&self, form: &FormId) {
        eprintln!("[{}] form is incomplete, fix the highlighted fields", form);
    }

    fn set_loading(&self, form: &FormId, loading: bool) {
        if loading {
            eprintln!("[{}] sending...", form);
        }
    }

    fn clear_error(&self, _form: &FormId) {}

    fn show_error(&self, form: &FormId, message: &str) {
        eprintln!("[{}] {}", form, message);
    }

    fn redirect(&self, form: &FormId, url: &str) {
        println!("[{}] redirect -> {}", form, url);
    }
}
