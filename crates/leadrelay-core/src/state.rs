//! Per-form submission state.
//!
//! Each bound form owns one [`SubmissionState`]. The `submitting` flag is the
//! form's lock: while it is set, further submits are ignored. The flag is only
//! ever set through a [`SubmissionLock`], which clears it again when dropped
//! unless the holder retires it on redirect.

use dashmap::DashMap;
use tracing::debug;

use leadrelay_protocols::FormId;

/// Where a form is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Sending,
    Redirecting,
}

/// Record for one bound form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionState {
    pub bound: bool,
    pub submitting: bool,
    pub phase: SubmissionPhase,
    /// Attempts that took the lock.
    pub attempts: u32,
}

impl SubmissionState {
    fn bound() -> Self {
        Self {
            bound: true,
            submitting: false,
            phase: SubmissionPhase::Idle,
            attempts: 0,
        }
    }
}

/// Result of trying to take a form's lock.
#[derive(Debug)]
pub enum LockAttempt<'a> {
    Acquired(SubmissionLock<'a>),
    InFlight,
    NotBound,
}

/// Held `submitting` flag of one form.
///
/// Dropping the lock releases the form, so an attempt that is abandoned midway
/// (its future dropped) leaves the form submittable again.
#[derive(Debug)]
#[must_use = "dropping the lock releases the form immediately"]
pub struct SubmissionLock<'a> {
    states: &'a FormStates,
    form: FormId,
    armed: bool,
}

impl SubmissionLock<'_> {
    pub fn form(&self) -> &FormId {
        &self.form
    }

    /// Release the form now.
    pub fn release(mut self) {
        self.armed = false;
        self.states.release(&self.form);
    }

    /// Keep the form locked for good; the page is navigating away.
    pub fn retire(mut self) {
        self.armed = false;
        self.states.set_phase(&self.form, SubmissionPhase::Redirecting);
    }
}

impl Drop for SubmissionLock<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!(form = %self.form, "Submission abandoned, releasing form");
            self.states.release(&self.form);
        }
    }
}

/// Thread-safe table of form states.
#[derive(Debug, Default)]
pub struct FormStates {
    forms: DashMap<FormId, SubmissionState>,
}

impl FormStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a form. Returns `false` if it was already bound; the existing state is kept.
    pub fn bind(&self, form: FormId) -> bool {
        if self.forms.contains_key(&form) {
            return false;
        }
        self.forms.insert(form, SubmissionState::bound());
        true
    }

    /// Unbind a form. Returns `false` if it was not bound.
    pub fn unbind(&self, form: &FormId) -> bool {
        self.forms.remove(form).is_some()
    }

    pub fn get(&self, form: &FormId) -> Option<SubmissionState> {
        self.forms.get(form).map(|state| *state)
    }

    pub fn is_bound(&self, form: &FormId) -> bool {
        self.forms.contains_key(form)
    }

    /// Atomically check and set the `submitting` flag.
    pub fn try_lock(&self, form: &FormId) -> LockAttempt<'_> {
        let Some(mut state) = self.forms.get_mut(form) else {
            return LockAttempt::NotBound;
        };
        if state.submitting {
            return LockAttempt::InFlight;
        }
        state.submitting = true;
        state.phase = SubmissionPhase::Sending;
        state.attempts += 1;
        LockAttempt::Acquired(SubmissionLock {
            states: self,
            form: form.clone(),
            armed: true,
        })
    }

    /// No-op if the form was unbound meanwhile.
    fn set_phase(&self, form: &FormId, phase: SubmissionPhase) {
        if let Some(mut state) = self.forms.get_mut(form) {
            state.phase = phase;
        }
    }

    fn release(&self, form: &FormId) {
        if let Some(mut state) = self.forms.get_mut(form) {
            state.submitting = false;
            state.phase = SubmissionPhase::Idle;
        }
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}
