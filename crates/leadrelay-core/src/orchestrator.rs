//! Submission orchestrator.
//!
//! Drives one form submission from the submit event to either a redirect or a
//! recoverable failure:
//!
//! ```text
//! Idle -> Validating -> Sending -> Redirecting
//!                              \-> Recovering -> Idle
//! ```
//!
//! The payload is built and sent in a spawned task that is raced against the
//! global timeout. When the timer wins, the task is left to finish on its own and
//! its result is discarded. Spawned tasks are tracked so a short-lived host can
//! [`drain`](SubmissionOrchestrator::drain) them before shutting the runtime down.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};
use uuid::Uuid;

use leadrelay_config::{ChannelMode, SubmissionConfig};
use leadrelay_protocols::{
    DeliveryChannel, DeliveryError, DeliveryOutcome, DeliveryReceipt, EnrichmentProvider,
    FormId, FormUi, SubmissionError, SubmitEvent,
};

use crate::builder::PayloadBuilder;
use crate::state::{FormStates, LockAttempt, SubmissionLock, SubmissionState};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// Runtime settings for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub success_url: String,
    pub mode: ChannelMode,
    pub global_timeout: Duration,
    pub enrichment_timeout: Duration,
    pub enable_enrichment: bool,
    pub best_effort_delay: Duration,
    /// Message shown when an attempt fails.
    pub error_message: String,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from(&SubmissionConfig::default())
    }
}

impl From<&SubmissionConfig> for OrchestratorSettings {
    fn from(config: &SubmissionConfig) -> Self {
        Self {
            success_url: config.success_url.clone(),
            mode: config.channel_mode,
            global_timeout: config.global_timeout(),
            enrichment_timeout: config.enrichment_timeout(),
            enable_enrichment: config.enable_enrichment,
            best_effort_delay: config.best_effort_delay(),
            error_message: config.user_error_message(),
        }
    }
}

/// Why a submit event was dropped without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Another attempt holds the form's lock.
    InFlight,
    /// The form was never bound, or has been unbound.
    NotBound,
}

/// What a submit event led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Ignored(IgnoreReason),
    /// Failed validation; nothing was sent.
    Invalid,
    /// The user was sent to `url`. `outcome` is the delivery result known at that
    /// moment, `None` if it was still pending (best-effort mode only).
    Redirected {
        url: String,
        outcome: Option<DeliveryOutcome>,
    },
    /// Delivery failed or timed out; the form is unlocked again.
    Recovered(SubmissionError),
}

impl SubmissionOutcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirected { .. })
    }

    /// Delivery outcome of an attempt that reached the channel.
    pub fn delivery_outcome(&self) -> Option<DeliveryOutcome> {
        match self {
            Self::Redirected { outcome, .. } => *outcome,
            Self::Recovered(err) => err.outcome(),
            Self::Ignored(_) | Self::Invalid => None,
        }
    }
}

/// Owns per-form state and navigation for every bound form.
pub struct SubmissionOrchestrator {
    settings: OrchestratorSettings,
    builder: Arc<PayloadBuilder>,
    channel: Arc<dyn DeliveryChannel>,
    ui: Arc<dyn FormUi>,
    forms: FormStates,
    deliveries: TaskTracker,
}

impl SubmissionOrchestrator {
    pub fn new(
        settings: OrchestratorSettings,
        channel: Arc<dyn DeliveryChannel>,
        enrichment: Arc<dyn EnrichmentProvider>,
        ui: Arc<dyn FormUi>,
    ) -> Self {
        let builder = PayloadBuilder::new(
            enrichment,
            settings.enrichment_timeout,
            settings.enable_enrichment,
        );
        Self {
            settings,
            builder: Arc::new(builder),
            channel,
            ui,
            forms: FormStates::new(),
            deliveries: TaskTracker::new(),
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Start managing a form. Returns `false` if it was already bound.
    pub fn bind(&self, form: impl Into<FormId>) -> bool {
        let form = form.into();
        debug!(form = %form, "Binding form");
        self.forms.bind(form)
    }

    /// Stop managing a form. Returns `false` if it was not bound.
    pub fn unbind(&self, form: &FormId) -> bool {
        debug!(form = %form, "Unbinding form");
        self.forms.unbind(form)
    }

    pub fn state(&self, form: &FormId) -> Option<SubmissionState> {
        self.forms.get(form)
    }

    /// Deliveries still running, including ones nobody waits for any more.
    pub fn pending_deliveries(&self) -> usize {
        self.deliveries.len()
    }

    /// Wait up to `limit` for every spawned delivery to settle.
    ///
    /// Returns `false` if some were still running when `limit` elapsed. Submitting
    /// after a drain is still allowed.
    pub async fn drain(&self, limit: Duration) -> bool {
        self.deliveries.close();
        let settled = tokio::time::timeout(limit, self.deliveries.wait())
            .await
            .is_ok();
        self.deliveries.reopen();
        if !settled {
            warn!(
                pending = self.deliveries.len(),
                "Deliveries still running after drain limit"
            );
        }
        settled
    }

    /// Handle one submit event.
    pub async fn submit(&self, event: SubmitEvent) -> SubmissionOutcome {
        let attempt = Uuid::new_v4();
        let form = event.form_id.clone();

        if !self.forms.is_bound(&form) {
            warn!(form = %form, "Submit on unbound form ignored");
            return SubmissionOutcome::Ignored(IgnoreReason::NotBound);
        }

        debug!(form = %form, attempt = %attempt, "Validating submission");
        if !event.valid {
            self.ui.mark_attempted(&form);
            info!(form = %form, attempt = %attempt, "Form failed validation, nothing sent");
            return SubmissionOutcome::Invalid;
        }

        let lock = match self.forms.try_lock(&form) {
            LockAttempt::Acquired(lock) => lock,
            LockAttempt::InFlight => {
                debug!(form = %form, attempt = %attempt, "Submission already in flight, ignoring");
                return SubmissionOutcome::Ignored(IgnoreReason::InFlight);
            }
            LockAttempt::NotBound => {
                warn!(form = %form, "Form unbound during validation, ignoring");
                return SubmissionOutcome::Ignored(IgnoreReason::NotBound);
            }
        };

        self.ui.set_loading(&form, true);
        self.ui.clear_error(&form);
        info!(
            form = %form,
            attempt = %attempt,
            channel = %self.channel.id(),
            observable = self.channel.is_observable(),
            mode = ?self.settings.mode,
            "Sending submission"
        );

        let pipeline = self.spawn_pipeline(event, attempt);

        match self.settings.mode {
            ChannelMode::BestEffort => self.finish_best_effort(lock, attempt, pipeline).await,
            ChannelMode::Inspectable | ChannelMode::Opaque => {
                match self.race(pipeline).await {
                    Ok(receipt) => {
                        info!(
                            form = %form,
                            attempt = %attempt,
                            status = ?receipt.status,
                            "Submission delivered"
                        );
                        self.redirect(lock, attempt, Some(DeliveryOutcome::Delivered))
                    }
                    Err(err) => self.recover(lock, attempt, err),
                }
            }
        }
    }

    /// Build and send in a tracked task that outlives the caller's wait.
    fn spawn_pipeline(
        &self,
        event: SubmitEvent,
        attempt: Uuid,
    ) -> JoinHandle<Result<DeliveryReceipt, DeliveryError>> {
        let builder = Arc::clone(&self.builder);
        let channel = Arc::clone(&self.channel);

        self.deliveries.spawn(async move {
            let payload = builder.build_for(&event).await;
            debug!(attempt = %attempt, fields = payload.len(), "Payload built");
            let result = channel.send(&payload).await;
            debug!(attempt = %attempt, ok = result.is_ok(), "Channel settled");
            result
        })
    }

    /// Wait for the pipeline up to the global timeout.
    async fn race(
        &self,
        pipeline: JoinHandle<Result<DeliveryReceipt, DeliveryError>>,
    ) -> Result<DeliveryReceipt, SubmissionError> {
        let limit = self.settings.global_timeout;
        match tokio::time::timeout(limit, pipeline).await {
            Ok(Ok(result)) => result.map_err(SubmissionError::from),
            Ok(Err(join_err)) => Err(SubmissionError::Transport(DeliveryError::Network(
                format!("Delivery task failed: {}", join_err),
            ))),
            Err(_) => Err(SubmissionError::Timeout {
                after_ms: limit.as_millis() as u64,
            }),
        }
    }

    /// Wait briefly for the pipeline, then redirect whatever happened.
    async fn finish_best_effort(
        &self,
        lock: SubmissionLock<'_>,
        attempt: Uuid,
        pipeline: JoinHandle<Result<DeliveryReceipt, DeliveryError>>,
    ) -> SubmissionOutcome {
        let form = lock.form();
        let outcome = match tokio::time::timeout(self.settings.best_effort_delay, pipeline).await {
            Ok(Ok(Ok(_))) => Some(DeliveryOutcome::Delivered),
            Ok(Ok(Err(err))) => {
                warn!(form = %form, attempt = %attempt, error = %err, "Delivery failed, redirecting anyway");
                Some(DeliveryOutcome::TransportError)
            }
            Ok(Err(join_err)) => {
                warn!(form = %form, attempt = %attempt, error = %join_err, "Delivery task failed, redirecting anyway");
                Some(DeliveryOutcome::TransportError)
            }
            Err(_) => {
                warn!(form = %form, attempt = %attempt, "Delivery still pending, redirecting anyway");
                None
            }
        };
        self.redirect(lock, attempt, outcome)
    }

    /// Leave the page. The lock is retired, never released.
    fn redirect(
        &self,
        lock: SubmissionLock<'_>,
        attempt: Uuid,
        outcome: Option<DeliveryOutcome>,
    ) -> SubmissionOutcome {
        let form = lock.form().clone();
        lock.retire();
        info!(form = %form, attempt = %attempt, url = %self.settings.success_url, "Redirecting");
        self.ui.redirect(&form, &self.settings.success_url);
        SubmissionOutcome::Redirected {
            url: self.settings.success_url.clone(),
            outcome,
        }
    }

    /// Unlock the form and show the error.
    fn recover(
        &self,
        lock: SubmissionLock<'_>,
        attempt: Uuid,
        err: SubmissionError,
    ) -> SubmissionOutcome {
        let form = lock.form().clone();
        debug!(form = %form, attempt = %attempt, "Recovering");
        match &err {
            SubmissionError::Timeout { after_ms } => warn!(
                form = %form,
                attempt = %attempt,
                after_ms,
                "Submission timed out, endpoint may be unreachable"
            ),
            other => warn!(
                form = %form,
                attempt = %attempt,
                status = ?delivery_status(other),
                error = %other,
                "Submission failed"
            ),
        }

        lock.release();
        self.ui.set_loading(&form, false);
        self.ui.show_error(&form, &self.settings.error_message);
        SubmissionOutcome::Recovered(err)
    }
}

fn delivery_status(err: &SubmissionError) -> Option<u16> {
    match err {
        SubmissionError::Transport(delivery) => delivery.status(),
        _ => None,
    }
}
