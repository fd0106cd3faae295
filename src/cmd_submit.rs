//! `submit` and `preview` command handlers.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use leadrelay_channel_http::{channel_from_config, encode_payload};
use leadrelay_config::{Config, ConfigValidator, PayloadEncoding};
use leadrelay_core::{OrchestratorSettings, PayloadBuilder, SubmissionOrchestrator, SubmissionOutcome};
use leadrelay_enrichment_geoip::provider_from_config;
use leadrelay_protocols::{FormFields, NavigationContext, SubmissionError, SubmitEvent};

use crate::cli::FormArgs;
use crate::ui::ConsoleUi;

pub(crate) async fn handle_submit(
    mut config: Config,
    form: FormArgs,
    endpoint: Option<String>,
    invalid: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(endpoint) = endpoint {
        config.submission.endpoint = endpoint;
    }
    for warning in ConfigValidator::validate(&config).into_result()? {
        warn!(path = %warning.path, "{}", warning.message);
    }

    let channel = channel_from_config(&config)?;
    let enrichment = provider_from_config(&config)?;
    let orchestrator = SubmissionOrchestrator::new(
        OrchestratorSettings::from(&config.submission),
        channel,
        enrichment,
        Arc::new(ConsoleUi),
    );

    let mut event = submit_event(form);
    if invalid {
        event = event.invalid();
    }
    orchestrator.bind(event.form_id.clone());

    let outcome = orchestrator.submit(event).await;

    // Deliveries the orchestrator stopped waiting for still run until here.
    let limit = Duration::from_secs(config.channel.timeout_seconds);
    if !orchestrator.drain(limit).await {
        warn!(
            pending = orchestrator.pending_deliveries(),
            "Exiting with deliveries still in flight"
        );
    }

    outcome_to_result(outcome)
}

fn outcome_to_result(outcome: SubmissionOutcome) -> Result<(), Box<dyn std::error::Error>> {
    match outcome {
        SubmissionOutcome::Redirected { url, outcome } => {
            if outcome.is_some_and(|o| o.is_delivered()) {
                info!(url = %url, "Submission delivered");
            } else {
                warn!(url = %url, outcome = ?outcome, "Redirected without confirmed delivery");
            }
            Ok(())
        }
        SubmissionOutcome::Recovered(err) => Err(err.into()),
        SubmissionOutcome::Invalid => Err(SubmissionError::Validation.into()),
        SubmissionOutcome::Ignored(reason) => {
            Err(format!("submission ignored: {:?}", reason).into())
        }
    }
}

pub(crate) async fn handle_preview(
    config: Config,
    form: FormArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let enrichment = provider_from_config(&config)?;
    let builder = PayloadBuilder::new(
        enrichment,
        config.submission.enrichment_timeout(),
        config.submission.enable_enrichment,
    );
    let payload = builder.build_for(&submit_event(form)).await;

    let encoding = config
        .channel
        .effective_encoding(config.submission.channel_mode);
    match encoding {
        PayloadEncoding::FormUrlencoded => {
            let encoded = encode_payload(&payload, encoding, config.channel.form_name.as_deref())?;
            println!("Content-Type: {}", encoded.content_type);
            println!("{}", encoded.body);
        }
        PayloadEncoding::Json | PayloadEncoding::TextPlain => {
            println!("Content-Type: {}", encoding.content_type());
            println!("{}", serde_json::to_string_pretty(&payload.to_json())?);
        }
    }
    Ok(())
}

fn submit_event(form: FormArgs) -> SubmitEvent {
    let fields: FormFields = form.fields.into_iter().collect();
    let mut context = NavigationContext::new(form.page_url)
        .with_user_agent(form.user_agent)
        .with_lang(form.lang);
    if let Some(referrer) = form.referrer {
        context = context.with_referrer(referrer);
    }
    SubmitEvent::new(form.form.as_str(), fields, context)
}
