//! End-to-end submission scenarios against mock HTTP services.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadrelay_channel_http::{HttpTarget, InspectableChannel, OpaqueChannel};
use leadrelay_config::{ChannelMode, PayloadEncoding};
use leadrelay_core::{IgnoreReason, OrchestratorSettings, SubmissionOrchestrator, SubmissionOutcome};
use leadrelay_enrichment_geoip::{GeoIpProvider, NoEnrichment};
use leadrelay_protocols::payload::keys;
use leadrelay_protocols::{
    DeliveryChannel, DeliveryOutcome, EnrichmentProvider, FormFields, FormId, FormUi,
    NavigationContext, SubmissionError, SubmitEvent,
};

#[derive(Default)]
struct TestUi {
    errors: Mutex<Vec<String>>,
    redirects: Mutex<Vec<String>>,
    attempted: Mutex<usize>,
}

impl TestUi {
    fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }

    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl FormUi for TestUi {
    fn mark_attempted(&self, _form: &FormId) {
        *self.attempted.lock().unwrap() += 1;
    }

    fn set_loading(&self, _form: &FormId, _loading: bool) {}

    fn clear_error(&self, _form: &FormId) {}

    fn show_error(&self, _form: &FormId, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn redirect(&self, _form: &FormId, url: &str) {
        self.redirects.lock().unwrap().push(url.to_string());
    }
}

fn settings(mode: ChannelMode) -> OrchestratorSettings {
    OrchestratorSettings {
        success_url: "/thanks/".to_string(),
        mode,
        global_timeout: Duration::from_millis(2_000),
        enrichment_timeout: Duration::from_millis(300),
        enable_enrichment: false,
        best_effort_delay: Duration::from_millis(500),
        error_message: "Failed to submit. Please try again.".to_string(),
    }
}

fn inspectable(endpoint: &str) -> Arc<dyn DeliveryChannel> {
    let target = HttpTarget::new(endpoint, PayloadEncoding::Json).unwrap();
    Arc::new(InspectableChannel::new("inspectable-http", target).unwrap())
}

fn opaque(endpoint: &str) -> Arc<dyn DeliveryChannel> {
    let target = HttpTarget::new(endpoint, PayloadEncoding::TextPlain).unwrap();
    Arc::new(OpaqueChannel::new("opaque-http", target).unwrap())
}

fn orchestrator(
    settings: OrchestratorSettings,
    channel: Arc<dyn DeliveryChannel>,
    enrichment: Arc<dyn EnrichmentProvider>,
) -> (SubmissionOrchestrator, Arc<TestUi>) {
    let ui = Arc::new(TestUi::default());
    let orchestrator = SubmissionOrchestrator::new(settings, channel, enrichment, ui.clone());
    orchestrator.bind("quoteForm");
    (orchestrator, ui)
}

fn event() -> SubmitEvent {
    SubmitEvent::new(
        "quoteForm",
        FormFields::new()
            .with("name", "Alice")
            .with("email", "alice@example.com")
            .with("service", "install")
            .with("service", "repair"),
        NavigationContext::new("https://example.com/quote?utm_source=google&gclid=xyz")
            .with_user_agent("Mozilla/5.0")
            .with_lang("en-US"),
    )
}

async fn sent_json(server: &MockServer) -> serde_json::Value {
    let requests = server.received_requests().await.unwrap();
    let request = requests
        .iter()
        .find(|r| r.url.path() == "/collect")
        .expect("no delivery request");
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn scenario_a_inspectable_success_redirects_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/collect", server.uri());
    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::Inspectable),
        inspectable(&endpoint),
        Arc::new(NoEnrichment),
    );

    let outcome = orchestrator.submit(event()).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Redirected {
            url: "/thanks/".to_string(),
            outcome: Some(DeliveryOutcome::Delivered),
        }
    );
    assert_eq!(ui.redirects(), vec!["/thanks/".to_string()]);

    let body = sent_json(&server).await;
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["service"], serde_json::json!(["install", "repair"]));
    assert_eq!(body[keys::UTM_SOURCE], "google");
    assert_eq!(body[keys::GCLID], "xyz");
    assert_eq!(body[keys::UTM_TERM], "");
    assert_eq!(body[keys::FORM_ID], "quoteForm");
}

#[tokio::test]
async fn scenario_b_network_error_recovers() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/collect", server.uri());
    drop(server);

    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::Opaque),
        opaque(&endpoint),
        Arc::new(NoEnrichment),
    );

    let outcome = orchestrator.submit(event()).await;

    assert!(matches!(
        outcome,
        SubmissionOutcome::Recovered(SubmissionError::Transport(_))
    ));
    assert!(ui.redirects().is_empty());
    assert_eq!(ui.errors(), vec!["Failed to submit. Please try again.".to_string()]);
    assert!(!orchestrator.state(&FormId::from("quoteForm")).unwrap().submitting);
}

#[tokio::test]
async fn scenario_b_inspectable_rejection_recovers_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(500).set_body_string("sheet quota exceeded"))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/collect", server.uri());
    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::Inspectable),
        inspectable(&endpoint),
        Arc::new(NoEnrichment),
    );

    let outcome = orchestrator.submit(event()).await;

    match outcome {
        SubmissionOutcome::Recovered(SubmissionError::Transport(err)) => {
            assert_eq!(err.status(), Some(500));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(ui.redirects().is_empty());
}

#[tokio::test]
async fn scenario_c_hanging_enrichment_still_delivers() {
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ip": "203.0.113.9", "country_code": "US"}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&geo)
        .await;

    let collector = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&collector)
        .await;

    let mut settings = settings(ChannelMode::Inspectable);
    settings.enable_enrichment = true;
    let provider = GeoIpProvider::new("geoip", &format!("{}/json/", geo.uri())).unwrap();
    let endpoint = format!("{}/collect", collector.uri());
    let (orchestrator, _ui) = orchestrator(settings, inspectable(&endpoint), Arc::new(provider));

    let start = Instant::now();
    let outcome = orchestrator.submit(event()).await;

    assert!(outcome.is_redirect());
    assert!(start.elapsed() < Duration::from_millis(2_000));

    let body = sent_json(&collector).await;
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body[keys::IP], "unknown");
    assert_eq!(body[keys::COUNTRY], "unknown");
    for key in keys::METADATA {
        assert!(body.get(*key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn scenario_c_enrichment_success_is_merged() {
    let geo = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"ip": "203.0.113.9", "country_code": "US"})),
        )
        .expect(1)
        .mount(&geo)
        .await;

    let collector = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&collector)
        .await;

    let mut settings = settings(ChannelMode::Inspectable);
    settings.enable_enrichment = true;
    let provider = GeoIpProvider::new("geoip", &format!("{}/json/", geo.uri())).unwrap();
    let endpoint = format!("{}/collect", collector.uri());
    let (orchestrator, _ui) = orchestrator(settings, inspectable(&endpoint), Arc::new(provider));

    assert!(orchestrator.submit(event()).await.is_redirect());

    let body = sent_json(&collector).await;
    assert_eq!(body[keys::IP], "203.0.113.9");
    assert_eq!(body[keys::COUNTRY], "US");
}

#[tokio::test]
async fn scenario_d_timeout_then_late_success_is_inert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(600)))
        .expect(1)
        .mount(&server)
        .await;

    let mut settings = settings(ChannelMode::Inspectable);
    settings.global_timeout = Duration::from_millis(200);
    let endpoint = format!("{}/collect", server.uri());
    let (orchestrator, ui) =
        orchestrator(settings, inspectable(&endpoint), Arc::new(NoEnrichment));

    let outcome = orchestrator.submit(event()).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Recovered(SubmissionError::Timeout { after_ms: 200 })
    );

    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(ui.redirects().is_empty());
    assert_eq!(ui.errors().len(), 1);
    assert!(!orchestrator.state(&FormId::from("quoteForm")).unwrap().submitting);
}

#[tokio::test]
async fn scenario_e_invalid_form_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let endpoint = format!("{}/collect", server.uri());
    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::Inspectable),
        inspectable(&endpoint),
        Arc::new(NoEnrichment),
    );

    let outcome = orchestrator.submit(event().invalid()).await;

    assert_eq!(outcome, SubmissionOutcome::Invalid);
    assert_eq!(*ui.attempted.lock().unwrap(), 1);
    let state = orchestrator.state(&FormId::from("quoteForm")).unwrap();
    assert!(!state.submitting);
    assert_eq!(state.attempts, 0);
}

#[tokio::test]
async fn opaque_channel_redirects_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collect"))
        .and(header("content-type", "text/plain;charset=utf-8"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/collect", server.uri());
    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::Opaque),
        opaque(&endpoint),
        Arc::new(NoEnrichment),
    );

    assert!(orchestrator.submit(event()).await.is_redirect());
    assert_eq!(ui.redirects().len(), 1);
}

#[tokio::test]
async fn best_effort_redirects_when_endpoint_unreachable() {
    let server = MockServer::start().await;
    let endpoint = format!("{}/collect", server.uri());
    drop(server);

    let (orchestrator, ui) = orchestrator(
        settings(ChannelMode::BestEffort),
        opaque(&endpoint),
        Arc::new(NoEnrichment),
    );

    let outcome = orchestrator.submit(event()).await;

    assert!(outcome.is_redirect());
    assert!(matches!(
        outcome.delivery_outcome(),
        Some(DeliveryOutcome::TransportError) | None
    ));
    assert!(ui.errors().is_empty());

    let again = orchestrator.submit(event()).await;
    assert_eq!(again, SubmissionOutcome::Ignored(IgnoreReason::InFlight));
}
