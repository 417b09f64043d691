use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use survey_guard_core::{
    BehaviorEvent, DeviceData, EventData, KeyAction, KeystrokeData, MousePoint, NewSession,
    QuestionAnsweredData, RiskLevel, SessionStatus,
};
use survey_guard_detection::DetectionConfig;
use survey_guard_llm::LlmClient;
use survey_guard_storage::{EventStore, SessionStore, Storage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::memory_store::MemoryStore;
use crate::{
    DetectionService, ReportService, ResponseSubmission, ServiceError, SessionService,
    TextAnalysisService,
};

fn store() -> Arc<dyn Storage> {
    Arc::new(MemoryStore::default())
}

fn new_session(ua: &str, respondent: Option<&str>) -> NewSession {
    NewSession::validate("survey-1", Some("Qualtrics"), respondent, Some(ua.to_owned()), None, None)
        .unwrap()
}

fn at(ms: i64, data: EventData) -> BehaviorEvent {
    let base = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
    BehaviorEvent::new(base + chrono::Duration::milliseconds(ms), data)
}

fn scripted_events() -> Vec<BehaviorEvent> {
    let device = DeviceData {
        webdriver: true,
        screen_width: Some(1920),
        screen_height: Some(1080),
        touch: false,
    };
    let mut events = vec![at(0, EventData::Device(device))];
    for i in 0..10 {
        events.push(at(
            100 + i * 20,
            EventData::Keystroke(KeystrokeData {
                key: Some("a".to_owned()),
                key_code: None,
                action: KeyAction::Down,
            }),
        ));
    }
    for i in 0..15 {
        let p = i as f64 * 20.0;
        events.push(at(400 + i * 10, EventData::MouseMove(MousePoint { x: p, y: p })));
    }
    for (ms, duration_ms) in [(900, 500), (1_400, 450)] {
        events.push(at(
            ms,
            EventData::QuestionAnswered(QuestionAnsweredData {
                question_id: format!("q{ms}"),
                duration_ms,
            }),
        ));
    }
    events
}

// ── Sessions ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_session_starts_active_with_normalized_platform() {
    let sessions = SessionService::new(store(), 100);
    let session = sessions.create_session(new_session("Mozilla/5.0", Some("r1"))).await.unwrap();
    assert_eq!(session.platform_id, "qualtrics");
    assert_eq!(session.status, SessionStatus::Active);
    assert_eq!(sessions.get_session(&session.id).await.unwrap().id, session.id);
}

#[tokio::test]
async fn get_missing_session_is_not_found() {
    let sessions = SessionService::new(store(), 100);
    assert!(sessions.get_session("nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn ingest_validates_batches() {
    let sessions = SessionService::new(store(), 2);
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();

    let err = sessions.ingest_events(&session.id, &[]).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let too_many = scripted_events();
    let err = sessions.ingest_events(&session.id, &too_many[..3]).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(ref m) if m.contains("limit of 2")));

    let err = sessions.ingest_events("nope", &too_many[..1]).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn ingest_reports_running_total_and_refuses_completed_sessions() {
    let sessions = SessionService::new(store(), 100);
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    let events = scripted_events();

    let first = sessions.ingest_events(&session.id, &events[..5]).await.unwrap();
    assert_eq!(first.events_received, 5);
    assert_eq!(first.total_events, 5);
    let second = sessions.ingest_events(&session.id, &events[5..8]).await.unwrap();
    assert_eq!(second.total_events, 8);

    let completed = sessions.complete_session(&session.id).await.unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
    let err = sessions.ingest_events(&session.id, &events[..1]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn completion_committed_after_lookup_still_refuses_events() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    // Sweeper or a concurrent /complete flips the status behind the service's back.
    storage.update_session_status(&session.id, SessionStatus::Completed).await.unwrap();

    let err = sessions.ingest_events(&session.id, &scripted_events()[..2]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(ref m) if m.contains("completed")), "{err:?}");
    assert_eq!(storage.count_events(&session.id).await.unwrap(), 0);
}

#[tokio::test]
async fn completing_an_analyzed_session_keeps_its_status() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    storage.record_detection_summary(&session.id, false, 0.1, RiskLevel::Low).await.unwrap();

    let again = sessions.complete_session(&session.id).await.unwrap();
    assert_eq!(again.status, SessionStatus::Analyzed);
}

#[tokio::test]
async fn stale_sessions_are_closed() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    let mut old = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    old.id = "old".to_owned();
    old.created_at = Utc::now() - chrono::Duration::hours(30);
    storage.create_session(&old).await.unwrap();

    assert_eq!(sessions.close_stale_sessions(24).await.unwrap(), 1);
    assert_eq!(sessions.get_session("old").await.unwrap().status, SessionStatus::Completed);
    assert_eq!(sessions.get_session(&session.id).await.unwrap().status, SessionStatus::Active);
}

// ── Detection ────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_session_persists_verdict_and_updates_session() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let detection = DetectionService::new(Arc::clone(&storage), DetectionConfig::default());
    let session = sessions.create_session(new_session("Mozilla/5.0 HeadlessChrome/120.0", None)).await.unwrap();
    sessions.ingest_events(&session.id, &scripted_events()).await.unwrap();

    let result = detection.analyze_session(&session.id).await.unwrap();
    assert!(result.is_bot, "{result:?}");
    assert_eq!(result.event_count, 28);
    assert!(result.flags.iter().any(|f| f == "webdriver_flag"));

    let updated = sessions.get_session(&session.id).await.unwrap();
    assert_eq!(updated.status, SessionStatus::Analyzed);
    assert_eq!(updated.is_bot, Some(true));
    assert_eq!(updated.risk_level, Some(result.risk_level));

    let latest = detection.latest_result(&session.id).await.unwrap().unwrap();
    assert_eq!(latest.id, result.id);
}

#[tokio::test]
async fn analyze_session_without_events_flags_missing_telemetry() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let detection = DetectionService::new(Arc::clone(&storage), DetectionConfig::default());
    let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) Safari/605.1.15";
    let session = sessions.create_session(new_session(ua, None)).await.unwrap();

    let result = detection.analyze_session(&session.id).await.unwrap();
    assert!(!result.is_bot);
    assert_eq!(result.event_count, 0);
    assert!(result.flags.iter().any(|f| f == "no_behavioral_data"));
}

#[tokio::test]
async fn analyze_missing_session_is_not_found() {
    let detection = DetectionService::new(store(), DetectionConfig::default());
    assert!(detection.analyze_session("nope").await.unwrap_err().is_not_found());
}

// ── Text analysis ────────────────────────────────────────────────

fn submission(response: &str) -> ResponseSubmission {
    ResponseSubmission {
        question_id: Some("q1".to_owned()),
        question_text: "What did you think of the product?".to_owned(),
        response_text: response.to_owned(),
    }
}

#[tokio::test]
async fn text_analysis_without_llm_is_not_configured() {
    let texts = TextAnalysisService::new(store(), None);
    assert!(!texts.is_configured());
    let err = texts.analyze_response("any", submission("fine")).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotConfigured(_)));
}

#[tokio::test]
async fn text_analysis_is_persisted_and_listed() {
    let server = MockServer::start().await;
    let content = r#"{"score": 90, "flagged": false, "reason": "specific"}"#;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(&server)
        .await;
    let llm = LlmClient::new("k".to_owned(), server.uri())
        .unwrap()
        .with_retry_delay_unit(Duration::from_millis(1));

    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let texts = TextAnalysisService::new(Arc::clone(&storage), Some(Arc::new(llm)));
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();

    let analysis = texts
        .analyze_response(&session.id, submission("Battery life is great but the app crashes."))
        .await
        .unwrap();
    assert_eq!(analysis.quality_score, 90);
    assert!(!analysis.is_flagged);
    assert_eq!(analysis.checks.len(), 5);

    let listed = texts.list_for_session(&session.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, analysis.id);

    let err = texts.analyze_response("nope", submission("text")).await.unwrap_err();
    assert!(err.is_not_found());
    let err = texts.list_for_session("nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn text_analysis_rejects_blank_questions() {
    let server = MockServer::start().await;
    let llm = LlmClient::new("k".to_owned(), server.uri()).unwrap();
    let texts = TextAnalysisService::new(store(), Some(Arc::new(llm)));
    let mut blank = submission("fine");
    blank.question_text = "  ".to_owned();
    let err = texts.analyze_response("any", blank).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));
}

// ── Reports ──────────────────────────────────────────────────────

#[tokio::test]
async fn session_detail_respects_hierarchy_path() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let detection = DetectionService::new(Arc::clone(&storage), DetectionConfig::default());
    let reports = ReportService::new(Arc::clone(&storage));
    let session = sessions.create_session(new_session("Mozilla/5.0", None)).await.unwrap();
    detection.analyze_session(&session.id).await.unwrap();

    let detail = reports
        .session_in_hierarchy("survey-1", "qualtrics", "anonymous", &session.id)
        .await
        .unwrap();
    assert_eq!(detail.session.id, session.id);
    assert!(detail.latest_detection.is_some());
    assert!(detail.text_analyses.is_empty());

    let err = reports
        .session_in_hierarchy("survey-1", "decipher", "anonymous", &session.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let sessions_of = reports.list_respondent_sessions("survey-1", "qualtrics", "anonymous").await.unwrap();
    assert_eq!(sessions_of.len(), 1);
    assert!(reports.list_respondent_sessions("survey-1", "qualtrics", "bob").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn hierarchy_platform_segment_is_normalized() {
    let storage = store();
    let sessions = SessionService::new(Arc::clone(&storage), 100);
    let reports = ReportService::new(Arc::clone(&storage));
    let session = sessions.create_session(new_session("Mozilla/5.0", Some("r1"))).await.unwrap();

    let detail = reports
        .session_in_hierarchy("survey-1", " Qualtrics ", "r1", &session.id)
        .await
        .unwrap();
    assert_eq!(detail.session.id, session.id);
    assert_eq!(reports.list_respondent_sessions("survey-1", "QUALTRICS", "r1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_survey_is_not_found() {
    let reports = ReportService::new(store());
    assert!(reports.get_survey("missing").await.unwrap_err().is_not_found());
    assert!(reports.list_platforms("missing").await.unwrap_err().is_not_found());
}
