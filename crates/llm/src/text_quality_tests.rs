use std::sync::Arc;
use std::time::Duration;

use survey_guard_core::{TextCheck, TextCheckResult};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::text_quality::{aggregate, looks_like_gibberish, process_result, TextQualityAnalyzer};

fn analyzer(server: &MockServer) -> TextQualityAnalyzer {
    let client = LlmClient::new("test-key".to_owned(), server.uri())
        .unwrap()
        .with_retry_delay_unit(Duration::from_millis(1));
    TextQualityAnalyzer::new(Arc::new(client))
}

fn check_reply(score: u8, flagged: bool, reason: &str) -> ResponseTemplate {
    let content = serde_json::json!({ "score": score, "flagged": flagged, "reason": reason });
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content.to_string() } }]
    }))
}

fn ok(check: TextCheck, score: u8, flagged: bool) -> TextCheckResult {
    TextCheckResult { check, score, flagged, reason: "model says so".to_owned(), failed: false }
}

#[tokio::test]
async fn good_answer_passes_all_checks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(check_reply(85, false, "thoughtful"))
        .expect(5)
        .mount(&server)
        .await;

    let report = analyzer(&server)
        .analyze(
            "s1",
            "What did you like about the checkout flow?",
            "The address autocomplete saved me a lot of typing on my phone.",
        )
        .await;

    assert_eq!(report.quality_score, 85);
    assert!(!report.is_flagged);
    assert!(report.flags.is_empty());
    assert_eq!(report.checks.len(), 5);
}

#[tokio::test]
async fn one_failing_check_is_surfaced_in_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Check: relevance"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(check_reply(70, false, "fine"))
        .mount(&server)
        .await;

    let report = analyzer(&server).analyze("s1", "Why?", "Because the prices were fair.").await;

    let relevance = report.checks.iter().find(|c| c.check == TextCheck::Relevance).unwrap();
    assert!(relevance.is_failure());
    assert!(relevance.reason.starts_with("Analysis failed: "), "{}", relevance.reason);
    assert!(relevance.reason.contains("400"));
    assert_eq!(relevance.score, 50);
    assert!(!relevance.flagged);
    // The failed check does not drag the composite towards neutral.
    assert_eq!(report.quality_score, 70);
    assert!(!report.is_flagged);
}

#[tokio::test]
async fn flagged_checks_become_flags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("Check: generic_response"))
        .respond_with(check_reply(10, true, "generic filler"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(check_reply(60, false, "ok"))
        .mount(&server)
        .await;

    let report = analyzer(&server).analyze("s1", "Any other comments?", "good").await;

    assert_eq!(report.flags, vec!["generic_response".to_owned()]);
    assert!(report.is_flagged);
    assert_eq!(report.quality_score, 50);
}

#[tokio::test]
async fn empty_answer_skips_the_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(check_reply(90, false, "x")).expect(0).mount(&server).await;

    let report = analyzer(&server).analyze("s1", "Why?", "   ").await;

    assert_eq!(report.quality_score, 0);
    assert!(report.is_flagged);
    assert_eq!(report.flags, vec!["empty_response".to_owned()]);
    assert!(report.checks.iter().all(|c| c.score == 0 && c.flagged));
}

#[tokio::test]
async fn gibberish_is_caught_even_when_model_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("no key"))
        .mount(&server)
        .await;

    let report = analyzer(&server).analyze("s1", "Describe your experience", "asdfgh qwerty zxcvbn").await;

    assert!(report.quality_score <= 30);
    assert!(report.is_flagged);
    assert!(report.flags.contains(&"gibberish".to_owned()));
    assert!(report.checks.iter().all(TextCheckResult::is_failure));
}

#[test]
fn process_result_passes_success_through() {
    let result = ok(TextCheck::Effort, 77, false);
    assert_eq!(process_result("s1", TextCheck::Effort, Ok(result.clone())), result);
}

#[test]
fn process_result_replaces_error_with_neutral_default() {
    let err = LlmError::HttpStatus { code: 500, body: "boom".to_owned() };
    let result = process_result("s1", TextCheck::CopyPaste, Err(err));
    assert_eq!(result.check, TextCheck::CopyPaste);
    assert_eq!(result.score, 50);
    assert!(!result.flagged);
    assert!(result.is_failure());
    assert_eq!(result.reason, "Analysis failed: model endpoint returned 500: boom");
}

#[test]
fn aggregate_with_all_failures_is_neutral() {
    let checks = TextCheck::ALL
        .into_iter()
        .map(|check| TextCheckResult::failure(check, "timeout"))
        .collect();
    let report = aggregate(checks, false);
    assert_eq!(report.quality_score, 50);
    assert!(!report.is_flagged);
}

#[test]
fn aggregate_flags_low_composite_without_individual_flags() {
    let checks = vec![ok(TextCheck::Effort, 30, false), ok(TextCheck::Relevance, 40, false)];
    let report = aggregate(checks, false);
    assert_eq!(report.quality_score, 35);
    assert!(report.flags.is_empty());
    assert!(report.is_flagged);
}

#[test]
fn model_reason_cannot_pose_as_a_failed_check() {
    let mut checks: Vec<TextCheckResult> = [
        TextCheck::Gibberish,
        TextCheck::CopyPaste,
        TextCheck::Relevance,
        TextCheck::GenericResponse,
    ]
    .into_iter()
    .map(|check| ok(check, 90, false))
    .collect();
    let mut effort = ok(TextCheck::Effort, 5, false);
    effort.reason = "Analysis failed: respondent wrote one word".to_owned();
    checks.push(effort);

    let report = aggregate(checks, false);
    assert_eq!(report.quality_score, 73);
}

#[test]
fn gibberish_heuristic() {
    assert!(looks_like_gibberish("aaaaaaaaaa"));
    assert!(looks_like_gibberish("zzzzzzz"));
    assert!(looks_like_gibberish("asdfgh jkl qwerty"));
    assert!(looks_like_gibberish("bcdfgh pltkrs"));
    assert!(!looks_like_gibberish("The survey was interesting and well designed"));
    assert!(!looks_like_gibberish("ok"));
    assert!(!looks_like_gibberish("Очень понравилось обслуживание"));
}

#[test]
fn gibberish_heuristic_ignores_numbers_emphasis_and_acronyms() {
    assert!(!looks_like_gibberish("I would pay 100000 dollars for it"));
    assert!(!looks_like_gibberish("Sooooo good!!!!!"));
    assert!(!looks_like_gibberish("HTML, CSS, SQL"));
    assert!(!looks_like_gibberish("We mostly use HTML and CSS at work"));
    assert!(!looks_like_gibberish("!!!!!!!!"));
}
