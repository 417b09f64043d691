//! Session pacing: how long answers take and how regular the event stream is.

use crate::stats::{coefficient_of_variation, intervals_ms, median};
use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

const MIN_SESSION_SPAN_MS: i64 = 10_000;
const FAST_ANSWER_MEDIAN_MS: f64 = 2_000.0;
const CADENCE_MIN_EVENTS: usize = 20;
const REGULAR_CADENCE_CV: f64 = 0.05;

pub(crate) fn analyze(view: &EventView) -> Option<MethodScore> {
    if view.is_empty() {
        return None;
    }
    let mut vote = MethodScore::start(DetectionMethod::Timing);
    let answered = !view.question_durations_ms.is_empty();

    if answered && view.span_ms() < MIN_SESSION_SPAN_MS {
        vote.penalize("session_too_short", 0.4);
    }
    if median(&view.question_durations_ms).is_some_and(|m| m < FAST_ANSWER_MEDIAN_MS) {
        vote.penalize("fast_question_answers", 0.4);
    }
    if view.all_ms.len() >= CADENCE_MIN_EVENTS
        && coefficient_of_variation(&intervals_ms(&view.all_ms))
            .is_some_and(|cv| cv < REGULAR_CADENCE_CV)
    {
        vote.penalize("regular_event_cadence", 0.3);
    }
    if view.paste_count > 0 && view.pasted_chars > view.keystroke_count() as u64 {
        vote.penalize("excessive_paste", 0.3);
    }
    Some(vote.finish())
}
