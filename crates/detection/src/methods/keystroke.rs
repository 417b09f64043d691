//! Typing rhythm: humans type with irregular gaps and release every key.

use crate::stats::{coefficient_of_variation, intervals_ms, mean};
use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

const MIN_KEY_DOWNS: usize = 5;
const UNIFORM_CV: f64 = 0.15;
const SUPERHUMAN_MEAN_MS: f64 = 40.0;

pub(crate) fn analyze(view: &EventView) -> Option<MethodScore> {
    if view.key_downs_ms.len() < MIN_KEY_DOWNS {
        return None;
    }
    let intervals = intervals_ms(&view.key_downs_ms);
    let mut vote = MethodScore::start(DetectionMethod::Keystroke);

    // Zero mean interval has no CV and is as uniform as it gets.
    if coefficient_of_variation(&intervals).is_none_or(|cv| cv < UNIFORM_CV) {
        vote.penalize("uniform_keystroke_timing", 0.5);
    }
    if mean(&intervals).is_some_and(|m| m < SUPERHUMAN_MEAN_MS) {
        vote.penalize("superhuman_typing_speed", 0.4);
    }
    if view.key_ups == 0 {
        vote.penalize("no_key_release_events", 0.2);
    }
    Some(vote.finish())
}
