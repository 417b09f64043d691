//! Scrolling: wheel input from people varies in both step size and cadence.

use crate::stats::{coefficient_of_variation, intervals_ms};
use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

const MIN_SCROLLS: usize = 5;
const UNIFORM_TIMING_CV: f64 = 0.1;

pub(crate) fn analyze(view: &EventView) -> Option<MethodScore> {
    if view.scrolls.len() < MIN_SCROLLS {
        return None;
    }
    let mut vote = MethodScore::start(DetectionMethod::Scroll);

    let first_delta = view.scrolls[0].1;
    if view.scrolls.iter().all(|(_, d)| (d - first_delta).abs() < f64::EPSILON) {
        vote.penalize("uniform_scroll_deltas", 0.5);
    }

    let times: Vec<i64> = view.scrolls.iter().map(|(t, _)| *t).collect();
    if coefficient_of_variation(&intervals_ms(&times)).is_none_or(|cv| cv < UNIFORM_TIMING_CV) {
        vote.penalize("uniform_scroll_timing", 0.5);
    }
    Some(vote.finish())
}
