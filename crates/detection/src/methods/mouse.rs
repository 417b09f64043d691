//! Pointer movement: scripted cursors travel in straight lines at constant speed.

use survey_guard_core::MousePoint;

use crate::stats::coefficient_of_variation;
use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

const MIN_MOVES: usize = 10;
const LINEAR_STRAIGHTNESS: f64 = 0.98;
const CONSTANT_VELOCITY_CV: f64 = 0.1;
const TELEPORT_DISTANCE_PX: f64 = 500.0;
const TELEPORT_WINDOW_MS: i64 = 10;

fn distance(a: MousePoint, b: MousePoint) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

pub(crate) fn analyze(view: &EventView) -> Option<MethodScore> {
    if view.moves.len() < MIN_MOVES {
        if view.moves.is_empty() && view.clicks > 0 {
            let mut vote = MethodScore::start(DetectionMethod::Mouse);
            vote.penalize("clicks_without_movement", 0.6);
            return Some(vote.finish());
        }
        return None;
    }

    let mut path_len = 0.0;
    let mut velocities = Vec::with_capacity(view.moves.len());
    let mut teleported = false;
    for pair in view.moves.windows(2) {
        let ((t0, p0), (t1, p1)) = (pair[0], pair[1]);
        let step = distance(p0, p1);
        let dt = t1 - t0;
        path_len += step;
        if dt > 0 {
            velocities.push(step / dt as f64);
        }
        if step > TELEPORT_DISTANCE_PX && dt < TELEPORT_WINDOW_MS {
            teleported = true;
        }
    }

    let mut vote = MethodScore::start(DetectionMethod::Mouse);
    if path_len >= 1.0 {
        let (first, last) = (view.moves[0].1, view.moves[view.moves.len() - 1].1);
        let straightness = distance(first, last) / path_len;
        if straightness > LINEAR_STRAIGHTNESS {
            vote.penalize("linear_mouse_paths", 0.5);
        }
    }
    if coefficient_of_variation(&velocities).is_some_and(|cv| cv < CONSTANT_VELOCITY_CV) {
        vote.penalize("constant_mouse_velocity", 0.3);
    }
    if teleported {
        vote.penalize("teleporting_cursor", 0.2);
    }
    Some(vote.finish())
}
