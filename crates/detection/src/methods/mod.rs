pub(crate) mod device;
pub(crate) mod keystroke;
pub(crate) mod mouse;
pub(crate) mod scroll;
pub(crate) mod timing;

use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

/// A session with no telemetry at all is itself suspicious.
pub(crate) fn coverage(view: &EventView) -> Option<MethodScore> {
    if !view.is_empty() {
        return None;
    }
    let mut vote = MethodScore::start(DetectionMethod::Coverage);
    vote.penalize("no_behavioral_data", 0.5);
    Some(vote.finish())
}
