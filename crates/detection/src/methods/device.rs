//! Device and client signals reported by the collection script.

use regex::Regex;
use std::sync::LazyLock;

use crate::view::EventView;
use crate::{DetectionMethod, MethodScore};

static AUTOMATION_UA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)headless|phantomjs|selenium|webdriver|puppeteer|playwright|bot|crawler|spider|curl|python-requests|wget",
    )
    .map_err(|e| tracing::error!("automation user-agent pattern failed to compile: {e}"))
    .ok()
});

pub(crate) fn is_automation_user_agent(user_agent: &str) -> bool {
    AUTOMATION_UA.as_ref().is_some_and(|re| re.is_match(user_agent))
}

pub(crate) fn analyze(view: &EventView, user_agent: Option<&str>) -> MethodScore {
    let mut vote = MethodScore::start(DetectionMethod::Device);
    match user_agent.map(str::trim).filter(|ua| !ua.is_empty()) {
        Some(ua) if is_automation_user_agent(ua) => {
            vote.penalize("automation_user_agent", 0.7);
        },
        Some(_) => {},
        None => vote.penalize("missing_user_agent", 0.3),
    }
    if view.devices.iter().any(|d| d.webdriver) {
        vote.penalize("webdriver_flag", 0.8);
    }
    if view.devices.iter().any(|d| d.screen_width == Some(0) || d.screen_height == Some(0)) {
        vote.penalize("invalid_screen_size", 0.3);
    }
    vote.finish()
}
