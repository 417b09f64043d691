//! Rule-based bot detection over behavioral survey telemetry.
//!
//! Each method inspects one facet of a session (typing rhythm, pointer
//! movement, scrolling, pacing, device signals) and emits a score in `[0, 1]`
//! where higher means more automation-like. Methods without enough data
//! abstain. The composite score is the weighted mean of the methods that
//! voted.

#![allow(clippy::missing_errors_doc, reason = "Pure functions, no errors")]
#![allow(clippy::cast_precision_loss, reason = "Event counts and pixels fit in f64")]

mod methods;
mod stats;
mod view;


use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use survey_guard_core::{BehaviorEvent, DEFAULT_BOT_THRESHOLD, RiskLevel};

use crate::view::EventView;

/// Detection methods, in the order their flags are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Keystroke,
    Mouse,
    Scroll,
    Timing,
    Device,
    Coverage,
}

impl DetectionMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Keystroke => "keystroke",
            Self::Mouse => "mouse",
            Self::Scroll => "scroll",
            Self::Timing => "timing",
            Self::Device => "device",
            Self::Coverage => "coverage",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote of a single method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodScore {
    pub method: DetectionMethod,
    pub score: f64,
    pub flags: Vec<&'static str>,
}

impl MethodScore {
    /// Start an empty vote and accumulate penalties with [`Self::penalize`].
    pub(crate) const fn start(method: DetectionMethod) -> Self {
        Self { method, score: 0.0, flags: Vec::new() }
    }

    pub(crate) fn penalize(&mut self, flag: &'static str, amount: f64) {
        self.score += amount;
        self.flags.push(flag);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.score = self.score.clamp(0.0, 1.0);
        self
    }
}

/// Relative weight of each method in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodWeights {
    pub keystroke: f64,
    pub mouse: f64,
    pub scroll: f64,
    pub timing: f64,
    pub device: f64,
    pub coverage: f64,
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self { keystroke: 0.30, mouse: 0.25, scroll: 0.10, timing: 0.20, device: 0.15, coverage: 0.20 }
    }
}

impl MethodWeights {
    #[must_use]
    pub const fn weight(&self, method: DetectionMethod) -> f64 {
        match method {
            DetectionMethod::Keystroke => self.keystroke,
            DetectionMethod::Mouse => self.mouse,
            DetectionMethod::Scroll => self.scroll,
            DetectionMethod::Timing => self.timing,
            DetectionMethod::Device => self.device,
            DetectionMethod::Coverage => self.coverage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    /// Composite scores at or above this are classified as bots.
    pub threshold: f64,
    pub weights: MethodWeights,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { threshold: DEFAULT_BOT_THRESHOLD, weights: MethodWeights::default() }
    }
}

/// Session attributes the rules need besides the event stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionContext<'a> {
    pub user_agent: Option<&'a str>,
}

/// Composite verdict for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionOutcome {
    pub is_bot: bool,
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub method_scores: BTreeMap<String, f64>,
    pub flags: Vec<String>,
    pub event_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionEngine {
    config: DetectionConfig,
}

impl DetectionEngine {
    #[must_use]
    pub const fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run every method over `events` and combine the votes.
    ///
    /// Input order does not matter: events are ordered by timestamp first.
    #[must_use]
    pub fn analyze(&self, events: &[BehaviorEvent], ctx: &SessionContext<'_>) -> DetectionOutcome {
        let view = EventView::build(events);
        let votes: Vec<MethodScore> = [
            methods::keystroke::analyze(&view),
            methods::mouse::analyze(&view),
            methods::scroll::analyze(&view),
            methods::timing::analyze(&view),
            Some(methods::device::analyze(&view, ctx.user_agent)),
            methods::coverage(&view),
        ]
        .into_iter()
        .flatten()
        .collect();
        self.combine(&votes, events.len())
    }

    fn combine(&self, votes: &[MethodScore], event_count: usize) -> DetectionOutcome {
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        let mut method_scores = BTreeMap::new();
        let mut flags: Vec<String> = Vec::new();

        for vote in votes {
            let weight = self.config.weights.weight(vote.method);
            weighted += weight * vote.score;
            total_weight += weight;
            method_scores.insert(vote.method.as_str().to_owned(), round4(vote.score));
            for flag in &vote.flags {
                if !flags.iter().any(|f| f == flag) {
                    flags.push((*flag).to_owned());
                }
            }
        }

        let confidence_score =
            if total_weight > f64::EPSILON { round4(weighted / total_weight) } else { 0.0 };
        tracing::debug!(
            confidence_score,
            methods = votes.len(),
            flags = flags.len(),
            "detection votes combined"
        );

        DetectionOutcome {
            is_bot: confidence_score >= self.config.threshold,
            confidence_score,
            risk_level: RiskLevel::from_score(confidence_score),
            method_scores,
            flags,
            event_count,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
