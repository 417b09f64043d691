//! In-process counters rendered in Prometheus text exposition format.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    pub sessions_created: AtomicU64,
    pub events_ingested: AtomicU64,
    pub analyses: AtomicU64,
    pub bots_detected: AtomicU64,
    pub text_analyses: AtomicU64,
    pub text_analysis_failures: AtomicU64,
    pub http_errors: AtomicU64,
}

impl Metrics {
    pub fn inc(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Render every counter plus `survey_guard_build_info`.
    #[must_use]
    pub fn render(&self) -> String {
        let counters = [
            ("sessions_created_total", "Sessions created.", &self.sessions_created),
            ("events_ingested_total", "Behavioral events accepted.", &self.events_ingested),
            ("analyses_total", "Detection runs completed.", &self.analyses),
            ("bots_detected_total", "Detection runs that returned is_bot.", &self.bots_detected),
            ("text_analyses_total", "Free-text responses analyzed.", &self.text_analyses),
            (
                "text_analysis_failures_total",
                "Text analyses with at least one failed check.",
                &self.text_analysis_failures,
            ),
            ("http_errors_total", "Responses with a 4xx or 5xx status.", &self.http_errors),
        ];

        let mut body = String::new();
        for (name, help, value) in counters {
            let _ = writeln!(body, "# HELP survey_guard_{name} {help}");
            let _ = writeln!(body, "# TYPE survey_guard_{name} counter");
            let _ = writeln!(body, "survey_guard_{name} {}", value.load(Ordering::Relaxed));
        }
        let _ = writeln!(body, "# HELP survey_guard_build_info Build metadata.");
        let _ = writeln!(body, "# TYPE survey_guard_build_info gauge");
        let _ = writeln!(
            body,
            "survey_guard_build_info{{version=\"{}\"}} 1",
            env!("CARGO_PKG_VERSION")
        );
        body
    }
}
