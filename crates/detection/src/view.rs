//! Time-ordered projection of a session's events, split by kind.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use survey_guard_core::{BehaviorEvent, DeviceData, EventData, KeyAction, MousePoint};

/// Total order over events: timestamp, then event type, then payload.
/// Ties on timestamp therefore never depend on submission order.
#[derive(Debug)]
struct OrderKey {
    timestamp: DateTime<Utc>,
    kind: &'static str,
    numbers: Vec<f64>,
    text: String,
}

impl OrderKey {
    fn of(event: &BehaviorEvent) -> Self {
        let flag = |b: bool| f64::from(u8::from(b));
        let opt = |v: Option<f64>| v.unwrap_or(f64::NEG_INFINITY);
        let (numbers, text) = match &event.data {
            EventData::Keystroke(k) => (
                vec![opt(k.key_code.map(f64::from)), flag(k.action == KeyAction::Up)],
                k.key.clone().unwrap_or_default(),
            ),
            EventData::MouseMove(p) => (vec![p.x, p.y], String::new()),
            EventData::MouseClick(c) => {
                (vec![c.x, c.y, opt(c.button.map(f64::from))], String::new())
            },
            EventData::Scroll(s) => (vec![s.delta_y, opt(s.scroll_y)], String::new()),
            EventData::Focus(f) => (vec![flag(f.focused)], String::new()),
            EventData::Paste(p) => (vec![f64::from(p.length)], String::new()),
            EventData::Device(d) => (
                vec![
                    flag(d.webdriver),
                    opt(d.screen_width.map(f64::from)),
                    opt(d.screen_height.map(f64::from)),
                    flag(d.touch),
                ],
                String::new(),
            ),
            EventData::QuestionAnswered(q) => (vec![q.duration_ms as f64], q.question_id.clone()),
        };
        Self { timestamp: event.timestamp, kind: event.data.event_type().as_str(), numbers, text }
    }
}

impl PartialEq for OrderKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for OrderKey {}

impl Ord for OrderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.kind.cmp(other.kind))
            .then_with(|| {
                self.numbers
                    .iter()
                    .zip(&other.numbers)
                    .map(|(a, b)| a.total_cmp(b))
                    .find(|o| o.is_ne())
                    .unwrap_or_else(|| self.numbers.len().cmp(&other.numbers.len()))
            })
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for OrderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub(crate) struct EventView {
    /// Every event timestamp in milliseconds, ascending.
    pub all_ms: Vec<i64>,
    pub key_downs_ms: Vec<i64>,
    pub key_ups: usize,
    pub moves: Vec<(i64, MousePoint)>,
    pub clicks: usize,
    pub scrolls: Vec<(i64, f64)>,
    pub pasted_chars: u64,
    pub paste_count: usize,
    pub devices: Vec<DeviceData>,
    pub question_durations_ms: Vec<f64>,
}

impl EventView {
    pub(crate) fn build(events: &[BehaviorEvent]) -> Self {
        let mut ordered: Vec<&BehaviorEvent> = events.iter().collect();
        ordered.sort_by_cached_key(|e| OrderKey::of(e));

        let mut view = Self::default();
        for event in ordered {
            let ts = event.timestamp.timestamp_millis();
            view.all_ms.push(ts);
            match &event.data {
                EventData::Keystroke(k) => match k.action {
                    KeyAction::Down => view.key_downs_ms.push(ts),
                    KeyAction::Up => view.key_ups += 1,
                },
                EventData::MouseMove(p) => view.moves.push((ts, *p)),
                EventData::MouseClick(_) => view.clicks += 1,
                EventData::Scroll(s) => view.scrolls.push((ts, s.delta_y)),
                EventData::Paste(p) => {
                    view.paste_count += 1;
                    view.pasted_chars += u64::from(p.length);
                },
                EventData::Device(d) => view.devices.push(*d),
                EventData::QuestionAnswered(q) => {
                    view.question_durations_ms.push(q.duration_ms as f64);
                },
                EventData::Focus(_) => {},
            }
        }
        view
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.all_ms.is_empty()
    }

    /// Milliseconds between the first and last event.
    pub(crate) fn span_ms(&self) -> i64 {
        match (self.all_ms.first(), self.all_ms.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        }
    }

    pub(crate) fn keystroke_count(&self) -> usize {
        self.key_downs_ms.len()
    }
}
