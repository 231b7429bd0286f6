use darshan_core::{EmbedTarget, RawMessage, TeachingDetail, Verdict};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;

/// A line of a replay script.
///
/// Most lines are messages as the page would receive them. The others drive the page the way a
/// viewer would.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReplayLine {
    Message { origin: String, data: Value },
    Select { select: usize },
    Time { time: f64 },
}

impl ReplayLine {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        match serde_json::from_str(line) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping unreadable line ({}): {}", e, line);
                None
            }
        }
    }

    /// Feeds the line to the page and returns the resulting verdict.
    pub fn apply<E>(self, detail: &mut TeachingDetail<E>) -> Verdict
    where
        E: EmbedTarget,
    {
        match self {
            ReplayLine::Message { origin, data } => {
                let message = match data {
                    Value::String(text) => RawMessage::text(origin, text),
                    other => RawMessage::json(origin, other),
                };

                detail.receive(message)
            }
            ReplayLine::Select { select } => {
                if let Err(e) = detail.select_source(select) {
                    warn!("{}", e);
                }

                detail.verdict()
            }
            ReplayLine::Time { time } => detail.on_time_update(time),
        }
    }
}

/// Replays every line and logs how the verdict changes. Returns the final verdict.
pub fn replay<E, I>(detail: &mut TeachingDetail<E>, lines: I) -> Verdict
where
    E: EmbedTarget,
    I: IntoIterator<Item = String>,
{
    let mut last = detail.verdict();

    for line in lines {
        let Some(parsed) = ReplayLine::parse(&line) else {
            continue;
        };

        let verdict = parsed.apply(detail);

        if verdict != last {
            info!(
                "Verdict is now {:?} after {:.1}s watched",
                verdict,
                detail.elapsed()
            );
        }

        last = verdict;
    }

    last
}
