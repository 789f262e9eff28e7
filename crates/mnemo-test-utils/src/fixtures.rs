// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned memory points and conversation logs.

use chrono::{DateTime, Duration, Utc};

use mnemo_core::{ConversationLog, LogMessage, MemoryPoint};

/// A point with a neutral total weight of `1.0`.
pub fn point(keywords: &[&str], content: &str, summary: &str) -> MemoryPoint {
    let mut p = MemoryPoint::new(keywords.iter().copied(), content, summary);
    p.time_weight = 1.0;
    p.repeat_weight = 1.0;
    p.emphasis_weight = 0.2;
    p.total_weight = 1.0;
    p
}

/// The "Go developer" point used by recall tests.
pub fn go_developer() -> MemoryPoint {
    point(&["go", "programming"], "user is a Go developer", "likes Go")
}

/// A point created `days` ago with the given total weight.
pub fn aged_point(keywords: &[&str], content: &str, days: i64, total_weight: f64) -> MemoryPoint {
    let at = Utc::now() - Duration::days(days);
    let mut p = point(keywords, content, content);
    p.total_weight = total_weight;
    p.created_at = Some(at);
    p.updated_at = Some(at);
    p
}

/// A conversation of alternating user/assistant turns ending at `end`.
pub fn conversation(
    id: &str,
    turns: &[(&str, &str)],
    end: DateTime<Utc>,
    topic: Option<&str>,
) -> ConversationLog {
    let start = end - Duration::minutes(turns.len() as i64);
    let messages = turns
        .iter()
        .enumerate()
        .map(|(i, (sender, content))| LogMessage {
            sender: (*sender).to_string(),
            content: (*content).to_string(),
            timestamp: start + Duration::minutes(i as i64),
        })
        .collect();
    ConversationLog {
        id: id.to_string(),
        messages,
        start_time: start,
        end_time: end,
        topic: topic.map(str::to_string),
    }
}

/// Two weather conversations followed by two food conversations.
pub fn weather_and_food_logs() -> Vec<ConversationLog> {
    let now = Utc::now();
    vec![
        conversation(
            "weather-1",
            &[
                ("user", "will it rain tomorrow"),
                ("assistant", "the forecast says rain, take an umbrella"),
            ],
            now,
            None,
        ),
        conversation(
            "food-1",
            &[
                ("user", "what should I cook for dinner"),
                ("assistant", "pasta is a quick dinner recipe"),
            ],
            now,
            None,
        ),
        conversation(
            "weather-2",
            &[
                ("user", "is it cold and snow outside"),
                ("assistant", "the temperature is low, snow and cold weather"),
            ],
            now,
            None,
        ),
        conversation(
            "food-2",
            &[
                ("user", "recommend a pizza restaurant for lunch"),
                ("assistant", "that restaurant has good pizza and noodles"),
            ],
            now,
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_spans_its_turns() {
        let end = Utc::now();
        let log = conversation("c", &[("user", "a"), ("assistant", "b")], end, Some("t"));
        assert_eq!(log.messages.len(), 2);
        assert_eq!(log.end_time, end);
        assert!(log.start_time < log.end_time);
        assert_eq!(log.topic.as_deref(), Some("t"));
    }

    #[test]
    fn aged_point_is_backdated() {
        let p = aged_point(&["x"], "old", 40, 0.05);
        assert!(Utc::now() - p.created_at.unwrap() >= Duration::days(40));
        assert_eq!(p.total_weight, 0.05);
    }
}
