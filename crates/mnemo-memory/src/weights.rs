// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory weighting: recency, repetition, and emphasis, blended per scene.
//!
//! Every function here is pure. Callers pass `now` explicitly and supply the
//! existing points for repetition scoring.

use chrono::{DateTime, Utc};
use mnemo_core::{MemoryPoint, Scene};

/// Emphasis returned when no marker matches.
pub const BASE_EMPHASIS: f64 = 0.2;

/// Bonus for an exclamation or a doubled emphasis word.
pub const EXCLAMATION_BONUS: f64 = 0.05;

/// Emphasis markers and their weights. Matching is case-insensitive.
const EMPHASIS_MARKERS: &[(&str, f64)] = &[
    ("务必", 0.4),
    ("关键", 0.35),
    ("重要", 0.3),
    ("记住", 0.25),
    ("一定要", 0.25),
    ("千万别", 0.25),
    ("must", 0.4),
    ("key", 0.35),
    ("important", 0.3),
    ("remember", 0.25),
    ("never", 0.25),
];

const BONUS_MARKERS: &[&str] = &["！", "!!", "重要重要", "记住记住"];

/// Days after which the slow decay rate applies.
const FAST_DECAY_DAYS: f64 = 3.0;

/// Recency weight for a point last relevant at `at`.
///
/// Decays at `1 / (1 + 0.8·days)` for the first three days and at
/// `1 / (1 + 0.3·days)` afterwards. The slow tail is capped at the value
/// reached on day three so the curve never rises with age; it rejoins the
/// plain tail formula after day eight. Timestamps in the future count as now.
pub fn time_weight(at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - at).num_milliseconds().max(0);
    let days = millis as f64 / 86_400_000.0;
    if days <= FAST_DECAY_DAYS {
        return 1.0 / (1.0 + 0.8 * days);
    }
    let tail = 1.0 / (1.0 + 0.3 * days);
    tail.min(1.0 / (1.0 + 0.8 * FAST_DECAY_DAYS))
}

/// Repetition weight of `text` against previously stored points.
///
/// A point counts as a repeat when one of its keywords occurs in `text` and
/// its summary and `text` contain one another. An empty summary is contained
/// in any text, so a keyword hit alone counts for such points. Points with no
/// usable keywords never count. Result is `1 + 0.2·count`, clamped to `[1, 2]`.
pub fn repeat_weight<'a, I>(text: &str, existing: I) -> f64
where
    I: IntoIterator<Item = &'a MemoryPoint>,
{
    let text = text.trim().to_lowercase();
    if text.is_empty() {
        return 1.0;
    }

    let count = existing
        .into_iter()
        .filter(|point| {
            let keyword_hit = point.keywords.iter().any(|k| {
                let k = k.trim().to_lowercase();
                !k.is_empty() && text.contains(&k)
            });
            if !keyword_hit {
                return false;
            }
            let summary = point.summary.trim().to_lowercase();
            text.contains(&summary) || summary.contains(&text)
        })
        .count();

    (1.0 + 0.2 * count as f64).clamp(1.0, 2.0)
}

/// Emphasis weight: the strongest marker found in `text` (default `0.2`),
/// plus `0.05` for a full-width exclamation, `!!`, or a doubled marker.
pub fn emphasis_weight(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let strongest = EMPHASIS_MARKERS
        .iter()
        .filter(|(marker, _)| lower.contains(marker))
        .map(|(_, weight)| *weight)
        .fold(BASE_EMPHASIS, f64::max);

    if BONUS_MARKERS.iter().any(|m| lower.contains(m)) {
        strongest + EXCLAMATION_BONUS
    } else {
        strongest
    }
}

/// Blend coefficients `(time, emphasis, repeat)` for a scene.
pub fn scene_coefficients(scene: Scene) -> (f64, f64, f64) {
    match scene {
        Scene::Chat => (0.6, 0.25, 0.15),
        Scene::Knowledge => (0.2, 0.4, 0.4),
        Scene::General => (0.4, 0.35, 0.25),
    }
}

/// Scene-dependent weighted sum of the three components.
pub fn total_weight(time: f64, repeat: f64, emphasis: f64, scene: Scene) -> f64 {
    let (time_coeff, emphasis_coeff, repeat_coeff) = scene_coefficients(scene);
    time * time_coeff + emphasis * emphasis_coeff + repeat * repeat_coeff
}
