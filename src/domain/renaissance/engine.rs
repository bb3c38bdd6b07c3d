//! The Renaissance decision engine.
//!
//! `analyze` is a pure function over a bounded recent-event window: no I/O,
//! no persistence, fully deterministic. The window is sorted internally by
//! `(timestamp, event_id)` so the order events were supplied in never
//! affects the output. All reference-time arithmetic uses the caller-given
//! `as_of` instant, never the wall clock.

use crate::domain::events::{
    DecodeOutcome, EventPayload, SchemaRegistry, MIN_SCORE,
};
use crate::domain::foundation::{EventEnvelope, Timestamp};

use super::analysis::{
    AnalysisDetails, Cadence, ConfidenceSignal, KeywordSignal, MoodSignal, RenaissanceAnalysis,
    TemporalSignal, TrendLabel,
};
use super::lexicon::{scan_for_distress, DISTRESS_LEXICON};
use super::settings::DecisionSettings;

/// Weight of the latest sample in a mood/confidence distress score; the
/// remainder goes to the window mean. A window that ends low scores above
/// a flat window with the same mean, and lowering any sample can never
/// lower the score.
const LATEST_SAMPLE_WEIGHT: f64 = 0.3;

/// Temporal base scores per cadence, plus the silence bonus.
const CADENCE_DECLINING_SCORE: f64 = 0.6;
const CADENCE_STABLE_SCORE: f64 = 0.2;
const CADENCE_INCREASING_SCORE: f64 = 0.0;
const SILENCE_BONUS: f64 = 0.4;

/// Pure decision engine over a recent event window.
pub struct RenaissanceEngine {
    registry: SchemaRegistry,
    settings: DecisionSettings,
}

impl RenaissanceEngine {
    /// Creates an engine with the given settings and the default schema
    /// registry.
    pub fn new(settings: DecisionSettings) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &DecisionSettings {
        &self.settings
    }

    /// Analyzes a recent event window and decides whether an intervention
    /// should fire.
    ///
    /// `as_of` is the reference instant for the temporal sub-analysis
    /// (typically "now" at the call site; passed in to keep the function
    /// pure). Fewer than `min_events` decodable events yields the neutral
    /// insufficient-data result; this function never fails.
    pub fn analyze(&self, events: &[EventEnvelope], as_of: Timestamp) -> RenaissanceAnalysis {
        let mut decoded: Vec<(&EventEnvelope, EventPayload)> = events
            .iter()
            .filter_map(|envelope| match self.registry.decode(envelope) {
                Ok(DecodeOutcome::Decoded(payload)) => Some((envelope, payload)),
                // Unknown types and malformed payloads don't contribute.
                Ok(DecodeOutcome::Unknown) | Err(_) => None,
            })
            .collect();

        if decoded.len() < self.settings.min_events {
            return RenaissanceAnalysis::insufficient_data();
        }

        decoded.sort_by(|(a, _), (b, _)| a.ordering_key().cmp(&b.ordering_key()));

        let mood_series: Vec<f64> = decoded
            .iter()
            .filter_map(|(_, payload)| match payload {
                EventPayload::MoodLogged(p) => Some(p.score),
                _ => None,
            })
            .collect();

        let confidence_series: Vec<f64> = decoded
            .iter()
            .filter_map(|(_, payload)| match payload {
                EventPayload::MoodLogged(p) => p.confidence,
                EventPayload::ConfidenceScoreLogged(p) => Some(p.score),
                _ => None,
            })
            .collect();

        let notes: Vec<&str> = decoded
            .iter()
            .filter_map(|(_, payload)| payload.notes())
            .collect();

        let timestamps: Vec<Timestamp> = decoded.iter().map(|(e, _)| e.timestamp).collect();

        let mood = self.score_series(&mood_series, self.settings.mood_threshold);
        let confidence = self.score_series(&confidence_series, self.settings.confidence_threshold);
        let keyword = self.scan_keywords(&notes);
        let temporal = self.temporal_pattern(&timestamps, as_of);

        let weights = &self.settings.weights;
        let contributions = [
            ("mood", weights.mood * mood.as_ref().map_or(0.0, |s| s.score)),
            (
                "confidence",
                weights.confidence * confidence.as_ref().map_or(0.0, |s| s.score),
            ),
            ("keyword", weights.keyword * keyword.score),
            ("temporal", weights.temporal * temporal.score),
        ];

        let confidence_level: f64 = contributions
            .iter()
            .map(|(_, c)| c)
            .sum::<f64>()
            .clamp(0.0, 1.0);

        // Highest weighted contribution wins; ties resolve in the fixed
        // order above so output stays deterministic.
        let dominant_signal = contributions
            .iter()
            .filter(|(_, c)| *c > 0.0)
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| (*name).to_string());

        let should_trigger = confidence_level >= self.settings.trigger_threshold;
        let recommendations =
            self.recommendations(mood.as_ref(), confidence.as_ref(), &keyword, &temporal);

        let mood_signal = mood.map(|s| MoodSignal {
            mean: s.mean,
            min: s.min,
            max: s.max,
            below_threshold: s.below_threshold,
            trend: s.trend,
            score: s.score,
        });
        let confidence_signal = confidence.map(|s| ConfidenceSignal {
            mean: s.mean,
            min: s.min,
            max: s.max,
            below_threshold: s.below_threshold,
            trend: s.trend,
            score: s.score,
        });

        RenaissanceAnalysis {
            should_trigger,
            confidence_level,
            analysis_details: AnalysisDetails {
                error: None,
                mood: mood_signal,
                confidence: confidence_signal,
                keyword: Some(keyword),
                temporal: Some(temporal),
                dominant_signal,
            },
            recommendations,
        }
    }

    /// Scores one mood/confidence series. `None` when the series is empty.
    fn score_series(&self, series: &[f64], threshold: f64) -> Option<ScoredSeries> {
        if series.is_empty() {
            return None;
        }

        let mean = series.iter().sum::<f64>() / series.len() as f64;
        let min = series.iter().copied().fold(f64::INFINITY, f64::min);
        let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let below_threshold = mean < threshold;

        let trend = if series.len() < 2 {
            TrendLabel::Stable
        } else {
            let diff = series[series.len() - 1] - series[0];
            if diff < -self.settings.trend_dead_band {
                TrendLabel::Declining
            } else if diff > self.settings.trend_dead_band {
                TrendLabel::Improving
            } else {
                TrendLabel::Stable
            }
        };

        // Each deficit grows linearly from 0 at the threshold to 1 at the
        // scale floor. Blending the mean with the latest sample keeps the
        // score non-increasing in every sample; the dead band above only
        // affects the reported trend label, never the score.
        let deficit = |value: f64| ((threshold - value) / (threshold - MIN_SCORE)).clamp(0.0, 1.0);
        let latest = series[series.len() - 1];
        let score =
            (1.0 - LATEST_SAMPLE_WEIGHT) * deficit(mean) + LATEST_SAMPLE_WEIGHT * deficit(latest);

        Some(ScoredSeries {
            mean,
            min,
            max,
            below_threshold,
            trend,
            score,
        })
    }

    fn scan_keywords(&self, notes: &[&str]) -> KeywordSignal {
        let mut hit_count = 0u32;
        let mut matched: Vec<&'static str> = Vec::new();

        for note in notes {
            let (hits, terms) = scan_for_distress(note);
            hit_count += hits;
            for term in terms {
                if !matched.contains(&term) {
                    matched.push(term);
                }
            }
        }
        // Report in lexicon order regardless of which note matched first.
        matched.sort_unstable_by_key(|term| {
            DISTRESS_LEXICON.iter().position(|t| t == term).unwrap_or(usize::MAX)
        });
        let matched_terms: Vec<String> = matched.into_iter().map(str::to_string).collect();

        let above_threshold = hit_count >= self.settings.keyword_threshold;
        let score = (f64::from(hit_count) / (2.0 * f64::from(self.settings.keyword_threshold)))
            .clamp(0.0, 1.0);

        KeywordSignal {
            hit_count,
            matched_terms,
            above_threshold,
            score,
        }
    }

    fn temporal_pattern(&self, timestamps: &[Timestamp], as_of: Timestamp) -> TemporalSignal {
        let latest = timestamps.last().copied().unwrap_or(as_of);
        let days_since_last_event = as_of.duration_since(&latest).num_days().max(0);
        let prolonged_silence = days_since_last_event > self.settings.silence_days;

        let cadence = cadence_from_gaps(timestamps);

        let base = match cadence {
            Cadence::Declining => CADENCE_DECLINING_SCORE,
            Cadence::Stable => CADENCE_STABLE_SCORE,
            Cadence::Increasing => CADENCE_INCREASING_SCORE,
        };
        let score = (base + if prolonged_silence { SILENCE_BONUS } else { 0.0 }).clamp(0.0, 1.0);

        TemporalSignal {
            days_since_last_event,
            cadence,
            prolonged_silence,
            score,
        }
    }

    fn recommendations(
        &self,
        mood: Option<&ScoredSeries>,
        confidence: Option<&ScoredSeries>,
        keyword: &KeywordSignal,
        temporal: &TemporalSignal,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if mood.is_some_and(|s| s.below_threshold) {
            recommendations
                .push("Plan one small, achievable win for tomorrow and write down how it felt.".to_string());
        }
        if mood.is_some_and(|s| s.trend == TrendLabel::Declining) {
            recommendations
                .push("Mood has been trending down; schedule a check-in with your coach this week.".to_string());
        }
        if confidence.is_some_and(|s| s.below_threshold) {
            recommendations
                .push("Revisit a recent accomplishment and note what made it work.".to_string());
        }
        if confidence.is_some_and(|s| s.trend == TrendLabel::Declining) {
            recommendations
                .push("Break your current goal into smaller steps to rebuild momentum.".to_string());
        }
        if keyword.above_threshold {
            recommendations.push(
                "Your notes suggest significant distress; a guided reflection session is recommended."
                    .to_string(),
            );
        }
        if temporal.prolonged_silence {
            recommendations.push(
                "It has been a while since your last activity; restart with a five-minute journal entry."
                    .to_string(),
            );
        }
        if temporal.cadence == Cadence::Declining {
            recommendations.push(
                "Engagement is tapering off; set a recurring reminder for a quick daily log.".to_string(),
            );
        }

        recommendations.truncate(self.settings.max_recommendations);
        recommendations
    }
}

impl Default for RenaissanceEngine {
    fn default() -> Self {
        Self::new(DecisionSettings::default())
    }
}

/// Internal scored series shared by the mood and confidence signals.
struct ScoredSeries {
    mean: f64,
    min: f64,
    max: f64,
    below_threshold: bool,
    trend: TrendLabel,
    score: f64,
}

/// Classifies cadence by comparing the average inter-event gap of the
/// second half of the window against the first half.
fn cadence_from_gaps(timestamps: &[Timestamp]) -> Cadence {
    if timestamps.len() < 3 {
        return Cadence::Stable;
    }

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|pair| pair[1].duration_since(&pair[0]).num_seconds().max(0) as f64)
        .collect();

    let mid = gaps.len() / 2;
    let first_half = &gaps[..mid.max(1)];
    let second_half = &gaps[mid..];

    let first_avg = first_half.iter().sum::<f64>() / first_half.len() as f64;
    let second_avg = second_half.iter().sum::<f64>() / second_half.len() as f64;

    if first_avg == 0.0 {
        return Cadence::Stable;
    }

    let ratio = second_avg / first_avg;
    if ratio > 1.25 {
        // Gaps are growing: the user is engaging less often.
        Cadence::Declining
    } else if ratio < 0.8 {
        Cadence::Increasing
    } else {
        Cadence::Stable
    }
}
