//! Classification outcome and the routing decision derived from it.

use serde::{Deserialize, Serialize};

use super::Intent;

/// Default minimum confidence for trusting a classifier label.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Threshold policy applied to every raw classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub min_confidence: f64,
    pub fallback: Intent,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            fallback: Intent::Greeting,
        }
    }
}

impl ConfidencePolicy {
    pub fn new(min_confidence: f64, fallback: Intent) -> Self {
        Self {
            min_confidence,
            fallback,
        }
    }

    /// Turns a parsed prediction into an `IntentResult`.
    ///
    /// `predicted` is `None` when the model's label could not be parsed.
    /// The routed label becomes the fallback when the prediction is missing,
    /// `unknown`, or below the threshold. Confidence is only clamped into
    /// [0, 1], never raised.
    pub fn apply(&self, predicted: Option<Intent>, raw_confidence: f64) -> IntentResult {
        let confidence = if raw_confidence.is_nan() {
            0.0
        } else {
            raw_confidence.clamp(0.0, 1.0)
        };
        let predicted = predicted.unwrap_or(Intent::Unknown);
        let trusted = predicted.is_routable() && confidence >= self.min_confidence;

        IntentResult {
            label: if trusted { predicted } else { self.fallback },
            predicted,
            confidence,
            raw_score: Some(raw_confidence),
            below_threshold: !trusted,
            classification_unavailable: false,
        }
    }

    /// Result used when the classification capability could not answer.
    pub fn unavailable(&self) -> IntentResult {
        IntentResult {
            label: self.fallback,
            predicted: Intent::Unknown,
            confidence: 0.0,
            raw_score: None,
            below_threshold: true,
            classification_unavailable: true,
        }
    }
}

/// Confidence-scored intent for one message. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    /// Label used for routing (the fallback when the prediction was not trusted).
    pub label: Intent,
    /// Label the classifier actually produced.
    pub predicted: Intent,
    /// Confidence in [0, 1], as reported by the classifier.
    pub confidence: f64,
    /// Unclamped score as received, when there was one.
    pub raw_score: Option<f64>,
    /// True when the routed label was forced to the fallback.
    pub below_threshold: bool,
    /// True when the classifier failed and no prediction exists.
    pub classification_unavailable: bool,
}

impl IntentResult {
    /// Rebuilds a trusted result from a cached turn.
    pub fn cached(intent: Intent, confidence: f64) -> Self {
        Self {
            label: intent,
            predicted: intent,
            confidence,
            raw_score: None,
            below_threshold: false,
            classification_unavailable: false,
        }
    }
}

/// Auditable record of how a message was routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub intent: IntentResult,
    pub selected_agent: String,
    pub used_fallback: bool,
}

impl RoutingDecision {
    pub fn new(
        intent: IntentResult,
        selected_agent: impl Into<String>,
        used_fallback: bool,
    ) -> Self {
        Self {
            intent,
            selected_agent: selected_agent.into(),
            used_fallback,
        }
    }

    /// Marks the decision as degraded to the fallback agent after a handler failure.
    pub fn degrade_to(mut self, fallback_agent: impl Into<String>) -> Self {
        self.selected_agent = fallback_agent.into();
        self.used_fallback = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn confident_known_label_is_routed_as_is() {
        let result = ConfidencePolicy::default().apply(Some(Intent::Email), 0.95);

        assert_eq!(result.label, Intent::Email);
        assert_eq!(result.predicted, Intent::Email);
        assert_eq!(result.confidence, 0.95);
        assert!(!result.below_threshold);
    }

    #[test]
    fn threshold_is_inclusive() {
        let result = ConfidencePolicy::default().apply(Some(Intent::Research), 0.6);
        assert_eq!(result.label, Intent::Research);
    }

    #[test]
    fn low_confidence_routes_to_fallback_keeping_confidence() {
        let result = ConfidencePolicy::default().apply(Some(Intent::Email), 0.4);

        assert_eq!(result.label, Intent::Greeting);
        assert_eq!(result.predicted, Intent::Email);
        assert_eq!(result.confidence, 0.4);
        assert!(result.below_threshold);
        assert!(!result.classification_unavailable);
    }

    #[test]
    fn unknown_label_routes_to_fallback_even_when_confident() {
        let result = ConfidencePolicy::default().apply(Some(Intent::Unknown), 0.99);

        assert_eq!(result.label, Intent::Greeting);
        assert_eq!(result.predicted, Intent::Unknown);
        assert_eq!(result.confidence, 0.99);
    }

    #[test]
    fn unparseable_label_is_reported_as_unknown() {
        let result = ConfidencePolicy::default().apply(None, 0.9);

        assert_eq!(result.label, Intent::Greeting);
        assert_eq!(result.predicted, Intent::Unknown);
    }

    #[test]
    fn out_of_range_scores_are_clamped_but_kept_raw() {
        let result = ConfidencePolicy::default().apply(Some(Intent::Database), 1.7);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.raw_score, Some(1.7));

        let result = ConfidencePolicy::default().apply(Some(Intent::Database), -0.2);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn unavailable_result_is_flagged_with_zero_confidence() {
        let policy = ConfidencePolicy::new(0.6, Intent::Research);
        let result = policy.unavailable();

        assert_eq!(result.label, Intent::Research);
        assert_eq!(result.confidence, 0.0);
        assert!(result.classification_unavailable);
        assert_eq!(result.raw_score, None);
    }

    #[test]
    fn degrade_to_marks_fallback() {
        let decision = RoutingDecision::new(
            IntentResult::cached(Intent::Email, 0.9),
            "EmailWriterAgent",
            false,
        )
        .degrade_to("GreetingAgent");

        assert_eq!(decision.selected_agent, "GreetingAgent");
        assert!(decision.used_fallback);
        assert_eq!(decision.intent.label, Intent::Email);
    }

    fn any_intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::Greeting),
            Just(Intent::Research),
            Just(Intent::Email),
            Just(Intent::Database),
            Just(Intent::Celebration),
            Just(Intent::Unknown),
        ]
    }

    proptest! {
        #[test]
        fn routed_label_follows_threshold(
            intent in any_intent(),
            confidence in 0.0f64..=1.0,
            threshold in 0.0f64..=1.0,
        ) {
            let policy = ConfidencePolicy::new(threshold, Intent::Greeting);
            let result = policy.apply(Some(intent), confidence);

            prop_assert_eq!(result.confidence, confidence);
            if intent.is_routable() && confidence >= threshold {
                prop_assert_eq!(result.label, intent);
            } else {
                prop_assert_eq!(result.label, Intent::Greeting);
            }
        }
    }
}
