//! Wire types exchanged with the analysis service.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TransportError;

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub text: String,
}

/// A classification as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResult {
    /// The winning emotion label, e.g. `"happy"`.
    pub emotion: String,
    /// Confidence in `emotion`, in `[0, 1]`.
    pub confidence: f64,
    /// Per-label scores in the order the service sent them.
    pub scores: Scores,
}

impl AnalysisResult {
    /// Decode and range-check a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, TransportError> {
        let result: AnalysisResult =
            serde_json::from_slice(body).map_err(|e| TransportError::Parse(e.to_string()))?;
        result.check()?;
        Ok(result)
    }

    fn check(&self) -> Result<(), TransportError> {
        if !is_unit(self.confidence) {
            return Err(TransportError::Parse(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            )));
        }
        if let Some((label, value)) = self.scores.iter().find(|(_, v)| !is_unit(*v)) {
            return Err(TransportError::Parse(format!(
                "score for {label:?} ({value}) is outside [0, 1]"
            )));
        }
        Ok(())
    }
}

fn is_unit(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Emotion scores, kept in the order they appeared in the JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scores(Vec<(String, f64)>);

impl Scores {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(label, value)| (label.as_str(), *value))
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.iter().find(|(l, _)| *l == label).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, f64)> for Scores {
    fn from_iter<I: IntoIterator<Item = (L, f64)>>(iter: I) -> Self {
        Scores(iter.into_iter().map(|(l, v)| (l.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for Scores {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoresVisitor;

        impl<'de> Visitor<'de> for ScoresVisitor {
            type Value = Scores;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of emotion labels to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Scores, A::Error> {
                let mut entries: Vec<(String, f64)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(5));
                while let Some((label, value)) = map.next_entry::<String, f64>()? {
                    // A repeated key overwrites in place, like a JSON object lookup.
                    match entries.iter_mut().find(|(l, _)| *l == label) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((label, value)),
                    }
                }
                Ok(Scores(entries))
            }
        }

        deserializer.deserialize_map(ScoresVisitor)
    }
}

/// Reply to `GET /` on the service root.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// What the footer says about the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendStatus {
    /// Not checked yet.
    #[default]
    Unknown,
    Online { version: Option<String> },
    Offline,
}

impl BackendStatus {
    pub fn label(&self) -> String {
        match self {
            BackendStatus::Unknown => "backend: checking".to_string(),
            BackendStatus::Online { version: Some(v) } => format!("backend: online v{v}"),
            BackendStatus::Online { version: None } => "backend: online".to_string(),
            BackendStatus::Offline => "backend: offline".to_string(),
        }
    }
}

impl From<HealthReport> for BackendStatus {
    fn from(report: HealthReport) -> Self {
        if report.status == "running" {
            BackendStatus::Online {
                version: report.version,
            }
        } else {
            BackendStatus::Offline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{"emotion":"happy","confidence":0.87,
        "scores":{"happy":0.87,"sad":0.02,"angry":0.01,"neutral":0.05,"surprise":0.05}}"#;

    #[test]
    fn decodes_a_well_formed_body() {
        let result = AnalysisResult::from_json(BODY.as_bytes()).unwrap();
        assert_eq!(result.emotion, "happy");
        assert_eq!(result.confidence, 0.87);
        assert_eq!(result.scores.get("neutral"), Some(0.05));
        assert_eq!(result.scores.len(), 5);
    }

    #[test]
    fn scores_keep_wire_order() {
        let body = r#"{"emotion":"sad","confidence":0.6,
            "scores":{"surprise":0.1,"sad":0.6,"angry":0.3}}"#;
        let result = AnalysisResult::from_json(body.as_bytes()).unwrap();
        let labels: Vec<&str> = result.scores.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["surprise", "sad", "angry"]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let body = r#"{"emotion":"neutral","confidence":1.0,"scores":{},"model":"v2"}"#;
        let result = AnalysisResult::from_json(body.as_bytes()).unwrap();
        assert!(result.scores.is_empty());
    }

    #[test]
    fn missing_field_is_a_parse_error() {
        let err = AnalysisResult::from_json(br#"{"emotion":"happy","confidence":0.5}"#).unwrap_err();
        assert!(matches!(err, TransportError::Parse(ref m) if m.contains("scores")), "{err:?}");
    }

    #[test]
    fn wrong_type_and_garbage_are_parse_errors() {
        let wrong = br#"{"emotion":"happy","confidence":"high","scores":{}}"#;
        assert!(matches!(
            AnalysisResult::from_json(wrong),
            Err(TransportError::Parse(_))
        ));
        assert!(matches!(
            AnalysisResult::from_json(b"<html>oops</html>"),
            Err(TransportError::Parse(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let high = br#"{"emotion":"happy","confidence":1.5,"scores":{}}"#;
        assert!(matches!(
            AnalysisResult::from_json(high),
            Err(TransportError::Parse(ref m)) if m.contains("confidence")
        ));
        let negative = br#"{"emotion":"happy","confidence":0.5,"scores":{"sad":-0.1}}"#;
        assert!(matches!(
            AnalysisResult::from_json(negative),
            Err(TransportError::Parse(ref m)) if m.contains("sad")
        ));
    }

    #[test]
    fn request_serializes_as_text_object() {
        let body = serde_json::to_string(&AnalysisRequest {
            text: " hi there ".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"text":" hi there "}"#);
    }

    #[test]
    fn health_report_maps_to_status() {
        let report: HealthReport = serde_json::from_str(
            r#"{"status":"running","message":"BHAVNA Emotion Analysis API","version":"1.0.0"}"#,
        )
        .unwrap();
        let status = BackendStatus::from(report);
        assert_eq!(
            status,
            BackendStatus::Online {
                version: Some("1.0.0".into())
            }
        );
        assert_eq!(status.label(), "backend: online v1.0.0");

        let down: HealthReport = serde_json::from_str(r#"{"status":"degraded"}"#).unwrap();
        assert_eq!(BackendStatus::from(down), BackendStatus::Offline);
    }
}
