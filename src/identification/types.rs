use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Coarse quality signal returned by the recogniser for each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    #[default]
    Low,
}

impl ConfidenceTier {
    /// Lenient parse; anything unrecognised counts as `Low`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => ConfidenceTier::High,
            "medium" => ConfidenceTier::Medium,
            _ => ConfidenceTier::Low,
        }
    }

    /// High and medium results end the scan.
    pub fn is_conclusive(self) -> bool {
        matches!(self, ConfidenceTier::High | ConfidenceTier::Medium)
    }

    /// Progress shown to the user; feedback only.
    pub fn progress_percent(self) -> u8 {
        match self {
            ConfidenceTier::Low => 40,
            ConfidenceTier::Medium => 70,
            ConfidenceTier::High => 100,
        }
    }
}

impl<'de> Deserialize<'de> for ConfidenceTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(ConfidenceTier::from_label)
            .unwrap_or_default())
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// Medication identification returned by the scan service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub scan_id: Option<String>,
    pub medication_name: String,
    pub generic_name: Option<String>,
    pub brand_name: Option<String>,
    pub dosage: Option<String>,
    pub form: Option<String>,
    pub category: Option<String>,
    pub active_ingredient: Option<String>,
    pub indications: Option<String>,
    pub contraindications: Option<String>,
    pub side_effects: Option<String>,
    pub dosage_instructions: Option<String>,
    pub precautions: Option<String>,
    pub interactions: Option<String>,
    pub storage: Option<String>,
    pub manufacturer: Option<String>,
    pub packaging_language: Option<String>,
    pub image_url: Option<String>,
    pub confidence: ConfidenceTier,
    /// Offset-less timestamps are read as UTC; anything unparseable is
    /// dropped rather than failing the payload.
    #[serde(deserialize_with = "lenient_timestamp")]
    pub scanned_at: Option<DateTime<Utc>>,
}

/// Parses RFC 3339, falling back to a naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => parse_timestamp(&text),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_response() {
        let body = r#"{
            "scan_id": "3f1c",
            "medication_name": "Doliprane",
            "generic_name": "Paracetamol",
            "dosage": "500 mg",
            "category": "antidouleur",
            "packaging_language": "fr",
            "confidence": "High",
            "scanned_at": "2026-03-01T10:00:00Z",
            "unexpected": 3
        }"#;
        let identification: Identification = serde_json::from_str(body).unwrap();
        assert_eq!(identification.medication_name, "Doliprane");
        assert_eq!(identification.confidence, ConfidenceTier::High);
        assert_eq!(identification.dosage.as_deref(), Some("500 mg"));
        assert!(identification.scanned_at.is_some());
    }

    #[test]
    fn naive_service_timestamp_is_utc() {
        let body = r#"{
            "scan_id": "9a0e",
            "medication_name": "Spasfon",
            "category": "antispasmodique",
            "packaging_language": "fr",
            "confidence": "high",
            "scanned_at": "2026-03-01T10:00:00.123456"
        }"#;
        let identification: Identification = serde_json::from_str(body).unwrap();
        assert_eq!(identification.confidence, ConfidenceTier::High);
        let scanned_at = identification.scanned_at.unwrap();
        assert_eq!(
            scanned_at.to_rfc3339(),
            "2026-03-01T10:00:00.123456+00:00"
        );
    }

    #[test]
    fn odd_timestamps_do_not_reject_the_payload() {
        for raw in [r#""yesterday""#, "1740823200", "null", r#""2026-03-01 10:00:00""#] {
            let body = format!(r#"{{"medication_name":"X","confidence":"medium","scanned_at":{}}}"#, raw);
            let identification: Identification = serde_json::from_str(&body)
                .unwrap_or_else(|e| panic!("{} rejected: {}", raw, e));
            assert_eq!(identification.confidence, ConfidenceTier::Medium);
        }
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2026-03-01 10:00:00").is_some());
        assert_eq!(
            parse_timestamp("2026-03-01T12:00:00+02:00"),
            parse_timestamp("2026-03-01T10:00:00")
        );
    }

    #[test]
    fn missing_or_unknown_confidence_is_low() {
        let missing: Identification = serde_json::from_str(r#"{"medication_name":"X"}"#).unwrap();
        assert_eq!(missing.confidence, ConfidenceTier::Low);

        let null: Identification = serde_json::from_str(r#"{"confidence":null}"#).unwrap();
        assert_eq!(null.confidence, ConfidenceTier::Low);

        let odd: Identification = serde_json::from_str(r#"{"confidence":"certain"}"#).unwrap();
        assert_eq!(odd.confidence, ConfidenceTier::Low);
    }

    #[test]
    fn tiers_map_to_progress() {
        assert_eq!(ConfidenceTier::Low.progress_percent(), 40);
        assert_eq!(ConfidenceTier::Medium.progress_percent(), 70);
        assert_eq!(ConfidenceTier::High.progress_percent(), 100);
        assert!(!ConfidenceTier::Low.is_conclusive());
        assert!(ConfidenceTier::Medium.is_conclusive());
    }
}
