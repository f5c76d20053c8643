use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stress level reported by the vision analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StressLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl StressLevel {
    fn from_report(value: &str) -> Self {
        match value.trim() {
            "LOW" => StressLevel::Low,
            "MEDIUM" => StressLevel::Medium,
            "HIGH" => StressLevel::High,
            "CRITICAL" => StressLevel::Critical,
            _ => StressLevel::Low,
        }
    }
}

/// Structured result of a single-shot emotion scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiometricProfile {
    pub primary_emotion: String,
    pub confidence_score: u32,
    pub micro_expressions: Vec<String>,
    pub psychological_context: String,
    pub recommended_intervention: String,
    pub stress_level: StressLevel,
    pub timestamp: String,
}

/// Parse the labeled-field analysis report.
///
/// Each field is extracted independently and falls back on its own
/// default when absent or malformed: text fields to "Unknown", the
/// confidence score to 0, the stress level to LOW. The uneven defaults
/// are deliberate; downstream display code relies on them.
pub fn parse_report(text: &str) -> BiometricProfile {
    let confidence_raw = labeled_field(text, "CONFIDENCE");

    BiometricProfile {
        primary_emotion: labeled_field(text, "EMOTION"),
        confidence_score: leading_number(&confidence_raw),
        micro_expressions: labeled_field(text, "CUES")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        psychological_context: labeled_field(text, "ANALYSIS"),
        recommended_intervention: labeled_field(text, "INTERVENTION"),
        stress_level: StressLevel::from_report(&labeled_field(text, "STRESS")),
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// First `KEY: value` occurrence in the report, "Unknown" when missing.
fn labeled_field(text: &str, key: &str) -> String {
    Regex::new(&format!(r"{}:[ \t]*(.*)", key))
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Integer prefix of the value, 0 when there is none.
fn leading_number(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().unwrap_or(0)
}
