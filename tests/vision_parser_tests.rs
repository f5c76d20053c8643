// Tests for the labeled-field vision report parser.
//
// Each field is parsed independently with its own fallback: text fields
// default to "Unknown", the confidence score to 0, the stress level to
// LOW. The uneven defaults are intentional and load-bearing.

use serenity_companion::remote::vision::parse_report;
use serenity_companion::remote::StressLevel;

#[test]
fn test_parses_partial_report_with_per_field_defaults() {
    let report = "EMOTION: Sadness\nCONFIDENCE: 72\nCUES: furrowed brow, downturned mouth\nSTRESS: HIGH";

    let profile = parse_report(report);

    assert_eq!(profile.primary_emotion, "Sadness");
    assert_eq!(profile.confidence_score, 72);
    assert_eq!(
        profile.micro_expressions,
        vec!["furrowed brow".to_string(), "downturned mouth".to_string()]
    );
    assert_eq!(profile.stress_level, StressLevel::High);
    assert_eq!(profile.psychological_context, "Unknown");
    assert_eq!(profile.recommended_intervention, "Unknown");
}

#[test]
fn test_parses_complete_report() {
    let report = "EMOTION: Calm\n\
                  CONFIDENCE: 91\n\
                  CUES: relaxed jaw, steady gaze, soft brow\n\
                  ANALYSIS: Settled and present.\n\
                  INTERVENTION: Keep the current routine.\n\
                  STRESS: LOW";

    let profile = parse_report(report);

    assert_eq!(profile.primary_emotion, "Calm");
    assert_eq!(profile.confidence_score, 91);
    assert_eq!(profile.micro_expressions.len(), 3);
    assert_eq!(profile.micro_expressions[2], "soft brow");
    assert_eq!(profile.psychological_context, "Settled and present.");
    assert_eq!(profile.recommended_intervention, "Keep the current routine.");
    assert_eq!(profile.stress_level, StressLevel::Low);
}

#[test]
fn test_empty_report_yields_all_defaults() {
    let profile = parse_report("");

    assert_eq!(profile.primary_emotion, "Unknown");
    assert_eq!(profile.confidence_score, 0);
    assert_eq!(profile.micro_expressions, vec!["Unknown".to_string()]);
    assert_eq!(profile.psychological_context, "Unknown");
    assert_eq!(profile.recommended_intervention, "Unknown");
    assert_eq!(profile.stress_level, StressLevel::Low);
}

#[test]
fn test_malformed_confidence_defaults_to_zero() {
    let profile = parse_report("EMOTION: Joy\nCONFIDENCE: very high\nSTRESS: MEDIUM");

    assert_eq!(profile.primary_emotion, "Joy");
    assert_eq!(profile.confidence_score, 0);
    assert_eq!(profile.stress_level, StressLevel::Medium);
}

#[test]
fn test_unrecognized_stress_defaults_to_low() {
    let profile = parse_report("STRESS: sideways");
    assert_eq!(profile.stress_level, StressLevel::Low);

    let profile = parse_report("STRESS: CRITICAL");
    assert_eq!(profile.stress_level, StressLevel::Critical);
}

#[test]
fn test_field_value_stops_at_end_of_line() {
    let profile = parse_report("EMOTION: Surprise\nCONFIDENCE: 40");

    assert_eq!(profile.primary_emotion, "Surprise");
    assert_eq!(profile.confidence_score, 40);
}

#[test]
fn test_profile_serializes_with_camel_case_fields() {
    let profile = parse_report("EMOTION: Sadness\nSTRESS: HIGH");
    let json = serde_json::to_value(&profile).expect("serializes");

    assert_eq!(json["primaryEmotion"], "Sadness");
    assert_eq!(json["stressLevel"], "HIGH");
    assert_eq!(json["confidenceScore"], 0);
    assert!(json["microExpressions"].is_array());
    assert!(json["recommendedIntervention"].is_string());
}
