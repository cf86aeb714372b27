//! Terminal table rendering.
//!
//! - History: one row per scan, newest first
//! - Record detail: labelled fields
//! - Classification: risk, confidence and every condition by probability

use crate::classify::Classification;
use crate::history::ScanRecord;
use crate::util::{format_percent, format_timestamp};

pub fn render_history(records: &[ScanRecord]) -> String {
    if records.is_empty() {
        return String::from("No scans recorded yet.\n");
    }

    let mut output = String::new();

    output.push_str(&format!(
        "{:<36}  {:<19}  {:<8}  {:<30}  {:>5}\n",
        "ID", "Date", "Risk", "Condition", "Conf"
    ));
    output.push_str(&"-".repeat(106));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{:<36}  {:<19}  {:<8}  {:<30}  {:>5}\n",
            record.id,
            format_timestamp(&record.created_at),
            record.overall_risk.as_str(),
            truncate(&record.main_condition, 30),
            format_percent(record.confidence)
        ));
    }

    output.push_str(&format!("\n{} scan(s)\n", records.len()));
    output
}

pub fn render_record(record: &ScanRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("id:         {}\n", record.id));
    output.push_str(&format!("date:       {}\n", format_timestamp(&record.created_at)));
    output.push_str(&format!("risk:       {}\n", record.overall_risk));
    output.push_str(&format!("condition:  {}\n", record.main_condition));
    output.push_str(&format!("confidence: {}\n", format_percent(record.confidence)));
    output.push_str(&format!("image:      {}\n", record.image_uri));

    output
}

pub fn render_classification(classification: &Classification) -> String {
    let mut output = String::new();

    output.push_str(&format!("Overall risk: {}\n", classification.overall_risk));
    output.push_str(&format!("Confidence:   {}\n", format_percent(classification.confidence)));
    output.push_str(&format!("Top finding:  {}\n\n", classification.predicted.name));

    for condition in &classification.all {
        output.push_str(&format!(
            "  {:40} {:>5}\n",
            truncate(condition.name, 40),
            format_percent(condition.probability)
        ));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::RiskLevel;

    #[test]
    fn empty_history_message() {
        assert_eq!(render_history(&[]), "No scans recorded yet.\n");
    }

    #[test]
    fn history_rows_carry_record_fields() {
        let record = ScanRecord {
            id: "abc".to_string(),
            created_at: "2024-01-02T03:04:05Z".parse().unwrap(),
            image_uri: "/docs/images/1-abcdef.jpg".to_string(),
            overall_risk: RiskLevel::Moderate,
            main_condition: "Age-related Macular Degeneration (AMD)".to_string(),
            confidence: 0.42,
        };

        let out = render_history(&[record]);

        assert!(out.contains("2024-01-02 03:04:05"));
        assert!(out.contains("moderate"));
        assert!(out.contains("42%"));
        assert!(out.contains("Age-related Macular Degener..."));
        assert!(out.ends_with("1 scan(s)\n"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("Glaucoma", 30), "Glaucoma");
    }
}
